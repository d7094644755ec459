use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::validator::ValidationIssue;

#[derive(Error, Debug)]
pub enum SkillError {
    #[error("Path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("Target already exists: {} (pass --force to overwrite)", .path.display())]
    NameCollision { path: PathBuf },

    #[error("Invalid skill name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Bundle failed validation with {} error(s)", count_errors(.issues))]
    ValidationFailed { issues: Vec<ValidationIssue> },

    #[error("Invalid exclude pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl SkillError {
    /// Map an I/O error on `path` to the matching variant.
    pub fn from_io(err: io::Error, path: impl Into<PathBuf>) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => SkillError::NotFound(path.into()),
            io::ErrorKind::PermissionDenied => SkillError::PermissionDenied(path.into()),
            _ => SkillError::Io(err),
        }
    }
}

fn count_errors(issues: &[ValidationIssue]) -> usize {
    issues.iter().filter(|i| i.is_error()).count()
}

pub type Result<T> = std::result::Result<T, SkillError>;
