//! Repository traversal: finds markdown documents under a root and turns
//! each one into a [`SourceDocument`].

use glob::Pattern;
use ignore::WalkBuilder;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::ScanConfig;
use crate::error::{Result, SkillError};
use crate::frontmatter::{self, Frontmatter, ParseWarning};
use crate::pipeline::links::{extract_links, normalize_tag, LinkKind, RawLink};
use crate::util::to_slash_path;

/// One markdown file, parsed. Read-only once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    /// Path relative to the scan root, `/`-separated
    pub path: String,
    pub frontmatter: Frontmatter,
    pub body: String,
    /// Links in order of appearance in the body
    pub outbound_links: Vec<RawLink>,
    pub word_count: usize,
    pub size_bytes: u64,
    pub warnings: Vec<ParseWarning>,
}

impl SourceDocument {
    pub fn from_content(path: impl Into<String>, content: &str) -> Self {
        let parsed = frontmatter::parse(content);
        let outbound_links = extract_links(&parsed.body);
        let word_count = parsed.body.split_whitespace().count();
        Self {
            path: path.into(),
            frontmatter: parsed.frontmatter,
            outbound_links,
            word_count,
            size_bytes: content.len() as u64,
            warnings: parsed.warnings,
            body: parsed.body,
        }
    }

    /// The `title` frontmatter field, if any.
    pub fn title(&self) -> Option<String> {
        self.frontmatter
            .get_str("title")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }

    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Parent directory relative to the root; empty for top-level files.
    pub fn directory(&self) -> &str {
        self.path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
    }

    pub fn hashtags(&self) -> impl Iterator<Item = &str> {
        self.outbound_links
            .iter()
            .filter(|l| l.kind == LinkKind::Tag)
            .map(|l| l.target.as_str())
    }

    /// Frontmatter tags plus inline hashtags, lowercased.
    pub fn tag_set(&self) -> BTreeSet<String> {
        let mut tags: BTreeSet<String> = self
            .frontmatter
            .tags()
            .iter()
            .map(|t| normalize_tag(t))
            .filter(|t| !t.is_empty())
            .collect();
        tags.extend(self.hashtags().map(str::to_string));
        tags
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanIssueKind {
    PermissionDenied,
    Unreadable,
}

/// A file or directory that could not be read. Recorded, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanIssue {
    pub path: String,
    pub kind: ScanIssueKind,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub documents: Vec<SourceDocument>,
    pub issues: Vec<ScanIssue>,
}

pub struct RepoScanner {
    root: PathBuf,
    exclude: Vec<Pattern>,
    extensions: Vec<String>,
}

impl RepoScanner {
    pub fn new(root: &Path, config: &ScanConfig) -> Result<Self> {
        let exclude = config
            .exclude
            .iter()
            .map(|p| Pattern::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let extensions = config
            .extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .collect();

        debug!(
            root = %root.display(),
            patterns = exclude.len(),
            "RepoScanner initialized"
        );

        Ok(Self {
            root: root.to_path_buf(),
            exclude,
            extensions,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lazily walk the root. Items come in deterministic order: entries in
    /// each directory are sorted by file name.
    pub fn iter(&self) -> Result<ScanIter> {
        if !self.root.is_dir() {
            return Err(SkillError::NotFound(self.root.clone()));
        }

        let exclude = self.exclude.clone();
        let walk = WalkBuilder::new(&self.root)
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                if entry.depth() == 0 {
                    return true;
                }
                let name = entry.file_name().to_string_lossy();
                !exclude.iter().any(|p| p.matches(&name))
            })
            .build();

        Ok(ScanIter {
            root: self.root.clone(),
            walk,
            extensions: self.extensions.clone(),
        })
    }

    /// Collect every document and every recorded issue.
    pub fn scan(&self) -> Result<ScanOutcome> {
        info!(root = %self.root.display(), "Scanning repository");
        let mut outcome = ScanOutcome::default();
        for item in self.iter()? {
            match item {
                Ok(doc) => outcome.documents.push(doc),
                Err(issue) => {
                    warn!(path = %issue.path, "{}", issue.message);
                    outcome.issues.push(issue);
                }
            }
        }
        info!(
            documents = outcome.documents.len(),
            issues = outcome.issues.len(),
            "Scan complete"
        );
        Ok(outcome)
    }
}

pub struct ScanIter {
    root: PathBuf,
    walk: ignore::Walk,
    extensions: Vec<String>,
}

impl ScanIter {
    fn is_markdown(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
            .unwrap_or(false)
    }

    fn relative(&self, path: &Path) -> String {
        to_slash_path(path.strip_prefix(&self.root).unwrap_or(path))
    }
}

impl Iterator for ScanIter {
    type Item = std::result::Result<SourceDocument, ScanIssue>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walk.next()? {
                Ok(entry) => entry,
                Err(err) => return Some(Err(self.walk_issue(&err))),
            };

            let is_file = entry.file_type().map(|ft| ft.is_file()).unwrap_or(false);
            if !is_file || !self.is_markdown(entry.path()) {
                continue;
            }

            let rel = self.relative(entry.path());
            match fs::read(entry.path()) {
                Ok(bytes) => {
                    let content = String::from_utf8_lossy(&bytes);
                    debug!(path = %rel, bytes = bytes.len(), "Read document");
                    return Some(Ok(SourceDocument::from_content(rel, &content)));
                }
                Err(err) => return Some(Err(io_issue(rel, &err))),
            }
        }
    }
}

impl ScanIter {
    fn walk_issue(&self, err: &ignore::Error) -> ScanIssue {
        let path = error_path(err)
            .map(|p| self.relative(&p))
            .unwrap_or_default();
        let denied = err
            .io_error()
            .map(|e| e.kind() == io::ErrorKind::PermissionDenied)
            .unwrap_or(false);
        ScanIssue {
            path,
            kind: if denied {
                ScanIssueKind::PermissionDenied
            } else {
                ScanIssueKind::Unreadable
            },
            message: err.to_string(),
        }
    }
}

fn io_issue(path: String, err: &io::Error) -> ScanIssue {
    let kind = if err.kind() == io::ErrorKind::PermissionDenied {
        ScanIssueKind::PermissionDenied
    } else {
        ScanIssueKind::Unreadable
    };
    ScanIssue {
        message: format!("Cannot read {}: {}", path, err),
        path,
        kind,
    }
}

fn error_path(err: &ignore::Error) -> Option<PathBuf> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.clone()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        _ => None,
    }
}
