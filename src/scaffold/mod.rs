//! Creates a new skill bundle skeleton from a template.
//!
//! The tree is built inside a staging directory next to the target and
//! renamed into place, so a failed run leaves nothing behind.

pub mod templates;

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Result, SkillError};
use crate::template::TemplateType;
use crate::util::validate_skill_name;
use templates::TemplateFile;

const STAGING_PREFIX: &str = ".skillsmith-init-";

/// What was created.
#[derive(Debug, Clone)]
pub struct ScaffoldOutcome {
    pub root: PathBuf,
    pub template: TemplateType,
    /// Bundle-relative paths of every written file
    pub files: Vec<String>,
    /// True when an existing tree was replaced
    pub replaced: bool,
}

pub struct SkillScaffolder {
    output_dir: PathBuf,
    overwrite: bool,
}

impl SkillScaffolder {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            overwrite: false,
        }
    }

    /// Replace an existing bundle of the same name instead of failing.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn create(&self, name: &str, template: TemplateType) -> Result<ScaffoldOutcome> {
        validate_skill_name(name).map_err(|reason| SkillError::InvalidName {
            name: name.to_string(),
            reason,
        })?;

        let target = self.output_dir.join(name);
        let exists = fs::symlink_metadata(&target).is_ok();
        if exists && !self.overwrite {
            return Err(SkillError::NameCollision { path: target });
        }

        fs::create_dir_all(&self.output_dir).map_err(|e| SkillError::from_io(e, &self.output_dir))?;
        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&self.output_dir)
            .map_err(|e| SkillError::from_io(e, &self.output_dir))?;
        debug!("Staging bundle in {}", staging.path().display());

        let tree = staging.path().join(name);
        let files = templates::render(template, name);
        for file in &files {
            write_file(&tree, file)?;
        }

        if exists {
            // Park the old tree inside the staging dir so it is removed with it
            let previous = staging.path().join("previous");
            fs::rename(&target, &previous).map_err(|e| SkillError::from_io(e, &target))?;
            if let Err(e) = fs::rename(&tree, &target) {
                let _ = fs::rename(&previous, &target);
                return Err(SkillError::from_io(e, &target));
            }
        } else {
            fs::rename(&tree, &target).map_err(|e| SkillError::from_io(e, &target))?;
        }

        staging
            .close()
            .map_err(|e| SkillError::from_io(e, &self.output_dir))?;

        info!(
            skill = name,
            template = %template,
            path = %target.display(),
            "Created skill bundle"
        );

        Ok(ScaffoldOutcome {
            root: target,
            template,
            files: files.iter().map(|f| f.path.to_string()).collect(),
            replaced: exists,
        })
    }
}

fn write_file(root: &Path, file: &TemplateFile) -> Result<()> {
    let path = root.join(file.path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| SkillError::from_io(e, parent))?;
    }
    fs::write(&path, &file.content).map_err(|e| SkillError::from_io(e, &path))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if file.executable {
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
                .map_err(|e| SkillError::from_io(e, &path))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::StructureValidator;
    use tempfile::TempDir;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_create_layout() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let outcome = SkillScaffolder::new(tmp.path())
            .create("dao-knowledge", TemplateType::KnowledgeRetrieval)?;

        assert_eq!(outcome.root, tmp.path().join("dao-knowledge"));
        assert!(!outcome.replaced);
        for dir in ["scripts", "references", "assets"] {
            assert!(outcome.root.join(dir).is_dir());
        }
        assert!(outcome.root.join("SKILL.md").is_file());
        assert!(outcome.root.join("references/quick-reference.md").is_file());
        // No staging directory survives
        assert_eq!(entries(tmp.path()), vec!["dao-knowledge"]);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_example_script_is_executable() -> anyhow::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new()?;
        let outcome = SkillScaffolder::new(tmp.path()).create("demo", TemplateType::Generic)?;
        let mode = fs::metadata(outcome.root.join("scripts/example.sh"))?.permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
        Ok(())
    }

    #[test]
    fn test_fresh_bundle_has_only_placeholder_error() -> anyhow::Result<()> {
        for template in TemplateType::ALL {
            let tmp = TempDir::new()?;
            let outcome = SkillScaffolder::new(tmp.path()).create("demo-skill", template)?;
            let issues = StructureValidator::default().validate(&outcome.root);
            let errors: Vec<&str> =
                issues.iter().filter(|i| i.is_error()).map(|i| i.rule_id).collect();
            assert_eq!(
                errors,
                vec!["description-placeholder"],
                "template {}: {:?}",
                template,
                issues
            );
            assert!(
                issues.iter().all(|i| i.is_error() || i.rule_id == "body-placeholder"),
                "template {}: {:?}",
                template,
                issues
            );
        }
        Ok(())
    }

    #[test]
    fn test_invalid_name_creates_nothing() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let err = SkillScaffolder::new(tmp.path())
            .create("Bad_Name", TemplateType::Generic)
            .unwrap_err();
        assert!(matches!(err, SkillError::InvalidName { .. }));
        assert!(entries(tmp.path()).is_empty());
        Ok(())
    }

    #[test]
    fn test_collision_without_overwrite() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        fs::create_dir(tmp.path().join("demo"))?;
        fs::write(tmp.path().join("demo/keep.txt"), "mine")?;

        let err = SkillScaffolder::new(tmp.path())
            .create("demo", TemplateType::Generic)
            .unwrap_err();
        assert!(matches!(err, SkillError::NameCollision { .. }));
        assert_eq!(fs::read_to_string(tmp.path().join("demo/keep.txt"))?, "mine");
        assert_eq!(entries(tmp.path()), vec!["demo"]);
        Ok(())
    }

    #[test]
    fn test_overwrite_replaces_tree() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        fs::create_dir(tmp.path().join("demo"))?;
        fs::write(tmp.path().join("demo/stale.txt"), "old")?;

        let outcome = SkillScaffolder::new(tmp.path())
            .with_overwrite(true)
            .create("demo", TemplateType::FrameworkGuidance)?;
        assert!(outcome.replaced);
        assert!(!outcome.root.join("stale.txt").exists());
        assert!(outcome.root.join("assets/templates/blank-template.md").is_file());
        assert_eq!(entries(tmp.path()), vec!["demo"]);
        Ok(())
    }

    #[test]
    fn test_output_dir_created() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let nested = tmp.path().join("skills/nested");
        let outcome = SkillScaffolder::new(&nested).create("demo", TemplateType::Translation)?;
        assert!(outcome.root.join("references/translation-patterns.md").is_file());
        Ok(())
    }
}
