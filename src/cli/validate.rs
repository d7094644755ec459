use std::path::Path;

use anyhow::{bail, Result};

use crate::config::Config;
use crate::validator::{print_issues, StructureValidator};

pub fn run(bundle: &str, config_path: Option<&str>) -> Result<()> {
    let dir = Path::new(bundle);
    if !dir.exists() {
        bail!("Bundle not found: {}", bundle);
    }
    if !dir.is_dir() {
        bail!("Path is not a directory: {}", bundle);
    }

    let config = Config::load_with_path(config_path.map(Path::new))?;
    println!("Validating skill at: {}\n", dir.display());
    let issues = StructureValidator::new(config.validation).validate(dir);

    print_issues(&issues);

    let errors = issues.iter().filter(|i| i.is_error()).count();
    if errors > 0 {
        bail!("{} validation error(s) found", errors);
    }

    Ok(())
}
