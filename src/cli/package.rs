use std::path::Path;

use anyhow::{bail, Result};

use crate::config::Config;
use crate::error::SkillError;
use crate::packager::Packager;
use crate::validator::print_issues;

pub fn run(bundle: &str, output_dir: &str, config_path: Option<&str>) -> Result<()> {
    let dir = Path::new(bundle);
    if !dir.exists() {
        bail!("Bundle not found: {}", bundle);
    }
    if !dir.is_dir() {
        bail!("Path is not a directory: {}", bundle);
    }

    let config = Config::load_with_path(config_path.map(Path::new))?;
    println!("Running validation checks...\n");

    let report = match Packager::new(config.validation).package(dir, Path::new(output_dir)) {
        Ok(report) => report,
        Err(SkillError::ValidationFailed { issues }) => {
            print_issues(&issues);
            let errors = issues.iter().filter(|i| i.is_error()).count();
            println!("\n❌ Skill validation failed. Fix errors before packaging.");
            bail!("{} validation error(s) found", errors);
        }
        Err(e) => return Err(e.into()),
    };

    print_issues(&report.warnings);

    let manifest = &report.manifest;
    println!("\n📦 Skill packaged successfully!");
    println!("   Archive: {}", report.archive.display());
    println!(
        "   Size: {} bytes ({:.1} KB) compressed, {} bytes in {} files",
        report.archive_bytes,
        report.archive_bytes as f64 / 1024.0,
        manifest.total_bytes,
        manifest.files.len()
    );
    println!("\n   Contents by directory:");
    for (dir, size) in &manifest.directories {
        println!("     {:<12} {:>4} files {:>10} bytes", dir, size.files, size.bytes);
    }
    println!();

    Ok(())
}
