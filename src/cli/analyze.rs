use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::ValueEnum;

use crate::config::Config;
use crate::pipeline::Analyzer;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Markdown,
    Json,
}

pub fn run(
    repo: &str,
    output: Option<&str>,
    format: ReportFormat,
    threshold: Option<f64>,
    exclude: Vec<String>,
    config_path: Option<&str>,
) -> Result<()> {
    let root = Path::new(repo);
    if !root.exists() {
        bail!("Repository not found: {}", repo);
    }
    if !root.is_dir() {
        bail!("Path is not a directory: {}", repo);
    }

    let mut config = Config::load_with_path(config_path.map(Path::new))?;
    if let Some(threshold) = threshold {
        if !(0.0..=1.0).contains(&threshold) {
            bail!("Threshold must be between 0.0 and 1.0, got {}", threshold);
        }
        config.clustering.similarity_threshold = threshold;
    }
    config.scan.exclude.extend(exclude);

    let report = Analyzer::new(config)
        .analyze(root)
        .with_context(|| format!("Failed to analyze {}", repo))?;

    let mut rendered = match format {
        ReportFormat::Markdown => report.to_markdown(),
        ReportFormat::Json => report.to_json().context("Failed to encode report")?,
    };
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }

    match output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("Failed to write report to {}", path))?;
            println!("📝 Analysis report written to: {}", path);
            println!(
                "   {} documents, {} clusters, ~{} tokens. Recommended template: {}",
                report.document_count,
                report.clusters.len(),
                report.total_tokens,
                report.template
            );
        }
        None => print!("{}", rendered),
    }

    Ok(())
}
