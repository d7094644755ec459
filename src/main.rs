use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use skillsmith::cli;
use skillsmith::cli::analyze::ReportFormat;

#[derive(Parser)]
#[command(name = "skillsmith", version)]
#[command(about = "Build agent skills from markdown knowledge bases", long_about = None)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a knowledge repository and recommend a skill structure
    Analyze {
        /// Repository path
        repo: String,

        /// Write the report to this file instead of stdout
        #[arg(short = 'o', long)]
        output: Option<String>,

        /// Report format
        #[arg(long, value_enum, default_value_t = ReportFormat::Markdown)]
        format: ReportFormat,

        /// Minimum tag similarity (0.0-1.0) for two documents to share a cluster
        #[arg(long)]
        threshold: Option<f64>,

        /// Additional glob pattern to skip (repeatable)
        #[arg(long)]
        exclude: Vec<String>,

        /// Path to a TOML config file
        #[arg(long)]
        config: Option<String>,
    },

    /// Create a new skill bundle from a template
    Init {
        /// Skill name (lowercase letters, digits and hyphens)
        name: String,

        /// Template: knowledge-retrieval, framework-guidance, translation, generic
        #[arg(long = "type", default_value = "knowledge-retrieval")]
        template: String,

        /// Directory to create the bundle in
        #[arg(long, default_value = ".")]
        path: String,

        /// Replace an existing bundle with the same name
        #[arg(long)]
        force: bool,
    },

    /// Check a skill bundle's structure
    Validate {
        /// Bundle directory (containing SKILL.md)
        bundle: String,

        /// Path to a TOML config file
        #[arg(long)]
        config: Option<String>,
    },

    /// Validate and package a skill bundle into a .skill.tar.gz archive
    Package {
        /// Bundle directory (containing SKILL.md)
        bundle: String,

        /// Output directory for the archive
        #[arg(short = 'o', long, default_value = ".")]
        output: String,

        /// Path to a TOML config file
        #[arg(long)]
        config: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Analyze {
            repo,
            output,
            format,
            threshold,
            exclude,
            config,
        } => cli::analyze::run(
            &repo,
            output.as_deref(),
            format,
            threshold,
            exclude,
            config.as_deref(),
        )?,
        Commands::Init {
            name,
            template,
            path,
            force,
        } => cli::init::run(&name, &template, &path, force)?,
        Commands::Validate { bundle, config } => cli::validate::run(&bundle, config.as_deref())?,
        Commands::Package {
            bundle,
            output,
            config,
        } => cli::package::run(&bundle, &output, config.as_deref())?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_analyze_defaults() {
        let cli = Cli::try_parse_from(["skillsmith", "analyze", "kb"]).unwrap();
        assert!(!cli.verbose);
        match cli.command {
            Commands::Analyze {
                repo,
                output,
                format,
                threshold,
                exclude,
                config,
            } => {
                assert_eq!(repo, "kb");
                assert!(output.is_none());
                assert_eq!(format, ReportFormat::Markdown);
                assert!(threshold.is_none());
                assert!(exclude.is_empty());
                assert!(config.is_none());
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_parse_analyze_with_all_args() {
        let cli = Cli::try_parse_from([
            "skillsmith",
            "analyze",
            "/tmp/kb",
            "-o",
            "report.json",
            "--format",
            "json",
            "--threshold",
            "0.5",
            "--exclude",
            "drafts",
            "--exclude",
            "*.tmp.md",
            "--config",
            "skillsmith.toml",
            "--verbose",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Analyze {
                output,
                format,
                threshold,
                exclude,
                config,
                ..
            } => {
                assert_eq!(output.unwrap(), "report.json");
                assert_eq!(format, ReportFormat::Json);
                assert_eq!(threshold, Some(0.5));
                assert_eq!(exclude, vec!["drafts", "*.tmp.md"]);
                assert_eq!(config.unwrap(), "skillsmith.toml");
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_parse_init_defaults() {
        let cli = Cli::try_parse_from(["skillsmith", "init", "dao-knowledge"]).unwrap();
        match cli.command {
            Commands::Init {
                name,
                template,
                path,
                force,
            } => {
                assert_eq!(name, "dao-knowledge");
                assert_eq!(template, "knowledge-retrieval");
                assert_eq!(path, ".");
                assert!(!force);
            }
            _ => panic!("expected init"),
        }
    }

    #[test]
    fn test_parse_init_with_type() {
        let cli = Cli::try_parse_from([
            "skillsmith",
            "init",
            "demo",
            "--type",
            "framework-guidance",
            "--path",
            "skills",
            "--force",
        ])
        .unwrap();
        match cli.command {
            Commands::Init {
                template,
                path,
                force,
                ..
            } => {
                assert_eq!(template, "framework-guidance");
                assert_eq!(path, "skills");
                assert!(force);
            }
            _ => panic!("expected init"),
        }
    }

    #[test]
    fn test_parse_package_default_output() {
        let cli = Cli::try_parse_from(["skillsmith", "package", "demo"]).unwrap();
        match cli.command {
            Commands::Package { bundle, output, .. } => {
                assert_eq!(bundle, "demo");
                assert_eq!(output, ".");
            }
            _ => panic!("expected package"),
        }
    }

    #[test]
    fn test_parse_unknown_format() {
        let result = Cli::try_parse_from(["skillsmith", "analyze", "kb", "--format", "html"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_missing_subcommand() {
        let result = Cli::try_parse_from(["skillsmith"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_validate_requires_bundle() {
        let result = Cli::try_parse_from(["skillsmith", "validate"]);
        assert!(result.is_err());
    }
}
