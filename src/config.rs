use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Tunable parameters for every pipeline stage.
///
/// Nothing is read from the environment or a default search path: a file is
/// only consulted when the caller names one explicitly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub clustering: ClusterConfig,
    #[serde(default)]
    pub tokens: TokenConfig,
    #[serde(default)]
    pub tiers: TierConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Glob patterns matched against file and directory names; matches are skipped.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// File extensions treated as markdown (case-insensitive, no leading dot)
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            exclude: default_exclude(),
            extensions: default_extensions(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Minimum Jaccard similarity for two documents to be linked (default: 0.3)
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Tokens per whitespace-separated word (default: 1.3)
    #[serde(default = "default_words_factor")]
    pub words_factor: f64,
    #[serde(default = "default_heading_overhead")]
    pub heading_overhead: f64,
    #[serde(default = "default_list_item_overhead")]
    pub list_item_overhead: f64,
    #[serde(default = "default_code_fence_overhead")]
    pub code_fence_overhead: f64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            words_factor: default_words_factor(),
            heading_overhead: default_heading_overhead(),
            list_item_overhead: default_list_item_overhead(),
            code_fence_overhead: default_code_fence_overhead(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierConfig {
    /// Clusters at or below this estimate are always loaded (default: 150)
    #[serde(default = "default_always_max")]
    pub always_max_tokens: u64,

    /// Clusters at or below this estimate load contextually (default: 600)
    #[serde(default = "default_contextual_max")]
    pub contextual_max_tokens: u64,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            always_max_tokens: default_always_max(),
            contextual_max_tokens: default_contextual_max(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// How many hops the reference cycle search follows (default: 8)
    #[serde(default = "default_max_reference_depth")]
    pub max_reference_depth: usize,

    #[serde(default = "default_max_description_chars")]
    pub max_description_chars: usize,

    /// Body length above which a warning is raised (default: 5000 words)
    #[serde(default = "default_max_body_words")]
    pub max_body_words: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_reference_depth: default_max_reference_depth(),
            max_description_chars: default_max_description_chars(),
            max_body_words: default_max_body_words(),
        }
    }
}

fn default_exclude() -> Vec<String> {
    [
        ".git",
        ".hg",
        ".svn",
        "node_modules",
        ".obsidian",
        ".trash",
        "__pycache__",
        ".venv",
        "venv",
        "target",
        ".cache",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_extensions() -> Vec<String> {
    vec!["md".to_string(), "mdx".to_string(), "markdown".to_string()]
}

fn default_similarity_threshold() -> f64 {
    0.3
}

fn default_words_factor() -> f64 {
    1.3
}

fn default_heading_overhead() -> f64 {
    2.0
}

fn default_list_item_overhead() -> f64 {
    1.0
}

fn default_code_fence_overhead() -> f64 {
    3.0
}

fn default_always_max() -> u64 {
    150
}

fn default_contextual_max() -> u64 {
    600
}

fn default_max_reference_depth() -> usize {
    8
}

fn default_max_description_chars() -> usize {
    1024
}

fn default_max_body_words() -> usize {
    5000
}

impl Config {
    /// Load configuration from an explicit path, or use defaults when none is given
    pub fn load_with_path(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(config_path) => {
                debug!("Loading config from explicit path: {}", config_path.display());
                Self::load_from_path(config_path)
            }
            None => {
                debug!("Using default config");
                Ok(Self::default())
            }
        }
    }

    fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }
}
