use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bundle archetype, shared by the recommender and the scaffolder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateType {
    #[default]
    KnowledgeRetrieval,
    FrameworkGuidance,
    Translation,
    Generic,
}

impl TemplateType {
    pub const ALL: [TemplateType; 4] = [
        TemplateType::KnowledgeRetrieval,
        TemplateType::FrameworkGuidance,
        TemplateType::Translation,
        TemplateType::Generic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateType::KnowledgeRetrieval => "knowledge-retrieval",
            TemplateType::FrameworkGuidance => "framework-guidance",
            TemplateType::Translation => "translation",
            TemplateType::Generic => "generic",
        }
    }

    /// One-line summary used in reports and `init` output.
    pub fn summary(&self) -> &'static str {
        match self {
            TemplateType::KnowledgeRetrieval => {
                "Search, lookup and citation over a linked knowledge base"
            }
            TemplateType::FrameworkGuidance => "Interactive worksheet and template completion",
            TemplateType::Translation => "Multilingual content transformation preserving structure",
            TemplateType::Generic => "Blank template for custom use cases",
        }
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "knowledge-retrieval" | "retrieval" | "knowledge" => {
                Ok(TemplateType::KnowledgeRetrieval)
            }
            "framework-guidance" | "framework" => Ok(TemplateType::FrameworkGuidance),
            "translation" | "knowledge-translation" => Ok(TemplateType::Translation),
            "generic" => Ok(TemplateType::Generic),
            _ => bail!(
                "Unknown template type: {} (expected one of: knowledge-retrieval, framework-guidance, translation, generic)",
                s
            ),
        }
    }
}
