//! skillsmith - Turn a markdown knowledge base into a packaged agent skill
//!
//! Analyzes a repository of markdown notes (frontmatter, wikilinks, tags),
//! recommends a skill template and loading tiers, scaffolds a skill bundle,
//! validates its structure, and packages it into a reproducible archive.

pub mod cli;
pub mod config;
pub mod error;
pub mod frontmatter;
pub mod packager;
pub mod pipeline;
pub mod scaffold;
pub mod template;
pub mod util;
pub mod validator;

pub use error::{Result, SkillError};
