//! The analysis report: a plain value assembled from every pipeline stage,
//! renderable as markdown or serializable as JSON.
//!
//! Nothing time-dependent goes in here, so analyzing the same tree twice
//! yields equal reports.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::frontmatter::ParseWarning;
use crate::pipeline::cluster::TopicCluster;
use crate::pipeline::links::{LinkGraph, LinkKind, LinkStatus};
use crate::pipeline::recommender::{CorpusSignals, LoadingTiers, Recommendation};
use crate::pipeline::scanner::{ScanIssue, ScanOutcome, SourceDocument};
use crate::pipeline::tokens::TokenEstimates;
use crate::template::TemplateType;
use crate::util::slugify;

const MOST_REFERENCED_LIMIT: usize = 5;
const LARGEST_DOCUMENTS_LIMIT: usize = 10;
const TRIGGER_KEYWORD_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummary {
    #[serde(flatten)]
    pub cluster: TopicCluster,
    pub tokens: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkSummary {
    pub wikilinks: usize,
    pub markdown_links: usize,
    pub tag_edges: usize,
    pub resolved: usize,
    pub unresolved: usize,
    /// `(path, backlink count)`, most referenced first
    pub most_referenced: Vec<(String, usize)>,
    /// `(source path, raw target)` in graph order
    pub unresolved_targets: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Count {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentWarning {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub root: String,
    pub document_count: usize,
    pub total_bytes: u64,
    pub total_tokens: u64,
    pub clusters: Vec<ClusterSummary>,
    pub shared_documents: Vec<String>,
    pub template: TemplateType,
    pub template_reason: String,
    pub signals: CorpusSignals,
    pub tiers: LoadingTiers,
    /// Labels of the largest tagged clusters, for the skill description
    pub trigger_keywords: Vec<String>,
    pub links: LinkSummary,
    /// Tag frequencies, most frequent first
    pub tags: Vec<Count>,
    /// How many documents use each frontmatter key, most common first
    pub frontmatter_fields: Vec<Count>,
    /// Documents per directory, sorted by directory
    pub directories: Vec<Count>,
    /// `(path, tokens)`, largest first
    pub largest_documents: Vec<(String, u64)>,
    pub parse_warnings: Vec<DocumentWarning>,
    pub scan_issues: Vec<ScanIssue>,
}

impl AnalysisReport {
    pub fn assemble(
        root: &str,
        scan: &ScanOutcome,
        graph: &LinkGraph,
        clusters: &[TopicCluster],
        estimates: &TokenEstimates,
        recommendation: Recommendation,
    ) -> Self {
        let documents = &scan.documents;

        let trigger_keywords = trigger_keywords(clusters);
        let clusters = clusters
            .iter()
            .map(|c| ClusterSummary {
                tokens: estimates.cluster(c.id).unwrap_or(0),
                cluster: c.clone(),
            })
            .collect();

        let links = LinkSummary {
            wikilinks: count_kind(graph, LinkKind::Wikilink),
            markdown_links: count_kind(graph, LinkKind::MarkdownLink),
            tag_edges: count_kind(graph, LinkKind::Tag),
            resolved: graph.edges().len() - graph.unresolved_count(),
            unresolved: graph.unresolved_count(),
            most_referenced: graph.most_referenced(MOST_REFERENCED_LIMIT),
            unresolved_targets: graph
                .edges()
                .iter()
                .filter(|e| !e.is_resolved())
                .map(|e| (e.from.clone(), e.to.clone()))
                .collect(),
        };

        let mut largest_documents = estimates.per_document.clone();
        largest_documents.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        largest_documents.truncate(LARGEST_DOCUMENTS_LIMIT);

        let parse_warnings = documents
            .iter()
            .flat_map(|d| {
                d.warnings.iter().map(|w: &ParseWarning| DocumentWarning {
                    path: d.path.clone(),
                    message: w.message.clone(),
                })
            })
            .collect();

        Self {
            root: root.to_string(),
            document_count: documents.len(),
            total_bytes: documents.iter().map(|d| d.size_bytes).sum(),
            total_tokens: estimates.total,
            clusters,
            shared_documents: estimates.shared_documents.clone(),
            template: recommendation.template,
            template_reason: recommendation.reason,
            signals: recommendation.signals,
            tiers: recommendation.tiers,
            trigger_keywords,
            links,
            tags: tag_counts(documents),
            frontmatter_fields: field_counts(documents),
            directories: directory_counts(documents),
            largest_documents,
            parse_warnings,
            scan_issues: scan.issues.clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# Knowledge Repository Analysis\n\n");
        out.push_str(&format!("**Repository**: `{}`\n\n", self.root));

        out.push_str("## Summary\n\n");
        out.push_str(&format!(
            "- **Total Files**: {} markdown documents\n",
            self.document_count
        ));
        out.push_str(&format!(
            "- **Total Size**: {} bytes\n",
            group_thousands(self.total_bytes)
        ));
        out.push_str(&format!(
            "- **Estimated Tokens**: ~{} tokens\n",
            group_thousands(self.total_tokens)
        ));
        out.push_str(&format!("- **Topics Identified**: {}\n", self.clusters.len()));
        out.push_str(&format!("- **Unique Tags**: {}\n", self.tags.len()));
        out.push_str(&format!(
            "- **Links Found**: {} ({} unresolved)\n\n",
            self.links.resolved + self.links.unresolved,
            self.links.unresolved
        ));

        out.push_str("## Repository Structure\n\n");
        for dir in &self.directories {
            let name = if dir.name.is_empty() { "." } else { dir.name.as_str() };
            out.push_str(&format!("- `{}`: {} files\n", name, dir.count));
        }
        out.push('\n');

        out.push_str("## Topic Clusters\n\n");
        if self.clusters.is_empty() {
            out.push_str("No documents to cluster\n\n");
        } else {
            out.push_str("| # | Topic | Documents | Tokens | Tier |\n");
            out.push_str("|---|-------|-----------|--------|------|\n");
            for c in &self.clusters {
                let tier = self
                    .tiers
                    .tier_of(c.cluster.id)
                    .map(|t| t.as_str())
                    .unwrap_or("-");
                out.push_str(&format!(
                    "| {} | {} | {} | ~{} | {} |\n",
                    c.cluster.id,
                    c.cluster.label,
                    c.cluster.members.len(),
                    group_thousands(c.tokens),
                    tier
                ));
            }
            out.push('\n');
            if !self.shared_documents.is_empty() {
                out.push_str("Documents shared by more than one topic:\n\n");
                for path in &self.shared_documents {
                    out.push_str(&format!("- `{}`\n", path));
                }
                out.push('\n');
            }
        }

        out.push_str("## Content Patterns\n\n### Frontmatter Usage\n\n");
        if self.frontmatter_fields.is_empty() {
            out.push_str("No YAML frontmatter detected\n\n");
        } else {
            for field in self.frontmatter_fields.iter().take(10) {
                let pct = field.count as f64 * 100.0 / self.document_count.max(1) as f64;
                out.push_str(&format!(
                    "- `{}`: {} files ({:.0}%)\n",
                    field.name, field.count, pct
                ));
            }
            out.push('\n');
        }

        out.push_str("### Tag Distribution\n\n");
        if self.tags.is_empty() {
            out.push_str("No tags detected\n\n");
        } else {
            for tag in self.tags.iter().take(10) {
                out.push_str(&format!("- `#{}`: {} occurrences\n", tag.name, tag.count));
            }
            out.push('\n');
        }

        out.push_str("### Linking Patterns\n\n");
        out.push_str(&format!("- **Wikilinks**: {}\n", self.links.wikilinks));
        out.push_str(&format!("- **Markdown links**: {}\n", self.links.markdown_links));
        out.push_str(&format!("- **Tag edges**: {}\n", self.links.tag_edges));
        out.push_str(&format!(
            "- **Link density**: {:.2} per document\n",
            self.signals.link_density
        ));
        if !self.links.most_referenced.is_empty() {
            out.push_str("\nMost referenced pages:\n\n");
            for (path, n) in &self.links.most_referenced {
                out.push_str(&format!("- `{}`: {} references\n", path, n));
            }
        }
        if !self.links.unresolved_targets.is_empty() {
            out.push_str("\nUnresolved links:\n\n");
            for (from, target) in &self.links.unresolved_targets {
                out.push_str(&format!("- `{}` → `{}`\n", from, target));
            }
        }
        out.push('\n');

        out.push_str("## Recommended Skill Configuration\n\n### Skill Type\n\n");
        out.push_str(&format!("**Recommended**: `{}`\n\n", self.template));
        out.push_str(&format!("{}: {}.\n\n", self.template.summary(), self.template_reason));

        out.push_str("### Loading Tiers\n\n");
        for (name, entries) in [
            ("always", &self.tiers.always),
            ("contextual", &self.tiers.contextual),
            ("on-demand", &self.tiers.on_demand),
        ] {
            let labels: Vec<String> = entries
                .iter()
                .map(|e| format!("{} (~{})", e.label, group_thousands(e.tokens)))
                .collect();
            let listed = if labels.is_empty() {
                "none".to_string()
            } else {
                labels.join(", ")
            };
            out.push_str(&format!("- **{}**: {}\n", name, listed));
        }
        out.push('\n');

        if !self.trigger_keywords.is_empty() {
            out.push_str("Suggested trigger keywords:\n\n");
            for keyword in &self.trigger_keywords {
                out.push_str(&format!("- {}\n", keyword));
            }
            out.push('\n');
        }

        let per_doc = if self.document_count == 0 {
            0
        } else {
            self.total_tokens / self.document_count as u64
        };
        out.push_str("### Token Budget Estimates\n\n");
        out.push_str("| Operation | Estimated Tokens | Notes |\n");
        out.push_str("|-----------|------------------|-------|\n");
        out.push_str("| Skill metadata | ~100 | Name + description |\n");
        out.push_str("| SKILL.md body | ~2000-2500 | Core capabilities and patterns |\n");
        out.push_str("| Quick reference | ~500-1000 | Common patterns extracted |\n");
        out.push_str(&format!(
            "| Single doc lookup | ~{} | Average per file |\n",
            group_thousands(per_doc)
        ));
        out.push_str(&format!(
            "| Multi-doc synthesis | ~{} | 3 files combined |\n",
            group_thousands(per_doc * 3)
        ));
        out.push_str(&format!(
            "| Full knowledge base | ~{} | All content (use on-demand) |\n\n",
            group_thousands(self.total_tokens)
        ));

        out.push_str("### Suggested Structure\n\n");
        out.push_str("```\nskill-name/\n├── SKILL.md\n├── scripts/\n├── references/\n");
        out.push_str("│   ├── quick-reference.md\n");
        for c in self.clusters.iter().filter(|c| !c.cluster.untagged).take(3) {
            out.push_str(&format!("│   ├── {}.md\n", slugify(&c.cluster.label)));
        }
        out.push_str("└── assets/\n");
        if self.template == TemplateType::FrameworkGuidance {
            out.push_str("    └── templates/\n");
        }
        out.push_str("```\n\n");

        out.push_str("### Next Steps\n\n");
        out.push_str(&format!(
            "1. Run `skillsmith init <name> --type {}`\n",
            self.template
        ));
        out.push_str("2. Copy key documents to `references/`\n");
        out.push_str("3. Fill in the quick-reference guide with the most common patterns\n");
        out.push_str("4. Replace the description placeholder in SKILL.md\n");
        out.push_str("5. Run `skillsmith validate` and `skillsmith package`\n\n");

        out.push_str("## Sample Skill Configuration\n\n");
        out.push_str(&self.sample_frontmatter());
        out.push('\n');

        out.push_str("## Largest Documents\n\n");
        for (i, (path, tokens)) in self.largest_documents.iter().enumerate() {
            out.push_str(&format!(
                "{}. `{}`: ~{} tokens\n",
                i + 1,
                path,
                group_thousands(*tokens)
            ));
        }

        if !self.parse_warnings.is_empty() || !self.scan_issues.is_empty() {
            out.push_str("\n## Warnings\n\n");
            for w in &self.parse_warnings {
                out.push_str(&format!("- `{}`: {}\n", w.path, w.message));
            }
            for issue in &self.scan_issues {
                out.push_str(&format!("- `{}`: {}\n", issue.path, issue.message));
            }
        }

        out
    }

    /// Fenced YAML frontmatter to start a SKILL.md from.
    fn sample_frontmatter(&self) -> String {
        let description = match self.trigger_keywords.first() {
            Some(first) => {
                let mentioned: Vec<&str> =
                    self.trigger_keywords.iter().take(3).map(String::as_str).collect();
                format!(
                    "[Brief description mentioning {}. Use when users ask about {}.]",
                    mentioned.join(", "),
                    first
                )
            }
            None => "[Brief description. Use when users ask about relevant topics.]".to_string(),
        };
        format!(
            "```yaml\n---\nname: [your-skill-name]\ndescription: {}\n---\n```\n",
            description
        )
    }
}

/// Tagged cluster labels, largest cluster first. Equal sizes keep cluster order.
fn trigger_keywords(clusters: &[TopicCluster]) -> Vec<String> {
    let mut tagged: Vec<&TopicCluster> = clusters.iter().filter(|c| !c.untagged).collect();
    tagged.sort_by(|a, b| b.members.len().cmp(&a.members.len()));
    let mut keywords: Vec<String> = Vec::new();
    for cluster in tagged {
        if !keywords.contains(&cluster.label) {
            keywords.push(cluster.label.clone());
        }
        if keywords.len() == TRIGGER_KEYWORD_LIMIT {
            break;
        }
    }
    keywords
}

fn count_kind(graph: &LinkGraph, kind: LinkKind) -> usize {
    graph.count(kind, LinkStatus::Resolved) + graph.count(kind, LinkStatus::Unresolved)
}

fn sorted_counts(counts: BTreeMap<String, usize>) -> Vec<Count> {
    let mut v: Vec<Count> = counts
        .into_iter()
        .map(|(name, count)| Count { name, count })
        .collect();
    // Stable sort keeps alphabetical order among equal counts
    v.sort_by(|a, b| b.count.cmp(&a.count));
    v
}

fn tag_counts(documents: &[SourceDocument]) -> Vec<Count> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for doc in documents {
        for tag in doc.tag_set() {
            *counts.entry(tag).or_default() += 1;
        }
    }
    sorted_counts(counts)
}

fn field_counts(documents: &[SourceDocument]) -> Vec<Count> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for doc in documents {
        for key in doc.frontmatter.keys() {
            *counts.entry(key.to_string()).or_default() += 1;
        }
    }
    sorted_counts(counts)
}

fn directory_counts(documents: &[SourceDocument]) -> Vec<Count> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for doc in documents {
        *counts.entry(doc.directory().to_string()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(name, count)| Count { name, count })
        .collect()
}

/// 1234567 → "1,234,567"
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_tag_counts_sorted_by_count_then_name() {
        let docs = vec![
            SourceDocument::from_content("a.md", "---\ntags: [b, a]\n---\n"),
            SourceDocument::from_content("b.md", "---\ntags: [b]\n---\n"),
        ];
        let tags = tag_counts(&docs);
        assert_eq!(tags[0], Count { name: "b".to_string(), count: 2 });
        assert_eq!(tags[1], Count { name: "a".to_string(), count: 1 });
    }

    fn cluster(id: usize, label: &str, members: &[&str], untagged: bool) -> TopicCluster {
        TopicCluster {
            id,
            label: label.to_string(),
            members: members.iter().map(|m| m.to_string()).collect(),
            untagged,
        }
    }

    #[test]
    fn test_trigger_keywords_rank_by_cluster_size() {
        let clusters = vec![
            cluster(1, "ops", &["a.md"], false),
            cluster(2, "gov", &["b.md", "c.md", "d.md"], false),
            cluster(3, "untagged", &["e.md", "f.md", "g.md", "h.md"], true),
            cluster(4, "dao", &["i.md", "j.md"], false),
            cluster(5, "zen", &["k.md"], false),
        ];
        assert_eq!(trigger_keywords(&clusters), vec!["gov", "dao", "ops", "zen"]);
        assert!(trigger_keywords(&clusters[2..3]).is_empty());
    }

    #[test]
    fn test_directory_counts() {
        let docs = vec![
            SourceDocument::from_content("a.md", ""),
            SourceDocument::from_content("notes/b.md", ""),
            SourceDocument::from_content("notes/c.md", ""),
        ];
        let dirs = directory_counts(&docs);
        assert_eq!(dirs.len(), 2);
        assert_eq!(dirs[0].name, "");
        assert_eq!(dirs[1], Count { name: "notes".to_string(), count: 2 });
    }
}
