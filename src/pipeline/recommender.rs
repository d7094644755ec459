//! Template choice and loading-tier assignment.
//!
//! The template decision is a fixed, ordered table evaluated over corpus
//! signals; the first matching row wins and its reason is kept for the report.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::config::TierConfig;
use crate::pipeline::cluster::TopicCluster;
use crate::pipeline::links::LinkGraph;
use crate::pipeline::scanner::SourceDocument;
use crate::pipeline::tokens::TokenEstimates;
use crate::template::TemplateType;

const LOCALE_FIELDS: &[&str] = &["lang", "language", "locale"];

const FRAMEWORK_FIELDS: &[&str] = &[
    "template",
    "framework",
    "worksheet",
    "sections",
    "fields",
    "steps",
    "canvas",
    "stage",
];

const FRAMEWORK_TAGS: &[&str] = &["framework", "template", "worksheet"];

/// Share of documents with framework fields that selects `framework-guidance`
const FRAMEWORK_FIELD_SHARE: f64 = 0.25;
const FRAMEWORK_TAG_MIN_RICHNESS: f64 = 2.0;
const RETRIEVAL_MIN_LINK_DENSITY: f64 = 0.5;
const RETRIEVAL_MIN_DOCUMENTS: usize = 3;
const RETRIEVAL_MIN_AVG_CLUSTER: f64 = 2.0;

/// Measurements the decision table reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CorpusSignals {
    pub document_count: usize,
    pub cluster_count: usize,
    pub average_cluster_size: f64,
    /// Mean number of frontmatter fields per document
    pub schema_richness: f64,
    /// Edges per document
    pub link_density: f64,
    pub locale_documents: usize,
    /// Slugs shared by documents in at least two distinct locales
    pub translated_slugs: Vec<String>,
    pub framework_documents: usize,
    pub framework_tag: bool,
}

impl CorpusSignals {
    pub fn collect(
        documents: &[SourceDocument],
        graph: &LinkGraph,
        clusters: &[TopicCluster],
    ) -> Self {
        let document_count = documents.len();
        let average_cluster_size = if clusters.is_empty() {
            0.0
        } else {
            clusters.iter().map(|c| c.members.len()).sum::<usize>() as f64 / clusters.len() as f64
        };
        let schema_richness = if documents.is_empty() {
            0.0
        } else {
            documents.iter().map(|d| d.frontmatter.len()).sum::<usize>() as f64
                / document_count as f64
        };

        let mut locales_by_slug: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut locale_documents = 0;
        for doc in documents {
            let Some(locale) = document_locale(doc) else {
                continue;
            };
            locale_documents += 1;
            locales_by_slug
                .entry(translation_slug(doc, &locale))
                .or_default()
                .insert(locale);
        }
        let translated_slugs = locales_by_slug
            .into_iter()
            .filter(|(_, locales)| locales.len() >= 2)
            .map(|(slug, _)| slug)
            .collect();

        let framework_documents = documents
            .iter()
            .filter(|d| FRAMEWORK_FIELDS.iter().any(|f| d.frontmatter.contains_key(f)))
            .count();
        let framework_tag = documents.iter().any(|d| {
            let tags = d.tag_set();
            FRAMEWORK_TAGS.iter().any(|t| tags.contains(*t))
        });

        Self {
            document_count,
            cluster_count: clusters.len(),
            average_cluster_size,
            schema_richness,
            link_density: graph.link_density(),
            locale_documents,
            translated_slugs,
            framework_documents,
            framework_tag,
        }
    }
}

fn document_locale(doc: &SourceDocument) -> Option<String> {
    LOCALE_FIELDS
        .iter()
        .find_map(|f| doc.frontmatter.get_str(f))
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
}

/// `slug` field, else the file stem with a trailing `.xx`/`-xx`/`_xx` locale suffix removed.
fn translation_slug(doc: &SourceDocument, locale: &str) -> String {
    if let Some(slug) = doc.frontmatter.get_str("slug") {
        return slug.trim().to_lowercase();
    }
    let name = doc.file_name();
    let stem = name.rsplit_once('.').map(|(s, _)| s).unwrap_or(name).to_lowercase();
    for sep in ['.', '-', '_'] {
        if let Some(base) = stem.strip_suffix(&format!("{}{}", sep, locale)) {
            if !base.is_empty() {
                return base.to_string();
            }
        }
    }
    stem
}

/// Chosen template plus the row of the decision table that chose it.
pub fn choose_template(signals: &CorpusSignals) -> (TemplateType, String) {
    if signals.locale_documents >= 2 && !signals.translated_slugs.is_empty() {
        return (
            TemplateType::Translation,
            format!(
                "{} documents declare a locale and {} slug(s) exist in more than one locale",
                signals.locale_documents,
                signals.translated_slugs.len()
            ),
        );
    }

    let share = if signals.document_count == 0 {
        0.0
    } else {
        signals.framework_documents as f64 / signals.document_count as f64
    };
    if signals.document_count > 0 && share >= FRAMEWORK_FIELD_SHARE {
        return (
            TemplateType::FrameworkGuidance,
            format!(
                "{:.0}% of documents carry structured worksheet fields",
                share * 100.0
            ),
        );
    }
    if signals.framework_tag && signals.schema_richness >= FRAMEWORK_TAG_MIN_RICHNESS {
        return (
            TemplateType::FrameworkGuidance,
            format!(
                "framework/template tags present with {:.1} frontmatter fields per document",
                signals.schema_richness
            ),
        );
    }

    if signals.link_density >= RETRIEVAL_MIN_LINK_DENSITY {
        return (
            TemplateType::KnowledgeRetrieval,
            format!(
                "link density {:.2} edges per document indicates a connected knowledge base",
                signals.link_density
            ),
        );
    }
    if signals.document_count >= RETRIEVAL_MIN_DOCUMENTS
        && signals.average_cluster_size >= RETRIEVAL_MIN_AVG_CLUSTER
    {
        return (
            TemplateType::KnowledgeRetrieval,
            format!(
                "{} documents grouped into topics averaging {:.1} documents",
                signals.document_count, signals.average_cluster_size
            ),
        );
    }

    (
        TemplateType::Generic,
        "no translation, framework or knowledge-base signal was strong enough".to_string(),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadingTier {
    Always,
    Contextual,
    OnDemand,
}

impl LoadingTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadingTier::Always => "always",
            LoadingTier::Contextual => "contextual",
            LoadingTier::OnDemand => "on-demand",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierEntry {
    pub cluster_id: usize,
    pub label: String,
    pub tokens: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadingTiers {
    pub always: Vec<TierEntry>,
    pub contextual: Vec<TierEntry>,
    pub on_demand: Vec<TierEntry>,
}

impl LoadingTiers {
    pub fn tier_of(&self, cluster_id: usize) -> Option<LoadingTier> {
        let has = |entries: &[TierEntry]| entries.iter().any(|e| e.cluster_id == cluster_id);
        if has(&self.always) {
            Some(LoadingTier::Always)
        } else if has(&self.contextual) {
            Some(LoadingTier::Contextual)
        } else if has(&self.on_demand) {
            Some(LoadingTier::OnDemand)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub template: TemplateType,
    pub reason: String,
    pub signals: CorpusSignals,
    pub tiers: LoadingTiers,
}

pub struct Recommender {
    tiers: TierConfig,
}

impl Recommender {
    pub fn new(tiers: TierConfig) -> Self {
        Self { tiers }
    }

    pub fn tier_for(&self, tokens: u64) -> LoadingTier {
        if tokens <= self.tiers.always_max_tokens {
            LoadingTier::Always
        } else if tokens <= self.tiers.contextual_max_tokens {
            LoadingTier::Contextual
        } else {
            LoadingTier::OnDemand
        }
    }

    pub fn assign_tiers(
        &self,
        clusters: &[TopicCluster],
        estimates: &TokenEstimates,
    ) -> LoadingTiers {
        let mut tiers = LoadingTiers::default();
        for cluster in clusters {
            let tokens = estimates.cluster(cluster.id).unwrap_or(0);
            let entry = TierEntry {
                cluster_id: cluster.id,
                label: cluster.label.clone(),
                tokens,
            };
            match self.tier_for(tokens) {
                LoadingTier::Always => tiers.always.push(entry),
                LoadingTier::Contextual => tiers.contextual.push(entry),
                LoadingTier::OnDemand => tiers.on_demand.push(entry),
            }
        }
        tiers
    }

    pub fn recommend(
        &self,
        documents: &[SourceDocument],
        graph: &LinkGraph,
        clusters: &[TopicCluster],
        estimates: &TokenEstimates,
    ) -> Recommendation {
        let signals = CorpusSignals::collect(documents, graph, clusters);
        let (template, reason) = choose_template(&signals);
        debug!(template = %template, %reason, "Template chosen");
        Recommendation {
            template,
            reason,
            tiers: self.assign_tiers(clusters, estimates),
            signals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals() -> CorpusSignals {
        CorpusSignals {
            document_count: 10,
            cluster_count: 5,
            ..Default::default()
        }
    }

    fn docs(items: &[(&str, &str)]) -> Vec<SourceDocument> {
        items
            .iter()
            .map(|(p, c)| SourceDocument::from_content(*p, c))
            .collect()
    }

    #[test]
    fn test_generic_fallback() {
        let (t, reason) = choose_template(&signals());
        assert_eq!(t, TemplateType::Generic);
        assert!(!reason.is_empty());
    }

    #[test]
    fn test_link_density_selects_retrieval() {
        let s = CorpusSignals {
            link_density: 0.5,
            ..signals()
        };
        assert_eq!(choose_template(&s).0, TemplateType::KnowledgeRetrieval);
    }

    #[test]
    fn test_cluster_size_selects_retrieval() {
        let s = CorpusSignals {
            document_count: 3,
            average_cluster_size: 2.0,
            ..signals()
        };
        assert_eq!(choose_template(&s).0, TemplateType::KnowledgeRetrieval);
    }

    #[test]
    fn test_framework_fields_beat_links() {
        let s = CorpusSignals {
            framework_documents: 3,
            link_density: 3.0,
            ..signals()
        };
        assert_eq!(choose_template(&s).0, TemplateType::FrameworkGuidance);

        let below = CorpusSignals {
            framework_documents: 2,
            ..signals()
        };
        assert_eq!(choose_template(&below).0, TemplateType::Generic);
    }

    #[test]
    fn test_framework_tag_needs_richness() {
        let poor = CorpusSignals {
            framework_tag: true,
            schema_richness: 1.5,
            ..signals()
        };
        assert_eq!(choose_template(&poor).0, TemplateType::Generic);
        let rich = CorpusSignals {
            schema_richness: 2.0,
            ..poor
        };
        assert_eq!(choose_template(&rich).0, TemplateType::FrameworkGuidance);
    }

    #[test]
    fn test_translation_wins_first() {
        let s = CorpusSignals {
            locale_documents: 2,
            translated_slugs: vec!["intro".to_string()],
            framework_documents: 10,
            ..signals()
        };
        assert_eq!(choose_template(&s).0, TemplateType::Translation);
    }

    #[test]
    fn test_collect_translated_slugs() {
        let d = docs(&[
            ("en/intro.md", "---\nlang: en\n---\nHi"),
            ("es/intro.md", "---\nlang: es\n---\nHola"),
            ("guide.fr.md", "---\nlocale: fr\n---\nSalut"),
            ("guide.md", "---\nlanguage: EN\nslug: guide\n---\nHello"),
            ("solo.md", "---\nlang: de\n---\nHallo"),
        ]);
        let s = CorpusSignals::collect(&d, &LinkGraph::build(&d), &[]);
        assert_eq!(s.locale_documents, 5);
        assert_eq!(s.translated_slugs, vec!["guide", "intro"]);
        assert_eq!(choose_template(&s).0, TemplateType::Translation);
    }

    #[test]
    fn test_same_locale_is_not_translation() {
        let d = docs(&[
            ("a/intro.md", "---\nlang: en\n---\nx"),
            ("b/intro.md", "---\nlang: en\n---\ny"),
        ]);
        let s = CorpusSignals::collect(&d, &LinkGraph::build(&d), &[]);
        assert!(s.translated_slugs.is_empty());
    }

    #[test]
    fn test_collect_framework_signals() {
        let d = docs(&[
            ("canvas.md", "---\ncanvas: lean\nsteps: [a, b]\n---\nx"),
            ("plain.md", "x"),
            ("other.md", "y"),
            ("more.md", "z"),
        ]);
        let s = CorpusSignals::collect(&d, &LinkGraph::build(&d), &[]);
        assert_eq!(s.framework_documents, 1);
        assert!((s.schema_richness - 0.5).abs() < 1e-9);
        assert_eq!(choose_template(&s).0, TemplateType::FrameworkGuidance);
    }

    #[test]
    fn test_tier_boundaries() {
        let r = Recommender::new(TierConfig::default());
        assert_eq!(r.tier_for(0), LoadingTier::Always);
        assert_eq!(r.tier_for(150), LoadingTier::Always);
        assert_eq!(r.tier_for(151), LoadingTier::Contextual);
        assert_eq!(r.tier_for(600), LoadingTier::Contextual);
        assert_eq!(r.tier_for(601), LoadingTier::OnDemand);
    }

    #[test]
    fn test_custom_tier_boundaries() {
        let r = Recommender::new(TierConfig {
            always_max_tokens: 10,
            contextual_max_tokens: 20,
        });
        assert_eq!(r.tier_for(15), LoadingTier::Contextual);
        assert_eq!(r.tier_for(21), LoadingTier::OnDemand);
    }

    #[test]
    fn test_assign_tiers() {
        let clusters = vec![
            TopicCluster {
                id: 1,
                label: "small".to_string(),
                members: vec![],
                untagged: false,
            },
            TopicCluster {
                id: 2,
                label: "big".to_string(),
                members: vec![],
                untagged: false,
            },
        ];
        let estimates = TokenEstimates {
            per_cluster: vec![(1, 100), (2, 1000)],
            ..Default::default()
        };
        let tiers = Recommender::new(TierConfig::default()).assign_tiers(&clusters, &estimates);
        assert_eq!(tiers.tier_of(1), Some(LoadingTier::Always));
        assert_eq!(tiers.tier_of(2), Some(LoadingTier::OnDemand));
        assert_eq!(tiers.tier_of(3), None);
        assert_eq!(tiers.on_demand[0].label, "big");
    }
}
