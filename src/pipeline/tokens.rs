//! Heuristic token estimates for documents and clusters.
//!
//! tokens ≈ words × factor + headings × h + list items × l + fence lines × f,
//! rounded to the nearest integer. The factors come from [`TokenConfig`].

use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::TokenConfig;
use crate::pipeline::cluster::TopicCluster;
use crate::pipeline::scanner::SourceDocument;

/// Structural element counts used by the estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MarkdownStructure {
    pub headings: usize,
    pub list_items: usize,
    /// Opening and closing fence lines both count
    pub code_fences: usize,
}

pub fn count_structure(body: &str) -> MarkdownStructure {
    let mut counts = MarkdownStructure::default();
    let mut in_fence = false;
    for line in body.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            counts.code_fences += 1;
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if is_heading(trimmed) {
            counts.headings += 1;
        } else if is_list_item(trimmed) {
            counts.list_items += 1;
        }
    }
    counts
}

fn is_heading(line: &str) -> bool {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    (1..=6).contains(&hashes) && line[hashes..].starts_with([' ', '\t'])
}

fn is_list_item(line: &str) -> bool {
    if let Some(rest) = line.strip_prefix(['-', '*', '+']) {
        return rest.starts_with([' ', '\t']);
    }
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    digits > 0
        && line[digits..]
            .strip_prefix(['.', ')'])
            .is_some_and(|rest| rest.starts_with([' ', '\t']))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TokenEstimates {
    /// `(path, tokens)` in scan order
    pub per_document: Vec<(String, u64)>,
    /// `(cluster id, tokens)` in cluster order
    pub per_cluster: Vec<(usize, u64)>,
    /// Documents that belong to more than one cluster
    pub shared_documents: Vec<String>,
    /// Sum over documents; shared documents are counted once
    pub total: u64,
}

impl TokenEstimates {
    pub fn document(&self, path: &str) -> Option<u64> {
        self.per_document
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, t)| *t)
    }

    pub fn cluster(&self, id: usize) -> Option<u64> {
        self.per_cluster
            .iter()
            .find(|(c, _)| *c == id)
            .map(|(_, t)| *t)
    }
}

pub struct TokenEstimator {
    config: TokenConfig,
}

impl TokenEstimator {
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    pub fn estimate_text(&self, text: &str) -> u64 {
        self.combine(text.split_whitespace().count(), count_structure(text))
    }

    pub fn estimate_document(&self, doc: &SourceDocument) -> u64 {
        self.combine(doc.word_count, count_structure(&doc.body))
    }

    fn combine(&self, words: usize, structure: MarkdownStructure) -> u64 {
        let raw = words as f64 * self.config.words_factor
            + structure.headings as f64 * self.config.heading_overhead
            + structure.list_items as f64 * self.config.list_item_overhead
            + structure.code_fences as f64 * self.config.code_fence_overhead;
        raw.max(0.0).round() as u64
    }

    /// Per-document, per-cluster and total estimates.
    /// A cluster's estimate is the sum over its members.
    pub fn estimate(
        &self,
        documents: &[SourceDocument],
        clusters: &[TopicCluster],
    ) -> TokenEstimates {
        let per_document: Vec<(String, u64)> = documents
            .iter()
            .map(|d| (d.path.clone(), self.estimate_document(d)))
            .collect();
        let by_path: BTreeMap<&str, u64> = per_document
            .iter()
            .map(|(p, t)| (p.as_str(), *t))
            .collect();

        let per_cluster = clusters
            .iter()
            .map(|c| {
                let sum = c
                    .members
                    .iter()
                    .filter_map(|m| by_path.get(m.as_str()))
                    .sum();
                (c.id, sum)
            })
            .collect();

        let mut membership: BTreeMap<&str, usize> = BTreeMap::new();
        for cluster in clusters {
            for member in &cluster.members {
                *membership.entry(member.as_str()).or_default() += 1;
            }
        }
        let shared_documents = documents
            .iter()
            .filter(|d| membership.get(d.path.as_str()).copied().unwrap_or(0) > 1)
            .map(|d| d.path.clone())
            .collect();

        let total = per_document.iter().map(|(_, t)| t).sum();

        TokenEstimates {
            per_document,
            per_cluster,
            shared_documents,
            total,
        }
    }
}
