//! Topic clustering over tag sets.
//!
//! Two documents are related when the Jaccard similarity of their lowercased
//! tag sets (frontmatter tags plus inline hashtags) reaches the threshold.
//! Clusters are the connected components of that relation. Documents without
//! any tags go into a single "untagged" cluster.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::pipeline::scanner::SourceDocument;

pub const UNTAGGED_LABEL: &str = "untagged";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicCluster {
    /// 1-based, in order of each cluster's first member
    pub id: usize,
    pub label: String,
    /// Member paths in scan order
    pub members: Vec<String>,
    pub untagged: bool,
}

impl TopicCluster {
    pub fn contains(&self, path: &str) -> bool {
        self.members.iter().any(|m| m == path)
    }
}

/// |A ∩ B| / |A ∪ B|, with two empty sets counting as dissimilar.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

pub struct TopicClusterer {
    threshold: f64,
}

impl TopicClusterer {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn cluster(&self, documents: &[SourceDocument]) -> Vec<TopicCluster> {
        let tag_sets: Vec<BTreeSet<String>> = documents.iter().map(|d| d.tag_set()).collect();
        let mut groups = UnionFind::new(documents.len());

        for i in 0..documents.len() {
            if tag_sets[i].is_empty() {
                continue;
            }
            for j in (i + 1)..documents.len() {
                if tag_sets[j].is_empty() {
                    continue;
                }
                if jaccard(&tag_sets[i], &tag_sets[j]) >= self.threshold {
                    groups.union(i, j);
                }
            }
        }

        // Keyed by the root of each component; values are member indices in scan order
        let mut components: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        let mut untagged: Vec<usize> = Vec::new();
        for (i, tags) in tag_sets.iter().enumerate() {
            if tags.is_empty() {
                untagged.push(i);
            } else {
                components.entry(groups.find(i)).or_default().push(i);
            }
        }

        let mut ordered: Vec<(Vec<usize>, bool)> =
            components.into_values().map(|m| (m, false)).collect();
        if !untagged.is_empty() {
            ordered.push((untagged, true));
        }
        ordered.sort_by_key(|(members, _)| members[0]);

        let clusters: Vec<TopicCluster> = ordered
            .into_iter()
            .enumerate()
            .map(|(n, (members, is_untagged))| TopicCluster {
                id: n + 1,
                label: if is_untagged {
                    UNTAGGED_LABEL.to_string()
                } else {
                    dominant_tag(members.iter().map(|&i| &tag_sets[i]))
                },
                members: members.iter().map(|&i| documents[i].path.clone()).collect(),
                untagged: is_untagged,
            })
            .collect();

        debug!(
            "Clustered {} documents into {} clusters (threshold {})",
            documents.len(),
            clusters.len(),
            self.threshold
        );
        clusters
    }
}

/// Most frequent tag across the member sets; ties go to the alphabetically first.
fn dominant_tag<'a>(sets: impl Iterator<Item = &'a BTreeSet<String>>) -> String {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for set in sets {
        for tag in set {
            *counts.entry(tag.as_str()).or_default() += 1;
        }
    }
    let mut best: Option<(&str, usize)> = None;
    for (tag, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((tag, count));
        }
    }
    best.map(|(t, _)| t.to_string()).unwrap_or_default()
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // Lower index wins so roots are stable
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(path: &str, tags: &str) -> SourceDocument {
        let content = if tags.is_empty() {
            "body".to_string()
        } else {
            format!("---\ntags: [{}]\n---\nbody", tags)
        };
        SourceDocument::from_content(path, &content)
    }

    fn set(tags: &[&str]) -> BTreeSet<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_jaccard() {
        assert_eq!(jaccard(&set(&["a", "b"]), &set(&["a", "b"])), 1.0);
        assert_eq!(jaccard(&set(&["a"]), &set(&["b"])), 0.0);
        assert!((jaccard(&set(&["a", "b"]), &set(&["b", "c"])) - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(jaccard(&set(&[]), &set(&[])), 0.0);
    }

    #[test]
    fn test_governance_scenario() {
        let docs = vec![
            doc("a.md", "governance, dao"),
            doc("b.md", "governance"),
            doc("c.md", ""),
        ];
        let clusters = TopicClusterer::new(0.3).cluster(&docs);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].id, 1);
        assert_eq!(clusters[0].label, "governance");
        assert_eq!(clusters[0].members, vec!["a.md", "b.md"]);
        assert!(!clusters[0].untagged);
        assert_eq!(clusters[1].label, UNTAGGED_LABEL);
        assert_eq!(clusters[1].members, vec!["c.md"]);
        assert!(clusters[1].untagged);
    }

    #[test]
    fn test_single_untagged_cluster() {
        let docs = vec![doc("a.md", ""), doc("b.md", ""), doc("c.md", "x")];
        let clusters = TopicClusterer::new(0.3).cluster(&docs);
        assert_eq!(clusters.iter().filter(|c| c.untagged).count(), 1);
        assert_eq!(clusters[0].members, vec!["a.md", "b.md"]);
        assert_eq!(clusters[1].members, vec!["c.md"]);
    }

    #[test]
    fn test_transitive_linking() {
        // a~b and b~c but a and c share nothing
        let docs = vec![doc("a.md", "x, y"), doc("b.md", "y, z"), doc("c.md", "z, w")];
        let clusters = TopicClusterer::new(0.3).cluster(&docs);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members.len(), 3);
    }

    #[test]
    fn test_threshold_one_requires_identical_sets() {
        let docs = vec![doc("a.md", "x, y"), doc("b.md", "x, y"), doc("c.md", "x")];
        let clusters = TopicClusterer::new(1.0).cluster(&docs);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].members, vec!["a.md", "b.md"]);
    }

    #[test]
    fn test_every_tagged_document_in_exactly_one_cluster() {
        let docs = vec![
            doc("a.md", "p"),
            doc("b.md", "q"),
            doc("c.md", "p, q"),
            doc("d.md", "r"),
            doc("e.md", ""),
        ];
        let clusters = TopicClusterer::new(0.3).cluster(&docs);
        for d in &docs {
            assert_eq!(clusters.iter().filter(|c| c.contains(&d.path)).count(), 1);
        }
    }

    #[test]
    fn test_label_tie_breaks_alphabetically() {
        let docs = vec![doc("a.md", "zeta, alpha"), doc("b.md", "zeta, alpha")];
        let clusters = TopicClusterer::new(0.3).cluster(&docs);
        assert_eq!(clusters[0].label, "alpha");
    }

    #[test]
    fn test_hashtags_count_as_tags() {
        let docs = vec![
            SourceDocument::from_content("a.md", "About #Voting"),
            doc("b.md", "voting"),
        ];
        let clusters = TopicClusterer::new(0.3).cluster(&docs);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].label, "voting");
    }

    #[test]
    fn test_empty_input() {
        assert!(TopicClusterer::new(0.3).cluster(&[]).is_empty());
    }
}
