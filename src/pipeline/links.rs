//! Cross-reference extraction and the document link graph.
//!
//! Three link forms are recognized in document bodies: wikilinks
//! (`[[target]]`, `[[target|label]]`, `[[target#heading]]`), hashtags
//! (`#tag`, `#tag/subtag`) and relative markdown links (`[text](path.md)`).
//! Targets are resolved with [`resolve_target`], a pure function over a
//! [`DocumentIndex`], so the tie-break policy does not depend on traversal
//! order.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::debug;

use crate::pipeline::scanner::SourceDocument;
use crate::util::{mask_code_fences, normalize_relative, slugify};

static WIKILINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\[([^\[\]|#]*)(?:#[^\[\]|]*)?(?:\|[^\[\]]*)?\]\]").expect("valid wikilink regex")
});

pub(crate) static MARKDOWN_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(!?)\[[^\]]*\]\(\s*<?([^)\s>]+)>?(?:\s+"[^"]*")?\s*\)"#)
        .expect("valid markdown link regex")
});

static HASHTAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[\s(\[,;])#([A-Za-z][\w\-]*(?:/[\w\-]+)*)").expect("valid hashtag regex")
});

static INLINE_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`[^`\n]*`").expect("valid inline code regex"));

const MARKDOWN_EXTENSIONS: &[&str] = &["md", "mdx", "markdown"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkKind {
    Wikilink,
    Tag,
    MarkdownLink,
}

impl LinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::Wikilink => "wikilink",
            LinkKind::Tag => "tag",
            LinkKind::MarkdownLink => "markdown-link",
        }
    }
}

/// A link as written in a document body, before resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawLink {
    pub kind: LinkKind,
    pub target: String,
}

/// Lowercase a tag and drop any leading `#`.
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().trim_start_matches('#').trim().to_lowercase()
}

/// Extract every link from `body` in order of appearance.
/// Fenced code blocks and inline code spans are ignored.
pub fn extract_links(body: &str) -> Vec<RawLink> {
    let masked = mask_inline_code(&mask_code_fences(body));
    let mut found: Vec<(usize, RawLink)> = Vec::new();

    for caps in WIKILINK_RE.captures_iter(&masked) {
        let (Some(whole), Some(target)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let target = target.as_str().trim();
        if !target.is_empty() {
            found.push((
                whole.start(),
                RawLink {
                    kind: LinkKind::Wikilink,
                    target: target.to_string(),
                },
            ));
        }
    }

    for caps in MARKDOWN_LINK_RE.captures_iter(&masked) {
        let (Some(whole), Some(target)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        let is_image = caps.get(1).is_some_and(|m| m.as_str() == "!");
        let target = target.as_str();
        if is_image || !is_relative_target(target) {
            continue;
        }
        found.push((
            whole.start(),
            RawLink {
                kind: LinkKind::MarkdownLink,
                target: target.to_string(),
            },
        ));
    }

    for caps in HASHTAG_RE.captures_iter(&masked) {
        let Some(tag) = caps.get(1) else {
            continue;
        };
        found.push((
            tag.start().saturating_sub(1),
            RawLink {
                kind: LinkKind::Tag,
                target: normalize_tag(tag.as_str()),
            },
        ));
    }

    found.sort_by_key(|(pos, _)| *pos);
    found.into_iter().map(|(_, link)| link).collect()
}

fn mask_inline_code(text: &str) -> String {
    INLINE_CODE_RE
        .replace_all(text, |caps: &regex::Captures| " ".repeat(caps[0].len()))
        .into_owned()
}

pub(crate) fn is_relative_target(target: &str) -> bool {
    !(target.contains("://")
        || target.starts_with('#')
        || target.starts_with('/')
        || target.starts_with("mailto:")
        || target.starts_with("tel:")
        || target.starts_with("data:"))
}

/// Strip a trailing markdown extension (case-insensitive).
fn strip_markdown_extension(name: &str) -> &str {
    if let Some((stem, ext)) = name.rsplit_once('.') {
        if MARKDOWN_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
            return stem;
        }
    }
    name
}

pub(crate) fn strip_fragment(target: &str) -> &str {
    target.split(['#', '?']).next().unwrap_or(target)
}

/// Which rung of the resolution ladder produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchRule {
    /// Exact relative path (markdown links only)
    Path,
    Filename,
    Title,
    Slug,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved { path: String, rule: MatchRule },
    Unresolved,
}

impl Resolution {
    pub fn path(&self) -> Option<&str> {
        match self {
            Resolution::Resolved { path, .. } => Some(path),
            Resolution::Unresolved => None,
        }
    }
}

#[derive(Debug, Clone)]
struct IndexEntry {
    path: String,
    path_lower_no_ext: String,
    stem_lower: String,
    title: Option<String>,
    stem_slug: String,
    title_slug: Option<String>,
}

/// Lookup structure over the known documents, kept sorted by path so the
/// first match in any scan is the lexicographically first candidate.
#[derive(Debug, Clone, Default)]
pub struct DocumentIndex {
    entries: Vec<IndexEntry>,
}

impl DocumentIndex {
    /// Build from `(path, title)` pairs.
    pub fn new<'a, I>(documents: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        let mut entries: Vec<IndexEntry> = documents
            .into_iter()
            .map(|(path, title)| {
                let file_name = path.rsplit('/').next().unwrap_or(path);
                let stem = strip_markdown_extension(file_name);
                let title = title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
                IndexEntry {
                    path: path.to_string(),
                    path_lower_no_ext: strip_markdown_extension(path).to_lowercase(),
                    stem_lower: stem.to_lowercase(),
                    stem_slug: slugify(stem),
                    title_slug: title.as_deref().map(slugify),
                    title,
                }
            })
            .collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        entries.dedup_by(|a, b| a.path == b.path);
        Self { entries }
    }

    pub fn from_documents(documents: &[SourceDocument]) -> Self {
        let titles: Vec<(String, Option<String>)> = documents
            .iter()
            .map(|d| (d.path.clone(), d.title()))
            .collect();
        Self::new(titles.iter().map(|(p, t)| (p.as_str(), t.as_deref())))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries
            .binary_search_by(|e| e.path.as_str().cmp(path))
            .is_ok()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn first_where(&self, pred: impl Fn(&IndexEntry) -> bool) -> Option<&str> {
        self.entries.iter().find(|e| pred(e)).map(|e| e.path.as_str())
    }
}

/// Resolve a wikilink-style target by name.
///
/// Ladder: exact filename (case- and extension-insensitive; targets with a
/// `/` may also match the relative path), exact `title`, slug of filename or
/// title, else unresolved.
pub fn resolve_target(target: &str, index: &DocumentIndex) -> Resolution {
    let raw = strip_fragment(target.trim()).trim();
    if raw.is_empty() {
        return Resolution::Unresolved;
    }
    let name = strip_markdown_extension(raw);
    let name_lower = name.trim_start_matches("./").to_lowercase();

    let by_filename = index.first_where(|e| {
        e.stem_lower == name_lower
            || (name_lower.contains('/') && e.path_lower_no_ext == name_lower)
    });
    if let Some(path) = by_filename {
        return resolved(path, MatchRule::Filename);
    }

    if let Some(path) = index.first_where(|e| e.title.as_deref() == Some(raw)) {
        return resolved(path, MatchRule::Title);
    }

    let last_segment = name.rsplit('/').next().unwrap_or(name);
    let slug = slugify(last_segment);
    if !slug.is_empty() {
        let by_slug = index.first_where(|e| {
            e.stem_slug == slug || e.title_slug.as_deref() == Some(slug.as_str())
        });
        if let Some(path) = by_slug {
            return resolved(path, MatchRule::Slug);
        }
    }

    Resolution::Unresolved
}

/// Resolve a markdown link written inside `source_path`.
/// The exact relative path is tried first, then the name ladder on the file stem.
pub fn resolve_markdown_link(source_path: &str, target: &str, index: &DocumentIndex) -> Resolution {
    let clean = strip_fragment(target).replace("%20", " ");
    if clean.is_empty() {
        return Resolution::Unresolved;
    }
    let base = source_path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    let joined = if base.is_empty() {
        clean.clone()
    } else {
        format!("{}/{}", base, clean)
    };
    let Some(normalized) = normalize_relative(&joined) else {
        return Resolution::Unresolved;
    };

    if index.contains(&normalized) {
        return resolved(&normalized, MatchRule::Path);
    }
    let has_extension = normalized
        .rsplit('/')
        .next()
        .is_some_and(|name| name.contains('.'));
    if !has_extension {
        for ext in MARKDOWN_EXTENSIONS {
            let candidate = format!("{}.{}", normalized, ext);
            if index.contains(&candidate) {
                return resolved(&candidate, MatchRule::Path);
            }
        }
    }

    let file_name = clean.rsplit('/').next().unwrap_or(&clean);
    resolve_target(file_name, index)
}

fn resolved(path: &str, rule: MatchRule) -> Resolution {
    Resolution::Resolved {
        path: path.to_string(),
        rule,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkStatus {
    Resolved,
    Unresolved,
}

/// Directed edge. For unresolved edges `to` holds the raw target text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub kind: LinkKind,
    pub status: LinkStatus,
}

impl Edge {
    pub fn is_resolved(&self) -> bool {
        self.status == LinkStatus::Resolved
    }
}

/// Document graph. Backlinks are computed on demand from forward edges.
#[derive(Debug, Clone, Default)]
pub struct LinkGraph {
    nodes: Vec<String>,
    edges: Vec<Edge>,
}

impl LinkGraph {
    pub fn build(documents: &[SourceDocument]) -> Self {
        let index = DocumentIndex::from_documents(documents);

        let mut declared: BTreeMap<String, Vec<&str>> = BTreeMap::new();
        for doc in documents {
            for tag in doc.frontmatter.tags() {
                declared
                    .entry(normalize_tag(&tag))
                    .or_default()
                    .push(doc.path.as_str());
            }
        }

        let mut edges = Vec::new();
        let mut seen: HashSet<Edge> = HashSet::new();
        let mut push = |edge: Edge| {
            if seen.insert(edge.clone()) {
                edges.push(edge);
            }
        };

        // Tags used as a hashtag in one document and declared in another
        let mut shared_tags: BTreeSet<&str> = BTreeSet::new();

        for doc in documents {
            for link in &doc.outbound_links {
                match link.kind {
                    LinkKind::Wikilink => {
                        let resolution = resolve_target(&link.target, &index);
                        push(edge_for(&doc.path, &link.target, link.kind, resolution));
                    }
                    LinkKind::MarkdownLink => {
                        let resolution = resolve_markdown_link(&doc.path, &link.target, &index);
                        push(edge_for(&doc.path, &link.target, link.kind, resolution));
                    }
                    LinkKind::Tag => {
                        let declared_elsewhere = declared
                            .get(&link.target)
                            .is_some_and(|holders| holders.iter().any(|h| *h != doc.path));
                        if declared_elsewhere {
                            shared_tags.insert(link.target.as_str());
                        }
                    }
                }
            }
        }

        let tag_sets: Vec<(&str, BTreeSet<String>)> = documents
            .iter()
            .map(|d| (d.path.as_str(), d.tag_set()))
            .collect();
        for tag in shared_tags {
            let mut sharers: Vec<&str> = tag_sets
                .iter()
                .filter(|(_, tags)| tags.contains(tag))
                .map(|(path, _)| *path)
                .collect();
            sharers.sort_unstable();
            sharers.dedup();
            for (i, from) in sharers.iter().enumerate() {
                for to in &sharers[i + 1..] {
                    push(Edge {
                        from: from.to_string(),
                        to: to.to_string(),
                        kind: LinkKind::Tag,
                        status: LinkStatus::Resolved,
                    });
                }
            }
        }

        debug!(
            "Link graph: {} nodes, {} edges",
            documents.len(),
            edges.len()
        );

        Self {
            nodes: documents.iter().map(|d| d.path.clone()).collect(),
            edges,
        }
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edges_from<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.from == path)
    }

    /// Backlinks: resolved edges pointing at `path`.
    pub fn edges_into<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges
            .iter()
            .filter(move |e| e.is_resolved() && e.to == path)
    }

    pub fn count(&self, kind: LinkKind, status: LinkStatus) -> usize {
        self.edges
            .iter()
            .filter(|e| e.kind == kind && e.status == status)
            .count()
    }

    pub fn unresolved_count(&self) -> usize {
        self.edges.iter().filter(|e| !e.is_resolved()).count()
    }

    /// Edges per document; zero for an empty graph.
    pub fn link_density(&self) -> f64 {
        if self.nodes.is_empty() {
            0.0
        } else {
            self.edges.len() as f64 / self.nodes.len() as f64
        }
    }

    /// Documents with at least one non-tag backlink, most referenced first.
    pub fn most_referenced(&self, limit: usize) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = self
            .nodes
            .iter()
            .map(|node| {
                let n = self
                    .edges_into(node)
                    .filter(|e| e.kind != LinkKind::Tag)
                    .count();
                (node.clone(), n)
            })
            .filter(|(_, n)| *n > 0)
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts.truncate(limit);
        counts
    }
}

fn edge_for(from: &str, raw: &str, kind: LinkKind, resolution: Resolution) -> Edge {
    match resolution {
        Resolution::Resolved { path, .. } => Edge {
            from: from.to_string(),
            to: path,
            kind,
            status: LinkStatus::Resolved,
        },
        Resolution::Unresolved => Edge {
            from: from.to_string(),
            to: raw.to_string(),
            kind,
            status: LinkStatus::Unresolved,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(entries: &[(&str, Option<&str>)]) -> DocumentIndex {
        DocumentIndex::new(entries.iter().copied())
    }

    fn doc(path: &str, content: &str) -> SourceDocument {
        SourceDocument::from_content(path, content)
    }

    #[test]
    fn test_extract_wikilinks() {
        let links = extract_links("See [[Alpha]] and [[beta|the beta]] or [[gamma#intro]].");
        let targets: Vec<&str> = links.iter().map(|l| l.target.as_str()).collect();
        assert_eq!(targets, vec!["Alpha", "beta", "gamma"]);
        assert!(links.iter().all(|l| l.kind == LinkKind::Wikilink));
    }

    #[test]
    fn test_extract_hashtags_not_headings() {
        let links = extract_links("# Heading\n\nTagged #Governance and #dao/voting.\n## Sub\n");
        let tags: Vec<&str> = links
            .iter()
            .filter(|l| l.kind == LinkKind::Tag)
            .map(|l| l.target.as_str())
            .collect();
        assert_eq!(tags, vec!["governance", "dao/voting"]);
    }

    #[test]
    fn test_extract_hashtags_skip_urls_and_numbers() {
        let links = extract_links("Visit http://x.com/page#anchor, issue #42, word#mid.");
        assert!(links.iter().all(|l| l.kind != LinkKind::Tag));
    }

    #[test]
    fn test_extract_ignores_code() {
        let body = "Text [[real]]\n```\n[[fake]] #nottag\n```\nand `[[inline]]` #tag\n";
        let links = extract_links(body);
        let targets: Vec<&str> = links.iter().map(|l| l.target.as_str()).collect();
        assert_eq!(targets, vec!["real", "tag"]);
    }

    #[test]
    fn test_extract_markdown_links_relative_only() {
        let body = "[a](notes/a.md) [web](https://example.com) ![img](pic.png) [anchor](#top) [mail](mailto:x@y.z)";
        let links = extract_links(body);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].kind, LinkKind::MarkdownLink);
        assert_eq!(links[0].target, "notes/a.md");
    }

    #[test]
    fn test_extract_preserves_order_across_forms() {
        let links = extract_links("#first then [x](b.md) then [[c]]");
        let kinds: Vec<LinkKind> = links.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![LinkKind::Tag, LinkKind::MarkdownLink, LinkKind::Wikilink]
        );
    }

    #[test]
    fn test_resolve_filename_case_and_extension_insensitive() {
        let idx = index(&[("notes/Alpha.md", None), ("beta.mdx", None)]);
        assert_eq!(resolve_target("alpha", &idx).path(), Some("notes/Alpha.md"));
        assert_eq!(resolve_target("ALPHA.md", &idx).path(), Some("notes/Alpha.md"));
        assert_eq!(resolve_target("Beta", &idx).path(), Some("beta.mdx"));
        assert_eq!(resolve_target("notes/alpha", &idx).path(), Some("notes/Alpha.md"));
    }

    #[test]
    fn test_resolve_title_then_slug() {
        let idx = index(&[
            ("x1.md", Some("Token Engineering")),
            ("dao-governance.md", None),
        ]);
        assert_eq!(
            resolve_target("Token Engineering", &idx),
            Resolution::Resolved {
                path: "x1.md".to_string(),
                rule: MatchRule::Title
            }
        );
        assert_eq!(
            resolve_target("DAO Governance!", &idx),
            Resolution::Resolved {
                path: "dao-governance.md".to_string(),
                rule: MatchRule::Slug
            }
        );
        assert_eq!(
            resolve_target("token engineering", &idx),
            Resolution::Resolved {
                path: "x1.md".to_string(),
                rule: MatchRule::Slug
            }
        );
    }

    #[test]
    fn test_resolve_filename_beats_title() {
        let idx = index(&[("a.md", Some("b")), ("b.md", None)]);
        assert_eq!(resolve_target("b", &idx).path(), Some("b.md"));
    }

    #[test]
    fn test_resolve_tie_break_is_lexicographic() {
        // Insertion order must not matter
        let idx = index(&[("z/note.md", None), ("a/note.md", None), ("m/note.md", None)]);
        assert_eq!(resolve_target("note", &idx).path(), Some("a/note.md"));
    }

    #[test]
    fn test_resolve_unresolved() {
        let idx = index(&[("a.md", None)]);
        assert_eq!(resolve_target("missing", &idx), Resolution::Unresolved);
        assert_eq!(resolve_target("   ", &idx), Resolution::Unresolved);
    }

    #[test]
    fn test_resolve_markdown_link_relative_path() {
        let idx = index(&[("notes/a.md", None), ("b.md", None), ("notes/sub/c.md", None)]);
        assert_eq!(
            resolve_markdown_link("notes/x.md", "a.md", &idx).path(),
            Some("notes/a.md")
        );
        assert_eq!(
            resolve_markdown_link("notes/x.md", "../b.md#sec", &idx).path(),
            Some("b.md")
        );
        assert_eq!(
            resolve_markdown_link("notes/x.md", "sub/c", &idx).path(),
            Some("notes/sub/c.md")
        );
        assert_eq!(
            resolve_markdown_link("x.md", "../../out.md", &idx),
            Resolution::Unresolved
        );
    }

    #[test]
    fn test_graph_wikilink_edges() {
        let docs = vec![
            doc("a.md", "---\ntags: [gov]\n---\nA body"),
            doc("b.md", "---\ntags: [gov]\n---\nSee [[a]] and [[nowhere]]"),
        ];
        let graph = LinkGraph::build(&docs);
        assert_eq!(graph.nodes(), &["a.md".to_string(), "b.md".to_string()]);
        assert_eq!(graph.edges().len(), 2);
        assert_eq!(graph.count(LinkKind::Wikilink, LinkStatus::Resolved), 1);
        assert_eq!(graph.unresolved_count(), 1);

        let back: Vec<&Edge> = graph.edges_into("a.md").collect();
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].from, "b.md");

        let unresolved = graph.edges().iter().find(|e| !e.is_resolved()).unwrap();
        assert_eq!(unresolved.to, "nowhere");
    }

    #[test]
    fn test_graph_hashtag_links_every_doc_sharing_the_tag() {
        let docs = vec![
            doc("a.md", "---\ntags: [Gov]\n---\nbody"),
            doc("b.md", "---\ntags: [gov]\n---\nbody"),
            doc("c.md", "Mentions #gov and #orphan"),
            doc("d.md", "Also #gov"),
        ];
        let graph = LinkGraph::build(&docs);
        let tag_edges: Vec<String> = graph
            .edges()
            .iter()
            .filter(|e| e.kind == LinkKind::Tag)
            .map(|e| format!("{}->{}", e.from, e.to))
            .collect();
        assert_eq!(
            tag_edges,
            vec!["a.md->b.md", "a.md->c.md", "a.md->d.md", "b.md->c.md", "b.md->d.md", "c.md->d.md"]
        );
        assert!(graph.edges().iter().all(Edge::is_resolved));
        assert!(graph.nodes().iter().all(|n| !n.starts_with('#')));
    }

    #[test]
    fn test_graph_tags_without_hashtag_use_add_no_edges() {
        let docs = vec![
            doc("a.md", "---\ntags: [gov]\n---\nbody"),
            doc("b.md", "---\ntags: [gov]\n---\nbody"),
            doc("c.md", "Only #gov here, with #solo"),
            doc("d.md", "---\ntags: [solo]\n---\nMentions #solo itself"),
        ];
        let graph = LinkGraph::build(&docs);
        let tag_edges: Vec<String> = graph
            .edges()
            .iter()
            .filter(|e| e.kind == LinkKind::Tag)
            .map(|e| format!("{}->{}", e.from, e.to))
            .collect();
        assert_eq!(tag_edges, vec!["a.md->b.md", "a.md->c.md", "b.md->c.md", "c.md->d.md"]);

        let docs = vec![
            doc("a.md", "---\ntags: [gov]\n---\nbody"),
            doc("b.md", "---\ntags: [gov]\n---\nbody"),
        ];
        assert!(LinkGraph::build(&docs).edges().is_empty());
    }

    #[test]
    fn test_graph_dedups_repeated_links() {
        let docs = vec![doc("a.md", "x"), doc("b.md", "[[a]] [[a]] [[A]]")];
        let graph = LinkGraph::build(&docs);
        assert_eq!(graph.edges().len(), 1);
    }

    #[test]
    fn test_most_referenced_and_density() {
        let docs = vec![
            doc("a.md", "x"),
            doc("b.md", "[[a]]"),
            doc("c.md", "[[a]] [[b]]"),
        ];
        let graph = LinkGraph::build(&docs);
        assert_eq!(
            graph.most_referenced(5),
            vec![("a.md".to_string(), 2), ("b.md".to_string(), 1)]
        );
        assert!((graph.link_density() - 1.0).abs() < f64::EPSILON);
        assert_eq!(LinkGraph::default().link_density(), 0.0);
    }
}
