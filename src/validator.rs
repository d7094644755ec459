//! Structural checks for a skill bundle directory.
//!
//! Validation is read-only and never stops at the first problem: every rule
//! runs and the issues come back in a fixed order (frontmatter, body,
//! directory layout, references, reference cycles). A bundle is valid when no
//! issue has [`Severity::Error`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::ValidationConfig;
use crate::frontmatter::{self, FieldValue, Frontmatter};
use crate::packager::is_excluded;
use crate::pipeline::links::{
    extract_links, is_relative_target, resolve_target, strip_fragment, DocumentIndex, LinkKind,
    MARKDOWN_LINK_RE,
};
use crate::util::{
    floor_char_boundary, mask_code_fences, normalize_relative, to_slash_path, validate_skill_name,
};

/// Left in scaffolded descriptions; a bundle carrying it cannot be packaged.
pub const PLACEHOLDER_MARKER: &str = "[REPLACE BEFORE PACKAGING]";

pub const SKILL_FILE: &str = "SKILL.md";

pub const CONVENTIONAL_DIRS: [&str; 3] = ["scripts", "references", "assets"];

/// Sections a SKILL.md body is expected to carry, matched against heading text.
pub const RECOMMENDED_SECTIONS: [&str; 3] = ["Purpose", "Capabilities", "Usage"];

static TODO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[TODO[:\]]").expect("valid todo regex"));

static SECOND_PERSON_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:^|[.!?:]\s+)(?:[-*+]\s+|\d+[.)]\s+|>\s*)?(?:\*\*|_)?you\s+(?:should|must|can)\b",
    )
    .expect("valid second-person regex")
});

static BACKTICK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`([^`\s]+)`").expect("valid backtick regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,   // Blocks packaging
    Warning, // Should fix
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    /// Offending file relative to the bundle root
    pub path: Option<String>,
    pub message: String,
    pub rule_id: &'static str,
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    fn error(rule_id: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            path: None,
            message: message.into(),
            rule_id,
            suggestion: None,
        }
    }

    fn warning(rule_id: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(rule_id, message)
        }
    }

    fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// True when no issue is an error.
pub fn is_valid(issues: &[ValidationIssue]) -> bool {
    !issues.iter().any(ValidationIssue::is_error)
}

pub struct StructureValidator {
    config: ValidationConfig,
}

impl Default for StructureValidator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

impl StructureValidator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn validate(&self, bundle: &Path) -> Vec<ValidationIssue> {
        debug!("Validating bundle at {}", bundle.display());
        let mut issues = Vec::new();

        let body = self.check_skill_md(bundle, &mut issues);
        issues.extend(check_layout(bundle));
        if let Some(body) = &body {
            issues.extend(check_references(bundle, body));
        }
        issues.extend(self.check_reference_cycles(bundle));

        debug!(
            "Validation found {} issues ({} errors)",
            issues.len(),
            issues.iter().filter(|i| i.is_error()).count()
        );
        issues
    }

    /// Frontmatter and body rules. Returns the body when SKILL.md could be read.
    fn check_skill_md(&self, bundle: &Path, issues: &mut Vec<ValidationIssue>) -> Option<String> {
        let skill_md = bundle.join(SKILL_FILE);
        if !skill_md.is_file() {
            issues.push(
                ValidationIssue::error(
                    "skill-md-missing",
                    format!("{} not found at {}", SKILL_FILE, skill_md.display()),
                )
                .suggest("Create one with `skillsmith init <name>`"),
            );
            return None;
        }

        let content = match fs::read(&skill_md) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                issues.push(
                    ValidationIssue::error(
                        "frontmatter-invalid",
                        format!("Could not read {}: {}", SKILL_FILE, e),
                    )
                    .at(SKILL_FILE),
                );
                return None;
            }
        };

        let parsed = frontmatter::parse(&content);
        if !parsed.has_block || !parsed.warnings.is_empty() {
            let detail = parsed
                .warnings
                .first()
                .map(|w| w.message.clone())
                .unwrap_or_else(|| {
                    format!("{} must begin with YAML frontmatter (---)", SKILL_FILE)
                });
            issues.push(
                ValidationIssue::error("frontmatter-invalid", detail)
                    .at(SKILL_FILE)
                    .suggest("Start the file with a '---' block containing name and description"),
            );
        } else {
            issues.extend(self.check_frontmatter(&parsed.frontmatter));
        }

        let body_line = line_offset(&content, &parsed.body);
        issues.extend(self.check_body(&parsed.body, body_line));
        Some(parsed.body)
    }

    fn check_frontmatter(&self, fm: &Frontmatter) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        match fm.get("name") {
            None => issues.push(
                ValidationIssue::error(
                    "name-format",
                    "Required frontmatter field 'name' is missing",
                )
                .at(SKILL_FILE),
            ),
            Some(FieldValue::Text(name)) => {
                if let Err(reason) = validate_skill_name(name) {
                    issues.push(
                        ValidationIssue::error(
                            "name-format",
                            format!("Field 'name' is invalid: {}", reason),
                        )
                        .at(SKILL_FILE)
                        .suggest("Use lowercase letters, digits and hyphens (max 64 characters)"),
                    );
                }
                if name.to_lowercase().contains("todo") {
                    issues.push(
                        ValidationIssue::warning(
                            "name-placeholder",
                            "Field 'name' appears to contain a TODO placeholder",
                        )
                        .at(SKILL_FILE)
                        .suggest("Pick the final skill name before packaging"),
                    );
                }
            }
            Some(_) => issues.push(
                ValidationIssue::error("name-format", "Field 'name' must be a string")
                    .at(SKILL_FILE),
            ),
        }

        match fm.get("description") {
            None => issues.push(
                ValidationIssue::error(
                    "description-length",
                    "Required frontmatter field 'description' is missing",
                )
                .at(SKILL_FILE),
            ),
            Some(FieldValue::Text(description)) => {
                let len = description.chars().count();
                if description.trim().is_empty() {
                    issues.push(
                        ValidationIssue::error(
                            "description-length",
                            "Field 'description' cannot be empty",
                        )
                        .at(SKILL_FILE),
                    );
                } else if len > self.config.max_description_chars {
                    issues.push(
                        ValidationIssue::error(
                            "description-length",
                            format!(
                                "Field 'description' must be {} characters or less (currently {})",
                                self.config.max_description_chars, len
                            ),
                        )
                        .at(SKILL_FILE),
                    );
                }
                if description.contains(PLACEHOLDER_MARKER) || description.contains("[TODO") {
                    issues.push(
                        ValidationIssue::error(
                            "description-placeholder",
                            "Field 'description' still contains a placeholder",
                        )
                        .at(SKILL_FILE)
                        .suggest("Describe what the skill does and when to use it"),
                    );
                }
            }
            Some(_) => issues.push(
                ValidationIssue::error("description-length", "Field 'description' must be a string")
                    .at(SKILL_FILE),
            ),
        }

        if let Some(tools) = fm.get("allowed-tools") {
            if !tools.is_list() {
                issues.push(
                    ValidationIssue::error(
                        "allowed-tools-type",
                        "Field 'allowed-tools' must be a list",
                    )
                    .at(SKILL_FILE)
                    .suggest("allowed-tools: [Read, Grep]"),
                );
            }
        }

        issues
    }

    /// `first_line` is the 1-based line of SKILL.md where the body starts.
    fn check_body(&self, body: &str, first_line: usize) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        let todos = TODO_RE.find_iter(body).count();
        if todos > 0 {
            issues.push(
                ValidationIssue::warning(
                    "body-placeholder",
                    format!("Found {} TODO placeholder(s) in content", todos),
                )
                .at(SKILL_FILE),
            );
        }

        let words = body.split_whitespace().count();
        if words > self.config.max_body_words {
            issues.push(
                ValidationIssue::warning(
                    "body-length",
                    format!(
                        "{} body is {} words (recommended: under {})",
                        SKILL_FILE, words, self.config.max_body_words
                    ),
                )
                .at(SKILL_FILE)
                .suggest("Move detailed content to references/"),
            );
        }

        let masked = mask_code_fences(body);
        let headings: Vec<String> = masked
            .lines()
            .filter(|l| l.trim_start().starts_with('#'))
            .map(str::to_lowercase)
            .collect();
        for section in RECOMMENDED_SECTIONS {
            let needle = section.to_lowercase();
            if !headings.iter().any(|h| h.contains(&needle)) {
                issues.push(
                    ValidationIssue::warning(
                        "recommended-section",
                        format!("Recommended section '{}' not found in content", section),
                    )
                    .at(SKILL_FILE)
                    .suggest(format!("Add a '## {}' section", section)),
                );
            }
        }

        if !masked.lines().any(is_token_budget_line) {
            issues.push(
                ValidationIssue::warning(
                    "token-budget-missing",
                    "No token budget documentation found",
                )
                .at(SKILL_FILE)
                .suggest("Add a 'Token Budget' section or table with estimated token costs"),
            );
        }

        for (i, line) in masked.lines().enumerate() {
            if SECOND_PERSON_RE.is_match(line) {
                issues.push(
                    ValidationIssue::warning(
                        "second-person",
                        format!("Line {}: second-person instruction", first_line + i),
                    )
                    .at(SKILL_FILE)
                    .suggest("Use imperative form (e.g. 'To accomplish X, do Y')"),
                );
            }
        }

        issues
    }

    /// One warning per group of mutually reachable reference files whose
    /// shortest loop through its smallest member fits in `max_reference_depth`.
    fn check_reference_cycles(&self, bundle: &Path) -> Vec<ValidationIssue> {
        let graph = reference_graph(bundle);
        let mut issues = Vec::new();
        for component in strongly_connected(&graph) {
            let Some(cycle) = shortest_cycle(&graph, &component) else {
                continue;
            };
            if cycle.len() - 1 > self.config.max_reference_depth {
                debug!("Skipping reference cycle of {} hops", cycle.len() - 1);
                continue;
            }
            issues.push(
                ValidationIssue::warning(
                    "reference-cycle",
                    format!("Reference cycle among {}", component.join(", ")),
                )
                .at(component[0])
                .suggest(format!("Break the loop {}", cycle.join(" → "))),
            );
        }
        issues
    }
}

/// 1-based line number of the first body line inside `content`.
fn line_offset(content: &str, body: &str) -> usize {
    let prefix_len = floor_char_boundary(content, content.len().saturating_sub(body.len()));
    content[..prefix_len].matches('\n').count() + 1
}

fn is_token_budget_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    if !lower.contains("token") {
        return false;
    }
    let trimmed = lower.trim_start();
    trimmed.starts_with('#')
        || trimmed.starts_with('|')
        || trimmed.chars().any(|c| c.is_ascii_digit())
}

fn check_layout(bundle: &Path) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if !CONVENTIONAL_DIRS.iter().any(|d| bundle.join(d).is_dir()) {
        issues.push(
            ValidationIssue::warning(
                "conventional-dirs",
                "No conventional directories found (scripts/, references/, assets/)",
            )
            .suggest("Optional, but recommended for organizing supporting files"),
        );
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        for file in files_under(&bundle.join("scripts")) {
            let executable = fs::metadata(&file)
                .map(|m| m.permissions().mode() & 0o111 != 0)
                .unwrap_or(true);
            if !executable {
                let rel = relative_to(bundle, &file);
                issues.push(
                    ValidationIssue::warning(
                        "script-not-executable",
                        format!("Script {} is not executable", rel),
                    )
                    .at(rel.clone())
                    .suggest(format!("chmod +x {}", rel)),
                );
            }
        }
    }

    issues
}

/// Relative paths referenced from `body`: markdown link targets and backtick spans.
fn referenced_paths(body: &str) -> Vec<String> {
    let masked = mask_code_fences(body);
    let mut found: Vec<(usize, String)> = Vec::new();

    for caps in MARKDOWN_LINK_RE.captures_iter(&masked) {
        if let (Some(whole), Some(target)) = (caps.get(0), caps.get(2)) {
            if is_relative_target(target.as_str()) {
                found.push((whole.start(), target.as_str().to_string()));
            }
        }
    }

    for caps in BACKTICK_RE.captures_iter(&masked) {
        let Some(span) = caps.get(1) else {
            continue;
        };
        if looks_like_bundle_path(span.as_str()) {
            found.push((span.start(), span.as_str().to_string()));
        }
    }

    found.sort_by_key(|(pos, _)| *pos);
    let mut seen = HashSet::new();
    found
        .into_iter()
        .map(|(_, p)| strip_fragment(&p).to_string())
        .filter(|p| !p.is_empty() && seen.insert(p.clone()))
        .collect()
}

fn looks_like_bundle_path(span: &str) -> bool {
    if !span.contains('/') || !is_relative_target(span) {
        return false;
    }
    if span.contains(['*', '<', '>', '{', '}', '$']) {
        return false;
    }
    let first = span.split('/').next().unwrap_or("");
    first == "." || first == ".." || CONVENTIONAL_DIRS.contains(&first)
}

fn check_references(bundle: &Path, body: &str) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for reference in referenced_paths(body) {
        let Some(normalized) = normalize_relative(&reference.replace("%20", " ")) else {
            issues.push(
                ValidationIssue::warning(
                    "reference-escapes-bundle",
                    format!("Referenced path leaves the bundle: {}", reference),
                )
                .at(SKILL_FILE),
            );
            continue;
        };
        let top = normalized.split('/').next().unwrap_or("");
        if CONVENTIONAL_DIRS.contains(&top) && !is_packaged(bundle, &normalized) {
            issues.push(
                ValidationIssue::error(
                    "reference-missing",
                    format!("Referenced file not found: {}", reference),
                )
                .at(SKILL_FILE)
                .suggest(format!("Create {} or remove the reference", normalized)),
            );
        }
    }
    issues
}

/// True when `rel` ends up in the archive: no excluded segment, real
/// directories along the way and a regular file or directory at the end.
fn is_packaged(bundle: &Path, rel: &str) -> bool {
    let segments: Vec<&str> = rel.split('/').collect();
    if segments.iter().any(|s| is_excluded(s)) {
        return false;
    }
    let mut path = bundle.to_path_buf();
    for (i, segment) in segments.iter().enumerate() {
        path.push(segment);
        let Ok(meta) = fs::symlink_metadata(&path) else {
            return false;
        };
        let last = i + 1 == segments.len();
        if !(meta.is_dir() || (last && meta.is_file())) {
            return false;
        }
    }
    true
}

/// Edges between markdown files under `references/`, keyed by bundle-relative path.
fn reference_graph(bundle: &Path) -> BTreeMap<String, BTreeSet<String>> {
    let files: Vec<String> = files_under(&bundle.join("references"))
        .into_iter()
        .map(|f| relative_to(bundle, &f))
        .filter(|p| p.ends_with(".md") || p.ends_with(".markdown") || p.ends_with(".mdx"))
        .collect();
    let known: BTreeSet<&str> = files.iter().map(String::as_str).collect();
    let index = DocumentIndex::new(files.iter().map(|p| (p.as_str(), None)));

    let mut graph: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for file in &files {
        let Ok(bytes) = fs::read(bundle.join(file)) else {
            continue;
        };
        let body = frontmatter::parse(&String::from_utf8_lossy(&bytes)).body;
        let dir = file.rsplit_once('/').map(|(d, _)| d).unwrap_or("");

        let mut targets = BTreeSet::new();
        for link in extract_links(&body) {
            let target = match link.kind {
                LinkKind::Wikilink => {
                    resolve_target(&link.target, &index).path().map(str::to_string)
                }
                LinkKind::MarkdownLink => {
                    let clean = strip_fragment(&link.target);
                    let is_known = |p: &String| known.contains(p.as_str());
                    normalize_relative(&format!("{}/{}", dir, clean))
                        .filter(is_known)
                        .or_else(|| normalize_relative(clean).filter(is_known))
                }
                LinkKind::Tag => None,
            };
            targets.extend(target);
        }
        for path in referenced_paths(&body) {
            if let Some(p) = normalize_relative(&path).filter(|p| known.contains(p.as_str())) {
                targets.insert(p);
            }
        }
        targets.remove(file);
        graph.insert(file.clone(), targets);
    }
    graph
}

/// Strongly connected components with more than one file, members sorted,
/// components ordered by their smallest member. Iterative Tarjan.
fn strongly_connected(graph: &BTreeMap<String, BTreeSet<String>>) -> Vec<Vec<&str>> {
    const UNVISITED: usize = usize::MAX;

    let nodes: Vec<&str> = graph.keys().map(String::as_str).collect();
    let position: BTreeMap<&str, usize> = nodes.iter().enumerate().map(|(i, n)| (*n, i)).collect();
    let adjacency: Vec<Vec<usize>> = graph
        .values()
        .map(|targets| targets.iter().filter_map(|t| position.get(t.as_str()).copied()).collect())
        .collect();

    let mut index = vec![UNVISITED; nodes.len()];
    let mut low = vec![0; nodes.len()];
    let mut on_stack = vec![false; nodes.len()];
    let mut stack = Vec::new();
    let mut counter = 0;
    let mut components = Vec::new();

    for root in 0..nodes.len() {
        if index[root] != UNVISITED {
            continue;
        }
        index[root] = counter;
        low[root] = counter;
        counter += 1;
        stack.push(root);
        on_stack[root] = true;
        let mut work = vec![(root, 0usize)];

        while let Some((v, next)) = work.last().copied() {
            if let Some(&w) = adjacency[v].get(next) {
                if let Some(frame) = work.last_mut() {
                    frame.1 += 1;
                }
                if index[w] == UNVISITED {
                    index[w] = counter;
                    low[w] = counter;
                    counter += 1;
                    stack.push(w);
                    on_stack[w] = true;
                    work.push((w, 0));
                } else if on_stack[w] {
                    low[v] = low[v].min(index[w]);
                }
                continue;
            }

            work.pop();
            if let Some(&(parent, _)) = work.last() {
                low[parent] = low[parent].min(low[v]);
            }
            if low[v] == index[v] {
                let mut component = Vec::new();
                while let Some(w) = stack.pop() {
                    on_stack[w] = false;
                    component.push(nodes[w]);
                    if w == v {
                        break;
                    }
                }
                if component.len() > 1 {
                    component.sort_unstable();
                    components.push(component);
                }
            }
        }
    }

    components.sort();
    components
}

/// Shortest loop from the component's first member back to itself, staying
/// inside the component. BFS visits targets in sorted order, so ties resolve
/// lexicographically.
fn shortest_cycle<'a>(
    graph: &'a BTreeMap<String, BTreeSet<String>>,
    component: &[&'a str],
) -> Option<Vec<&'a str>> {
    let start = *component.first()?;
    let members: BTreeSet<&str> = component.iter().copied().collect();
    let mut parent: BTreeMap<&str, &str> = BTreeMap::new();
    let mut queue = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        for target in graph.get(current).into_iter().flatten() {
            let target = target.as_str();
            if target == start {
                let mut cycle = vec![start, current];
                let mut node = current;
                while let Some(&prev) = parent.get(node) {
                    cycle.push(prev);
                    node = prev;
                }
                cycle.reverse();
                return Some(cycle);
            }
            if members.contains(target) && !parent.contains_key(target) {
                parent.insert(target, current);
                queue.push_back(target);
            }
        }
    }
    None
}

/// Regular files below `dir`, sorted, skipping entries packaging leaves out.
fn files_under(dir: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let Ok(entries) = fs::read_dir(dir) else {
        return out;
    };
    let mut entries: Vec<PathBuf> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
    entries.sort();
    for path in entries {
        let excluded = path
            .file_name()
            .map(|n| is_excluded(&n.to_string_lossy()))
            .unwrap_or(false);
        if excluded {
            continue;
        }
        if path.is_dir() {
            out.extend(files_under(&path));
        } else if path.is_file() {
            out.push(path);
        }
    }
    out
}

fn relative_to(root: &Path, path: &Path) -> String {
    to_slash_path(path.strip_prefix(root).unwrap_or(path))
}

/// Print issues grouped by severity with a summary line.
pub fn print_issues(issues: &[ValidationIssue]) {
    if issues.is_empty() {
        println!("✅ All checks passed! Skill is valid.");
        return;
    }

    println!("\n📋 Skill Validation Results:\n");

    let errors: Vec<_> = issues.iter().filter(|i| i.severity == Severity::Error).collect();
    let warnings: Vec<_> = issues.iter().filter(|i| i.severity == Severity::Warning).collect();

    if !errors.is_empty() {
        println!("❌ Errors ({}):", errors.len());
        print_group(&errors);
    }

    if !warnings.is_empty() {
        println!("⚠️  Warnings ({}):", warnings.len());
        print_group(&warnings);
    }

    println!("Summary: {} errors, {} warnings", errors.len(), warnings.len());
}

fn print_group(issues: &[&ValidationIssue]) {
    for issue in issues {
        match &issue.path {
            Some(path) => println!("   • [{}] {}: {}", issue.rule_id, path, issue.message),
            None => println!("   • [{}] {}", issue.rule_id, issue.message),
        }
        if let Some(suggestion) = &issue.suggestion {
            println!("     💡 {}", suggestion);
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CLEAN_BODY: &str = "# Demo

## Purpose

Answers questions about demos.

## Core Capabilities

- Look up demo facts

## Usage

Ask about a demo by name.

## Token Budget

| Item | Tokens |
|---|---|
| Body | ~300 |
";

    fn bundle(skill_md: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SKILL_FILE), skill_md).unwrap();
        fs::create_dir_all(dir.path().join("references")).unwrap();
        dir
    }

    fn skill(frontmatter: &str, body: &str) -> String {
        format!("---\n{}\n---\n{}", frontmatter, body)
    }

    fn rules(issues: &[ValidationIssue]) -> Vec<&'static str> {
        issues.iter().map(|i| i.rule_id).collect()
    }

    fn validate(dir: &TempDir) -> Vec<ValidationIssue> {
        StructureValidator::default().validate(dir.path())
    }

    #[test]
    fn test_clean_bundle_has_no_issues() {
        let dir = bundle(&skill(
            "name: demo\ndescription: Answers questions about demos.",
            CLEAN_BODY,
        ));
        let issues = validate(&dir);
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
        assert!(is_valid(&issues));
    }

    #[test]
    fn test_missing_skill_md() {
        let dir = TempDir::new().unwrap();
        let issues = validate(&dir);
        assert_eq!(rules(&issues), vec!["skill-md-missing", "conventional-dirs"]);
        assert!(!is_valid(&issues));
    }

    #[test]
    fn test_missing_skill_md_still_checks_references() {
        let dir = TempDir::new().unwrap();
        let refs = dir.path().join("references");
        fs::create_dir_all(&refs).unwrap();
        fs::write(refs.join("a.md"), "See [[b]]").unwrap();
        fs::write(refs.join("b.md"), "See [[a]]").unwrap();

        let issues = validate(&dir);
        assert_eq!(rules(&issues), vec!["skill-md-missing", "reference-cycle"]);
        assert_eq!(issues[1].path.as_deref(), Some("references/a.md"));
    }

    #[test]
    fn test_missing_frontmatter() {
        let dir = bundle(&format!("no frontmatter here\n{}", CLEAN_BODY));
        let issues = validate(&dir);
        assert_eq!(rules(&issues), vec!["frontmatter-invalid"]);
    }

    #[test]
    fn test_invalid_yaml_frontmatter() {
        let dir = bundle(&skill("name: [unclosed", CLEAN_BODY));
        let issues = validate(&dir);
        assert_eq!(rules(&issues), vec!["frontmatter-invalid"]);
        assert!(issues[0].message.contains("YAML"));
    }

    #[test]
    fn test_uppercase_name_is_single_error() {
        let dir = bundle(&skill("name: Demo-Skill\ndescription: Fine.", CLEAN_BODY));
        let issues = validate(&dir);
        let errors: Vec<_> = issues.iter().filter(|i| i.is_error()).collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].rule_id, "name-format");
        assert!(errors[0].message.contains("uppercase"));
    }

    #[test]
    fn test_name_rules() {
        let long = "a".repeat(65);
        for fm in [
            "description: x".to_string(),
            "name: 42\ndescription: x".to_string(),
            format!("name: {}\ndescription: x", long),
            "name: my_skill\ndescription: x".to_string(),
        ] {
            let dir = bundle(&skill(&fm, CLEAN_BODY));
            assert_eq!(rules(&validate(&dir)), vec!["name-format"], "for {}", fm);
        }
    }

    #[test]
    fn test_description_rules() {
        let dir = bundle(&skill("name: demo", CLEAN_BODY));
        assert_eq!(rules(&validate(&dir)), vec!["description-length"]);

        let dir = bundle(&skill("name: demo\ndescription: '   '", CLEAN_BODY));
        assert_eq!(rules(&validate(&dir)), vec!["description-length"]);

        let long = "x".repeat(1025);
        let dir = bundle(&skill(&format!("name: demo\ndescription: {}", long), CLEAN_BODY));
        assert_eq!(rules(&validate(&dir)), vec!["description-length"]);

        let dir = bundle(&skill(
            &format!("name: demo\ndescription: \"{} Explain it.\"", PLACEHOLDER_MARKER),
            CLEAN_BODY,
        ));
        assert_eq!(rules(&validate(&dir)), vec!["description-placeholder"]);

        let dir = bundle(&skill("name: demo\ndescription: \"[TODO: describe]\"", CLEAN_BODY));
        assert_eq!(rules(&validate(&dir)), vec!["description-placeholder"]);
    }

    #[test]
    fn test_allowed_tools_must_be_list() {
        let dir = bundle(&skill("name: demo\ndescription: ok\nallowed-tools: Read", CLEAN_BODY));
        assert_eq!(rules(&validate(&dir)), vec!["allowed-tools-type"]);

        let dir = bundle(&skill(
            "name: demo\ndescription: ok\nallowed-tools: [Read, Grep]",
            CLEAN_BODY,
        ));
        assert!(validate(&dir).is_empty());
    }

    #[test]
    fn test_warnings_only_is_valid() {
        let body =
            "# Demo\n\nYou should read this.\nThen you must act. You can relax.\n[TODO: fill]\n";
        let dir = bundle(&skill("name: demo\ndescription: ok", body));
        let issues = validate(&dir);
        assert!(is_valid(&issues));
        assert_eq!(
            rules(&issues),
            vec![
                "body-placeholder",
                "recommended-section",
                "recommended-section",
                "recommended-section",
                "token-budget-missing",
                "second-person",
                "second-person"
            ]
        );
        let issues: Vec<_> = issues
            .into_iter()
            .filter(|i| i.rule_id != "recommended-section")
            .collect();
        assert!(issues[2].message.contains("Line 7"));
        assert!(issues[3].message.contains("Line 8"));
    }

    #[test]
    fn test_second_person_ignores_code_and_mid_sentence() {
        let body = format!(
            "{}\nThings you should know are listed.\n```\nYou should not flag this\n```\n",
            CLEAN_BODY
        );
        let dir = bundle(&skill("name: demo\ndescription: ok", &body));
        assert!(validate(&dir).is_empty());
    }

    #[test]
    fn test_recommended_sections_match_headings() {
        let body = "# Demo\n\n## Core Capabilities\n\n\
                    Purpose and usage are mentioned in prose only.\n\n\
                    ## Token Budget\n\n| Body | ~100 |\n";
        let dir = bundle(&skill("name: demo\ndescription: ok", body));
        let issues = validate(&dir);
        assert_eq!(rules(&issues), vec!["recommended-section", "recommended-section"]);
        assert!(issues[0].message.contains("'Purpose'"));
        assert!(issues[1].message.contains("'Usage'"));
        assert!(is_valid(&issues));
    }

    #[test]
    fn test_name_placeholder_warning() {
        let dir = bundle(&skill("name: todo-skill\ndescription: ok", CLEAN_BODY));
        let issues = validate(&dir);
        assert_eq!(rules(&issues), vec!["name-placeholder"]);
        assert!(is_valid(&issues));

        let dir = bundle(&skill("name: TODO\ndescription: ok", CLEAN_BODY));
        assert_eq!(rules(&validate(&dir)), vec!["name-format", "name-placeholder"]);
    }

    #[test]
    fn test_token_budget_detection() {
        assert!(is_token_budget_line("## Token Budget"));
        assert!(is_token_budget_line("| SKILL.md | ~200 tokens |"));
        assert!(is_token_budget_line("Loads about 500 tokens."));
        assert!(!is_token_budget_line("Tokens are mentioned but not measured."));
    }

    #[test]
    fn test_body_length_warning() {
        let body = format!("{}\n{}", CLEAN_BODY, "word ".repeat(20));
        let dir = bundle(&skill("name: demo\ndescription: ok", &body));
        let config = ValidationConfig {
            max_body_words: 10,
            ..ValidationConfig::default()
        };
        let issues = StructureValidator::new(config).validate(dir.path());
        assert_eq!(rules(&issues), vec!["body-length"]);
    }

    #[test]
    fn test_conventional_dirs_warning() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(SKILL_FILE),
            skill("name: demo\ndescription: ok", CLEAN_BODY),
        )
        .unwrap();
        assert_eq!(rules(&validate(&dir)), vec!["conventional-dirs"]);
    }

    #[test]
    fn test_missing_and_escaping_references() {
        let body = format!(
            "{}\nSee [guide](references/guide.md), `references/missing.md`, [up](../outside.md) and `scripts/*.py`.\n",
            CLEAN_BODY
        );
        let dir = bundle(&skill("name: demo\ndescription: ok", &body));
        fs::write(dir.path().join("references/guide.md"), "# Guide").unwrap();

        let issues = validate(&dir);
        assert_eq!(rules(&issues), vec!["reference-missing", "reference-escapes-bundle"]);
        assert!(issues[0].message.contains("references/missing.md"));
        assert!(issues[0].is_error());
        assert!(!issues[1].is_error());
    }

    #[test]
    fn test_references_in_code_fences_ignored() {
        let body = format!(
            "{}\n```\ncat references/nothing.md\n`references/nothing.md`\n```\n",
            CLEAN_BODY
        );
        let dir = bundle(&skill("name: demo\ndescription: ok", &body));
        assert!(validate(&dir).is_empty());
    }

    #[test]
    fn test_reference_cycle_reported_once() {
        let dir = bundle(&skill("name: demo\ndescription: ok", CLEAN_BODY));
        let refs = dir.path().join("references");
        fs::write(refs.join("a.md"), "See also [[b]]").unwrap();
        fs::write(refs.join("b.md"), "See also [c](c.md)").unwrap();
        fs::write(refs.join("c.md"), "Back to `references/a.md` and [[c]]").unwrap();
        fs::write(refs.join("d.md"), "Points at [[a]] only").unwrap();

        let issues = validate(&dir);
        assert_eq!(rules(&issues), vec!["reference-cycle"]);
        assert_eq!(
            issues[0].message,
            "Reference cycle among references/a.md, references/b.md, references/c.md"
        );
        assert_eq!(
            issues[0].suggestion.as_deref(),
            Some(
                "Break the loop references/a.md → references/b.md → references/c.md \
                 → references/a.md"
            )
        );
        assert!(is_valid(&issues));
    }

    #[test]
    fn test_densely_linked_references_give_one_cycle() {
        let dir = bundle(&skill("name: demo\ndescription: ok", CLEAN_BODY));
        let refs = dir.path().join("references");
        let names: Vec<String> = (0..14).map(|i| format!("r{:02}", i)).collect();
        for name in &names {
            let links: Vec<String> = names
                .iter()
                .filter(|other| *other != name)
                .map(|other| format!("[[{}]]", other))
                .collect();
            fs::write(refs.join(format!("{}.md", name)), links.join(" ")).unwrap();
        }

        let issues = validate(&dir);
        assert_eq!(rules(&issues), vec!["reference-cycle"]);
        assert!(issues[0].message.starts_with("Reference cycle among references/r00.md, "));
        assert!(issues[0].message.ends_with("references/r13.md"));
        assert_eq!(
            issues[0].suggestion.as_deref(),
            Some("Break the loop references/r00.md → references/r01.md → references/r00.md")
        );
    }

    #[test]
    fn test_separate_cycles_reported_separately() {
        let dir = bundle(&skill("name: demo\ndescription: ok", CLEAN_BODY));
        let refs = dir.path().join("references");
        fs::write(refs.join("a.md"), "[[b]]").unwrap();
        fs::write(refs.join("b.md"), "[[a]] then [[c]]").unwrap();
        fs::write(refs.join("c.md"), "[[d]]").unwrap();
        fs::write(refs.join("d.md"), "[[c]]").unwrap();

        let issues = validate(&dir);
        let messages: Vec<&str> = issues.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Reference cycle among references/a.md, references/b.md",
                "Reference cycle among references/c.md, references/d.md"
            ]
        );
    }

    #[test]
    fn test_reference_cycle_depth_limit() {
        let dir = bundle(&skill("name: demo\ndescription: ok", CLEAN_BODY));
        let refs = dir.path().join("references");
        fs::write(refs.join("a.md"), "[[b]]").unwrap();
        fs::write(refs.join("b.md"), "[[c]]").unwrap();
        fs::write(refs.join("c.md"), "[[a]]").unwrap();

        let config = ValidationConfig {
            max_reference_depth: 2,
            ..ValidationConfig::default()
        };
        assert!(StructureValidator::new(config).validate(dir.path()).is_empty());

        let config = ValidationConfig {
            max_reference_depth: 3,
            ..ValidationConfig::default()
        };
        let issues = StructureValidator::new(config).validate(dir.path());
        assert_eq!(rules(&issues), vec!["reference-cycle"]);
    }

    #[test]
    fn test_references_to_unpackaged_files_are_missing() {
        let body = format!(
            "{}\nSee `references/.draft.md`, `scripts/__pycache__/run.cpython-311.pyc` \
             and [notes](references/notes.md).\n",
            CLEAN_BODY
        );
        let dir = bundle(&skill("name: demo\ndescription: ok", &body));
        let refs = dir.path().join("references");
        fs::write(refs.join(".draft.md"), "hidden").unwrap();
        fs::create_dir_all(dir.path().join("scripts/__pycache__")).unwrap();
        fs::write(dir.path().join("scripts/__pycache__/run.cpython-311.pyc"), "").unwrap();
        fs::write(refs.join("notes.md"), "# Notes").unwrap();

        let issues = validate(&dir);
        assert_eq!(rules(&issues), vec!["reference-missing", "reference-missing"]);
        assert!(issues[0].message.contains("references/.draft.md"));
        assert!(issues[1].message.contains("run.cpython-311.pyc"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_reference_is_missing() {
        let body = format!("{}\nSee [linked](references/linked.md).\n", CLEAN_BODY);
        let dir = bundle(&skill("name: demo\ndescription: ok", &body));
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("real.md"), "# Real").unwrap();
        std::os::unix::fs::symlink(
            outside.path().join("real.md"),
            dir.path().join("references/linked.md"),
        )
        .unwrap();

        let issues = validate(&dir);
        assert_eq!(rules(&issues), vec!["reference-missing"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_script_not_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = bundle(&skill("name: demo\ndescription: ok", CLEAN_BODY));
        let scripts = dir.path().join("scripts");
        fs::create_dir_all(&scripts).unwrap();
        fs::write(scripts.join("run.sh"), "#!/bin/sh\n").unwrap();
        fs::set_permissions(scripts.join("run.sh"), fs::Permissions::from_mode(0o644)).unwrap();
        fs::write(scripts.join("ok.sh"), "#!/bin/sh\n").unwrap();
        fs::set_permissions(scripts.join("ok.sh"), fs::Permissions::from_mode(0o755)).unwrap();

        let issues = validate(&dir);
        assert_eq!(rules(&issues), vec!["script-not-executable"]);
        assert_eq!(issues[0].path.as_deref(), Some("scripts/run.sh"));
    }

    #[test]
    fn test_line_offset() {
        let content = "---\nname: x\n---\nbody\nmore";
        let parsed = frontmatter::parse(content);
        assert_eq!(line_offset(content, &parsed.body), 4);
    }
}
