//! Shared utilities for the skillsmith codebase

use std::path::{Component, Path};

/// Longest skill name accepted by the bundle contract.
pub const MAX_SKILL_NAME_LEN: usize = 64;

/// Validate a skill name against `^[a-z0-9-]{1,64}$`.
/// Returns the offending reason so callers can surface it verbatim.
pub fn validate_skill_name(name: &str) -> Result<&str, String> {
    if name.is_empty() {
        return Err("name is empty".to_string());
    }
    let len = name.chars().count();
    if len > MAX_SKILL_NAME_LEN {
        return Err(format!(
            "name must be {} characters or less (currently {})",
            MAX_SKILL_NAME_LEN, len
        ));
    }
    for ch in name.chars() {
        match ch {
            'a'..='z' | '0'..='9' | '-' => {}
            'A'..='Z' => {
                return Err(format!(
                    "uppercase letter '{}' not allowed (use lowercase letters, digits and hyphens)",
                    ch
                ));
            }
            _ => {
                return Err(format!(
                    "invalid character '{}' (use lowercase letters, digits and hyphens)",
                    ch
                ));
            }
        }
    }
    Ok(name)
}

/// Lowercase, strip punctuation, collapse whitespace/underscores into single hyphens.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;
    for ch in input.chars() {
        if ch.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.extend(ch.to_lowercase());
        } else if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_hyphen = true;
        }
    }
    slug
}

/// Turn "my-skill-name" into "My Skill Name".
pub fn title_case(name: &str) -> String {
    name.split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render a relative path with `/` separators regardless of platform.
pub fn to_slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Lexically normalize a `/`-separated relative path.
/// Returns `None` when the path climbs above its starting directory.
pub fn normalize_relative(path: &str) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    Some(parts.join("/"))
}

/// Find the largest byte index <= `index` that is a char boundary in `s`.
pub fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Blank out fenced code blocks, keeping line structure so offsets and line numbers survive.
pub fn mask_code_fences(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut in_fence = false;
    for line in body.split_inclusive('\n') {
        let is_fence = line.trim_start().starts_with("```") || line.trim_start().starts_with("~~~");
        if is_fence || in_fence {
            for ch in line.chars() {
                out.push(if ch == '\n' { '\n' } else { ' ' });
            }
        } else {
            out.push_str(line);
        }
        if is_fence {
            in_fence = !in_fence;
        }
    }
    out
}
