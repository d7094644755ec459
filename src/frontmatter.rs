//! YAML frontmatter splitting and normalization.
//!
//! Knowledge repositories have no enforced schema, so every accessor here
//! answers with an empty/default value instead of failing when a field is
//! missing or has an unexpected shape. Malformed blocks never abort parsing:
//! they yield empty frontmatter plus a [`ParseWarning`].

use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_yaml::Value;

const DELIMITER: &str = "---";

/// Keys (besides `*_date` / `*-date`) whose values are parsed as calendar dates.
const DATE_KEYS: &[&str] = &["date", "created", "updated", "modified", "published"];

/// A single frontmatter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    Text(String),
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Scalar rendering; lists and nulls have none.
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Bool(b) => Some(b.to_string()),
            FieldValue::Integer(n) => Some(n.to_string()),
            FieldValue::Float(n) => Some(n.to_string()),
            FieldValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Null | FieldValue::List(_) => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, FieldValue::List(_))
    }

    fn from_yaml(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => FieldValue::Float(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => FieldValue::Text(s.clone()),
            Value::Sequence(items) => FieldValue::List(items.iter().map(Self::from_yaml).collect()),
            Value::Mapping(_) => FieldValue::Text(
                serde_yaml::to_string(value)
                    .unwrap_or_default()
                    .trim()
                    .to_string(),
            ),
            Value::Tagged(tagged) => Self::from_yaml(&tagged.value),
        }
    }
}

/// Ordered frontmatter mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    entries: Vec<(String, FieldValue)>,
}

impl Frontmatter {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Scalar field as text; `None` when absent, null or a list.
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.get(key).and_then(FieldValue::as_text)
    }

    /// Field as a list of strings; a scalar is promoted to a one-element list.
    pub fn get_list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(FieldValue::List(items)) => items.iter().filter_map(FieldValue::as_text).collect(),
            Some(other) => other.as_text().into_iter().collect(),
            None => Vec::new(),
        }
    }

    pub fn get_date(&self, key: &str) -> Option<NaiveDate> {
        match self.get(key) {
            Some(FieldValue::Date(d)) => Some(*d),
            _ => None,
        }
    }

    /// Normalized `tags` field (always a list after parsing).
    pub fn tags(&self) -> Vec<String> {
        self.get_list("tags")
    }

    fn from_mapping(mapping: &serde_yaml::Mapping) -> Self {
        let mut entries = Vec::with_capacity(mapping.len());
        for (key, value) in mapping {
            let key = match key {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => continue,
            };
            let value = normalize_field(&key, FieldValue::from_yaml(value));
            entries.push((key, value));
        }
        Self { entries }
    }
}

impl Serialize for Frontmatter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// A recoverable problem found while splitting a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseWarning {
    pub message: String,
}

impl ParseWarning {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result of splitting a document into metadata and body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedDocument {
    pub frontmatter: Frontmatter,
    pub body: String,
    /// True when an opening and a closing delimiter were both found
    pub has_block: bool,
    pub warnings: Vec<ParseWarning>,
}

/// Split `content` at the first pair of `---` delimiter lines.
pub fn parse(content: &str) -> ParsedDocument {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.split_inclusive('\n');

    let opens = lines
        .next()
        .map(|first| first.trim_end() == DELIMITER)
        .unwrap_or(false);
    if !opens {
        return ParsedDocument {
            body: content.to_string(),
            ..Default::default()
        };
    }

    let mut offset = content.find('\n').map(|i| i + 1).unwrap_or(content.len());
    let yaml_start = offset;
    let mut closing = None;
    for line in lines {
        if line.trim_end() == DELIMITER {
            closing = Some((offset, offset + line.len()));
            break;
        }
        offset += line.len();
    }

    let Some((yaml_end, body_start)) = closing else {
        return ParsedDocument {
            body: content.to_string(),
            warnings: vec![ParseWarning::new(
                "Frontmatter opened with '---' but no closing delimiter was found",
            )],
            ..Default::default()
        };
    };

    let yaml = &content[yaml_start..yaml_end];
    let body = content[body_start..].to_string();
    let mut parsed = ParsedDocument {
        body,
        has_block: true,
        ..Default::default()
    };

    if yaml.trim().is_empty() {
        return parsed;
    }

    match serde_yaml::from_str::<Value>(yaml) {
        Ok(Value::Mapping(mapping)) => parsed.frontmatter = Frontmatter::from_mapping(&mapping),
        Ok(Value::Null) => {}
        Ok(_) => parsed
            .warnings
            .push(ParseWarning::new("Frontmatter is not a YAML mapping")),
        Err(e) => parsed
            .warnings
            .push(ParseWarning::new(format!("Invalid YAML frontmatter: {}", e))),
    }

    parsed
}

fn normalize_field(key: &str, value: FieldValue) -> FieldValue {
    if key == "tags" {
        return FieldValue::List(normalize_tags(value).into_iter().map(FieldValue::Text).collect());
    }
    if is_date_key(key) {
        if let FieldValue::Text(ref s) = value {
            if let Some(date) = parse_date(s) {
                return FieldValue::Date(date);
            }
        }
    }
    value
}

fn normalize_tags(value: FieldValue) -> Vec<String> {
    let raw: Vec<String> = match value {
        FieldValue::List(items) => items.iter().filter_map(FieldValue::as_text).collect(),
        FieldValue::Text(s) => s.split(',').map(str::to_string).collect(),
        other => other.as_text().into_iter().collect(),
    };
    raw.into_iter()
        .map(|t| t.trim().trim_start_matches('#').to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn is_date_key(key: &str) -> bool {
    let lower = key.to_lowercase();
    DATE_KEYS.contains(&lower.as_str()) || lower.ends_with("_date") || lower.ends_with("-date")
}

/// Parse `YYYY-MM-DD`, optionally followed by a `T`/space separated time part.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let date_part = match s.get(..10) {
        Some(head) if s.len() == 10 => head,
        Some(head) if matches!(s.as_bytes().get(10), Some(b'T') | Some(b' ')) => head,
        _ => return None,
    };
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}
