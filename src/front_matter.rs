//! Post metadata and its line-oriented front-matter block.
//!
//! A saved post is a markdown file that starts with a metadata block between
//! two `---` separator lines:
//!
//! ```text
//! ---
//! title: Home Composting
//! date: 2026-10-18T09:30:00.000Z
//! draft: false
//! description: Turning scraps into soil
//! noindex: false
//! featured: false
//! pinned: false
//! comments: true
//! series:
//! #  -
//! categories:
//!   - garden
//! tags:
//!   - compost
//!   - soil
//! images:
//!   - home-composting.jpg
//! alt_text: Home Composting
//!
//! ---
//!
//! <body>
//! ```
//!
//! ## Serialization rules
//!
//! - Field order is fixed (the order of [`FrontMatter`]'s fields).
//! - Booleans are always written as `true`/`false`, never omitted.
//! - Every list key is written, even when empty. An empty list gets a single
//!   commented placeholder line so the key is never followed by nothing.
//! - List items are one per line, indented two spaces.
//!
//! Because `:` separates key from value, titles and descriptions must pass
//! through [`sanitize`] before they are stored. The same goes for line breaks:
//! a raw newline followed by `---` would close the block early.
//!
//! ## Parsing
//!
//! [`parse`] is a best-effort reader: it splits each line on the first colon
//! and coerces `[...]`, `true` and `false`. Multi-line lists are not
//! reconstructed, so it only inverts [`serialize`] for documents whose lists
//! are all empty. Treat its output as advisory.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SEPARATOR: &str = "---";

const EMPTY_LIST_PLACEHOLDER: &str = "#  -";
const LIST_ITEM_INDENT: &str = "  ";

/// Metadata envelope for one post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrontMatter {
    pub title: String,
    /// RFC 3339 timestamp, stamped at save time.
    pub date: String,
    pub draft: bool,
    pub description: String,
    pub noindex: bool,
    pub featured: bool,
    pub pinned: bool,
    pub comments: bool,
    pub series: Vec<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    /// Filenames of images stored next to `index.md`.
    pub images: Vec<String>,
    pub alt_text: String,
}

impl Default for FrontMatter {
    fn default() -> Self {
        Self {
            title: String::new(),
            date: String::new(),
            draft: false,
            description: String::new(),
            noindex: false,
            featured: false,
            pinned: false,
            comments: true,
            series: Vec::new(),
            categories: Vec::new(),
            tags: Vec::new(),
            images: Vec::new(),
            alt_text: String::new(),
        }
    }
}

/// Make text safe for a single front-matter line: every `:` becomes ` -`
/// and each run of line breaks becomes one space.
///
/// ```text
/// "Composting: A Guide"   → "Composting - A Guide"
/// "Part one\n---\nmore"   → "Part one --- more"
/// ```
pub fn sanitize(text: &str) -> String {
    text.split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .replace(':', " -")
        .trim()
        .to_string()
}

/// [`sanitize`] every item of a list, dropping items left empty.
pub fn sanitize_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|item| sanitize(item))
        .filter(|item| !item.is_empty())
        .collect()
}

/// Render the metadata block followed by `body`.
pub fn serialize(front_matter: &FrontMatter, body: &str) -> String {
    let fm = front_matter;
    let mut out = String::with_capacity(512 + body.len());

    out.push_str(SEPARATOR);
    out.push('\n');
    push_scalar(&mut out, "title", &fm.title);
    push_scalar(&mut out, "date", &fm.date);
    push_scalar(&mut out, "draft", bool_token(fm.draft));
    push_scalar(&mut out, "description", &fm.description);
    push_scalar(&mut out, "noindex", bool_token(fm.noindex));
    push_scalar(&mut out, "featured", bool_token(fm.featured));
    push_scalar(&mut out, "pinned", bool_token(fm.pinned));
    push_scalar(&mut out, "comments", bool_token(fm.comments));
    push_list(&mut out, "series", &fm.series);
    push_list(&mut out, "categories", &fm.categories);
    push_list(&mut out, "tags", &fm.tags);
    push_list(&mut out, "images", &fm.images);
    push_scalar(&mut out, "alt_text", &fm.alt_text);
    out.push('\n');
    out.push_str(SEPARATOR);
    out.push_str("\n\n");
    out.push_str(body);
    out
}

fn bool_token(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

fn push_scalar(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push_str(": ");
    out.push_str(value);
    out.push('\n');
}

fn push_list(out: &mut String, key: &str, items: &[String]) {
    out.push_str(key);
    out.push_str(":\n");
    if items.is_empty() {
        out.push_str(EMPTY_LIST_PLACEHOLDER);
        out.push('\n');
        return;
    }
    for item in items {
        out.push_str(LIST_ITEM_INDENT);
        out.push_str("- ");
        out.push_str(item);
        out.push('\n');
    }
}

/// A raw value read back from a front-matter line.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
    List(Vec<String>),
}

impl FieldValue {
    fn coerce(raw: &str) -> Self {
        if raw.starts_with('[') && raw.ends_with(']') {
            return Self::List(parse_list_literal(raw));
        }
        match raw {
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            _ => Self::Text(raw.to_string()),
        }
    }

    fn into_list(self) -> Vec<String> {
        match self {
            Self::List(items) => items,
            Self::Text(s) if s.is_empty() => Vec::new(),
            Self::Text(s) => vec![s],
            Self::Bool(b) => vec![bool_token(b).to_string()],
        }
    }
}

/// `["a", "b"]` as JSON when possible, otherwise comma-split with quotes stripped.
fn parse_list_literal(raw: &str) -> Vec<String> {
    if let Ok(items) = serde_json::from_str::<Vec<String>>(raw) {
        return items;
    }
    raw[1..raw.len() - 1]
        .split(',')
        .map(|item| item.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Key/value pairs of the leading block, or `None` when the text does not
/// start with a separator line.
pub fn parse_fields(text: &str) -> Option<BTreeMap<String, FieldValue>> {
    raw_fields(text).map(|raw| {
        raw.into_iter()
            .map(|(key, value)| (key, FieldValue::coerce(&value)))
            .collect()
    })
}

/// Uncoerced `key: value` pairs, trimmed.
fn raw_fields(text: &str) -> Option<BTreeMap<String, String>> {
    let mut lines = text.lines();
    if lines.next()? != SEPARATOR {
        return None;
    }

    let mut fields = BTreeMap::new();
    for line in lines {
        if line == SEPARATOR {
            break;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        fields.insert(key.trim().to_string(), value.trim().to_string());
    }
    Some(fields)
}

/// Best-effort [`FrontMatter`] from a document; unknown keys are ignored and
/// missing keys keep their defaults.
///
/// Text fields keep their raw value, so a title like `[2026]` survives.
pub fn parse(text: &str) -> Option<FrontMatter> {
    raw_fields(text).map(from_fields)
}

fn from_fields(fields: BTreeMap<String, String>) -> FrontMatter {
    let mut fm = FrontMatter::default();
    for (key, raw) in fields {
        match key.as_str() {
            "title" => fm.title = raw,
            "date" => fm.date = raw,
            "description" => fm.description = raw,
            "alt_text" => fm.alt_text = raw,
            "draft" => set_bool(&mut fm.draft, FieldValue::coerce(&raw)),
            "noindex" => set_bool(&mut fm.noindex, FieldValue::coerce(&raw)),
            "featured" => set_bool(&mut fm.featured, FieldValue::coerce(&raw)),
            "pinned" => set_bool(&mut fm.pinned, FieldValue::coerce(&raw)),
            "comments" => set_bool(&mut fm.comments, FieldValue::coerce(&raw)),
            "series" => fm.series = FieldValue::coerce(&raw).into_list(),
            "categories" => fm.categories = FieldValue::coerce(&raw).into_list(),
            "tags" => fm.tags = FieldValue::coerce(&raw).into_list(),
            "images" => fm.images = FieldValue::coerce(&raw).into_list(),
            _ => {}
        }
    }
    fm
}

fn set_bool(slot: &mut bool, value: FieldValue) {
    if let FieldValue::Bool(b) = value {
        *slot = b;
    }
}
