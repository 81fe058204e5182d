//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! The primary line for every entity (post, title suggestion, check) is its
//! human identity: a title or a positional index. Filesystem paths and ids
//! follow as indented context lines.
//!
//! ```text
//! Saved Home Composting
//!     Id: home-composting-1760000000123
//!     Post: site/content/posts/home-composting-1760000000123/index.md
//!     Backup: blogs/home-composting-1760000000123/index.md
//!     Image: home-composting.jpg
//! ```
//!
//! ```text
//! 001 Home Composting
//!     Id: home-composting-1760000000123
//!     Date: 2025-10-09T08:53:20.123Z
//! ```
//!
//! # Machine Output
//!
//! With `--json` every command prints one [`Response`] instead: the uniform
//! `{success, message}` shape, plus the failure `kind` or a `data` payload.
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure.

use crate::library::PostSummary;
use crate::llm::LlmError;
use crate::pipeline::PipelineError;
use crate::site::SiteCheck;
use crate::types::{BlogDocument, SavedPost};
use serde::Serialize;

/// Uniform result shape for every operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Response {
    pub fn ok(message: impl Into<String>, data: &impl Serialize) -> Self {
        Self {
            success: true,
            message: message.into(),
            kind: None,
            data: serde_json::to_value(data).ok(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            kind: None,
            data: None,
        }
    }

    pub fn from_error(err: &PipelineError) -> Self {
        Self {
            kind: Some(err.kind()),
            ..Self::failure(err.to_string())
        }
    }

    pub fn from_result<T: Serialize>(
        result: &Result<T, PipelineError>,
        message: impl Into<String>,
    ) -> Self {
        match result {
            Ok(value) => Self::ok(message, value),
            Err(err) => Self::from_error(err),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.message.clone())
    }
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn context(label: &str, value: impl std::fmt::Display) -> String {
    format!("    {}: {}", label, value)
}

// ============================================================================
// Posts
// ============================================================================

pub fn format_saved_post(title: &str, post: &SavedPost) -> Vec<String> {
    let mut lines = vec![
        format!("Saved {}", title),
        context("Id", &post.id),
        context("Post", post.path.display()),
    ];
    match &post.backup_path {
        Some(backup) => lines.push(context("Backup", backup.display())),
        None => lines.push(context("Backup", "none")),
    }
    if let Some(image) = &post.image {
        lines.push(context("Image", image));
    }
    lines
}

pub fn print_saved_post(title: &str, post: &SavedPost) {
    for line in format_saved_post(title, post) {
        println!("{}", line);
    }
}

/// A draft that was not saved: a short header followed by the full markdown.
pub fn format_document(document: &BlogDocument) -> Vec<String> {
    let mut lines = vec![
        format!("Draft {} (not saved)", document.id),
        String::new(),
    ];
    lines.extend(document.to_markdown().lines().map(str::to_string));
    lines
}

pub fn print_document(document: &BlogDocument) {
    for line in format_document(document) {
        println!("{}", line);
    }
}

pub fn format_posts(posts: &[PostSummary]) -> Vec<String> {
    if posts.is_empty() {
        return vec!["No saved posts".to_string()];
    }
    let mut lines = Vec::new();
    for (i, post) in posts.iter().enumerate() {
        let title = if post.title.is_empty() {
            format!("({})", post.id)
        } else {
            post.title.clone()
        };
        lines.push(format!("{} {}", format_index(i + 1), title));
        lines.push(context("Id", &post.id));
        if !post.date.is_empty() {
            lines.push(context("Date", &post.date));
        }
        if post.draft {
            lines.push(context("Status", "draft"));
        }
    }
    lines
}

pub fn print_posts(posts: &[PostSummary]) {
    for line in format_posts(posts) {
        println!("{}", line);
    }
}

// ============================================================================
// Assist
// ============================================================================

pub fn format_titles(titles: &[String]) -> Vec<String> {
    titles
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{} {}", format_index(i + 1), t))
        .collect()
}

pub fn print_titles(titles: &[String]) {
    for line in format_titles(titles) {
        println!("{}", line);
    }
}

// ============================================================================
// Checks
// ============================================================================

pub fn format_probe(result: &Result<(), LlmError>) -> String {
    match result {
        Ok(()) => "API: connection successful".to_string(),
        Err(err) => format!("API: {}", err),
    }
}

pub fn format_site_check(check: &SiteCheck) -> Vec<String> {
    let mut lines = vec![format!("Hugo: {}", check.message())];
    if let Some(root) = &check.root {
        lines.push(context("Root", root.display()));
    }
    lines
}

/// Probe and site check together, as printed by `check`.
pub fn format_check(probe: &Result<(), LlmError>, site: &SiteCheck) -> Vec<String> {
    let mut lines = vec![format_probe(probe)];
    lines.extend(format_site_check(site));
    lines
}

pub fn print_check(probe: &Result<(), LlmError>, site: &SiteCheck) {
    for line in format_check(probe, site) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::front_matter::FrontMatter;
    use std::io;
    use std::path::PathBuf;

    fn saved() -> SavedPost {
        SavedPost {
            id: "home-composting-1".into(),
            path: PathBuf::from("site/home-composting-1/index.md"),
            backup_path: Some(PathBuf::from("blogs/home-composting-1/index.md")),
            image: Some("home-composting.jpg".into()),
            content: "---\n".into(),
        }
    }

    // =========================================================================
    // Response
    // =========================================================================

    #[test]
    fn error_response_carries_kind() {
        let response = Response::from_error(&PipelineError::RateLimit);
        assert!(!response.success);
        assert_eq!(response.kind, Some("rate_limit"));
        assert!(response.message.contains("Rate limit"));
    }

    #[test]
    fn success_response_carries_data() {
        let result: Result<SavedPost, PipelineError> = Ok(saved());
        let response = Response::from_result(&result, "Blog saved successfully!");
        assert!(response.success);
        assert_eq!(response.data.unwrap()["id"], "home-composting-1");
    }

    #[test]
    fn json_omits_empty_fields() {
        let json = Response::failure("nope").to_json();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["message"], "nope");
        assert!(value.get("kind").is_none());
        assert!(value.get("data").is_none());
    }

    #[test]
    fn persistence_error_message_names_path() {
        let err = PipelineError::Persistence {
            path: PathBuf::from("/srv/site"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        let response = Response::from_error(&err);
        assert_eq!(response.kind, Some("persistence"));
        assert!(response.message.contains("/srv/site"));
    }

    // =========================================================================
    // Posts
    // =========================================================================

    #[test]
    fn saved_post_lines() {
        let lines = format_saved_post("Home Composting", &saved());
        assert_eq!(lines[0], "Saved Home Composting");
        assert_eq!(lines[1], "    Id: home-composting-1");
        assert!(lines.contains(&"    Image: home-composting.jpg".to_string()));
    }

    #[test]
    fn saved_post_without_backup() {
        let post = SavedPost {
            backup_path: None,
            image: None,
            ..saved()
        };
        let lines = format_saved_post("T", &post);
        assert_eq!(lines.last().unwrap(), "    Backup: none");
    }

    #[test]
    fn document_shows_markdown() {
        let doc = BlogDocument {
            id: "x-1".into(),
            short_slug: "x".into(),
            front_matter: FrontMatter {
                title: "X".into(),
                ..FrontMatter::default()
            },
            body: "Hello".into(),
            image: None,
        };
        let lines = format_document(&doc);
        assert_eq!(lines[0], "Draft x-1 (not saved)");
        assert_eq!(lines[2], "---");
        assert_eq!(lines.last().unwrap(), "Hello");
    }

    #[test]
    fn posts_listed_with_index() {
        let posts = vec![
            PostSummary {
                id: "b-2".into(),
                title: "B".into(),
                date: "2025-02-01T00:00:00.000Z".into(),
                draft: true,
                path: PathBuf::from("b-2/index.md"),
            },
            PostSummary {
                id: "untitled-1".into(),
                title: String::new(),
                date: String::new(),
                draft: false,
                path: PathBuf::from("untitled-1/index.md"),
            },
        ];
        let lines = format_posts(&posts);
        assert_eq!(lines[0], "001 B");
        assert!(lines.contains(&"    Status: draft".to_string()));
        assert!(lines.contains(&"002 (untitled-1)".to_string()));
    }

    #[test]
    fn empty_post_list() {
        assert_eq!(format_posts(&[]), vec!["No saved posts"]);
    }

    // =========================================================================
    // Assist and checks
    // =========================================================================

    #[test]
    fn titles_numbered() {
        let titles = vec!["One".to_string(), "Two".to_string()];
        assert_eq!(format_titles(&titles), vec!["001 One", "002 Two"]);
    }

    #[test]
    fn probe_failure_shows_reason() {
        let line = format_probe(&Err(LlmError::Auth));
        assert!(line.starts_with("API: "));
        assert!(line.len() > "API: ".len());
    }

    #[test]
    fn check_combines_probe_and_site() {
        let site = SiteCheck {
            configured: true,
            exists: true,
            has_config: true,
            root: Some(PathBuf::from("/srv/blog")),
        };
        let lines = format_check(&Ok(()), &site);
        assert_eq!(
            lines,
            vec![
                "API: connection successful",
                "Hugo: Hugo project found and looks valid",
                "    Root: /srv/blog",
            ]
        );
    }
}
