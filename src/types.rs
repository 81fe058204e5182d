//! Request and result values passed through the pipeline.
//!
//! Requests are transient: they are built by the CLI (or an embedding
//! application), consumed by [`crate::pipeline::Pipeline`], and never stored.

use crate::front_matter::{self, FrontMatter};
use crate::prompt::{BlogType, Voice};
use serde::Serialize;
use std::path::PathBuf;

/// Post type and voice used for generation and reformatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub blog_type: BlogType,
    pub voice: Voice,
}

impl Style {
    pub fn new(blog_type: BlogType, voice: Voice) -> Self {
        Self { blog_type, voice }
    }
}

/// Optional post-processing passes applied after the body exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Polish {
    /// Restructure the body for this style.
    pub reformat: Option<Style>,
    /// Run a spelling and grammar pass last.
    pub correct: bool,
}

impl Polish {
    pub fn needs_model(&self) -> bool {
        self.reformat.is_some() || self.correct
    }
}

/// Taxonomy lists that replace the template's lists when non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Taxonomy {
    pub series: Vec<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
}

/// Write a new post from a topic.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    /// Becomes the post title.
    pub topic: String,
    pub style: Style,
    /// Free-text additions to the prompt.
    pub instructions: String,
    pub description: String,
    /// Image alt text; the topic is used when absent.
    pub alt_text: Option<String>,
    /// Staged image to store next to the post.
    pub image: Option<PathBuf>,
    pub taxonomy: Taxonomy,
    pub polish: Polish,
}

/// Save already-written content as a post.
#[derive(Debug, Clone, Default)]
pub struct SaveRequest {
    pub title: String,
    pub description: String,
    pub content: String,
    pub alt_text: Option<String>,
    pub image: Option<PathBuf>,
    pub taxonomy: Taxonomy,
    pub polish: Polish,
}

/// An assembled post ready to be written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlogDocument {
    /// Directory name: `<slug>-<millis>`.
    pub id: String,
    /// First-four-words slug, used to name the image.
    pub short_slug: String,
    pub front_matter: FrontMatter,
    pub body: String,
    /// Staged image to copy in, with the name it gets inside the post directory.
    pub image: Option<PostImage>,
}

impl BlogDocument {
    pub fn to_markdown(&self) -> String {
        front_matter::serialize(&self.front_matter, &self.body)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostImage {
    pub source: PathBuf,
    pub file_name: String,
}

/// Where a post ended up.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedPost {
    pub id: String,
    /// `index.md` in the publish target.
    pub path: PathBuf,
    /// `index.md` in the backup directory, when that copy succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Full markdown that was written.
    pub content: String,
}
