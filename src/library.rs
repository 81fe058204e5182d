//! Listing of previously saved posts.
//!
//! Walks a post directory (`<dir>/<id>/index.md`) and reads each entry's
//! front matter back with the advisory parser. Entries whose front matter
//! cannot be read are skipped; the listing is informational and never fails
//! on a single bad post.

use crate::front_matter;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostSummary {
    /// Directory name of the post.
    pub id: String,
    pub title: String,
    pub date: String,
    pub draft: bool,
    pub path: PathBuf,
}

/// Saved posts under `dir`, newest first.
///
/// A missing directory yields an empty list.
pub fn list_posts(dir: &Path) -> Vec<PostSummary> {
    let mut posts: Vec<PostSummary> = WalkDir::new(dir)
        .min_depth(2)
        .max_depth(2)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.file_name() == "index.md")
        .filter_map(|e| read_summary(e.path()))
        .collect();

    // RFC 3339 UTC timestamps sort lexically
    posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
    posts
}

fn read_summary(path: &Path) -> Option<PostSummary> {
    let text = fs::read_to_string(path).ok()?;
    let Some(fm) = front_matter::parse(&text) else {
        debug!(path = %path.display(), "skipping post without front matter");
        return None;
    };
    let id = path.parent()?.file_name()?.to_string_lossy().into_owned();
    Some(PostSummary {
        id,
        title: fm.title,
        date: fm.date,
        draft: fm.draft,
        path: path.to_path_buf(),
    })
}
