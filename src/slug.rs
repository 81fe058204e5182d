//! Slug derivation for post identities and sidecar filenames.
//!
//! Every saved post lives in a directory named after its title, and its
//! featured image is renamed after the first few words of that title. Both
//! names go through the same normalization:
//!
//! - lowercase
//! - drop everything that is not a word character (`[a-z0-9_]`), whitespace or `-`
//! - whitespace runs become a single `-`
//! - dash runs collapse to one `-`
//! - leading and trailing dashes are stripped
//!
//! ```text
//! full_slug("Home Composting: A Guide")        → "home-composting-a-guide"
//! short_slug("Ten Things I Learned Hiking")    → "ten-things-i-learned"
//! full_slug("  ???  ")                         → ""
//! ```
//!
//! An empty slug is a legal result. [`identity`] falls back to a bare
//! timestamp in that case so the post still gets a usable directory name.

/// Number of leading title words kept by [`short_slug`].
pub const SHORT_SLUG_WORDS: usize = 4;

/// URL-safe slug for a full title.
pub fn full_slug(title: &str) -> String {
    let lowered = title.to_lowercase();

    // Keep word chars, whitespace and dashes; whitespace runs become one dash.
    let mut dashed = String::with_capacity(lowered.len());
    let mut in_space = false;
    for c in lowered.chars() {
        if c.is_whitespace() {
            if !in_space {
                dashed.push('-');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            dashed.push(c);
        }
    }

    // Collapse consecutive dashes
    let mut collapsed = String::with_capacity(dashed.len());
    let mut prev_dash = false;
    for c in dashed.chars() {
        if c == '-' {
            if !prev_dash {
                collapsed.push('-');
            }
            prev_dash = true;
        } else {
            collapsed.push(c);
            prev_dash = false;
        }
    }

    collapsed.trim_matches('-').to_string()
}

/// Slug built from only the first [`SHORT_SLUG_WORDS`] words of the title.
///
/// Used for image sidecar names so that files stay readable in a directory
/// listing even for long titles.
pub fn short_slug(title: &str) -> String {
    let head: Vec<&str> = title.split_whitespace().take(SHORT_SLUG_WORDS).collect();
    full_slug(&head.join(" "))
}

/// Post identity: `<slug>-<millis>`, or just `<millis>` when the slug is empty.
///
/// The timestamp suffix keeps identities unique for repeated titles.
pub fn identity(slug: &str, timestamp_millis: i64) -> String {
    if slug.is_empty() {
        timestamp_millis.to_string()
    } else {
        format!("{slug}-{timestamp_millis}")
    }
}
