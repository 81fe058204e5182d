//! # Hugo Scribe
//!
//! A writing assistant for Hugo blogs. Give it a topic and it drafts a post
//! with a chat-completion model, optionally restructures and proofreads it,
//! wraps it in front matter and drops it into your site's content directory.
//! Already have the text? It saves that too.
//!
//! # Architecture: One Pipeline, Two Entry Points
//!
//! Every post goes through the same short sequence of stages:
//!
//! ```text
//! Idle → Generating → [Formatting] → [Correcting] → Assembling → Persisted
//! ```
//!
//! - **Generate** starts from a topic and runs every stage.
//! - **Save** starts from existing text and skips `Generating`.
//!
//! Formatting and correcting are opt-in and always run in that order, so the
//! proofreading pass sees the final structure. Stages are sequential because
//! each consumes the previous output; nothing is written until the document
//! is fully assembled.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pipeline`] | Runs requests through the stages and writes the result to disk |
//! | [`prompt`] | Post type and voice selectors, and every prompt sent to the model |
//! | [`llm`] | `CompletionClient` trait and the OpenAI-compatible HTTP client |
//! | [`assist`] | Draft, reformat, correct, title and probe calls with their token budgets |
//! | [`front_matter`] | Front-matter model, serializer and lenient parser |
//! | [`slug`] | Title slugs and post identities |
//! | [`types`] | Request and result values passed through the pipeline |
//! | [`config`] | `settings.toml` loading, validation and the `ConfigStore` seam |
//! | [`site`] | Site-root detection, site check and unattended `hugo` builds |
//! | [`library`] | Listing previously saved posts |
//! | [`output`] | CLI output formatting and the uniform `{success, message}` response |
//!
//! # Design Decisions
//!
//! ## Injected Collaborators
//!
//! The pipeline never constructs its own HTTP client, settings or clock. It
//! borrows a [`llm::CompletionClient`], an [`config::AppConfig`] and a
//! [`pipeline::Clock`], so tests swap in a scripted client and a fixed clock
//! and run the whole flow without a network.
//!
//! ## Lossy Front Matter
//!
//! Front matter is written by a small line-oriented emitter that always
//! produces the same key order and two-space list indentation. The emitted
//! block is valid YAML. Reading it back is advisory: scalars round-trip, list
//! fields may not, and nothing in the save path depends on parsing.
//!
//! ## Unique Identities
//!
//! A post's directory is `<slug>-<millis>`. Saving the same title twice gives
//! two directories rather than overwriting the first post. An existing
//! directory is never reused: a save that lands on the same identity within
//! one millisecond fails instead.
//!
//! ## Publish Target and Backup
//!
//! Posts go to `hugo_path` with a second copy in `blogs_dir`. The backup is
//! best-effort. A post that reached the publish target counts as saved even
//! when the backup copy fails.

pub mod assist;
pub mod config;
pub mod front_matter;
pub mod library;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod prompt;
pub mod site;
pub mod slug;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
