//! Content pipeline: topic or text in, saved post out.
//!
//! A run starts idle and walks a fixed sequence of stages. The optional
//! stages come from the request's [`Polish`] flags as [`PolishStep`]s:
//!
//! ```text
//! Idle → Generating → [Formatting] → [Correcting] → Assembling → Persisted
//! ```
//!
//! Each stage is one model call or one pure transform, and the stages run
//! strictly in order because every stage consumes the previous output. The
//! first failure ends the run with the most specific error available.
//! Nothing touches the filesystem before `Assembling` has produced a complete
//! document, so a failed run leaves no partial post behind.
//!
//! ## Persistence
//!
//! A post is written to `<target>/<id>/index.md`, with its image (if any)
//! copied alongside as `<short-slug><ext>`. The target is `hugo_path` when
//! configured, and in that case a second copy goes to `blogs_dir`. The
//! backup copy is best-effort: a failure there is logged and ignored. With no
//! `hugo_path`, `blogs_dir` is the only target.
//!
//! The post directory must not exist yet. Two saves of the same title in the
//! same millisecond share an identity, and the second one fails with
//! `Persistence` instead of overwriting the first.
//!
//! Writes are not transactional. A crash between creating the post directory
//! and writing `index.md` leaves an empty directory.

use crate::assist;
use crate::config::AppConfig;
use crate::front_matter::{self, FrontMatter};
use crate::llm::{CompletionClient, LlmError};
use crate::prompt;
use crate::slug;
use crate::types::{
    BlogDocument, GenerationRequest, Polish, PostImage, SaveRequest, SavedPost, Style, Taxonomy,
};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Largest staged image accepted.
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Accepted staged image extensions (compared case-insensitively).
pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpeg", "jpg", "png", "gif", "webp", "svg"];

const FALLBACK_IMAGE_STEM: &str = "featured";
const ENTRY_FILE: &str = "index.md";

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Auth(String),
    #[error("Rate limit exceeded. Please wait a moment and try again.")]
    RateLimit,
    #[error("Request timed out after {0}s. Please try again.")]
    Timeout(u64),
    #[error("API error: {0}")]
    Upstream(String),
    #[error("Failed to save post at {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PipelineError {
    /// Stable short name for the error class.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Auth(_) => "auth",
            Self::RateLimit => "rate_limit",
            Self::Timeout(_) => "timeout",
            Self::Upstream(_) => "upstream",
            Self::Persistence { .. } => "persistence",
        }
    }

    fn persistence(path: &Path, source: io::Error) -> Self {
        Self::Persistence {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl From<LlmError> for PipelineError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Auth => Self::Auth(err.to_string()),
            LlmError::RateLimit => Self::RateLimit,
            LlmError::Timeout(secs) => Self::Timeout(secs),
            LlmError::Upstream(message) => Self::Upstream(message),
        }
    }
}

/// Stage a run has reached, as reported in the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Generating,
    Formatting(Style),
    Correcting,
    Assembling,
    Persisted,
}

/// One optional pass over the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolishStep {
    Formatting(Style),
    Correcting,
}

impl From<PolishStep> for Stage {
    fn from(step: PolishStep) -> Self {
        match step {
            PolishStep::Formatting(style) => Stage::Formatting(style),
            PolishStep::Correcting => Stage::Correcting,
        }
    }
}

impl Polish {
    /// The optional passes this request asks for, in execution order.
    pub fn steps(&self) -> Vec<PolishStep> {
        let mut steps = Vec::with_capacity(2);
        if let Some(style) = self.reformat {
            steps.push(PolishStep::Formatting(style));
        }
        if self.correct {
            steps.push(PolishStep::Correcting);
        }
        steps
    }
}

/// Source of the save timestamp.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Title, description and taxonomy shared by both entry points.
struct PostMeta<'r> {
    title: &'r str,
    description: &'r str,
    alt_text: Option<&'r str>,
    taxonomy: &'r Taxonomy,
}

struct Targets {
    primary: PathBuf,
    backup: Option<PathBuf>,
}

/// Runs requests against one client, one settings record and one clock.
pub struct Pipeline<'a> {
    client: &'a dyn CompletionClient,
    config: &'a AppConfig,
    clock: &'a dyn Clock,
}

impl<'a> Pipeline<'a> {
    pub fn new(client: &'a dyn CompletionClient, config: &'a AppConfig, clock: &'a dyn Clock) -> Self {
        Self {
            client,
            config,
            clock,
        }
    }

    /// Generate, polish and save a new post.
    pub fn generate(&self, request: &GenerationRequest) -> Result<SavedPost, PipelineError> {
        let document = self.draft(request)?;
        self.persist(&document)
    }

    /// Generate and polish a new post without writing anything.
    pub fn draft(&self, request: &GenerationRequest) -> Result<BlogDocument, PipelineError> {
        self.require_credentials()?;
        require(&request.topic, "Please enter a blog topic")?;
        self.targets()?;
        let image = self.stage_image(request.image.as_deref())?;

        let prompt = prompt::build_generation_prompt(
            &request.topic,
            request.style.blog_type,
            request.style.voice,
            &request.instructions,
        );
        info!(stage = ?Stage::Generating, topic = %request.topic, "pipeline stage");
        let body = non_empty(assist::draft(self.client, &prompt)?)?;
        let body = self.polish(body, &request.polish)?;

        let meta = PostMeta {
            title: &request.topic,
            description: &request.description,
            alt_text: request.alt_text.as_deref(),
            taxonomy: &request.taxonomy,
        };
        Ok(self.assemble(&meta, body, image))
    }

    /// Save existing content as a post, optionally polishing it first.
    pub fn save(&self, request: &SaveRequest) -> Result<SavedPost, PipelineError> {
        require(&request.title, "Please provide a title for the blog")?;
        require(&request.content, "Please provide content for the blog")?;
        if request.polish.needs_model() {
            self.require_credentials()?;
        }
        self.targets()?;
        let image = self.stage_image(request.image.as_deref())?;

        let body = self.polish(request.content.clone(), &request.polish)?;

        let meta = PostMeta {
            title: &request.title,
            description: &request.description,
            alt_text: request.alt_text.as_deref(),
            taxonomy: &request.taxonomy,
        };
        let document = self.assemble(&meta, body, image);
        self.persist(&document)
    }

    /// Write an assembled document to the publish target and the backup directory.
    pub fn persist(&self, document: &BlogDocument) -> Result<SavedPost, PipelineError> {
        let targets = self.targets()?;
        let markdown = document.to_markdown();

        let path = write_post(&targets.primary, document, &markdown)?;
        info!(id = %document.id, path = %path.display(), "post written");

        let backup_path = targets.backup.and_then(|dir| {
            match write_post(&dir, document, &markdown) {
                Ok(p) => {
                    debug!(path = %p.display(), "backup written");
                    Some(p)
                }
                Err(err) => {
                    warn!(error = %err, "backup copy failed");
                    None
                }
            }
        });

        info!(stage = ?Stage::Persisted, id = %document.id, "pipeline stage");
        Ok(SavedPost {
            id: document.id.clone(),
            path,
            backup_path,
            image: document.image.as_ref().map(|i| i.file_name.clone()),
            content: markdown,
        })
    }

    fn require_credentials(&self) -> Result<(), PipelineError> {
        if self.config.has_credentials() {
            Ok(())
        } else {
            Err(PipelineError::Auth(
                "API key not configured. Please add api_key to your settings.".into(),
            ))
        }
    }

    fn polish(&self, body: String, polish: &Polish) -> Result<String, PipelineError> {
        polish
            .steps()
            .into_iter()
            .try_fold(body, |text, step| self.step(step, text))
    }

    fn step(&self, step: PolishStep, text: String) -> Result<String, PipelineError> {
        info!(stage = ?Stage::from(step), "pipeline stage");
        let out = match step {
            PolishStep::Formatting(style) => {
                assist::reformat(self.client, &text, style.blog_type, style.voice)?
            }
            PolishStep::Correcting => assist::correct(self.client, &text)?,
        };
        non_empty(out)
    }

    fn assemble(&self, meta: &PostMeta<'_>, body: String, image: Option<PathBuf>) -> BlogDocument {
        info!(stage = ?Stage::Assembling, "pipeline stage");
        let now = self.clock.now();
        let id = slug::identity(&slug::full_slug(meta.title), now.timestamp_millis());
        let short_slug = slug::short_slug(meta.title);

        let image = image.map(|source| PostImage {
            file_name: image_file_name(&short_slug, &source),
            source,
        });

        let template = &self.config.front_matter;
        let front_matter = FrontMatter {
            title: front_matter::sanitize(meta.title),
            date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            draft: false,
            description: front_matter::sanitize(meta.description),
            series: front_matter::sanitize_list(&overlay(&template.series, &meta.taxonomy.series)),
            categories: front_matter::sanitize_list(&overlay(
                &template.categories,
                &meta.taxonomy.categories,
            )),
            tags: front_matter::sanitize_list(&overlay(&template.tags, &meta.taxonomy.tags)),
            images: image.iter().map(|i| i.file_name.clone()).collect(),
            alt_text: front_matter::sanitize(meta.alt_text.unwrap_or(meta.title)),
            ..template.clone()
        };

        BlogDocument {
            id,
            short_slug,
            front_matter,
            body,
            image,
        }
    }

    fn targets(&self) -> Result<Targets, PipelineError> {
        let blogs_dir = PathBuf::from(&self.config.blogs_dir);
        match self.config.hugo_path() {
            Some(hugo) if hugo.is_dir() => Ok(Targets {
                primary: hugo,
                backup: Some(blogs_dir),
            }),
            Some(hugo) => Err(PipelineError::persistence(
                &hugo,
                io::Error::new(io::ErrorKind::NotFound, "publish target does not exist"),
            )),
            None => Ok(Targets {
                primary: blogs_dir,
                backup: None,
            }),
        }
    }

    /// Resolve a staged image, as given or relative to `staging_dir`.
    ///
    /// A reference that resolves to nothing is dropped with a warning rather
    /// than failing the run.
    fn stage_image(&self, requested: Option<&Path>) -> Result<Option<PathBuf>, PipelineError> {
        let Some(requested) = requested.filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(None);
        };

        let allowed = requested
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if !allowed {
            return Err(PipelineError::Validation(
                "Only image files are allowed (JPEG, PNG, GIF, WEBP, SVG)!".into(),
            ));
        }

        let staged = Path::new(&self.config.staging_dir).join(requested);
        let Some(found) = [requested.to_path_buf(), staged]
            .into_iter()
            .find(|p| p.is_file())
        else {
            warn!(image = %requested.display(), "staged image not found, continuing without it");
            return Ok(None);
        };

        let len = fs::metadata(&found)
            .map_err(|e| PipelineError::persistence(&found, e))?
            .len();
        if len > MAX_IMAGE_BYTES {
            return Err(PipelineError::Validation(format!(
                "Image is {len} bytes; the limit is {MAX_IMAGE_BYTES} bytes"
            )));
        }
        Ok(Some(found))
    }
}

fn require(value: &str, message: &str) -> Result<(), PipelineError> {
    if value.trim().is_empty() {
        Err(PipelineError::Validation(message.to_string()))
    } else {
        Ok(())
    }
}

fn non_empty(text: String) -> Result<String, PipelineError> {
    if text.trim().is_empty() {
        Err(PipelineError::Upstream("The model returned no text".into()))
    } else {
        Ok(text)
    }
}

fn overlay(template: &[String], request: &[String]) -> Vec<String> {
    if request.is_empty() {
        template.to_vec()
    } else {
        request.to_vec()
    }
}

/// `<short-slug><.ext>`, keeping the source extension as written.
fn image_file_name(short_slug: &str, source: &Path) -> String {
    let stem = if short_slug.is_empty() {
        FALLBACK_IMAGE_STEM
    } else {
        short_slug
    };
    match source.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem.to_string(),
    }
}

/// Create `<root>/<id>/`, write `index.md`, copy the image in.
///
/// Fails if `<root>/<id>/` already exists.
fn write_post(root: &Path, document: &BlogDocument, markdown: &str) -> Result<PathBuf, PipelineError> {
    fs::create_dir_all(root).map_err(|e| PipelineError::persistence(root, e))?;
    let dir = root.join(&document.id);
    fs::create_dir(&dir).map_err(|e| PipelineError::persistence(&dir, e))?;

    let entry = dir.join(ENTRY_FILE);
    fs::write(&entry, markdown).map_err(|e| PipelineError::persistence(&entry, e))?;

    if let Some(image) = &document.image {
        let dest = dir.join(&image.file_name);
        fs::copy(&image.source, &dest).map_err(|e| PipelineError::persistence(&dest, e))?;
    }
    Ok(entry)
}
