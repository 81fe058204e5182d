//! Application settings.
//!
//! Settings live in a single TOML file (default `settings.toml`). The whole
//! record is read before each operation and written back whole after a
//! settings change; there is no partial update and no locking, so the last
//! writer wins.
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! hugo_path = ""            # Publish target (a Hugo content directory)
//! blogs_dir = "blogs"       # Local backup copies of every saved post
//! staging_dir = "temp"      # Where uploaded images wait before a save
//! theme = "light"
//!
//! [api]
//! api_key = ""
//! base_url = "https://api.deepseek.com"
//! model = "deepseek-chat"
//!
//! [front_matter]            # Template every new post starts from
//! draft = false
//! comments = true
//! categories = []
//! tags = []
//!
//! [sftp]
//! host = ""
//! port = 22
//! ```
//!
//! Unknown keys are rejected to catch typos early.
//!
//! Access goes through the [`ConfigStore`] trait so that callers can be
//! handed an in-memory store in tests instead of touching real files.

use crate::front_matter::FrontMatter;
use crate::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Whole settings record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Directory posts are published into. Empty means unconfigured.
    pub hugo_path: String,
    /// Directory holding a backup copy of every saved post.
    pub blogs_dir: String,
    /// Directory uploaded images are staged in before a save.
    pub staging_dir: String,
    /// UI theme, `light` or `dark`.
    pub theme: String,
    /// Completion endpoint and credential.
    pub api: ApiConfig,
    /// Defaults every new post's front matter starts from.
    pub front_matter: FrontMatter,
    /// Remote host details. Stored only; nothing is transferred.
    pub sftp: SftpConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            hugo_path: String::new(),
            blogs_dir: "blogs".to_string(),
            staging_dir: "temp".to_string(),
            theme: "light".to_string(),
            api: ApiConfig::default(),
            front_matter: FrontMatter::default(),
            sftp: SftpConfig::default(),
        }
    }
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sftp.port == 0 {
            return Err(ConfigError::Validation("sftp.port must be non-zero".into()));
        }
        if !matches!(self.theme.as_str(), "light" | "dark") {
            return Err(ConfigError::Validation(format!(
                "theme must be \"light\" or \"dark\", got {:?}",
                self.theme
            )));
        }
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Validation("api.base_url must not be empty".into()));
        }
        Ok(())
    }

    /// True when an API key is set.
    pub fn has_credentials(&self) -> bool {
        !self.api.api_key.trim().is_empty()
    }

    /// Publish target, if one is configured.
    pub fn hugo_path(&self) -> Option<PathBuf> {
        let trimmed = self.hugo_path.trim();
        (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
    }
}

/// Completion endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Bearer credential. Empty means unconfigured.
    pub api_key: String,
    /// Base URL; `/chat/completions` is appended.
    pub base_url: String,
    pub model: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SftpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub remote_path: String,
}

impl Default for SftpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 22,
            username: String::new(),
            password: String::new(),
            remote_path: String::new(),
        }
    }
}

// =============================================================================
// Config stores
// =============================================================================

/// Read and write the whole settings record.
pub trait ConfigStore {
    fn load(&self) -> Result<AppConfig, ConfigError>;
    fn save(&self, config: &AppConfig) -> Result<(), ConfigError>;
}

/// Settings in a TOML file on disk.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl ConfigStore for FileConfigStore {
    /// Missing file → stock defaults. Present but invalid → error.
    fn load(&self) -> Result<AppConfig, ConfigError> {
        if !self.path.exists() {
            return Ok(AppConfig::default());
        }
        let content = fs::read_to_string(&self.path)?;
        parse_config(&content)
    }

    fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        config.validate()?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, toml::to_string_pretty(config)?)?;
        Ok(())
    }
}

/// Settings held in memory, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    config: RefCell<AppConfig>,
}

impl MemoryConfigStore {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: RefCell::new(config),
        }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> Result<AppConfig, ConfigError> {
        Ok(self.config.borrow().clone())
    }

    fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        config.validate()?;
        *self.config.borrow_mut() = config.clone();
        Ok(())
    }
}

/// Parse and validate a settings document.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `settings.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# hugo-scribe settings
# ====================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Publish target: the directory new posts are written into, usually
# <site>/content/posts. Leave empty to keep posts in blogs_dir only.
hugo_path = ""

# Every saved post is also copied here, so a failed publish never loses work.
blogs_dir = "blogs"

# Directory holding uploaded images until a post is saved.
staging_dir = "temp"

# "light" or "dark"
theme = "light"

# ---------------------------------------------------------------------------
# Completion endpoint (any OpenAI-compatible /chat/completions API)
# ---------------------------------------------------------------------------
[api]
api_key = ""
base_url = "https://api.deepseek.com"
model = "deepseek-chat"

# ---------------------------------------------------------------------------
# Front matter template. Every new post starts from these values; title,
# date, description and images are filled in per post.
# ---------------------------------------------------------------------------
[front_matter]
draft = false
noindex = false
featured = false
pinned = false
comments = true
series = []
categories = []
tags = []

# ---------------------------------------------------------------------------
# Remote host (stored for reference; hugo-scribe does not upload)
# ---------------------------------------------------------------------------
[sftp]
host = ""
port = 22
username = ""
password = ""
remote_path = ""
"##
}
