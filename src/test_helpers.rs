//! Shared test utilities for the hugo-scribe test suite.
//!
//! Provides a scripted completion client, a fixed clock and a settings
//! record rooted in a temp directory, so pipeline tests never touch the
//! network or the real filesystem layout.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let config = temp_config(&tmp);
//! let client = StubClient::replying(&["# Draft"]);
//! let clock = FixedClock::at_millis(1_760_000_000_123);
//!
//! let saved = Pipeline::new(&client, &config, &clock).generate(&request).unwrap();
//! assert_eq!(client.calls().len(), 1);
//! ```

use chrono::{DateTime, TimeZone, Utc};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::AppConfig;
use crate::llm::{CompletionClient, CompletionOptions, LlmError};
use crate::pipeline::Clock;

// =========================================================================
// Completion client
// =========================================================================

/// One recorded `complete` call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system: String,
    pub user: String,
    pub options: CompletionOptions,
}

/// Completion client that replays a fixed script and records every call.
///
/// Once the script runs out, further calls fail with an upstream error.
pub struct StubClient {
    script: RefCell<VecDeque<Result<String, LlmError>>>,
    calls: RefCell<Vec<RecordedCall>>,
}

impl StubClient {
    pub fn scripted(script: Vec<Result<String, LlmError>>) -> Self {
        Self {
            script: RefCell::new(script.into()),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Succeed with each reply in turn.
    pub fn replying(replies: &[&str]) -> Self {
        Self::scripted(replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    /// Fail the first call with `err`.
    pub fn failing(err: LlmError) -> Self {
        Self::scripted(vec![Err(err)])
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }
}

impl CompletionClient for StubClient {
    fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, LlmError> {
        self.calls.borrow_mut().push(RecordedCall {
            system: system_prompt.to_string(),
            user: user_prompt.to_string(),
            options: *options,
        });
        self.script
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Upstream("stub script exhausted".into())))
    }
}

// =========================================================================
// Clock
// =========================================================================

pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn at_millis(millis: i64) -> Self {
        Self(Utc.timestamp_millis_opt(millis).unwrap())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

// =========================================================================
// Settings and staging
// =========================================================================

/// Settings rooted in `tmp`, with a credential set.
///
/// ```text
/// tmp/
/// ├── site/content/posts/   hugo_path (created)
/// ├── blogs/                blogs_dir (not created)
/// └── temp/                 staging_dir (created)
/// ```
pub fn temp_config(tmp: &TempDir) -> AppConfig {
    let hugo = tmp.path().join("site/content/posts");
    let staging = tmp.path().join("temp");
    fs::create_dir_all(&hugo).unwrap();
    fs::create_dir_all(&staging).unwrap();

    let mut config = AppConfig {
        hugo_path: hugo.display().to_string(),
        blogs_dir: tmp.path().join("blogs").display().to_string(),
        staging_dir: staging.display().to_string(),
        ..AppConfig::default()
    };
    config.api.api_key = "sk-test".into();
    config
}

/// Write a file into the staging directory and return its full path.
pub fn stage_file(config: &AppConfig, name: &str, bytes: &[u8]) -> PathBuf {
    let path = Path::new(&config.staging_dir).join(name);
    fs::write(&path, bytes).unwrap();
    path
}
