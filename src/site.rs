//! Boundary with the external static-site generator.
//!
//! The generator is treated as a black box: a directory of markdown files
//! with front matter goes in, and the only signal read back is the exit
//! status plus a scan of stderr for the literal substrings `Error` or
//! `fatal`. Warnings alone do not fail a build.
//!
//! `hugo_path` normally points at the posts directory inside a site
//! (`<root>/content/posts`). The site root is everything before the
//! `content` component.

use crate::config::AppConfig;
use serde::Serialize;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

/// Files or directories whose presence marks a site root.
pub const SITE_CONFIG_NAMES: [&str; 6] = [
    "config.toml",
    "config.yaml",
    "config.yml",
    "hugo.toml",
    "hugo.yaml",
    "config",
];

pub const DEFAULT_PROGRAM: &str = "hugo";
pub const BUILD_TIMEOUT: Duration = Duration::from_secs(60);

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Hugo path not configured. Please set hugo_path in your settings.")]
    NotConfigured,
    #[error("Not a valid Hugo project (no config file found): {0}")]
    NotASite(PathBuf),
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} timed out after {secs}s")]
    Timeout { program: String, secs: u64 },
    #[error("Hugo build error: {0}")]
    Failed(String),
}

/// Result of inspecting the configured publish target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteCheck {
    pub configured: bool,
    pub exists: bool,
    pub has_config: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
}

impl SiteCheck {
    pub fn ok(&self) -> bool {
        self.configured && self.exists && self.has_config
    }

    pub fn message(&self) -> &'static str {
        match (self.configured, self.exists, self.has_config) {
            (false, _, _) => "Hugo path not configured",
            (true, false, _) => "Hugo path does not exist",
            (true, true, false) => {
                "Directory exists but does not appear to be a Hugo project (no config file found)"
            }
            (true, true, true) => "Hugo project found and looks valid",
        }
    }
}

/// Site root for a publish target: the path up to, not including, `content`.
///
/// Paths without a `content` component are returned unchanged.
pub fn site_root(hugo_path: &Path) -> PathBuf {
    let mut root = PathBuf::new();
    for component in hugo_path.components() {
        if component == Component::Normal("content".as_ref()) {
            return root;
        }
        root.push(component);
    }
    hugo_path.to_path_buf()
}

pub fn has_site_config(root: &Path) -> bool {
    SITE_CONFIG_NAMES.iter().any(|name| root.join(name).exists())
}

pub fn check_site(config: &AppConfig) -> SiteCheck {
    let Some(hugo) = config.hugo_path() else {
        return SiteCheck {
            configured: false,
            exists: false,
            has_config: false,
            root: None,
        };
    };
    let root = site_root(&hugo);
    let exists = hugo.exists();
    SiteCheck {
        configured: true,
        exists,
        has_config: exists && has_site_config(&root),
        root: Some(root),
    }
}

/// True when generator output reports a failure.
pub fn output_indicates_failure(stderr: &str) -> bool {
    stderr.contains("Error") || stderr.contains("fatal")
}

/// Captured output of a finished build.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs the generator once in a site root, with a deadline.
#[derive(Debug, Clone)]
pub struct SiteBuilder {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl Default for SiteBuilder {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            args: Vec::new(),
            timeout: BUILD_TIMEOUT,
        }
    }
}

impl SiteBuilder {
    pub fn build(&self, root: &Path) -> Result<BuildOutput, SiteError> {
        info!(program = %self.program, root = %root.display(), "building site");
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| self.spawn_error(source))?;

        // Drain both pipes while polling so a chatty child never blocks on a full pipe.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let started = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if started.elapsed() > self.timeout => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(SiteError::Timeout {
                        program: self.program.clone(),
                        secs: self.timeout.as_secs(),
                    });
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(source) => return Err(self.spawn_error(source)),
            }
        };

        let output = BuildOutput {
            stdout: join_drain(stdout),
            stderr: join_drain(stderr),
        };
        debug!(status = %status, stderr_len = output.stderr.len(), "build finished");
        check_outcome(status, output)
    }

    fn spawn_error(&self, source: io::Error) -> SiteError {
        SiteError::Spawn {
            program: self.program.clone(),
            source,
        }
    }
}

/// Build the configured site with the default generator.
pub fn build_site(config: &AppConfig) -> Result<BuildOutput, SiteError> {
    let hugo = config.hugo_path().ok_or(SiteError::NotConfigured)?;
    let root = site_root(&hugo);
    if !has_site_config(&root) {
        return Err(SiteError::NotASite(root));
    }
    SiteBuilder::default().build(&root)
}

fn check_outcome(status: ExitStatus, output: BuildOutput) -> Result<BuildOutput, SiteError> {
    if !status.success() {
        let detail = if output.stderr.trim().is_empty() {
            format!("exited with {status}")
        } else {
            output.stderr.trim().to_string()
        };
        return Err(SiteError::Failed(detail));
    }
    if output_indicates_failure(&output.stderr) {
        return Err(SiteError::Failed(output.stderr.trim().to_string()));
    }
    Ok(output)
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn join_drain(handle: Option<thread::JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}
