//! Change summaries from version control.
//!
//! The probe produces `git diff --stat` style text describing what changed
//! since the prior iteration. Callers only test it for blankness and compare
//! it raw, so the text is never parsed.
//!
//! The probe must never abort the calling flow: a missing `git`, a timeout,
//! a non-zero exit, or unreadable output all collapse to an empty summary.
//!
//! # Example
//!
//! ```rust,ignore
//! use claude_loop::changes::{ChangeSource, GitChangeProbe};
//!
//! let probe = GitChangeProbe::new(".");
//! let summary = probe.summarize().await;
//! if summary.is_empty() {
//!     println!("no changes detected");
//! }
//! ```

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command as AsyncCommand;
use tracing::debug;

/// Source of a textual change summary.
///
/// Implementations never fail; unavailability is reported as an empty string.
#[async_trait]
pub trait ChangeSource: Send + Sync {
    /// Summarize changes since the prior iteration.
    async fn summarize(&self) -> String;
}

/// Change probe backed by the `git` CLI.
///
/// Tries `git diff --stat HEAD~1` first (changes since the prior commit) and
/// falls back to `git diff --stat` (uncommitted changes) when the first query
/// produces nothing usable. Each query is bounded by [`Self::timeout`].
#[derive(Debug, Clone)]
pub struct GitChangeProbe {
    /// Working directory for git invocations.
    repo_path: PathBuf,
    /// Per-query timeout.
    timeout: Duration,
}

impl GitChangeProbe {
    /// Default per-query timeout.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

    const PRIMARY_QUERY: [&'static str; 3] = ["diff", "--stat", "HEAD~1"];
    const SECONDARY_QUERY: [&'static str; 2] = ["diff", "--stat"];

    #[must_use]
    pub fn new<P: AsRef<Path>>(repo_path: P) -> Self {
        Self {
            repo_path: repo_path.as_ref().to_path_buf(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set the per-query timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run one `git` query, returning trimmed stdout on success.
    ///
    /// Returns `None` on spawn failure, timeout, or non-zero exit.
    async fn run_query(&self, args: &[&str]) -> Option<String> {
        let child = AsyncCommand::new("git")
            .args(args)
            .current_dir(&self.repo_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => {
                debug!("git {} failed to spawn: {}", args.join(" "), e);
                return None;
            }
        };

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                debug!("git {} failed: {}", args.join(" "), e);
                return None;
            }
            Err(_) => {
                debug!(
                    "git {} timed out after {}s",
                    args.join(" "),
                    self.timeout.as_secs()
                );
                return None;
            }
        };

        if !output.status.success() {
            debug!(
                "git {} exited with code {}",
                args.join(" "),
                output.status.code().unwrap_or(-1)
            );
            return None;
        }

        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl ChangeSource for GitChangeProbe {
    async fn summarize(&self) -> String {
        if which::which("git").is_err() {
            debug!("git not found in PATH, reporting no changes");
            return String::new();
        }

        if let Some(summary) = self
            .run_query(&Self::PRIMARY_QUERY)
            .await
            .filter(|s| !s.is_empty())
        {
            return summary;
        }

        self.run_query(&Self::SECONDARY_QUERY)
            .await
            .unwrap_or_default()
    }
}

/// Change source that always reports the same text.
///
/// Used when version control should not be consulted (`--no-git`).
#[derive(Debug, Clone, Default)]
pub struct StaticChangeSource {
    summary: String,
}

impl StaticChangeSource {
    /// A source that reports no changes.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
        }
    }
}

#[async_trait]
impl ChangeSource for StaticChangeSource {
    async fn summarize(&self) -> String {
        self.summary.clone()
    }
}
