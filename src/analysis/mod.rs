//! AI-assisted iteration analysis with a deterministic fallback.
//!
//! [`AnalysisOrchestrator::analyze`] always returns a complete [`Directive`].
//! When the service is unavailable, fails, or answers with nothing usable,
//! the result is [`Directive::fallback`]. Callers tell the two apart solely
//! by whether `continuation_prompt` is present.
//!
//! # Architecture
//!
//! ```text
//! AnalysisOrchestrator
//!   ├── prompt::build_prompt       - bounded request text
//!   ├── client::AnalysisClient     - ClaudeAnalyst | NullAnalyst (capability-checked)
//!   └── response::first_json_object - untrusted text → JSON object
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use claude_loop::analysis::{client::detect_client, AnalysisOrchestrator};
//! use claude_loop::config::Config;
//!
//! let orchestrator = AnalysisOrchestrator::new(detect_client(&Config::default().analysis));
//! let directive = orchestrator.analyze(&document, &changes, "src/api").await;
//! match directive.continuation_prompt {
//!     Some(prompt) => println!("{prompt}"),
//!     None => println!("falling back to preset suggestions"),
//! }
//! ```

pub mod client;
pub mod prompt;
pub mod response;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::changes::ChangeSource;
use crate::state::{Snapshot, SnapshotSummary};
use client::AnalysisClient;

// ============================================================================
// Directive
// ============================================================================

/// How the service judged the loop's progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    Progressing,
    Stuck,
    Idle,
    /// No judgement available (fallback, or an unrecognized value).
    #[default]
    Unknown,
}

impl ProgressStatus {
    /// Lenient parse; anything unrecognized is [`ProgressStatus::Unknown`].
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "progressing" => Self::Progressing,
            "stuck" => Self::Stuck,
            "idle" => Self::Idle,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Progressing => write!(f, "progressing"),
            Self::Stuck => write!(f, "stuck"),
            Self::Idle => write!(f, "idle"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Next-step guidance for the loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    pub suggested_next_focus: Option<String>,
    pub progress_status: ProgressStatus,
    /// Present only when the service produced one.
    pub continuation_prompt: Option<String>,
    pub scope_aligned: bool,
}

impl Default for Directive {
    fn default() -> Self {
        Self::fallback()
    }
}

impl Directive {
    /// The result used whenever AI analysis is unavailable.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            suggested_next_focus: None,
            progress_status: ProgressStatus::Unknown,
            continuation_prompt: None,
            scope_aligned: true,
        }
    }

    /// Build from a (possibly partial) JSON object.
    ///
    /// Missing or mistyped fields take their defaults; blank strings count
    /// as absent.
    #[must_use]
    pub fn from_object(object: &Map<String, Value>) -> Self {
        let text = |key: &str| {
            object
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Self {
            suggested_next_focus: text("suggested_next_focus"),
            progress_status: object
                .get("progress_status")
                .and_then(Value::as_str)
                .map(ProgressStatus::parse)
                .unwrap_or_default(),
            continuation_prompt: text("continuation_prompt"),
            scope_aligned: object
                .get("scope_aligned")
                .and_then(Value::as_bool)
                .unwrap_or(true),
        }
    }

    /// Parse a directive out of raw service output.
    #[must_use]
    pub fn from_response(text: &str) -> Option<Self> {
        response::first_json_object(text).map(|object| Self::from_object(&object))
    }

    /// Whether the AI path produced a continuation prompt.
    #[must_use]
    pub fn has_continuation(&self) -> bool {
        self.continuation_prompt.is_some()
    }
}

// ============================================================================
// Report
// ============================================================================

/// Combined output of one `analyze` invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub analysis: Directive,
    pub state: SnapshotSummary,
    pub has_git_changes: bool,
    /// True when the directive carries a continuation prompt.
    pub ai_available: bool,
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Runs one analysis attempt and absorbs every failure into the fallback.
pub struct AnalysisOrchestrator {
    client: Box<dyn AnalysisClient>,
}

impl AnalysisOrchestrator {
    #[must_use]
    pub fn new(client: Box<dyn AnalysisClient>) -> Self {
        Self { client }
    }

    /// Analyze one iteration.
    ///
    /// Makes at most one service call and never retries.
    pub async fn analyze(&self, document: &str, change_summary: &str, scope: &str) -> Directive {
        if !self.client.is_available() {
            debug!("Analysis service unavailable, using fallback directive");
            return Directive::fallback();
        }

        let prompt = prompt::build_prompt(document, change_summary, scope);

        let text = match self.client.complete(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Analysis call to {} failed: {}", self.client.model_name(), e);
                return Directive::fallback();
            }
        };

        match Directive::from_response(&text) {
            Some(directive) => {
                info!(
                    "Analysis from {}: {}",
                    self.client.model_name(),
                    directive.progress_status
                );
                directive
            }
            None => {
                warn!(
                    "Analysis response from {} contained no JSON object",
                    self.client.model_name()
                );
                Directive::fallback()
            }
        }
    }

    /// Parse the document, probe for changes, analyze, and assemble a report.
    pub async fn report(&self, document: &str, changes: &dyn ChangeSource) -> AnalysisReport {
        let snapshot = Snapshot::parse(document);
        let change_summary = changes.summarize().await;
        let directive = self
            .analyze(document, &change_summary, &snapshot.scope)
            .await;

        AnalysisReport {
            ai_available: directive.has_continuation(),
            has_git_changes: !change_summary.trim().is_empty(),
            state: snapshot.summary(),
            analysis: directive,
        }
    }
}
