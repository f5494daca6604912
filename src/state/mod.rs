//! Loop state snapshots.
//!
//! A [`Snapshot`] is the structured view of one state document at one point
//! in time. Snapshots are rebuilt from text on every invocation and compared
//! by value; nothing here ever writes the state document back.
//!
//! # Example
//!
//! ```
//! use claude_loop::state::Snapshot;
//!
//! let snapshot = Snapshot::parse("iteration: 3\n\n## Backlog\n- [ ] Fix login\n");
//! assert_eq!(snapshot.iteration, 3);
//! assert_eq!(snapshot.backlog, vec!["Fix login".to_string()]);
//! assert_eq!(snapshot.max_iterations, 50);
//! ```

pub mod parser;

pub use parser::parse;

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Default iteration when the document does not name one.
pub const DEFAULT_ITERATION: u32 = 1;
/// Default iteration cap.
pub const DEFAULT_MAX_ITERATIONS: u32 = 50;
/// Default loop mode.
pub const DEFAULT_MODE: &str = "discovery";
/// Default scope.
pub const DEFAULT_SCOPE: &str = "unknown";

/// Structured point-in-time view of the loop state document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Current iteration (1-indexed).
    pub iteration: u32,
    /// Iteration cap for the loop.
    pub max_iterations: u32,
    /// Free-form loop mode token (e.g. "discovery").
    pub mode: String,
    /// Free-form description of what the loop is allowed to touch.
    pub scope: String,
    pub issues_found: u32,
    pub issues_fixed: u32,
    /// Body of the "Current Focus" section, possibly empty.
    pub current_focus: String,
    /// Open checklist items from the "Backlog" section, in document order.
    pub backlog: Vec<String>,
    /// Closed checklist items from the "Completed" section, in document order.
    pub completed: Vec<String>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            iteration: DEFAULT_ITERATION,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            mode: DEFAULT_MODE.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            issues_found: 0,
            issues_fixed: 0,
            current_focus: String::new(),
            backlog: Vec::new(),
            completed: Vec::new(),
        }
    }
}

impl Snapshot {
    /// Parse a state document. Never fails; see [`parser::parse`].
    #[must_use]
    pub fn parse(document: &str) -> Self {
        parser::parse(document)
    }

    /// Reduced view embedded in analysis reports.
    #[must_use]
    pub fn summary(&self) -> SnapshotSummary {
        SnapshotSummary {
            iteration: self.iteration,
            max_iterations: self.max_iterations,
            mode: self.mode.clone(),
            issues_found: self.issues_found,
            issues_fixed: self.issues_fixed,
        }
    }

    /// Render a canonical state document.
    ///
    /// Parsing the rendered text yields a snapshot equal to `self` as long as
    /// the values are single-line and free of heading or checklist syntax.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "---");
        let _ = writeln!(out, "iteration: {}", self.iteration);
        let _ = writeln!(out, "max_iterations: {}", self.max_iterations);
        let _ = writeln!(out, "mode: {}", self.mode);
        let _ = writeln!(out, "scope: {}", self.scope);
        let _ = writeln!(out, "issues_found: {}", self.issues_found);
        let _ = writeln!(out, "issues_fixed: {}", self.issues_fixed);
        let _ = writeln!(out, "---");
        let _ = writeln!(out);
        let _ = writeln!(out, "## Current Focus");
        if !self.current_focus.is_empty() {
            let _ = writeln!(out, "{}", self.current_focus);
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "## Backlog");
        for item in &self.backlog {
            let _ = writeln!(out, "- [ ] {}", item);
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "## Completed");
        for item in &self.completed {
            let _ = writeln!(out, "- [x] {}", item);
        }
        out
    }
}

/// Iteration counters and mode, without the free-text sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotSummary {
    pub iteration: u32,
    pub max_iterations: u32,
    pub mode: String,
    pub issues_found: u32,
    pub issues_fixed: u32,
}
