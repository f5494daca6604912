//! Idle detection between consecutive iterations.
//!
//! No single signal is a reliable idleness indicator: an agent may tick off
//! backlog items without touching the focus line, or reword the focus without
//! doing anything. An iteration therefore only counts as idle when *every*
//! tracked signal is unchanged, the raw change summary included. This errs
//! toward continuing the loop rather than declaring stagnation early.
//!
//! # Example
//!
//! ```
//! use claude_loop::idle::evaluate;
//! use claude_loop::state::Snapshot;
//!
//! let before = Snapshot::parse("iteration: 2\n");
//! let after = before.clone();
//!
//! assert!(evaluate(&before, &after, "").is_idle());
//! assert!(!evaluate(&before, &after, " src/lib.rs | 4 ++--").is_idle());
//! ```

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::state::Snapshot;

/// The six independent comparison signals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IdleSignals {
    /// The snapshots differ anywhere.
    ///
    /// Implied by any of the snapshot-level signals below; kept as its own
    /// signal so the verdict shape stays stable for consumers.
    pub state_changed: bool,
    /// The change summary is non-blank.
    pub git_changed: bool,
    pub focus_changed: bool,
    /// Either `issues_found` or `issues_fixed` moved.
    pub issues_changed: bool,
    pub backlog_changed: bool,
    pub completed_changed: bool,
}

impl IdleSignals {
    /// Whether any signal fired.
    #[must_use]
    pub fn any(&self) -> bool {
        self.state_changed
            || self.git_changed
            || self.focus_changed
            || self.issues_changed
            || self.backlog_changed
            || self.completed_changed
    }

    /// Names of the signals that fired, in declaration order.
    #[must_use]
    pub fn fired(&self) -> Vec<&'static str> {
        [
            ("state_changed", self.state_changed),
            ("git_changed", self.git_changed),
            ("focus_changed", self.focus_changed),
            ("issues_changed", self.issues_changed),
            ("backlog_changed", self.backlog_changed),
            ("completed_changed", self.completed_changed),
        ]
        .into_iter()
        .filter_map(|(name, fired)| fired.then_some(name))
        .collect()
    }
}

/// Result of comparing two snapshots plus a change summary.
///
/// `is_idle` is derived from the signals on every read and cannot be set
/// independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleVerdict {
    signals: IdleSignals,
}

impl IdleVerdict {
    #[must_use]
    pub fn new(signals: IdleSignals) -> Self {
        Self { signals }
    }

    /// True only when no signal fired.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        !self.signals.any()
    }

    #[must_use]
    pub fn signals(&self) -> &IdleSignals {
        &self.signals
    }
}

impl Serialize for IdleVerdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("IdleVerdict", 2)?;
        state.serialize_field("is_idle", &self.is_idle())?;
        state.serialize_field("signals", &self.signals)?;
        state.end()
    }
}

impl std::fmt::Display for IdleVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_idle() {
            write!(f, "idle")
        } else {
            write!(f, "active ({})", self.signals.fired().join(", "))
        }
    }
}

/// Compare two snapshots and a change summary.
///
/// Pure: no I/O and no failure modes.
#[must_use]
pub fn evaluate(before: &Snapshot, after: &Snapshot, change_summary: &str) -> IdleVerdict {
    IdleVerdict::new(IdleSignals {
        state_changed: before != after,
        git_changed: !change_summary.trim().is_empty(),
        focus_changed: before.current_focus != after.current_focus,
        issues_changed: before.issues_found != after.issues_found
            || before.issues_fixed != after.issues_fixed,
        backlog_changed: before.backlog != after.backlog,
        completed_changed: before.completed != after.completed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Snapshot {
        Snapshot {
            iteration: 4,
            current_focus: "Refactor config loading".to_string(),
            backlog: vec!["Add tests".to_string(), "Update docs".to_string()],
            completed: vec!["Split modules".to_string()],
            ..Snapshot::default()
        }
    }

    #[test]
    fn test_identical_snapshots_no_diff_is_idle() {
        let s = base();
        let verdict = evaluate(&s, &s, "");
        assert!(verdict.is_idle());
        assert_eq!(*verdict.signals(), IdleSignals::default());
        assert!(verdict.signals().fired().is_empty());
    }

    #[test]
    fn test_default_snapshots_are_idle() {
        let s = Snapshot::default();
        assert!(evaluate(&s, &s, "").is_idle());
    }

    #[test]
    fn test_whitespace_only_diff_is_idle() {
        let s = base();
        assert!(evaluate(&s, &s, "  \n\t ").is_idle());
    }

    #[test]
    fn test_git_change_alone_is_active() {
        let s = base();
        let verdict = evaluate(&s, &s, " src/main.rs | 2 +-\n 1 file changed");
        assert!(!verdict.is_idle());
        assert_eq!(verdict.signals().fired(), vec!["git_changed"]);
    }

    #[test]
    fn test_focus_change_is_never_idle() {
        let before = base();
        let after = Snapshot {
            current_focus: "Refactor config loading (phase 2)".to_string(),
            ..base()
        };
        let verdict = evaluate(&before, &after, "");
        assert!(!verdict.is_idle());
        assert!(verdict.signals().focus_changed);
        assert!(verdict.signals().state_changed);
        assert!(!verdict.signals().backlog_changed);
    }

    #[test]
    fn test_issue_counters() {
        let before = base();
        let found = Snapshot {
            issues_found: 1,
            ..base()
        };
        let fixed = Snapshot {
            issues_fixed: 1,
            ..base()
        };
        assert!(evaluate(&before, &found, "").signals().issues_changed);
        assert!(evaluate(&before, &fixed, "").signals().issues_changed);
    }

    #[test]
    fn test_backlog_reorder_counts_as_change() {
        let before = base();
        let after = Snapshot {
            backlog: vec!["Update docs".to_string(), "Add tests".to_string()],
            ..base()
        };
        let verdict = evaluate(&before, &after, "");
        assert!(verdict.signals().backlog_changed);
        assert!(!verdict.is_idle());
    }

    #[test]
    fn test_completed_change() {
        let before = base();
        let mut after = base();
        after.completed.push("Add tests".to_string());
        let verdict = evaluate(&before, &after, "");
        assert_eq!(
            verdict.signals().fired(),
            vec!["state_changed", "completed_changed"]
        );
    }

    #[test]
    fn test_iteration_bump_only_changes_state() {
        let before = base();
        let after = Snapshot {
            iteration: 5,
            ..base()
        };
        let verdict = evaluate(&before, &after, "");
        assert_eq!(verdict.signals().fired(), vec!["state_changed"]);
        assert!(!verdict.is_idle());
    }

    #[test]
    fn test_is_idle_tracks_every_signal_combination() {
        for bits in 0u8..64 {
            let signals = IdleSignals {
                state_changed: bits & 1 != 0,
                git_changed: bits & 2 != 0,
                focus_changed: bits & 4 != 0,
                issues_changed: bits & 8 != 0,
                backlog_changed: bits & 16 != 0,
                completed_changed: bits & 32 != 0,
            };
            assert_eq!(IdleVerdict::new(signals).is_idle(), bits == 0);
        }
    }

    #[test]
    fn test_serialized_shape() {
        let s = base();
        let json = serde_json::to_value(evaluate(&s, &s, "x")).unwrap();
        assert_eq!(json["is_idle"], false);
        assert_eq!(json["signals"]["git_changed"], true);
        assert_eq!(json["signals"]["focus_changed"], false);
        assert_eq!(json["signals"].as_object().unwrap().len(), 6);
    }

    #[test]
    fn test_display() {
        let s = base();
        assert_eq!(evaluate(&s, &s, "").to_string(), "idle");
        assert_eq!(evaluate(&s, &s, "diff").to_string(), "active (git_changed)");
    }
}
