//! Best-effort state document parsing.
//!
//! The state document is free-form markdown maintained by the agent. Parsing
//! is a small declarative scanner: each scalar field has its own line rule,
//! each section has a heading and an item filter, and every rule is applied
//! independently on top of [`Snapshot::default`]. A rule that finds nothing
//! usable leaves its field at the default, so one malformed line can never
//! take the rest of the snapshot down with it.
//!
//! Recognized syntax:
//!
//! ```text
//! iteration: 3
//! max_iterations: 50
//! mode: discovery
//! scope: src/api
//! issues_found: 2
//! issues_fixed: 1
//!
//! ## Current Focus
//! Free text, possibly several lines.
//!
//! ## Backlog
//! - [ ] open item
//!
//! ## Completed
//! - [x] closed item
//! ```

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use super::Snapshot;

// ============================================================================
// Scalar Fields
// ============================================================================

/// Scalar keys recognized in `key: value` lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScalarField {
    Iteration,
    MaxIterations,
    Mode,
    Scope,
    IssuesFound,
    IssuesFixed,
}

/// Shape of the value a scalar rule captures.
#[derive(Debug, Clone, Copy)]
enum ValueShape {
    /// Decimal digits only.
    Count,
    /// A single token (`[\w-]+`).
    Token,
    /// The rest of the line.
    Line,
}

impl ValueShape {
    const fn pattern(self) -> &'static str {
        match self {
            Self::Count => r"\d+",
            Self::Token => r"[\w-]+",
            Self::Line => r"[^\r\n]+",
        }
    }
}

impl ScalarField {
    const ALL: [ScalarField; 6] = [
        Self::Iteration,
        Self::MaxIterations,
        Self::Mode,
        Self::Scope,
        Self::IssuesFound,
        Self::IssuesFixed,
    ];

    const fn key(self) -> &'static str {
        match self {
            Self::Iteration => "iteration",
            Self::MaxIterations => "max_iterations",
            Self::Mode => "mode",
            Self::Scope => "scope",
            Self::IssuesFound => "issues_found",
            Self::IssuesFixed => "issues_fixed",
        }
    }

    const fn shape(self) -> ValueShape {
        match self {
            Self::Mode => ValueShape::Token,
            Self::Scope => ValueShape::Line,
            _ => ValueShape::Count,
        }
    }

    /// Write `raw` into the snapshot. Returns `false` when the value is
    /// rejected and the default stays in place.
    fn apply(self, snapshot: &mut Snapshot, raw: &str) -> bool {
        let value = raw.trim();
        if value.is_empty() {
            return false;
        }

        match self {
            Self::Iteration => set_positive(&mut snapshot.iteration, value),
            Self::MaxIterations => set_positive(&mut snapshot.max_iterations, value),
            Self::IssuesFound => set_count(&mut snapshot.issues_found, value),
            Self::IssuesFixed => set_count(&mut snapshot.issues_fixed, value),
            Self::Mode => {
                snapshot.mode = value.to_string();
                true
            }
            Self::Scope => {
                snapshot.scope = value.to_string();
                true
            }
        }
    }
}

fn set_count(slot: &mut u32, value: &str) -> bool {
    match value.parse::<u32>() {
        Ok(n) => {
            *slot = n;
            true
        }
        Err(_) => false,
    }
}

fn set_positive(slot: &mut u32, value: &str) -> bool {
    match value.parse::<u32>() {
        Ok(n) if n > 0 => {
            *slot = n;
            true
        }
        _ => false,
    }
}

/// One compiled rule per scalar key, anchored at line start.
static SCALAR_RULES: LazyLock<Vec<(ScalarField, Regex)>> = LazyLock::new(|| {
    ScalarField::ALL
        .iter()
        .filter_map(|&field| {
            let pattern = format!(
                r"(?m)^[ \t]*{}:[ \t]*({})",
                regex::escape(field.key()),
                field.shape().pattern()
            );
            Regex::new(&pattern).ok().map(|re| (field, re))
        })
        .collect()
});

// ============================================================================
// Sections
// ============================================================================

/// How a section's body becomes snapshot content.
#[derive(Debug, Clone, Copy)]
enum SectionContent {
    /// Trimmed body text.
    Text,
    /// Unchecked checklist items.
    OpenItems,
    /// Checked checklist items.
    ClosedItems,
}

const CURRENT_FOCUS: (&str, SectionContent) = ("Current Focus", SectionContent::Text);
const BACKLOG: (&str, SectionContent) = ("Backlog", SectionContent::OpenItems);
const COMPLETED: (&str, SectionContent) = ("Completed", SectionContent::ClosedItems);

static OPEN_ITEM: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[ \t]*[-*+][ \t]+\[ \][ \t]+(.+)$").ok());

static CLOSED_ITEM: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[ \t]*[-*+][ \t]+\[[xX]\][ \t]+(.+)$").ok());

/// Heading text of a markdown heading line, if `line` is one.
///
/// A heading is one to six `#` followed by whitespace or end of line, so
/// `#42` or `#urgent` inside a section body stays body text.
fn heading_text(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let rest = trimmed.trim_start_matches('#');
    let level = trimmed.len() - rest.len();
    if !(1..=6).contains(&level) {
        return None;
    }
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim())
}

/// Lines between the first heading named `title` and the next heading.
///
/// Returns `None` when the heading does not appear at all.
fn section_body<'a>(document: &'a str, title: &str) -> Option<Vec<&'a str>> {
    let mut lines = document.lines();

    lines.find(|line| heading_text(line).is_some_and(|text| text.eq_ignore_ascii_case(title)))?;

    Some(
        lines
            .take_while(|line| heading_text(line).is_none())
            .collect(),
    )
}

fn checklist_items(body: &[&str], rule: &Option<Regex>) -> Vec<String> {
    let Some(re) = rule else {
        return Vec::new();
    };

    body.iter()
        .filter_map(|line| re.captures(line))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn apply_section(snapshot: &mut Snapshot, document: &str, section: (&str, SectionContent)) {
    let (title, content) = section;
    let Some(body) = section_body(document, title) else {
        return;
    };

    match content {
        SectionContent::Text => {
            snapshot.current_focus = body.join("\n").trim().to_string();
        }
        SectionContent::OpenItems => {
            snapshot.backlog = checklist_items(&body, &OPEN_ITEM);
        }
        SectionContent::ClosedItems => {
            snapshot.completed = checklist_items(&body, &CLOSED_ITEM);
        }
    }
}

// ============================================================================
// Entry Point
// ============================================================================

/// Parse a state document into a [`Snapshot`].
///
/// Never fails. Each field is extracted independently and falls back to its
/// default when absent or malformed. When a key appears more than once, the
/// first occurrence in document order wins.
///
/// # Example
///
/// ```
/// use claude_loop::state::parse;
///
/// let snapshot = parse("iteration: not-a-number\nissues_found: 4\n");
/// assert_eq!(snapshot.iteration, 1);
/// assert_eq!(snapshot.issues_found, 4);
/// ```
#[must_use]
pub fn parse(document: &str) -> Snapshot {
    let mut snapshot = Snapshot::default();

    for (field, re) in SCALAR_RULES.iter() {
        let Some(raw) = re.captures(document).and_then(|caps| caps.get(1)) else {
            continue;
        };
        if !field.apply(&mut snapshot, raw.as_str()) {
            debug!(
                "Ignoring unusable value '{}' for '{}'",
                raw.as_str(),
                field.key()
            );
        }
    }

    for section in [CURRENT_FOCUS, BACKLOG, COMPLETED] {
        apply_section(&mut snapshot, document, section);
    }

    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::{FULL_STATE, SCENARIO_STATE};

    // =========================================================================
    // Scalar Field Tests
    // =========================================================================

    #[test]
    fn test_parse_full_document() {
        let snapshot = parse(FULL_STATE);
        assert_eq!(snapshot.iteration, 12);
        assert_eq!(snapshot.max_iterations, 30);
        assert_eq!(snapshot.mode, "review");
        assert_eq!(snapshot.scope, "src/payments and related tests");
        assert_eq!(snapshot.issues_found, 5);
        assert_eq!(snapshot.issues_fixed, 3);
        assert_eq!(
            snapshot.current_focus,
            "Harden refund flow against double submission.\nKeep changes inside the payments crate."
        );
        assert_eq!(
            snapshot.backlog,
            vec![
                "Validate currency codes".to_string(),
                "Add idempotency keys to refunds".to_string(),
            ]
        );
        assert_eq!(
            snapshot.completed,
            vec![
                "Fix rounding in tax calculation".to_string(),
                "Remove dead webhook handler".to_string(),
            ]
        );
    }

    #[test]
    fn test_parse_empty_document_is_all_defaults() {
        assert_eq!(parse(""), Snapshot::default());
    }

    #[test]
    fn test_parse_unrelated_text_is_all_defaults() {
        let doc = "# Notes\n\nNothing structured in here at all.\n";
        assert_eq!(parse(doc), Snapshot::default());
    }

    #[test]
    fn test_non_numeric_count_keeps_default() {
        let snapshot = parse("iteration: soon\nmax_iterations: lots\nissues_fixed: 2\n");
        assert_eq!(snapshot.iteration, 1);
        assert_eq!(snapshot.max_iterations, 50);
        assert_eq!(snapshot.issues_fixed, 2);
    }

    #[test]
    fn test_overflowing_count_keeps_default() {
        let snapshot = parse("issues_found: 99999999999999999999\n");
        assert_eq!(snapshot.issues_found, 0);
    }

    #[test]
    fn test_zero_iteration_keeps_default() {
        let snapshot = parse("iteration: 0\nmax_iterations: 0\nissues_found: 0\n");
        assert_eq!(snapshot.iteration, 1);
        assert_eq!(snapshot.max_iterations, 50);
        assert_eq!(snapshot.issues_found, 0);
    }

    #[test]
    fn test_first_duplicate_key_wins() {
        let snapshot = parse("iteration: 4\nmode: build\niteration: 9\nmode: debug\n");
        assert_eq!(snapshot.iteration, 4);
        assert_eq!(snapshot.mode, "build");
    }

    #[test]
    fn test_max_iterations_does_not_satisfy_iteration() {
        let snapshot = parse("max_iterations: 80\n");
        assert_eq!(snapshot.iteration, 1);
        assert_eq!(snapshot.max_iterations, 80);
    }

    #[test]
    fn test_scope_takes_rest_of_line_trimmed() {
        let snapshot = parse("scope:   the CLI, not the server   \nmode: docs\n");
        assert_eq!(snapshot.scope, "the CLI, not the server");
        assert_eq!(snapshot.mode, "docs");
    }

    #[test]
    fn test_blank_scope_keeps_default() {
        let snapshot = parse("scope:    \nmode: docs\n");
        assert_eq!(snapshot.scope, "unknown");
    }

    #[test]
    fn test_hyphenated_mode() {
        assert_eq!(parse("mode: code-quality\n").mode, "code-quality");
    }

    #[test]
    fn test_indented_keys_are_recognized() {
        let snapshot = parse("  iteration: 6\n\tissues_found: 3\n");
        assert_eq!(snapshot.iteration, 6);
        assert_eq!(snapshot.issues_found, 3);
    }

    // =========================================================================
    // Section Tests
    // =========================================================================

    #[test]
    fn test_scenario_backlog_and_completed_without_focus() {
        let snapshot = parse(SCENARIO_STATE);
        assert_eq!(snapshot.iteration, 3);
        assert_eq!(
            snapshot.backlog,
            vec!["Write parser tests".to_string(), "Handle CRLF".to_string()]
        );
        assert_eq!(snapshot.completed, vec!["Set up project".to_string()]);
        assert_eq!(snapshot.current_focus, "");
    }

    #[test]
    fn test_section_stops_at_next_heading() {
        let doc = "## Backlog\n- [ ] first\n## Notes\n- [ ] not backlog\n";
        assert_eq!(parse(doc).backlog, vec!["first".to_string()]);
    }

    #[test]
    fn test_backlog_ignores_checked_items() {
        let doc = "## Backlog\n- [x] done already\n- [ ] still open\n";
        assert_eq!(parse(doc).backlog, vec!["still open".to_string()]);
    }

    #[test]
    fn test_completed_ignores_open_items_and_accepts_uppercase() {
        let doc = "## Completed\n- [ ] not done\n- [X] shipped\n* [x] also shipped\n";
        assert_eq!(
            parse(doc).completed,
            vec!["shipped".to_string(), "also shipped".to_string()]
        );
    }

    #[test]
    fn test_malformed_section_yields_empty() {
        let doc = "## Backlog\nJust prose about what might happen next.\n";
        assert!(parse(doc).backlog.is_empty());
    }

    #[test]
    fn test_missing_sections_yield_empty() {
        let snapshot = parse("iteration: 2\n");
        assert!(snapshot.backlog.is_empty());
        assert!(snapshot.completed.is_empty());
        assert!(snapshot.current_focus.is_empty());
    }

    #[test]
    fn test_focus_at_end_of_document() {
        let doc = "## Current Focus\n   Ship the release notes   ";
        assert_eq!(parse(doc).current_focus, "Ship the release notes");
    }

    #[test]
    fn test_empty_focus_section() {
        let doc = "## Current Focus\n\n## Backlog\n- [ ] a\n";
        let snapshot = parse(doc);
        assert_eq!(snapshot.current_focus, "");
        assert_eq!(snapshot.backlog, vec!["a".to_string()]);
    }

    #[test]
    fn test_section_heading_case_insensitive() {
        let doc = "## current focus\nLower-case heading\n";
        assert_eq!(parse(doc).current_focus, "Lower-case heading");
    }

    #[test]
    fn test_crlf_document() {
        let doc = "iteration: 5\r\n## Backlog\r\n- [ ] windows item\r\n";
        let snapshot = parse(doc);
        assert_eq!(snapshot.iteration, 5);
        assert_eq!(snapshot.backlog, vec!["windows item".to_string()]);
    }

    #[test]
    fn test_section_order_is_irrelevant() {
        let doc = "## Completed\n- [x] b\n## Backlog\n- [ ] a\niteration: 4\n";
        let snapshot = parse(doc);
        assert_eq!(snapshot.completed, vec!["b".to_string()]);
        assert_eq!(snapshot.backlog, vec!["a".to_string()]);
        // Scalar rules scan the whole document, sections included
        assert_eq!(snapshot.iteration, 4);
    }

    #[test]
    fn test_hash_prefixed_body_lines_stay_in_section() {
        let doc = "## Current Focus\n#42 crash on login\n\n## Backlog\n- [ ] a\n#urgent\n- [ ] b\n";
        let snapshot = parse(doc);
        assert_eq!(snapshot.current_focus, "#42 crash on login");
        assert_eq!(snapshot.backlog, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_heading_text_requires_space_after_hashes() {
        assert_eq!(heading_text("## Backlog"), Some("Backlog"));
        assert_eq!(heading_text("  #\tNotes"), Some("Notes"));
        assert_eq!(heading_text("###"), Some(""));
        assert_eq!(heading_text("#42 crash"), None);
        assert_eq!(heading_text("####### too deep"), None);
        assert_eq!(heading_text("plain text"), None);
    }
}
