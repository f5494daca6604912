//! Deterministic suggestion rotation.
//!
//! When AI analysis yields no continuation prompt, the loop falls back to a
//! suggestion picked from the active preset by iteration number. The same
//! preset table, key, and iteration always give the same suggestion.

use serde::{Deserialize, Serialize};

use super::{Preset, PresetTable, GENERIC_PRESET};

/// Reminders used when no preset supplies any suggestions.
pub const BUILTIN_SUGGESTIONS: [&str; 3] = [
    "Complete your current task before moving on",
    "Check your backlog and pick the highest priority item",
    "Verify your recent changes actually work",
];

/// Outcome of one rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionResult {
    /// Preset the list came from; `generic` when the requested key is unknown.
    pub preset: String,
    pub suggestion: String,
    /// Always `< total_suggestions`.
    pub suggestion_index: usize,
    pub total_suggestions: usize,
}

/// Picks suggestions from a preset table.
#[derive(Debug, Clone, Copy)]
pub struct SuggestionRotator<'a> {
    table: &'a PresetTable,
}

impl<'a> SuggestionRotator<'a> {
    #[must_use]
    pub fn new(table: &'a PresetTable) -> Self {
        Self { table }
    }

    /// Select the suggestion for `preset_key` at `iteration`.
    ///
    /// The candidate list is the first non-empty of:
    /// 1. the preset's `exploitation` list,
    /// 2. the preset's `suggestions` list,
    /// 3. the same two lists of `generic`, if `preset_key` is unknown,
    /// 4. [`BUILTIN_SUGGESTIONS`].
    ///
    /// The index is `iteration` modulo the list length, never negative.
    #[must_use]
    pub fn select(&self, preset_key: &str, iteration: i64) -> SuggestionResult {
        let (resolved, preset) = match self.table.get(preset_key) {
            Some(preset) => (preset_key, Some(preset)),
            None => (GENERIC_PRESET, self.table.get(GENERIC_PRESET)),
        };

        let candidates: Vec<&str> = match preset.and_then(Preset::rotation_list) {
            Some(list) => list.iter().map(String::as_str).collect(),
            None => BUILTIN_SUGGESTIONS.to_vec(),
        };

        let total = candidates.len();
        let index = rotation_index(iteration, total);

        SuggestionResult {
            preset: resolved.to_string(),
            suggestion: candidates[index].to_string(),
            suggestion_index: index,
            total_suggestions: total,
        }
    }
}

/// `iteration mod total` with a non-negative result. `total` must be > 0.
fn rotation_index(iteration: i64, total: usize) -> usize {
    let total = i64::try_from(total).unwrap_or(i64::MAX);
    // rem_euclid with a positive divisor is always in 0..total
    usize::try_from(iteration.rem_euclid(total)).unwrap_or(0)
}

/// Shorthand for [`SuggestionRotator::select`].
#[must_use]
pub fn select(table: &PresetTable, preset_key: &str, iteration: i64) -> SuggestionResult {
    SuggestionRotator::new(table).select(preset_key, iteration)
}
