//! Analysis prompt construction.

/// Maximum characters of the state document embedded in a prompt.
pub const MAX_STATE_CHARS: usize = 2000;

/// Maximum characters of the change summary embedded in a prompt.
pub const MAX_CHANGES_CHARS: usize = 1000;

/// Placeholder used when the change summary is blank.
pub const NO_CHANGES: &str = "(no changes detected)";

/// Longest prefix of `text` holding at most `max_chars` characters.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Build the analysis prompt.
///
/// The state document and change summary are cut to bounded prefixes so the
/// request size does not grow with the document.
#[must_use]
pub fn build_prompt(document: &str, change_summary: &str, scope: &str) -> String {
    let state = truncate_chars(document, MAX_STATE_CHARS);
    let changes = if change_summary.trim().is_empty() {
        NO_CHANGES
    } else {
        truncate_chars(change_summary, MAX_CHANGES_CHARS)
    };

    format!(
        r#"You are reviewing one iteration of an autonomous coding loop. Be brief.

## Scope
{scope}

## State File
{state}

## Git Changes
{changes}

Using the state file and the changes above, decide:
1. Which work looks finished?
2. What should the next iteration focus on?
3. Does the work stay inside the scope?

Respond with a single JSON object and nothing else (no markdown fences):
{{"suggested_next_focus": "one concrete action", "progress_status": "progressing|stuck|idle", "continuation_prompt": "one or two sentences for the next iteration", "scope_aligned": true}}"#
    )
}
