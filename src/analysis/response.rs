//! Extraction of a JSON object from untrusted service output.
//!
//! Models wrap JSON in prose, markdown fences, or both. The scanner walks the
//! text for brace groups that balance (respecting string literals and
//! escapes) and returns the first one that parses as a JSON object.

use serde_json::{Map, Value};

/// Upper bound on candidate brace groups examined per response.
const MAX_CANDIDATES: usize = 32;

/// Byte offset one past the `}` that closes the `{` at `start`.
fn balanced_end(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(start + offset + ch.len_utf8());
                }
            }
            _ => {}
        }
    }

    None
}

/// First balanced `{...}` group in `text` that parses as a JSON object.
#[must_use]
pub fn first_json_object(text: &str) -> Option<Map<String, Value>> {
    text.match_indices('{')
        .take(MAX_CANDIDATES)
        .filter_map(|(start, _)| {
            let end = balanced_end(text, start)?;
            serde_json::from_str::<Map<String, Value>>(&text[start..end]).ok()
        })
        .next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_object() {
        let obj = first_json_object(r#"{"a": 1}"#).unwrap();
        assert_eq!(obj["a"], 1);
    }

    #[test]
    fn test_object_wrapped_in_prose_and_fences() {
        let text = "Here is my analysis:\n```json\n{\"progress_status\": \"stuck\"}\n```\nGood luck!";
        let obj = first_json_object(text).unwrap();
        assert_eq!(obj["progress_status"], "stuck");
    }

    #[test]
    fn test_braces_inside_strings() {
        let text = r#"{"continuation_prompt": "Fix the } in config and the { too", "x": "\"}"}"#;
        let obj = first_json_object(text).unwrap();
        assert_eq!(
            obj["continuation_prompt"],
            "Fix the } in config and the { too"
        );
        assert_eq!(obj["x"], "\"}");
    }

    #[test]
    fn test_nested_object() {
        let obj = first_json_object(r#"prefix {"outer": {"inner": true}} suffix"#).unwrap();
        assert_eq!(obj["outer"]["inner"], true);
    }

    #[test]
    fn test_skips_non_json_brace_group() {
        let text = r#"Replace {name} with the value. {"suggested_next_focus": "docs"}"#;
        let obj = first_json_object(text).unwrap();
        assert_eq!(obj["suggested_next_focus"], "docs");
    }

    #[test]
    fn test_first_of_two_objects_wins() {
        let obj = first_json_object(r#"{"n": 1} {"n": 2}"#).unwrap();
        assert_eq!(obj["n"], 1);
    }

    #[test]
    fn test_no_object() {
        assert!(first_json_object("").is_none());
        assert!(first_json_object("I could not analyze this iteration.").is_none());
        assert!(first_json_object("[1, 2, 3]").is_none());
    }

    #[test]
    fn test_unbalanced_object() {
        assert!(first_json_object(r#"{"a": 1"#).is_none());
        assert!(first_json_object("}}} {").is_none());
    }

    #[test]
    fn test_malformed_json_inside_balanced_braces() {
        assert!(first_json_object("{progress_status: stuck}").is_none());
    }

    #[test]
    fn test_unicode_around_object() {
        let obj = first_json_object("分析 → {\"note\": \"täst\"} ✓").unwrap();
        assert_eq!(obj["note"], "täst");
    }
}
