//! Isolates a JSON-looking span inside free-form model output.
//!
//! Heuristics, in priority order:
//! 1. a fence tagged `json` (tag matched case-insensitively), its inner text
//! 2. the first fence of any kind, the brace span inside it
//! 3. the raw text, from the first `{` to the last `}`
//!
//! Step 3 is deliberately greedy rather than depth-balanced. When a response
//! holds two independent objects (an example followed by the real answer)
//! the span covers both and will not parse.

use std::sync::LazyLock;

use regex::Regex;

static JSON_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)```json\s*(.*?)```").expect("valid json fence pattern"));

static ANY_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```\s*(.*?)```").expect("valid fence pattern"));

/// Find the most plausible JSON substring in `text`.
///
/// Pure; returns `None` rather than failing when nothing matches.
pub fn extract_json_span(text: &str) -> Option<&str> {
    if let Some(inner) = JSON_FENCE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
    {
        if !inner.is_empty() {
            return Some(inner.trim());
        }
    }

    if let Some(inner) = ANY_FENCE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
    {
        if let Some(span) = brace_span(inner) {
            return Some(span);
        }
    }

    brace_span(text)
}

/// First `{` through last `}`, or `None` if no `}` follows a `{`.
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if start < end {
        Some(&text[start..=end])
    } else {
        None
    }
}
