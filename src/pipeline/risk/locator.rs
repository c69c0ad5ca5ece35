//! Locates the model's answer inside a chat-completion response envelope.
//!
//! Providers disagree on where the answer lives, so the envelope is probed
//! field by field in a fixed order. Reasoning channels come first: some
//! models only emit well-formed JSON there when guardrails strip it from
//! the primary content field.

use serde_json::Value;

use super::json_span::extract_json_span;
use super::RiskError;

/// What a probe does with text that holds no JSON-looking span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fallback {
    /// Skip to the next probe.
    NextProbe,
    /// Return the raw text and let the parser decide.
    RawText,
}

struct Probe {
    field: &'static str,
    read: fn(&Value) -> Option<String>,
    fallback: Fallback,
}

/// Probes run against `choices[0]`, first success wins.
const PROBES: &[Probe] = &[
    Probe {
        field: "message.reasoning_content",
        read: message_reasoning,
        fallback: Fallback::NextProbe,
    },
    Probe {
        field: "reasoning_content",
        read: choice_reasoning,
        fallback: Fallback::NextProbe,
    },
    Probe {
        field: "message.content",
        read: message_content,
        fallback: Fallback::RawText,
    },
    Probe {
        field: "message.content[]",
        read: message_content_parts,
        fallback: Fallback::RawText,
    },
    Probe {
        field: "text",
        read: choice_text,
        fallback: Fallback::RawText,
    },
    Probe {
        field: "content",
        read: choice_content,
        fallback: Fallback::RawText,
    },
    Probe {
        field: "content[]",
        read: choice_content_parts,
        fallback: Fallback::RawText,
    },
];

fn message_reasoning(choice: &Value) -> Option<String> {
    non_empty_str(choice.pointer("/message/reasoning_content"))
}

fn choice_reasoning(choice: &Value) -> Option<String> {
    non_empty_str(choice.get("reasoning_content"))
}

fn message_content(choice: &Value) -> Option<String> {
    non_empty_str(choice.pointer("/message/content"))
}

fn message_content_parts(choice: &Value) -> Option<String> {
    joined_parts(choice.pointer("/message/content"))
}

fn choice_text(choice: &Value) -> Option<String> {
    non_empty_str(choice.get("text"))
}

fn choice_content(choice: &Value) -> Option<String> {
    non_empty_str(choice.get("content"))
}

fn choice_content_parts(choice: &Value) -> Option<String> {
    joined_parts(choice.get("content"))
}

/// Find the candidate answer text in a response envelope.
///
/// Only `choices[0]` is consulted. Returns the JSON-looking span when one
/// exists, otherwise the raw text of the first non-empty field. Fails with
/// `EmptyContent` after logging the envelope when nothing usable is found.
pub fn locate_candidate_text(envelope: &Value) -> Result<String, RiskError> {
    if let Some(choice) = envelope.pointer("/choices/0") {
        for probe in PROBES {
            let Some(text) = (probe.read)(choice) else {
                continue;
            };

            if let Some(span) = extract_json_span(&text) {
                tracing::debug!(field = probe.field, "JSON span located in response");
                return Ok(span.to_string());
            }

            if probe.fallback == Fallback::RawText {
                tracing::debug!(field = probe.field, "Using raw response text");
                return Ok(text);
            }
        }
    }

    log_unrecognized_envelope(envelope);
    Err(RiskError::EmptyContent)
}

/// Text of a refinement response: `message.content`, then `text`, else empty.
///
/// The refinement call is never escalated further, so no other shapes are
/// probed and an empty string simply fails to parse downstream.
pub fn primary_content_text(envelope: &Value) -> String {
    let Some(choice) = envelope.pointer("/choices/0") else {
        return String::new();
    };

    choice
        .pointer("/message/content")
        .and_then(Value::as_str)
        .or_else(|| choice.get("text").and_then(Value::as_str))
        .unwrap_or_default()
        .to_string()
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// Join an array of content parts with newlines, skipping blank parts.
/// A part is either a string or an object carrying `text`, `content` or `value`.
fn joined_parts(value: Option<&Value>) -> Option<String> {
    let parts: Vec<&str> = value?
        .as_array()?
        .iter()
        .filter_map(part_text)
        .filter(|s| !s.trim().is_empty())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

fn part_text(part: &Value) -> Option<&str> {
    if let Some(s) = part.as_str() {
        return Some(s);
    }
    ["text", "content", "value"]
        .iter()
        .find_map(|key| part.get(*key).and_then(Value::as_str))
}

fn log_unrecognized_envelope(envelope: &Value) {
    match serde_json::to_string(envelope) {
        Ok(raw) => tracing::error!(envelope = %raw, "Unrecognized chat response format"),
        Err(_) => tracing::error!("Unrecognized chat response format (envelope not serializable)"),
    }
}
