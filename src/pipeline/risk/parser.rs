use serde_json::Value;

use super::json_span::extract_json_span;
use super::types::RiskAssessmentResult;
use super::RiskError;

/// Parse `text` as a JSON object, falling back to the extracted span.
///
/// Never fails loudly: `None` means "recoverable failure" and leaves the
/// decision to escalate with the caller. Top-level values that are not
/// objects count as failures.
pub fn parse_structured(text: &str) -> Option<Value> {
    if let Some(object) = parse_object(text) {
        return Some(object);
    }

    let span = extract_json_span(text)?;
    parse_object(span)
}

fn parse_object(text: &str) -> Option<Value> {
    serde_json::from_str::<Value>(text)
        .ok()
        .filter(Value::is_object)
}

/// Decode a parsed object into the assessment schema.
///
/// Extra fields are ignored, missing required fields or unknown enum
/// values are rejected.
pub fn decode_assessment(value: Value) -> Result<RiskAssessmentResult, RiskError> {
    serde_json::from_value(value).map_err(|e| RiskError::SchemaMismatch(e.to_string()))
}
