use serde::{Deserialize, Deserializer, Serialize};

use super::RiskError;

/// Overall risk level reported for a batch of care logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Medium,
    High,
}

/// Severity of a single finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Medium,
    High,
}

/// Structured risk assessment returned by the model.
///
/// Unknown fields are ignored on read; every field below is required.
/// `findings` keeps the order the model reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessmentResult {
    pub risk_level: RiskLevel,
    pub findings: Vec<Finding>,
    pub notes: String,
}

/// One risk observation tied back to the source log text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    pub severity: Severity,
    pub evidence: Vec<String>,
    pub recommendation: String,
    pub tasks: Vec<String>,
    pub goal: String,
}

/// A single care-log entry as supplied by the caller. Only `id` and
/// `content` are assumed present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareLogEntry {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub content: String,
}

impl CareLogEntry {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }
}

/// Role-tagged chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        Self {
            role: "system".to_string(),
            content: content.to_string(),
        }
    }

    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

/// Body of a `/chat/completions` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Chat-completion endpoint abstraction (allows mocking).
///
/// Returns the raw, weakly-typed response envelope. Non-success HTTP
/// statuses surface as `RiskError::Upstream`.
pub trait ChatClient {
    fn complete(&self, request: &ChatRequest) -> Result<serde_json::Value, RiskError>;
}

impl<T: ChatClient + ?Sized> ChatClient for std::sync::Arc<T> {
    fn complete(&self, request: &ChatRequest) -> Result<serde_json::Value, RiskError> {
        (**self).complete(request)
    }
}

/// Accept ids sent as JSON numbers as well as strings.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}
