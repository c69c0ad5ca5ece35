use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::Value;

use super::types::{ChatClient, ChatRequest};
use super::RiskError;
use crate::config::ProviderConfig;

/// Blocking client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiCompatClient {
    base_url: String,
    api_key: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OpenAiCompatClient {
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self, RiskError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| RiskError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self, RiskError> {
        Self::new(&config.base_url, &config.api_key, config.timeout_secs)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl ChatClient for OpenAiCompatClient {
    fn complete(&self, request: &ChatRequest) -> Result<Value, RiskError> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(request)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    RiskError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    RiskError::HttpClient(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    RiskError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(RiskError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .map_err(|e| RiskError::ResponseParsing(e.to_string()))
    }
}

/// One scripted reply of [`MockChatClient`].
#[derive(Debug, Clone)]
pub enum MockReply {
    Envelope(Value),
    Status { status: u16, body: String },
}

impl MockReply {
    /// Envelope whose `choices[0].message.content` is `content`.
    pub fn content(content: &str) -> Self {
        Self::Envelope(serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        }))
    }
}

/// Mock chat client for testing: replays scripted replies in order and
/// records every request it receives.
pub struct MockChatClient {
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockChatClient {
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, in call order.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests().len()
    }
}

impl ChatClient for MockChatClient {
    fn complete(&self, request: &ChatRequest) -> Result<Value, RiskError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        let next = self
            .replies
            .lock()
            .map_err(|_| RiskError::HttpClient("mock lock poisoned".into()))?
            .pop_front();

        match next {
            Some(MockReply::Envelope(envelope)) => Ok(envelope),
            Some(MockReply::Status { status, body }) => Err(RiskError::Upstream { status, body }),
            None => Err(RiskError::HttpClient("mock script exhausted".into())),
        }
    }
}
