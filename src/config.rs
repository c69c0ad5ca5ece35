use std::net::SocketAddr;

use crate::pipeline::risk::RiskError;

/// Application-level constants
pub const APP_NAME: &str = "carelog-risk";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default chat model when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default transport timeout for chat calls (seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8787";

const SAKURA_DEFAULT_BASE_URL: &str = "https://api.ai.sakura.ad.jp/v1";
const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "info,carelog_risk_lib=debug,hyper=warn,reqwest=warn"
}

/// Chat-completion backends with an OpenAI-compatible API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Sakura,
    OpenAi,
}

impl ProviderKind {
    fn parse(value: &str) -> Result<Self, RiskError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sakura" => Ok(Self::Sakura),
            "openai" => Ok(Self::OpenAi),
            other => Err(RiskError::Config(format!("Unsupported AI provider: {other}"))),
        }
    }

    /// Environment variable prefix for this provider's settings.
    fn env_prefix(self) -> &'static str {
        match self {
            Self::Sakura => "SAKURA",
            Self::OpenAi => "OPENAI",
        }
    }

    fn default_base_url(self) -> &'static str {
        match self {
            Self::Sakura => SAKURA_DEFAULT_BASE_URL,
            Self::OpenAi => OPENAI_DEFAULT_BASE_URL,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sakura => write!(f, "sakura"),
            Self::OpenAi => write!(f, "openai"),
        }
    }
}

/// Connection settings for the chat-completion provider.
#[derive(Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("kind", &self.kind)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ProviderConfig {
    /// Read provider settings from the process environment.
    ///
    /// `AI_PROVIDER` selects `sakura` (default) or `openai`; the provider's
    /// `<PREFIX>_API_KEY` is required, `<PREFIX>_BASE_URL` and
    /// `<PREFIX>_RISK_MODEL` are optional. `LLM_TIMEOUT_SECS` overrides the
    /// transport timeout.
    pub fn from_env() -> Result<Self, RiskError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RiskError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let kind = match non_empty("AI_PROVIDER") {
            Some(value) => ProviderKind::parse(&value)?,
            None => ProviderKind::Sakura,
        };
        let prefix = kind.env_prefix();

        let key_var = format!("{prefix}_API_KEY");
        let api_key = non_empty(&key_var)
            .ok_or_else(|| RiskError::Config(format!("{key_var} is not set")))?;

        let base_url = non_empty(&format!("{prefix}_BASE_URL"))
            .unwrap_or_else(|| kind.default_base_url().to_string());
        let model = non_empty(&format!("{prefix}_RISK_MODEL"))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let timeout_secs = match non_empty("LLM_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                RiskError::Config(format!("LLM_TIMEOUT_SECS is not a number: {raw}"))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            kind,
            api_key,
            base_url,
            model,
            timeout_secs,
        })
    }
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

impl ServerConfig {
    /// `BIND_ADDR` (default `0.0.0.0:8787`).
    pub fn from_env() -> Result<Self, RiskError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, RiskError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw
            .trim()
            .parse()
            .map_err(|_| RiskError::Config(format!("Invalid BIND_ADDR: {raw}")))?;
        Ok(Self { bind_addr })
    }
}
