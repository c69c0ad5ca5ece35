pub mod types;
pub mod json_span;
pub mod locator;
pub mod parser;
pub mod prompt;
pub mod client;
pub mod refine;
pub mod validation;
pub mod orchestrator;

pub use types::*;
pub use json_span::*;
pub use locator::*;
pub use parser::*;
pub use prompt::*;
pub use client::*;
pub use refine::*;
pub use validation::*;
pub use orchestrator::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RiskError {
    #[error("Chat endpoint unreachable at {0}")]
    Connection(String),

    #[error("Chat endpoint returned error (status {status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("JSON refinement call failed (status {status}): {body}")]
    Refinement { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Chat response contained no usable content")]
    EmptyContent,

    #[error("Failed to parse risk assessment JSON")]
    ParseFailed,

    #[error("Risk assessment does not match schema: {0}")]
    SchemaMismatch(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
