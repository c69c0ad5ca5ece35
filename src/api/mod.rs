//! HTTP surface for the risk assessment pipeline.
//!
//! Routes are nested under `/api/`. `api_router()` returns a composable
//! `Router`; `start_server_on()` binds it and hands back a shutdown handle.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_server_on, ApiServer, ServerSession};
pub use types::ApiContext;
