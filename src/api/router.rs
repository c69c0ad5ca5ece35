//! API router.
//!
//! Returns a composable `Router` with all routes under `/api/`, wrapped in
//! a permissive CORS layer for browser clients.

use std::sync::Arc;

use axum::http::{header, HeaderName, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::api::endpoints;
use crate::api::types::ApiContext;
use crate::pipeline::risk::RiskAssessor;

/// Build the API router around a shared assessor.
pub fn api_router(assessor: Arc<RiskAssessor>) -> Router {
    build_router(ApiContext::new(assessor))
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
}

fn build_router(ctx: ApiContext) -> Router {
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/risk-assessment", post(endpoints::risk::assess))
        .with_state(ctx);

    Router::new().nest("/api", api).layer(cors_layer())
}
