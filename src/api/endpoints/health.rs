//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model: String,
    pub version: &'static str,
}

/// `GET /api/health`: liveness plus the configured model.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model: ctx.assessor.model_name().to_string(),
        version: crate::config::APP_VERSION,
    })
}
