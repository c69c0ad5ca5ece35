//! Risk assessment endpoint.
//!
//! - `POST /api/risk-assessment`: assess a batch of care logs

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, RiskAssessmentRequest, RiskAssessmentResponse};
use crate::pipeline::risk::validate_assessment;

/// Maximum number of log entries per request.
const MAX_LOGS_PER_REQUEST: usize = 200;

/// `POST /api/risk-assessment`: run the assessment pipeline on the supplied logs.
///
/// The pipeline issues blocking chat calls, so it runs on the blocking pool.
pub async fn assess(
    State(ctx): State<ApiContext>,
    payload: Result<Json<RiskAssessmentRequest>, JsonRejection>,
) -> Result<Json<RiskAssessmentResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    if req.care_logs.is_empty() {
        return Err(ApiError::BadRequest("careLogs must not be empty".into()));
    }
    if req.care_logs.len() > MAX_LOGS_PER_REQUEST {
        return Err(ApiError::BadRequest(format!(
            "Too many care logs (max {MAX_LOGS_PER_REQUEST})"
        )));
    }

    let logs = req.care_logs;
    let assessor = ctx.assessor.clone();
    let (assessment, logs) = tokio::task::spawn_blocking(move || {
        assessor.assess_risk(&logs).map(|assessment| (assessment, logs))
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Assessment task failed: {e}")))??;

    let warnings = validate_assessment(&assessment, &logs);

    tracing::info!(
        risk_level = ?assessment.risk_level,
        finding_count = assessment.findings.len(),
        warning_count = warnings.len(),
        "Risk assessment served"
    );

    Ok(Json(RiskAssessmentResponse {
        assessment,
        warnings,
    }))
}
