//! Shared types for the HTTP layer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::pipeline::risk::{CareLogEntry, RiskAssessmentResult, RiskAssessor};

/// Shared context for all API routes.
#[derive(Clone)]
pub struct ApiContext {
    pub assessor: Arc<RiskAssessor>,
}

impl ApiContext {
    pub fn new(assessor: Arc<RiskAssessor>) -> Self {
        Self { assessor }
    }
}

/// Body of `POST /api/risk-assessment`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessmentRequest {
    #[serde(default)]
    pub care_logs: Vec<CareLogEntry>,
}

/// Successful assessment plus any policy warnings raised on it.
#[derive(Debug, Serialize)]
pub struct RiskAssessmentResponse {
    pub assessment: RiskAssessmentResult,
    pub warnings: Vec<String>,
}
