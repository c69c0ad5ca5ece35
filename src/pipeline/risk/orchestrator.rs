use std::time::Instant;

use serde_json::Value;

use super::locator::locate_candidate_text;
use super::parser::{decode_assessment, parse_structured};
use super::prompt::{
    build_user_content, ASSESSMENT_MAX_TOKENS, ASSESSMENT_TEMPERATURE, RISK_SYSTEM_PROMPT,
};
use super::refine::refine_to_json;
use super::types::{CareLogEntry, ChatClient, ChatMessage, ChatRequest, RiskAssessmentResult};
use super::RiskError;

/// Refinement calls allowed per assessment. Bounds total chat calls to 2.
const MAX_REFINEMENTS: u32 = 1;

/// Per-request bookkeeping of extraction and refinement rounds.
/// Created at the start of one assessment and dropped at its end.
#[derive(Debug, Default)]
pub struct RecoveryAttempt {
    parse_rounds: u32,
    refinements: u32,
}

impl RecoveryAttempt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_parse(&mut self) {
        self.parse_rounds += 1;
    }

    pub fn record_refinement(&mut self) {
        self.refinements += 1;
    }

    pub fn can_refine(&self) -> bool {
        self.refinements < MAX_REFINEMENTS
    }

    pub fn parse_rounds(&self) -> u32 {
        self.parse_rounds
    }

    pub fn refinements(&self) -> u32 {
        self.refinements
    }
}

/// Orchestrates one risk assessment:
/// prompt → chat call → locate → parse → (refine → parse) → decode
pub struct RiskAssessor {
    client: Box<dyn ChatClient + Send + Sync>,
    model_name: String,
}

impl RiskAssessor {
    pub fn new(client: Box<dyn ChatClient + Send + Sync>, model_name: &str) -> Self {
        Self {
            client,
            model_name: model_name.to_string(),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Assess care logs and decode the answer into the assessment schema.
    pub fn assess_risk(&self, logs: &[CareLogEntry]) -> Result<RiskAssessmentResult, RiskError> {
        let value = self.assess_risk_raw(logs)?;
        decode_assessment(value).inspect_err(|e| {
            tracing::error!(model = %self.model_name, error = %e, "Parsed assessment rejected");
        })
    }

    /// Run the extraction-and-recovery pipeline, returning the parsed JSON
    /// object without schema validation.
    ///
    /// At most two chat calls are made. The refinement call starts only
    /// after the primary answer was judged unparseable, and the final
    /// result then derives from the refined text alone.
    pub fn assess_risk_raw(&self, logs: &[CareLogEntry]) -> Result<Value, RiskError> {
        let _span = tracing::info_span!("assess_risk", log_count = logs.len()).entered();
        let mut attempt = RecoveryAttempt::new();

        // Requesting
        let request = ChatRequest {
            model: self.model_name.clone(),
            messages: vec![
                ChatMessage::system(RISK_SYSTEM_PROMPT),
                ChatMessage::user(&build_user_content(logs)),
            ],
            temperature: ASSESSMENT_TEMPERATURE,
            max_tokens: ASSESSMENT_MAX_TOKENS,
        };

        let start = Instant::now();
        let envelope = self.client.complete(&request).inspect_err(|e| {
            tracing::error!(
                model = %self.model_name,
                elapsed_ms = start.elapsed().as_millis(),
                error = %e,
                "Risk assessment chat call failed"
            );
        })?;
        tracing::info!(
            model = %self.model_name,
            elapsed_ms = start.elapsed().as_millis(),
            "Risk assessment chat call completed"
        );

        // Extracting
        let candidate = locate_candidate_text(&envelope)?;
        attempt.record_parse();
        if let Some(parsed) = parse_structured(&candidate) {
            return Ok(parsed);
        }

        // Escalating
        if !attempt.can_refine() {
            return Err(RiskError::ParseFailed);
        }
        tracing::warn!(
            model = %self.model_name,
            candidate_len = candidate.len(),
            "Assessment response unparseable, requesting JSON refinement"
        );

        let start = Instant::now();
        let refined = refine_to_json(&*self.client, &self.model_name, &candidate)?;
        attempt.record_refinement();
        attempt.record_parse();
        tracing::info!(
            elapsed_ms = start.elapsed().as_millis(),
            refined_len = refined.len(),
            "JSON refinement call completed"
        );

        parse_structured(&refined).ok_or_else(|| {
            tracing::error!(
                parse_rounds = attempt.parse_rounds(),
                refinements = attempt.refinements(),
                "Risk assessment unparseable after refinement"
            );
            RiskError::ParseFailed
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::risk::client::{MockChatClient, MockReply};
    use crate::pipeline::risk::types::RiskLevel;
    use serde_json::json;
    use std::sync::Arc;

    fn build_assessor(replies: Vec<MockReply>) -> (RiskAssessor, Arc<MockChatClient>) {
        let mock = Arc::new(MockChatClient::new(replies));
        (RiskAssessor::new(Box::new(mock.clone()), "gpt-4o-mini"), mock)
    }

    fn logs() -> Vec<CareLogEntry> {
        vec![CareLogEntry::new("1", "薬を飲み忘れた")]
    }

    const VALID: &str = r#"{"riskLevel":"high","findings":[{"id":"f1","title":"服薬忘れ","severity":"high","evidence":["薬を飲み忘れた"],"recommendation":"服薬確認","tasks":["朝の声かけ"],"goal":"飲み忘れゼロ"}],"notes":"注意"}"#;

    #[test]
    fn fenced_answer_needs_no_refinement() {
        let (assessor, mock) = build_assessor(vec![MockReply::content(
            "```json\n{\"riskLevel\":\"medium\",\"findings\":[],\"notes\":\"ok\"}\n```",
        )]);

        let result = assessor.assess_risk(&logs()).unwrap();
        assert_eq!(result.risk_level, RiskLevel::Medium);
        assert!(result.findings.is_empty());
        assert_eq!(result.notes, "ok");
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn plain_json_is_returned_unchanged() {
        let (assessor, mock) = build_assessor(vec![MockReply::content(VALID)]);
        let value = assessor.assess_risk_raw(&logs()).unwrap();
        assert_eq!(value, serde_json::from_str::<Value>(VALID).unwrap());
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn primary_request_carries_prompt_and_budget() {
        let (assessor, mock) = build_assessor(vec![MockReply::content(VALID)]);
        assessor.assess_risk(&logs()).unwrap();

        let requests = mock.requests();
        let request = &requests[0];
        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.temperature, 0.2);
        assert_eq!(request.max_tokens, 800);
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(request.messages[0].content, RISK_SYSTEM_PROMPT);
        let user: Value = serde_json::from_str(&request.messages[1].content).unwrap();
        assert_eq!(user["careLogs"][0]["content"], "薬を飲み忘れた");
    }

    #[test]
    fn reasoning_channel_wins() {
        let (assessor, _mock) = build_assessor(vec![MockReply::Envelope(json!({
            "choices": [{ "message": { "content": "", "reasoning_content": format!("考え中… {VALID}") } }]
        }))]);
        let result = assessor.assess_risk(&logs()).unwrap();
        assert_eq!(result.findings[0].id, "f1");
    }

    #[test]
    fn unparseable_answer_is_refined_once() {
        let (assessor, mock) = build_assessor(vec![
            MockReply::content("リスクは高いです。服薬忘れがあります。"),
            MockReply::content(VALID),
        ]);

        let result = assessor.assess_risk(&logs()).unwrap();
        assert_eq!(result.risk_level, RiskLevel::High);

        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].max_tokens, 600);
        assert_eq!(requests[1].temperature, 0.0);
        assert_eq!(
            requests[1].messages[1].content,
            "リスクは高いです。服薬忘れがあります。"
        );
    }

    #[test]
    fn refinement_receives_located_text_not_envelope() {
        let (assessor, mock) = build_assessor(vec![
            MockReply::content("prefix {broken json} suffix"),
            MockReply::content(VALID),
        ]);
        assessor.assess_risk(&logs()).unwrap();
        assert_eq!(mock.requests()[1].messages[1].content, "{broken json}");
    }

    #[test]
    fn failed_refinement_is_parse_failed_without_third_call() {
        let (assessor, mock) = build_assessor(vec![
            MockReply::content("not json"),
            MockReply::content("still not json"),
            MockReply::content(VALID),
        ]);

        assert!(matches!(
            assessor.assess_risk(&logs()),
            Err(RiskError::ParseFailed)
        ));
        assert_eq!(mock.call_count(), 2);
    }

    #[test]
    fn primary_upstream_error_is_not_retried() {
        let (assessor, mock) = build_assessor(vec![MockReply::Status {
            status: 429,
            body: "rate limited".into(),
        }]);
        assert!(matches!(
            assessor.assess_risk(&logs()),
            Err(RiskError::Upstream { status: 429, .. })
        ));
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn refinement_status_error_is_surfaced() {
        let (assessor, mock) = build_assessor(vec![
            MockReply::content("not json"),
            MockReply::Status {
                status: 502,
                body: "bad gateway".into(),
            },
        ]);
        assert!(matches!(
            assessor.assess_risk(&logs()),
            Err(RiskError::Refinement { status: 502, .. })
        ));
        assert_eq!(mock.call_count(), 2);
    }

    #[test]
    fn empty_envelope_fails_without_refinement() {
        let (assessor, mock) = build_assessor(vec![MockReply::Envelope(json!({ "choices": [] }))]);
        assert!(matches!(
            assessor.assess_risk(&logs()),
            Err(RiskError::EmptyContent)
        ));
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn schema_mismatch_is_reported_not_defaulted() {
        let (assessor, mock) = build_assessor(vec![MockReply::content(r#"{"riskLevel":"high"}"#)]);
        assert!(matches!(
            assessor.assess_risk(&logs()),
            Err(RiskError::SchemaMismatch(_))
        ));
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn recovery_attempt_allows_a_single_refinement() {
        let mut attempt = RecoveryAttempt::new();
        assert!(attempt.can_refine());
        attempt.record_parse();
        attempt.record_refinement();
        assert!(!attempt.can_refine());
        assert_eq!(attempt.parse_rounds(), 1);
        assert_eq!(attempt.refinements(), 1);
    }
}
