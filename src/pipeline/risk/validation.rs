// Post-parse policy checks for model-produced assessments.
// Applied after decode_assessment(). Never mutates or drops findings:
// anything out of policy is reported as a warning for the consumer.

use std::collections::HashSet;

use super::prompt::MAX_TASKS_PER_FINDING;
use super::types::{CareLogEntry, RiskAssessmentResult};

/// Check an assessment against the prompt's policy and the supplied logs.
///
/// Flags findings with too many tasks, without evidence, with evidence that
/// does not appear in any log, and duplicate finding ids.
pub fn validate_assessment(result: &RiskAssessmentResult, logs: &[CareLogEntry]) -> Vec<String> {
    let mut warnings = Vec::new();
    let mut seen_ids = HashSet::new();

    for finding in &result.findings {
        if !seen_ids.insert(finding.id.as_str()) {
            warnings.push(format!("Duplicate finding id '{}'", finding.id));
        }

        if finding.tasks.len() > MAX_TASKS_PER_FINDING {
            warnings.push(format!(
                "Finding '{}' has {} tasks (max {MAX_TASKS_PER_FINDING})",
                finding.id,
                finding.tasks.len()
            ));
        }

        if finding.evidence.iter().all(|e| e.trim().is_empty()) {
            warnings.push(format!("Finding '{}' has no evidence", finding.id));
            continue;
        }

        for excerpt in &finding.evidence {
            if !is_grounded(excerpt, logs) {
                warnings.push(format!(
                    "Finding '{}' cites evidence not found in logs: {excerpt}",
                    finding.id
                ));
            }
        }
    }

    if !warnings.is_empty() {
        tracing::warn!(
            warning_count = warnings.len(),
            finding_count = result.findings.len(),
            "Risk assessment validation warnings detected"
        );
    }

    warnings
}

/// Evidence counts as grounded when it (minus surrounding quotes) appears
/// verbatim in at least one log entry. Blank excerpts are ignored.
fn is_grounded(excerpt: &str, logs: &[CareLogEntry]) -> bool {
    let needle = excerpt
        .trim()
        .trim_matches(|c| matches!(c, '"' | '「' | '」' | '『' | '』'))
        .trim();
    if needle.is_empty() {
        return true;
    }
    logs.iter().any(|log| log.content.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::risk::types::{Finding, RiskLevel, Severity};

    fn finding(id: &str, evidence: &[&str], tasks: usize) -> Finding {
        Finding {
            id: id.into(),
            title: "服薬忘れ".into(),
            severity: Severity::High,
            evidence: evidence.iter().map(|s| s.to_string()).collect(),
            recommendation: "声かけ".into(),
            tasks: (0..tasks).map(|i| format!("task {i}")).collect(),
            goal: "飲み忘れゼロ".into(),
        }
    }

    fn result(findings: Vec<Finding>) -> RiskAssessmentResult {
        RiskAssessmentResult {
            risk_level: RiskLevel::High,
            findings,
            notes: String::new(),
        }
    }

    fn logs() -> Vec<CareLogEntry> {
        vec![
            CareLogEntry::new("1", "朝の薬を飲み忘れた。"),
            CareLogEntry::new("2", "夜間にトイレへ3回起きた"),
        ]
    }

    #[test]
    fn grounded_assessment_has_no_warnings() {
        let r = result(vec![finding("a", &["薬を飲み忘れた", "「夜間にトイレへ3回」"], 3)]);
        assert!(validate_assessment(&r, &logs()).is_empty());
    }

    #[test]
    fn too_many_tasks_warns_without_truncating() {
        let r = result(vec![finding("a", &["薬を飲み忘れた"], 5)]);
        let warnings = validate_assessment(&r, &logs());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("5 tasks"));
        assert_eq!(r.findings[0].tasks.len(), 5);
    }

    #[test]
    fn missing_evidence_warns() {
        let r = result(vec![finding("a", &[], 1), finding("b", &["  "], 1)]);
        let warnings = validate_assessment(&r, &logs());
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.contains("no evidence")));
    }

    #[test]
    fn ungrounded_evidence_warns() {
        let r = result(vec![finding("a", &["転倒した"], 1)]);
        let warnings = validate_assessment(&r, &logs());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("転倒した"));
    }

    #[test]
    fn duplicate_ids_warn() {
        let r = result(vec![
            finding("a", &["薬を飲み忘れた"], 1),
            finding("a", &["夜間にトイレへ3回起きた"], 1),
        ]);
        let warnings = validate_assessment(&r, &logs());
        assert_eq!(warnings, vec!["Duplicate finding id 'a'".to_string()]);
    }

    #[test]
    fn empty_findings_are_valid() {
        assert!(validate_assessment(&result(vec![]), &[]).is_empty());
    }
}
