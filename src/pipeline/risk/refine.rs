use super::locator::primary_content_text;
use super::prompt::{REFINE_MAX_TOKENS, REFINE_SYSTEM_PROMPT, REFINE_TEMPERATURE};
use super::types::{ChatClient, ChatMessage, ChatRequest};
use super::RiskError;

/// Ask the model to reformat its own unparseable answer as JSON only.
///
/// Issues exactly one chat call. A non-success status is reported as
/// `RiskError::Refinement`; transport failures propagate unchanged. The
/// returned text is not parsed here and never escalated again.
pub fn refine_to_json(
    client: &dyn ChatClient,
    model: &str,
    raw_text: &str,
) -> Result<String, RiskError> {
    let request = ChatRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage::system(REFINE_SYSTEM_PROMPT),
            ChatMessage::user(raw_text),
        ],
        temperature: REFINE_TEMPERATURE,
        max_tokens: REFINE_MAX_TOKENS,
    };

    let envelope = client.complete(&request).map_err(|e| match e {
        RiskError::Upstream { status, body } => RiskError::Refinement { status, body },
        other => other,
    })?;

    Ok(primary_content_text(&envelope))
}
