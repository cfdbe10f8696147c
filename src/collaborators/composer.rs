// SPDX-License-Identifier: MIT

//! LLM response composer
//!
//! Writes the applicant-facing explanation of the decision. The response
//! stage enforces the status rule on whatever comes back, so a creative
//! model cannot flip the outcome.

use super::ResponseComposer;
use crate::error::IntakeError;
use crate::llm::{extract_json_object, ChatMessage, ChatModel};
use crate::workflow::state::{FinalResponse, FinalStatus, ValidationResult};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

const COLLABORATOR: &str = "response_composer";

/// Response composer backed by a chat model
pub struct LlmResponseComposer {
    model: Arc<dyn ChatModel>,
}

impl LlmResponseComposer {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl ResponseComposer for LlmResponseComposer {
    async fn compose(
        &self,
        eligibility: bool,
        validation: Option<&ValidationResult>,
    ) -> Result<FinalResponse, IntakeError> {
        let eligibility_json = serde_json::to_string(&eligibility).unwrap_or_default();
        let validation_json = validation
            .map(|v| serde_json::to_string(v).unwrap_or_default())
            .unwrap_or_else(|| "null".to_string());

        let prompt = format!(
            r#"You are a Response Generator AI for a social support application.

### Inputs:
eligibility = {eligibility_json}
data_validation = {validation_json}

### Rules:
- Applicant is eligible if:
    1. eligibility is true AND
    2. data_validation is null or data_validation passed overall
- Otherwise, not eligible.
- Provide a clear reason explaining the decision.

### Output strictly as JSON:
{{
"final_status": "eligible" | "not_eligible",
"reason": "<short reason explaining eligibility or failure>"
}}"#
        );

        let reply = self.model.chat(&[ChatMessage::user(prompt)]).await?;
        parse_composed_reply(&reply)
            .ok_or_else(|| IntakeError::malformed(COLLABORATOR, "reply has no response JSON"))
    }
}

fn parse_composed_reply(reply: &str) -> Option<FinalResponse> {
    let value = extract_json_object(reply)?;
    let status = match value.get("final_status").and_then(Value::as_str)? {
        "eligible" => FinalStatus::Eligible,
        // Models drift between the two spellings; accept both
        "not_eligible" | "not eligible" => FinalStatus::NotEligible,
        _ => return None,
    };

    Some(FinalResponse {
        status,
        reason: value
            .get("reason")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_eligible_reply() {
        let reply = r#"{"final_status": "eligible", "reason": "income below threshold"}"#;
        let response = parse_composed_reply(reply).unwrap();
        assert_eq!(response.status, FinalStatus::Eligible);
        assert_eq!(response.reason, "income below threshold");
    }

    #[test]
    fn test_parse_legacy_status_spelling() {
        let reply = r#"{"final_status": "not eligible", "reason": "income too high"}"#;
        let response = parse_composed_reply(reply).unwrap();
        assert_eq!(response.status, FinalStatus::NotEligible);
    }

    #[test]
    fn test_parse_unknown_status_is_none() {
        assert!(parse_composed_reply(r#"{"final_status": "approved"}"#).is_none());
        assert!(parse_composed_reply("plain text").is_none());
    }
}
