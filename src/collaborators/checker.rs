// SPDX-License-Identifier: MIT

//! LLM document validation collaborator
//!
//! Cross-checks the extracted application fields against the passport
//! and salary slip texts. The stage above maps any error from here onto
//! a fail-closed [`ValidationResult`].

use super::DocumentChecker;
use crate::error::IntakeError;
use crate::llm::{extract_json_object, ChatMessage, ChatModel};
use crate::workflow::numeric::to_f64;
use crate::workflow::state::{DocumentKind, ValidationResult};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

const COLLABORATOR: &str = "document_checker";

/// Document checker backed by a chat model
pub struct LlmDocumentChecker {
    model: Arc<dyn ChatModel>,
}

impl LlmDocumentChecker {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl DocumentChecker for LlmDocumentChecker {
    async fn validate(
        &self,
        fields: &Map<String, Value>,
        documents: &HashMap<DocumentKind, String>,
    ) -> Result<ValidationResult, IntakeError> {
        let age = fields.get("age").map(to_f64).unwrap_or(0.0);
        let income = fields.get("monthly_income").map(to_f64).unwrap_or(0.0);
        let salary_slip = documents
            .get(&DocumentKind::SalarySlip)
            .map(String::as_str)
            .unwrap_or("");
        let passport = documents
            .get(&DocumentKind::Passport)
            .map(String::as_str)
            .unwrap_or("");
        let today = chrono::Local::now().date_naive();

        let prompt = format!(
            r#"You are a Data Validator AI.

Validate the social support application.

### Inputs:
Application data:
Age: {age}
Income: {income}

Uploaded documents:
Salary Slip: {salary_slip}
Passport: {passport}

Validation Rules:
1. Age: Calculate age from passport DOB and today's date {today}. Compare with application age.
2. Income: Compare application income with salary slip income.

Output strictly as JSON:
{{
"age_validation": "success" | "failed",
"income_validation": "success" | "failed",
"overall_status": "success" | "failed",
"reason": "<reason if failed>"
}}"#
        );

        let reply = self.model.chat(&[ChatMessage::user(prompt)]).await?;
        parse_validation_reply(&reply)
            .ok_or_else(|| IntakeError::malformed(COLLABORATOR, "reply has no validation JSON"))
    }
}

fn parse_validation_reply(reply: &str) -> Option<ValidationResult> {
    let value = extract_json_object(reply)?;
    let ok = |key: &str| value.get(key).and_then(Value::as_str) == Some("success");

    Some(ValidationResult {
        age_ok: ok("age_validation"),
        income_ok: ok("income_validation"),
        overall_ok: ok("overall_status"),
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
    fn test_parse_success_reply() {
        let reply = r#"{"age_validation": "success", "income_validation": "success", "overall_status": "success", "reason": ""}"#;
        let result = parse_validation_reply(reply).unwrap();
        assert!(result.age_ok);
        assert!(result.income_ok);
        assert!(result.overall_ok);
    }

    #[test]
    fn test_parse_failed_reply_with_reason() {
        let reply = r#"The applicant's documents do not match:
{"age_validation": "failed", "income_validation": "success", "overall_status": "failed", "reason": "passport DOB gives age 52, application says 40"}"#;
        let result = parse_validation_reply(reply).unwrap();
        assert!(!result.age_ok);
        assert!(result.income_ok);
        assert!(!result.overall_ok);
        assert!(result.reason.contains("passport DOB"));
    }

    #[test]
    fn test_unknown_status_strings_fail_closed() {
        let reply = r#"{"age_validation": "ok", "income_validation": "maybe", "overall_status": "OK"}"#;
        let result = parse_validation_reply(reply).unwrap();
        assert!(!result.age_ok);
        assert!(!result.income_ok);
        assert!(!result.overall_ok);
    }

    #[test]
    fn test_no_json_is_none() {
        assert!(parse_validation_reply("everything checks out").is_none());
    }
}
