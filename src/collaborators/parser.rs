// SPDX-License-Identifier: MIT

//! LLM field parser with a regex text fallback
//!
//! The primary path prompts the chat model for the fixed applicant-field
//! schema as JSON. When the model is unavailable or returns garbage, a
//! label scanner pulls what it can straight from the text, so the parser
//! stays best-effort instead of failing the extraction stage.

use super::FieldParser;
use crate::error::IntakeError;
use crate::llm::{extract_json_object, ChatMessage, ChatModel};
use crate::workflow::numeric::parse_numeric_text;
use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Map, Value};
use std::sync::Arc;

const COLLABORATOR: &str = "field_parser";

/// Field parser backed by a chat model
pub struct LlmFieldParser {
    model: Arc<dyn ChatModel>,
}

impl LlmFieldParser {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    fn prompt(text: &str) -> String {
        format!(
            r#"You are an expert document parser. Extract structured applicant information
from the following social support application text.

OCR Text:
"""{text}"""

Return a valid JSON with these fields:
{{
    "name": "",
    "age": "",
    "gender": "",
    "marital_status": "",
    "employment_status": "",
    "employment_years": "",
    "monthly_income": "",
    "family_members": "",
    "address": "",
    "disability_status": "",
    "other_support_received": "",
    "assets": "",
    "liabilities": ""
}}

Only return JSON. Do not add any explanations."#
        )
    }
}

#[async_trait]
impl FieldParser for LlmFieldParser {
    async fn parse(&self, text: &str) -> Result<Map<String, Value>, IntakeError> {
        if text.trim().is_empty() {
            return Err(IntakeError::malformed(
                COLLABORATOR,
                "no text provided for parsing",
            ));
        }

        let messages = [
            ChatMessage::system("You are a helpful assistant that extracts form data."),
            ChatMessage::user(Self::prompt(text)),
        ];

        match self.model.chat(&messages).await {
            Ok(reply) => match extract_json_object(&reply) {
                Some(Value::Object(fields)) => Ok(fields),
                _ => {
                    log::warn!("field parser reply had no JSON object, using text fallback");
                    Ok(fallback_parse(text))
                }
            },
            Err(e) => {
                log::warn!("field parser model call failed ({}), using text fallback", e);
                Ok(fallback_parse(text))
            }
        }
    }
}

/// Scan labeled lines for the applicant fields.
///
/// Only fields actually found in the text appear in the result; numeric
/// fields are emitted as numbers.
pub fn fallback_parse(text: &str) -> Map<String, Value> {
    let mut fields = Map::new();

    let mut put_text = |key: &str, pattern: &str| {
        if let Some(value) = capture(text, pattern) {
            if !value.is_empty() {
                fields.insert(key.to_string(), json!(value));
            }
        }
    };

    put_text("name", r"(?i)Name[:\-]?\s*([A-Za-z ]+)");
    put_text("gender", r"(?i)Gender[:\-]?\s*(Male|Female|Other)");
    put_text("marital_status", r"(?i)Marital Status[:\-]?\s*([A-Za-z ]+)");
    put_text(
        "employment_status",
        r"(?i)Employment Status[:\-]?\s*([A-Za-z ]+)",
    );
    put_text("address", r"(?i)Address[:\-]?\s*(.+)");

    let mut put_number = |key: &str, pattern: &str| {
        if let Some(value) = capture(text, pattern) {
            fields.insert(key.to_string(), json!(parse_numeric_text(&value)));
        }
    };

    put_number("age", r"(?i)\bAge[:\-]?\s*(\d+)");
    put_number(
        "employment_years",
        r"(?i)(?:Years of Employment|Employment Years)[:\-]?\s*(\d+)",
    );
    put_number("monthly_income", r"(?i)Monthly Income[^\d]*([\d,]+)");
    put_number(
        "family_members",
        r"(?i)Family (?:Members|Size)[:\-]?\s*(\d+)",
    );
    put_number("assets", r"(?i)(?:Total )?Assets[^\d]*([\d,]+)");
    put_number("liabilities", r"(?i)(?:Total )?Liabilities[^\d]*([\d,]+)");

    fields
}

fn capture(text: &str, pattern: &str) -> Option<String> {
    let re = Regex::new(pattern).ok()?;
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatModel;

    struct FailingModel;

    #[async_trait]
    impl ChatModel for FailingModel {
        async fn chat(&self, _messages: &[ChatMessage]) -> Result<String, IntakeError> {
            Err(IntakeError::unavailable("ollama", "connection refused"))
        }
    }

    struct CannedModel(String);

    #[async_trait]
    impl ChatModel for CannedModel {
        async fn chat(&self, _messages: &[ChatMessage]) -> Result<String, IntakeError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_fallback_parse_labeled_form() {
        let text = "Age: 40 Monthly Income: 3000 Family Size: 5 Total Assets: 2000";
        let fields = fallback_parse(text);

        assert_eq!(fields.get("age"), Some(&json!(40.0)));
        assert_eq!(fields.get("monthly_income"), Some(&json!(3000.0)));
        assert_eq!(fields.get("family_members"), Some(&json!(5.0)));
        assert_eq!(fields.get("assets"), Some(&json!(2000.0)));
        assert!(fields.get("liabilities").is_none());
    }

    #[test]
    fn test_fallback_parse_thousands_separator() {
        let fields = fallback_parse("Monthly Income: 12,500 Total Liabilities: 1,000");
        assert_eq!(fields.get("monthly_income"), Some(&json!(12500.0)));
        assert_eq!(fields.get("liabilities"), Some(&json!(1000.0)));
    }

    #[test]
    fn test_fallback_parse_text_fields() {
        let text = "Name: Fatima Hassan\nMarital Status: Married\nAddress: 12 Corniche Rd";
        let fields = fallback_parse(text);

        assert_eq!(fields.get("name"), Some(&json!("Fatima Hassan")));
        assert_eq!(fields.get("marital_status"), Some(&json!("Married")));
        assert_eq!(fields.get("address"), Some(&json!("12 Corniche Rd")));
    }

    #[test]
    fn test_fallback_parse_unlabeled_text_is_empty() {
        assert!(fallback_parse("lorem ipsum dolor").is_empty());
    }

    #[tokio::test]
    async fn test_parser_uses_fallback_when_model_unavailable() {
        let parser = LlmFieldParser::new(Arc::new(FailingModel));
        let fields = parser
            .parse("Age: 40 Monthly Income: 3000 Family Size: 5 Total Assets: 2000")
            .await
            .unwrap();

        assert_eq!(fields.get("age"), Some(&json!(40.0)));
        assert_eq!(fields.get("family_members"), Some(&json!(5.0)));
    }

    #[tokio::test]
    async fn test_parser_prefers_model_json() {
        let reply = r#"Here you go: {"name": "Omar", "age": "34", "monthly_income": "9,000"}"#;
        let parser = LlmFieldParser::new(Arc::new(CannedModel(reply.to_string())));
        let fields = parser.parse("Name: Omar Age: 34").await.unwrap();

        assert_eq!(fields.get("name"), Some(&json!("Omar")));
        assert_eq!(fields.get("age"), Some(&json!("34")));
    }

    #[tokio::test]
    async fn test_parser_rejects_empty_text() {
        let parser = LlmFieldParser::new(Arc::new(FailingModel));
        assert!(parser.parse("   ").await.is_err());
    }
}
