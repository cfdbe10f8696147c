// SPDX-License-Identifier: MIT

//! Extraction stage

use crate::collaborators::FieldParser;
use crate::workflow::stage::{Stage, StageName};
use crate::workflow::state::{DocumentKind, StatePatch, WorkflowState};
use async_trait::async_trait;
use serde_json::Map;
use std::sync::Arc;

/// Parses applicant fields out of the submitted document texts.
///
/// Prefers the application form; when that is blank, concatenates
/// whatever other document text is available so the parser still gets
/// something to chew on.
pub struct Extractor {
    parser: Arc<dyn FieldParser>,
}

impl Extractor {
    pub fn new(parser: Arc<dyn FieldParser>) -> Self {
        Self { parser }
    }

    fn source_text(state: &WorkflowState) -> String {
        let form = state
            .applicant_documents
            .get(&DocumentKind::ApplicationForm)
            .map(String::as_str)
            .unwrap_or("");

        if !form.trim().is_empty() {
            return form.to_string();
        }

        state
            .applicant_documents
            .values()
            .map(String::as_str)
            .filter(|text| !text.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[async_trait]
impl Stage for Extractor {
    fn name(&self) -> StageName {
        StageName::DataExtractor
    }

    async fn execute(&self, state: &WorkflowState) -> StatePatch {
        let text = Self::source_text(state);

        let extracted_fields = if text.trim().is_empty() {
            log::warn!("no document text available, extraction yields nothing");
            Map::new()
        } else {
            match self.parser.parse(&text).await {
                Ok(fields) => {
                    log::info!("extracted {} applicant fields", fields.len());
                    fields
                }
                Err(e) => {
                    log::warn!("field parsing failed ({}), extraction yields nothing", e);
                    Map::new()
                }
            }
        };

        StatePatch {
            extracted_fields: Some(extracted_fields),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IntakeError;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct CapturingParser {
        fields: Map<String, Value>,
        seen_text: Mutex<Option<String>>,
    }

    impl CapturingParser {
        fn new(fields: Map<String, Value>) -> Self {
            Self {
                fields,
                seen_text: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl FieldParser for CapturingParser {
        async fn parse(&self, text: &str) -> Result<Map<String, Value>, IntakeError> {
            *self.seen_text.lock().unwrap() = Some(text.to_string());
            Ok(self.fields.clone())
        }
    }

    struct FailingParser;

    #[async_trait]
    impl FieldParser for FailingParser {
        async fn parse(&self, _text: &str) -> Result<Map<String, Value>, IntakeError> {
            Err(IntakeError::unavailable("field_parser", "down"))
        }
    }

    fn fields(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_extracts_from_application_form() {
        let parser = Arc::new(CapturingParser::new(fields(&[("age", json!(40))])));
        let extractor = Extractor::new(parser.clone());

        let mut docs = HashMap::new();
        docs.insert(DocumentKind::ApplicationForm, "Age: 40".to_string());
        docs.insert(DocumentKind::Passport, "passport text".to_string());
        let patch = extractor.execute(&WorkflowState::new(docs)).await;

        assert_eq!(
            patch.extracted_fields.unwrap().get("age"),
            Some(&json!(40))
        );
        assert_eq!(
            parser.seen_text.lock().unwrap().as_deref(),
            Some("Age: 40")
        );
    }

    #[tokio::test]
    async fn test_concatenates_when_form_blank() {
        let parser = Arc::new(CapturingParser::new(Map::new()));
        let extractor = Extractor::new(parser.clone());

        let mut docs = HashMap::new();
        docs.insert(DocumentKind::ApplicationForm, "  ".to_string());
        docs.insert(DocumentKind::SalarySlip, "Income: 3000".to_string());
        let _ = extractor.execute(&WorkflowState::new(docs)).await;

        let seen = parser.seen_text.lock().unwrap().clone().unwrap();
        assert!(seen.contains("Income: 3000"));
    }

    #[tokio::test]
    async fn test_parser_failure_degrades_to_empty_fields() {
        let extractor = Extractor::new(Arc::new(FailingParser));

        let mut docs = HashMap::new();
        docs.insert(DocumentKind::ApplicationForm, "Age: 40".to_string());
        let patch = extractor.execute(&WorkflowState::new(docs)).await;

        // Still a patch that sets the field, never an error
        assert_eq!(patch.extracted_fields, Some(Map::new()));
    }
}
