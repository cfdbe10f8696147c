// SPDX-License-Identifier: MIT

//! Validation stage

use crate::collaborators::DocumentChecker;
use crate::workflow::stage::{Stage, StageName};
use crate::workflow::state::{StatePatch, ValidationResult, WorkflowState};
use async_trait::async_trait;
use std::sync::Arc;

/// Cross-checks extracted fields against the raw documents.
///
/// Fails closed: if the checker cannot be reached or answers nonsense,
/// the run continues with an `overall_ok = false` result carrying the
/// diagnostic, never with a silent pass.
pub struct Validator {
    checker: Arc<dyn DocumentChecker>,
}

impl Validator {
    pub fn new(checker: Arc<dyn DocumentChecker>) -> Self {
        Self { checker }
    }
}

#[async_trait]
impl Stage for Validator {
    fn name(&self) -> StageName {
        StageName::DataValidator
    }

    async fn execute(&self, state: &WorkflowState) -> StatePatch {
        let validation_result = match self
            .checker
            .validate(&state.extracted_fields, &state.applicant_documents)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                log::warn!("document validation failed closed: {}", e);
                ValidationResult::failed(format!("validation collaborator failed: {}", e))
            }
        };

        StatePatch {
            validation_result: Some(validation_result),
            ..Default::default()
        }
    }
}
