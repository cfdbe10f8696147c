// SPDX-License-Identifier: MIT

//! Terminal response stage

use crate::collaborators::ResponseComposer;
use crate::workflow::stage::{Stage, StageName};
use crate::workflow::state::{FinalResponse, FinalStatus, StatePatch, WorkflowState};
use async_trait::async_trait;
use std::sync::Arc;

/// Produces the final applicant-facing response.
///
/// The status rule is enforced here, not delegated: eligible only when
/// the eligibility flag is set and validation (if it ran) passed
/// overall. The composer only supplies the wording.
pub struct ResponseGenerator {
    composer: Arc<dyn ResponseComposer>,
}

impl ResponseGenerator {
    pub fn new(composer: Arc<dyn ResponseComposer>) -> Self {
        Self { composer }
    }
}

/// Status rule: validation is optional, a missing result means
/// eligibility alone decides.
fn final_status(eligibility: bool, overall_ok: Option<bool>) -> FinalStatus {
    if eligibility && overall_ok.unwrap_or(true) {
        FinalStatus::Eligible
    } else {
        FinalStatus::NotEligible
    }
}

#[async_trait]
impl Stage for ResponseGenerator {
    fn name(&self) -> StageName {
        StageName::ResponseGenerator
    }

    async fn execute(&self, state: &WorkflowState) -> StatePatch {
        let eligibility = state.eligibility.unwrap_or_else(|| {
            // Only reachable through a forced early termination
            log::warn!("responding without an eligibility result, treating as not eligible");
            false
        });
        let validation = state.validation_result.as_ref();
        let status = final_status(eligibility, validation.map(|v| v.overall_ok));

        let final_response = match self.composer.compose(eligibility, validation).await {
            Ok(mut response) => {
                if response.status != status {
                    log::warn!(
                        "composer status {:?} contradicts the rule, overriding to {:?}",
                        response.status,
                        status
                    );
                    response.status = status;
                }
                response
            }
            Err(e) => {
                log::warn!("response composition failed ({}), using default", e);
                FinalResponse {
                    status: FinalStatus::NotEligible,
                    reason: "decision collaborator unavailable".to_string(),
                }
            }
        };

        StatePatch {
            final_response: Some(final_response),
            ..Default::default()
        }
    }
}
