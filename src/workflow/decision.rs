// SPDX-License-Identifier: MIT

//! Decision Collaborator Adapter
//!
//! The decision maker is a non-deterministic collaborator; this adapter
//! is what makes routing well-defined anyway. Its reply is reduced to a
//! [`StageName`] through JSON extraction and enum validation, and every
//! failure mode lands on the same deterministic fallback.

use crate::collaborators::DecisionMaker;
use crate::llm::extract_json_object;
use crate::workflow::stage::StageName;
use crate::workflow::state::WorkflowState;
use serde_json::Value;
use std::sync::Arc;

/// Routing rules sent to the decision maker with every request
pub const DECISION_RULES: &str = "\
1. Start with 'data_extractor' when new application documents are received.
2. After extraction, go to 'eligibility_checker'.
3. If eligibility is known and the documents are not yet validated, you may go to 'data_validator', then 'response_generator'.
4. Once eligibility is known, 'response_generator' finishes the run.
5. Never pick a stage that already has everything it needs in the state.";

/// A validated routing decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub next: StageName,
    pub reason: String,
}

/// Wraps the external decision maker with validation and fallback
pub struct DecisionAdapter {
    maker: Arc<dyn DecisionMaker>,
}

impl DecisionAdapter {
    pub fn new(maker: Arc<dyn DecisionMaker>) -> Self {
        Self { maker }
    }

    /// Ask the collaborator which stage runs next.
    ///
    /// Never fails: unreachable collaborator, unparseable reply, or an
    /// unknown stage name all resolve through [`fallback_decision`].
    pub async fn decide(&self, state: &WorkflowState) -> Decision {
        match self.maker.decide(&state.to_json(), DECISION_RULES).await {
            Ok(reply) => match parse_decision(&reply) {
                Some(decision) => decision,
                None => {
                    log::warn!("decision reply not usable, applying fallback: {}", reply);
                    fallback_decision(state)
                }
            },
            Err(e) => {
                log::warn!("decision maker failed ({}), applying fallback", e);
                fallback_decision(state)
            }
        }
    }
}

/// Extract and validate a decision from free-form collaborator output
fn parse_decision(reply: &str) -> Option<Decision> {
    let value = extract_json_object(reply)?;
    let name = value
        .get("next_node")
        .or_else(|| value.get("next"))
        .and_then(Value::as_str)?;

    Some(Decision {
        next: StageName::parse(name)?,
        reason: value
            .get("reason")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
    })
}

/// Deterministic routing used whenever the collaborator's answer is
/// missing or invalid: extract first, then evaluate, then respond.
pub fn fallback_decision(state: &WorkflowState) -> Decision {
    let (next, reason) = if state.extracted_fields.is_empty() {
        (StageName::DataExtractor, "no extracted fields yet")
    } else if state.eligibility.is_none() {
        (StageName::EligibilityChecker, "eligibility not yet evaluated")
    } else {
        (StageName::ResponseGenerator, "eligibility known, finishing")
    };

    Decision {
        next,
        reason: format!("fallback: {}", reason),
    }
}
