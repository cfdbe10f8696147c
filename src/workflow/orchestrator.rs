// SPDX-License-Identifier: MIT

//! Orchestrator: stage selection and state merging
//!
//! Control always returns here between stages. Selection delegates to
//! the decision adapter until the loop guard trips, at which point the
//! terminal stage is forced regardless of what the adapter wants.

use crate::workflow::decision::DecisionAdapter;
use crate::workflow::stage::{Stage, StageName};
use crate::workflow::state::{merge, WorkflowState};
use std::sync::Arc;

/// A routing choice for the next step of a run
#[derive(Debug, Clone)]
pub struct Selection {
    pub stage: StageName,
    pub reason: String,
    /// True when the loop guard overrode the decision adapter
    pub forced: bool,
}

/// The control node of the workflow
pub struct Orchestrator {
    adapter: DecisionAdapter,
    extractor: Arc<dyn Stage>,
    validator: Arc<dyn Stage>,
    eligibility: Arc<dyn Stage>,
    response: Arc<dyn Stage>,
    max_iterations: u32,
}

impl Orchestrator {
    pub fn new(
        adapter: DecisionAdapter,
        extractor: Arc<dyn Stage>,
        validator: Arc<dyn Stage>,
        eligibility: Arc<dyn Stage>,
        response: Arc<dyn Stage>,
        max_iterations: u32,
    ) -> Self {
        Self {
            adapter,
            extractor,
            validator,
            eligibility,
            response,
            max_iterations,
        }
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    fn stage_for(&self, name: StageName) -> &Arc<dyn Stage> {
        match name {
            StageName::DataExtractor => &self.extractor,
            StageName::DataValidator => &self.validator,
            StageName::EligibilityChecker => &self.eligibility,
            StageName::ResponseGenerator => &self.response,
        }
    }

    /// Choose the stage that runs next
    pub async fn select(&self, state: &WorkflowState) -> Selection {
        if state.route_history.len() as u32 >= self.max_iterations {
            log::warn!(
                "loop guard fired after {} stages, forcing terminal response",
                state.route_history.len()
            );
            return Selection {
                stage: StageName::ResponseGenerator,
                reason: "loop limit exceeded".to_string(),
                forced: true,
            };
        }

        let decision = self.adapter.decide(state).await;
        Selection {
            stage: decision.next,
            reason: decision.reason,
            forced: false,
        }
    }

    /// Run one stage and fold its patch into the state
    pub async fn advance(&self, state: WorkflowState, name: StageName) -> WorkflowState {
        let patch = self.stage_for(name).execute(&state).await;
        let mut next = merge(&state, patch);
        next.route_history.push(name);
        next
    }
}
