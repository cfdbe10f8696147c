// SPDX-License-Identifier: MIT

//! Workflow executor: drives one run to its terminal stage
//!
//! The loop is orchestrator, stage, orchestrator, until the terminal
//! response stage runs. Bounded iteration and result propagation are the
//! executor's whole job; retries, if any, belong to the collaborator
//! adapters.

use crate::error::IntakeError;
use crate::workflow::orchestrator::Orchestrator;
use crate::workflow::stage::StageName;
use crate::workflow::state::{FinalResponse, FinalStatus, WorkflowState};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// How a run ended, short of an `InputIncomplete` failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(FinalResponse),
    Cancelled,
}

/// Caller-held handle to abort a run between stages
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Drives the orchestrator to completion for one state
pub struct WorkflowExecutor {
    orchestrator: Orchestrator,
}

impl WorkflowExecutor {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self { orchestrator }
    }

    /// Run one application to its final response
    pub async fn run(&self, initial: WorkflowState) -> Result<RunOutcome, IntakeError> {
        self.run_cancellable(initial, &CancelFlag::new()).await
    }

    /// Run one application, checking the cancel flag between stages
    pub async fn run_cancellable(
        &self,
        initial: WorkflowState,
        cancel: &CancelFlag,
    ) -> Result<RunOutcome, IntakeError> {
        if !initial.has_document_text() {
            return Err(IntakeError::InputIncomplete);
        }

        let run_id = Uuid::new_v4();
        log::info!(
            "run {}: starting with {} documents",
            run_id,
            initial.applicant_documents.len()
        );

        let mut state = initial;
        loop {
            if cancel.is_cancelled() {
                log::info!(
                    "run {}: cancelled after {} stages",
                    run_id,
                    state.route_history.len()
                );
                return Ok(RunOutcome::Cancelled);
            }

            let selection = self.orchestrator.select(&state).await;
            log::info!(
                "run {}: step {} -> {} ({})",
                run_id,
                state.route_history.len() + 1,
                selection.stage,
                selection.reason
            );

            state = self.orchestrator.advance(state, selection.stage).await;

            if selection.stage == StageName::ResponseGenerator {
                let response = state.final_response.take().unwrap_or_else(|| {
                    log::warn!("run {}: response stage produced no output", run_id);
                    FinalResponse {
                        status: FinalStatus::NotEligible,
                        reason: "no response produced".to_string(),
                    }
                });
                log::info!(
                    "run {}: finished as {:?} via {:?}",
                    run_id,
                    response.status,
                    state.route_history
                );
                return Ok(RunOutcome::Completed(response));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{
        DecisionMaker, DocumentChecker, FieldParser, ResponseComposer,
    };
    use crate::error::IntakeError;
    use crate::workflow::decision::DecisionAdapter;
    use crate::workflow::stages::{
        EligibilityEvaluator, Extractor, ResponseGenerator, Validator,
    };
    use crate::workflow::state::{DocumentKind, ValidationResult};
    use async_trait::async_trait;
    use serde_json::{Map, Value};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Decision maker whose model is down; routing runs on the fallback
    struct UnavailableDecisionMaker {
        calls: AtomicU32,
    }

    #[async_trait]
    impl DecisionMaker for UnavailableDecisionMaker {
        async fn decide(&self, _state: &Value, _rules: &str) -> Result<String, IntakeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(IntakeError::unavailable("decision_maker", "down"))
        }
    }

    /// Decision maker stuck on a non-terminal stage
    struct StuckDecisionMaker;

    #[async_trait]
    impl DecisionMaker for StuckDecisionMaker {
        async fn decide(&self, _state: &Value, _rules: &str) -> Result<String, IntakeError> {
            Ok(r#"{"next_node": "data_extractor", "reason": "again"}"#.to_string())
        }
    }

    /// Field parser whose model is down, falling back to text scanning
    struct FallbackOnlyParser;

    #[async_trait]
    impl FieldParser for FallbackOnlyParser {
        async fn parse(&self, text: &str) -> Result<Map<String, Value>, IntakeError> {
            Ok(crate::collaborators::parser::fallback_parse(text))
        }
    }

    struct UnavailableChecker;

    #[async_trait]
    impl DocumentChecker for UnavailableChecker {
        async fn validate(
            &self,
            _fields: &Map<String, Value>,
            _documents: &HashMap<DocumentKind, String>,
        ) -> Result<ValidationResult, IntakeError> {
            Err(IntakeError::unavailable("document_checker", "down"))
        }
    }

    /// Composer that echoes the decision with a canned reason
    struct EchoComposer;

    #[async_trait]
    impl ResponseComposer for EchoComposer {
        async fn compose(
            &self,
            eligibility: bool,
            validation: Option<&ValidationResult>,
        ) -> Result<FinalResponse, IntakeError> {
            let ok = eligibility && validation.map(|v| v.overall_ok).unwrap_or(true);
            Ok(FinalResponse {
                status: if ok {
                    FinalStatus::Eligible
                } else {
                    FinalStatus::NotEligible
                },
                reason: "echo".to_string(),
            })
        }
    }

    fn executor_with(maker: Arc<dyn DecisionMaker>, max_iterations: u32) -> WorkflowExecutor {
        let orchestrator = Orchestrator::new(
            DecisionAdapter::new(maker),
            Arc::new(Extractor::new(Arc::new(FallbackOnlyParser))),
            Arc::new(Validator::new(Arc::new(UnavailableChecker))),
            Arc::new(EligibilityEvaluator::new(None)),
            Arc::new(ResponseGenerator::new(Arc::new(EchoComposer))),
            max_iterations,
        );
        WorkflowExecutor::new(orchestrator)
    }

    fn documents(text: &str) -> HashMap<DocumentKind, String> {
        let mut docs = HashMap::new();
        docs.insert(DocumentKind::ApplicationForm, text.to_string());
        docs
    }

    #[tokio::test]
    async fn test_end_to_end_eligible_with_all_models_down() {
        // Decision fallback routes, text fallback extracts, rule fallback
        // evaluates: income 3000 < 25000, family 5 >= 3, net assets
        // 2000 <= 50000
        let executor = executor_with(
            Arc::new(UnavailableDecisionMaker {
                calls: AtomicU32::new(0),
            }),
            8,
        );
        let state = WorkflowState::new(documents(
            "Age: 40 Monthly Income: 3000 Family Size: 5 Total Assets: 2000",
        ));

        let outcome = executor.run(state).await.unwrap();
        match outcome {
            RunOutcome::Completed(response) => {
                assert_eq!(response.status, FinalStatus::Eligible);
            }
            RunOutcome::Cancelled => panic!("run should complete"),
        }
    }

    #[tokio::test]
    async fn test_not_eligible_when_income_too_high() {
        let executor = executor_with(
            Arc::new(UnavailableDecisionMaker {
                calls: AtomicU32::new(0),
            }),
            8,
        );
        let state = WorkflowState::new(documents(
            "Age: 40 Monthly Income: 40,000 Family Size: 5 Total Assets: 2000",
        ));

        let outcome = executor.run(state).await.unwrap();
        assert_eq!(
            outcome,
            RunOutcome::Completed(FinalResponse {
                status: FinalStatus::NotEligible,
                reason: "echo".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_blank_documents_are_input_incomplete() {
        let executor = executor_with(
            Arc::new(UnavailableDecisionMaker {
                calls: AtomicU32::new(0),
            }),
            8,
        );
        let mut docs = documents("   ");
        docs.insert(DocumentKind::Passport, String::new());

        let result = executor.run(WorkflowState::new(docs)).await;
        assert!(matches!(result, Err(IntakeError::InputIncomplete)));
    }

    #[tokio::test]
    async fn test_loop_guard_terminates_stuck_decisions() {
        let max_iterations = 5;
        let executor = executor_with(Arc::new(StuckDecisionMaker), max_iterations);
        let state = WorkflowState::new(documents("Age: 40 Monthly Income: 3000"));

        let outcome = executor.run(state).await.unwrap();

        // max_iterations extractor runs plus the forced terminal stage
        match outcome {
            RunOutcome::Completed(response) => {
                // Eligibility never ran, so the forced response is a refusal
                assert_eq!(response.status, FinalStatus::NotEligible);
            }
            RunOutcome::Cancelled => panic!("run should complete"),
        }
    }

    #[tokio::test]
    async fn test_loop_guard_bounds_stage_executions() {
        struct CountingParser(AtomicU32);

        #[async_trait]
        impl FieldParser for CountingParser {
            async fn parse(&self, _text: &str) -> Result<Map<String, Value>, IntakeError> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok(Map::new())
            }
        }

        let parser = Arc::new(CountingParser(AtomicU32::new(0)));
        let max_iterations = 4;
        let orchestrator = Orchestrator::new(
            DecisionAdapter::new(Arc::new(StuckDecisionMaker)),
            Arc::new(Extractor::new(parser.clone())),
            Arc::new(Validator::new(Arc::new(UnavailableChecker))),
            Arc::new(EligibilityEvaluator::new(None)),
            Arc::new(ResponseGenerator::new(Arc::new(EchoComposer))),
            max_iterations,
        );
        let executor = WorkflowExecutor::new(orchestrator);

        let outcome = executor
            .run(WorkflowState::new(documents("Age: 40")))
            .await
            .unwrap();

        assert!(matches!(outcome, RunOutcome::Completed(_)));
        // Terminates within max_iterations + 1 stage executions
        assert_eq!(parser.0.load(Ordering::SeqCst), max_iterations);
    }

    #[tokio::test]
    async fn test_cancelled_run_reports_cancelled() {
        let executor = executor_with(
            Arc::new(UnavailableDecisionMaker {
                calls: AtomicU32::new(0),
            }),
            8,
        );
        let cancel = CancelFlag::new();
        cancel.cancel();

        let outcome = executor
            .run_cancellable(WorkflowState::new(documents("Age: 40")), &cancel)
            .await
            .unwrap();
        assert_eq!(outcome, RunOutcome::Cancelled);
    }

    #[tokio::test]
    async fn test_route_history_records_executed_stages() {
        struct ScriptedDecisionMaker(AtomicU32);

        #[async_trait]
        impl DecisionMaker for ScriptedDecisionMaker {
            async fn decide(&self, _state: &Value, _rules: &str) -> Result<String, IntakeError> {
                let step = self.0.fetch_add(1, Ordering::SeqCst);
                let next = match step {
                    0 => "data_extractor",
                    1 => "eligibility_checker",
                    2 => "data_validator",
                    _ => "response_generator",
                };
                Ok(format!(r#"{{"next_node": "{}", "reason": "scripted"}}"#, next))
            }
        }

        let orchestrator = Orchestrator::new(
            DecisionAdapter::new(Arc::new(ScriptedDecisionMaker(AtomicU32::new(0)))),
            Arc::new(Extractor::new(Arc::new(FallbackOnlyParser))),
            Arc::new(Validator::new(Arc::new(UnavailableChecker))),
            Arc::new(EligibilityEvaluator::new(None)),
            Arc::new(ResponseGenerator::new(Arc::new(EchoComposer))),
            8,
        );

        let mut state = WorkflowState::new(documents("Age: 40 Monthly Income: 3000"));
        for _ in 0..4 {
            let selection = orchestrator.select(&state).await;
            state = orchestrator.advance(state, selection.stage).await;
        }

        assert_eq!(
            state.route_history,
            vec![
                StageName::DataExtractor,
                StageName::EligibilityChecker,
                StageName::DataValidator,
                StageName::ResponseGenerator,
            ]
        );
        // Validation failed closed, so the echoed response is a refusal
        assert_eq!(
            state.final_response.map(|r| r.status),
            Some(FinalStatus::NotEligible)
        );
    }
}
