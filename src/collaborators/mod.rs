// SPDX-License-Identifier: MIT

//! External collaborator contracts
//!
//! The workflow core only sees these traits. The shipped implementations
//! are LLM-backed (through [`crate::llm::ChatModel`]) except the
//! classifier, which talks to a model sidecar over HTTP. Stages and the
//! decision adapter own the fallbacks, so a failing collaborator never
//! aborts a run.

pub mod checker;
pub mod classifier;
pub mod composer;
pub mod decision;
pub mod parser;

pub use checker::LlmDocumentChecker;
pub use classifier::HttpClassifier;
pub use composer::LlmResponseComposer;
pub use decision::LlmDecisionMaker;
pub use parser::LlmFieldParser;

use crate::error::IntakeError;
use crate::workflow::state::{DocumentKind, FinalResponse, ValidationResult};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Parses free-form document text into the applicant-field schema.
///
/// Best-effort: missing fields are simply absent from the returned
/// mapping; the parser only errors when it has nothing to work with.
#[async_trait]
pub trait FieldParser: Send + Sync {
    async fn parse(&self, text: &str) -> Result<Map<String, Value>, IntakeError>;
}

/// Cross-checks extracted fields against the raw documents
#[async_trait]
pub trait DocumentChecker: Send + Sync {
    async fn validate(
        &self,
        fields: &Map<String, Value>,
        documents: &HashMap<DocumentKind, String>,
    ) -> Result<ValidationResult, IntakeError>;
}

/// Trained eligibility model.
///
/// Feature order is fixed: `[income, family_size, employment_years,
/// assets, age]`. Label polarity is inherited from the trained model:
/// label 0 means eligible, label 1 means not eligible.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn predict(&self, features: &[f64; 5]) -> Result<u8, IntakeError>;
}

/// Composes the final applicant-facing response
#[async_trait]
pub trait ResponseComposer: Send + Sync {
    async fn compose(
        &self,
        eligibility: bool,
        validation: Option<&ValidationResult>,
    ) -> Result<FinalResponse, IntakeError>;
}

/// Recommends the next stage for the current workflow state.
///
/// Returns free-form text expected to contain one embedded JSON object;
/// validation and defaulting live in the decision adapter, not here.
#[async_trait]
pub trait DecisionMaker: Send + Sync {
    async fn decide(&self, state_json: &Value, rules: &str) -> Result<String, IntakeError>;
}
