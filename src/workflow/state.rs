// SPDX-License-Identifier: MIT

//! Workflow state and merge semantics
//!
//! One [`WorkflowState`] exists per applicant run. Stages never mutate
//! it directly; they return a [`StatePatch`] which the orchestrator
//! folds in through the pure [`merge`] function. Merges are shallow and
//! additive: a patch replaces a field wholesale and never touches
//! fields it does not name.

use crate::workflow::stage::StageName;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Kinds of documents an applicant can submit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    ApplicationForm,
    Passport,
    SalarySlip,
    BankStatement,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::ApplicationForm => "application_form",
            DocumentKind::Passport => "passport",
            DocumentKind::SalarySlip => "salary_slip",
            DocumentKind::BankStatement => "bank_statement",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "application_form" => Ok(DocumentKind::ApplicationForm),
            "passport" => Ok(DocumentKind::Passport),
            "salary_slip" => Ok(DocumentKind::SalarySlip),
            "bank_statement" => Ok(DocumentKind::BankStatement),
            other => Err(format!("unknown document kind: {}", other)),
        }
    }
}

/// Outcome of the document validation stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub age_ok: bool,
    pub income_ok: bool,
    pub overall_ok: bool,
    pub reason: String,
}

impl ValidationResult {
    /// A fail-closed result with a diagnostic reason
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            age_ok: false,
            income_ok: false,
            overall_ok: false,
            reason: reason.into(),
        }
    }
}

/// Terminal decision for the applicant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalStatus {
    Eligible,
    NotEligible,
}

/// The response returned to the caller at the end of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalResponse {
    pub status: FinalStatus,
    pub reason: String,
}

/// The mutable record threaded through every stage of one run
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowState {
    /// Raw extracted text per submitted document
    pub applicant_documents: HashMap<DocumentKind, String>,
    /// Structured applicant fields, set by the extractor stage
    pub extracted_fields: Map<String, Value>,
    pub validation_result: Option<ValidationResult>,
    pub eligibility: Option<bool>,
    pub final_response: Option<FinalResponse>,
    /// Stages actually executed, in order
    pub route_history: Vec<StageName>,
}

impl WorkflowState {
    /// Create the state for a new run from the collected documents
    pub fn new(applicant_documents: HashMap<DocumentKind, String>) -> Self {
        Self {
            applicant_documents,
            extracted_fields: Map::new(),
            validation_result: None,
            eligibility: None,
            final_response: None,
            route_history: Vec::new(),
        }
    }

    /// Whether any submitted document carries non-blank text
    pub fn has_document_text(&self) -> bool {
        self.applicant_documents
            .values()
            .any(|text| !text.trim().is_empty())
    }

    /// Serialize the state for the decision collaborator
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Fields a stage may change. `None` means "untouched".
///
/// The closed field set is deliberate: the source system passed open
/// string-keyed dicts between nodes, which let a stage invent state
/// keys. Here an unknown key is unrepresentable.
#[derive(Debug, Clone, Default)]
pub struct StatePatch {
    pub extracted_fields: Option<Map<String, Value>>,
    pub validation_result: Option<ValidationResult>,
    pub eligibility: Option<bool>,
    pub final_response: Option<FinalResponse>,
}

impl StatePatch {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Overlay `patch` onto `current`, returning the merged state.
///
/// Each patched field is replaced wholesale (no deep merge of nested
/// collections); untouched fields carry over identically. Pure function:
/// `current` is not aliased by the result.
pub fn merge(current: &WorkflowState, patch: StatePatch) -> WorkflowState {
    let mut next = current.clone();
    if let Some(fields) = patch.extracted_fields {
        next.extracted_fields = fields;
    }
    if let Some(validation) = patch.validation_result {
        next.validation_result = Some(validation);
    }
    if let Some(eligibility) = patch.eligibility {
        next.eligibility = Some(eligibility);
    }
    if let Some(response) = patch.final_response {
        next.final_response = Some(response);
    }
    next
}
