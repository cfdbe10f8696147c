// SPDX-License-Identifier: MIT

//! Stage contract and the closed stage-name enum
//!
//! The decision collaborator names stages as free text; everything past
//! the adapter boundary works with [`StageName`] values, so a stage that
//! does not exist cannot be selected.

use crate::workflow::state::{StatePatch, WorkflowState};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Names of the four workflow stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    DataExtractor,
    DataValidator,
    EligibilityChecker,
    ResponseGenerator,
}

impl StageName {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::DataExtractor => "data_extractor",
            StageName::DataValidator => "data_validator",
            StageName::EligibilityChecker => "eligibility_checker",
            StageName::ResponseGenerator => "response_generator",
        }
    }

    /// Parse a stage name from collaborator output
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim() {
            "data_extractor" => Some(StageName::DataExtractor),
            "data_validator" => Some(StageName::DataValidator),
            "eligibility_checker" => Some(StageName::EligibilityChecker),
            "response_generator" => Some(StageName::ResponseGenerator),
            _ => None,
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of workflow processing.
///
/// A stage must never fail past its own boundary: collaborator errors
/// degrade to a default patch and a logged condition, so `execute` is
/// infallible by contract.
#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> StageName;

    /// Run the stage against the current state and return the fields it
    /// changed
    async fn execute(&self, state: &WorkflowState) -> StatePatch;
}
