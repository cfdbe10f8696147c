// SPDX-License-Identifier: MIT

//! The workflow core: state, stages, decision routing, and the run loop

pub mod decision;
pub mod executor;
pub mod numeric;
pub mod orchestrator;
pub mod stage;
pub mod stages;
pub mod state;

pub use decision::DecisionAdapter;
pub use executor::{CancelFlag, RunOutcome, WorkflowExecutor};
pub use orchestrator::Orchestrator;
pub use stage::{Stage, StageName};
pub use state::{merge, DocumentKind, FinalResponse, FinalStatus, StatePatch, WorkflowState};
