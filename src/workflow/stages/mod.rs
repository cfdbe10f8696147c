// SPDX-License-Identifier: MIT

//! The four workflow stage implementations
//!
//! Each stage wraps one collaborator call and owns its degraded path:
//! extraction degrades to empty fields, validation fails closed,
//! eligibility falls back to the rule check, and the response stage
//! falls back to a default refusal.

mod eligibility;
mod extractor;
mod response;
mod validator;

pub use eligibility::EligibilityEvaluator;
pub use extractor::Extractor;
pub use response::ResponseGenerator;
pub use validator::Validator;
