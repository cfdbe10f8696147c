// SPDX-License-Identifier: MIT

//! Eligibility evaluation stage

use crate::collaborators::Classifier;
use crate::workflow::numeric::to_f64;
use crate::workflow::stage::{Stage, StageName};
use crate::workflow::state::{StatePatch, WorkflowState};
use async_trait::async_trait;
use std::sync::Arc;

/// Evaluates eligibility from the extracted fields.
///
/// Normalizes the numeric-ish fields, builds the fixed-order feature
/// vector `[income, family_size, employment_years, assets, age]`, and
/// asks the trained classifier. Without a classifier (not configured, or
/// the call fails) the rule fallback decides instead.
pub struct EligibilityEvaluator {
    classifier: Option<Arc<dyn Classifier>>,
}

impl EligibilityEvaluator {
    pub fn new(classifier: Option<Arc<dyn Classifier>>) -> Self {
        Self { classifier }
    }
}

/// Rule fallback: eligible iff income < 25000, family size >= 3, and net
/// assets (assets - liabilities) <= 50000
fn rule_eligibility(income: f64, family_size: f64, assets: f64, liabilities: f64) -> bool {
    income < 25000.0 && family_size >= 3.0 && (assets - liabilities) <= 50000.0
}

#[async_trait]
impl Stage for EligibilityEvaluator {
    fn name(&self) -> StageName {
        StageName::EligibilityChecker
    }

    async fn execute(&self, state: &WorkflowState) -> StatePatch {
        let field = |name: &str| state.extracted_fields.get(name).map(to_f64).unwrap_or(0.0);

        let income = field("monthly_income");
        let family_size = field("family_members");
        let employment_years = field("employment_years");
        let assets = field("assets");
        let liabilities = field("liabilities");
        let age = field("age");

        let features = [income, family_size, employment_years, assets, age];

        let eligibility = match &self.classifier {
            Some(classifier) => match classifier.predict(&features).await {
                // Label 0 means eligible, inherited from the trained model
                Ok(label) => label == 0,
                Err(e) => {
                    log::warn!("classifier failed ({}), using rule fallback", e);
                    rule_eligibility(income, family_size, assets, liabilities)
                }
            },
            None => {
                log::info!("no classifier configured, using rule fallback");
                rule_eligibility(income, family_size, assets, liabilities)
            }
        };

        StatePatch {
            eligibility: Some(eligibility),
            ..Default::default()
        }
    }
}
