// SPDX-License-Identifier: MIT

//! Runtime configuration from environment variables
//!
//! Every knob has a default so the binary runs against a local Ollama
//! with nothing set. `.env` loading happens in `main`, not here.

use std::env;
use std::time::Duration;

/// Default chat model, matching the model the workflow was tuned on.
pub const DEFAULT_MODEL: &str = "qwen2.5:7b-instruct";

const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_MAX_ITERATIONS: u32 = 8;
const DEFAULT_CALL_TIMEOUT_SECS: u64 = 60;

/// Runtime configuration for a workflow process
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// Base URL of the Ollama server (`OLLAMA_BASE_URL`)
    pub ollama_base_url: String,
    /// Chat model name (`INTAKE_MODEL`)
    pub model_name: String,
    /// Classifier sidecar endpoint (`CLASSIFIER_URL`); None means the
    /// eligibility stage uses its rule fallback
    pub classifier_url: Option<String>,
    /// Loop guard: maximum stage executions per run (`INTAKE_MAX_ITERATIONS`)
    pub max_iterations: u32,
    /// Per-call timeout for collaborator requests (`INTAKE_CALL_TIMEOUT_SECS`)
    pub call_timeout: Duration,
}

impl IntakeConfig {
    /// Build configuration from the process environment
    pub fn from_env() -> Self {
        let max_iterations = env::var("INTAKE_MAX_ITERATIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_MAX_ITERATIONS);

        let timeout_secs = env::var("INTAKE_CALL_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_CALL_TIMEOUT_SECS);

        Self {
            ollama_base_url: env::var("OLLAMA_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_OLLAMA_BASE_URL.to_string()),
            model_name: env::var("INTAKE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            classifier_url: env::var("CLASSIFIER_URL").ok().filter(|v| !v.is_empty()),
            max_iterations,
            call_timeout: Duration::from_secs(timeout_secs),
        }
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            ollama_base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            model_name: DEFAULT_MODEL.to_string(),
            classifier_url: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            call_timeout: Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS),
        }
    }
}
