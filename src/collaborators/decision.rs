// SPDX-License-Identifier: MIT

//! LLM decision maker
//!
//! Sends the serialized workflow state and the routing rules to the chat
//! model and returns the raw reply. The decision adapter owns extraction,
//! validation, and the deterministic fallback.

use super::DecisionMaker;
use crate::error::IntakeError;
use crate::llm::{ChatMessage, ChatModel};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Decision maker backed by a chat model
pub struct LlmDecisionMaker {
    model: Arc<dyn ChatModel>,
}

impl LlmDecisionMaker {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl DecisionMaker for LlmDecisionMaker {
    async fn decide(&self, state_json: &Value, rules: &str) -> Result<String, IntakeError> {
        let state = serde_json::to_string_pretty(state_json).unwrap_or_default();

        let prompt = format!(
            r#"You are an Orchestrator AI for validating a social support application.

Workflow state:
{state}

Rules:
{rules}

Output strictly in JSON:
{{
"next_node": "<name of next node>",
"reason": "<short reason>"
}}"#
        );

        self.model.chat(&[ChatMessage::user(prompt)]).await
    }
}
