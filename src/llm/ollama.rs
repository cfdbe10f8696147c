// SPDX-License-Identifier: MIT

//! Ollama chat client
//!
//! Talks to Ollama's native `/api/chat` endpoint. The per-request
//! timeout comes from [`IntakeConfig::call_timeout`]; a timed-out or
//! unreachable server surfaces as `CollaboratorUnavailable`.

use super::{ChatMessage, ChatModel};
use crate::config::IntakeConfig;
use crate::error::IntakeError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

const COLLABORATOR: &str = "ollama";

/// Ollama model implementation
pub struct OllamaModel {
    client: Client,
    base_url: String,
    model_name: String,
}

impl OllamaModel {
    /// Create a new OllamaModel from runtime configuration
    pub fn new(config: &IntakeConfig) -> Result<Self, IntakeError> {
        let client = Client::builder()
            .timeout(config.call_timeout)
            .build()
            .map_err(|e| IntakeError::unavailable(COLLABORATOR, e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.ollama_base_url.trim_end_matches('/').to_string(),
            model_name: config.model_name.clone(),
        })
    }
}

#[async_trait]
impl ChatModel for OllamaModel {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, IntakeError> {
        let url = format!("{}/api/chat", self.base_url);

        let body = json!({
            "model": self.model_name,
            "messages": messages,
            "stream": false
        });

        log::debug!(
            "Ollama request body: {}",
            serde_json::to_string_pretty(&body).unwrap_or_default()
        );

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| IntakeError::unavailable(COLLABORATOR, e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(IntakeError::unavailable(
                COLLABORATOR,
                format!("HTTP {}: {}", status, text),
            ));
        }

        let resp_json: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| IntakeError::malformed(COLLABORATOR, e.to_string()))?;

        log::debug!("Ollama response: {}", resp_json);

        resp_json["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .ok_or_else(|| {
                IntakeError::malformed(COLLABORATOR, "reply has no message content".to_string())
            })
    }
}
