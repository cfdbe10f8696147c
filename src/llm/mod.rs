// SPDX-License-Identifier: MIT

//! Chat model seam for the LLM-backed collaborators
//!
//! Collaborators depend on the [`ChatModel`] trait, not on a concrete
//! provider. The only shipped implementation is [ollama].

pub mod ollama;

pub use ollama::OllamaModel;

use crate::error::IntakeError;
use async_trait::async_trait;
use serde::Serialize;

/// A single message in a chat exchange
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Core trait for chat model implementations
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send a conversation and return the assistant's reply text
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, IntakeError>;
}

/// Extract the first embedded JSON object from free-form model output.
///
/// Models are prompted to return bare JSON but routinely wrap it in prose
/// or code fences. Scans for a balanced `{...}` span and parses it;
/// returns None when no span parses.
pub fn extract_json_object(text: &str) -> Option<serde_json::Value> {
    let bytes = text.as_bytes();
    let mut start = None;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' if start.is_some() => in_string = true,
            b'{' => {
                if start.is_none() {
                    start = Some(i);
                }
                depth += 1;
            }
            b'}' if start.is_some() => {
                depth -= 1;
                if depth == 0 {
                    let span = &text[start.unwrap_or(0)..=i];
                    match serde_json::from_str(span) {
                        Ok(value) => return Some(value),
                        Err(_) => {
                            // Keep scanning past an unparseable span
                            start = None;
                        }
                    }
                }
            }
            _ => {}
        }
    }

    None
}
