// SPDX-License-Identifier: MIT

//! HTTP client for the trained eligibility classifier
//!
//! The model itself lives in a sidecar process loaded once at its own
//! startup; this client is safe to share across concurrent runs. The
//! sidecar contract is `POST {url}` with `{"features": [income,
//! family_size, employment_years, assets, age]}` returning
//! `{"label": 0|1}`, label 0 meaning eligible.

use super::Classifier;
use crate::error::IntakeError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

const COLLABORATOR: &str = "classifier";

/// Classifier collaborator over HTTP
pub struct HttpClassifier {
    client: Client,
    url: String,
}

impl HttpClassifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, IntakeError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IntakeError::unavailable(COLLABORATOR, e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn predict(&self, features: &[f64; 5]) -> Result<u8, IntakeError> {
        let resp = self
            .client
            .post(&self.url)
            .json(&json!({ "features": features }))
            .send()
            .await
            .map_err(|e| IntakeError::unavailable(COLLABORATOR, e.to_string()))?;

        if !resp.status().is_success() {
            return Err(IntakeError::unavailable(
                COLLABORATOR,
                format!("HTTP {}", resp.status()),
            ));
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| IntakeError::malformed(COLLABORATOR, e.to_string()))?;

        match body["label"].as_u64() {
            Some(label @ (0 | 1)) => Ok(label as u8),
            Some(other) => Err(IntakeError::malformed(
                COLLABORATOR,
                format!("label out of range: {}", other),
            )),
            None => Err(IntakeError::malformed(
                COLLABORATOR,
                "reply has no integer label",
            )),
        }
    }
}
