// SPDX-License-Identifier: MIT

//! Typed error handling for intake-rs
//!
//! Collaborator failures are recovered locally by the stage or adapter
//! that made the call; only `InputIncomplete` ever crosses the executor
//! boundary.

use thiserror::Error;

/// Top-level error type for intake-rs
#[derive(Debug, Error)]
pub enum IntakeError {
    /// External collaborator could not be reached or timed out
    #[error("collaborator '{collaborator}' unavailable: {message}")]
    CollaboratorUnavailable {
        collaborator: &'static str,
        message: String,
    },

    /// Collaborator replied, but the payload does not match its contract
    #[error("collaborator '{collaborator}' returned malformed output: {message}")]
    MalformedOutput {
        collaborator: &'static str,
        message: String,
    },

    /// Loop guard fired; the run was force-terminated
    #[error("loop limit exceeded after {limit} stage executions")]
    LoopLimitExceeded { limit: u32 },

    /// No usable document text at run start
    #[error("no usable document text in the application")]
    InputIncomplete,
}

impl IntakeError {
    /// Create a collaborator-unavailable error
    pub fn unavailable(collaborator: &'static str, message: impl Into<String>) -> Self {
        Self::CollaboratorUnavailable {
            collaborator,
            message: message.into(),
        }
    }

    /// Create a malformed-output error
    pub fn malformed(collaborator: &'static str, message: impl Into<String>) -> Self {
        Self::MalformedOutput {
            collaborator,
            message: message.into(),
        }
    }
}
