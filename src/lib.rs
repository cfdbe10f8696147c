// SPDX-License-Identifier: MIT

//! intake-rs: orchestrated document-intake workflow
//!
//! Runs one social-support application through extraction, validation,
//! eligibility evaluation, and response generation. Stage order is
//! decided per step by an external LLM collaborator, validated against a
//! closed stage enum and bounded by a loop guard, so the run terminates
//! no matter what the collaborator answers.

pub mod collaborators;
pub mod config;
pub mod error;
pub mod llm;
pub mod server;
pub mod workflow;
