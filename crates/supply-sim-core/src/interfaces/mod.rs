// crates/supply-sim-core/src/interfaces/mod.rs
// ============================================================================
// Module: Supply Sim Interfaces
// Description: Backend-agnostic interface for the assessment collaborator.
// Purpose: Define the contract the disruption applier calls out through.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The disruption applier never talks to a network directly. It hands an
//! [`AssessmentRequest`] to an [`AssessmentSource`] and receives a
//! [`RawAssessment`] back, which it parses itself. Implementations live in
//! `supply-sim-providers` (hosted LLM) and in tests (scripted stubs).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Request / Response
// ============================================================================

/// Structured-call request sent to the assessment collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentRequest {
    /// Task instructions, including the required answer format.
    pub instructions: String,
    /// Prompt text embedding the event and the option catalog.
    pub prompt: String,
    /// JSON schema describing the expected answer.
    pub output_schema: Value,
}

/// Unparsed collaborator answer.
#[derive(Debug, Clone, PartialEq)]
pub enum RawAssessment {
    /// Structured JSON payload.
    Json(Value),
    /// Free-text answer that should contain a JSON array.
    Text(String),
}

// ============================================================================
// SECTION: Assessment Source
// ============================================================================

/// Assessment collaborator errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The request could not be delivered.
    #[error("assessment transport error: {0}")]
    Transport(String),
    /// The collaborator answered with a non-success status.
    #[error("assessment endpoint returned status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },
    /// The answer exceeded the configured size limit.
    #[error("assessment response exceeds {max_bytes} bytes")]
    TooLarge {
        /// Configured limit in bytes.
        max_bytes: usize,
    },
    /// The answer envelope could not be decoded.
    #[error("assessment response invalid: {0}")]
    InvalidResponse(String),
}

/// Collaborator that turns a disruption prompt into a raw assessment answer.
pub trait AssessmentSource {
    /// Performs one structured call.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the call fails or the answer envelope is unusable.
    fn assess(&self, request: &AssessmentRequest) -> Result<RawAssessment, SourceError>;
}

impl<T: AssessmentSource + ?Sized> AssessmentSource for &T {
    fn assess(&self, request: &AssessmentRequest) -> Result<RawAssessment, SourceError> {
        (**self).assess(request)
    }
}

impl<T: AssessmentSource + ?Sized> AssessmentSource for Box<T> {
    fn assess(&self, request: &AssessmentRequest) -> Result<RawAssessment, SourceError> {
        (**self).assess(request)
    }
}

impl<T: AssessmentSource + ?Sized> AssessmentSource for Arc<T> {
    fn assess(&self, request: &AssessmentRequest) -> Result<RawAssessment, SourceError> {
        (**self).assess(request)
    }
}

/// Thread-safe shared assessment source.
pub type SharedAssessmentSource = Arc<dyn AssessmentSource + Send + Sync>;
