// crates/supply-sim-core/src/lib.rs
// ============================================================================
// Module: Supply Sim Core Library
// Description: Public API surface for the supply chain disruption simulator.
// Purpose: Expose core types, the assessment interface, and the applier.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Supply Sim core holds a laptop supply chain scenario in memory and folds
//! LLM-produced per-stage assessments into it. It performs no I/O; the LLM
//! collaborator is reached through [`AssessmentSource`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::AssessmentRequest;
pub use interfaces::AssessmentSource;
pub use interfaces::RawAssessment;
pub use interfaces::SharedAssessmentSource;
pub use interfaces::SourceError;
pub use runtime::ApplyEventError;
pub use runtime::Assessed;
pub use runtime::AttemptFailure;
pub use runtime::AttemptFailureKind;
pub use runtime::DisruptionApplier;
pub use runtime::EventOutcome;
pub use runtime::RetryPolicy;
