// crates/supply-sim-core/src/runtime/mod.rs
// ============================================================================
// Module: Supply Sim Runtime
// Description: Prompt construction, answer parsing, and the disruption applier.
// Purpose: Execute disruption events against an assessment collaborator.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules implement the single request/apply cycle. HTTP and CLI
//! surfaces call into [`DisruptionApplier`] rather than reimplementing it.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod applier;
pub mod parse;
pub mod prompt;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use applier::ApplyEventError;
pub use applier::Assessed;
pub use applier::AttemptFailure;
pub use applier::AttemptFailureKind;
pub use applier::DEFAULT_MAX_ATTEMPTS;
pub use applier::DisruptionApplier;
pub use applier::EventOutcome;
pub use applier::RetryPolicy;
pub use parse::ParseError;
pub use parse::parse_assessments;
pub use prompt::build_request;
