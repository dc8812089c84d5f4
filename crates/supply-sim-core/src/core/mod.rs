// crates/supply-sim-core/src/core/mod.rs
// ============================================================================
// Module: Supply Sim Core Types
// Description: Catalog, assessment, and scenario store structures.
// Purpose: Provide stable, serializable types for the disruption simulator.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Core types define the stage catalog, per-stage assessments, and the
//! scenario store those assessments are folded into. These types are the
//! source of truth for the HTTP and CLI surfaces.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod assessment;
pub mod catalog;
pub mod identifiers;
pub mod scenario;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use assessment::Assessment;
pub use assessment::Choice;
pub use assessment::DEFAULT_CHOICE_LABEL;
pub use catalog::AlternativeSpec;
pub use catalog::Catalog;
pub use catalog::CatalogDocument;
pub use catalog::CatalogError;
pub use catalog::StageSpec;
pub use identifiers::AlternativeLabel;
pub use identifiers::StageId;
pub use scenario::ScenarioError;
pub use scenario::ScenarioRow;
pub use scenario::ScenarioStore;
pub use scenario::ScenarioSummary;
