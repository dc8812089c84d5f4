// crates/supply-sim-providers/src/lib.rs
// ============================================================================
// Module: Supply Sim Providers Library
// Description: Outbound clients for the simulator's external collaborators.
// Purpose: Reach the hosted LLM and the document database with strict limits.
// Dependencies: supply-sim-core, reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! Two blocking HTTP clients live here:
//! - [`StructuredCallClient`] implements [`supply_sim_core::AssessmentSource`]
//!   against a named structured-call endpoint.
//! - [`CouchbaseQueryClient`] issues a fixed statement against a Couchbase
//!   Query Service.
//!
//! Both disable redirects, carry request timeouts, and cap response sizes.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod http;
pub mod inventory;
pub mod llm;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use inventory::CouchbaseQueryClient;
pub use inventory::InventoryError;
pub use inventory::InventoryQueryConfig;
pub use inventory::query_service_url;
pub use llm::ClientError;
pub use llm::StructuredCallClient;
pub use llm::StructuredCallConfig;
