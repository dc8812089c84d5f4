// crates/supply-sim-config/src/lib.rs
// ============================================================================
// Module: Supply Sim Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for supply-sim.toml semantics.
// Dependencies: supply-sim-core, serde, toml
// ============================================================================

//! ## Overview
//! `supply-sim-config` defines the configuration model for the simulator
//! server, the LLM collaborator, audit logging, the stage catalog, and the
//! inventory query. Validation is strict and fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
