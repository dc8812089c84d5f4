// crates/supply-sim-cli/src/lib.rs
// ============================================================================
// Module: Supply Sim CLI Library
// Description: Shared helpers for the Supply Sim command-line interface.
// Purpose: Provide reusable components for the CLI binary and tests.
// Dependencies: Standard library.
// ============================================================================

//! ## Overview
//! Houses the serve policy that keeps the unauthenticated API on loopback
//! unless exposure is explicitly requested. The binary entry point
//! (`src/main.rs`) imports these helpers.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Network exposure checks for `supply-sim serve`.
pub mod serve_policy;
