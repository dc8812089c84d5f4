// crates/supply-sim-server/src/lib.rs
// ============================================================================
// Module: Supply Sim Server Library
// Description: HTTP JSON API over a single in-memory scenario session.
// Purpose: Expose scenario views, disruption events, and manual overrides.
// Dependencies: supply-sim-core, supply-sim-config, supply-sim-providers, axum, tokio
// ============================================================================

//! ## Overview
//! The server owns one [`supply_sim_core::ScenarioStore`] behind a
//! [`service::SimulatorService`]. Disruption events are serialized: the
//! session lock is held for the whole call-and-apply cycle and the blocking
//! LLM call runs on the blocking thread pool. Every state change is recorded
//! through an [`audit::SimAuditSink`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod server;
pub mod service;
pub mod view;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::SimAuditSink;
pub use audit::StderrAuditSink;
pub use server::SimServer;
pub use server::SimServerError;
pub use server::router;
pub use service::EventReport;
pub use service::ServiceError;
pub use service::ServiceLimits;
pub use service::SimulatorService;
pub use view::ChartSeries;
pub use view::ScenarioView;
