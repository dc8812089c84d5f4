// crates/supply-sim-server/src/service.rs
// ============================================================================
// Module: Simulator Service
// Description: Scenario session shared by the HTTP handlers.
// Purpose: Serialize disruption events and record every state change.
// Dependencies: supply-sim-core, tokio
// ============================================================================

//! ## Overview
//! [`SimulatorService`] owns the session's [`ScenarioStore`]. A disruption
//! event holds the session lock for the whole call-and-apply cycle, so events
//! never interleave. The applier performs blocking I/O and therefore runs on
//! the blocking thread pool. On failure the stored scenario is untouched.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Serialize;
use supply_sim_core::ApplyEventError;
use supply_sim_core::Assessment;
use supply_sim_core::AttemptFailure;
use supply_sim_core::Catalog;
use supply_sim_core::Choice;
use supply_sim_core::DisruptionApplier;
use supply_sim_core::ScenarioError;
use supply_sim_core::ScenarioStore;
use supply_sim_core::SharedAssessmentSource;
use supply_sim_core::StageId;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::audit::AttemptAuditEvent;
use crate::audit::DisruptionAuditEvent;
use crate::audit::DisruptionAuditEventParams;
use crate::audit::EventFingerprint;
use crate::audit::ManualAuditEvent;
use crate::audit::ResetAuditEvent;
use crate::audit::SimAuditSink;
use crate::view::ScenarioView;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Result of a successfully applied disruption event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventReport {
    /// Assessments applied, in answer order.
    pub assessments: Vec<Assessment>,
    /// Attempts that failed before the successful one.
    pub failed_attempts: Vec<AttemptFailure>,
    /// Scenario after the event.
    pub scenario: ScenarioView,
}

/// Service errors surfaced to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The request is malformed or out of bounds.
    #[error("{0}")]
    InvalidRequest(String),
    /// The collaborator produced no usable assessment.
    #[error("no assessment available after {} attempts", .attempts.len())]
    Unavailable {
        /// Failure record for each attempt.
        attempts: Vec<AttemptFailure>,
    },
    /// An assessment or override referenced an unknown stage or choice.
    #[error("{error}")]
    Rejected {
        /// Lookup failure.
        error: ScenarioError,
        /// Index of the offending assessment, if from an event.
        index: Option<usize>,
        /// Assessments returned by the collaborator, if from an event.
        assessments: Vec<Assessment>,
    },
    /// Internal failure (task join).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Configuration knobs applied by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceLimits {
    /// Maximum event length in characters.
    pub max_event_chars: usize,
    /// Log raw event text instead of a digest only.
    pub log_event_text: bool,
}

// ============================================================================
// SECTION: Service
// ============================================================================

/// Scenario session shared across HTTP handlers.
pub struct SimulatorService {
    /// Session catalog.
    catalog: Arc<Catalog>,
    /// Session scenario store.
    store: Mutex<ScenarioStore>,
    /// Disruption applier over the configured collaborator.
    applier: Arc<DisruptionApplier<SharedAssessmentSource>>,
    /// Audit sink for state changes.
    audit: Arc<dyn SimAuditSink>,
    /// Request limits and logging switches.
    limits: ServiceLimits,
}

impl SimulatorService {
    /// Creates a session holding the catalog defaults.
    #[must_use]
    pub fn new(
        catalog: Arc<Catalog>,
        applier: DisruptionApplier<SharedAssessmentSource>,
        audit: Arc<dyn SimAuditSink>,
        limits: ServiceLimits,
    ) -> Self {
        Self {
            store: Mutex::new(ScenarioStore::new(Arc::clone(&catalog))),
            catalog,
            applier: Arc::new(applier),
            audit,
            limits,
        }
    }

    /// Returns the current scenario snapshot.
    pub async fn scenario(&self) -> ScenarioView {
        ScenarioView::from_store(&*self.store.lock().await)
    }

    /// Returns the session catalog.
    #[must_use]
    pub const fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Runs one disruption event through the applier and commits the result.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the event is invalid, no assessment is
    /// available, or an assessment is rejected. The scenario is unchanged.
    pub async fn apply_event(&self, event: String) -> Result<EventReport, ServiceError> {
        if event.trim().is_empty() {
            return Err(ServiceError::InvalidRequest("event must be non-empty".to_string()));
        }
        if event.chars().count() > self.limits.max_event_chars {
            return Err(ServiceError::InvalidRequest(format!(
                "event exceeds {} characters",
                self.limits.max_event_chars
            )));
        }
        let fingerprint = EventFingerprint::new(&event, self.limits.log_event_text);
        let mut store = self.store.lock().await;
        let snapshot = store.clone();
        let applier = Arc::clone(&self.applier);
        let result = tokio::task::spawn_blocking(move || applier.apply_event(&snapshot, &event))
            .await
            .map_err(|err| ServiceError::Internal(err.to_string()))?;
        match result {
            Ok(outcome) => {
                self.record_attempts(&fingerprint, &outcome.failed_attempts);
                *store = outcome.store;
                let summary = store.summary();
                self.audit.record_disruption(&DisruptionAuditEvent::new(
                    DisruptionAuditEventParams {
                        disruption: fingerprint,
                        attempts: attempts_used(outcome.failed_attempts.len()),
                        affected_stages: affected_stages(&outcome.assessments),
                        deltas: Some((summary.cost_delta_usd, summary.co2_delta_kg)),
                        error: None,
                    },
                ));
                Ok(EventReport {
                    assessments: outcome.assessments,
                    failed_attempts: outcome.failed_attempts,
                    scenario: ScenarioView::from_store(&store),
                })
            }
            Err(err) => {
                let (attempts, affected) = match &err {
                    ApplyEventError::Exhausted {
                        attempts,
                    } => {
                        self.record_attempts(&fingerprint, attempts);
                        (u32::try_from(attempts.len()).unwrap_or(u32::MAX), Vec::new())
                    }
                    ApplyEventError::Rejected {
                        assessments,
                        failed_attempts,
                        ..
                    } => {
                        self.record_attempts(&fingerprint, failed_attempts);
                        (attempts_used(failed_attempts.len()), affected_stages(assessments))
                    }
                    ApplyEventError::EmptyEvent => (0, Vec::new()),
                };
                self.audit.record_disruption(&DisruptionAuditEvent::new(
                    DisruptionAuditEventParams {
                        disruption: fingerprint,
                        attempts,
                        affected_stages: affected,
                        deltas: None,
                        error: Some(err.to_string()),
                    },
                ));
                Err(match err {
                    ApplyEventError::EmptyEvent => {
                        ServiceError::InvalidRequest("event must be non-empty".to_string())
                    }
                    ApplyEventError::Exhausted {
                        attempts,
                    } => ServiceError::Unavailable {
                        attempts,
                    },
                    ApplyEventError::Rejected {
                        index,
                        error,
                        assessments,
                        ..
                    } => ServiceError::Rejected {
                        error,
                        index: Some(index),
                        assessments,
                    },
                })
            }
        }
    }

    /// Applies one stage/choice override directly, bypassing the LLM.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Rejected`] for an unknown stage or choice.
    pub async fn apply_manual(
        &self,
        stage: StageId,
        choice: Choice,
        reason: Option<String>,
    ) -> Result<ScenarioView, ServiceError> {
        let assessment = Assessment {
            stage: stage.clone(),
            affected: !matches!(choice, Choice::Default),
            choice: choice.clone(),
            reason: reason.unwrap_or_else(|| "Manual selection".to_string()),
        };
        let mut store = self.store.lock().await;
        let applied = store.apply(&assessment).map(|_| ());
        let error = applied.as_ref().err().map(ToString::to_string);
        self.audit.record_manual(&ManualAuditEvent::new(stage, choice, error));
        match applied {
            Ok(()) => Ok(ScenarioView::from_store(&store)),
            Err(error) => Err(ServiceError::Rejected {
                error,
                index: None,
                assessments: Vec::new(),
            }),
        }
    }

    /// Restores every row to the catalog defaults.
    pub async fn reset(&self) -> ScenarioView {
        let mut store = self.store.lock().await;
        store.reset();
        self.audit.record_reset(&ResetAuditEvent::new());
        ScenarioView::from_store(&store)
    }

    /// Records one audit line per failed attempt.
    fn record_attempts(&self, fingerprint: &EventFingerprint, failures: &[AttemptFailure]) {
        for failure in failures {
            self.audit.record_attempt(&AttemptAuditEvent::new(fingerprint.clone(), failure));
        }
    }
}

/// Total attempts for a successful event.
fn attempts_used(failed: usize) -> u32 {
    u32::try_from(failed).unwrap_or(u32::MAX).saturating_add(1)
}

/// Stages an assessment list marks as affected.
fn affected_stages(assessments: &[Assessment]) -> Vec<StageId> {
    assessments
        .iter()
        .filter(|assessment| assessment.affected)
        .map(|assessment| assessment.stage.clone())
        .collect()
}
