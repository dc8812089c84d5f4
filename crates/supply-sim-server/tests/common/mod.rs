// crates/supply-sim-server/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Scripted assessment sources and recording audit sinks.
// Purpose: Drive the simulator service without a live LLM.
// Dependencies: supply-sim-core, supply-sim-server
// ============================================================================

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use serde_json::json;
use supply_sim_core::AssessmentRequest;
use supply_sim_core::AssessmentSource;
use supply_sim_core::Catalog;
use supply_sim_core::DisruptionApplier;
use supply_sim_core::RawAssessment;
use supply_sim_core::RetryPolicy;
use supply_sim_core::SharedAssessmentSource;
use supply_sim_core::SourceError;
use supply_sim_server::ServiceLimits;
use supply_sim_server::SimAuditSink;
use supply_sim_server::SimulatorService;
use supply_sim_server::audit::AttemptAuditEvent;
use supply_sim_server::audit::DisruptionAuditEvent;
use supply_sim_server::audit::ManualAuditEvent;
use supply_sim_server::audit::ResetAuditEvent;

/// Source replaying queued answers; repeats the last one when drained.
pub struct ScriptedSource {
    /// Remaining answers.
    answers: Mutex<VecDeque<Result<RawAssessment, SourceError>>>,
    /// Number of calls received.
    calls: Mutex<usize>,
}

impl ScriptedSource {
    /// Creates a source over the given answers.
    pub fn new(answers: Vec<Result<RawAssessment, SourceError>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            calls: Mutex::new(0),
        }
    }

    /// Returns the number of calls received.
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl AssessmentSource for ScriptedSource {
    fn assess(&self, _request: &AssessmentRequest) -> Result<RawAssessment, SourceError> {
        *self.calls.lock().unwrap() += 1;
        let mut answers = self.answers.lock().unwrap();
        if answers.len() > 1 {
            answers.pop_front().unwrap()
        } else {
            answers.front().cloned().unwrap()
        }
    }
}

/// Audit sink collecting event labels in order.
#[derive(Default)]
pub struct RecordingAuditSink {
    /// Recorded event labels.
    events: Mutex<Vec<String>>,
}

impl RecordingAuditSink {
    /// Returns recorded event labels.
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    /// Records one label.
    fn push(&self, label: &str) {
        self.events.lock().unwrap().push(label.to_string());
    }
}

impl SimAuditSink for RecordingAuditSink {
    fn record_attempt(&self, event: &AttemptAuditEvent) {
        self.push(event.event);
    }

    fn record_disruption(&self, event: &DisruptionAuditEvent) {
        self.push(event.event);
    }

    fn record_manual(&self, event: &ManualAuditEvent) {
        self.push(event.event);
    }

    fn record_reset(&self, event: &ResetAuditEvent) {
        self.push(event.event);
    }
}

/// Valid answer for a tariff event on the laptop catalog.
pub fn tariff_answer() -> RawAssessment {
    RawAssessment::Json(json!([
        {"stage": "Raw Material Extraction", "affected": false, "choice": "Default", "reason": "unaffected"},
        {"stage": "Component Manufacturing", "affected": true, "choice": "India-based", "reason": "tariffs on Chinese cells"},
        {"stage": "Final Assembly", "affected": true, "choice": "Mexico (NAFTA)", "reason": "tariffs on Chinese assembly"}
    ]))
}

/// Answer naming an alternative the catalog does not offer.
pub fn unknown_choice_answer() -> RawAssessment {
    RawAssessment::Json(json!([
        {"stage": "Component Manufacturing", "affected": true, "choice": "India-based", "reason": "ok"},
        {"stage": "Final Assembly", "affected": true, "choice": "Nonexistent Option", "reason": "bad"}
    ]))
}

/// Default service limits for tests.
pub const fn limits() -> ServiceLimits {
    ServiceLimits {
        max_event_chars: 200,
        log_event_text: false,
    }
}

/// Builds a service over the laptop catalog with a three-attempt budget.
pub fn service(
    source: Arc<ScriptedSource>,
    audit: Arc<RecordingAuditSink>,
) -> Arc<SimulatorService> {
    let source: SharedAssessmentSource = source;
    let applier = DisruptionApplier::new(source, RetryPolicy::with_attempts(3));
    Arc::new(SimulatorService::new(Arc::new(Catalog::laptop()), applier, audit, limits()))
}
