// crates/supply-sim-server/src/audit.rs
// ============================================================================
// Module: Scenario Audit Logging
// Description: Structured audit events for scenario changes.
// Purpose: Emit JSON-lines audit records without hard logging dependencies.
// Dependencies: serde, serde_json, sha2
// ============================================================================

//! ## Overview
//! Every disruption event, failed LLM attempt, manual override, and reset is
//! recorded as one JSON line. Event text is untrusted free text and is logged
//! as a SHA-256 digest unless raw logging is explicitly enabled.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use supply_sim_core::AttemptFailure;
use supply_sim_core::AttemptFailureKind;
use supply_sim_core::Choice;
use supply_sim_core::StageId;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Disruption event text as it appears in audit records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventFingerprint {
    /// Hex SHA-256 digest of the event text.
    pub sha256: String,
    /// Event length in characters.
    pub chars: usize,
    /// Raw event text (explicit opt-in only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl EventFingerprint {
    /// Fingerprints event text, keeping the raw text only when requested.
    #[must_use]
    pub fn new(event: &str, keep_text: bool) -> Self {
        let digest = Sha256::digest(event.as_bytes());
        let mut sha256 = String::with_capacity(digest.len() * 2);
        for byte in digest {
            let _ = write!(sha256, "{byte:02x}");
        }
        Self {
            sha256,
            chars: event.chars().count(),
            text: keep_text.then(|| event.to_string()),
        }
    }
}

/// Failed LLM attempt audit payload.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Disruption event fingerprint.
    pub disruption: EventFingerprint,
    /// One-based attempt number.
    pub attempt: u32,
    /// Where the attempt failed.
    pub kind: AttemptFailureKind,
    /// Error description.
    pub message: String,
}

/// Disruption event outcome audit payload.
#[derive(Debug, Clone, Serialize)]
pub struct DisruptionAuditEvent {
    /// Event identifier (`event_applied` or `event_rejected`).
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Disruption event fingerprint.
    pub disruption: EventFingerprint,
    /// Total attempts used.
    pub attempts: u32,
    /// Stages marked affected by the assessment.
    pub affected_stages: Vec<StageId>,
    /// Cost delta after the event (applied only).
    pub cost_delta_usd: Option<i64>,
    /// CO₂ delta after the event (applied only).
    pub co2_delta_kg: Option<i64>,
    /// Rejection reason (rejected only).
    pub error: Option<String>,
}

/// Manual disruption audit payload.
#[derive(Debug, Clone, Serialize)]
pub struct ManualAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Target stage.
    pub stage: StageId,
    /// Requested choice.
    pub choice: Choice,
    /// Whether the override was applied.
    pub applied: bool,
    /// Rejection reason when not applied.
    pub error: Option<String>,
}

/// Scenario reset audit payload.
#[derive(Debug, Clone, Serialize)]
pub struct ResetAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
}

/// Inputs required to construct a disruption audit event.
pub struct DisruptionAuditEventParams {
    /// Disruption event fingerprint.
    pub disruption: EventFingerprint,
    /// Total attempts used.
    pub attempts: u32,
    /// Stages marked affected by the assessment.
    pub affected_stages: Vec<StageId>,
    /// Cost and CO₂ deltas when applied.
    pub deltas: Option<(i64, i64)>,
    /// Rejection reason when rejected.
    pub error: Option<String>,
}

/// Milliseconds since the Unix epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

impl AttemptAuditEvent {
    /// Creates an attempt audit event from a recorded failure.
    #[must_use]
    pub fn new(disruption: EventFingerprint, failure: &AttemptFailure) -> Self {
        Self {
            event: "llm_attempt_failed",
            timestamp_ms: now_ms(),
            disruption,
            attempt: failure.attempt,
            kind: failure.kind,
            message: failure.message.clone(),
        }
    }
}

impl DisruptionAuditEvent {
    /// Creates a disruption outcome audit event.
    #[must_use]
    pub fn new(params: DisruptionAuditEventParams) -> Self {
        let event = if params.error.is_some() { "event_rejected" } else { "event_applied" };
        Self {
            event,
            timestamp_ms: now_ms(),
            disruption: params.disruption,
            attempts: params.attempts,
            affected_stages: params.affected_stages,
            cost_delta_usd: params.deltas.map(|(cost, _)| cost),
            co2_delta_kg: params.deltas.map(|(_, co2)| co2),
            error: params.error,
        }
    }
}

impl ManualAuditEvent {
    /// Creates a manual disruption audit event.
    #[must_use]
    pub fn new(stage: StageId, choice: Choice, error: Option<String>) -> Self {
        Self {
            event: "manual_disruption",
            timestamp_ms: now_ms(),
            stage,
            choice,
            applied: error.is_none(),
            error,
        }
    }
}

impl ResetAuditEvent {
    /// Creates a reset audit event.
    #[must_use]
    pub fn new() -> Self {
        Self {
            event: "scenario_reset",
            timestamp_ms: now_ms(),
        }
    }
}

impl Default for ResetAuditEvent {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for scenario events.
pub trait SimAuditSink: Send + Sync {
    /// Record a failed LLM attempt.
    fn record_attempt(&self, event: &AttemptAuditEvent);

    /// Record a disruption event outcome.
    fn record_disruption(&self, event: &DisruptionAuditEvent);

    /// Record a manual disruption.
    fn record_manual(&self, _event: &ManualAuditEvent) {}

    /// Record a scenario reset.
    fn record_reset(&self, _event: &ResetAuditEvent) {}
}

/// Writes one serialized event as a JSON line.
fn write_line(writer: &mut impl Write, event: &impl Serialize) {
    if let Ok(payload) = serde_json::to_string(event) {
        let _ = writeln!(writer, "{payload}");
        let _ = writer.flush();
    }
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl SimAuditSink for StderrAuditSink {
    fn record_attempt(&self, event: &AttemptAuditEvent) {
        write_line(&mut io::stderr(), event);
    }

    fn record_disruption(&self, event: &DisruptionAuditEvent) {
        write_line(&mut io::stderr(), event);
    }

    fn record_manual(&self, event: &ManualAuditEvent) {
        write_line(&mut io::stderr(), event);
    }

    fn record_reset(&self, event: &ResetAuditEvent) {
        write_line(&mut io::stderr(), event);
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one event under the file lock.
    fn append(&self, event: &impl Serialize) {
        if let Ok(mut file) = self.file.lock() {
            write_line(&mut *file, event);
        }
    }
}

impl SimAuditSink for FileAuditSink {
    fn record_attempt(&self, event: &AttemptAuditEvent) {
        self.append(event);
    }

    fn record_disruption(&self, event: &DisruptionAuditEvent) {
        self.append(event);
    }

    fn record_manual(&self, event: &ManualAuditEvent) {
        self.append(event);
    }

    fn record_reset(&self, event: &ResetAuditEvent) {
        self.append(event);
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl SimAuditSink for NoopAuditSink {
    fn record_attempt(&self, _event: &AttemptAuditEvent) {}

    fn record_disruption(&self, _event: &DisruptionAuditEvent) {}
}

// ============================================================================
// SECTION: Tests
// ============================================================================
