// crates/supply-sim-core/src/runtime/applier.rs
// ============================================================================
// Module: Supply Sim Disruption Applier
// Description: Event -> assessments -> scenario store state transition.
// Purpose: Run the bounded call-and-parse loop and fold the answer in.
// Dependencies: crate::{core, interfaces, runtime::{parse, prompt}}, serde, thiserror
// ============================================================================

//! ## Overview
//! [`DisruptionApplier::apply_event`] asks the [`AssessmentSource`] for an
//! answer up to [`RetryPolicy::max_attempts`] times, with no backoff. The
//! first answer that parses is applied to a copy of the caller's store; the
//! copy is returned only if every assessment applied cleanly. The caller's
//! store is therefore either fully updated (by swapping in the returned
//! store) or untouched.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::num::NonZeroU32;

use serde::Serialize;
use thiserror::Error;

use crate::core::Assessment;
use crate::core::Catalog;
use crate::core::ScenarioError;
use crate::core::ScenarioStore;
use crate::interfaces::AssessmentSource;
use crate::runtime::parse::parse_assessments;
use crate::runtime::prompt::build_request;

// ============================================================================
// SECTION: Retry Policy
// ============================================================================

/// Default number of call-and-parse attempts per event.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Fixed-count retry policy without backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first.
    max_attempts: NonZeroU32,
}

impl RetryPolicy {
    /// Creates a policy allowing `max_attempts` attempts.
    #[must_use]
    pub const fn new(max_attempts: NonZeroU32) -> Self {
        Self {
            max_attempts,
        }
    }

    /// Creates a policy from a raw count, treating zero as one attempt.
    #[must_use]
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self::new(NonZeroU32::new(max_attempts).unwrap_or(NonZeroU32::MIN))
    }

    /// Returns the maximum number of attempts.
    #[must_use]
    pub const fn max_attempts(self) -> u32 {
        self.max_attempts.get()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::with_attempts(DEFAULT_MAX_ATTEMPTS)
    }
}

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Failure stage for a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptFailureKind {
    /// The collaborator call failed.
    Source,
    /// The answer could not be parsed.
    Parse,
}

/// Record of one failed attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptFailure {
    /// One-based attempt number.
    pub attempt: u32,
    /// Where the attempt failed.
    pub kind: AttemptFailureKind,
    /// Error description.
    pub message: String,
}

/// Assessments obtained for an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessed {
    /// Parsed assessments in answer order.
    pub assessments: Vec<Assessment>,
    /// Attempts that failed before the successful one.
    pub failed_attempts: Vec<AttemptFailure>,
}

/// Successful event application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventOutcome {
    /// Store with every assessment applied.
    pub store: ScenarioStore,
    /// Assessments that were applied, in order.
    pub assessments: Vec<Assessment>,
    /// Attempts that failed before the successful one.
    pub failed_attempts: Vec<AttemptFailure>,
}

/// Event application errors. The caller's store is unchanged for every variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyEventError {
    /// The event text is blank.
    #[error("event text must be non-empty")]
    EmptyEvent,
    /// Every attempt failed; no assessment is available.
    #[error("no assessment available after {} attempts", .attempts.len())]
    Exhausted {
        /// Failure record for each attempt.
        attempts: Vec<AttemptFailure>,
    },
    /// An assessment referenced an unknown stage or choice.
    #[error("assessment {index} rejected: {error}")]
    Rejected {
        /// Zero-based index of the rejected assessment.
        index: usize,
        /// Lookup failure.
        error: ScenarioError,
        /// Assessments returned by the collaborator.
        assessments: Vec<Assessment>,
        /// Attempts that failed before the answer was obtained.
        failed_attempts: Vec<AttemptFailure>,
    },
}

// ============================================================================
// SECTION: Applier
// ============================================================================

/// Drives the call-parse-apply cycle for disruption events.
#[derive(Debug, Clone)]
pub struct DisruptionApplier<S> {
    /// Assessment collaborator.
    source: S,
    /// Retry policy for the call-and-parse loop.
    policy: RetryPolicy,
}

impl<S> DisruptionApplier<S>
where
    S: AssessmentSource,
{
    /// Creates an applier over the given collaborator.
    #[must_use]
    pub const fn new(source: S, policy: RetryPolicy) -> Self {
        Self {
            source,
            policy,
        }
    }

    /// Returns the retry policy.
    #[must_use]
    pub const fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Obtains assessments for an event without touching any store.
    ///
    /// # Errors
    ///
    /// Returns [`ApplyEventError::EmptyEvent`] for blank input and
    /// [`ApplyEventError::Exhausted`] when every attempt fails.
    pub fn assess_event(
        &self,
        catalog: &Catalog,
        event: &str,
    ) -> Result<Assessed, ApplyEventError> {
        if event.trim().is_empty() {
            return Err(ApplyEventError::EmptyEvent);
        }
        let request = build_request(catalog, event);
        let mut failed_attempts = Vec::new();
        for attempt in 1..=self.policy.max_attempts() {
            let raw = match self.source.assess(&request) {
                Ok(raw) => raw,
                Err(err) => {
                    failed_attempts.push(AttemptFailure {
                        attempt,
                        kind: AttemptFailureKind::Source,
                        message: err.to_string(),
                    });
                    continue;
                }
            };
            match parse_assessments(&raw) {
                Ok(assessments) => {
                    return Ok(Assessed {
                        assessments,
                        failed_attempts,
                    });
                }
                Err(err) => failed_attempts.push(AttemptFailure {
                    attempt,
                    kind: AttemptFailureKind::Parse,
                    message: err.to_string(),
                }),
            }
        }
        Err(ApplyEventError::Exhausted {
            attempts: failed_attempts,
        })
    }

    /// Assesses an event and applies the result to a copy of `store`.
    ///
    /// # Errors
    ///
    /// Returns [`ApplyEventError`] when no assessment is available or an
    /// assessment references an unknown stage or choice.
    pub fn apply_event(
        &self,
        store: &ScenarioStore,
        event: &str,
    ) -> Result<EventOutcome, ApplyEventError> {
        let Assessed {
            assessments,
            failed_attempts,
        } = self.assess_event(store.catalog(), event)?;
        let mut next = store.clone();
        if let Err((index, error)) = next.apply_all(&assessments) {
            return Err(ApplyEventError::Rejected {
                index,
                error,
                assessments,
                failed_attempts,
            });
        }
        Ok(EventOutcome {
            store: next,
            assessments,
            failed_attempts,
        })
    }
}
