// crates/supply-sim-core/src/core/assessment.rs
// ============================================================================
// Module: Supply Sim Assessments
// Description: Per-stage judgments derived from a disruption event.
// Purpose: Define the wire shape of LLM answers and manual disruptions.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! An [`Assessment`] says whether a stage is affected by an event, which
//! option the stage should switch to, and why. The wire form is
//! `{"stage": .., "affected": .., "choice": .., "reason": ..}` where `choice`
//! is either the literal `Default` or an alternative label of that stage.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::AlternativeLabel;
use crate::core::identifiers::StageId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Wire label selecting a stage's default option.
pub const DEFAULT_CHOICE_LABEL: &str = "Default";

// ============================================================================
// SECTION: Choice
// ============================================================================

/// Option chosen for a stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Choice {
    /// Keep (or revert to) the stage default.
    Default,
    /// Switch to the named alternative.
    Alternative(AlternativeLabel),
}

impl Choice {
    /// Returns the wire label for the choice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Default => DEFAULT_CHOICE_LABEL,
            Self::Alternative(label) => label.as_str(),
        }
    }
}

impl From<String> for Choice {
    fn from(value: String) -> Self {
        if value == DEFAULT_CHOICE_LABEL {
            Self::Default
        } else {
            Self::Alternative(AlternativeLabel::new(value))
        }
    }
}

impl From<&str> for Choice {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Choice> for String {
    fn from(value: Choice) -> Self {
        match value {
            Choice::Default => DEFAULT_CHOICE_LABEL.to_string(),
            Choice::Alternative(label) => label.as_str().to_string(),
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Assessment
// ============================================================================

/// Judgment for a single stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    /// Stage the judgment applies to.
    pub stage: StageId,
    /// Whether the event affects this stage.
    #[serde(default)]
    pub affected: bool,
    /// Option to use for the stage.
    pub choice: Choice,
    /// Free-text justification.
    #[serde(default)]
    pub reason: String,
}

impl Assessment {
    /// Builds an assessment from its parts.
    #[must_use]
    pub fn new(
        stage: impl Into<StageId>,
        affected: bool,
        choice: impl Into<Choice>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            stage: stage.into(),
            affected,
            choice: choice.into(),
            reason: reason.into(),
        }
    }
}
