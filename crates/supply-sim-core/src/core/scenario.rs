// crates/supply-sim-core/src/core/scenario.rs
// ============================================================================
// Module: Supply Sim Scenario Store
// Description: In-memory scenario rows with default and new-value columns.
// Purpose: Fold assessments into per-stage rows and report totals.
// Dependencies: crate::core::{assessment, catalog}, serde, thiserror
// ============================================================================

//! ## Overview
//! The [`ScenarioStore`] keeps one [`ScenarioRow`] per catalog stage. Default
//! columns never change; the new-value columns start equal to the defaults and
//! are overwritten by [`ScenarioStore::apply`]. The store is a plain value:
//! callers clone it to stage changes and swap it in once they succeed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::core::assessment::Assessment;
use crate::core::assessment::Choice;
use crate::core::catalog::Catalog;
use crate::core::catalog::StageSpec;
use crate::core::identifiers::AlternativeLabel;
use crate::core::identifiers::StageId;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Scenario row for one stage.
///
/// # Invariants
/// - `default_*` fields match the catalog entry for `stage`.
/// - `new_*` fields describe exactly one option: the default or a single alternative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioRow {
    /// Stage identifier.
    pub stage: StageId,
    /// Default supplier choice.
    pub default_choice: String,
    /// Default cost in USD.
    pub default_cost_usd: u32,
    /// Default CO₂ footprint in kg.
    pub default_co2_kg: u32,
    /// Supplier choice after the last applied assessment.
    pub new_choice: String,
    /// Option label after the last applied assessment.
    pub new_option: Choice,
    /// Cost in USD after the last applied assessment.
    pub new_cost_usd: u32,
    /// CO₂ footprint in kg after the last applied assessment.
    pub new_co2_kg: u32,
    /// Whether the last assessment marked the stage as affected.
    pub affected: bool,
    /// Reason recorded by the last assessment.
    pub reason: Option<String>,
}

impl ScenarioRow {
    /// Builds a row holding the stage defaults.
    fn from_stage(stage: &StageSpec) -> Self {
        Self {
            stage: stage.stage_id.clone(),
            default_choice: stage.default_choice.clone(),
            default_cost_usd: stage.cost_usd,
            default_co2_kg: stage.co2_kg,
            new_choice: stage.default_choice.clone(),
            new_option: Choice::Default,
            new_cost_usd: stage.cost_usd,
            new_co2_kg: stage.co2_kg,
            affected: false,
            reason: None,
        }
    }

    /// Returns the cost change in USD for this row.
    #[must_use]
    pub fn cost_delta_usd(&self) -> i64 {
        i64::from(self.new_cost_usd) - i64::from(self.default_cost_usd)
    }

    /// Returns the CO₂ change in kg for this row.
    #[must_use]
    pub fn co2_delta_kg(&self) -> i64 {
        i64::from(self.new_co2_kg) - i64::from(self.default_co2_kg)
    }
}

/// Aggregate metrics across all rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScenarioSummary {
    /// Sum of default costs in USD.
    pub default_cost_usd: u64,
    /// Sum of default CO₂ in kg.
    pub default_co2_kg: u64,
    /// Sum of new costs in USD.
    pub new_cost_usd: u64,
    /// Sum of new CO₂ in kg.
    pub new_co2_kg: u64,
    /// New minus default cost in USD.
    pub cost_delta_usd: i64,
    /// New minus default CO₂ in kg.
    pub co2_delta_kg: i64,
}

/// Errors raised when an assessment cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScenarioError {
    /// The assessment names a stage outside the catalog.
    #[error("unknown stage: {0}")]
    UnknownStage(StageId),
    /// The assessment names an alternative the stage does not offer.
    #[error("unknown choice {choice} for stage {stage}")]
    UnknownChoice {
        /// Stage the assessment targeted.
        stage: StageId,
        /// Alternative label that was not found.
        choice: AlternativeLabel,
    },
}

// ============================================================================
// SECTION: Scenario Store
// ============================================================================

/// In-memory scenario table keyed by stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioStore {
    /// Catalog the rows were built from.
    catalog: Arc<Catalog>,
    /// Rows in catalog order; positions come from [`Catalog::position`].
    rows: Vec<ScenarioRow>,
}

impl ScenarioStore {
    /// Creates a store with every row at its defaults.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let rows = catalog.stages().iter().map(ScenarioRow::from_stage).collect();
        Self {
            catalog,
            rows,
        }
    }

    /// Returns the catalog backing this store.
    #[must_use]
    pub const fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Returns all rows in catalog order.
    #[must_use]
    pub fn rows(&self) -> &[ScenarioRow] {
        &self.rows
    }

    /// Returns the row for a stage.
    #[must_use]
    pub fn row(&self, stage: &StageId) -> Option<&ScenarioRow> {
        self.catalog.position(stage).and_then(|position| self.rows.get(position))
    }

    /// Applies an assessment to its stage row and returns the updated row.
    ///
    /// `Default` restores the stage defaults; an alternative overwrites the
    /// new-value columns with the alternative's figures and suppliers. The
    /// reason and affected flag are always recorded.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] when the stage or alternative is unknown. The
    /// store is left untouched in that case.
    pub fn apply(&mut self, assessment: &Assessment) -> Result<&ScenarioRow, ScenarioError> {
        let position = self
            .catalog
            .position(&assessment.stage)
            .ok_or_else(|| ScenarioError::UnknownStage(assessment.stage.clone()))?;
        let stage = self
            .catalog
            .stages()
            .get(position)
            .ok_or_else(|| ScenarioError::UnknownStage(assessment.stage.clone()))?;
        let (new_choice, new_cost_usd, new_co2_kg) = match &assessment.choice {
            Choice::Default => (stage.default_choice.clone(), stage.cost_usd, stage.co2_kg),
            Choice::Alternative(label) => {
                let alternative =
                    stage.alternative(label).ok_or_else(|| ScenarioError::UnknownChoice {
                        stage: stage.stage_id.clone(),
                        choice: label.clone(),
                    })?;
                (alternative.suppliers.clone(), alternative.cost_usd, alternative.co2_kg)
            }
        };
        let row = self
            .rows
            .get_mut(position)
            .ok_or_else(|| ScenarioError::UnknownStage(assessment.stage.clone()))?;
        row.new_choice = new_choice;
        row.new_option = assessment.choice.clone();
        row.new_cost_usd = new_cost_usd;
        row.new_co2_kg = new_co2_kg;
        row.affected = assessment.affected;
        row.reason = Some(assessment.reason.clone());
        Ok(row)
    }

    /// Applies assessments in order on a copy, committing only if all succeed.
    ///
    /// # Errors
    ///
    /// Returns the index and error of the first assessment that fails; the
    /// store is left untouched in that case.
    pub fn apply_all(&mut self, assessments: &[Assessment]) -> Result<(), (usize, ScenarioError)> {
        let mut staged = self.clone();
        for (index, assessment) in assessments.iter().enumerate() {
            staged.apply(assessment).map_err(|err| (index, err))?;
        }
        *self = staged;
        Ok(())
    }

    /// Restores every row to its defaults.
    pub fn reset(&mut self) {
        self.rows = self.catalog.stages().iter().map(ScenarioRow::from_stage).collect();
    }

    /// Computes aggregate totals and deltas.
    #[must_use]
    pub fn summary(&self) -> ScenarioSummary {
        let mut summary = ScenarioSummary {
            default_cost_usd: 0,
            default_co2_kg: 0,
            new_cost_usd: 0,
            new_co2_kg: 0,
            cost_delta_usd: 0,
            co2_delta_kg: 0,
        };
        for row in &self.rows {
            summary.default_cost_usd += u64::from(row.default_cost_usd);
            summary.default_co2_kg += u64::from(row.default_co2_kg);
            summary.new_cost_usd += u64::from(row.new_cost_usd);
            summary.new_co2_kg += u64::from(row.new_co2_kg);
            summary.cost_delta_usd += row.cost_delta_usd();
            summary.co2_delta_kg += row.co2_delta_kg();
        }
        summary
    }
}
