// crates/supply-sim-core/src/core/catalog.rs
// ============================================================================
// Module: Supply Sim Catalog
// Description: Stage defaults and per-stage alternative supplier options.
// Purpose: Provide the static lookup table every scenario is built from.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A [`Catalog`] is the closed set of supply chain stages. Each stage carries
//! its default supplier choice with cost and CO₂ figures plus zero or more
//! alternatives. Catalogs are validated once at construction; afterwards the
//! stage set is immutable and stage lookups go through a direct index.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::assessment::DEFAULT_CHOICE_LABEL;
use crate::core::identifiers::AlternativeLabel;
use crate::core::identifiers::StageId;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum number of stages a catalog may declare.
pub const MAX_STAGES: usize = 32;
/// Maximum number of alternatives per stage.
pub const MAX_ALTERNATIVES_PER_STAGE: usize = 16;
/// Maximum length for stage names, labels, and supplier descriptions.
pub const MAX_LABEL_LENGTH: usize = 256;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Alternative supplier option for a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternativeSpec {
    /// Option label used by assessments.
    pub label: AlternativeLabel,
    /// Cost in USD when this option is chosen.
    pub cost_usd: u32,
    /// CO₂ footprint in kg when this option is chosen.
    pub co2_kg: u32,
    /// Supplier description shown as the new choice.
    pub suppliers: String,
}

/// Supply chain stage with its default choice and alternatives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSpec {
    /// Stage identifier.
    pub stage_id: StageId,
    /// Default supplier choice description.
    pub default_choice: String,
    /// Default cost in USD.
    pub cost_usd: u32,
    /// Default CO₂ footprint in kg.
    pub co2_kg: u32,
    /// Alternatives available for this stage.
    #[serde(default)]
    pub alternatives: Vec<AlternativeSpec>,
}

impl StageSpec {
    /// Returns the alternative with the given label, if declared.
    #[must_use]
    pub fn alternative(&self, label: &AlternativeLabel) -> Option<&AlternativeSpec> {
        self.alternatives.iter().find(|alternative| &alternative.label == label)
    }
}

/// Validated, immutable stage catalog.
///
/// # Invariants
/// - Stage identifiers are unique and non-empty.
/// - Alternative labels are unique within a stage and never equal `Default`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    /// Stages in display order.
    stages: Vec<StageSpec>,
    /// Stage identifier to position in `stages`.
    #[serde(skip)]
    index: BTreeMap<StageId, usize>,
}

/// Serialized catalog document (`[[stages]]` tables).
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogDocument {
    /// Stage declarations in display order.
    pub stages: Vec<StageSpec>,
}

/// Catalog validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The catalog declares no stages.
    #[error("catalog must declare at least one stage")]
    Empty,
    /// Too many stages or alternatives.
    #[error("catalog exceeds limit: {0}")]
    TooLarge(String),
    /// A stage identifier appears more than once.
    #[error("duplicate stage: {0}")]
    DuplicateStage(StageId),
    /// An alternative label appears more than once within a stage.
    #[error("duplicate alternative {label} for stage {stage}")]
    DuplicateAlternative {
        /// Stage declaring the duplicate.
        stage: StageId,
        /// Duplicated label.
        label: AlternativeLabel,
    },
    /// A name or label is empty, too long, or reserved.
    #[error("invalid catalog entry: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

impl Catalog {
    /// Builds a catalog from stage declarations.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when stages are empty, duplicated, or malformed.
    pub fn new(stages: Vec<StageSpec>) -> Result<Self, CatalogError> {
        if stages.is_empty() {
            return Err(CatalogError::Empty);
        }
        if stages.len() > MAX_STAGES {
            return Err(CatalogError::TooLarge(format!(
                "{} stages (max {MAX_STAGES})",
                stages.len()
            )));
        }
        let mut index = BTreeMap::new();
        for (position, stage) in stages.iter().enumerate() {
            validate_stage(stage)?;
            if index.insert(stage.stage_id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateStage(stage.stage_id.clone()));
            }
        }
        Ok(Self {
            stages,
            index,
        })
    }

    /// Returns the built-in laptop supply chain catalog.
    #[must_use]
    pub fn laptop() -> Self {
        let stages = laptop_stages();
        let index = stages
            .iter()
            .enumerate()
            .map(|(position, stage)| (stage.stage_id.clone(), position))
            .collect();
        Self {
            stages,
            index,
        }
    }

    /// Returns all stages in display order.
    #[must_use]
    pub fn stages(&self) -> &[StageSpec] {
        &self.stages
    }

    /// Returns the display position of a stage.
    #[must_use]
    pub fn position(&self, stage_id: &StageId) -> Option<usize> {
        self.index.get(stage_id).copied()
    }

    /// Returns the stage with the given identifier.
    #[must_use]
    pub fn stage(&self, stage_id: &StageId) -> Option<&StageSpec> {
        self.position(stage_id).and_then(|position| self.stages.get(position))
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns true when the catalog has no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl TryFrom<CatalogDocument> for Catalog {
    type Error = CatalogError;

    fn try_from(document: CatalogDocument) -> Result<Self, Self::Error> {
        Self::new(document.stages)
    }
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates a single stage declaration.
fn validate_stage(stage: &StageSpec) -> Result<(), CatalogError> {
    validate_label("stage_id", stage.stage_id.as_str())?;
    validate_label("default_choice", &stage.default_choice)?;
    if stage.alternatives.len() > MAX_ALTERNATIVES_PER_STAGE {
        return Err(CatalogError::TooLarge(format!(
            "stage {} declares {} alternatives (max {MAX_ALTERNATIVES_PER_STAGE})",
            stage.stage_id,
            stage.alternatives.len()
        )));
    }
    let mut seen = BTreeSet::new();
    for alternative in &stage.alternatives {
        validate_label("alternative label", alternative.label.as_str())?;
        validate_label("suppliers", &alternative.suppliers)?;
        if alternative.label.as_str() == DEFAULT_CHOICE_LABEL {
            return Err(CatalogError::Invalid(format!(
                "stage {} uses reserved alternative label {DEFAULT_CHOICE_LABEL}",
                stage.stage_id
            )));
        }
        if !seen.insert(&alternative.label) {
            return Err(CatalogError::DuplicateAlternative {
                stage: stage.stage_id.clone(),
                label: alternative.label.clone(),
            });
        }
    }
    Ok(())
}

/// Validates that a label is non-empty and bounded.
fn validate_label(field: &str, value: &str) -> Result<(), CatalogError> {
    if value.trim().is_empty() {
        return Err(CatalogError::Invalid(format!("{field} must be non-empty")));
    }
    if value.len() > MAX_LABEL_LENGTH {
        return Err(CatalogError::Invalid(format!("{field} exceeds {MAX_LABEL_LENGTH} bytes")));
    }
    Ok(())
}

// ============================================================================
// SECTION: Built-In Data
// ============================================================================

/// Builds an alternative declaration.
fn alternative(label: &str, cost_usd: u32, co2_kg: u32, suppliers: &str) -> AlternativeSpec {
    AlternativeSpec {
        label: AlternativeLabel::new(label),
        cost_usd,
        co2_kg,
        suppliers: suppliers.to_string(),
    }
}

/// Stage declarations for the laptop scenario.
fn laptop_stages() -> Vec<StageSpec> {
    vec![
        StageSpec {
            stage_id: StageId::new("Raw Material Extraction"),
            default_choice: "Global mix (Rio Tinto, Glencore, Exxon)".to_string(),
            cost_usd: 25,
            co2_kg: 60,
            alternatives: vec![
                alternative("Conflict-free minerals", 35, 55, "Pact-certified (Rwanda, Canada)"),
                alternative("Recycled materials", 40, 30, "Redwood Materials (US)"),
            ],
        },
        StageSpec {
            stage_id: StageId::new("Component Manufacturing"),
            default_choice: "TSMC (Taiwan), CATL (China), Samsung (Korea)".to_string(),
            cost_usd: 35,
            co2_kg: 120,
            alternatives: vec![
                alternative("US chips (Intel)", 400, 200, "Intel (US), Tesla (batteries)"),
                alternative("India-based", 280, 270, "Tata Electronics, BYD India"),
            ],
        },
        StageSpec {
            stage_id: StageId::new("Final Assembly"),
            default_choice: "Foxconn (China)".to_string(),
            cost_usd: 300,
            co2_kg: 250,
            alternatives: vec![
                alternative("Vietnam (renewables)", 35, 10, "Luxshare (Vietnam)"),
                alternative("Mexico (NAFTA)", 40, 18, "Flex (Mexico)"),
            ],
        },
    ]
}
