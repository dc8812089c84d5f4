// crates/supply-sim-core/tests/scenario_store.rs
// ============================================================================
// Module: Scenario Store Tests
// Description: Validate assessment application against the laptop catalog.
// Purpose: Ensure default/alternative semantics, lookup failures, and totals.
// Dependencies: supply-sim-core
// ============================================================================

//! ## Overview
//! Exercises [`ScenarioStore::apply`] and friends:
//! - `Default` keeps the default figures and records the reason
//! - Alternatives copy the alternative's figures and supplier description
//! - Unknown stages and choices fail without mutating the store
//! - Summary totals and deltas

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use supply_sim_core::AlternativeLabel;
use supply_sim_core::Assessment;
use supply_sim_core::Catalog;
use supply_sim_core::Choice;
use supply_sim_core::ScenarioError;
use supply_sim_core::ScenarioStore;
use supply_sim_core::StageId;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn laptop_store() -> ScenarioStore {
    ScenarioStore::new(Arc::new(Catalog::laptop()))
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

#[test]
fn default_totals_match_catalog() {
    let store = laptop_store();
    let summary = store.summary();
    assert_eq!(summary.default_cost_usd, 360);
    assert_eq!(summary.default_co2_kg, 430);
    assert_eq!(summary.new_cost_usd, 360);
    assert_eq!(summary.new_co2_kg, 430);
    assert_eq!(summary.cost_delta_usd, 0);
    assert_eq!(summary.co2_delta_kg, 0);
}

#[test]
fn rows_follow_catalog_order_and_start_at_defaults() {
    let store = laptop_store();
    let names: Vec<&str> = store.rows().iter().map(|row| row.stage.as_str()).collect();
    assert_eq!(names, ["Raw Material Extraction", "Component Manufacturing", "Final Assembly"]);
    for row in store.rows() {
        assert_eq!(row.new_choice, row.default_choice);
        assert_eq!(row.new_cost_usd, row.default_cost_usd);
        assert_eq!(row.new_co2_kg, row.default_co2_kg);
        assert_eq!(row.new_option, Choice::Default);
        assert!(row.reason.is_none());
    }
}

// ============================================================================
// SECTION: Apply
// ============================================================================

#[test]
fn default_choice_keeps_figures_and_records_reason() {
    let catalog = Catalog::laptop();
    for stage in catalog.stages() {
        let mut store = laptop_store();
        let before = store.row(&stage.stage_id).unwrap().clone();
        let row = store
            .apply(&Assessment::new(stage.stage_id.clone(), false, "Default", "no impact"))
            .unwrap();
        assert_eq!(row.new_cost_usd, before.new_cost_usd);
        assert_eq!(row.new_co2_kg, before.new_co2_kg);
        assert_eq!(row.new_choice, before.new_choice);
        assert_eq!(row.reason.as_deref(), Some("no impact"));
    }
}

#[test]
fn every_alternative_sets_exact_figures() {
    let catalog = Catalog::laptop();
    for stage in catalog.stages() {
        for alternative in &stage.alternatives {
            let mut store = laptop_store();
            let row = store
                .apply(&Assessment::new(
                    stage.stage_id.clone(),
                    true,
                    Choice::Alternative(alternative.label.clone()),
                    "switch",
                ))
                .unwrap();
            assert_eq!(row.new_cost_usd, alternative.cost_usd);
            assert_eq!(row.new_co2_kg, alternative.co2_kg);
            assert_eq!(row.new_choice, alternative.suppliers);
            assert_eq!(row.default_cost_usd, stage.cost_usd);
            assert_eq!(row.default_co2_kg, stage.co2_kg);
            assert!(row.affected);
        }
    }
}

#[test]
fn recycled_materials_scenario() {
    let mut store = laptop_store();
    let row = store
        .apply(&Assessment::new(
            "Raw Material Extraction",
            true,
            "Recycled materials",
            "tariffs on mined ore",
        ))
        .unwrap();
    assert_eq!(row.new_cost_usd, 40);
    assert_eq!(row.new_co2_kg, 30);
    assert_eq!(row.new_choice, "Redwood Materials (US)");
    let summary = store.summary();
    assert_eq!(summary.new_cost_usd, 375);
    assert_eq!(summary.new_co2_kg, 400);
    assert_eq!(summary.cost_delta_usd, 15);
    assert_eq!(summary.co2_delta_kg, -30);
}

#[test]
fn default_after_alternative_reverts_to_defaults() {
    let mut store = laptop_store();
    store.apply(&Assessment::new("Final Assembly", true, "Mexico (NAFTA)", "tariffs")).unwrap();
    let row =
        store.apply(&Assessment::new("Final Assembly", false, "Default", "tariffs lifted")).unwrap();
    assert_eq!(row.new_cost_usd, 300);
    assert_eq!(row.new_co2_kg, 250);
    assert_eq!(row.new_choice, "Foxconn (China)");
    assert_eq!(row.reason.as_deref(), Some("tariffs lifted"));
    assert!(!row.affected);
}

#[test]
fn unknown_choice_fails_and_leaves_row_unchanged() {
    let mut store = laptop_store();
    let before = store.clone();
    let err = store
        .apply(&Assessment::new("Final Assembly", true, "Nonexistent Option", "?"))
        .unwrap_err();
    assert_eq!(
        err,
        ScenarioError::UnknownChoice {
            stage: StageId::new("Final Assembly"),
            choice: AlternativeLabel::new("Nonexistent Option"),
        }
    );
    assert_eq!(store, before);
}

#[test]
fn alternative_of_another_stage_is_rejected() {
    let mut store = laptop_store();
    let err = store
        .apply(&Assessment::new("Final Assembly", true, "Recycled materials", "wrong stage"))
        .unwrap_err();
    assert!(matches!(err, ScenarioError::UnknownChoice { .. }));
}

#[test]
fn unknown_stage_fails() {
    let mut store = laptop_store();
    let err =
        store.apply(&Assessment::new("Packaging", true, "Default", "not a stage")).unwrap_err();
    assert_eq!(err, ScenarioError::UnknownStage(StageId::new("Packaging")));
}

#[test]
fn last_assessment_per_stage_wins() {
    let mut store = laptop_store();
    store
        .apply_all(&[
            Assessment::new("Component Manufacturing", true, "US chips (Intel)", "first"),
            Assessment::new("Final Assembly", true, "Vietnam (renewables)", "other stage"),
            Assessment::new("Component Manufacturing", true, "India-based", "second"),
        ])
        .unwrap();
    let row = store.row(&StageId::new("Component Manufacturing")).unwrap();
    assert_eq!(row.new_cost_usd, 280);
    assert_eq!(row.new_co2_kg, 270);
    assert_eq!(row.reason.as_deref(), Some("second"));
    let assembly = store.row(&StageId::new("Final Assembly")).unwrap();
    assert_eq!(assembly.new_cost_usd, 35);
}

#[test]
fn apply_all_is_all_or_nothing() {
    let mut store = laptop_store();
    let before = store.clone();
    let err = store
        .apply_all(&[
            Assessment::new("Raw Material Extraction", true, "Recycled materials", "ok"),
            Assessment::new("Final Assembly", true, "Nonexistent Option", "bad"),
        ])
        .unwrap_err();
    assert_eq!(err.0, 1);
    assert_eq!(store, before);
}

#[test]
fn reset_restores_defaults() {
    let mut store = laptop_store();
    store.apply(&Assessment::new("Final Assembly", true, "Mexico (NAFTA)", "tariffs")).unwrap();
    store.reset();
    assert_eq!(store, laptop_store());
}
