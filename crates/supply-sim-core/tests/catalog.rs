// crates/supply-sim-core/tests/catalog.rs
// ============================================================================
// Module: Catalog Validation Tests
// Description: Validate catalog construction limits and invariants.
// Purpose: Ensure duplicate, empty, and reserved names fail closed.
// Dependencies: supply-sim-core
// ============================================================================

//! ## Overview
//! Builds catalogs from stage specs and checks that malformed inputs are
//! rejected with the matching [`CatalogError`].

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

use supply_sim_core::AlternativeLabel;
use supply_sim_core::AlternativeSpec;
use supply_sim_core::Catalog;
use supply_sim_core::CatalogError;
use supply_sim_core::StageId;
use supply_sim_core::StageSpec;

fn stage(name: &str, alternatives: &[&str]) -> StageSpec {
    StageSpec {
        stage_id: StageId::new(name),
        default_choice: "Incumbent".to_string(),
        cost_usd: 10,
        co2_kg: 20,
        alternatives: alternatives
            .iter()
            .map(|label| AlternativeSpec {
                label: AlternativeLabel::new(*label),
                cost_usd: 1,
                co2_kg: 2,
                suppliers: format!("{label} Inc."),
            })
            .collect(),
    }
}

#[test]
fn builtin_catalog_passes_validation() {
    let laptop = Catalog::laptop();
    let rebuilt = Catalog::new(laptop.stages().to_vec()).unwrap();
    assert_eq!(rebuilt, laptop);
    assert_eq!(laptop.len(), 3);
    assert_eq!(laptop.position(&StageId::new("Final Assembly")), Some(2));
}

#[test]
fn empty_catalog_is_rejected() {
    assert_eq!(Catalog::new(Vec::new()).unwrap_err(), CatalogError::Empty);
}

#[test]
fn duplicate_stage_is_rejected() {
    let err = Catalog::new(vec![stage("Assembly", &[]), stage("Assembly", &[])]).unwrap_err();
    assert_eq!(err, CatalogError::DuplicateStage(StageId::new("Assembly")));
}

#[test]
fn duplicate_alternative_is_rejected() {
    let err = Catalog::new(vec![stage("Assembly", &["Mexico", "Mexico"])]).unwrap_err();
    assert!(matches!(err, CatalogError::DuplicateAlternative { .. }));
}

#[test]
fn reserved_default_label_is_rejected() {
    let err = Catalog::new(vec![stage("Assembly", &["Default"])]).unwrap_err();
    assert!(err.to_string().contains("reserved"));
}

#[test]
fn blank_names_are_rejected() {
    let err = Catalog::new(vec![stage("  ", &[])]).unwrap_err();
    assert!(matches!(err, CatalogError::Invalid(_)));
    let err = Catalog::new(vec![stage("Assembly", &[""])]).unwrap_err();
    assert!(matches!(err, CatalogError::Invalid(_)));
}

#[test]
fn stage_without_alternatives_is_allowed() {
    let catalog = Catalog::new(vec![stage("Packaging", &[])]).unwrap();
    assert!(catalog.stage(&StageId::new("Packaging")).unwrap().alternatives.is_empty());
}
