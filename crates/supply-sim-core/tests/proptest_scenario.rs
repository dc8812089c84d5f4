// crates/supply-sim-core/tests/proptest_scenario.rs
// ============================================================================
// Module: Scenario Store Property Tests
// Description: Property tests for assessment ordering semantics.
// Purpose: Ensure the last assessment per stage wins and stages stay independent.
// Dependencies: supply-sim-core, proptest
// ============================================================================

//! ## Overview
//! Generates random sequences of valid assessments over the laptop catalog and
//! checks that each row equals the result of applying only that stage's final
//! assessment to a fresh store.

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

use std::sync::Arc;

use proptest::prelude::*;
use supply_sim_core::Assessment;
use supply_sim_core::Catalog;
use supply_sim_core::Choice;
use supply_sim_core::ScenarioStore;

/// Every valid (stage, choice) pair in the laptop catalog.
fn valid_pairs() -> Vec<(String, Choice)> {
    let catalog = Catalog::laptop();
    let mut pairs = Vec::new();
    for stage in catalog.stages() {
        pairs.push((stage.stage_id.as_str().to_string(), Choice::Default));
        for alternative in &stage.alternatives {
            pairs.push((
                stage.stage_id.as_str().to_string(),
                Choice::Alternative(alternative.label.clone()),
            ));
        }
    }
    pairs
}

fn assessment_strategy() -> impl Strategy<Value = Assessment> {
    let pairs = valid_pairs();
    (0..pairs.len(), any::<bool>(), "[a-z ]{0,12}").prop_map(move |(index, affected, reason)| {
        let (stage, choice) = pairs[index].clone();
        Assessment::new(stage, affected, choice, reason)
    })
}

proptest! {
    #[test]
    fn last_assessment_per_stage_wins(assessments in prop::collection::vec(assessment_strategy(), 0..24)) {
        let catalog = Arc::new(Catalog::laptop());
        let mut store = ScenarioStore::new(Arc::clone(&catalog));
        store.apply_all(&assessments).unwrap();

        for stage in catalog.stages() {
            let mut expected = ScenarioStore::new(Arc::clone(&catalog));
            if let Some(last) = assessments.iter().rev().find(|a| a.stage == stage.stage_id) {
                expected.apply(last).unwrap();
            }
            prop_assert_eq!(store.row(&stage.stage_id), expected.row(&stage.stage_id));
        }
    }

    #[test]
    fn summary_deltas_equal_new_minus_default(assessments in prop::collection::vec(assessment_strategy(), 0..12)) {
        let mut store = ScenarioStore::new(Arc::new(Catalog::laptop()));
        store.apply_all(&assessments).unwrap();
        let summary = store.summary();
        let new_cost = i64::try_from(summary.new_cost_usd).unwrap();
        let default_cost = i64::try_from(summary.default_cost_usd).unwrap();
        prop_assert_eq!(summary.cost_delta_usd, new_cost - default_cost);
        prop_assert_eq!(summary.default_cost_usd, 360);
        prop_assert_eq!(summary.default_co2_kg, 430);
    }
}
