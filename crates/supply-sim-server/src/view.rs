// crates/supply-sim-server/src/view.rs
// ============================================================================
// Module: Scenario Views
// Description: JSON views of the scenario table, summary, and charts.
// Purpose: Shape store state for the UI surface.
// Dependencies: supply-sim-core, serde
// ============================================================================

//! ## Overview
//! A [`ScenarioView`] is a snapshot of the store: every row, the summary
//! metrics, and two grouped-bar chart series (cost and CO₂) comparing the
//! default and after-event figures per stage.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use supply_sim_core::ScenarioRow;
use supply_sim_core::ScenarioStore;
use supply_sim_core::ScenarioSummary;
use supply_sim_core::StageId;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Default vs after-event values for one metric, indexed like `stages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    /// Metric label.
    pub metric: &'static str,
    /// Unit label.
    pub unit: &'static str,
    /// Stage labels along the x axis.
    pub stages: Vec<StageId>,
    /// Default values per stage.
    pub default: Vec<u32>,
    /// After-event values per stage.
    pub after_event: Vec<u32>,
}

/// Chart series for the scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioCharts {
    /// Cost comparison.
    pub cost: ChartSeries,
    /// CO₂ comparison.
    pub co2: ChartSeries,
}

/// Snapshot of the scenario for the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioView {
    /// Rows in catalog order.
    pub rows: Vec<ScenarioRow>,
    /// Totals and deltas.
    pub summary: ScenarioSummary,
    /// Default vs after-event charts.
    pub charts: ScenarioCharts,
}

// ============================================================================
// SECTION: Construction
// ============================================================================

impl ScenarioView {
    /// Builds a view from the current store.
    #[must_use]
    pub fn from_store(store: &ScenarioStore) -> Self {
        let rows = store.rows().to_vec();
        let charts = ScenarioCharts {
            cost: series("Cost", "USD", &rows, |row| (row.default_cost_usd, row.new_cost_usd)),
            co2: series("CO2", "kg", &rows, |row| (row.default_co2_kg, row.new_co2_kg)),
        };
        Self {
            summary: store.summary(),
            rows,
            charts,
        }
    }
}

/// Builds one chart series from the rows.
fn series(
    metric: &'static str,
    unit: &'static str,
    rows: &[ScenarioRow],
    values: impl Fn(&ScenarioRow) -> (u32, u32),
) -> ChartSeries {
    let (default, after_event) = rows.iter().map(values).unzip();
    ChartSeries {
        metric,
        unit,
        stages: rows.iter().map(|row| row.stage.clone()).collect(),
        default,
        after_event,
    }
}
