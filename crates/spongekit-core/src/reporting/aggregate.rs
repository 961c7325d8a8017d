use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::costing::lifecycle::{self, CostBreakdown, VolumeBasis};
use crate::error::SpongeKitError;
use crate::hydrology::storm::StormEvent;
use crate::measures::measure::{MeasureType, SudsMeasureSpec};
use crate::scenarios::sweep::{run_sweep, Building, SweepPoint};
use crate::types::{Area, Coefficient, Money, Volume};
use crate::SpongeKitResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One (building, measure, coverage) outcome. Never mutated after assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub building_id: String,
    pub measure: String,
    pub measure_type: MeasureType,
    pub coverage_fraction: Coefficient,
    pub roof_area_m2: Area,
    pub retrofit_area_m2: Area,
    pub baseline_runoff_m3: Volume,
    pub scenario_runoff_m3: Volume,
    pub retained_m3: Volume,
    pub reduction_pct: Decimal,
    pub capex: Money,
    /// Annual operating cost
    pub opex: Money,
    pub npv: Money,
    pub cost_per_m3_retained: Money,
}

/// A coverage fraction left out of the results, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedScenario {
    /// `None` for portfolio-level fractions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building_id: Option<String>,
    pub measure: String,
    pub coverage_fraction: Coefficient,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildingEvaluation {
    pub results: Vec<ScenarioResult>,
    pub skipped: Vec<SkippedScenario>,
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Field assembly only: hydrology from the sweep, money from the cost engine.
pub fn assemble(
    building: &Building,
    measure: &SudsMeasureSpec,
    point: &SweepPoint,
    cost: &CostBreakdown,
) -> ScenarioResult {
    ScenarioResult {
        building_id: building.id.clone(),
        measure: measure.label(),
        measure_type: measure.measure_type,
        coverage_fraction: point.coverage_fraction,
        roof_area_m2: building.roof_area_m2,
        retrofit_area_m2: point.retrofit_area_m2,
        baseline_runoff_m3: point.reference_baseline_runoff_m3,
        scenario_runoff_m3: point.scenario_runoff_m3,
        retained_m3: point.retained_m3,
        reduction_pct: point.reduction_pct,
        capex: cost.capex,
        opex: cost.annual_opex,
        npv: cost.npv,
        cost_per_m3_retained: cost.cost_per_m3,
    }
}

/// Sweep one building with one measure and cost every fraction.
///
/// Input errors abort the whole call. A fraction whose unit cost is
/// undefined is moved to `skipped` so the other fractions still report.
pub fn evaluate_building(
    building: &Building,
    measure: &SudsMeasureSpec,
    coverage_fractions: &[Coefficient],
    storm: &StormEvent,
    baseline_runoff_coefficient: Coefficient,
    basis: VolumeBasis,
) -> SpongeKitResult<BuildingEvaluation> {
    basis.validate()?;
    let points = run_sweep(
        building,
        measure,
        coverage_fractions,
        storm,
        baseline_runoff_coefficient,
    )?;

    let mut evaluation = BuildingEvaluation::default();
    for point in &points {
        let cost = lifecycle::evaluate_with_basis(
            point.retrofit_area_m2,
            measure,
            point.retained_m3,
            basis,
        );
        match cost {
            Ok(cost) => evaluation.results.push(assemble(building, measure, point, &cost)),
            Err(e @ SpongeKitError::DivisionUndefined { .. }) => {
                warn!(
                    building = %building.id,
                    measure = %measure.label(),
                    coverage = %point.coverage_fraction,
                    error = %e,
                    "coverage fraction omitted"
                );
                evaluation.skipped.push(SkippedScenario {
                    building_id: Some(building.id.clone()),
                    measure: measure.label(),
                    coverage_fraction: point.coverage_fraction,
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    Ok(evaluation)
}
