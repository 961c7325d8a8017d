use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SpongeKitError;
use crate::hydrology::storm::StormEvent;
use crate::hydrology::surface::SurfaceModel;
use crate::measures::measure::SudsMeasureSpec;
use crate::types::{Area, Coefficient, Volume};
use crate::SpongeKitResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A roof supplied by the footprint source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: String,
    pub roof_area_m2: Area,
}

impl Building {
    pub fn new(id: impl Into<String>, roof_area_m2: Area) -> SpongeKitResult<Self> {
        let building = Building {
            id: id.into(),
            roof_area_m2,
        };
        building.validate()?;
        Ok(building)
    }

    pub fn validate(&self) -> SpongeKitResult<()> {
        if self.roof_area_m2 <= Decimal::ZERO {
            return Err(SpongeKitError::invalid(
                format!("building[{}].roof_area_m2", self.id),
                format!("Roof area must be positive, got {}", self.roof_area_m2),
            ));
        }
        Ok(())
    }
}

/// Hydrology of one coverage fraction; costs are attached later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub coverage_fraction: Coefficient,
    pub retrofit_area_m2: Area,
    pub baseline_area_m2: Area,
    /// Whole roof left impervious; constant across the sweep
    pub reference_baseline_runoff_m3: Volume,
    pub scenario_runoff_m3: Volume,
    pub retained_m3: Volume,
    /// 0-100
    pub reduction_pct: Decimal,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Sweep coverage fractions over one building and one measure.
///
/// For each fraction `f` the roof is split into `area * f` of retrofit and
/// `area * (1 - f)` of impervious baseline. Reductions are relative to the
/// whole roof left as baseline. Every input is validated before anything is
/// simulated.
pub fn run_sweep(
    building: &Building,
    measure: &SudsMeasureSpec,
    coverage_fractions: &[Coefficient],
    storm: &StormEvent,
    baseline_runoff_coefficient: Coefficient,
) -> SpongeKitResult<Vec<SweepPoint>> {
    building.validate()?;
    measure.validate()?;
    storm.validate()?;
    validate_coverage_fractions(coverage_fractions)?;

    let baseline = SurfaceModel::baseline(baseline_runoff_coefficient)?;
    let retrofit = measure.surface_model();

    let reference = baseline.simulate(building.roof_area_m2, storm)?.runoff_m3;

    let mut points = Vec::with_capacity(coverage_fractions.len());
    for &f in coverage_fractions {
        let retrofit_area = building.roof_area_m2 * f;
        let baseline_area = building.roof_area_m2 * (Decimal::ONE - f);

        let base = baseline.simulate(baseline_area, storm)?;
        let green = retrofit.simulate(retrofit_area, storm)?;

        let scenario_runoff = base.runoff_m3 + green.runoff_m3;
        let reduction_pct = reduction_pct(reference, scenario_runoff);

        debug!(
            building = %building.id,
            measure = %measure.label(),
            coverage = %f,
            scenario_runoff_m3 = %scenario_runoff,
            reduction_pct = %reduction_pct,
            "sweep step"
        );

        points.push(SweepPoint {
            coverage_fraction: f,
            retrofit_area_m2: retrofit_area,
            baseline_area_m2: baseline_area,
            reference_baseline_runoff_m3: reference,
            scenario_runoff_m3: scenario_runoff,
            retained_m3: green.retained_m3,
            reduction_pct,
        });
    }

    Ok(points)
}

/// `100 * (reference - scenario) / reference`, zero when there is no reference runoff.
pub fn reduction_pct(reference_m3: Volume, scenario_m3: Volume) -> Decimal {
    if reference_m3.is_zero() {
        return Decimal::ZERO;
    }
    let saved = reference_m3 - scenario_m3;
    match saved.checked_mul(Decimal::ONE_HUNDRED) {
        Some(scaled) => scaled / reference_m3,
        None => saved / reference_m3 * Decimal::ONE_HUNDRED,
    }
}

pub fn validate_coverage_fractions(fractions: &[Coefficient]) -> SpongeKitResult<()> {
    if fractions.is_empty() {
        return Err(SpongeKitError::invalid(
            "coverage_fractions",
            "At least one coverage fraction is required",
        ));
    }
    if let Some((idx, f)) = fractions
        .iter()
        .enumerate()
        .find(|(_, f)| **f < Decimal::ZERO || **f > Decimal::ONE)
    {
        return Err(SpongeKitError::invalid(
            format!("coverage_fractions[{idx}]"),
            format!("Coverage fraction must be within [0, 1], got {f}"),
        ));
    }
    Ok(())
}

/// True when the measure sheds no more water per m² than the baseline roof
/// for this storm, which is what makes the sweep monotonic in coverage.
pub fn measure_outperforms_baseline(
    measure: &SudsMeasureSpec,
    storm: &StormEvent,
    baseline_runoff_coefficient: Coefficient,
) -> SpongeKitResult<bool> {
    let unit = Decimal::ONE;
    let base = SurfaceModel::baseline(baseline_runoff_coefficient)?.simulate(unit, storm)?;
    let green = measure.surface_model().simulate(unit, storm)?;
    Ok(green.runoff_m3 <= base.runoff_m3)
}
