use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::costing::lifecycle::{self, VolumeBasis};
use crate::error::SpongeKitError;
use crate::hydrology::storm::StormEvent;
use crate::hydrology::surface::SurfaceModel;
use crate::measures::measure::SudsMeasureSpec;
use crate::reporting::aggregate::SkippedScenario;
use crate::scenarios::sweep::{reduction_pct, validate_coverage_fractions, Building};
use crate::types::{Area, Coefficient, Money, Volume};
use crate::SpongeKitResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Whole buildings chosen to reach a target share of total roof area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub building_ids: Vec<String>,
    pub selected_area_m2: Area,
    pub target_area_m2: Area,
    pub total_area_m2: Area,
}

/// Portfolio outcome when selected buildings are fully retrofitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioScenario {
    pub measure: String,
    pub coverage_fraction: Coefficient,
    pub target_area_m2: Area,
    pub selected_area_m2: Area,
    pub selected_buildings: Vec<String>,
    pub baseline_runoff_m3: Volume,
    pub scenario_runoff_m3: Volume,
    pub retained_m3: Volume,
    pub reduction_pct: Decimal,
    pub capex: Money,
    pub opex: Money,
    pub npv: Money,
    pub cost_per_m3_retained: Money,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortfolioReport {
    pub scenarios: Vec<PortfolioScenario>,
    pub skipped: Vec<SkippedScenario>,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Pick roofs largest-first until their cumulative area reaches
/// `fraction * total`. Buildings are never split, so the selection can
/// overshoot the target; a zero fraction selects nothing.
pub fn select_largest_first(
    buildings: &[Building],
    fraction: Coefficient,
) -> SpongeKitResult<Selection> {
    let total = validate_portfolio(buildings)?;
    validate_coverage_fractions(&[fraction])?;

    let target = total * fraction;

    let mut selection = Selection {
        building_ids: Vec::new(),
        selected_area_m2: Decimal::ZERO,
        target_area_m2: target,
        total_area_m2: total,
    };
    if target <= Decimal::ZERO {
        return Ok(selection);
    }

    let mut ordered: Vec<&Building> = buildings.iter().collect();
    ordered.sort_by(|a, b| {
        b.roof_area_m2
            .cmp(&a.roof_area_m2)
            .then_with(|| a.id.cmp(&b.id))
    });

    for b in ordered {
        selection.building_ids.push(b.id.clone());
        selection.selected_area_m2 += b.roof_area_m2;
        if selection.selected_area_m2 >= target {
            break;
        }
    }

    Ok(selection)
}

/// Evaluate each coverage fraction as a largest-first portfolio retrofit.
///
/// Selected buildings carry the measure over their whole roof; the rest stay
/// impervious. A fraction whose unit cost is undefined is reported in
/// `skipped` rather than given a made-up value.
pub fn evaluate_portfolio_largest_first(
    buildings: &[Building],
    measure: &SudsMeasureSpec,
    coverage_fractions: &[Coefficient],
    storm: &StormEvent,
    baseline_runoff_coefficient: Coefficient,
    basis: VolumeBasis,
) -> SpongeKitResult<PortfolioReport> {
    let total_area = validate_portfolio(buildings)?;
    validate_coverage_fractions(coverage_fractions)?;
    measure.validate()?;
    storm.validate()?;
    basis.validate()?;
    // Bounds every portfolio volume summed below.
    storm.rainfall_volume(total_area)?;

    let baseline = SurfaceModel::baseline(baseline_runoff_coefficient)?;
    let retrofit = measure.surface_model();

    // Per-building responses are independent of the fraction; compute once.
    let mut as_baseline = Vec::with_capacity(buildings.len());
    let mut as_retrofit = Vec::with_capacity(buildings.len());
    for b in buildings {
        as_baseline.push(baseline.simulate(b.roof_area_m2, storm)?);
        as_retrofit.push(retrofit.simulate(b.roof_area_m2, storm)?);
    }
    let reference: Volume = as_baseline.iter().map(|r| r.runoff_m3).sum();

    let mut report = PortfolioReport::default();
    for &f in coverage_fractions {
        let selection = select_largest_first(buildings, f)?;

        let mut scenario_runoff = Decimal::ZERO;
        let mut retained = Decimal::ZERO;
        for (idx, b) in buildings.iter().enumerate() {
            if selection.building_ids.contains(&b.id) {
                scenario_runoff += as_retrofit[idx].runoff_m3;
                retained += as_retrofit[idx].retained_m3;
            } else {
                scenario_runoff += as_baseline[idx].runoff_m3;
            }
        }

        let cost = match lifecycle::evaluate_with_basis(
            selection.selected_area_m2,
            measure,
            retained,
            basis,
        ) {
            Ok(cost) => cost,
            Err(e @ SpongeKitError::DivisionUndefined { .. }) => {
                warn!(
                    measure = %measure.label(),
                    coverage = %f,
                    error = %e,
                    "portfolio fraction omitted"
                );
                report.skipped.push(SkippedScenario {
                    building_id: None,
                    measure: measure.label(),
                    coverage_fraction: f,
                    reason: e.to_string(),
                });
                continue;
            }
            Err(e) => return Err(e),
        };

        debug!(
            measure = %measure.label(),
            coverage = %f,
            selected = selection.building_ids.len(),
            "portfolio fraction evaluated"
        );

        report.scenarios.push(PortfolioScenario {
            measure: measure.label(),
            coverage_fraction: f,
            target_area_m2: selection.target_area_m2,
            selected_area_m2: selection.selected_area_m2,
            selected_buildings: selection.building_ids,
            baseline_runoff_m3: reference,
            scenario_runoff_m3: scenario_runoff,
            retained_m3: retained,
            reduction_pct: reduction_pct(reference, scenario_runoff),
            capex: cost.capex,
            opex: cost.annual_opex,
            npv: cost.npv,
            cost_per_m3_retained: cost.cost_per_m3,
        });
    }

    Ok(report)
}

/// Validate every building and return the total roof area.
fn validate_portfolio(buildings: &[Building]) -> SpongeKitResult<Area> {
    if buildings.is_empty() {
        return Err(SpongeKitError::invalid(
            "buildings",
            "At least one building is required",
        ));
    }
    let mut total = Decimal::ZERO;
    for b in buildings {
        b.validate()?;
        total = total.checked_add(b.roof_area_m2).ok_or_else(|| {
            SpongeKitError::invalid(
                "buildings",
                "Total roof area exceeds the representable decimal range",
            )
        })?;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measures::catalog::MeasureCatalog;
    use rust_decimal_macros::dec;

    fn buildings() -> Vec<Building> {
        vec![
            Building::new("small", dec!(100)).unwrap(),
            Building::new("large", dec!(600)).unwrap(),
            Building::new("medium", dec!(300)).unwrap(),
        ]
    }

    #[test]
    fn test_zero_fraction_selects_nothing() {
        let sel = select_largest_first(&buildings(), Decimal::ZERO).unwrap();
        assert!(sel.building_ids.is_empty());
        assert_eq!(sel.total_area_m2, dec!(1000));
    }

    #[test]
    fn test_tiny_fraction_still_takes_largest() {
        let sel = select_largest_first(&buildings(), dec!(0.01)).unwrap();
        assert_eq!(sel.building_ids, vec!["large".to_string()]);
        assert_eq!(sel.selected_area_m2, dec!(600));
        assert_eq!(sel.target_area_m2, dec!(10));
    }

    #[test]
    fn test_accumulates_until_target_met() {
        let sel = select_largest_first(&buildings(), dec!(0.7)).unwrap();
        assert_eq!(sel.building_ids, vec!["large".to_string(), "medium".to_string()]);
        assert_eq!(sel.selected_area_m2, dec!(900));

        let all = select_largest_first(&buildings(), Decimal::ONE).unwrap();
        assert_eq!(all.building_ids.len(), 3);
    }

    #[test]
    fn test_portfolio_evaluation() {
        let measure = MeasureCatalog::standard().spec("EXTENSIVE").unwrap();
        let storm = StormEvent::single_pulse(dec!(50)).unwrap();
        let report = evaluate_portfolio_largest_first(
            &buildings(),
            &measure,
            &[Decimal::ZERO, dec!(0.5)],
            &storm,
            dec!(0.9),
            VolumeBasis::SingleEvent,
        )
        .unwrap();

        assert!(report.skipped.is_empty());
        let none = &report.scenarios[0];
        assert_eq!(none.scenario_runoff_m3, dec!(45));
        assert_eq!(none.npv, Decimal::ZERO);

        // 0.5 -> "large" (600 m²): 600*0.03*0.5 + 400*0.05*0.9 = 9 + 18
        let half = &report.scenarios[1];
        assert_eq!(half.selected_buildings, vec!["large".to_string()]);
        assert_eq!(half.scenario_runoff_m3, dec!(27));
        assert_eq!(half.retained_m3, dec!(12));
        assert_eq!(half.reduction_pct, dec!(40));
    }

    #[test]
    fn test_dry_storm_skips_costed_fractions() {
        let measure = MeasureCatalog::standard().spec("EXTENSIVE").unwrap();
        let storm = StormEvent::single_pulse(Decimal::ZERO).unwrap();
        let report = evaluate_portfolio_largest_first(
            &buildings(),
            &measure,
            &[Decimal::ZERO, dec!(0.5)],
            &storm,
            dec!(0.9),
            VolumeBasis::SingleEvent,
        )
        .unwrap();
        assert_eq!(report.scenarios.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].coverage_fraction, dec!(0.5));
    }

    #[test]
    fn test_total_area_beyond_decimal_range_rejected() {
        let half_max = Decimal::MAX / dec!(2);
        let huge = vec![
            Building::new("a", half_max).unwrap(),
            Building::new("b", half_max).unwrap(),
            Building::new("c", half_max).unwrap(),
        ];
        let err = select_largest_first(&huge, dec!(0.5)).unwrap_err();
        assert!(matches!(err, SpongeKitError::InvalidInput { .. }));
    }

    #[test]
    fn test_empty_portfolio_rejected() {
        assert!(select_largest_first(&[], dec!(0.5)).is_err());
    }
}
