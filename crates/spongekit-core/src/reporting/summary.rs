use std::cmp::Ordering;
use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::reporting::aggregate::ScenarioResult;
use crate::scenarios::sweep::reduction_pct;
use crate::error::SpongeKitError;
use crate::types::{Area, Coefficient, Money, Volume};
use crate::SpongeKitResult;

/// Portfolio-level totals for one (measure, coverage) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub measure: String,
    pub coverage_fraction: Coefficient,
    pub building_count: usize,
    pub roof_area_m2: Area,
    pub retrofit_area_m2: Area,
    pub baseline_runoff_m3: Volume,
    pub scenario_runoff_m3: Volume,
    pub retained_m3: Volume,
    /// Reduction of the summed runoff
    pub reduction_pct: Decimal,
    /// Plain mean of per-building reductions
    pub mean_reduction_pct: Decimal,
    /// Per-building reductions weighted by roof area
    pub area_weighted_reduction_pct: Decimal,
    pub capex: Money,
    pub opex: Money,
    pub npv: Money,
    /// `None` when cost is positive but nothing was retained
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_per_m3_retained: Option<Money>,
}

/// Reduce per-building results to one row per (measure, coverage), ordered
/// by measure then coverage.
///
/// Fails with `InvalidInput` when a portfolio total leaves the decimal range.
pub fn summarize(results: &[ScenarioResult]) -> SpongeKitResult<Vec<PortfolioSummary>> {
    let mut groups: BTreeMap<(String, Coefficient), Vec<&ScenarioResult>> = BTreeMap::new();
    for r in results {
        groups
            .entry((r.measure.clone(), r.coverage_fraction))
            .or_default()
            .push(r);
    }

    groups
        .into_iter()
        .map(|((measure, coverage_fraction), rows)| {
            let sum = |field: &str, f: fn(&ScenarioResult) -> Option<Decimal>| {
                rows.iter()
                    .try_fold(Decimal::ZERO, |acc, r| acc.checked_add(f(r)?))
                    .ok_or_else(|| {
                        SpongeKitError::invalid(
                            field,
                            "Portfolio total exceeds the representable decimal range",
                        )
                    })
            };

            let roof_area = sum("roof_area_m2", |r| Some(r.roof_area_m2))?;
            let baseline = sum("baseline_runoff_m3", |r| Some(r.baseline_runoff_m3))?;
            let scenario = sum("scenario_runoff_m3", |r| Some(r.scenario_runoff_m3))?;
            let retained = sum("retained_m3", |r| Some(r.retained_m3))?;
            let npv = sum("npv", |r| Some(r.npv))?;
            let count = Decimal::from(rows.len());

            let mean_reduction = sum("reduction_pct", |r| Some(r.reduction_pct))? / count;
            let area_weighted = if roof_area.is_zero() {
                Decimal::ZERO
            } else {
                let weighted =
                    sum("reduction_pct", |r| r.reduction_pct.checked_mul(r.roof_area_m2))?;
                weighted / roof_area
            };

            let cost_per_m3 = if npv.is_zero() {
                Some(Decimal::ZERO)
            } else if retained.is_zero() {
                None
            } else {
                npv.checked_div(retained)
            };

            Ok(PortfolioSummary {
                measure,
                coverage_fraction,
                building_count: rows.len(),
                roof_area_m2: roof_area,
                retrofit_area_m2: sum("retrofit_area_m2", |r| Some(r.retrofit_area_m2))?,
                baseline_runoff_m3: baseline,
                scenario_runoff_m3: scenario,
                retained_m3: retained,
                reduction_pct: reduction_pct(baseline, scenario),
                mean_reduction_pct: mean_reduction,
                area_weighted_reduction_pct: area_weighted,
                capex: sum("capex", |r| Some(r.capex))?,
                opex: sum("opex", |r| Some(r.opex))?,
                npv,
                cost_per_m3_retained: cost_per_m3,
            })
        })
        .collect()
}

/// Largest reduction wins; ties go to the smaller coverage.
fn better(a_reduction: Decimal, a_cov: Decimal, b_reduction: Decimal, b_cov: Decimal) -> Ordering {
    a_reduction.cmp(&b_reduction).then_with(|| b_cov.cmp(&a_cov))
}

pub fn best_scenario(results: &[ScenarioResult]) -> Option<&ScenarioResult> {
    results.iter().max_by(|a, b| {
        better(a.reduction_pct, a.coverage_fraction, b.reduction_pct, b.coverage_fraction)
    })
}

pub fn best_summary(summaries: &[PortfolioSummary]) -> Option<&PortfolioSummary> {
    summaries.iter().max_by(|a, b| {
        better(a.reduction_pct, a.coverage_fraction, b.reduction_pct, b.coverage_fraction)
    })
}

/// One-paragraph description of the best portfolio outcome.
pub fn headline(summaries: &[PortfolioSummary]) -> String {
    match best_summary(summaries) {
        None => "No scenarios were computed, so no results are available for this input.".into(),
        Some(best) => format!(
            "Retrofitting {measure} on {cov}% of roof area gave the largest runoff reduction, \
             about {red}%, retaining around {ret} m³ of event rainfall across {n} building(s).",
            measure = best.measure,
            cov = (best.coverage_fraction * Decimal::ONE_HUNDRED).round_dp(0),
            red = best.reduction_pct.round_dp(1),
            ret = best.retained_m3.round_dp(0),
            n = best.building_count,
        ),
    }
}
