use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::RunConfig;
use crate::hydrology::storm::StormEvent;
use crate::measures::measure::SudsMeasureSpec;
use crate::reporting::aggregate::{evaluate_building, ScenarioResult, SkippedScenario};
use crate::reporting::summary::{best_scenario, headline, summarize, PortfolioSummary};
use crate::scenarios::sweep::measure_outperforms_baseline;
use crate::types::{with_metadata, ComputationOutput};
use crate::SpongeKitResult;

#[cfg(feature = "portfolio")]
use crate::scenarios::selection::{evaluate_portfolio_largest_first, PortfolioReport};

/// Results of every (building, measure, coverage) combination in a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    pub results: Vec<ScenarioResult>,
    pub skipped: Vec<SkippedScenario>,
    pub summaries: Vec<PortfolioSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best: Option<ScenarioResult>,
    pub headline: String,
}

/// Evaluate every building against every configured measure.
pub fn run(config: &RunConfig) -> SpongeKitResult<ComputationOutput<SweepReport>> {
    let start = Instant::now();

    config.validate()?;
    let measures = config.resolve_measures()?;
    let mut warnings = run_warnings(config, &measures)?;

    let mut results = Vec::new();
    let mut skipped = Vec::new();
    for measure in &measures {
        for building in &config.buildings {
            let eval = evaluate_building(
                building,
                measure,
                &config.coverage_fractions,
                &config.storm,
                config.baseline_runoff_coefficient,
                config.volume_basis,
            )?;
            results.extend(eval.results);
            skipped.extend(eval.skipped);
        }
    }

    if !skipped.is_empty() {
        warnings.push(format!(
            "{} scenario(s) omitted because cost per m³ is undefined",
            skipped.len()
        ));
    }

    let summaries = summarize(&results)?;
    let report = SweepReport {
        best: best_scenario(&results).cloned(),
        headline: headline(&summaries),
        summaries,
        results,
        skipped,
    };

    info!(
        buildings = config.buildings.len(),
        measures = measures.len(),
        results = report.results.len(),
        skipped = report.skipped.len(),
        "sweep complete"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        methodology(&config.storm),
        config,
        warnings,
        elapsed,
        report,
    ))
}

/// Largest-first whole-building selection for every configured measure.
#[cfg(feature = "portfolio")]
pub fn run_portfolio(
    config: &RunConfig,
) -> SpongeKitResult<ComputationOutput<Vec<PortfolioReport>>> {
    let start = Instant::now();

    config.validate()?;
    let measures = config.resolve_measures()?;
    let warnings = run_warnings(config, &measures)?;

    let reports = measures
        .iter()
        .map(|measure| {
            evaluate_portfolio_largest_first(
                &config.buildings,
                measure,
                &config.coverage_fractions,
                &config.storm,
                config.baseline_runoff_coefficient,
                config.volume_basis,
            )
        })
        .collect::<SpongeKitResult<Vec<_>>>()?;

    info!(
        buildings = config.buildings.len(),
        measures = measures.len(),
        "portfolio selection complete"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Largest-first whole-building retrofit selection with bucket retention",
        config,
        warnings,
        elapsed,
        reports,
    ))
}

fn methodology(storm: &StormEvent) -> &'static str {
    if storm.is_time_stepped() {
        "Coverage sweep with time-stepped bucket mass balance and discounted lifecycle cost"
    } else {
        "Coverage sweep with single-pulse bucket retention and discounted lifecycle cost"
    }
}

fn run_warnings(config: &RunConfig, measures: &[SudsMeasureSpec]) -> SpongeKitResult<Vec<String>> {
    let mut warnings = Vec::new();

    if config.storm.total_depth().is_zero() {
        warnings.push("Storm depth is zero; no runoff or retention will occur".into());
    }
    if !config.fractions_sorted() {
        warnings.push(
            "Coverage fractions are not in ascending order; results follow input order".into(),
        );
    }
    for m in measures {
        if !measure_outperforms_baseline(m, &config.storm, config.baseline_runoff_coefficient)? {
            warnings.push(format!(
                "Measure '{}' sheds more runoff per m² than the baseline roof for this storm; \
                 runoff will rise with coverage",
                m.label()
            ));
        }
    }

    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn config() -> RunConfig {
        RunConfig::from_json(
            r#"{
                "storm":{"kind":"single_pulse","total_depth_mm":"50"},
                "coverage_fractions":["0","0.3","1"],
                "measures":["EXTENSIVE","PERMEABLE_PAVEMENT"],
                "buildings":[
                    {"id":"b1","roof_area_m2":"1000"},
                    {"id":"b2","roof_area_m2":"250"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_run_produces_every_combination() {
        let out = run(&config()).unwrap();
        assert_eq!(out.result.results.len(), 2 * 2 * 3);
        assert!(out.result.skipped.is_empty());
        assert_eq!(out.result.summaries.len(), 2 * 3);
        assert!(out.warnings.is_empty());

        let best = out.result.best.as_ref().unwrap();
        assert_eq!(best.coverage_fraction, dec!(1));
        assert!(out.result.headline.contains("100%"));
    }

    #[test]
    fn test_run_rejects_invalid_config_before_simulating() {
        let mut cfg = config();
        cfg.buildings.push(crate::scenarios::sweep::Building {
            id: "bad".into(),
            roof_area_m2: dec!(-5),
        });
        assert!(run(&cfg).is_err());
    }

    #[test]
    fn test_run_warns_on_unsorted_fractions() {
        let mut cfg = config();
        cfg.coverage_fractions = vec![dec!(0.5), dec!(0.2)];
        let out = run(&cfg).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("ascending")));
    }

    #[test]
    fn test_dry_storm_omits_costed_fractions_with_warning() {
        let mut cfg = config();
        cfg.storm = StormEvent::single_pulse(Decimal::ZERO).unwrap();
        let out = run(&cfg).unwrap();

        // f = 0 costs nothing; 0.3 and 1 retain nothing at a positive cost
        assert_eq!(out.result.results.len(), 2 * 2);
        assert_eq!(out.result.skipped.len(), 2 * 2 * 2);
        assert!(out.result.results.iter().all(|r| r.coverage_fraction.is_zero()));
        assert!(out
            .warnings
            .iter()
            .any(|w| w == "8 scenario(s) omitted because cost per m³ is undefined"));
        assert!(out.warnings.iter().any(|w| w.contains("Storm depth is zero")));
    }

    #[cfg(feature = "portfolio")]
    #[test]
    fn test_run_portfolio_one_report_per_measure() {
        let out = run_portfolio(&config()).unwrap();
        assert_eq!(out.result.len(), 2);
        assert_eq!(out.result[0].scenarios.len(), 3);
    }
}
