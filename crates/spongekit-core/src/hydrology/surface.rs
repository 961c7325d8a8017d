use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SpongeKitError;
use crate::hydrology::storm::StormEvent;
use crate::types::{Area, Coefficient, Depth, Volume, MM_PER_M};
use crate::SpongeKitResult;

/// Slack allowed when checking that a simulation created no water (m³).
pub const CONSERVATION_EPSILON: Decimal = dec!(0.000000000001);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Storage parameters shared by every bucket-retention surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BucketStore {
    /// Fraction of overflow that leaves the surface as runoff (0-1)
    pub runoff_coefficient: Coefficient,
    /// Depth the surface holds before it overflows (mm)
    pub retention_capacity_mm: Depth,
}

/// Roof surface response model. The variant set is closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum SurfaceModel {
    /// Impervious roof: no storage, fixed runoff coefficient.
    Baseline { runoff_coefficient: Coefficient },
    GreenRoof(BucketStore),
    PermeablePavement(BucketStore),
}

/// Volumes produced by one simulation over one area.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SurfaceResponse {
    pub runoff_m3: Volume,
    pub retained_m3: Volume,
    /// First step (0-based) at which the store was full, for time-stepped storms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturated_at_step: Option<usize>,
}

// ---------------------------------------------------------------------------
// Construction and validation
// ---------------------------------------------------------------------------

impl SurfaceModel {
    pub fn baseline(runoff_coefficient: Coefficient) -> SpongeKitResult<Self> {
        let model = SurfaceModel::Baseline { runoff_coefficient };
        model.validate()?;
        Ok(model)
    }

    pub fn runoff_coefficient(&self) -> Coefficient {
        match self {
            SurfaceModel::Baseline { runoff_coefficient } => *runoff_coefficient,
            SurfaceModel::GreenRoof(store) | SurfaceModel::PermeablePavement(store) => {
                store.runoff_coefficient
            }
        }
    }

    /// Storage depth; zero for the impervious baseline.
    pub fn retention_capacity_mm(&self) -> Depth {
        match self {
            SurfaceModel::Baseline { .. } => Decimal::ZERO,
            SurfaceModel::GreenRoof(store) | SurfaceModel::PermeablePavement(store) => {
                store.retention_capacity_mm
            }
        }
    }

    pub fn validate(&self) -> SpongeKitResult<()> {
        let c = self.runoff_coefficient();
        if c < Decimal::ZERO || c > Decimal::ONE {
            return Err(SpongeKitError::invalid(
                "runoff_coefficient",
                format!("Runoff coefficient must be between 0 and 1, got {c}"),
            ));
        }
        if self.retention_capacity_mm() < Decimal::ZERO {
            return Err(SpongeKitError::invalid(
                "retention_capacity_mm",
                "Retention capacity cannot be negative",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

impl SurfaceModel {
    /// Convert `storm` falling on `area_m2` into runoff and retained volumes.
    ///
    /// A zero area is accepted and yields zero volumes, so a sweep can pass
    /// an empty retrofit or baseline portion straight through.
    pub fn simulate(&self, area_m2: Area, storm: &StormEvent) -> SpongeKitResult<SurfaceResponse> {
        if area_m2 < Decimal::ZERO {
            return Err(SpongeKitError::invalid(
                "area_m2",
                format!("Area cannot be negative, got {area_m2}"),
            ));
        }
        self.validate()?;
        storm.validate()?;
        let rainfall_m3 = storm.rainfall_volume(area_m2)?;

        let response = match self {
            SurfaceModel::Baseline { runoff_coefficient } => {
                impervious_runoff(area_m2, storm, *runoff_coefficient)
            }
            SurfaceModel::GreenRoof(store) | SurfaceModel::PermeablePavement(store) => {
                if storm.is_time_stepped() {
                    store.mass_balance(area_m2, storm)
                } else {
                    store.single_pulse(area_m2, storm.total_depth())
                }
            }
        };

        debug!(
            model = self.label(),
            area_m2 = %area_m2,
            rainfall_m3 = %rainfall_m3,
            runoff_m3 = %response.runoff_m3,
            retained_m3 = %response.retained_m3,
            "surface simulated"
        );

        Ok(response)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SurfaceModel::Baseline { .. } => "baseline",
            SurfaceModel::GreenRoof(_) => "green_roof",
            SurfaceModel::PermeablePavement(_) => "permeable_pavement",
        }
    }
}

fn depth_volume(area_m2: Area, depth_mm: Depth) -> Volume {
    area_m2 * depth_mm / MM_PER_M
}

/// No storage: every step contributes `area * d * C` directly.
fn impervious_runoff(area_m2: Area, storm: &StormEvent, c: Coefficient) -> SurfaceResponse {
    let runoff_m3 = storm
        .steps()
        .map(|d| depth_volume(area_m2, d) * c)
        .sum();
    SurfaceResponse {
        runoff_m3,
        retained_m3: Decimal::ZERO,
        saturated_at_step: None,
    }
}

#[derive(Default)]
struct BucketState {
    level_mm: Depth,
    runoff_m3: Volume,
    retained_m3: Volume,
    saturated_at_step: Option<usize>,
}

impl BucketStore {
    fn single_pulse(&self, area_m2: Area, depth_mm: Depth) -> SurfaceResponse {
        let effective = (depth_mm - self.retention_capacity_mm).max(Decimal::ZERO);
        let retained_depth = depth_mm - effective;
        SurfaceResponse {
            runoff_m3: depth_volume(area_m2, effective) * self.runoff_coefficient,
            retained_m3: depth_volume(area_m2, retained_depth),
            saturated_at_step: None,
        }
    }

    /// Fill the store step by step; anything that does not fit overflows.
    /// The level starts empty and is dropped when the storm ends.
    fn mass_balance(&self, area_m2: Area, storm: &StormEvent) -> SurfaceResponse {
        let capacity = self.retention_capacity_mm;
        let end = storm
            .steps()
            .enumerate()
            .fold(BucketState::default(), |mut state, (idx, d)| {
                let fill = d.min(capacity - state.level_mm);
                state.level_mm += fill;
                let overflow = d - fill;
                state.runoff_m3 += depth_volume(area_m2, overflow) * self.runoff_coefficient;
                state.retained_m3 += depth_volume(area_m2, fill);
                if state.saturated_at_step.is_none()
                    && capacity > Decimal::ZERO
                    && state.level_mm >= capacity
                {
                    state.saturated_at_step = Some(idx);
                }
                state
            });

        SurfaceResponse {
            runoff_m3: end.runoff_m3,
            retained_m3: end.retained_m3,
            saturated_at_step: end.saturated_at_step,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn green_roof(c: Decimal, r: Decimal) -> SurfaceModel {
        SurfaceModel::GreenRoof(BucketStore {
            runoff_coefficient: c,
            retention_capacity_mm: r,
        })
    }

    #[test]
    fn test_baseline_single_pulse() {
        let storm = StormEvent::single_pulse(dec!(50)).unwrap();
        let out = SurfaceModel::baseline(dec!(0.9))
            .unwrap()
            .simulate(dec!(1000), &storm)
            .unwrap();
        assert_eq!(out.runoff_m3, dec!(45));
        assert_eq!(out.retained_m3, Decimal::ZERO);
    }

    #[test]
    fn test_green_roof_single_pulse() {
        let storm = StormEvent::single_pulse(dec!(50)).unwrap();
        let out = green_roof(dec!(0.5), dec!(20)).simulate(dec!(300), &storm).unwrap();
        assert_eq!(out.runoff_m3, dec!(4.5));
        assert_eq!(out.retained_m3, dec!(6));
    }

    #[test]
    fn test_small_storm_fully_retained() {
        let storm = StormEvent::single_pulse(dec!(12)).unwrap();
        let out = green_roof(dec!(0.5), dec!(20)).simulate(dec!(100), &storm).unwrap();
        assert_eq!(out.runoff_m3, Decimal::ZERO);
        assert_eq!(out.retained_m3, dec!(1.2));
    }

    #[test]
    fn test_bucket_saturates_mid_storm() {
        // 10 + 10 fills a 15 mm store in step 1; the remainder overflows.
        let storm = StormEvent::hyetograph(dec!(10), vec![dec!(10), dec!(10), dec!(10)]).unwrap();
        let out = green_roof(dec!(0.5), dec!(15)).simulate(dec!(100), &storm).unwrap();
        assert_eq!(out.retained_m3, dec!(1.5));
        // overflow 5 + 10 = 15 mm on 100 m² at C=0.5
        assert_eq!(out.runoff_m3, dec!(0.75));
        assert_eq!(out.saturated_at_step, Some(1));
    }

    #[test]
    fn test_hyetograph_matches_single_pulse_for_bucket() {
        // With no losses between steps, splitting the storm does not change totals.
        let pulse = StormEvent::single_pulse(dec!(30)).unwrap();
        let series = StormEvent::hyetograph(dec!(5), vec![dec!(5), dec!(15), dec!(10)]).unwrap();
        let model = SurfaceModel::PermeablePavement(BucketStore {
            runoff_coefficient: dec!(0.6),
            retention_capacity_mm: dec!(15),
        });
        let a = model.simulate(dec!(250), &pulse).unwrap();
        let b = model.simulate(dec!(250), &series).unwrap();
        assert_eq!(a.runoff_m3, b.runoff_m3);
        assert_eq!(a.retained_m3, b.retained_m3);
    }

    #[test]
    fn test_zero_capacity_matches_baseline() {
        let storms = [
            StormEvent::single_pulse(dec!(37.5)).unwrap(),
            StormEvent::hyetograph(dec!(15), vec![dec!(1.25), dec!(0), dec!(9.8)]).unwrap(),
        ];
        let baseline = SurfaceModel::baseline(dec!(0.9)).unwrap();
        let bucket = green_roof(dec!(0.9), Decimal::ZERO);
        for storm in &storms {
            for area in [dec!(1), dec!(87.3), dec!(12500)] {
                let b = baseline.simulate(area, storm).unwrap();
                let g = bucket.simulate(area, storm).unwrap();
                assert_eq!(b.runoff_m3, g.runoff_m3);
                assert_eq!(b.retained_m3, g.retained_m3);
            }
        }
    }

    #[test]
    fn test_zero_area_yields_zero() {
        let storm = StormEvent::single_pulse(dec!(50)).unwrap();
        let out = green_roof(dec!(0.5), dec!(20)).simulate(Decimal::ZERO, &storm).unwrap();
        assert_eq!(out.runoff_m3, Decimal::ZERO);
        assert_eq!(out.retained_m3, Decimal::ZERO);
    }

    #[test]
    fn test_rejects_negative_area_and_bad_coefficient() {
        let storm = StormEvent::single_pulse(dec!(50)).unwrap();
        assert!(green_roof(dec!(0.5), dec!(20)).simulate(dec!(-1), &storm).is_err());
        assert!(green_roof(dec!(1.5), dec!(20)).simulate(dec!(1), &storm).is_err());
        assert!(green_roof(dec!(0.5), dec!(-3)).simulate(dec!(1), &storm).is_err());
        assert!(SurfaceModel::baseline(dec!(-0.1)).is_err());
    }

    #[test]
    fn test_area_beyond_decimal_range_is_rejected() {
        let storm = StormEvent::single_pulse(dec!(1000000000)).unwrap();
        let huge = dec!(100000000000000000000000);
        let err = SurfaceModel::baseline(dec!(0.9)).unwrap().simulate(huge, &storm).unwrap_err();
        assert!(matches!(err, SpongeKitError::InvalidInput { .. }));

        let depths = vec![dec!(600000000), dec!(400000000)];
        let series = StormEvent::hyetograph(dec!(5), depths).unwrap();
        assert!(green_roof(dec!(0.5), dec!(20)).simulate(huge, &series).is_err());
    }

    #[test]
    fn test_serde_tagged_model() {
        let model: SurfaceModel = serde_json::from_str(
            r#"{"model":"green_roof","runoff_coefficient":"0.5","retention_capacity_mm":"20"}"#,
        )
        .unwrap();
        assert_eq!(model, green_roof(dec!(0.5), dec!(20)));
    }
}
