use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::SpongeKitError;
use crate::types::{Area, Depth, Volume, MM_PER_M};
use crate::SpongeKitResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Rainfall forcing applied to a roof.
///
/// Either a single event total, or a hyetograph of per-step depths at a
/// uniform time step. Values deserialised straight from JSON bypass the
/// constructors, so engine entry points call [`StormEvent::validate`] first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StormEvent {
    /// One pulse of rain; the whole depth arrives at once.
    SinglePulse { total_depth_mm: Depth },
    /// Depth per time step, in order.
    Hyetograph {
        time_step_minutes: Decimal,
        depths_mm: Vec<Depth>,
    },
}

impl Default for StormEvent {
    /// 50 mm single event.
    fn default() -> Self {
        StormEvent::SinglePulse {
            total_depth_mm: Decimal::from(50),
        }
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl StormEvent {
    pub fn single_pulse(total_depth_mm: Depth) -> SpongeKitResult<Self> {
        let storm = StormEvent::SinglePulse { total_depth_mm };
        storm.validate()?;
        Ok(storm)
    }

    pub fn hyetograph(time_step_minutes: Decimal, depths_mm: Vec<Depth>) -> SpongeKitResult<Self> {
        let storm = StormEvent::Hyetograph {
            time_step_minutes,
            depths_mm,
        };
        storm.validate()?;
        Ok(storm)
    }

    /// Build a hyetograph from `(minute, mm_per_min)` rows.
    ///
    /// Minutes must be strictly increasing with a uniform spacing; that
    /// spacing becomes the time step and each row contributes
    /// `intensity * step` millimetres. A single row is taken as a one-minute step.
    ///
    /// Rows are read as intensities, so a 5-minute series at 2 mm/min holds
    /// 10 mm per step. Tools that sum the raw `mm_per_min` column as depths
    /// report a total `step` times smaller, and accept uneven spacing that
    /// this constructor rejects.
    pub fn from_intensity_series(rows: &[(u32, Decimal)]) -> SpongeKitResult<Self> {
        if rows.is_empty() {
            return Err(SpongeKitError::invalid(
                "hyetograph",
                "Intensity series must contain at least one row",
            ));
        }

        let step = match rows {
            [first, second, ..] => {
                if second.0 <= first.0 {
                    return Err(SpongeKitError::invalid(
                        "hyetograph.minute",
                        "Minutes must be strictly increasing",
                    ));
                }
                second.0 - first.0
            }
            _ => 1,
        };

        for pair in rows.windows(2) {
            let (prev, next) = (pair[0].0, pair[1].0);
            if next <= prev || next - prev != step {
                return Err(SpongeKitError::invalid(
                    "hyetograph.minute",
                    format!(
                        "Rows must be evenly spaced by {step} min; found {prev} -> {next}"
                    ),
                ));
            }
        }

        let step_dec = Decimal::from(step);
        let mut depths = Vec::with_capacity(rows.len());
        for (minute, intensity) in rows {
            if *intensity < Decimal::ZERO {
                return Err(SpongeKitError::invalid(
                    "hyetograph.mm_per_min",
                    format!("Negative intensity {intensity} at minute {minute}"),
                ));
            }
            depths.push(*intensity * step_dec);
        }

        StormEvent::hyetograph(step_dec, depths)
    }

    /// Check the invariants a storm must satisfy before it can be simulated.
    pub fn validate(&self) -> SpongeKitResult<()> {
        match self {
            StormEvent::SinglePulse { total_depth_mm } => {
                if *total_depth_mm < Decimal::ZERO {
                    return Err(SpongeKitError::invalid(
                        "storm.total_depth_mm",
                        "Storm depth cannot be negative",
                    ));
                }
            }
            StormEvent::Hyetograph {
                time_step_minutes,
                depths_mm,
            } => {
                if *time_step_minutes <= Decimal::ZERO {
                    return Err(SpongeKitError::invalid(
                        "storm.time_step_minutes",
                        "Time step must be positive",
                    ));
                }
                if depths_mm.is_empty() {
                    return Err(SpongeKitError::invalid(
                        "storm.depths_mm",
                        "Hyetograph must have at least one step",
                    ));
                }
                if let Some((idx, d)) = depths_mm
                    .iter()
                    .enumerate()
                    .find(|(_, d)| **d < Decimal::ZERO)
                {
                    return Err(SpongeKitError::invalid(
                        "storm.depths_mm",
                        format!("Step {idx} has negative depth {d}"),
                    ));
                }
                if depths_mm
                    .iter()
                    .try_fold(Decimal::ZERO, |acc, d| acc.checked_add(*d))
                    .is_none()
                {
                    return Err(SpongeKitError::invalid(
                        "storm.depths_mm",
                        "Total depth exceeds the representable decimal range",
                    ));
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Accessors
// ---------------------------------------------------------------------------

impl StormEvent {
    /// Total event depth (mm).
    pub fn total_depth(&self) -> Depth {
        match self {
            StormEvent::SinglePulse { total_depth_mm } => *total_depth_mm,
            StormEvent::Hyetograph { depths_mm, .. } => depths_mm.iter().copied().sum(),
        }
    }

    pub fn is_time_stepped(&self) -> bool {
        matches!(self, StormEvent::Hyetograph { .. })
    }

    /// Per-step depths. A single pulse yields exactly one step. Call again to
    /// restart; the iterator is also `Clone`.
    pub fn steps(&self) -> impl Iterator<Item = Depth> + Clone + '_ {
        let (pulse, series): (Option<Depth>, &[Depth]) = match self {
            StormEvent::SinglePulse { total_depth_mm } => (Some(*total_depth_mm), &[]),
            StormEvent::Hyetograph { depths_mm, .. } => (None, depths_mm.as_slice()),
        };
        pulse.into_iter().chain(series.iter().copied())
    }

    pub fn step_count(&self) -> usize {
        match self {
            StormEvent::SinglePulse { .. } => 1,
            StormEvent::Hyetograph { depths_mm, .. } => depths_mm.len(),
        }
    }

    /// Storm duration in minutes; `None` for a single pulse.
    pub fn duration_minutes(&self) -> Option<Decimal> {
        match self {
            StormEvent::SinglePulse { .. } => None,
            StormEvent::Hyetograph {
                time_step_minutes,
                depths_mm,
            } => Some(*time_step_minutes * Decimal::from(depths_mm.len())),
        }
    }

    /// Largest single-step depth (mm).
    pub fn peak_step_depth(&self) -> Depth {
        self.steps().max().unwrap_or(Decimal::ZERO)
    }

    /// Rain falling on `area_m2` over the whole event (m³).
    ///
    /// Every runoff and retained volume a surface produces is bounded by this,
    /// so a successful call means the simulation stays within decimal range.
    pub fn rainfall_volume(&self, area_m2: Area) -> SpongeKitResult<Volume> {
        area_m2
            .checked_mul(self.total_depth())
            .map(|v| v / MM_PER_M)
            .ok_or_else(|| {
                SpongeKitError::invalid(
                    "area_m2",
                    format!(
                        "{area_m2} m² under {} mm exceeds the representable decimal range",
                        self.total_depth()
                    ),
                )
            })
    }
}
