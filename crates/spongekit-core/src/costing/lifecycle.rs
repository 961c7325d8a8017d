use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::SpongeKitError;
use crate::measures::measure::SudsMeasureSpec;
use crate::time_value;
use crate::types::{Area, Money, Volume};
use crate::SpongeKitResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How a per-event retained volume is stretched over the measure lifetime
/// before dividing cost by it. The choice belongs to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "basis", rename_all = "snake_case")]
pub enum VolumeBasis {
    /// Use the representative event's retained volume as-is.
    #[default]
    SingleEvent,
    /// retained-per-event × events per year × lifetime years.
    AnnualEvents { events_per_year: Decimal },
}

impl VolumeBasis {
    pub fn validate(&self) -> SpongeKitResult<()> {
        if let VolumeBasis::AnnualEvents { events_per_year } = self {
            if *events_per_year <= Decimal::ZERO {
                return Err(SpongeKitError::invalid(
                    "volume_basis.events_per_year",
                    "Events per year must be positive",
                ));
            }
        }
        Ok(())
    }

    /// Volume the lifetime cost is spread over (m³).
    pub fn lifetime_volume(
        &self,
        retained_per_event_m3: Volume,
        lifetime_years: u32,
    ) -> SpongeKitResult<Volume> {
        match self {
            VolumeBasis::SingleEvent => Ok(retained_per_event_m3),
            VolumeBasis::AnnualEvents { events_per_year } => retained_per_event_m3
                .checked_mul(*events_per_year)
                .and_then(|v| v.checked_mul(Decimal::from(lifetime_years)))
                .ok_or_else(|| out_of_range("volume_basis.events_per_year")),
        }
    }
}

fn out_of_range(field: &str) -> SpongeKitError {
    SpongeKitError::invalid(field, "Cost exceeds the representable decimal range")
}

/// Lifecycle cost of retrofitting an area with one measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub capex: Money,
    /// Undiscounted operating cost per year
    pub annual_opex: Money,
    /// Present value of all operating years
    pub pv_opex: Money,
    /// capex + pv_opex
    pub npv: Money,
    /// Volume basis actually used for the unit cost (m³)
    pub lifetime_retained_m3: Volume,
    pub cost_per_m3: Money,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Cost `retrofit_area_m2` of `measure` and divide by `lifetime_retained_m3`.
///
/// npv = capex + Σ_{y=1..L} annual_opex / (1 + r)^y
///
/// A zero NPV gives a zero unit cost whatever the volume. A positive NPV
/// over zero volume is [`SpongeKitError::DivisionUndefined`].
pub fn evaluate(
    retrofit_area_m2: Area,
    measure: &SudsMeasureSpec,
    lifetime_retained_m3: Volume,
) -> SpongeKitResult<CostBreakdown> {
    if retrofit_area_m2 < Decimal::ZERO {
        return Err(SpongeKitError::invalid(
            "retrofit_area_m2",
            "Retrofit area cannot be negative",
        ));
    }
    if lifetime_retained_m3 < Decimal::ZERO {
        return Err(SpongeKitError::invalid(
            "lifetime_retained_m3",
            "Retained volume cannot be negative",
        ));
    }
    measure.validate()?;

    let capex = retrofit_area_m2
        .checked_mul(measure.capex_per_m2)
        .ok_or_else(|| out_of_range("capex_per_m2"))?;
    let annual_opex = retrofit_area_m2
        .checked_mul(measure.opex_per_m2_per_year)
        .ok_or_else(|| out_of_range("opex_per_m2_per_year"))?;

    let pv_opex =
        time_value::pv_level_stream(measure.discount_rate, measure.lifetime_years, annual_opex)?;
    let npv = capex.checked_add(pv_opex).ok_or_else(|| out_of_range("npv"))?;

    let cost_per_m3 = if npv.is_zero() {
        Decimal::ZERO
    } else if lifetime_retained_m3.is_zero() {
        return Err(SpongeKitError::DivisionUndefined {
            context: format!(
                "cost per m³ for '{}': lifetime cost {npv} over zero retained volume",
                measure.label()
            ),
        });
    } else {
        npv.checked_div(lifetime_retained_m3)
            .ok_or_else(|| SpongeKitError::DivisionUndefined {
                context: format!(
                    "cost per m³ for '{}': {npv} over {lifetime_retained_m3} m³ \
                     exceeds the decimal range",
                    measure.label()
                ),
            })?
    };

    Ok(CostBreakdown {
        capex,
        annual_opex,
        pv_opex,
        npv,
        lifetime_retained_m3,
        cost_per_m3,
    })
}

/// [`evaluate`] with the volume derived from a per-event figure via `basis`.
pub fn evaluate_with_basis(
    retrofit_area_m2: Area,
    measure: &SudsMeasureSpec,
    retained_per_event_m3: Volume,
    basis: VolumeBasis,
) -> SpongeKitResult<CostBreakdown> {
    basis.validate()?;
    let volume = basis.lifetime_volume(retained_per_event_m3, measure.lifetime_years)?;
    evaluate(retrofit_area_m2, measure, volume)
}
