use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::SpongeKitError;
use crate::hydrology::surface::{BucketStore, SurfaceModel};
use crate::types::{Coefficient, Depth, Money, Rate};
use crate::SpongeKitResult;

/// Kind of SuDS retrofit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MeasureType {
    GreenRoof,
    PermeablePavement,
}

impl std::fmt::Display for MeasureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeasureType::GreenRoof => write!(f, "green_roof"),
            MeasureType::PermeablePavement => write!(f, "permeable_pavement"),
        }
    }
}

/// Hydrological and cost parameters of one retrofit measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SudsMeasureSpec {
    /// Label carried into results (e.g. "EXTENSIVE"); falls back to the type name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub measure_type: MeasureType,
    /// Fraction of overflow becoming runoff (0-1)
    pub runoff_coefficient: Coefficient,
    /// Storage depth before overflow (mm)
    pub retention_capacity_mm: Depth,
    /// Installed cost per m² of retrofit
    pub capex_per_m2: Money,
    /// Operation and maintenance per m² per year
    pub opex_per_m2_per_year: Money,
    /// Analysis horizon in whole years
    pub lifetime_years: u32,
    /// Annual discount rate, 0 <= r < 1
    pub discount_rate: Rate,
}

impl SudsMeasureSpec {
    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.measure_type.to_string())
    }

    /// The bucket surface this measure behaves as.
    pub fn surface_model(&self) -> SurfaceModel {
        let store = BucketStore {
            runoff_coefficient: self.runoff_coefficient,
            retention_capacity_mm: self.retention_capacity_mm,
        };
        match self.measure_type {
            MeasureType::GreenRoof => SurfaceModel::GreenRoof(store),
            MeasureType::PermeablePavement => SurfaceModel::PermeablePavement(store),
        }
    }

    pub fn validate(&self) -> SpongeKitResult<()> {
        let label = self.label();
        let field = |name: &str| format!("measure[{label}].{name}");

        if self.runoff_coefficient < Decimal::ZERO || self.runoff_coefficient > Decimal::ONE {
            return Err(SpongeKitError::invalid(
                field("runoff_coefficient"),
                "Runoff coefficient must be between 0 and 1",
            ));
        }
        if self.retention_capacity_mm < Decimal::ZERO {
            return Err(SpongeKitError::invalid(
                field("retention_capacity_mm"),
                "Retention capacity cannot be negative",
            ));
        }
        if self.capex_per_m2 < Decimal::ZERO {
            return Err(SpongeKitError::invalid(
                field("capex_per_m2"),
                "Capital cost cannot be negative",
            ));
        }
        if self.opex_per_m2_per_year < Decimal::ZERO {
            return Err(SpongeKitError::invalid(
                field("opex_per_m2_per_year"),
                "Operating cost cannot be negative",
            ));
        }
        if self.lifetime_years == 0 {
            return Err(SpongeKitError::invalid(
                field("lifetime_years"),
                "Lifetime must be at least 1 year",
            ));
        }
        if self.discount_rate < Decimal::ZERO || self.discount_rate >= Decimal::ONE {
            return Err(SpongeKitError::invalid(
                field("discount_rate"),
                "Discount rate must satisfy 0 <= r < 1",
            ));
        }
        Ok(())
    }
}
