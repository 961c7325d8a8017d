use std::collections::BTreeMap;

use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::SpongeKitError;
use crate::measures::measure::{MeasureType, SudsMeasureSpec};
use crate::types::Coefficient;
use crate::SpongeKitResult;

/// Typical runoff coefficient of an impervious roof.
pub const TYPICAL_ROOF_RUNOFF_COEFFICIENT: Coefficient = dec!(0.9);

/// Named measure presets supplied by the caller.
///
/// Nothing here is global: build one with [`MeasureCatalog::standard`] or from
/// configuration and pass it where measures are resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeasureCatalog {
    presets: BTreeMap<String, SudsMeasureSpec>,
}

impl MeasureCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extensive and intensive green roofs plus permeable pavement, costed
    /// over 30 years at 3% with O&M at 2% of capex per year.
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        catalog.presets.insert(
            "EXTENSIVE".into(),
            SudsMeasureSpec {
                name: Some("EXTENSIVE".into()),
                measure_type: MeasureType::GreenRoof,
                runoff_coefficient: dec!(0.5),
                retention_capacity_mm: dec!(20),
                capex_per_m2: dec!(150),
                opex_per_m2_per_year: dec!(3),
                lifetime_years: 30,
                discount_rate: dec!(0.03),
            },
        );
        catalog.presets.insert(
            "INTENSIVE".into(),
            SudsMeasureSpec {
                name: Some("INTENSIVE".into()),
                measure_type: MeasureType::GreenRoof,
                runoff_coefficient: dec!(0.3),
                retention_capacity_mm: dec!(40),
                capex_per_m2: dec!(250),
                opex_per_m2_per_year: dec!(5),
                lifetime_years: 30,
                discount_rate: dec!(0.03),
            },
        );
        catalog.presets.insert(
            "PERMEABLE_PAVEMENT".into(),
            SudsMeasureSpec {
                name: Some("PERMEABLE_PAVEMENT".into()),
                measure_type: MeasureType::PermeablePavement,
                runoff_coefficient: dec!(0.6),
                retention_capacity_mm: dec!(15),
                capex_per_m2: dec!(90),
                opex_per_m2_per_year: dec!(1.8),
                lifetime_years: 30,
                discount_rate: dec!(0.03),
            },
        );
        catalog
    }

    /// Add or replace a preset after validating it. The preset's name is set to `name`.
    pub fn insert(&mut self, name: &str, mut spec: SudsMeasureSpec) -> SpongeKitResult<()> {
        spec.name = Some(name.to_string());
        spec.validate()?;
        self.presets.insert(name.to_string(), spec);
        Ok(())
    }

    /// Layer `overrides` on top of this catalog; same-named presets are replaced.
    pub fn merged(mut self, overrides: &MeasureCatalog) -> SpongeKitResult<Self> {
        for (name, spec) in &overrides.presets {
            self.insert(name, spec.clone())?;
        }
        Ok(self)
    }

    /// Resolve a preset by name (case-insensitive).
    pub fn spec(&self, name: &str) -> SpongeKitResult<SudsMeasureSpec> {
        let key = name.trim().to_uppercase();
        let spec = self
            .presets
            .iter()
            .find(|(k, _)| k.to_uppercase() == key)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| {
                SpongeKitError::invalid(
                    "measure",
                    format!(
                        "Unknown preset '{name}'; available: {}",
                        self.names().join(", ")
                    ),
                )
            })?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn names(&self) -> Vec<String> {
        self.presets.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SudsMeasureSpec)> {
        self.presets.iter()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_presets_are_valid() {
        let catalog = MeasureCatalog::standard();
        assert_eq!(catalog.len(), 3);
        for (_, spec) in catalog.iter() {
            assert!(spec.validate().is_ok());
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let catalog = MeasureCatalog::standard();
        let spec = catalog.spec("extensive").unwrap();
        assert_eq!(spec.retention_capacity_mm, dec!(20));
        assert_eq!(spec.label(), "EXTENSIVE");
    }

    #[test]
    fn test_unknown_preset_lists_names() {
        let err = MeasureCatalog::standard().spec("blue_roof").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("blue_roof"));
        assert!(msg.contains("INTENSIVE"));
    }

    #[test]
    fn test_merge_overrides_replace_presets() {
        let mut overrides = MeasureCatalog::new();
        let mut cheap = MeasureCatalog::standard().spec("EXTENSIVE").unwrap();
        cheap.capex_per_m2 = dec!(95);
        overrides.insert("EXTENSIVE", cheap).unwrap();

        let merged = MeasureCatalog::standard().merged(&overrides).unwrap();
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.spec("EXTENSIVE").unwrap().capex_per_m2, dec!(95));
    }

    #[test]
    fn test_insert_rejects_invalid_spec() {
        let mut spec = MeasureCatalog::standard().spec("INTENSIVE").unwrap();
        spec.discount_rate = dec!(1.2);
        assert!(MeasureCatalog::new().insert("BAD", spec).is_err());
    }
}
