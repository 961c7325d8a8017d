use std::collections::BTreeSet;

use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::costing::lifecycle::VolumeBasis;
use crate::error::SpongeKitError;
use crate::hydrology::storm::StormEvent;
use crate::hydrology::surface::SurfaceModel;
use crate::measures::catalog::{MeasureCatalog, TYPICAL_ROOF_RUNOFF_COEFFICIENT};
use crate::measures::measure::SudsMeasureSpec;
use crate::scenarios::sweep::{validate_coverage_fractions, Building};
use crate::types::Coefficient;
use crate::SpongeKitResult;

/// A measure given either by preset name or in full.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MeasureRef {
    Preset(String),
    Inline(SudsMeasureSpec),
}

/// Everything one run needs. Missing fields fall back to a 50 mm event,
/// a 0.9 roof coefficient, 10-50% coverage and the EXTENSIVE green roof.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub storm: StormEvent,
    pub baseline_runoff_coefficient: Coefficient,
    pub coverage_fractions: Vec<Coefficient>,
    pub measures: Vec<MeasureRef>,
    pub buildings: Vec<Building>,
    pub volume_basis: VolumeBasis,
    /// Presets added to, or replacing, the standard catalog
    #[serde(skip_serializing_if = "MeasureCatalog::is_empty")]
    pub catalog: MeasureCatalog,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            storm: StormEvent::default(),
            baseline_runoff_coefficient: TYPICAL_ROOF_RUNOFF_COEFFICIENT,
            coverage_fractions: vec![dec!(0.1), dec!(0.2), dec!(0.3), dec!(0.4), dec!(0.5)],
            measures: vec![MeasureRef::Preset("EXTENSIVE".into())],
            buildings: Vec::new(),
            volume_basis: VolumeBasis::default(),
            catalog: MeasureCatalog::new(),
        }
    }
}

impl RunConfig {
    pub fn from_json(s: &str) -> SpongeKitResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Standard catalog with this config's overrides applied.
    pub fn effective_catalog(&self) -> SpongeKitResult<MeasureCatalog> {
        MeasureCatalog::standard().merged(&self.catalog)
    }

    pub fn resolve_measures(&self) -> SpongeKitResult<Vec<SudsMeasureSpec>> {
        if self.measures.is_empty() {
            return Err(SpongeKitError::invalid(
                "measures",
                "At least one measure is required",
            ));
        }
        let catalog = self.effective_catalog()?;
        self.measures
            .iter()
            .map(|m| match m {
                MeasureRef::Preset(name) => catalog.spec(name),
                MeasureRef::Inline(spec) => {
                    spec.validate()?;
                    Ok(spec.clone())
                }
            })
            .collect()
    }

    /// Check every input before any simulation runs.
    pub fn validate(&self) -> SpongeKitResult<()> {
        self.storm.validate()?;
        SurfaceModel::baseline(self.baseline_runoff_coefficient)?;
        validate_coverage_fractions(&self.coverage_fractions)?;
        self.volume_basis.validate()?;

        if self.buildings.is_empty() {
            return Err(SpongeKitError::invalid(
                "buildings",
                "At least one building is required",
            ));
        }
        let mut seen = BTreeSet::new();
        for b in &self.buildings {
            b.validate()?;
            if !seen.insert(b.id.as_str()) {
                return Err(SpongeKitError::invalid(
                    "buildings",
                    format!("Duplicate building id '{}'", b.id),
                ));
            }
        }

        self.resolve_measures()?;
        Ok(())
    }

    /// Whether the coverage list is in ascending order.
    pub fn fractions_sorted(&self) -> bool {
        self.coverage_fractions.windows(2).all(|w| w[0] <= w[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let cfg = RunConfig::from_json(
            r#"{"buildings":[{"id":"b1","roof_area_m2":"1000"}]}"#,
        )
        .unwrap();
        assert_eq!(cfg.storm.total_depth(), dec!(50));
        assert_eq!(cfg.baseline_runoff_coefficient, dec!(0.9));
        assert_eq!(cfg.coverage_fractions.len(), 5);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_measure_refs_resolve_presets_and_inline() {
        let cfg = RunConfig::from_json(
            r#"{
                "buildings":[{"id":"b1","roof_area_m2":"500"}],
                "measures":[
                    "INTENSIVE",
                    {"name":"CUSTOM","measure_type":"permeable_pavement","runoff_coefficient":"0.4",
                     "retention_capacity_mm":"10","capex_per_m2":"80","opex_per_m2_per_year":"1",
                     "lifetime_years":20,"discount_rate":"0.05"}
                ]
            }"#,
        )
        .unwrap();
        let measures = cfg.resolve_measures().unwrap();
        assert_eq!(measures.len(), 2);
        assert_eq!(measures[0].label(), "INTENSIVE");
        assert_eq!(measures[1].label(), "CUSTOM");
        assert_eq!(measures[1].lifetime_years, 20);
    }

    #[test]
    fn test_catalog_overrides_apply() {
        let cfg = RunConfig::from_json(
            r#"{
                "buildings":[{"id":"b1","roof_area_m2":"500"}],
                "measures":["BLUE"],
                "catalog":{"BLUE":{"measure_type":"green_roof","runoff_coefficient":"0.2",
                    "retention_capacity_mm":"60","capex_per_m2":"400","opex_per_m2_per_year":"6",
                    "lifetime_years":40,"discount_rate":"0.035"}}
            }"#,
        )
        .unwrap();
        let measures = cfg.resolve_measures().unwrap();
        assert_eq!(measures[0].retention_capacity_mm, dec!(60));
        assert_eq!(measures[0].label(), "BLUE");
    }

    #[test]
    fn test_validate_rejects_bad_config() {
        let mut cfg = RunConfig::default();
        assert!(cfg.validate().is_err());

        cfg.buildings = vec![
            Building::new("b1", dec!(10)).unwrap(),
            Building::new("b1", dec!(20)).unwrap(),
        ];
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("Duplicate"));

        cfg.buildings.pop();
        cfg.coverage_fractions.push(dec!(2));
        assert!(cfg.validate().is_err());

        cfg.coverage_fractions.pop();
        cfg.measures = vec![MeasureRef::Preset("UNKNOWN".into())];
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_fraction_order_detection() {
        let mut cfg = RunConfig::default();
        assert!(cfg.fractions_sorted());
        cfg.coverage_fractions = vec![dec!(0.5), dec!(0.1)];
        assert!(!cfg.fractions_sorted());
    }
}
