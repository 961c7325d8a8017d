use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use spongekit_core::hydrology::storm::StormEvent;
use spongekit_core::hydrology::surface::SurfaceModel;
use spongekit_core::measures::catalog::MeasureCatalog;

use crate::input;

/// Arguments for a single surface simulation
#[derive(Args)]
pub struct SimulateArgs {
    /// Surface area in m²
    #[arg(long)]
    pub area: Decimal,

    /// Single-pulse storm depth in mm
    #[arg(long)]
    pub depth: Option<Decimal>,

    /// Hyetograph CSV (minutes, mm_per_min) instead of --depth
    #[arg(long)]
    pub hyetograph: Option<String>,

    /// Measure preset (e.g. EXTENSIVE); omit for the impervious baseline
    #[arg(long)]
    pub measure: Option<String>,

    /// Baseline roof runoff coefficient
    #[arg(long, default_value = "0.9")]
    pub runoff_coefficient: Decimal,
}

pub fn run_simulate(args: SimulateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let storm = match (&args.hyetograph, args.depth) {
        (Some(path), _) => input::hyetograph::read_storm(path)?,
        (None, Some(depth)) => StormEvent::single_pulse(depth)?,
        (None, None) => StormEvent::single_pulse(dec!(50))?,
    };

    let model = match &args.measure {
        Some(name) => MeasureCatalog::standard().spec(name)?.surface_model(),
        None => SurfaceModel::baseline(args.runoff_coefficient)?,
    };

    simulate_surface(&model, args.area, &storm)
}

/// One simulation plus the storm descriptors, as the command's JSON result.
fn simulate_surface(
    model: &SurfaceModel,
    area: Decimal,
    storm: &StormEvent,
) -> Result<Value, Box<dyn std::error::Error>> {
    let response = model.simulate(area, storm)?;
    let rainfall = storm.rainfall_volume(area)?;
    let retained_share = if rainfall.is_zero() {
        Decimal::ZERO
    } else {
        response.retained_m3 / rainfall * Decimal::ONE_HUNDRED
    };

    Ok(json!({
        "result": {
            "model": model.label(),
            "area_m2": area,
            "total_depth_mm": storm.total_depth(),
            "peak_step_depth_mm": storm.peak_step_depth(),
            "duration_minutes": storm.duration_minutes(),
            "rainfall_m3": rainfall,
            "runoff_m3": response.runoff_m3,
            "retained_m3": response.retained_m3,
            "retained_pct_of_rainfall": retained_share.round_dp(2),
            "saturated_at_step": response.saturated_at_step,
        }
    }))
}
