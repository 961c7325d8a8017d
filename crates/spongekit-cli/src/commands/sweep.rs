use clap::Args;
use serde_json::Value;
use tracing::debug;

use spongekit_core::config::RunConfig;
use spongekit_core::run;

use crate::input;

/// Arguments for a coverage sweep
#[derive(Args)]
pub struct SweepArgs {
    /// Path to a JSON or YAML run configuration
    #[arg(long)]
    pub input: Option<String>,

    /// Hyetograph CSV (minutes, mm_per_min) replacing the configured storm
    #[arg(long)]
    pub hyetograph: Option<String>,
}

/// Load the run configuration from `--input` or stdin and apply a CSV storm if given.
pub fn load_config(
    input_path: Option<&str>,
    hyetograph: Option<&str>,
) -> Result<RunConfig, Box<dyn std::error::Error>> {
    let mut config: RunConfig = if let Some(path) = input_path {
        input::file::read_config(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <run.json|run.yaml> or stdin required for a sweep".into());
    };

    if let Some(path) = hyetograph {
        config.storm = input::hyetograph::read_storm(path)?;
        debug!(path, steps = config.storm.step_count(), "storm replaced from hyetograph");
    }
    debug!(
        buildings = config.buildings.len(),
        measures = config.measures.len(),
        fractions = config.coverage_fractions.len(),
        "run configuration loaded"
    );
    Ok(config)
}

pub fn run_sweep(args: SweepArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = load_config(args.input.as_deref(), args.hyetograph.as_deref())?;
    let result = run::run(&config)?;
    Ok(serde_json::to_value(result)?)
}
