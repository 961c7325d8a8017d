use clap::Args;
use serde_json::Value;

use spongekit_core::run;

use crate::commands::sweep::load_config;

/// Arguments for largest-first portfolio selection
#[derive(Args)]
pub struct PortfolioArgs {
    /// Path to a JSON or YAML run configuration
    #[arg(long)]
    pub input: Option<String>,

    /// Hyetograph CSV (minutes, mm_per_min) replacing the configured storm
    #[arg(long)]
    pub hyetograph: Option<String>,
}

pub fn run_portfolio(args: PortfolioArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = load_config(args.input.as_deref(), args.hyetograph.as_deref())?;
    let result = run::run_portfolio(&config)?;
    Ok(serde_json::to_value(result)?)
}
