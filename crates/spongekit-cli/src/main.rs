mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::catalog::CatalogArgs;
use commands::portfolio::PortfolioArgs;
use commands::simulate::SimulateArgs;
use commands::sweep::SweepArgs;

/// Roof runoff and SuDS retrofit scenarios
#[derive(Parser)]
#[command(
    name = "spongekit",
    version,
    about = "Roof runoff and SuDS retrofit scenarios",
    long_about = "Estimates storm runoff from building roofs and compares impervious roofs \
                  against green roof and permeable pavement retrofits across coverage levels, \
                  with lifecycle cost per cubic metre retained."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log filter used when RUST_LOG is unset (e.g. "info", "spongekit_core=debug")
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Log line format on stderr
    #[arg(long, default_value = "text", global = true)]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Sweep coverage fractions for every building and measure
    Sweep(SweepArgs),
    /// Retrofit whole buildings largest-first to reach each coverage fraction
    Portfolio(PortfolioArgs),
    /// Simulate one surface under one storm
    Simulate(SimulateArgs),
    /// List the standard measure presets
    Catalog(CatalogArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn init_logging(level: &str, format: &LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let fmt = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => fmt.json().init(),
        LogFormat::Text => fmt.init(),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level, &cli.log_format);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Sweep(args) => commands::sweep::run_sweep(args),
        Commands::Portfolio(args) => commands::portfolio::run_portfolio(args),
        Commands::Simulate(args) => commands::simulate::run_simulate(args),
        Commands::Catalog(args) => commands::catalog::run_catalog(args),
        Commands::Version => {
            println!("spongekit {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
