use clap::Args;
use serde_json::Value;

use spongekit_core::measures::catalog::MeasureCatalog;

/// Arguments for listing presets
#[derive(Args)]
pub struct CatalogArgs {
    /// Show a single preset
    #[arg(long)]
    pub name: Option<String>,
}

pub fn run_catalog(args: CatalogArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let catalog = MeasureCatalog::standard();
    match args.name {
        Some(name) => Ok(serde_json::to_value(catalog.spec(&name)?)?),
        None => {
            let presets: Vec<_> = catalog.iter().map(|(_, spec)| spec).collect();
            Ok(serde_json::to_value(presets)?)
        }
    }
}
