use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Rainfall or storage depth in millimetres.
pub type Depth = Decimal;

/// Plan area in square metres.
pub type Area = Decimal;

/// Water volume in cubic metres.
pub type Volume = Decimal;

/// Dimensionless fraction in [0, 1] (runoff coefficients, coverage).
pub type Coefficient = Decimal;

/// Rates expressed as decimals (0.03 = 3%). Never as percentages.
pub type Rate = Decimal;

/// All monetary values, in whatever currency the measure catalog uses.
pub type Money = Decimal;

/// Millimetres per metre; depths are divided by this before multiplying by area.
pub const MM_PER_M: Decimal = Decimal::ONE_THOUSAND;

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
