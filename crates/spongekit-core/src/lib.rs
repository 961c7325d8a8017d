pub mod config;
pub mod costing;
pub mod error;
pub mod hydrology;
pub mod measures;
pub mod reporting;
pub mod run;
pub mod scenarios;
pub mod time_value;
pub mod types;

pub use error::SpongeKitError;
pub use types::*;

/// Standard result type for all spongekit operations
pub type SpongeKitResult<T> = Result<T, SpongeKitError>;
