pub mod sweep;

#[cfg(feature = "portfolio")]
pub mod selection;
