pub mod catalog;
pub mod portfolio;
pub mod simulate;
pub mod sweep;
