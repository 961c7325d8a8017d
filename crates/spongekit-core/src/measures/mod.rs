pub mod catalog;
pub mod measure;
