pub mod aggregate;
pub mod summary;
