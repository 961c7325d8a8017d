pub mod storm;
pub mod surface;
