//! Cleaning passes that turn raw tables into per-province monthly series.

pub mod cases;
pub mod series;

pub use cases::*;
pub use series::*;
