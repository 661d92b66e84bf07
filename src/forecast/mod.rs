//! Line fitting and per-region forecasting.

pub mod line;
pub mod regional;

pub use line::LineFit;
pub use regional::*;
