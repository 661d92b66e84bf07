//! Mathematical utilities: least squares fitting and goodness of fit.

pub mod ols;

pub use ols::*;
