//! External data acquisition and synthetic sample generation.

pub mod remote;
pub mod sample;

pub use remote::*;
pub use sample::*;
