//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the canonical region set and alias table (`RegionRegistry`)
//! - month-offset to period-string conversion (`period`)
//! - raw rows and the cleaned `Observation`/`Dataset` records

pub mod period;
pub mod region;
pub mod types;

pub use period::*;
pub use region::*;
pub use types::*;
