//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - series exports (`export`)
//! - region-id table (`ids`)
//! - model JSON read/write (`model_file`)

pub mod export;
pub mod ids;
pub mod ingest;
pub mod model_file;

pub use export::*;
pub use ids::*;
pub use ingest::*;
pub use model_file::*;
