//! Read/write model JSON files.
//!
//! Model JSON is the "portable" representation of a series' fits:
//! - one slope/intercept/r2 triple per region
//! - run metadata (series name, training window)
//!
//! `forecast` writes one next to its CSV output; `models` reads it back for
//! display without refitting.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorKind};
use crate::forecast::RegionFit;

/// Persisted per-series fit parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsFile {
    pub tool: String,
    pub series: String,
    pub training_periods: i64,
    pub fits: Vec<RegionFit>,
}

impl ModelsFile {
    pub fn new(series: impl Into<String>, training_periods: i64, fits: Vec<RegionFit>) -> Self {
        ModelsFile {
            tool: "provcast".to_string(),
            series: series.into(),
            training_periods,
            fits,
        }
    }
}

/// Write a model JSON file.
pub fn write_models_json(path: &Path, models: &ModelsFile) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            ErrorKind::Io,
            format!("Failed to create model JSON '{}': {e}", path.display()),
        )
    })?;

    serde_json::to_writer_pretty(file, models)
        .map_err(|e| AppError::new(ErrorKind::Io, format!("Failed to write model JSON: {e}")))?;

    Ok(())
}

/// Read a model JSON file.
pub fn read_models_json(path: &Path) -> Result<ModelsFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            ErrorKind::Io,
            format!("Failed to open model JSON '{}': {e}", path.display()),
        )
    })?;
    let models: ModelsFile = serde_json::from_reader(file)
        .map_err(|e| AppError::new(ErrorKind::Schema, format!("Invalid model JSON: {e}")))?;
    Ok(models)
}
