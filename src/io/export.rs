//! Export cleaned and forecast series to CSV.
//!
//! The exports mirror the 3-column schema the ingest side reads back, so a
//! cleaned file can be fed straight into `forecast`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::{Dataset, Observation};
use crate::error::{AppError, ErrorKind};

/// Column header for the period, matching the raw table the series came from.
fn period_header(is_case_series: bool) -> &'static str {
    if is_case_series {
        "date_report"
    } else {
        "REF_DATE"
    }
}

/// Write a series as `period,GEO,VALUE` rows.
pub fn write_series_csv(
    path: &Path,
    dataset: &Dataset,
    is_case_series: bool,
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| create_error(path, e))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "{},GEO,VALUE", period_header(is_case_series))
        .map_err(|e| write_error(path, e))?;
    for obs in &dataset.rows {
        writeln!(out, "{},{},{}", obs.period, obs.region, obs.value)
            .map_err(|e| write_error(path, e))?;
    }

    Ok(())
}

/// Write a series with the map-rendering region id as a fourth column.
pub fn write_series_with_ids_csv(
    path: &Path,
    rows: &[(Observation, i64)],
    is_case_series: bool,
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| create_error(path, e))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "{},GEO,VALUE,id", period_header(is_case_series))
        .map_err(|e| write_error(path, e))?;
    for (obs, id) in rows {
        writeln!(out, "{},{},{},{}", obs.period, obs.region, obs.value, id)
            .map_err(|e| write_error(path, e))?;
    }

    Ok(())
}

fn create_error(path: &Path, e: std::io::Error) -> AppError {
    AppError::new(
        ErrorKind::Io,
        format!("Failed to create CSV '{}': {e}", path.display()),
    )
}

fn write_error(path: &Path, e: std::io::Error) -> AppError {
    AppError::new(
        ErrorKind::Io,
        format!("Failed to write CSV '{}': {e}", path.display()),
    )
}
