//! Region-id table used to key map rendering.
//!
//! The id table is a small curated file (one row per province mapping the
//! canonical name to the geojson feature id), so unlike the bulk feeds any
//! bad row here is fatal rather than skipped.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::domain::{Dataset, Observation};
use crate::error::{AppError, ErrorKind};
use crate::io::ingest::{build_header_map, csv_reader, get_required, read_headers};

/// Load a `region,id` (or `geo,id`) table.
pub fn load_region_ids(path: &Path) -> Result<HashMap<String, i64>, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            ErrorKind::Io,
            format!("Failed to open region-id table '{}': {e}", path.display()),
        )
    })?;
    read_region_ids(file)
}

/// Read a region-id table from any reader.
pub fn read_region_ids<R: Read>(rdr: R) -> Result<HashMap<String, i64>, AppError> {
    let mut reader = csv_reader(rdr);
    let headers = read_headers(&mut reader)?;
    let header_map = build_header_map(&headers);

    let name_column = if header_map.contains_key("region") {
        "region"
    } else if header_map.contains_key("geo") {
        "geo"
    } else {
        return Err(AppError::new(
            ErrorKind::Schema,
            "Region-id tables need a `region` or `geo` column.",
        ));
    };
    if !header_map.contains_key("id") {
        return Err(AppError::new(
            ErrorKind::Schema,
            "Missing required column: `id`",
        ));
    }

    let mut ids = HashMap::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result.map_err(|e| {
            AppError::new(ErrorKind::Schema, format!("CSV parse error on line {line}: {e}"))
        })?;

        let region = get_required(&record, &header_map, name_column)
            .map_err(|message| schema_on_line(line, message))?
            .to_string();
        let raw = get_required(&record, &header_map, "id")
            .map_err(|message| schema_on_line(line, message))?;
        let id: i64 = raw.parse().map_err(|_| {
            AppError::new(
                ErrorKind::Schema,
                format!("Invalid `id` value '{raw}' on line {line}."),
            )
        })?;
        ids.insert(region, id);
    }

    Ok(ids)
}

/// Pair every observation with its region id. Fails when a region has no id.
pub fn attach_region_ids(
    dataset: &Dataset,
    ids: &HashMap<String, i64>,
) -> Result<Vec<(Observation, i64)>, AppError> {
    dataset
        .rows
        .iter()
        .map(|obs| {
            let id = ids.get(&obs.region).copied().ok_or_else(|| {
                AppError::new(
                    ErrorKind::UnknownRegion,
                    format!("Region '{}' has no id in the region-id table.", obs.region),
                )
            })?;
            Ok((obs.clone(), id))
        })
        .collect()
}

fn schema_on_line(line: usize, message: String) -> AppError {
    AppError::new(ErrorKind::Schema, format!("Line {line}: {message}"))
}
