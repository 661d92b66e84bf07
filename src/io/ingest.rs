//! CSV ingest and normalization.
//!
//! This module turns the raw Statistics Canada price tables and the daily
//! case feed into typed rows that are safe to clean and fit.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Separation of concerns**: no cleaning or fitting logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{CaseRow, Dataset, Observation, PriceRow};
use crate::error::{AppError, ErrorKind};

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: typed rows + row errors.
#[derive(Debug, Clone)]
pub struct IngestedTable<T> {
    pub rows: Vec<T>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// A previously cleaned series read back from disk.
#[derive(Debug, Clone)]
pub struct CleanTable {
    pub dataset: Dataset,
    pub is_case_series: bool,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Column index of the product category in the raw price tables. The header
/// name varies per table, so the column is addressed by position.
const CATEGORY_COLUMN: usize = 3;

/// Load a raw price table (REF_DATE, GEO, ..., category, ..., VALUE).
pub fn load_price_rows(path: &Path) -> Result<IngestedTable<PriceRow>, AppError> {
    let file = open_csv(path)?;
    read_price_rows(file)
}

/// Read a raw price table from any reader.
pub fn read_price_rows<R: Read>(rdr: R) -> Result<IngestedTable<PriceRow>, AppError> {
    let mut reader = csv_reader(rdr);
    let headers = read_headers(&mut reader)?;
    let header_map = build_header_map(&headers);

    for name in ["ref_date", "geo", "value"] {
        if !header_map.contains_key(name) {
            return Err(missing_column(name));
        }
    }
    if headers.len() <= CATEGORY_COLUMN {
        return Err(AppError::new(
            ErrorKind::Schema,
            format!(
                "Price tables carry the product category in column {}; found only {} columns.",
                CATEGORY_COLUMN + 1,
                headers.len()
            ),
        ));
    }

    collect_rows(&mut reader, |record| {
        parse_price_row(record, &header_map)
    })
}

/// Load the raw case feed (province, date_report, cases).
pub fn load_case_rows(path: &Path) -> Result<IngestedTable<CaseRow>, AppError> {
    let file = open_csv(path)?;
    read_case_rows(file)
}

/// Read the raw case feed from any reader.
pub fn read_case_rows<R: Read>(rdr: R) -> Result<IngestedTable<CaseRow>, AppError> {
    let mut reader = csv_reader(rdr);
    let headers = read_headers(&mut reader)?;
    let header_map = build_header_map(&headers);

    for name in ["province", "date_report", "cases"] {
        if !header_map.contains_key(name) {
            return Err(missing_column(name));
        }
    }

    collect_rows(&mut reader, |record| parse_case_row(record, &header_map))
}

/// Load a cleaned series written by this tool (or anything matching its
/// 3-column schema). Case series are recognized by their `date_report`
/// period column; price series use `ref_date`.
pub fn load_clean_series(path: &Path) -> Result<CleanTable, AppError> {
    let file = open_csv(path)?;
    read_clean_series(file)
}

/// Read a cleaned series from any reader.
pub fn read_clean_series<R: Read>(rdr: R) -> Result<CleanTable, AppError> {
    let mut reader = csv_reader(rdr);
    let headers = read_headers(&mut reader)?;
    let header_map = build_header_map(&headers);

    let (period_column, is_case_series) = if header_map.contains_key("date_report") {
        ("date_report", true)
    } else if header_map.contains_key("ref_date") {
        ("ref_date", false)
    } else {
        return Err(AppError::new(
            ErrorKind::Schema,
            "Cleaned series need a `ref_date` or `date_report` period column.",
        ));
    };
    for name in ["geo", "value"] {
        if !header_map.contains_key(name) {
            return Err(missing_column(name));
        }
    }

    let table = collect_rows(&mut reader, |record| {
        let period = get_required(record, &header_map, period_column)?.to_string();
        let region = get_required(record, &header_map, "geo")?.to_string();
        let value = parse_f64("value", get_required(record, &header_map, "value")?)?;
        Ok(Observation {
            period,
            region,
            value,
        })
    })?;

    Ok(CleanTable {
        dataset: Dataset::new(table.rows),
        is_case_series,
        row_errors: table.row_errors,
        rows_read: table.rows_read,
    })
}

fn open_csv(path: &Path) -> Result<File, AppError> {
    File::open(path).map_err(|e| {
        AppError::new(
            ErrorKind::Io,
            format!("Failed to open CSV '{}': {e}", path.display()),
        )
    })
}

pub(crate) fn csv_reader<R: Read>(rdr: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(rdr)
}

pub(crate) fn read_headers<R: Read>(reader: &mut csv::Reader<R>) -> Result<StringRecord, AppError> {
    Ok(reader
        .headers()
        .map_err(|e| {
            AppError::new(ErrorKind::Schema, format!("Failed to read CSV headers: {e}"))
        })?
        .clone())
}

fn collect_rows<R, T, F>(reader: &mut csv::Reader<R>, parse: F) -> Result<IngestedTable<T>, AppError>
where
    R: Read,
    F: Fn(&StringRecord) -> Result<T, String>,
{
    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse(&record) {
            Ok(row) => rows.push(row),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if rows.is_empty() {
        return Err(AppError::new(
            ErrorKind::InsufficientData,
            "No valid rows remain after ingest.",
        ));
    }

    Ok(IngestedTable {
        rows,
        row_errors,
        rows_read,
    })
}

fn parse_price_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
) -> Result<PriceRow, String> {
    let ref_date = get_required(record, header_map, "ref_date")?.to_string();
    let geo = get_required(record, header_map, "geo")?.to_string();
    let category = record
        .get(CATEGORY_COLUMN)
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    // An absent or empty VALUE cell is a missing observation, not an error;
    // the cleaner imputes it later.
    let value = match get_optional(record, header_map, "value") {
        Some(raw) => Some(parse_f64("value", raw)?),
        None => None,
    };

    Ok(PriceRow {
        ref_date,
        geo,
        category,
        value,
    })
}

fn parse_case_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
) -> Result<CaseRow, String> {
    let province = get_required(record, header_map, "province")?.to_string();
    let date_report = get_required(record, header_map, "date_report")?.to_string();
    let cases = parse_f64("cases", get_required(record, header_map, "cases")?)?;

    Ok(CaseRow {
        province,
        date_report,
        cases,
    })
}

pub(crate) fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "﻿REF_DATE"). If we don't strip it, schema validation
    // will incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn missing_column(name: &str) -> AppError {
    AppError::new(ErrorKind::Schema, format!("Missing required column: `{name}`"))
}

pub(crate) fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_f64(name: &str, raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("Invalid `{name}` value '{raw}'."))?;
    if !value.is_finite() {
        return Err(format!("Non-finite `{name}` value '{raw}'."));
    }
    Ok(value)
}
