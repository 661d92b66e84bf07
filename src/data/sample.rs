//! Synthetic sample tables for exercising the pipeline offline.
//!
//! The generator mirrors the shape of the real inputs:
//! - price tables in the StatCan layout (`REF_DATE,GEO,DGUID,Products,UOM,VALUE`)
//!   with padded months, a territory row, a second product category, and a
//!   configurable share of empty VALUE cells,
//! - a case feed with day-25 and off-day rows, alias codes, the Repatriated
//!   bucket, and the two trimmed trailing dates,
//! - a region-id table covering the ten provinces.
//!
//! Generation is deterministic for a given config.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{CaseRow, PriceRow, RegionRegistry, SeriesKind};
use crate::error::{AppError, ErrorKind};

/// Region labels as the real case feed spells them: full names, alias codes,
/// territories, and the Repatriated bucket.
const FEED_REGIONS: [&str; 14] = [
    "Alberta",
    "BC",
    "Manitoba",
    "New Brunswick",
    "NL",
    "NWT",
    "Nova Scotia",
    "Nunavut",
    "Ontario",
    "PEI",
    "Quebec",
    "Repatriated",
    "Saskatchewan",
    "Yukon",
];

#[derive(Debug, Clone)]
pub struct SampleConfig {
    /// Months of data to generate, counted from January 2020. Capped at the
    /// training window so sample periods never collide with forecast periods.
    pub months: i64,
    pub seed: u64,
    /// Probability that a price cell is left empty.
    pub missing_rate: f64,
    /// Standard deviation of the additive noise on every value.
    pub noise_std: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            months: 21,
            seed: 0,
            missing_rate: 0.05,
            noise_std: 2.0,
        }
    }
}

fn validate(config: &SampleConfig) -> Result<(), AppError> {
    if !(1..=21).contains(&config.months) {
        return Err(AppError::new(
            ErrorKind::InvalidArgument,
            "Sample months must be between 1 and 21.",
        ));
    }
    if !(0.0..1.0).contains(&config.missing_rate) {
        return Err(AppError::new(
            ErrorKind::InvalidArgument,
            "Missing rate must be in [0, 1).",
        ));
    }
    if !config.noise_std.is_finite() || config.noise_std < 0.0 {
        return Err(AppError::new(
            ErrorKind::InvalidArgument,
            "Noise std must be finite and >= 0.",
        ));
    }
    Ok(())
}

/// Generate one raw price table with `base + trend * month` region levels.
pub fn generate_price_panel(
    kind: SeriesKind,
    base: f64,
    trend: f64,
    config: &SampleConfig,
) -> Result<Vec<PriceRow>, AppError> {
    let Some(category) = kind.category_filter() else {
        return Err(AppError::new(
            ErrorKind::InvalidArgument,
            "The case series has no price panel; use generate_case_panel.",
        ));
    };
    validate(config)?;

    let mut rng = StdRng::seed_from_u64(panel_seed(kind.name(), config));
    let noise = Normal::new(0.0, config.noise_std).map_err(|e| {
        AppError::new(ErrorKind::InvalidArgument, format!("Noise distribution error: {e}"))
    })?;

    let registry = RegionRegistry::canadian_provinces();
    let mut rows = Vec::new();

    for offset in 0..config.months {
        let ref_date = padded_ref_date(offset);

        for (idx, region) in registry.names().iter().enumerate() {
            let level = base * (1.0 + 0.03 * idx as f64) + trend * offset as f64;
            let sampled = round1(level + noise.sample(&mut rng));
            // The first month always carries a value so every region has a
            // mean to impute from.
            let value = if offset > 0 && rng.r#gen::<f64>() < config.missing_rate {
                None
            } else {
                Some(sampled)
            };
            rows.push(PriceRow {
                ref_date: ref_date.clone(),
                geo: region.to_string(),
                category: category.to_string(),
                value,
            });
        }

        // Rows the cleaner must drop: a territory and a second category.
        rows.push(PriceRow {
            ref_date: ref_date.clone(),
            geo: "Yukon".to_string(),
            category: category.to_string(),
            value: Some(round1(base + noise.sample(&mut rng))),
        });
        rows.push(PriceRow {
            ref_date,
            geo: "Alberta".to_string(),
            category: "Bread".to_string(),
            value: Some(round1(base + noise.sample(&mut rng))),
        });
    }

    Ok(rows)
}

/// Generate the raw case feed with the day-25 snapshots the cleaner keeps and
/// the rows it must drop.
pub fn generate_case_panel(config: &SampleConfig) -> Result<Vec<CaseRow>, AppError> {
    validate(config)?;

    let mut rng = StdRng::seed_from_u64(panel_seed("cases", config));
    let noise = Normal::new(0.0, config.noise_std).map_err(|e| {
        AppError::new(ErrorKind::InvalidArgument, format!("Noise distribution error: {e}"))
    })?;

    let mut rows = Vec::new();
    for offset in 0..config.months {
        let date_report = report_date(offset);
        for (idx, region) in FEED_REGIONS.iter().enumerate() {
            let level = 40.0 * (1.0 + idx as f64) + 25.0 * offset as f64;
            rows.push(CaseRow {
                province: region.to_string(),
                date_report: date_report.clone(),
                cases: count(level + noise.sample(&mut rng)),
            });
        }
    }

    // Off-day rows the prefix check must drop.
    for region in FEED_REGIONS.iter().take(3) {
        rows.push(CaseRow {
            province: region.to_string(),
            date_report: "5-1-2020".to_string(),
            cases: count(10.0 + noise.sample(&mut rng)),
        });
    }

    // The two trailing dates the cleaner trims, present regardless of the
    // configured window.
    for date in ["25-10-2021", "25-11-2021"] {
        for region in FEED_REGIONS.iter() {
            rows.push(CaseRow {
                province: region.to_string(),
                date_report: date.to_string(),
                cases: count(900.0 + noise.sample(&mut rng)),
            });
        }
    }

    Ok(rows)
}

/// Write the full sample set (three price tables, the case feed, and the
/// region-id table) into `dir`. Returns the written paths.
pub fn write_sample_files(dir: &Path, config: &SampleConfig) -> Result<Vec<PathBuf>, AppError> {
    std::fs::create_dir_all(dir).map_err(|e| {
        AppError::new(
            ErrorKind::Io,
            format!("Failed to create sample dir '{}': {e}", dir.display()),
        )
    })?;

    let mut written = Vec::new();

    for kind in SeriesKind::PRICE_KINDS {
        let (base, trend) = price_profile(kind);
        let rows = generate_price_panel(kind, base, trend, config)?;
        let path = dir.join(kind.file_name());
        write_price_csv(&path, &rows)?;
        written.push(path);
    }

    let rows = generate_case_panel(config)?;
    let path = dir.join(SeriesKind::Cases.file_name());
    write_case_csv(&path, &rows)?;
    written.push(path);

    let path = dir.join("region_ids.csv");
    write_region_ids_csv(&path)?;
    written.push(path);

    Ok(written)
}

/// Baseline level and monthly trend per price series. Receipts dropped over
/// the window; the price indexes crept up.
fn price_profile(kind: SeriesKind) -> (f64, f64) {
    match kind {
        SeriesKind::Food => (98.0, 0.4),
        SeriesKind::Receipt => (800_000.0, -5_000.0),
        SeriesKind::Utensil => (102.0, 0.1),
        SeriesKind::Cases => (0.0, 0.0),
    }
}

fn padded_ref_date(offset: i64) -> String {
    format!("{}-{:02}", 2020 + offset / 12, offset % 12 + 1)
}

fn report_date(offset: i64) -> String {
    format!("25-{}-{}", offset % 12 + 1, 2020 + offset / 12)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn count(value: f64) -> f64 {
    value.round().max(0.0)
}

fn panel_seed(label: &str, config: &SampleConfig) -> u64 {
    let mut hasher = DefaultHasher::new();
    label.hash(&mut hasher);
    config.seed.hash(&mut hasher);
    config.months.hash(&mut hasher);
    config.missing_rate.to_bits().hash(&mut hasher);
    config.noise_std.to_bits().hash(&mut hasher);
    hasher.finish()
}

fn write_price_csv(path: &Path, rows: &[PriceRow]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;
    writer
        .write_record(["REF_DATE", "GEO", "DGUID", "Products", "UOM", "VALUE"])
        .map_err(|e| csv_error(path, e))?;
    for row in rows {
        let value = row.value.map(|v| v.to_string()).unwrap_or_default();
        writer
            .write_record([
                row.ref_date.as_str(),
                row.geo.as_str(),
                "",
                row.category.as_str(),
                "Index",
                value.as_str(),
            ])
            .map_err(|e| csv_error(path, e))?;
    }
    flush(path, writer)
}

fn write_case_csv(path: &Path, rows: &[CaseRow]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;
    writer
        .write_record(["province", "date_report", "cases"])
        .map_err(|e| csv_error(path, e))?;
    for row in rows {
        writer
            .write_record([
                row.province.as_str(),
                row.date_report.as_str(),
                &(row.cases as i64).to_string(),
            ])
            .map_err(|e| csv_error(path, e))?;
    }
    flush(path, writer)
}

fn write_region_ids_csv(path: &Path) -> Result<(), AppError> {
    let registry = RegionRegistry::canadian_provinces();
    let mut writer = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;
    writer
        .write_record(["region", "id"])
        .map_err(|e| csv_error(path, e))?;
    for (idx, region) in registry.names().iter().enumerate() {
        writer
            .write_record([*region, &(idx as i64 + 1).to_string()])
            .map_err(|e| csv_error(path, e))?;
    }
    flush(path, writer)
}

fn flush(path: &Path, mut writer: csv::Writer<std::fs::File>) -> Result<(), AppError> {
    writer.flush().map_err(|e| {
        AppError::new(
            ErrorKind::Io,
            format!("Failed to flush sample CSV '{}': {e}", path.display()),
        )
    })
}

fn csv_error(path: &Path, e: csv::Error) -> AppError {
    AppError::new(
        ErrorKind::Io,
        format!("Failed to write sample CSV '{}': {e}", path.display()),
    )
}
