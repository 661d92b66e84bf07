//! Shared pipeline logic used by the `run`, `clean`, and `forecast` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> clean -> fit per province -> forecast -> concatenate -> export.
//!
//! The command handlers then focus on presentation and file placement.

use std::path::Path;

use crate::clean::{clean_case_series, clean_price_series};
use crate::cli::RunArgs;
use crate::data::CaseFeed;
use crate::domain::{Dataset, RegionRegistry, SeriesKind};
use crate::error::{AppError, ErrorKind};
use crate::forecast::{self, RegionalForecast, TRAINING_MONTHS};
use crate::io::ingest::{self, RowError};

/// A cleaned series together with its ingest bookkeeping.
///
/// `label` names the series in summaries and file names; it is a series kind
/// name for the built-in tables and a file stem for ad-hoc `forecast` inputs,
/// so it never pretends to be a kind the data is not.
#[derive(Debug, Clone)]
pub struct CleanedSeries {
    pub label: String,
    pub is_case_series: bool,
    pub cleaned: Dataset,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// One series carried end to end: cleaned rows, per-province fits, and the
/// cleaned+forecast concatenation written as the `_full` table.
#[derive(Debug, Clone)]
pub struct SeriesOutput {
    pub series: CleanedSeries,
    pub forecast: RegionalForecast,
    pub full: Dataset,
}

/// Load and clean one raw price table.
///
/// `scale` is normally `kind.scale()`; the `clean` command lets the caller
/// override it.
pub fn clean_price_from_path(
    kind: SeriesKind,
    path: &Path,
    scale: f64,
    registry: &RegionRegistry,
) -> Result<CleanedSeries, AppError> {
    let filter = kind.category_filter().ok_or_else(|| {
        AppError::new(
            ErrorKind::InvalidArgument,
            "The case series has no price table; use clean_cases_from_source.",
        )
    })?;

    let table = ingest::load_price_rows(path)?;
    let cleaned = clean_price_series(&table.rows, filter, scale, registry)?;
    Ok(CleanedSeries {
        label: kind.name().to_string(),
        is_case_series: false,
        cleaned,
        row_errors: table.row_errors,
        rows_read: table.rows_read,
    })
}

/// Load and clean the case feed, from a local file when given and from the
/// upstream URL otherwise.
pub fn clean_cases_from_source(
    path: Option<&Path>,
    registry: &RegionRegistry,
) -> Result<CleanedSeries, AppError> {
    let table = match path {
        Some(path) => ingest::load_case_rows(path)?,
        None => {
            let feed = CaseFeed::from_env();
            let body = feed.fetch_csv()?;
            ingest::read_case_rows(body.as_bytes())?
        }
    };

    let cleaned = clean_case_series(&table.rows, registry);
    Ok(CleanedSeries {
        label: SeriesKind::Cases.name().to_string(),
        is_case_series: true,
        cleaned,
        row_errors: table.row_errors,
        rows_read: table.rows_read,
    })
}

/// Fit and forecast one cleaned series against the fixed training window.
///
/// The predictor index always spans `TRAINING_MONTHS` offsets; a series whose
/// regions carry a different number of months fails with `ShapeMismatch`
/// naming the region, rather than silently extrapolating from a misaligned
/// index.
pub fn forecast_series(
    series: CleanedSeries,
    registry: &RegionRegistry,
) -> Result<SeriesOutput, AppError> {
    let index = forecast::training_index(TRAINING_MONTHS)?;
    let forecast = forecast::forecast_four_periods(
        &series.cleaned,
        &index,
        series.is_case_series,
        registry,
    )?;
    let full = series.cleaned.concat(&forecast.forecast);
    Ok(SeriesOutput {
        series,
        forecast,
        full,
    })
}

/// Clean and forecast every series named by a `run` invocation, in the fixed
/// processing order: receipt, food, utensil, cases.
pub fn run_all(args: &RunArgs, registry: &RegionRegistry) -> Result<Vec<SeriesOutput>, AppError> {
    let mut outputs = Vec::with_capacity(SeriesKind::PRICE_KINDS.len() + 1);

    for kind in SeriesKind::PRICE_KINDS {
        let path = args.data_dir.join(kind.file_name());
        let series = clean_price_from_path(kind, &path, kind.scale(), registry)?;
        outputs.push(forecast_series(series, registry)?);
    }

    let series = clean_cases_from_source(args.cases.as_deref(), registry)?;
    outputs.push(forecast_series(series, registry)?);

    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{generate_case_panel, generate_price_panel, SampleConfig};
    use crate::forecast::FUTURE_OFFSETS;

    fn sample_config() -> SampleConfig {
        SampleConfig {
            seed: 7,
            missing_rate: 0.1,
            ..SampleConfig::default()
        }
    }

    fn cleaned_price_series(kind: SeriesKind) -> CleanedSeries {
        let registry = RegionRegistry::canadian_provinces();
        let rows = generate_price_panel(kind, 98.0, 0.4, &sample_config()).unwrap();
        let rows_read = rows.len();
        let cleaned = clean_price_series(
            &rows,
            kind.category_filter().unwrap(),
            kind.scale(),
            &registry,
        )
        .unwrap();
        CleanedSeries {
            label: kind.name().to_string(),
            is_case_series: false,
            cleaned,
            row_errors: Vec::new(),
            rows_read,
        }
    }

    #[test]
    fn price_series_forecast_covers_every_province() {
        let registry = RegionRegistry::canadian_provinces();
        let out = forecast_series(cleaned_price_series(SeriesKind::Food), &registry).unwrap();

        assert_eq!(out.forecast.fits.len(), 10);
        assert_eq!(out.forecast.forecast.len(), 40);
        assert_eq!(
            out.full.len(),
            out.series.cleaned.len() + out.forecast.forecast.len()
        );

        // Every province gets the same four reference-date periods.
        for region in registry.names() {
            let rows = out.forecast.forecast.restrict_to_region(region);
            let periods: Vec<&str> = rows.rows.iter().map(|o| o.period.as_str()).collect();
            assert_eq!(periods, vec!["2021-10", "2021-11", "2021-12", "2022-1"]);
        }
    }

    #[test]
    fn case_series_forecast_uses_report_date_periods() {
        let registry = RegionRegistry::canadian_provinces();
        let rows = generate_case_panel(&sample_config()).unwrap();
        let rows_read = rows.len();
        let cleaned = clean_case_series(&rows, &registry);
        let series = CleanedSeries {
            label: SeriesKind::Cases.name().to_string(),
            is_case_series: true,
            cleaned,
            row_errors: Vec::new(),
            rows_read,
        };

        let out = forecast_series(series, &registry).unwrap();
        assert_eq!(out.forecast.forecast.len(), 4 * 10);
        assert!(out
            .forecast
            .forecast
            .rows
            .iter()
            .all(|o| o.period.starts_with("25-")));
        // The four forecast offsets continue the training window.
        assert_eq!(FUTURE_OFFSETS[0], TRAINING_MONTHS);
    }

    #[test]
    fn forecast_keeps_the_series_label() {
        // A receipt table forecast from a cleaned file must stay labeled as
        // receipts, not fall back to some default series name.
        let registry = RegionRegistry::canadian_provinces();
        let mut series = cleaned_price_series(SeriesKind::Receipt);
        series.label = "receipt_clean".to_string();

        let out = forecast_series(series, &registry).unwrap();
        assert_eq!(out.series.label, "receipt_clean");
        assert!(!out.series.is_case_series);
        assert!(out
            .forecast
            .forecast
            .rows
            .iter()
            .all(|o| o.period.starts_with("202")));
    }

    #[test]
    fn a_short_series_fails_naming_the_region() {
        let registry = RegionRegistry::canadian_provinces();
        let mut series = cleaned_price_series(SeriesKind::Utensil);
        // Drop Alberta's last month so its window no longer matches the index.
        let idx = series
            .cleaned
            .rows
            .iter()
            .rposition(|o| o.region == "Alberta")
            .unwrap();
        series.cleaned.rows.remove(idx);

        let err = forecast_series(series, &registry).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
        assert!(err.to_string().contains("Alberta"));
    }
}
