//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - cleans the raw tables (local files or the remote case feed)
//! - fits per-province lines and forecasts the four future months
//! - prints reports/plots
//! - writes the cleaned and forecast CSVs

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::cli::{
    CleanArgs, Command, CorrelateArgs, ForecastArgs, ModelsArgs, RunArgs, SampleArgs,
};
use crate::domain::{Dataset, RegionRegistry};
use crate::error::{AppError, ErrorKind};
use crate::forecast::{self, TRAINING_MONTHS};
use crate::io::model_file::ModelsFile;

pub mod pipeline;

/// Entry point for the `provcast` binary.
pub fn run() -> Result<(), AppError> {
    // We want a bare `provcast` (and `provcast --data-dir d`) to behave like
    // `provcast run ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Clean(args) => handle_clean(args),
        Command::Forecast(args) => handle_forecast(args),
        Command::Correlate(args) => handle_correlate(args),
        Command::Models(args) => handle_models(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let registry = RegionRegistry::canadian_provinces();
    ensure_dir(&args.out_dir)?;

    let ids = match &args.ids {
        Some(path) => Some(crate::io::ids::load_region_ids(path)?),
        None => None,
    };

    let outputs = pipeline::run_all(&args, &registry)?;
    for output in &outputs {
        let name = output.series.label.as_str();
        let is_case = output.series.is_case_series;

        let clean_path = args.out_dir.join(format!("{name}_clean.csv"));
        crate::io::export::write_series_csv(&clean_path, &output.series.cleaned, is_case)?;

        let full_path = args.out_dir.join(format!("{name}_full.csv"));
        write_full(&full_path, &output.full, is_case, ids.as_ref())?;

        println!(
            "{}",
            crate::report::format_series_summary(
                name,
                output.series.rows_read,
                &output.series.row_errors,
                &output.series.cleaned,
                &output.forecast.fits,
            )
        );
        println!("Wrote {} and {}", clean_path.display(), full_path.display());
    }

    Ok(())
}

fn handle_clean(args: CleanArgs) -> Result<(), AppError> {
    let registry = RegionRegistry::canadian_provinces();
    let input = args
        .input
        .clone()
        .unwrap_or_else(|| args.data_dir.join(args.series.file_name()));

    let series = if args.series.is_case_series() {
        if args.scale.is_some() {
            return Err(AppError::new(
                ErrorKind::InvalidArgument,
                "The case series has no unit scale.",
            ));
        }
        pipeline::clean_cases_from_source(Some(input.as_path()), &registry)?
    } else {
        let scale = args.scale.unwrap_or_else(|| args.series.scale());
        pipeline::clean_price_from_path(args.series, &input, scale, &registry)?
    };

    let out = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}_clean.csv", args.series.name())));
    crate::io::export::write_series_csv(&out, &series.cleaned, args.series.is_case_series())?;

    println!(
        "Cleaned {}: rows={} | regions={} (read={}, skipped={})",
        series.label,
        series.cleaned.len(),
        series.cleaned.regions().len(),
        series.rows_read,
        series.row_errors.len()
    );
    println!("Wrote {}", out.display());
    Ok(())
}

fn handle_forecast(args: ForecastArgs) -> Result<(), AppError> {
    let registry = RegionRegistry::canadian_provinces();
    let table = crate::io::ingest::load_clean_series(&args.input)?;

    let is_case_series = table.is_case_series;
    let name = series_label(&args.input);
    let series = pipeline::CleanedSeries {
        label: name.clone(),
        is_case_series,
        cleaned: table.dataset,
        row_errors: table.row_errors,
        rows_read: table.rows_read,
    };
    let output = pipeline::forecast_series(series, &registry)?;

    let out = args
        .out
        .clone()
        .unwrap_or_else(|| with_suffix(&args.input, "_full.csv"));
    crate::io::export::write_series_csv(&out, &output.full, is_case_series)?;

    if let Some(path) = &args.export_models {
        let models = ModelsFile::new(name.clone(), TRAINING_MONTHS, output.forecast.fits.clone());
        crate::io::model_file::write_models_json(path, &models)?;
    }

    println!(
        "{}",
        crate::report::format_series_summary(
            &name,
            output.series.rows_read,
            &output.series.row_errors,
            &output.series.cleaned,
            &output.forecast.fits,
        )
    );
    println!("Wrote {}", out.display());
    Ok(())
}

fn handle_correlate(args: CorrelateArgs) -> Result<(), AppError> {
    let x = crate::io::ingest::load_clean_series(&args.x_input)?;
    let y = crate::io::ingest::load_clean_series(&args.y_input)?;

    let pairs = paired_values(&x.dataset, &y.dataset);
    if pairs.len() < 2 {
        return Err(AppError::new(
            ErrorKind::InsufficientData,
            "The two series share fewer than 2 (region, month) pairs.",
        ));
    }

    let predictor = values_dataset(pairs.iter().map(|&(x, _)| x));
    let response = values_dataset(pairs.iter().map(|&(_, y)| y));
    let line = forecast::line::fit(&predictor, &response)?;

    println!(
        "=== provcast - correlate: {} vs {} ===",
        series_label(&args.x_input),
        series_label(&args.y_input)
    );
    println!(
        "pairs={} | slope={:.4} | intercept={:.4} | r2={:.4}\n",
        pairs.len(),
        line.slope,
        line.intercept,
        line.r2
    );
    println!(
        "{}",
        crate::plot::render_correlation_plot(&pairs, &line, args.width, args.height)
    );
    Ok(())
}

fn handle_models(args: ModelsArgs) -> Result<(), AppError> {
    let models = crate::io::model_file::read_models_json(&args.models)?;
    println!("{}", crate::report::format_models_summary(&models));
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = crate::data::SampleConfig {
        months: args.months,
        seed: args.seed,
        missing_rate: args.missing_rate,
        noise_std: args.noise_std,
    };
    let written = crate::data::write_sample_files(&args.out_dir, &config)?;

    println!("Wrote {} sample tables:", written.len());
    for path in written {
        println!("  {}", path.display());
    }
    Ok(())
}

/// Pair two cleaned series by position within each shared region.
///
/// Cleaned files are written in period order, so the i-th row of a region in
/// one series lines up with the i-th row of the same region in the other even
/// when the two use different period encodings (price vs case dates).
fn paired_values(x: &Dataset, y: &Dataset) -> Vec<(f64, f64)> {
    let mut y_by_region: HashMap<&str, Vec<f64>> = HashMap::new();
    for obs in &y.rows {
        y_by_region
            .entry(obs.region.as_str())
            .or_default()
            .push(obs.value);
    }

    let mut pairs = Vec::new();
    for region in x.regions() {
        let Some(ys) = y_by_region.get(region.as_str()) else {
            continue;
        };
        let xs = x.restrict_to_region(&region);
        for (xv, yv) in xs.values().into_iter().zip(ys.iter()) {
            pairs.push((xv, *yv));
        }
    }
    pairs
}

fn values_dataset(values: impl Iterator<Item = f64>) -> Dataset {
    Dataset::new(
        values
            .map(|value| crate::domain::Observation {
                period: String::new(),
                region: String::new(),
                value,
            })
            .collect(),
    )
}

fn write_full(
    path: &Path,
    full: &Dataset,
    is_case_series: bool,
    ids: Option<&HashMap<String, i64>>,
) -> Result<(), AppError> {
    match ids {
        Some(ids) => {
            let rows = crate::io::ids::attach_region_ids(full, ids)?;
            crate::io::export::write_series_with_ids_csv(path, &rows, is_case_series)
        }
        None => crate::io::export::write_series_csv(path, full, is_case_series),
    }
}

fn ensure_dir(dir: &Path) -> Result<(), AppError> {
    std::fs::create_dir_all(dir).map_err(|e| {
        AppError::new(
            ErrorKind::Io,
            format!("Failed to create output dir '{}': {e}", dir.display()),
        )
    })
}

/// `food_clean.csv` -> a short series label for headings.
fn series_label(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `food_clean.csv` -> `food_clean_full.csv` (suffix replaces the extension).
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = series_label(path);
    path.with_file_name(format!("{stem}{suffix}"))
}

/// Rewrite argv so `provcast` defaults to `provcast run`.
///
/// Rules:
/// - `provcast`                      -> `provcast run`
/// - `provcast --data-dir d ...`     -> `provcast run --data-dir d ...`
/// - `provcast --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("run".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "run" | "clean" | "forecast" | "correlate" | "models" | "sample"
    );
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "run flags".
    if arg1.starts_with('-') {
        argv.insert(1, "run".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Observation;

    fn args(tokens: &[&str]) -> Vec<String> {
        std::iter::once("provcast")
            .chain(tokens.iter().copied())
            .map(String::from)
            .collect()
    }

    fn obs(period: &str, region: &str, value: f64) -> Observation {
        Observation {
            period: period.to_string(),
            region: region.to_string(),
            value,
        }
    }

    #[test]
    fn bare_invocation_defaults_to_run() {
        assert_eq!(rewrite_args(args(&[])), args(&["run"]));
        assert_eq!(
            rewrite_args(args(&["--data-dir", "d"])),
            args(&["run", "--data-dir", "d"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(
            rewrite_args(args(&["clean", "-s", "food"])),
            args(&["clean", "-s", "food"])
        );
        assert_eq!(rewrite_args(args(&["--help"])), args(&["--help"]));
    }

    #[test]
    fn pairing_zips_by_position_within_shared_regions() {
        let x = Dataset::new(vec![
            obs("2020-1", "Alberta", 1.0),
            obs("2020-2", "Alberta", 2.0),
            obs("2020-1", "Quebec", 3.0),
        ]);
        let y = Dataset::new(vec![
            obs("25-1-2020", "Alberta", 10.0),
            obs("25-2-2020", "Alberta", 20.0),
            obs("25-1-2020", "Yukon", 30.0),
        ]);

        let pairs = paired_values(&x, &y);
        assert_eq!(pairs, vec![(1.0, 10.0), (2.0, 20.0)]);
    }
}
