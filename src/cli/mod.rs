//! Command-line parsing for the provincial series forecaster.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the cleaning/regression code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::SeriesKind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "provcast",
    version,
    about = "Provincial series cleaner and four-month forecaster"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full pipeline: clean every series, fit per-province lines,
    /// and write cleaned + forecast CSVs.
    Run(RunArgs),
    /// Clean a single raw table and write the cleaned CSV.
    Clean(CleanArgs),
    /// Fit per-province lines on a cleaned CSV and write the forecast.
    Forecast(ForecastArgs),
    /// Plot one cleaned series against another with a fitted line.
    Correlate(CorrelateArgs),
    /// Print the per-province fits stored in a model JSON file.
    Models(ModelsArgs),
    /// Generate synthetic raw tables for offline runs.
    Sample(SampleArgs),
}

/// Options for the full pipeline.
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Directory holding the raw tables (receipt.csv, food.csv, utensil.csv).
    #[arg(long, default_value = ".")]
    pub data_dir: PathBuf,

    /// Directory the cleaned and forecast CSVs are written into.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Local case feed CSV. When omitted the feed is downloaded.
    #[arg(long)]
    pub cases: Option<PathBuf>,

    /// Region-id table; when given, full outputs carry an `id` column.
    #[arg(long)]
    pub ids: Option<PathBuf>,
}

/// Options for cleaning one series.
#[derive(Debug, Parser, Clone)]
pub struct CleanArgs {
    /// Which series the input table holds.
    #[arg(short = 's', long, value_enum)]
    pub series: SeriesKind,

    /// Raw input CSV. Defaults to the series' file inside --data-dir.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Directory holding the raw tables.
    #[arg(long, default_value = ".")]
    pub data_dir: PathBuf,

    /// Output path for the cleaned CSV. Defaults to `<series>_clean.csv`.
    #[arg(short = 'o', long)]
    pub out: Option<PathBuf>,

    /// Override the unit scale applied after imputation.
    #[arg(long)]
    pub scale: Option<f64>,
}

/// Options for forecasting from a cleaned CSV.
#[derive(Debug, Parser, Clone)]
pub struct ForecastArgs {
    /// Cleaned series CSV (as written by `clean` or `run`).
    pub input: PathBuf,

    /// Output path for cleaned + forecast rows. Defaults to `<input>_full.csv`.
    #[arg(short = 'o', long)]
    pub out: Option<PathBuf>,

    /// Also write the per-province fits as JSON.
    #[arg(long = "export-models")]
    pub export_models: Option<PathBuf>,
}

/// Options for the correlation plot.
#[derive(Debug, Parser, Clone)]
pub struct CorrelateArgs {
    /// Cleaned CSV providing the x values.
    #[arg(short = 'x', long = "x-input")]
    pub x_input: PathBuf,

    /// Cleaned CSV providing the y values.
    #[arg(short = 'y', long = "y-input")]
    pub y_input: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for inspecting a saved model file.
#[derive(Debug, Parser, Clone)]
pub struct ModelsArgs {
    /// Model JSON file produced by `provcast forecast --export-models`.
    #[arg(value_name = "JSON")]
    pub models: PathBuf,
}

/// Options for sample generation.
#[derive(Debug, Parser, Clone)]
pub struct SampleArgs {
    /// Directory the sample tables are written into.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Random seed for sample generation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Months of data to generate (1-21, counted from January 2020).
    #[arg(long, default_value_t = 21)]
    pub months: i64,

    /// Probability that a price cell is left empty.
    #[arg(long, default_value_t = 0.05)]
    pub missing_rate: f64,

    /// Standard deviation of the additive noise on every value.
    #[arg(long, default_value_t = 2.0)]
    pub noise_std: f64,
}
