//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the cleaning/fitting code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::Dataset;
use crate::forecast::RegionFit;
use crate::io::ingest::RowError;
use crate::io::model_file::ModelsFile;

/// Rows of skipped-row detail shown before eliding the rest.
const MAX_ROW_ERRORS_SHOWN: usize = 5;

/// Format the per-series summary block: ingest stats, cleaned shape, and the
/// per-region fit table.
pub fn format_series_summary(
    name: &str,
    rows_read: usize,
    row_errors: &[RowError],
    cleaned: &Dataset,
    fits: &[RegionFit],
) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== provcast - {name} ===\n"));
    out.push_str(&format!(
        "Rows: read={rows_read} | skipped={}\n",
        row_errors.len()
    ));
    for err in row_errors.iter().take(MAX_ROW_ERRORS_SHOWN) {
        out.push_str(&format!("  line {}: {}\n", err.line, err.message));
    }
    if row_errors.len() > MAX_ROW_ERRORS_SHOWN {
        out.push_str(&format!(
            "  ... and {} more\n",
            row_errors.len() - MAX_ROW_ERRORS_SHOWN
        ));
    }

    let first = cleaned.rows.first().map(|o| o.period.as_str()).unwrap_or("-");
    let last = cleaned.rows.last().map(|o| o.period.as_str()).unwrap_or("-");
    out.push_str(&format!(
        "Cleaned: rows={} | regions={} | periods {first} -> {last}\n",
        cleaned.len(),
        cleaned.regions().len()
    ));

    out.push_str("\nPer-region fits:\n");
    out.push_str(&format_fit_table(fits));
    out.push('\n');

    out
}

/// Format the summary for a persisted models file.
pub fn format_models_summary(models: &ModelsFile) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== provcast - models: {} ===\n", models.series));
    out.push_str(&format!("Training periods: {}\n\n", models.training_periods));
    out.push_str(&format_fit_table(&models.fits));

    out
}

/// Format the per-region fit table, sorted by region name for display.
pub fn format_fit_table(fits: &[RegionFit]) -> String {
    let mut sorted = fits.to_vec();
    sorted.sort_by(|a, b| a.region.cmp(&b.region));

    let mut out = String::new();
    out.push_str(
        format!(
            "{:<26} {:>4} {:>12} {:>12} {:>8}\n",
            "region", "n", "slope", "intercept", "r2"
        )
        .trim_end(),
    );
    out.push('\n');

    out.push_str(
        format!(
            "{:-<26} {:-<4} {:-<12} {:-<12} {:-<8}\n",
            "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for fit in &sorted {
        out.push_str(
            format!(
                "{:<26} {:>4} {:>12.4} {:>12.4} {:>8.4}\n",
                truncate(&fit.region, 26),
                fit.n,
                fit.line.slope,
                fit.line.intercept,
                fit.line.r2,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Observation;
    use crate::forecast::LineFit;

    fn fit(region: &str, slope: f64) -> RegionFit {
        RegionFit {
            region: region.to_string(),
            n: 21,
            line: LineFit {
                r2: 0.5,
                slope,
                intercept: 1.0,
            },
        }
    }

    #[test]
    fn fit_table_is_sorted_and_aligned() {
        let table = format_fit_table(&[fit("Quebec", 2.0), fit("Alberta", 1.0)]);
        let lines: Vec<&str> = table.lines().collect();

        assert!(lines[0].starts_with("region"));
        assert!(lines[1].starts_with("-----"));
        assert!(lines[2].starts_with("Alberta"));
        assert!(lines[3].starts_with("Quebec"));
        assert!(lines[2].contains("1.0000"));
    }

    #[test]
    fn summary_elides_long_row_error_lists() {
        let errors: Vec<RowError> = (0..8)
            .map(|i| RowError {
                line: i + 2,
                message: "Invalid `value` value 'x'.".to_string(),
            })
            .collect();
        let cleaned = Dataset::new(vec![Observation {
            period: "2020-01".to_string(),
            region: "Alberta".to_string(),
            value: 1.0,
        }]);

        let summary = format_series_summary("food", 20, &errors, &cleaned, &[]);
        assert!(summary.contains("read=20 | skipped=8"));
        assert!(summary.contains("... and 3 more"));
        assert!(summary.contains("periods 2020-01 -> 2020-01"));
    }

    #[test]
    fn long_region_names_are_truncated() {
        let long = "A".repeat(30);
        let table = format_fit_table(&[fit(&long, 1.0)]);
        assert!(table.contains(&format!("{}.", "A".repeat(25))));
    }
}
