//! Cleaning for the daily COVID case feed.
//!
//! The feed reports one row per (province, day). We keep only the day-25
//! snapshot of each month so the case series lines up with the monthly price
//! series, expand abbreviated province codes, and drop the bookkeeping rows
//! the feed carries (the "Repatriated" travellers bucket and non-province
//! entries).
//!
//! Each row takes exactly one branch of the filter chain below; the checks
//! are ordered and mutually exclusive, so a row dropped by the date checks is
//! never considered for an alias rewrite.

use crate::domain::{CaseRow, Dataset, Observation, RegionRegistry};

/// Day-of-month snapshot kept from the daily feed.
const REPORT_DAY_PREFIX: &str = "25";

/// Trailing report dates trimmed from the training window. The forecast
/// re-emits these two months together with the following two.
const EXCLUDED_REPORT_DATES: [&str; 2] = ["25-10-2021", "25-11-2021"];

/// Reduce the daily case feed to one row per (province, month).
pub fn clean_case_series(rows: &[CaseRow], registry: &RegionRegistry) -> Dataset {
    let mut kept = Vec::new();
    for row in rows {
        let region = if !row.date_report.starts_with(REPORT_DAY_PREFIX) {
            continue;
        } else if EXCLUDED_REPORT_DATES.contains(&row.date_report.as_str()) {
            continue;
        } else if let Some(full_name) = registry.resolve_alias(&row.province) {
            full_name.to_string()
        } else if row.province == RegionRegistry::REPATRIATED {
            continue;
        } else {
            row.province.clone()
        };
        kept.push(Observation {
            period: row.date_report.clone(),
            region,
            value: row.cases,
        });
    }

    kept.retain(|obs| registry.contains(&obs.region));
    Dataset::new(kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(province: &str, date_report: &str, cases: f64) -> CaseRow {
        CaseRow {
            province: province.to_string(),
            date_report: date_report.to_string(),
            cases,
        }
    }

    fn clean(rows: &[CaseRow]) -> Dataset {
        clean_case_series(rows, &RegionRegistry::canadian_provinces())
    }

    #[test]
    fn keeps_only_day_25_reports() {
        let rows = vec![
            row("Alberta", "24-3-2021", 10.0),
            row("Alberta", "25-3-2021", 11.0),
            row("Alberta", "26-3-2021", 12.0),
        ];
        let cleaned = clean(&rows);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned.rows[0].period, "25-3-2021");
        assert_eq!(cleaned.rows[0].value, 11.0);
    }

    #[test]
    fn drops_the_two_trimmed_trailing_dates() {
        let rows = vec![
            row("Ontario", "25-9-2021", 1.0),
            row("Ontario", "25-10-2021", 2.0),
            row("Ontario", "25-11-2021", 3.0),
        ];
        let cleaned = clean(&rows);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned.rows[0].period, "25-9-2021");
    }

    #[test]
    fn expands_alias_codes_to_full_names() {
        let rows = vec![row("BC", "25-4-2020", 7.0)];
        let cleaned = clean(&rows);
        assert_eq!(cleaned.rows[0].region, "British Columbia");
    }

    #[test]
    fn nwt_is_expanded_then_dropped_as_a_territory() {
        let rows = vec![row("NWT", "25-4-2020", 3.0)];
        assert!(clean(&rows).is_empty());
    }

    #[test]
    fn repatriated_rows_never_survive() {
        let rows = vec![
            row("Repatriated", "25-4-2020", 5.0),
            row("Repatriated", "25-10-2021", 5.0),
        ];
        assert!(clean(&rows).is_empty());
    }

    #[test]
    fn unknown_regions_are_dropped_after_the_chain() {
        let rows = vec![
            row("Yukon", "25-4-2020", 1.0),
            row("Nunavut", "25-4-2020", 2.0),
            row("Quebec", "25-4-2020", 3.0),
        ];
        let cleaned = clean(&rows);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned.rows[0].region, "Quebec");
    }
}
