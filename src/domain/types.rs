//! Shared domain types.
//!
//! Raw rows mirror the source tables column by column; `Observation` is the
//! cleaned, canonical record. Missing values only exist on raw rows (as
//! `Option`), so a cleaned dataset cannot carry one by construction.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A raw price-style row (food/receipt/utensil tables), before cleaning.
///
/// `value` is `None` when the VALUE cell is empty; the cleaner imputes those
/// rows rather than dropping them.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRow {
    pub ref_date: String,
    pub geo: String,
    /// The category cell from the fourth column; its header name varies by
    /// table, so ingest addresses it by position.
    pub category: String,
    pub value: Option<f64>,
}

/// A raw case-table row, before cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseRow {
    pub province: String,
    pub date_report: String,
    pub cases: f64,
}

/// One cleaned or forecast value for one region in one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub period: String,
    pub region: String,
    pub value: f64,
}

/// An ordered collection of observations.
///
/// Datasets are value objects: every transform here returns a new `Dataset`
/// instead of mutating rows in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub rows: Vec<Observation>,
}

impl Dataset {
    pub fn new(rows: Vec<Observation>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The value column, in row order.
    pub fn values(&self) -> Vec<f64> {
        self.rows.iter().map(|o| o.value).collect()
    }

    /// Distinct region names in first-appearance order.
    pub fn regions(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for o in &self.rows {
            if !seen.iter().any(|s| s == &o.region) {
                seen.push(o.region.clone());
            }
        }
        seen
    }

    /// Rows whose region equals `region`, preserving order.
    pub fn restrict_to_region(&self, region: &str) -> Dataset {
        Dataset::new(
            self.rows
                .iter()
                .filter(|o| o.region == region)
                .cloned()
                .collect(),
        )
    }

    /// This dataset followed by `other`, with no deduplication.
    pub fn concat(&self, other: &Dataset) -> Dataset {
        let mut rows = self.rows.clone();
        rows.extend(other.rows.iter().cloned());
        Dataset::new(rows)
    }

    /// Rows sorted by `(period, region)` ascending. Presentation order only;
    /// no downstream step depends on it.
    pub fn sorted_by_period_region(&self) -> Dataset {
        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| a.period.cmp(&b.period).then_with(|| a.region.cmp(&b.region)));
        Dataset::new(rows)
    }
}

/// The configured input series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    /// Consumer price index of food.
    Food,
    /// Monthly receipt counts for full-service restaurants.
    Receipt,
    /// Consumer price index of kitchen utensils.
    Utensil,
    /// Monthly COVID-19 case counts.
    Cases,
}

impl SeriesKind {
    /// The three price series, in processing order.
    pub const PRICE_KINDS: [SeriesKind; 3] =
        [SeriesKind::Receipt, SeriesKind::Food, SeriesKind::Utensil];

    pub fn name(self) -> &'static str {
        match self {
            SeriesKind::Food => "food",
            SeriesKind::Receipt => "receipt",
            SeriesKind::Utensil => "utensil",
            SeriesKind::Cases => "cases",
        }
    }

    pub fn is_case_series(self) -> bool {
        matches!(self, SeriesKind::Cases)
    }

    /// File name of the raw table inside the data directory.
    pub fn file_name(self) -> &'static str {
        match self {
            SeriesKind::Food => "food.csv",
            SeriesKind::Receipt => "receipt.csv",
            SeriesKind::Utensil => "utensil.csv",
            SeriesKind::Cases => "cases.csv",
        }
    }

    /// The category cell value selecting this series from its raw table.
    /// The case feed has no category column.
    pub fn category_filter(self) -> Option<&'static str> {
        match self {
            SeriesKind::Food => Some("Food"),
            SeriesKind::Receipt => Some("Full-service restaurants [722511]"),
            SeriesKind::Utensil => {
                Some("Non-electric kitchen utensils, tableware and cookware")
            }
            SeriesKind::Cases => None,
        }
    }

    /// Unit scale applied after imputation. The published tables already
    /// share a usable unit, so every series currently scales by 1.0.
    pub fn scale(self) -> f64 {
        match self {
            SeriesKind::Food | SeriesKind::Receipt | SeriesKind::Utensil | SeriesKind::Cases => {
                1.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(period: &str, region: &str, value: f64) -> Observation {
        Observation {
            period: period.to_string(),
            region: region.to_string(),
            value,
        }
    }

    #[test]
    fn regions_are_distinct_in_first_appearance_order() {
        let ds = Dataset::new(vec![
            obs("2020-01", "Ontario", 1.0),
            obs("2020-01", "Alberta", 2.0),
            obs("2020-02", "Ontario", 3.0),
        ]);
        assert_eq!(ds.regions(), vec!["Ontario".to_string(), "Alberta".to_string()]);
    }

    #[test]
    fn restrict_keeps_row_order() {
        let ds = Dataset::new(vec![
            obs("2020-01", "Ontario", 1.0),
            obs("2020-02", "Alberta", 2.0),
            obs("2020-02", "Ontario", 3.0),
        ]);
        let ontario = ds.restrict_to_region("Ontario");
        assert_eq!(ontario.values(), vec![1.0, 3.0]);
    }

    #[test]
    fn concat_appends_without_dedup() {
        let a = Dataset::new(vec![obs("2020-01", "Ontario", 1.0)]);
        let b = Dataset::new(vec![obs("2020-01", "Ontario", 1.0)]);
        assert_eq!(a.concat(&b).len(), 2);
    }

    #[test]
    fn sort_is_by_period_then_region() {
        let ds = Dataset::new(vec![
            obs("2020-02", "Alberta", 1.0),
            obs("2020-01", "Ontario", 2.0),
            obs("2020-01", "Alberta", 3.0),
        ]);
        let sorted = ds.sorted_by_period_region();
        let keys: Vec<(String, String)> = sorted
            .rows
            .iter()
            .map(|o| (o.period.clone(), o.region.clone()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("2020-01".to_string(), "Alberta".to_string()),
                ("2020-01".to_string(), "Ontario".to_string()),
                ("2020-02".to_string(), "Alberta".to_string()),
            ]
        );
    }
}
