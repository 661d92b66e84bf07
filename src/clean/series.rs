//! Cleaning for monthly price series (food, receipts, utensils).
//!
//! The raw tables mix provinces with territories and country-level rows, and
//! carry several product categories per file. Cleaning reduces them to one
//! value per (province, month):
//! - keep only canonical provinces and the requested category,
//! - impute missing values from the per-province mean of the surviving rows,
//! - apply the series' unit scale,
//! - project to `{period, region, value}` sorted by `(period, region)`.
//!
//! Step order matters: rows removed by the region/category filter never
//! participate in the imputation means, and means are taken before scaling.

use std::collections::HashMap;

use crate::domain::{Dataset, Observation, PriceRow, RegionRegistry};
use crate::error::{AppError, ErrorKind};

/// Clean one price table into a per-province monthly series.
///
/// `category_filter` must match the raw table's fourth column exactly;
/// `scale` converts the published unit into the working unit.
pub fn clean_price_series(
    rows: &[PriceRow],
    category_filter: &str,
    scale: f64,
    registry: &RegionRegistry,
) -> Result<Dataset, AppError> {
    let survivors: Vec<&PriceRow> = rows
        .iter()
        .filter(|row| registry.contains(&row.geo) && row.category == category_filter)
        .collect();

    // Per-region mean over non-missing survivors, computed before scaling.
    let mut sums: HashMap<&str, (f64, usize)> = HashMap::new();
    for row in &survivors {
        if let Some(value) = row.value {
            let entry = sums.entry(row.geo.as_str()).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }
    }

    let mut cleaned = Vec::with_capacity(survivors.len());
    for row in survivors {
        let value = match row.value {
            Some(value) => value,
            None => {
                let (sum, count) = sums.get(row.geo.as_str()).copied().unwrap_or((0.0, 0));
                if count == 0 {
                    return Err(AppError::new(
                        ErrorKind::EmptyGroup,
                        format!(
                            "Region '{}' has no non-missing values to impute {} from.",
                            row.geo, row.ref_date
                        ),
                    ));
                }
                sum / count as f64
            }
        };
        cleaned.push(Observation {
            period: row.ref_date.clone(),
            region: row.geo.clone(),
            value: value * scale,
        });
    }

    Ok(Dataset::new(cleaned).sorted_by_period_region())
}
