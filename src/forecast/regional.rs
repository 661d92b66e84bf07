//! Per-region four-month forecasting.
//!
//! Each canonical region present in the cleaned response gets its own line
//! fit against a shared time index, then four predictions at the fixed
//! future offsets. Regions are independent, so the fit-and-predict step runs
//! in parallel; output row order follows the response's region order but
//! consumers must not rely on it.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::{
    month_offset_to_ref_date, month_offset_to_report_date, Dataset, Observation, RegionRegistry,
};
use crate::error::AppError;
use crate::forecast::line::{self, LineFit};

/// Months of training data in the reference window (offsets 0..21,
/// January 2020 through September 2021).
pub const TRAINING_MONTHS: i64 = 21;

/// Month offsets predicted for every region. These continue the training
/// window above and stay fixed even when a series carries fewer months.
pub const FUTURE_OFFSETS: [i64; 4] = [21, 22, 23, 24];

/// One region's fitted line and the number of observations behind it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionFit {
    pub region: String,
    pub n: usize,
    pub line: LineFit,
}

/// Fits for every region plus the combined forecast rows.
#[derive(Debug, Clone)]
pub struct RegionalForecast {
    pub fits: Vec<RegionFit>,
    pub forecast: Dataset,
}

/// Build the shared predictor index: one row per month offset in `0..months`,
/// with the offset as value. The index is region-agnostic.
pub fn training_index(months: i64) -> Result<Dataset, AppError> {
    let mut rows = Vec::with_capacity(months.max(0) as usize);
    for offset in 0..months {
        rows.push(Observation {
            period: month_offset_to_ref_date(offset)?,
            region: String::new(),
            value: offset as f64,
        });
    }
    Ok(Dataset::new(rows))
}

/// The four future rows every region is predicted at. Case series use the
/// day-25 report-date format so forecast rows match the cleaned feed.
fn future_index(is_case_series: bool) -> Result<Dataset, AppError> {
    let mut rows = Vec::with_capacity(FUTURE_OFFSETS.len());
    for offset in FUTURE_OFFSETS {
        let period = if is_case_series {
            month_offset_to_report_date(offset)?
        } else {
            month_offset_to_ref_date(offset)?
        };
        rows.push(Observation {
            period,
            region: String::new(),
            value: offset as f64,
        });
    }
    Ok(Dataset::new(rows))
}

/// Fit every canonical region present in `response` and predict the four
/// future offsets. Emits exactly four rows per region.
pub fn forecast_four_periods(
    response: &Dataset,
    predictor_index: &Dataset,
    is_case_series: bool,
    registry: &RegionRegistry,
) -> Result<RegionalForecast, AppError> {
    let future = future_index(is_case_series)?;
    let regions: Vec<String> = response
        .regions()
        .into_iter()
        .filter(|region| registry.contains(region))
        .collect();

    let per_region: Vec<(RegionFit, Vec<Observation>)> = regions
        .par_iter()
        .map(|region| forecast_region(region, response, predictor_index, &future))
        .collect::<Result<_, _>>()?;

    let mut fits = Vec::with_capacity(per_region.len());
    let mut rows = Vec::with_capacity(per_region.len() * FUTURE_OFFSETS.len());
    for (fit, predicted) in per_region {
        fits.push(fit);
        rows.extend(predicted);
    }

    Ok(RegionalForecast {
        fits,
        forecast: Dataset::new(rows),
    })
}

fn forecast_region(
    region: &str,
    response: &Dataset,
    predictor_index: &Dataset,
    future: &Dataset,
) -> Result<(RegionFit, Vec<Observation>), AppError> {
    let region_rows = response.restrict_to_region(region);
    let fitted = line::fit(predictor_index, &region_rows)
        .map_err(|err| AppError::new(err.kind(), format!("Region '{region}': {err}")))?;

    let predicted = line::predict(fitted.slope, fitted.intercept, future);
    let rows = future
        .rows
        .iter()
        .zip(predicted)
        .map(|(input, value)| Observation {
            period: input.period.clone(),
            region: region.to_string(),
            value,
        })
        .collect();

    let fit = RegionFit {
        region: region.to_string(),
        n: region_rows.len(),
        line: fitted,
    };
    Ok((fit, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn linear_response(regions: &[(&str, f64, f64)], months: i64) -> Dataset {
        let mut rows = Vec::new();
        for offset in 0..months {
            for &(region, intercept, slope) in regions {
                rows.push(Observation {
                    period: month_offset_to_ref_date(offset).unwrap(),
                    region: region.to_string(),
                    value: intercept + slope * offset as f64,
                });
            }
        }
        Dataset::new(rows)
    }

    #[test]
    fn training_index_counts_months_from_the_epoch() {
        let index = training_index(TRAINING_MONTHS).unwrap();
        assert_eq!(index.len(), 21);
        assert_eq!(index.rows[0].period, "2020-1");
        assert_eq!(index.rows[0].value, 0.0);
        assert_eq!(index.rows[20].period, "2021-9");
        assert_eq!(index.rows[20].value, 20.0);
    }

    #[test]
    fn emits_four_rows_per_region_at_the_fixed_offsets() {
        let response = linear_response(
            &[("Alberta", 100.0, 2.0), ("Quebec", 50.0, -1.0)],
            TRAINING_MONTHS,
        );
        let index = training_index(TRAINING_MONTHS).unwrap();
        let registry = RegionRegistry::canadian_provinces();

        let out = forecast_four_periods(&response, &index, false, &registry).unwrap();
        assert_eq!(out.forecast.len(), 8);
        assert_eq!(out.fits.len(), 2);

        let alberta = out.forecast.restrict_to_region("Alberta");
        let periods: Vec<&str> = alberta.rows.iter().map(|o| o.period.as_str()).collect();
        assert_eq!(periods, vec!["2021-10", "2021-11", "2021-12", "2022-1"]);

        // The solver reconstructs the line to floating-point accuracy, not
        // exactly, so compare with a tolerance.
        let values: Vec<f64> = alberta.values();
        let expected = [142.0, 144.0, 146.0, 148.0];
        assert_eq!(values.len(), expected.len());
        for (value, want) in values.iter().zip(expected) {
            assert!((value - want).abs() < 1e-9, "got {value}, want {want}");
        }
    }

    #[test]
    fn perfect_lines_fit_with_r2_of_one() {
        let response = linear_response(&[("Manitoba", 10.0, 0.5)], TRAINING_MONTHS);
        let index = training_index(TRAINING_MONTHS).unwrap();
        let registry = RegionRegistry::canadian_provinces();

        let out = forecast_four_periods(&response, &index, false, &registry).unwrap();
        let fit = &out.fits[0];
        assert_eq!(fit.region, "Manitoba");
        assert_eq!(fit.n, 21);
        assert!((fit.line.r2 - 1.0).abs() < 1e-9);
        assert!((fit.line.slope - 0.5).abs() < 1e-9);
        assert!((fit.line.intercept - 10.0).abs() < 1e-9);
    }

    #[test]
    fn case_series_forecasts_use_report_date_periods() {
        let response = linear_response(&[("Ontario", 0.0, 1.0)], TRAINING_MONTHS);
        let index = training_index(TRAINING_MONTHS).unwrap();
        let registry = RegionRegistry::canadian_provinces();

        let out = forecast_four_periods(&response, &index, true, &registry).unwrap();
        let periods: Vec<&str> = out.forecast.rows.iter().map(|o| o.period.as_str()).collect();
        assert_eq!(
            periods,
            vec!["25-10-2021", "25-11-2021", "25-12-2021", "25-1-2022"]
        );
    }

    #[test]
    fn errors_name_the_offending_region() {
        // Alberta has a full window, Quebec only one month.
        let mut response = linear_response(&[("Alberta", 1.0, 1.0)], TRAINING_MONTHS);
        response.rows.push(Observation {
            period: "2020-1".to_string(),
            region: "Quebec".to_string(),
            value: 3.0,
        });
        let index = training_index(TRAINING_MONTHS).unwrap();
        let registry = RegionRegistry::canadian_provinces();

        let err = forecast_four_periods(&response, &index, false, &registry).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
        assert!(err.to_string().contains("Region 'Quebec'"));
    }

    #[test]
    fn non_canonical_regions_are_not_fitted() {
        let mut response = linear_response(&[("Alberta", 1.0, 1.0)], TRAINING_MONTHS);
        response.rows.push(Observation {
            period: "2020-1".to_string(),
            region: "Yukon".to_string(),
            value: 3.0,
        });
        let index = training_index(TRAINING_MONTHS).unwrap();
        let registry = RegionRegistry::canadian_provinces();

        let out = forecast_four_periods(&response, &index, false, &registry).unwrap();
        assert_eq!(out.fits.len(), 1);
        assert_eq!(out.forecast.len(), 4);
    }
}
