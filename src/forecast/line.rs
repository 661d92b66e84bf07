//! Univariate line fitting over dataset values.
//!
//! The forecaster regresses a response series on a value-encoded time index,
//! one region at a time. Both sides arrive as datasets; only the `value`
//! columns enter the regression, paired by row position.

use serde::{Deserialize, Serialize};

use crate::domain::Dataset;
use crate::error::{AppError, ErrorKind};
use crate::math::{fit_simple_line, r_squared};

/// Fitted line together with its goodness of fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineFit {
    pub r2: f64,
    pub slope: f64,
    pub intercept: f64,
}

/// Regress `response.value` on `predictor.value`, paired by row position.
pub fn fit(predictor: &Dataset, response: &Dataset) -> Result<LineFit, AppError> {
    if predictor.len() != response.len() {
        return Err(AppError::new(
            ErrorKind::ShapeMismatch,
            format!(
                "Predictor has {} rows but response has {}.",
                predictor.len(),
                response.len()
            ),
        ));
    }
    if predictor.len() < 2 {
        return Err(AppError::new(
            ErrorKind::InsufficientData,
            format!(
                "Need at least 2 observations to fit a line; got {}.",
                predictor.len()
            ),
        ));
    }

    let x = predictor.values();
    let y = response.values();
    if x.iter().all(|&v| v == x[0]) {
        return Err(AppError::new(
            ErrorKind::InsufficientData,
            "Predictor values are constant; cannot fit a line.",
        ));
    }

    let (intercept, slope) = fit_simple_line(&x, &y).ok_or_else(|| {
        AppError::new(
            ErrorKind::InsufficientData,
            "Least squares solver could not fit the data.",
        )
    })?;
    let r2 = r_squared(&x, &y, slope, intercept);

    Ok(LineFit {
        r2,
        slope,
        intercept,
    })
}

/// Evaluate `intercept + slope * value` for each input row, in input order.
pub fn predict(slope: f64, intercept: f64, inputs: &Dataset) -> Vec<f64> {
    inputs
        .rows
        .iter()
        .map(|obs| intercept + slope * obs.value)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Observation;

    fn index(values: &[f64]) -> Dataset {
        Dataset::new(
            values
                .iter()
                .map(|&value| Observation {
                    period: String::new(),
                    region: String::new(),
                    value,
                })
                .collect(),
        )
    }

    #[test]
    fn recovers_slope_and_intercept_from_linear_data() {
        let predictor = index(&[0.0, 1.0, 2.0, 3.0]);
        let response = index(&[5.0, 7.0, 9.0, 11.0]);
        let fit = fit(&predictor, &response).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-9);
        assert!((fit.intercept - 5.0).abs() < 1e-9);
        assert!((fit.r2 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn mismatched_lengths_are_a_shape_error() {
        let err = fit(&index(&[0.0, 1.0, 2.0]), &index(&[1.0])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
        assert!(err.to_string().contains("3 rows"));
    }

    #[test]
    fn a_single_pair_is_insufficient() {
        let err = fit(&index(&[0.0]), &index(&[1.0])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }

    #[test]
    fn a_constant_predictor_is_insufficient() {
        let err = fit(&index(&[4.0, 4.0, 4.0]), &index(&[1.0, 2.0, 3.0])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }

    #[test]
    fn predict_preserves_input_order() {
        let inputs = index(&[21.0, 22.0, 23.0, 24.0]);
        let predicted = predict(2.0, 1.0, &inputs);
        assert_eq!(predicted, vec![43.0, 45.0, 47.0, 49.0]);
    }
}
