//! Ordinary least squares solver.
//!
//! Every regression in this project is the univariate line `y = a + b x`,
//! solved for one region at a time. The design matrix is therefore tall and
//! two columns wide.
//!
//! Implementation choices:
//! - We use SVD to solve the least-squares problem robustly even when the
//!   design matrix is tall (more rows than columns).
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - With a two-column design, SVD performance is irrelevant even on the
//!   largest monthly panels this pipeline sees.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fit `y = intercept + slope * x` and return `(intercept, slope)`.
///
/// Returns `None` when the solver fails; callers are expected to reject
/// degenerate inputs (fewer than two rows, constant `x`) before calling.
pub fn fit_simple_line(x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    let n = x.len().min(y.len());
    if n < 2 {
        return None;
    }

    let mut design = DMatrix::<f64>::zeros(n, 2);
    let mut obs = DVector::<f64>::zeros(n);
    for i in 0..n {
        design[(i, 0)] = 1.0;
        design[(i, 1)] = x[i];
        obs[i] = y[i];
    }

    let beta = solve_least_squares(&design, &obs)?;
    Some((beta[0], beta[1]))
}

/// Coefficient of determination for a fitted line.
///
/// When the response has zero variance the usual ratio is undefined; we return
/// 1.0 if the residuals are also (numerically) zero and 0.0 otherwise.
pub fn r_squared(x: &[f64], y: &[f64], slope: f64, intercept: f64) -> f64 {
    let n = x.len().min(y.len());
    if n == 0 {
        return 0.0;
    }

    let mean = y.iter().take(n).sum::<f64>() / n as f64;
    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for i in 0..n {
        let fitted = intercept + slope * x[i];
        ss_res += (y[i] - fitted) * (y[i] - fitted);
        ss_tot += (y[i] - mean) * (y[i] - mean);
    }

    if ss_tot <= f64::EPSILON {
        return if ss_res <= f64::EPSILON { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn simple_line_recovers_exact_coefficients() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [10.0, 12.5, 15.0, 17.5];
        let (intercept, slope) = fit_simple_line(&x, &y).unwrap();
        assert!((intercept - 10.0).abs() < 1e-9);
        assert!((slope - 2.5).abs() < 1e-9);
    }

    #[test]
    fn r_squared_is_one_on_perfectly_linear_data() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, 3.0, 5.0, 7.0];
        let r2 = r_squared(&x, &y, 2.0, 1.0);
        assert!((r2 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn r_squared_handles_a_constant_response() {
        // Constant y fit by a flat line: no variance to explain, no residuals.
        let x = [0.0, 1.0, 2.0];
        let y = [4.0, 4.0, 4.0];
        assert_eq!(r_squared(&x, &y, 0.0, 4.0), 1.0);
        // A line that misses a constant response explains nothing.
        assert_eq!(r_squared(&x, &y, 1.0, 0.0), 0.0);
    }
}
