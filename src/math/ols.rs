//! Least squares line fit.
//!
//! The trend fit is a two-column regression:
//!
//! ```text
//! minimize Σ (y_i - (β0 + β1 x_i))^2
//! ```
//!
//! We build the `[1, x]` design matrix and solve it with SVD, which stays
//! well-behaved for long, nearly flat daily series.

use nalgebra::{DMatrix, DVector};

/// Coefficients and goodness of fit of a line `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub intercept: f64,
    pub slope: f64,
    pub r_squared: f64,
}

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fit `y = intercept + slope * x`.
///
/// Callers must ensure at least two distinct `x` values; otherwise the design
/// matrix is rank-deficient and `None` is returned.
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Option<LineFit> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }

    // Center x so the columns are orthogonal; shift the intercept back afterwards.
    let n = xs.len();
    let x_mean = xs.iter().sum::<f64>() / n as f64;
    let sxx: f64 = xs.iter().map(|x| (x - x_mean).powi(2)).sum();
    if !(sxx > 0.0) {
        return None;
    }
    let design = DMatrix::from_fn(n, 2, |i, j| if j == 0 { 1.0 } else { xs[i] - x_mean });
    let y = DVector::from_column_slice(ys);

    let beta = solve_least_squares(&design, &y)?;
    let slope = beta[1];
    let intercept = beta[0] - slope * x_mean;

    let y_mean = ys.iter().sum::<f64>() / n as f64;
    let ss_tot: f64 = ys.iter().map(|v| (v - y_mean).powi(2)).sum();
    let ss_res: f64 = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| (y - (intercept + slope * x)).powi(2))
        .sum();
    let r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 1.0 };

    Some(LineFit {
        intercept,
        slope,
        r_squared,
    })
}
