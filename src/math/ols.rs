//! Ordinary least squares solver.
//!
//! The trend fitter repeatedly solves one tiny regression per country:
//!
//! ```text
//! minimize Σ (cpi_i - (β0 + β1 · i))²
//! ```
//!
//! where `i` is the 0-based time index within the date-sorted window.
//!
//! Implementation choices:
//! - We use SVD to solve the least-squares problem robustly even when the
//!   design matrix is tall (more rows than columns).
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - The parameter dimension is fixed at 2 (intercept + slope), so SVD cost is
//!   negligible for quarterly windows.
//! - Rank-deficient designs follow the solver's convention: the SVD solve
//!   returns a minimum-norm solution where possible, and we return `None` only
//!   when every tolerance fails or the coefficients come back non-finite.
//!   Callers treat `None` as "skip this country".

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

/// Intercept/slope pair from a straight-line fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub intercept: f64,
    pub slope: f64,
}

impl LineFit {
    /// Fitted value at a 0-based time index.
    pub fn predict(&self, time_index: usize) -> f64 {
        self.intercept + self.slope * time_index as f64
    }
}

/// Fit `value ~ intercept + slope · index` over 0-based positions.
///
/// Returns `None` for fewer than 2 observations or an unsolvable system.
pub fn fit_line(values: &[f64]) -> Option<LineFit> {
    let n = values.len();
    if n < 2 {
        return None;
    }

    let mut design = Vec::with_capacity(n * 2);
    for i in 0..n {
        design.push(1.0);
        design.push(i as f64);
    }
    let x = DMatrix::from_row_slice(n, 2, &design);
    let y = DVector::from_row_slice(values);

    let beta = solve_least_squares(&x, &y)?;
    Some(LineFit {
        intercept: beta[0],
        slope: beta[1],
    })
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
    fn fit_line_recovers_exact_coefficients() {
        let values: Vec<f64> = (0..8).map(|i| 10.0 + 2.0 * i as f64).collect();
        let fit = fit_line(&values).unwrap();
        assert!((fit.intercept - 10.0).abs() < 1e-9);
        assert!((fit.slope - 2.0).abs() < 1e-9);
        for (i, v) in values.iter().enumerate() {
            assert!((fit.predict(i) - v).abs() < 1e-9);
        }
    }

    #[test]
    fn fit_line_rejects_short_input() {
        assert!(fit_line(&[]).is_none());
        assert!(fit_line(&[1.0]).is_none());
    }

    #[test]
    fn fit_line_handles_noisy_input() {
        // Symmetric noise around y = 1 + x: OLS should split the difference.
        let values = [1.5, 1.5, 3.5, 3.5];
        let fit = fit_line(&values).unwrap();
        assert!(fit.slope > 0.0);
        assert!(fit.intercept.is_finite());
    }
}
