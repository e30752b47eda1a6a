//! Ordinary least squares.
//!
//! The forecasting engine solves one small regression per request (2 to 14
//! columns, one row per observed month). SVD handles the tall, possibly
//! rank-deficient design matrix without panicking, unlike `QR::solve`, which
//! expects square systems.

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

/// Coefficients plus residual sum of squares.
#[derive(Debug, Clone, PartialEq)]
pub struct OlsFit {
    pub betas: Vec<f64>,
    pub sse: f64,
}

/// Fit `y ≈ X β` where `X` is built row by row with `fill_row(i, row)`.
pub fn fit_rows(n: usize, p: usize, y: &[f64], mut fill_row: impl FnMut(usize, &mut [f64])) -> Option<OlsFit> {
    if n == 0 || p == 0 || y.len() != n || y.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let mut x = DMatrix::<f64>::zeros(n, p);
    let mut row = vec![0.0; p];
    for i in 0..n {
        fill_row(i, &mut row);
        for j in 0..p {
            x[(i, j)] = row[j];
        }
    }
    let yv = DVector::from_column_slice(y);

    let beta = solve_least_squares(&x, &yv)?;
    let residuals = &yv - &x * &beta;
    let sse = residuals.norm_squared();

    sse.is_finite().then(|| OlsFit {
        betas: beta.iter().copied().collect(),
        sse,
    })
}
