//! Design rows for the monthly trend + yearly-seasonality model.
//!
//! The model for month index `t` (months since the first observation) is:
//!
//! ```text
//! y(t) = β0 + β1 t + Σ_k [ a_k sin(2πkt/12) + b_k cos(2πkt/12) ]
//! ```
//!
//! With `harmonics = 0` this is a straight-line trend.

use std::f64::consts::PI;

/// Months per seasonal cycle.
pub const SEASON_LENGTH: f64 = 12.0;

/// Shape of the regression basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendBasis {
    /// Number of Fourier harmonics for the yearly cycle (0 disables seasonality).
    pub harmonics: usize,
}

impl TrendBasis {
    pub fn linear() -> Self {
        Self { harmonics: 0 }
    }

    pub fn seasonal(harmonics: usize) -> Self {
        Self { harmonics }
    }

    /// Number of coefficients.
    pub fn len(&self) -> usize {
        2 + 2 * self.harmonics
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Fill a design row for month index `t`.
    ///
    /// # Panics
    /// Panics if `out` is shorter than `self.len()`.
    pub fn fill_design_row(&self, t: f64, out: &mut [f64]) {
        out[0] = 1.0;
        out[1] = t;
        for k in 1..=self.harmonics {
            let angle = 2.0 * PI * k as f64 * t / SEASON_LENGTH;
            out[2 * k] = angle.sin();
            out[2 * k + 1] = angle.cos();
        }
    }

    /// Evaluate the model at `t`.
    pub fn predict(&self, t: f64, betas: &[f64]) -> f64 {
        let mut row = vec![0.0; self.len()];
        self.fill_design_row(t, &mut row);
        row.iter().zip(betas).map(|(x, b)| x * b).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_row_is_intercept_and_slope() {
        let basis = TrendBasis::linear();
        let mut row = vec![0.0; basis.len()];
        basis.fill_design_row(5.0, &mut row);
        assert_eq!(row, vec![1.0, 5.0]);
        assert!((basis.predict(5.0, &[2.0, 0.5]) - 4.5).abs() < 1e-12);
    }

    #[test]
    fn seasonal_terms_repeat_every_twelve_months() {
        let basis = TrendBasis::seasonal(3);
        assert_eq!(basis.len(), 8);

        let mut a = vec![0.0; basis.len()];
        let mut b = vec![0.0; basis.len()];
        basis.fill_design_row(3.0, &mut a);
        basis.fill_design_row(15.0, &mut b);
        for j in 2..basis.len() {
            assert!((a[j] - b[j]).abs() < 1e-9, "column {j}: {} vs {}", a[j], b[j]);
        }
        assert_eq!(b[1] - a[1], 12.0);
    }
}
