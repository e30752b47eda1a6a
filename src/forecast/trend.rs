//! Built-in engine: linear trend plus optional yearly seasonality.
//!
//! Deterministic for a given series. The interval is a normal-approximation
//! 80% band around the fitted line, widening with the forecast step.

use crate::config::EngineConfig;
use crate::domain::TimeSeries;
use crate::forecast::engine::{EngineError, EngineOutput, EnginePoint, ForecastEngine, add_months, months_between};
use crate::math::{TrendBasis, fit_rows};

/// z-score for a central 80% interval.
pub const Z_80: f64 = 1.2816;

/// Minimum observations for any fit.
const MIN_OBSERVATIONS: usize = 2;

#[derive(Debug, Clone, Default)]
pub struct TrendSeasonalEngine {
    config: EngineConfig,
}

impl TrendSeasonalEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Pick the basis for a series covering `span_months` with `n` points.
    fn basis_for(&self, span_months: i64, n: usize) -> TrendBasis {
        let seasonal = TrendBasis::seasonal(self.config.fourier_order);
        let long_enough = span_months >= self.config.seasonal_min_months as i64;
        // Two spare degrees of freedom beyond the coefficients.
        if self.config.fourier_order > 0 && long_enough && n >= seasonal.len() + 2 {
            seasonal
        } else {
            TrendBasis::linear()
        }
    }
}

impl ForecastEngine for TrendSeasonalEngine {
    fn name(&self) -> &str {
        "trend-seasonal"
    }

    fn forecast(&self, series: &TimeSeries, periods: usize) -> Result<EngineOutput, EngineError> {
        let n = series.len();
        let (Some(first), Some(last)) = (series.first_date(), series.last_date()) else {
            return Err(EngineError::InsufficientData {
                needed: MIN_OBSERVATIONS,
                got: n,
            });
        };
        if n < MIN_OBSERVATIONS {
            return Err(EngineError::InsufficientData {
                needed: MIN_OBSERVATIONS,
                got: n,
            });
        }

        let t: Vec<f64> = series
            .observations()
            .iter()
            .map(|o| months_between(first, o.date) as f64)
            .collect();
        let y = series.values();
        let t_last = months_between(first, last);

        let basis = self.basis_for(t_last + 1, n);
        let fit = fit_rows(n, basis.len(), &y, |i, row| basis.fill_design_row(t[i], row))
            .ok_or_else(|| EngineError::Computation("least squares solve failed".to_string()))?;

        let dof = n.saturating_sub(basis.len()).max(1);
        let sigma = (fit.sse / dof as f64).sqrt();
        tracing::debug!(
            engine = self.name(),
            coefficients = basis.len(),
            harmonics = basis.harmonics,
            sigma,
            "model fitted"
        );

        let mut points = Vec::with_capacity(n + periods);
        let in_sample = Z_80 * sigma;
        for (obs, &ti) in series.observations().iter().zip(&t) {
            let estimate = basis.predict(ti, &fit.betas);
            points.push(EnginePoint {
                date: obs.date,
                estimate,
                lower: estimate - in_sample,
                upper: estimate + in_sample,
            });
        }

        for h in 1..=periods {
            let date = add_months(last, h as u32)
                .ok_or_else(|| EngineError::Computation(format!("date overflow {h} months after {last}")))?;
            let estimate = basis.predict((t_last + h as i64) as f64, &fit.betas);
            let half = Z_80 * sigma * (1.0 + h as f64 / n as f64).sqrt();
            points.push(EnginePoint {
                date,
                estimate,
                lower: estimate - half,
                upper: estimate + half,
            });
        }

        if let Some(bad) = points
            .iter()
            .find(|p| !(p.estimate.is_finite() && p.lower.is_finite() && p.upper.is_finite()))
        {
            return Err(EngineError::NonFinite(format!("at {}", bad.date)));
        }

        Ok(EngineOutput { points })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::domain::Observation;

    fn ymd(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn monthly(start: NaiveDate, values: &[f64]) -> TimeSeries {
        let obs = values
            .iter()
            .enumerate()
            .map(|(i, &value)| Observation {
                date: add_months(start, i as u32).unwrap(),
                value,
            })
            .collect();
        TimeSeries::new(obs).unwrap()
    }

    #[test]
    fn straight_line_is_extrapolated() {
        let series = monthly(ymd(2023, 1), &[10.0, 12.0, 14.0, 16.0]);
        let out = TrendSeasonalEngine::default().forecast(&series, 2).unwrap();

        assert_eq!(out.points.len(), 6);
        let future = &out.points[4..];
        assert_eq!(future[0].date, ymd(2023, 5));
        assert_eq!(future[1].date, ymd(2023, 6));
        assert!((future[0].estimate - 18.0).abs() < 1e-6);
        assert!((future[1].estimate - 20.0).abs() < 1e-6);
        assert!((future[1].upper - future[1].lower).abs() < 1e-6);
    }

    #[test]
    fn gaps_keep_calendar_spacing() {
        let series = TimeSeries::new(vec![
            Observation { date: ymd(2023, 1), value: 1.0 },
            Observation { date: ymd(2023, 4), value: 4.0 },
        ])
        .unwrap();
        let out = TrendSeasonalEngine::default().forecast(&series, 1).unwrap();

        let last = out.points.last().unwrap();
        assert_eq!(last.date, ymd(2023, 5));
        assert!((last.estimate - 5.0).abs() < 1e-6);
    }

    #[test]
    fn yearly_cycle_is_picked_up_with_enough_history() {
        let values: Vec<f64> = (0..36)
            .map(|i| 50.0 + 0.1 * i as f64 + 5.0 * (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin())
            .collect();
        let series = monthly(ymd(2021, 1), &values);
        let out = TrendSeasonalEngine::default().forecast(&series, 3).unwrap();

        for (h, p) in out.points[36..].iter().enumerate() {
            let i = (36 + h) as f64;
            let expected = 50.0 + 0.1 * i + 5.0 * (2.0 * std::f64::consts::PI * i / 12.0).sin();
            assert!((p.estimate - expected).abs() < 1e-6, "step {h}: {} vs {expected}", p.estimate);
        }
    }

    #[test]
    fn interval_widens_with_horizon() {
        let mut rng = StdRng::seed_from_u64(7);
        let values: Vec<f64> = (0..18).map(|i| 90.0 + 0.2 * i as f64 + rng.gen_range(-1.0..1.0)).collect();
        let series = monthly(ymd(2022, 1), &values);
        let out = TrendSeasonalEngine::default().forecast(&series, 12).unwrap();

        let widths: Vec<f64> = out.points[18..].iter().map(|p| p.upper - p.lower).collect();
        assert!(widths[0] > 0.0);
        assert!(widths.windows(2).all(|w| w[1] > w[0]));
        assert!(out.points.iter().all(|p| p.lower <= p.estimate && p.estimate <= p.upper));
    }

    #[test]
    fn single_observation_is_rejected() {
        let series = monthly(ymd(2023, 1), &[5.0]);
        let err = TrendSeasonalEngine::default().forecast(&series, 3).unwrap_err();
        assert_eq!(err, EngineError::InsufficientData { needed: 2, got: 1 });
    }
}
