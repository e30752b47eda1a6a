//! Pipeline configuration.
//!
//! Defaults are compiled in; `PipelineConfig::from_env` layers `.env` and
//! process environment on top. CLI flags are applied last by `app`.

use std::path::PathBuf;

use crate::domain::CategoryColumns;
use crate::error::AppError;

/// Column holding the measured KPI value in the monthly exports.
pub const DEFAULT_VALUE_COLUMN: &str = "Actual Value MAPS Networks";

/// Settings for the built-in trend + seasonality engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Minimum observed span (months) before yearly seasonality is fitted.
    pub seasonal_min_months: u32,
    /// Number of Fourier harmonics for the yearly cycle.
    pub fourier_order: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seasonal_min_months: 24,
            fourier_order: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub value_column: String,
    pub category_columns: CategoryColumns,
    /// Parent directory for request workspaces (system temp dir when `None`).
    pub work_root: Option<PathBuf>,
    pub engine: EngineConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            value_column: DEFAULT_VALUE_COLUMN.to_string(),
            category_columns: CategoryColumns::default(),
            work_root: None,
            engine: EngineConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load `.env` (if any) and read `KPIF_*` overrides.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (used by tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut config = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = non_empty("KPIF_VALUE_COLUMN") {
            config.value_column = v;
        }
        if let Some(v) = non_empty("KPIF_WORK_DIR") {
            config.work_root = Some(PathBuf::from(v));
        }
        if let Some(v) = non_empty("KPIF_COUNTRY_COLUMN") {
            config.category_columns.country = v;
        }
        if let Some(v) = non_empty("KPIF_TECHNOLOGY_COLUMN") {
            config.category_columns.technology = v;
        }
        if let Some(v) = non_empty("KPIF_ZONE_COLUMN") {
            config.category_columns.zone = v;
        }
        if let Some(v) = non_empty("KPIF_KPI_COLUMN") {
            config.category_columns.kpi = v;
        }
        if let Some(v) = non_empty("KPIF_SEASONAL_MIN_MONTHS") {
            config.engine.seasonal_min_months = v.trim().parse().map_err(|_| {
                AppError::input(format!("KPIF_SEASONAL_MIN_MONTHS must be a whole number (got '{v}')"))
            })?;
        }
        if let Some(v) = non_empty("KPIF_FOURIER_ORDER") {
            let order: usize = v.trim().parse().map_err(|_| {
                AppError::input(format!("KPIF_FOURIER_ORDER must be a whole number (got '{v}')"))
            })?;
            if order > 6 {
                return Err(AppError::input(format!(
                    "KPIF_FOURIER_ORDER must be at most 6 for monthly data (got {order})"
                )));
            }
            config.engine.fourier_order = order;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = PipelineConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.value_column, DEFAULT_VALUE_COLUMN);
        assert_eq!(config.category_columns.kpi, "KPI");
    }

    #[test]
    fn overrides_are_applied() {
        let config = PipelineConfig::from_lookup(lookup(&[
            ("KPIF_VALUE_COLUMN", "Value"),
            ("KPIF_ZONE_COLUMN", "Region"),
            ("KPIF_FOURIER_ORDER", "2"),
            ("KPIF_WORK_DIR", "  "),
        ]))
        .unwrap();

        assert_eq!(config.value_column, "Value");
        assert_eq!(config.category_columns.zone, "Region");
        assert_eq!(config.engine.fourier_order, 2);
        assert_eq!(config.work_root, None);
    }

    #[test]
    fn bad_numbers_are_input_errors() {
        let err = PipelineConfig::from_lookup(lookup(&[("KPIF_FOURIER_ORDER", "many")])).unwrap_err();
        assert!(matches!(err, AppError::Input(_)));
        let err = PipelineConfig::from_lookup(lookup(&[("KPIF_FOURIER_ORDER", "9")])).unwrap_err();
        assert!(matches!(err, AppError::Input(_)));
    }
}
