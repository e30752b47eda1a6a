//! Error taxonomy shared by every pipeline stage.
//!
//! Each variant carries a ready-to-display message and maps to both a process
//! exit code (CLI) and an HTTP status class (for an HTTP front end).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// Caller-correctable problem with the upload or the request parameters.
    #[error("{0}")]
    Input(String),

    /// The forecasting engine rejected or failed on otherwise valid input.
    #[error("{0}")]
    Forecast(String),

    /// Anything unanticipated (I/O, serialization).
    #[error("{0}")]
    Pipeline(String),
}

impl AppError {
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }

    /// Wrap an engine diagnostic.
    pub fn forecast(diagnostic: impl std::fmt::Display) -> Self {
        Self::Forecast(format!("Forecast failed: {diagnostic}"))
    }

    pub fn pipeline(detail: impl std::fmt::Display) -> Self {
        Self::Pipeline(format!("Pipeline error: {detail}"))
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Input(_) => 2,
            AppError::Forecast(_) => 3,
            AppError::Pipeline(_) => 4,
        }
    }

    /// Status an HTTP front end should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::Input(_) | AppError::Forecast(_) => 400,
            AppError::Pipeline(_) => 500,
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            AppError::Input(_) => "input",
            AppError::Forecast(_) => "forecast",
            AppError::Pipeline(_) => "pipeline",
        }
    }
}
