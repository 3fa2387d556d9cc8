//! Error types for the solar-forecast crate

use thiserror::Error;

/// Custom error types for the solar-forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// No observations survive filtering, or every value is missing
    #[error("Empty series: {0}")]
    EmptySeries(String),

    /// An observation date string does not match the expected format
    #[error("Date parse error: {0}")]
    DateParse(String),

    /// The series is too short for the requested operation
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// The model order is incompatible with the series
    #[error("Invalid model order: {0}")]
    InvalidOrder(String),

    /// The likelihood optimizer exhausted its budget without converging
    #[error("Optimizer failed to converge: {0}")]
    Convergence(String),

    /// The fitted model carries no date index and no anchor was supplied
    #[error("Missing anchor date: {0}")]
    MissingAnchorDate(String),

    /// Error from invalid call parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from CSV reading or writing
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error from model serialization
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::Serialization(err.to_string())
    }
}
