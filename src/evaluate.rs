//! Forecast accuracy evaluation
//!
//! Measures how closely the model tracks the trailing window of the series
//! it was fit on, using static one-step-ahead predictions: each prediction
//! sees only actual history, never earlier predictions. Note this is
//! in-sample accuracy, not holdout validation — the window is part of the
//! data the model was trained on.

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::models::SarimaFit;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Default trailing window, one seasonal cycle of monthly data
pub const DEFAULT_EVALUATION_WINDOW: usize = 12;

/// Accuracy of a model over the trailing evaluation window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracyReport {
    /// Mean squared error of one-step predictions vs. actual values
    pub mean_squared_error: f64,
}

impl fmt::Display for AccuracyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Accuracy over trailing window:")?;
        writeln!(f, "  MSE: {:.4}", self.mean_squared_error)?;
        Ok(())
    }
}

/// Evaluate a fitted model against the trailing `window` observations of
/// `series`.
///
/// # Errors
///
/// * [`ForecastError::InvalidParameter`] when `window` is zero
/// * [`ForecastError::InsufficientData`] when the series has fewer than
///   `window` observations
pub fn evaluate(
    model: &SarimaFit,
    series: &TimeSeries,
    window: usize,
) -> Result<AccuracyReport> {
    if window == 0 {
        return Err(ForecastError::InvalidParameter(
            "evaluation window must be positive".to_string(),
        ));
    }
    if series.len() < window {
        return Err(ForecastError::InsufficientData(format!(
            "evaluation window of {} exceeds series length of {}",
            window,
            series.len()
        )));
    }

    let predictions = model.one_step_predictions(series.values());
    let start = series.len() - window;
    let mean_squared_error = series.values()[start..]
        .iter()
        .zip(&predictions[start..])
        .map(|(actual, predicted)| (actual - predicted).powi(2))
        .sum::<f64>()
        / window as f64;

    debug!(window, mean_squared_error, "evaluated trailing window");
    Ok(AccuracyReport { mean_squared_error })
}
