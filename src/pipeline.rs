//! End-to-end forecasting pipeline
//!
//! Sequences preparation, the stationarity diagnostic, fitting, per-horizon
//! forecast generation, and evaluation. The first failing stage aborts the
//! run; errors propagate to the caller untranslated.

use crate::data::{RawObservation, SeriesPreparer, TimeSeries};
use crate::error::Result;
use crate::evaluate::{self, AccuracyReport, DEFAULT_EVALUATION_WINDOW};
use crate::forecast::{self, ForecastTable};
use crate::models::{SarimaFit, SarimaSpec};
use crate::stationarity::{self, StationarityReport};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Default forecast horizons in months: 6 months to 15 years
pub const DEFAULT_HORIZONS: [usize; 6] = [6, 12, 24, 60, 120, 180];

/// Configuration of a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Model order to fit
    pub spec: SarimaSpec,
    /// Horizons to forecast, in months
    pub horizons: Vec<usize>,
    /// Trailing window length for accuracy evaluation
    pub evaluation_window: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            spec: SarimaSpec::default(),
            horizons: DEFAULT_HORIZONS.to_vec(),
            evaluation_window: DEFAULT_EVALUATION_WINDOW,
        }
    }
}

/// Everything a pipeline run produces, for downstream display, export, or
/// persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    /// The prepared series the model was fit on
    pub series: TimeSeries,
    /// Stationarity diagnostic of the prepared series
    pub stationarity: StationarityReport,
    /// The fitted model
    pub model: SarimaFit,
    /// One forecast table per configured horizon, in configuration order
    pub forecasts: Vec<ForecastTable>,
    /// Trailing-window accuracy of the fitted model
    pub accuracy: AccuracyReport,
}

/// Sequences the forecasting stages over a raw observation table
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// The pipeline's configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full pipeline on a raw observation table.
    ///
    /// The stationarity diagnostic never gates fitting: a non-stationary
    /// verdict is logged as a warning and the configured differencing
    /// orders are used as-is.
    pub fn run(&self, rows: &[RawObservation]) -> Result<PipelineReport> {
        let series = SeriesPreparer::prepare(rows)?;
        info!(observations = series.len(), "prepared solar series");

        let stationarity = stationarity::analyze(&series)?;
        if stationarity.is_stationary {
            info!(p_value = stationarity.p_value, "series is stationary");
        } else {
            warn!(
                p_value = stationarity.p_value,
                "series looks non-stationary; proceeding with the configured differencing orders"
            );
        }

        let model = self.config.spec.fit(&series)?;

        let mut forecasts = Vec::with_capacity(self.config.horizons.len());
        for &horizon in &self.config.horizons {
            let table = forecast::generate(&model, horizon, None)?;
            info!(horizon, "generated forecast");
            forecasts.push(table);
        }

        let accuracy = evaluate::evaluate(&model, &series, self.config.evaluation_window)?;
        info!(
            window = self.config.evaluation_window,
            mse = accuracy.mean_squared_error,
            "evaluated model"
        );

        Ok(PipelineReport {
            series,
            stationarity,
            model,
            forecasts,
            accuracy,
        })
    }
}
