//! Dated forecast generation
//!
//! Turns a fitted model into a table of future `(date, value)` points at
//! monthly spacing. Dates follow the end-of-month convention: each forecast
//! date is the last day of its month, starting one month after the anchor.

use crate::error::{ForecastError, Result};
use crate::models::SarimaFit;
use crate::utils::next_month_end;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Header of the forecast table's date column
pub const DATE_COLUMN: &str = "Date";

/// Header of the forecast table's value column. This naming is the contract
/// with downstream CSV and display consumers.
pub const VALUE_COLUMN: &str = "Predicted Solar Production (GWh)";

/// One forecast value at a future month-end date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Month-end date of the forecast
    pub date: NaiveDate,
    /// Conditional mean of the model at this step
    pub predicted_value: f64,
}

/// An ordered table of forecast points, one per requested month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastTable {
    points: Vec<ForecastPoint>,
}

impl ForecastTable {
    /// The forecast points, in date order
    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    /// Number of forecast points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Forecast dates as a vector
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|point| point.date).collect()
    }

    /// Predicted values as a vector
    pub fn predicted_values(&self) -> Vec<f64> {
        self.points.iter().map(|point| point.predicted_value).collect()
    }

    /// Write the table as CSV with the contract header
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record([DATE_COLUMN, VALUE_COLUMN])?;
        for point in &self.points {
            csv_writer.write_record([
                point.date.format("%Y-%m-%d").to_string(),
                point.predicted_value.to_string(),
            ])?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Write the table as a CSV file at `path`
    pub fn write_csv_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_csv(file)
    }

    /// Render the table as a CSV string
    pub fn to_csv_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| ForecastError::Serialization(e.to_string()))
    }
}

impl fmt::Display for ForecastTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<12}{}", DATE_COLUMN, VALUE_COLUMN)?;
        for point in &self.points {
            writeln!(
                f,
                "{:<12}{:.4}",
                point.date.format("%Y-%m-%d").to_string(),
                point.predicted_value
            )?;
        }
        Ok(())
    }
}

/// Generate a dated forecast table from a fitted model.
///
/// Anchor resolution: when the model carries a training date index, the
/// first forecast date is one month after the last training date and
/// `anchor_date` is ignored. Otherwise `anchor_date` must be supplied.
///
/// Calling this twice with identical arguments yields identical tables, and
/// a shorter horizon is always a prefix of a longer one.
///
/// # Errors
///
/// * [`ForecastError::InvalidParameter`] when `horizon` is zero
/// * [`ForecastError::MissingAnchorDate`] when the model has no date index
///   and no anchor was supplied
pub fn generate(
    model: &SarimaFit,
    horizon: usize,
    anchor_date: Option<NaiveDate>,
) -> Result<ForecastTable> {
    if horizon == 0 {
        return Err(ForecastError::InvalidParameter(
            "forecast horizon must be positive".to_string(),
        ));
    }

    let anchor = model
        .last_training_date()
        .or(anchor_date)
        .ok_or_else(|| {
            ForecastError::MissingAnchorDate(
                "the fitted model has no date index; supply an anchor date".to_string(),
            )
        })?;

    let values = model.forecast_values(horizon);
    let mut date = next_month_end(anchor);
    let mut points = Vec::with_capacity(horizon);
    for predicted_value in values {
        points.push(ForecastPoint {
            date,
            predicted_value,
        });
        date = next_month_end(date);
    }

    debug!(horizon, anchor = %anchor, "generated forecast table");
    Ok(ForecastTable { points })
}
