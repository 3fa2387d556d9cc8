//! Raw observation handling and time series preparation

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Textual date format of the raw observation table, e.g. `01-Jan-2019`.
pub const DATE_FORMAT: &str = "%d-%b-%Y";

/// Case-insensitive series name filter applied during preparation.
const SERIES_FILTER: &str = "solar";

/// One row of the raw observation table.
///
/// Source tables span multiple series; only rows whose `series_name`
/// contains "solar" (case-insensitive) are retained by [`SeriesPreparer`].
/// A missing `observation_value` is legal input and resolved by the fill
/// step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    /// Name of the series this row belongs to
    #[serde(rename = "Series name")]
    pub series_name: String,
    /// Observation date in `%d-%b-%Y` form
    #[serde(rename = "Observation Date")]
    pub observation_date: String,
    /// Observed value, absent when the source had a gap
    #[serde(rename = "Observation Value")]
    pub observation_value: Option<f64>,
}

impl RawObservation {
    /// Create a new raw observation row
    pub fn new(
        series_name: impl Into<String>,
        observation_date: impl Into<String>,
        observation_value: Option<f64>,
    ) -> Self {
        Self {
            series_name: series_name.into(),
            observation_date: observation_date.into(),
            observation_value,
        }
    }
}

/// Loader for raw observation tables
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load raw observations from a CSV file with a header row
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<RawObservation>> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Load raw observations from any reader producing CSV with a header row
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<RawObservation>> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut rows = Vec::new();
        for record in csv_reader.deserialize() {
            rows.push(record?);
        }
        Ok(rows)
    }
}

/// A cleaned, date-ordered monthly series with no missing values.
///
/// Duplicate dates are preserved as-is: preparation sorts stably, so rows
/// that share a date keep their input order and later values supersede
/// earlier ones when the series is consumed positionally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Create a time series from parallel date and value vectors
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "dates length ({}) doesn't match values length ({})",
                dates.len(),
                values.len()
            )));
        }
        Ok(Self { dates, values })
    }

    /// Observation dates, ascending
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Observation values, aligned with `dates`
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Date of the most recent observation
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Mean of the observation values
    pub fn mean(&self) -> f64 {
        crate::utils::mean(&self.values)
    }

    /// Standard deviation of the observation values
    pub fn std_dev(&self) -> f64 {
        crate::utils::variance(&self.values).sqrt()
    }
}

/// Cleans and indexes a raw observation table into a single ordered series
#[derive(Debug)]
pub struct SeriesPreparer;

impl SeriesPreparer {
    /// Prepare a raw observation table for modeling.
    ///
    /// Filters to solar rows, parses dates, sorts ascending, and fills
    /// missing values forward from the nearest prior observation, then any
    /// remaining leading gaps backward from the nearest following one.
    ///
    /// # Errors
    ///
    /// * [`ForecastError::EmptySeries`] if no row matches the solar filter,
    ///   or every matching row has a missing value
    /// * [`ForecastError::DateParse`] on any malformed observation date
    pub fn prepare(rows: &[RawObservation]) -> Result<TimeSeries> {
        let mut kept: Vec<(NaiveDate, Option<f64>)> = Vec::new();
        for row in rows {
            if !row.series_name.to_lowercase().contains(SERIES_FILTER) {
                continue;
            }
            let date = NaiveDate::parse_from_str(&row.observation_date, DATE_FORMAT)
                .map_err(|_| {
                    ForecastError::DateParse(format!(
                        "'{}' does not match the {} format",
                        row.observation_date, DATE_FORMAT
                    ))
                })?;
            kept.push((date, row.observation_value));
        }

        if kept.is_empty() {
            return Err(ForecastError::EmptySeries(format!(
                "no rows with a series name containing '{}'",
                SERIES_FILTER
            )));
        }

        // Stable sort: rows sharing a date keep their input order.
        kept.sort_by_key(|(date, _)| *date);

        let dates: Vec<NaiveDate> = kept.iter().map(|(date, _)| *date).collect();
        let mut values: Vec<Option<f64>> = kept.iter().map(|(_, value)| *value).collect();
        fill_missing(&mut values);

        let values: Vec<f64> = values
            .into_iter()
            .collect::<Option<Vec<f64>>>()
            .ok_or_else(|| {
                ForecastError::EmptySeries("every observation value is missing".to_string())
            })?;

        debug!(
            rows_in = rows.len(),
            rows_kept = values.len(),
            "prepared solar series"
        );

        TimeSeries::new(dates, values)
    }
}

/// Forward fill, then backward fill remaining leading gaps.
///
/// Leaves every slot `None` only when the input contains no value at all.
fn fill_missing(values: &mut [Option<f64>]) {
    let mut last_seen = None;
    for value in values.iter_mut() {
        match *value {
            Some(v) => last_seen = Some(v),
            None => *value = last_seen,
        }
    }
    let mut next_seen = None;
    for value in values.iter_mut().rev() {
        match *value {
            Some(v) => next_seen = Some(v),
            None => *value = next_seen,
        }
    }
}
