//! Utility functions for the solar-forecast crate

use chrono::{Datelike, NaiveDate};

/// Last day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = next_year_month(date.year(), date.month());
    // First day of the following month always exists, as does its predecessor.
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.pred_opt())
        .unwrap_or(date)
}

/// Last day of the month after the one containing `date`.
///
/// This is the monthly stepping rule for forecast dates: each step lands on
/// the end of the next calendar month, regardless of the day `date` falls on.
pub fn next_month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = next_year_month(date.year(), date.month());
    month_end(NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date))
}

fn next_year_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// Arithmetic mean of a slice; 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance of a slice; 0.0 for an empty slice.
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}
