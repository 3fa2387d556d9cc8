//! Stationarity diagnostics for prepared time series
//!
//! The augmented Dickey-Fuller regression here uses a constant and no trend
//! term, with the lag order picked by the Schwert rule. The report is purely
//! informational: the pipeline logs the verdict and proceeds with the
//! caller-supplied differencing orders either way.

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::debug;

/// Minimum series length for a meaningful ADF regression
const MIN_OBSERVATIONS: usize = 24;

/// p-value threshold below which the unit-root hypothesis is rejected
const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Finite-sample critical values of the ADF distribution (constant case)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalValues {
    /// 1% critical value
    pub cv_1pct: f64,
    /// 5% critical value
    pub cv_5pct: f64,
    /// 10% critical value
    pub cv_10pct: f64,
}

/// Outcome of the augmented Dickey-Fuller unit-root test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationarityReport {
    /// t-statistic of the lagged level coefficient
    pub test_statistic: f64,
    /// MacKinnon approximate p-value
    pub p_value: f64,
    /// Number of lagged difference terms included in the regression
    pub lags: usize,
    /// Critical values at conventional significance levels
    pub critical_values: CriticalValues,
    /// Whether the unit-root hypothesis is rejected at the 5% level
    pub is_stationary: bool,
}

/// Run the stationarity diagnostic on a prepared series.
///
/// # Errors
///
/// [`ForecastError::InsufficientData`] when the series is shorter than the
/// minimum viable length for the test.
pub fn analyze(series: &TimeSeries) -> Result<StationarityReport> {
    adf_test(series.values(), None)
}

/// Augmented Dickey-Fuller test on a raw value sequence.
///
/// `max_lags` overrides the Schwert-rule lag order; it is clamped so the
/// regression keeps enough residual degrees of freedom.
pub fn adf_test(values: &[f64], max_lags: Option<usize>) -> Result<StationarityReport> {
    let n = values.len();
    if n < MIN_OBSERVATIONS {
        return Err(ForecastError::InsufficientData(format!(
            "ADF test requires at least {} observations, got {}",
            MIN_OBSERVATIONS, n
        )));
    }

    let mut lags = max_lags.unwrap_or_else(|| schwert_lag_order(n));
    // Keep at least five residual degrees of freedom.
    while lags > 0 && n < 2 * lags + 8 {
        lags -= 1;
    }

    let diffs: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();

    // Rows: delta y_t on [1, y_{t-1}, delta y_{t-1}, .., delta y_{t-lags}]
    let columns = lags + 2;
    let mut design: Vec<Vec<f64>> = Vec::new();
    let mut target: Vec<f64> = Vec::new();
    for t in (lags + 1)..n {
        let mut row = Vec::with_capacity(columns);
        row.push(1.0);
        row.push(values[t - 1]);
        for lag in 1..=lags {
            row.push(diffs[t - 1 - lag]);
        }
        design.push(row);
        target.push(diffs[t - 1]);
    }

    let rows = design.len();
    let ols = ols_with_standard_error(&design, &target, 1).ok_or_else(|| {
        ForecastError::InsufficientData(
            "ADF regression is degenerate (constant or collinear series)".to_string(),
        )
    })?;
    let test_statistic = ols.coefficient / ols.standard_error;

    let p_value = mackinnon_p_value(test_statistic);
    let critical_values = mackinnon_critical_values(rows);
    let is_stationary = p_value <= SIGNIFICANCE_LEVEL;

    debug!(
        statistic = test_statistic,
        p_value,
        lags,
        stationary = is_stationary,
        "ADF test"
    );

    Ok(StationarityReport {
        test_statistic,
        p_value,
        lags,
        critical_values,
        is_stationary,
    })
}

/// Schwert (1989) rule of thumb: 12 * (n / 100)^(1/4), truncated.
fn schwert_lag_order(n: usize) -> usize {
    (12.0 * (n as f64 / 100.0).powf(0.25)).floor() as usize
}

struct OlsCoefficient {
    coefficient: f64,
    standard_error: f64,
}

/// Least-squares fit via normal equations, returning the coefficient at
/// `index` and its standard error. `None` when the system is singular or
/// has no residual degrees of freedom.
fn ols_with_standard_error(
    design: &[Vec<f64>],
    target: &[f64],
    index: usize,
) -> Option<OlsCoefficient> {
    let rows = design.len();
    let columns = design.first()?.len();
    if rows <= columns {
        return None;
    }

    let mut xtx = vec![vec![0.0; columns]; columns];
    let mut xty = vec![0.0; columns];
    for (row, &y) in design.iter().zip(target) {
        for i in 0..columns {
            xty[i] += row[i] * y;
            for j in 0..columns {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }

    let beta = solve_linear_system(xtx.clone(), xty)?;

    let mut unit = vec![0.0; columns];
    unit[index] = 1.0;
    let inverse_column = solve_linear_system(xtx, unit)?;

    let rss: f64 = design
        .iter()
        .zip(target)
        .map(|(row, &y)| {
            let predicted: f64 = row.iter().zip(&beta).map(|(x, b)| x * b).sum();
            (y - predicted).powi(2)
        })
        .sum();
    let sigma2 = rss / (rows - columns) as f64;
    let variance = sigma2 * inverse_column[index];
    if !variance.is_finite() || variance <= 0.0 {
        return None;
    }

    Some(OlsCoefficient {
        coefficient: beta[index],
        standard_error: variance.sqrt(),
    })
}

/// Gaussian elimination with partial pivoting.
fn solve_linear_system(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    for pivot in 0..n {
        let best = (pivot..n).max_by(|&i, &j| {
            a[i][pivot]
                .abs()
                .partial_cmp(&a[j][pivot].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if a[best][pivot].abs() < 1e-12 {
            return None;
        }
        a.swap(pivot, best);
        b.swap(pivot, best);

        for row in (pivot + 1)..n {
            let factor = a[row][pivot] / a[pivot][pivot];
            for col in pivot..n {
                a[row][col] -= factor * a[pivot][col];
            }
            b[row] -= factor * b[pivot];
        }
    }

    let mut x = vec![0.0; n];
    for pivot in (0..n).rev() {
        let mut sum = b[pivot];
        for col in (pivot + 1)..n {
            sum -= a[pivot][col] * x[col];
        }
        x[pivot] = sum / a[pivot][pivot];
    }
    Some(x)
}

/// MacKinnon (1994) approximate p-value for the constant-only case.
fn mackinnon_p_value(statistic: f64) -> f64 {
    const TAU_MAX: f64 = 2.74;
    const TAU_MIN: f64 = -18.83;
    const TAU_STAR: f64 = -1.61;
    const SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
    const LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

    if statistic > TAU_MAX {
        return 1.0;
    }
    if statistic < TAU_MIN {
        return 0.0;
    }
    let z = if statistic <= TAU_STAR {
        polyval(&SMALL_P, statistic)
    } else {
        polyval(&LARGE_P, statistic)
    };
    // Unit normal always constructs.
    let normal = Normal::new(0.0, 1.0).unwrap();
    normal.cdf(z)
}

/// MacKinnon (2010) finite-sample critical value surface, constant case.
fn mackinnon_critical_values(nobs: usize) -> CriticalValues {
    const ONE_PCT: [f64; 4] = [-3.43035, -6.5393, -16.786, -79.433];
    const FIVE_PCT: [f64; 4] = [-2.86154, -2.8903, -4.234, -40.04];
    const TEN_PCT: [f64; 4] = [-2.56677, -1.5384, -2.809, 0.0];

    let n = nobs as f64;
    let surface = |b: &[f64; 4]| b[0] + b[1] / n + b[2] / (n * n) + b[3] / (n * n * n);
    CriticalValues {
        cv_1pct: surface(&ONE_PCT),
        cv_5pct: surface(&FIVE_PCT),
        cv_10pct: surface(&TEN_PCT),
    }
}

fn polyval(coefficients: &[f64], x: f64) -> f64 {
    coefficients
        .iter()
        .rev()
        .fold(0.0, |acc, &c| acc * x + c)
}
