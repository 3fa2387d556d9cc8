//! Seasonal ARIMA model specification and fitting
//!
//! The model is fit on the differenced series `(1-B)^d (1-B^s)^D y`, with
//! non-seasonal AR/MA terms at lags `1..=p` / `1..=q` and seasonal terms at
//! multiples of the period. Estimation minimizes the conditional sum of
//! squares, which is Gaussian maximum likelihood up to initialization:
//! Yule-Walker starting values refined by Nelder-Mead.

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::models::optimizer::{nelder_mead, NelderMeadOptions};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// An unfitted SARIMA(p,d,q)(P,D,Q)[s] specification.
///
/// Immutable configuration supplied by the caller; order selection is out of
/// scope. Call [`SarimaSpec::fit()`] to obtain a [`SarimaFit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SarimaSpec {
    p: usize,
    d: usize,
    q: usize,
    seasonal_p: usize,
    seasonal_d: usize,
    seasonal_q: usize,
    seasonal_period: usize,
}

impl Default for SarimaSpec {
    /// SARIMA(1,1,1)(1,1,1)[12] — monthly data with annual seasonality.
    fn default() -> Self {
        Self::new(1, 1, 1, 1, 1, 1, 12)
    }
}

impl SarimaSpec {
    /// Create a new specification with non-seasonal order `(p, d, q)` and
    /// seasonal order `(P, D, Q)` at period `s`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        p: usize,
        d: usize,
        q: usize,
        seasonal_p: usize,
        seasonal_d: usize,
        seasonal_q: usize,
        seasonal_period: usize,
    ) -> Self {
        Self {
            p,
            d,
            q,
            seasonal_p,
            seasonal_d,
            seasonal_q,
            seasonal_period,
        }
    }

    /// Non-seasonal AR order
    pub fn p(&self) -> usize {
        self.p
    }

    /// Non-seasonal differencing order
    pub fn d(&self) -> usize {
        self.d
    }

    /// Non-seasonal MA order
    pub fn q(&self) -> usize {
        self.q
    }

    /// Seasonal AR order
    pub fn seasonal_p(&self) -> usize {
        self.seasonal_p
    }

    /// Seasonal differencing order
    pub fn seasonal_d(&self) -> usize {
        self.seasonal_d
    }

    /// Seasonal MA order
    pub fn seasonal_q(&self) -> usize {
        self.seasonal_q
    }

    /// Seasonal period
    pub fn seasonal_period(&self) -> usize {
        self.seasonal_period
    }

    /// Observations consumed by differencing before any ARMA term applies
    fn differencing_offset(&self) -> usize {
        self.d + self.seasonal_d * self.seasonal_period
    }

    /// Number of estimated ARMA coefficients
    fn coefficient_count(&self) -> usize {
        self.p + self.q + self.seasonal_p + self.seasonal_q
    }

    /// Fit this specification to a prepared series.
    ///
    /// The returned [`SarimaFit`] retains the series' last date so that
    /// forecasting can anchor to "last observed date + 1 month".
    pub fn fit(&self, series: &TimeSeries) -> Result<SarimaFit> {
        let mut fit = self.fit_values(series.values())?;
        fit.last_training_date = series.last_date();
        Ok(fit)
    }

    /// Fit this specification to a bare value sequence.
    ///
    /// The resulting model records that it has no usable date index;
    /// forecasting from it requires an explicitly supplied anchor date.
    ///
    /// # Errors
    ///
    /// * [`ForecastError::EmptySeries`] on an empty input
    /// * [`ForecastError::InvalidOrder`] when the seasonal period is zero or
    ///   the differencing orders consume the whole series
    /// * [`ForecastError::Convergence`] when the optimizer exhausts its
    ///   budget
    pub fn fit_values(&self, values: &[f64]) -> Result<SarimaFit> {
        if values.is_empty() {
            return Err(ForecastError::EmptySeries(
                "cannot fit a model on an empty series".to_string(),
            ));
        }
        if self.seasonal_period == 0 {
            return Err(ForecastError::InvalidOrder(
                "seasonal period must be positive".to_string(),
            ));
        }
        let offset = self.differencing_offset();
        if offset >= values.len() {
            return Err(ForecastError::InvalidOrder(format!(
                "differencing orders d={} and D={} at period {} consume the whole series of {} observations",
                self.d,
                self.seasonal_d,
                self.seasonal_period,
                values.len()
            )));
        }

        let delta = differencing_polynomial(self.d, self.seasonal_d, self.seasonal_period);
        let differenced = apply_differencing(values, &delta);
        let coefficient_count = self.coefficient_count();
        if differenced.len() <= coefficient_count {
            return Err(ForecastError::InvalidOrder(format!(
                "only {} observations remain after differencing, not enough to estimate {} coefficients",
                differenced.len(),
                coefficient_count
            )));
        }

        let start = self.starting_parameters(&differenced);
        debug!(
            order = ?(self.p, self.d, self.q),
            seasonal = ?(self.seasonal_p, self.seasonal_d, self.seasonal_q, self.seasonal_period),
            differenced_len = differenced.len(),
            "fitting SARIMA by conditional sum of squares"
        );

        let objective = |params: &[f64]| {
            let residuals = self.css_residuals(&differenced, params);
            let sum: f64 = residuals.iter().map(|e| e * e).sum();
            if sum.is_finite() {
                sum
            } else {
                f64::INFINITY
            }
        };

        let (parameters, iterations) = if coefficient_count == 0 {
            (Vec::new(), 0)
        } else {
            let result = nelder_mead(objective, &start, &NelderMeadOptions::default())?;
            (result.parameters, result.iterations)
        };

        let residuals = self.css_residuals(&differenced, &parameters);
        let sum_of_squares: f64 = residuals.iter().map(|e| e * e).sum();
        let sigma2 = sum_of_squares / residuals.len() as f64;
        let log_likelihood = gaussian_log_likelihood(&residuals, sigma2);

        let (ar, rest) = parameters.split_at(self.p);
        let (ma, rest) = rest.split_at(self.q);
        let (seasonal_ar, seasonal_ma) = rest.split_at(self.seasonal_p);

        info!(
            iterations,
            sigma2, log_likelihood, "SARIMA fit converged"
        );

        Ok(SarimaFit {
            spec: *self,
            ar: ar.to_vec(),
            ma: ma.to_vec(),
            seasonal_ar: seasonal_ar.to_vec(),
            seasonal_ma: seasonal_ma.to_vec(),
            sigma2,
            log_likelihood,
            residuals,
            training_values: values.to_vec(),
            last_training_date: None,
        })
    }

    /// Yule-Walker AR starts; MA terms start from residual autocorrelations.
    fn starting_parameters(&self, differenced: &[f64]) -> Vec<f64> {
        let ar = yule_walker(differenced, self.p);

        let mut ar_residuals = Vec::with_capacity(differenced.len());
        for t in 0..differenced.len() {
            let mut prediction = 0.0;
            for (i, coefficient) in ar.iter().enumerate() {
                if t > i {
                    prediction += coefficient * differenced[t - 1 - i];
                }
            }
            ar_residuals.push(differenced[t] - prediction);
        }

        let acf = autocorrelations(
            &ar_residuals,
            self.q.max(self.seasonal_q * self.seasonal_period),
        );
        let ma: Vec<f64> = (1..=self.q)
            .map(|lag| acf.get(lag).copied().unwrap_or(0.0).clamp(-0.5, 0.5))
            .collect();

        let seasonal_acf = autocorrelations(
            differenced,
            self.seasonal_p.max(self.seasonal_q) * self.seasonal_period,
        );
        let seasonal_ar: Vec<f64> = (1..=self.seasonal_p)
            .map(|i| {
                seasonal_acf
                    .get(i * self.seasonal_period)
                    .copied()
                    .unwrap_or(0.0)
                    .clamp(-0.9, 0.9)
            })
            .collect();
        let seasonal_ma: Vec<f64> = (1..=self.seasonal_q)
            .map(|i| {
                acf.get(i * self.seasonal_period)
                    .copied()
                    .unwrap_or(0.0)
                    .clamp(-0.5, 0.5)
            })
            .collect();

        let mut start = ar;
        start.extend(ma);
        start.extend(seasonal_ar);
        start.extend(seasonal_ma);
        start
    }

    /// One-step prediction residuals of the ARMA recursion on the
    /// differenced series, with pre-sample terms treated as zero.
    fn css_residuals(&self, differenced: &[f64], parameters: &[f64]) -> Vec<f64> {
        let (ar, rest) = parameters.split_at(self.p);
        let (ma, rest) = rest.split_at(self.q);
        let (seasonal_ar, seasonal_ma) = rest.split_at(self.seasonal_p);
        let period = self.seasonal_period;

        let mut residuals: Vec<f64> = Vec::with_capacity(differenced.len());
        for t in 0..differenced.len() {
            let mut prediction = 0.0;
            for (i, coefficient) in ar.iter().enumerate() {
                if t > i {
                    prediction += coefficient * differenced[t - 1 - i];
                }
            }
            for (i, coefficient) in seasonal_ar.iter().enumerate() {
                let lag = (i + 1) * period;
                if t >= lag {
                    prediction += coefficient * differenced[t - lag];
                }
            }
            for (i, coefficient) in ma.iter().enumerate() {
                if t > i {
                    prediction += coefficient * residuals[t - 1 - i];
                }
            }
            for (i, coefficient) in seasonal_ma.iter().enumerate() {
                let lag = (i + 1) * period;
                if t >= lag {
                    prediction += coefficient * residuals[t - lag];
                }
            }
            residuals.push(differenced[t] - prediction);
        }
        residuals
    }
}

/// A fitted SARIMA model.
///
/// Owns the estimated coefficients, residual diagnostics, and the trailing
/// training context required to extrapolate. Immutable after fitting, and
/// serializable so an external persistence layer can round-trip it exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SarimaFit {
    spec: SarimaSpec,
    ar: Vec<f64>,
    ma: Vec<f64>,
    seasonal_ar: Vec<f64>,
    seasonal_ma: Vec<f64>,
    sigma2: f64,
    log_likelihood: f64,
    residuals: Vec<f64>,
    training_values: Vec<f64>,
    last_training_date: Option<NaiveDate>,
}

impl SarimaFit {
    /// The specification this model was fit from
    pub fn spec(&self) -> SarimaSpec {
        self.spec
    }

    /// Non-seasonal AR coefficients
    pub fn ar(&self) -> &[f64] {
        &self.ar
    }

    /// Non-seasonal MA coefficients
    pub fn ma(&self) -> &[f64] {
        &self.ma
    }

    /// Seasonal AR coefficients
    pub fn seasonal_ar(&self) -> &[f64] {
        &self.seasonal_ar
    }

    /// Seasonal MA coefficients
    pub fn seasonal_ma(&self) -> &[f64] {
        &self.seasonal_ma
    }

    /// Innovation variance of the one-step residuals
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    /// Maximised Gaussian log-likelihood
    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    /// One-step prediction residuals on the differenced scale
    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    /// Values the model was trained on
    pub fn training_values(&self) -> &[f64] {
        &self.training_values
    }

    /// Date of the last training observation, when the training series
    /// carried a date index
    pub fn last_training_date(&self) -> Option<NaiveDate> {
        self.last_training_date
    }

    /// Akaike Information Criterion: 2k - 2 log-likelihood, with
    /// k = p + q + P + Q + 1 (coefficients plus variance).
    pub fn aic(&self) -> f64 {
        let k = (self.spec.coefficient_count() + 1) as f64;
        2.0 * k - 2.0 * self.log_likelihood
    }

    /// Recursive conditional-mean forecast, `horizon` steps ahead.
    ///
    /// Future residuals are zero; each step's forecast feeds back into the
    /// AR terms and the differencing inversion, so for `h1 < h2` the first
    /// `h1` values of a `h2`-step forecast equal the `h1`-step forecast.
    pub fn forecast_values(&self, horizon: usize) -> Vec<f64> {
        let spec = &self.spec;
        let delta = differencing_polynomial(spec.d, spec.seasonal_d, spec.seasonal_period);
        let mut differenced = apply_differencing(&self.training_values, &delta);
        let mut residuals = self.residuals.clone();
        let mut levels = self.training_values.clone();
        let observed = levels.len();

        for _ in 0..horizon {
            let t = differenced.len();
            let mut prediction = 0.0;
            for (i, coefficient) in self.ar.iter().enumerate() {
                if t > i {
                    prediction += coefficient * differenced[t - 1 - i];
                }
            }
            for (i, coefficient) in self.seasonal_ar.iter().enumerate() {
                let lag = (i + 1) * spec.seasonal_period;
                if t >= lag {
                    prediction += coefficient * differenced[t - lag];
                }
            }
            for (i, coefficient) in self.ma.iter().enumerate() {
                if t > i {
                    prediction += coefficient * residuals[t - 1 - i];
                }
            }
            for (i, coefficient) in self.seasonal_ma.iter().enumerate() {
                let lag = (i + 1) * spec.seasonal_period;
                if t >= lag {
                    prediction += coefficient * residuals[t - lag];
                }
            }
            differenced.push(prediction);
            residuals.push(0.0);

            // Undo the differencing: y_t = w_t - sum_{j>=1} delta_j y_{t-j}.
            let mut level = prediction;
            for (j, coefficient) in delta.iter().enumerate().skip(1) {
                level -= coefficient * levels[levels.len() - j];
            }
            levels.push(level);
        }

        levels[observed..].to_vec()
    }

    /// Static one-step-ahead predictions aligned with `values`.
    ///
    /// Each prediction uses only actual history (no forecast chaining). The
    /// first positions consumed by differencing have no model prediction and
    /// echo the observed value.
    pub fn one_step_predictions(&self, values: &[f64]) -> Vec<f64> {
        let spec = &self.spec;
        let offset = spec.differencing_offset();
        if values.len() <= offset {
            return values.to_vec();
        }

        let delta = differencing_polynomial(spec.d, spec.seasonal_d, spec.seasonal_period);
        let differenced = apply_differencing(values, &delta);
        let residuals = spec.css_residuals(
            &differenced,
            &[
                self.ar.clone(),
                self.ma.clone(),
                self.seasonal_ar.clone(),
                self.seasonal_ma.clone(),
            ]
            .concat(),
        );

        let mut predictions = values[..offset].to_vec();
        for (t, (w, e)) in differenced.iter().zip(&residuals).enumerate() {
            let fitted = w - e;
            let mut level = fitted;
            for (j, coefficient) in delta.iter().enumerate().skip(1) {
                level -= coefficient * values[offset + t - j];
            }
            predictions.push(level);
        }
        predictions
    }

    /// Serialize the fitted model to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize a fitted model from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl fmt::Display for SarimaFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let spec = &self.spec;
        writeln!(
            f,
            "SARIMA({},{},{})({},{},{})[{}]",
            spec.p,
            spec.d,
            spec.q,
            spec.seasonal_p,
            spec.seasonal_d,
            spec.seasonal_q,
            spec.seasonal_period
        )?;
        writeln!(f, "  observations:   {}", self.training_values.len())?;
        writeln!(f, "  ar:             {:?}", self.ar)?;
        writeln!(f, "  ma:             {:?}", self.ma)?;
        writeln!(f, "  seasonal ar:    {:?}", self.seasonal_ar)?;
        writeln!(f, "  seasonal ma:    {:?}", self.seasonal_ma)?;
        writeln!(f, "  sigma^2:        {:.6}", self.sigma2)?;
        writeln!(f, "  log-likelihood: {:.4}", self.log_likelihood)?;
        writeln!(f, "  AIC:            {:.4}", self.aic())?;
        Ok(())
    }
}

/// Gaussian log-likelihood of the residuals at the given variance.
fn gaussian_log_likelihood(residuals: &[f64], variance: f64) -> f64 {
    let n = residuals.len() as f64;
    if variance <= 0.0 {
        return f64::NEG_INFINITY;
    }
    let sum_of_squares: f64 = residuals.iter().map(|r| r * r).sum();
    -0.5 * n * (2.0 * std::f64::consts::PI).ln() - 0.5 * n * variance.ln()
        - sum_of_squares / (2.0 * variance)
}

/// Coefficients of `(1-B)^d (1-B^s)^D`; index j multiplies `y_{t-j}`.
fn differencing_polynomial(d: usize, seasonal_d: usize, period: usize) -> Vec<f64> {
    let mut polynomial = vec![1.0];
    for _ in 0..d {
        polynomial = polynomial_product(&polynomial, &[1.0, -1.0]);
    }
    let mut seasonal = vec![0.0; period + 1];
    seasonal[0] = 1.0;
    seasonal[period] = -1.0;
    for _ in 0..seasonal_d {
        polynomial = polynomial_product(&polynomial, &seasonal);
    }
    polynomial
}

fn polynomial_product(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut product = vec![0.0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        for (j, &y) in b.iter().enumerate() {
            product[i + j] += x * y;
        }
    }
    product
}

/// Apply the composite differencing polynomial to a level series.
fn apply_differencing(values: &[f64], delta: &[f64]) -> Vec<f64> {
    let offset = delta.len() - 1;
    (offset..values.len())
        .map(|t| {
            delta
                .iter()
                .enumerate()
                .map(|(j, coefficient)| coefficient * values[t - j])
                .sum()
        })
        .collect()
}

/// Sample autocorrelations up to `max_lag` (index 0 is always 1).
fn autocorrelations(values: &[f64], max_lag: usize) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return vec![1.0];
    }
    let mean = crate::utils::mean(values);
    let centered: Vec<f64> = values.iter().map(|v| v - mean).collect();
    let variance: f64 = centered.iter().map(|v| v * v).sum::<f64>() / n as f64;
    if variance.abs() < 1e-12 {
        return vec![0.0; max_lag + 1];
    }

    (0..=max_lag.min(n - 1))
        .map(|lag| {
            let covariance: f64 = centered
                .iter()
                .take(n - lag)
                .zip(centered.iter().skip(lag))
                .map(|(a, b)| a * b)
                .sum::<f64>()
                / n as f64;
            covariance / variance
        })
        .collect()
}

/// AR coefficients from the Yule-Walker equations via Levinson-Durbin.
fn yule_walker(values: &[f64], order: usize) -> Vec<f64> {
    if order == 0 || values.len() < order + 1 {
        return vec![0.0; order];
    }
    let acf = autocorrelations(values, order);
    if acf.iter().all(|&r| r == 0.0) {
        return vec![0.0; order];
    }

    let mut phi = vec![vec![0.0; order]; order];
    phi[0][0] = acf[1];

    for k in 1..order {
        let mut numerator = acf[k + 1];
        let mut denominator = 1.0;
        for j in 0..k {
            numerator -= phi[k - 1][j] * acf[k - j];
            denominator -= phi[k - 1][j] * acf[j + 1];
        }
        let reflection = if denominator.abs() < 1e-10 {
            0.0
        } else {
            numerator / denominator
        };
        phi[k][k] = reflection;
        for j in 0..k {
            phi[k][j] = phi[k - 1][j] - reflection * phi[k - 1][k - 1 - j];
        }
    }

    phi[order - 1].clone()
}
