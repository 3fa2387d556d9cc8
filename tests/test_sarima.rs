use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use solar_forecast::utils::next_month_end;
use solar_forecast::{ForecastError, SarimaSpec, TimeSeries};

/// Monotonically increasing monthly series with an annual sine pattern and
/// small deterministic noise. Starts at the end of January 2019.
fn synthetic_series(n: usize) -> TimeSeries {
    let mut dates = Vec::with_capacity(n);
    let mut values = Vec::with_capacity(n);
    let mut date = NaiveDate::from_ymd_opt(2019, 1, 31).unwrap();
    for t in 0..n {
        dates.push(date);
        let seasonal = ((t % 12) as f64 * std::f64::consts::TAU / 12.0).sin();
        let noise = (((t * 17 + 13) % 29) as f64 / 29.0 - 0.5) * 0.5;
        values.push(100.0 + 4.0 * t as f64 + 6.0 * seasonal + noise);
        date = next_month_end(date);
    }
    TimeSeries::new(dates, values).unwrap()
}

#[test]
fn test_fit_and_forecast_sixty_months() {
    let series = synthetic_series(60);
    assert!(series.values().windows(2).all(|w| w[0] < w[1]));

    let spec = SarimaSpec::new(1, 1, 1, 1, 1, 1, 12);
    let fit = spec.fit(&series).unwrap();

    let forecast = fit.forecast_values(12);
    assert_eq!(forecast.len(), 12);
    assert!(forecast.iter().all(|v| v.is_finite()));

    // One year out the forecast should continue the upward trend.
    let last = *series.values().last().unwrap();
    assert!(forecast[11] > last, "forecast = {:?}", forecast);
}

#[test]
fn test_fit_is_deterministic() {
    let series = synthetic_series(60);
    let spec = SarimaSpec::new(1, 1, 1, 1, 1, 1, 12);

    let first = spec.fit(&series).unwrap();
    let second = spec.fit(&series).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.forecast_values(24), second.forecast_values(24));
}

#[test]
fn test_fit_records_last_training_date() {
    let series = synthetic_series(36);
    let fit = SarimaSpec::default().fit(&series).unwrap();
    assert_eq!(fit.last_training_date(), series.last_date());
}

#[test]
fn test_fit_values_has_no_date_index() {
    let series = synthetic_series(36);
    let fit = SarimaSpec::default()
        .fit_values(series.values())
        .unwrap();
    assert_eq!(fit.last_training_date(), None);
}

#[test]
fn test_fit_diagnostics_are_well_formed() {
    let series = synthetic_series(60);
    let spec = SarimaSpec::new(1, 1, 1, 1, 1, 1, 12);
    let fit = spec.fit(&series).unwrap();

    // Differencing consumes d + D * s leading observations.
    assert_eq!(fit.residuals().len(), 60 - 13);
    assert!(fit.sigma2() >= 0.0);
    assert!(fit.sigma2().is_finite());
    assert!(fit.log_likelihood().is_finite());
    assert!(fit.aic().is_finite());
    assert_eq!(fit.ar().len(), 1);
    assert_eq!(fit.ma().len(), 1);
    assert_eq!(fit.seasonal_ar().len(), 1);
    assert_eq!(fit.seasonal_ma().len(), 1);
}

#[test]
fn test_random_walk_spec_forecasts_last_value() {
    let series = synthetic_series(30);
    let spec = SarimaSpec::new(0, 1, 0, 0, 0, 0, 1);
    let fit = spec.fit(&series).unwrap();

    let last = *series.values().last().unwrap();
    for value in fit.forecast_values(6) {
        assert!((value - last).abs() < 1e-9);
    }
}

#[test]
fn test_zero_seasonal_period_is_rejected() {
    let series = synthetic_series(30);
    let spec = SarimaSpec::new(1, 1, 1, 0, 0, 0, 0);
    let result = spec.fit(&series);
    assert!(matches!(result, Err(ForecastError::InvalidOrder(_))));
}

#[test]
fn test_excessive_differencing_is_rejected() {
    let series = synthetic_series(30);

    let result = SarimaSpec::new(1, 100, 1, 0, 0, 0, 12).fit(&series);
    assert!(matches!(result, Err(ForecastError::InvalidOrder(_))));

    let result = SarimaSpec::new(0, 0, 0, 0, 3, 0, 12).fit(&series);
    assert!(matches!(result, Err(ForecastError::InvalidOrder(_))));
}

#[test]
fn test_short_series_cannot_support_the_order() {
    // After d=1, D=1 at s=12 only two observations remain, fewer than the
    // four coefficients to estimate.
    let series = synthetic_series(15);
    let result = SarimaSpec::new(1, 1, 1, 1, 1, 1, 12).fit(&series);
    assert!(matches!(result, Err(ForecastError::InvalidOrder(_))));
}

#[test]
fn test_empty_series_is_rejected() {
    let result = SarimaSpec::default().fit_values(&[]);
    assert!(matches!(result, Err(ForecastError::EmptySeries(_))));
}

#[test]
fn test_json_round_trip_preserves_forecasts() {
    let series = synthetic_series(48);
    let fit = SarimaSpec::default().fit(&series).unwrap();

    let json = fit.to_json().unwrap();
    let restored = solar_forecast::SarimaFit::from_json(&json).unwrap();

    assert_eq!(fit, restored);
    assert_eq!(fit.forecast_values(60), restored.forecast_values(60));
    assert_eq!(fit.last_training_date(), restored.last_training_date());
}

#[test]
fn test_one_step_predictions_align_with_input() {
    let series = synthetic_series(48);
    let fit = SarimaSpec::default().fit(&series).unwrap();

    let predictions = fit.one_step_predictions(series.values());
    assert_eq!(predictions.len(), series.len());

    // Positions consumed by differencing echo the observed values.
    assert_eq!(&predictions[..13], &series.values()[..13]);

    // The rest are genuine predictions, close to a smooth series.
    for (actual, predicted) in series.values()[13..].iter().zip(&predictions[13..]) {
        assert!((actual - predicted).abs() < 10.0);
    }
}

#[test]
fn test_display_summarizes_the_fit() {
    let series = synthetic_series(48);
    let fit = SarimaSpec::default().fit(&series).unwrap();
    let summary = fit.to_string();

    assert!(summary.contains("SARIMA(1,1,1)(1,1,1)[12]"));
    assert!(summary.contains("log-likelihood"));
    assert!(summary.contains("AIC"));
}
