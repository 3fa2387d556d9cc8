use chrono::NaiveDate;
use solar_forecast::evaluate::{self, DEFAULT_EVALUATION_WINDOW};
use solar_forecast::utils::next_month_end;
use solar_forecast::{ForecastError, SarimaSpec, TimeSeries};

fn monthly_series(n: usize, noise_scale: f64) -> TimeSeries {
    let mut dates = Vec::with_capacity(n);
    let mut values = Vec::with_capacity(n);
    let mut date = NaiveDate::from_ymd_opt(2019, 1, 31).unwrap();
    for t in 0..n {
        dates.push(date);
        let seasonal = ((t % 12) as f64 * std::f64::consts::TAU / 12.0).sin();
        let noise = (((t * 17 + 13) % 29) as f64 / 29.0 - 0.5) * noise_scale;
        values.push(100.0 + 4.0 * t as f64 + 6.0 * seasonal + noise);
        date = next_month_end(date);
    }
    TimeSeries::new(dates, values).unwrap()
}

#[test]
fn test_default_window_is_one_seasonal_cycle() {
    assert_eq!(DEFAULT_EVALUATION_WINDOW, 12);
}

#[test]
fn test_window_longer_than_series_is_rejected() {
    let training = monthly_series(60, 0.5);
    let model = SarimaSpec::default().fit(&training).unwrap();

    let short = monthly_series(5, 0.5);
    let result = evaluate::evaluate(&model, &short, 12);
    assert!(matches!(result, Err(ForecastError::InsufficientData(_))));
}

#[test]
fn test_zero_window_is_rejected() {
    let training = monthly_series(60, 0.5);
    let model = SarimaSpec::default().fit(&training).unwrap();

    let result = evaluate::evaluate(&model, &training, 0);
    assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
}

#[test]
fn test_mse_is_nonnegative_and_finite() {
    let training = monthly_series(60, 0.5);
    let model = SarimaSpec::default().fit(&training).unwrap();

    let report = evaluate::evaluate(&model, &training, 12).unwrap();
    assert!(report.mean_squared_error >= 0.0);
    assert!(report.mean_squared_error.is_finite());
}

#[test]
fn test_mse_is_tiny_on_a_noise_free_series() {
    // Trend plus annual sine is annihilated exactly by (1-B)(1-B^12), so
    // one-step predictions reproduce the series.
    let training = monthly_series(60, 0.0);
    let model = SarimaSpec::default().fit(&training).unwrap();

    let report = evaluate::evaluate(&model, &training, 12).unwrap();
    assert!(
        report.mean_squared_error < 1e-6,
        "mse = {}",
        report.mean_squared_error
    );
}

#[test]
fn test_report_display_mentions_mse() {
    let training = monthly_series(48, 0.5);
    let model = SarimaSpec::default().fit(&training).unwrap();

    let report = evaluate::evaluate(&model, &training, 12).unwrap();
    assert!(report.to_string().contains("MSE"));
}
