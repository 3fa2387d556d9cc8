use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use solar_forecast::pipeline::{Pipeline, PipelineConfig};
use solar_forecast::{
    DataLoader, ForecastError, RawObservation, SarimaFit, SarimaSpec,
};
use std::io::Write;
use tempfile::NamedTempFile;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Write a four-year observation table mixing solar and wind series, with
/// one missing solar value and rows in reverse chronological order.
fn create_sample_data() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();

    writeln!(file, "Series name,Observation Date,Observation Value").unwrap();
    for t in (0..48usize).rev() {
        let year = 2019 + (t / 12) as i32;
        let month = MONTHS[t % 12];
        let seasonal = ((t % 12) as f64 * std::f64::consts::TAU / 12.0).sin();
        let value = 120.0 + 3.0 * t as f64 + 8.0 * seasonal;

        if t == 20 {
            writeln!(file, "Solar power generation,01-{}-{},", month, year).unwrap();
        } else {
            writeln!(
                file,
                "Solar power generation,01-{}-{},{:.3}",
                month, year, value
            )
            .unwrap();
        }
        writeln!(
            file,
            "Wind power generation,01-{}-{},{:.3}",
            month, year, value * 2.0
        )
        .unwrap();
    }

    file
}

#[test]
fn test_full_forecast_workflow() {
    // 1. Load the raw table
    let data_file = create_sample_data();
    let rows = DataLoader::from_csv(data_file.path()).unwrap();
    assert_eq!(rows.len(), 96);

    // 2. Run the pipeline over two horizons
    let config = PipelineConfig {
        spec: SarimaSpec::default(),
        horizons: vec![6, 12],
        evaluation_window: 12,
    };
    let report = Pipeline::new(config).run(&rows).unwrap();

    // 3. Wind rows are filtered out, the missing value is filled
    assert_eq!(report.series.len(), 48);
    assert!(report.series.values().iter().all(|v| v.is_finite()));

    // 4. One table per horizon, dated from the last training month
    assert_eq!(report.forecasts.len(), 2);
    assert_eq!(report.forecasts[0].len(), 6);
    assert_eq!(report.forecasts[1].len(), 12);
    let last_date = report.series.last_date().unwrap();
    for table in &report.forecasts {
        assert!(table.dates()[0] > last_date);
        assert!(table.predicted_values().iter().all(|v| v.is_finite()));
    }

    // 5. Evaluation produced a usable error measure
    assert!(report.accuracy.mean_squared_error.is_finite());
    assert!(report.accuracy.mean_squared_error >= 0.0);

    // 6. Export a forecast table and check the contract header survives
    let export = NamedTempFile::new().unwrap();
    report.forecasts[1].write_csv_file(export.path()).unwrap();
    let exported = std::fs::read_to_string(export.path()).unwrap();
    assert!(exported.starts_with("Date,Predicted Solar Production (GWh)"));

    // 7. Persist the model as JSON and forecast from the restored copy
    let json = report.model.to_json().unwrap();
    let restored = SarimaFit::from_json(&json).unwrap();
    let original = solar_forecast::forecast::generate(&report.model, 12, None).unwrap();
    let replayed = solar_forecast::forecast::generate(&restored, 12, None).unwrap();
    assert_eq!(original, replayed);
}

#[test]
fn test_loader_reports_io_errors() {
    let result = DataLoader::from_csv("/nonexistent/path.csv");
    assert!(matches!(result, Err(ForecastError::Io(_))));
}

#[test]
fn test_pipeline_aborts_without_solar_rows() {
    let rows = vec![
        RawObservation::new("Wind power generation", "01-Jan-2020", Some(10.0)),
        RawObservation::new("Hydro power generation", "01-Feb-2020", Some(20.0)),
    ];

    let result = Pipeline::new(PipelineConfig::default()).run(&rows);
    assert!(matches!(result, Err(ForecastError::EmptySeries(_))));
}

#[test]
fn test_pipeline_on_a_noisy_series() {
    let mut rng = StdRng::seed_from_u64(42);
    let noise = Normal::new(0.0, 2.0).unwrap();

    let mut rows = Vec::new();
    for t in 0..72usize {
        let year = 2018 + (t / 12) as i32;
        let month = MONTHS[t % 12];
        let seasonal = ((t % 12) as f64 * std::f64::consts::TAU / 12.0).sin();
        let value = 90.0 + 2.5 * t as f64 + 12.0 * seasonal + noise.sample(&mut rng);
        rows.push(RawObservation::new(
            "Solar power generation",
            format!("01-{}-{}", month, year),
            Some(value),
        ));
    }

    let report = Pipeline::new(PipelineConfig::default()).run(&rows).unwrap();

    // Default configuration: the full 6-months-to-15-years ladder.
    assert_eq!(report.forecasts.len(), 6);
    for (table, horizon) in report.forecasts.iter().zip([6, 12, 24, 60, 120, 180]) {
        assert_eq!(table.len(), horizon);
        assert!(table.predicted_values().iter().all(|v| v.is_finite()));
    }
    assert!(report.accuracy.mean_squared_error.is_finite());
}
