use solar_forecast::pipeline::{Pipeline, PipelineConfig};
use solar_forecast::DataLoader;
use std::env;
use std::fs;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| "dataset.csv".to_string());

    println!("Loading observations from: {}", path);
    let rows = DataLoader::from_csv(&path)?;
    println!("Loaded {} rows", rows.len());

    let pipeline = Pipeline::new(PipelineConfig::default());
    let report = pipeline.run(&rows)?;

    println!(
        "Prepared {} monthly solar observations",
        report.series.len()
    );
    println!(
        "ADF statistic {:.4}, p-value {:.4} -> {}",
        report.stationarity.test_statistic,
        report.stationarity.p_value,
        if report.stationarity.is_stationary {
            "stationary"
        } else {
            "non-stationary"
        }
    );
    println!("\n{}", report.model);

    for table in &report.forecasts {
        let months = table.len();
        let file_name = format!("forecast_{}_months.csv", months);
        table.write_csv_file(&file_name)?;
        println!(
            "Forecast for the next {} months (saved to {}):",
            months, file_name
        );
        println!("{}", table);
    }

    println!("{}", report.accuracy);

    fs::write("solar_prediction_sarima.json", report.model.to_json()?)?;
    println!("Saved fitted model to solar_prediction_sarima.json");

    Ok(())
}
