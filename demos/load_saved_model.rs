use chrono::NaiveDate;
use solar_forecast::{forecast, SarimaFit};
use std::env;
use std::fs;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let model_path = args
        .next()
        .unwrap_or_else(|| "solar_prediction_sarima.json".to_string());
    let steps: usize = args.next().map(|s| s.parse()).transpose()?.unwrap_or(12);
    // Only needed when the saved model carries no training date index.
    let anchor = args
        .next()
        .map(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d"))
        .transpose()?;

    println!("Loading model from: {}", model_path);
    let model = SarimaFit::from_json(&fs::read_to_string(&model_path)?)?;

    let table = forecast::generate(&model, steps, anchor)?;
    println!("Forecast for the next {} months:", steps);
    println!("{}", table);

    Ok(())
}
