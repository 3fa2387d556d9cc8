//! # Solar Forecast
//!
//! A Rust library for forecasting monthly solar power generation from a
//! historical univariate series with a seasonal ARIMA model.
//!
//! ## Features
//!
//! - Raw observation table preparation (solar series filter, date parsing,
//!   forward/backward gap fill)
//! - Augmented Dickey-Fuller stationarity diagnostic
//! - SARIMA(p,d,q)(P,D,Q)\[s\] fitting by conditional-sum-of-squares
//!   maximum likelihood
//! - Dated multi-horizon forecasts with month-end alignment
//! - Trailing-window accuracy evaluation
//! - JSON round-trip of fitted models for external persistence
//!
//! ## Quick Start
//!
//! ```rust
//! use solar_forecast::data::RawObservation;
//! use solar_forecast::models::SarimaSpec;
//! use solar_forecast::pipeline::{Pipeline, PipelineConfig};
//!
//! let months = [
//!     "Jan", "Feb", "Mar", "Apr", "May", "Jun",
//!     "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
//! ];
//! let mut rows = Vec::new();
//! for year in 2019..2024i32 {
//!     for (month, name) in months.iter().enumerate() {
//!         let t = (year - 2019) * 12 + month as i32;
//!         let seasonal = (month as f64 * std::f64::consts::TAU / 12.0).sin();
//!         let noise = ((t * 17 + 13) % 29) as f64 / 29.0;
//!         rows.push(RawObservation::new(
//!             "Solar power generation",
//!             format!("01-{}-{}", name, year),
//!             Some(100.0 + 2.0 * t as f64 + 10.0 * seasonal + noise),
//!         ));
//!     }
//! }
//!
//! let config = PipelineConfig {
//!     spec: SarimaSpec::default(),
//!     horizons: vec![6, 12],
//!     ..PipelineConfig::default()
//! };
//! let report = Pipeline::new(config).run(&rows)?;
//!
//! assert_eq!(report.forecasts[1].len(), 12);
//! println!("{}", report.model);
//! # Ok::<(), solar_forecast::ForecastError>(())
//! ```

pub mod data;
pub mod error;
pub mod evaluate;
pub mod forecast;
pub mod models;
pub mod pipeline;
pub mod stationarity;
pub mod utils;

// Re-export commonly used types
pub use crate::data::{DataLoader, RawObservation, SeriesPreparer, TimeSeries};
pub use crate::error::{ForecastError, Result};
pub use crate::evaluate::AccuracyReport;
pub use crate::forecast::{ForecastPoint, ForecastTable};
pub use crate::models::{SarimaFit, SarimaSpec};
pub use crate::pipeline::{Pipeline, PipelineConfig, PipelineReport};
pub use crate::stationarity::StationarityReport;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
