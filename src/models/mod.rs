//! Forecasting models for monthly generation series

mod optimizer;
pub mod sarima;

pub use sarima::{SarimaFit, SarimaSpec};
