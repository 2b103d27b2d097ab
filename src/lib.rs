//! Drawn Forecast
//!
//! Turns a line drawn on top of a case-count chart into a daily forecast and
//! scores stored forecasts against reported case counts as they come in.

pub mod calibration;
pub mod config;
pub mod error;
pub mod export;
pub mod extraction;
pub mod paths;
pub mod prediction;
pub mod scoring;
pub mod staging;

pub use error::{ForecastError, ForecastResult};
