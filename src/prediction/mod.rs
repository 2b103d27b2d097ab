//! From extracted stroke positions to a dense daily forecast.
//!
//! This module provides:
//! - Date-number conversion (days since 1970-01-01)
//! - Pixel-to-data mapping anchored on the last known observation
//! - Piecewise-linear reconstruction of one value per day
//! - JSON persistence of submitted predictions

pub mod daily;
pub mod dates;
pub mod mapper;
pub mod store;

pub use daily::{DailyPrediction, reconstruct_daily};
pub use mapper::{Anchor, DEFAULT_HORIZON_DAYS, PredictionPoint, RawPrediction, map_to_prediction};
pub use store::StoredPrediction;
