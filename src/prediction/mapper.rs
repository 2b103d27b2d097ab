//! Coordinate mapping from stroke pixels to (date number, cases) points.

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::calibration::CalibrationFrame;
use crate::error::{ForecastError, ForecastResult};
use crate::extraction::ColumnEstimate;

/// Days past "today" at which the last drawn value is repeated.
pub const DEFAULT_HORIZON_DAYS: f64 = 150.0;

/// One sparse prediction point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionPoint {
    /// Continuous date number (days since 1970-01-01)
    pub date: f64,
    /// Predicted case count
    pub cases: f64,
}

/// Sparse prediction in insertion order.
///
/// Inserting a date that is already present replaces its value in place, so a
/// date appears at most once and keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawPrediction {
    points: Vec<PredictionPoint>,
}

impl RawPrediction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the value at `date`.
    pub fn insert(&mut self, date: f64, cases: f64) {
        match self.points.iter_mut().find(|p| p.date == date) {
            Some(point) => point.cases = cases,
            None => self.points.push(PredictionPoint { date, cases }),
        }
    }

    /// Points in insertion order.
    pub fn points(&self) -> &[PredictionPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Date of the first inserted point, the anchor for mapped predictions.
    pub fn first_date(&self) -> Option<f64> {
        self.points.first().map(|p| p.date)
    }
}

impl FromIterator<(f64, f64)> for RawPrediction {
    fn from_iter<I: IntoIterator<Item = (f64, f64)>>(iter: I) -> Self {
        let mut prediction = Self::new();
        for (date, cases) in iter {
            prediction.insert(date, cases);
        }
        prediction
    }
}

/// The last real observation the drawn line continues from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    /// Date number of "today"; column 0 of the drawable area starts here
    pub today: f64,
    /// Last known real case count
    pub last_value: f64,
}

/// Builds a [`RawPrediction`] from per-column stroke estimates.
///
/// The anchor is always the first point. Column `i` maps to
/// `today + (sub_pixel_x_offset + i) * x_scale`, row `r` to
/// `max(0, (drawable_height - r) * y_scale)`. The last drawn value is repeated
/// at `today + horizon_days` so the series has a bounded end.
pub fn map_to_prediction(
    estimates: &[ColumnEstimate],
    frame: &CalibrationFrame,
    anchor: Anchor,
    horizon_days: f64,
) -> ForecastResult<RawPrediction> {
    let x_offset = frame.sub_pixel_x_offset();
    let height = frame.drawable_height();

    let mut prediction = RawPrediction::new();
    prediction.insert(anchor.today, anchor.last_value);

    let mut last = None;
    for (i, row) in estimates.iter().enumerate() {
        let Some(row) = row else { continue };
        let date = anchor.today + (x_offset + i as f64) * frame.x_scale;
        let cases = ((height - row) * frame.y_scale).max(0.0);
        prediction.insert(date, cases);
        last = Some(cases);
    }

    let Some(last) = last else {
        error!("No line was found.");
        return Err(ForecastError::NoLineDetected);
    };

    prediction.insert(anchor.today + horizon_days, last);
    debug!(points = prediction.len(), "Mapped stroke to raw prediction");

    Ok(prediction)
}
