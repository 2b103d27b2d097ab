//! Line extraction by differencing a submission against its reference chart.
//!
//! Every pixel column of the drawable area is reduced to at most one vertical
//! position: the top of the drawn stroke, shifted down by half the typical
//! stroke thickness so the estimate sits on the stroke's center line.

use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::{debug, error};

use super::raster::RasterImage;
use crate::error::{ForecastError, ForecastResult};

/// Vertical stroke position for one column, relative to the top row of the
/// drawable area. `None` when no stroke was detected in the column.
pub type ColumnEstimate = Option<f64>;

/// Column max differences below this are treated as compression noise.
pub const DEFAULT_NOISE_FLOOR: f64 = 150.0;
/// Fraction of a column's max difference a pixel needs to count as stroke.
pub const DEFAULT_RELATIVE_THRESHOLD: f64 = 0.8;
/// Quantile of per-column stroke spreads taken as the stroke thickness.
pub const DEFAULT_THICKNESS_QUANTILE: f64 = 0.2;

/// Tunable constants of the extraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionParams {
    /// Minimum column max difference (sum-of-channels units)
    pub noise_floor: f64,
    /// Candidate pixels need `diff >= relative_threshold * column_max`
    pub relative_threshold: f64,
    /// Quantile (0.0-1.0) of stroke spreads used as thickness.
    /// Kept low so overlapping double strokes do not inflate it.
    pub thickness_quantile: f64,
}

impl Default for ExtractionParams {
    fn default() -> Self {
        Self {
            noise_floor: DEFAULT_NOISE_FLOOR,
            relative_threshold: DEFAULT_RELATIVE_THRESHOLD,
            thickness_quantile: DEFAULT_THICKNESS_QUANTILE,
        }
    }
}

/// Extracts one [`ColumnEstimate`] per column in `columns`.
///
/// Only rows in `rows` are inspected; both ranges are clamped to the raster
/// bounds. Row estimates are relative to the first inspected row.
///
/// Fails with [`ForecastError::DimensionMismatch`] before looking at any pixel
/// if the rasters differ in size, and with [`ForecastError::NoLineDetected`]
/// if no column holds a stroke.
pub fn extract_line(
    reference: &RasterImage,
    submission: &RasterImage,
    columns: Range<usize>,
    rows: Range<usize>,
    params: &ExtractionParams,
) -> ForecastResult<Vec<ColumnEstimate>> {
    if reference.dimensions() != submission.dimensions() {
        error!(
            reference = ?reference.dimensions(),
            submission = ?submission.dimensions(),
            "The size of the submitted image is not equal to the original size."
        );
        return Err(ForecastError::DimensionMismatch {
            reference: reference.dimensions(),
            submission: submission.dimensions(),
        });
    }

    let columns = clamp_range(columns, reference.width() as usize);
    let rows = clamp_range(rows, reference.height() as usize);

    let candidates: Vec<Vec<usize>> = columns
        .map(|x| candidate_rows(reference, submission, x as u32, rows.clone(), params))
        .collect();

    if candidates.iter().all(|c| c.is_empty()) {
        error!("No line was found.");
        return Err(ForecastError::NoLineDetected);
    }

    let thickness = estimate_thickness(&candidates, params.thickness_quantile);
    debug!(thickness, columns = candidates.len(), "Estimated stroke thickness");

    let estimates: Vec<ColumnEstimate> = candidates
        .iter()
        .map(|rows| rows.first().map(|&top| top as f64 + thickness / 2.0))
        .collect();

    if estimates.iter().all(Option::is_none) {
        error!("No line was found.");
        return Err(ForecastError::NoLineDetected);
    }

    Ok(estimates)
}

/// Rows (relative to `rows.start`, ascending) whose difference is close to the
/// column's strongest difference. Empty if the column stays under the noise floor.
fn candidate_rows(
    reference: &RasterImage,
    submission: &RasterImage,
    x: u32,
    rows: Range<usize>,
    params: &ExtractionParams,
) -> Vec<usize> {
    let diffs: Vec<u32> = rows
        .map(|y| reference.get(x, y as u32).abs_diff(submission.get(x, y as u32)))
        .collect();

    let max = diffs.iter().copied().max().unwrap_or(0) as f64;
    if max < params.noise_floor {
        return Vec::new();
    }

    let threshold = max * params.relative_threshold;
    diffs
        .iter()
        .enumerate()
        .filter(|&(_, &d)| d as f64 >= threshold)
        .map(|(row, _)| row)
        .collect()
}

/// Low quantile of the vertical spread of every column with 2+ candidates.
/// 0 when every stroke column is a single pixel high.
fn estimate_thickness(candidates: &[Vec<usize>], quantile: f64) -> f64 {
    let mut spreads: Vec<f64> = candidates
        .iter()
        .filter(|rows| rows.len() > 1)
        .map(|rows| (rows[rows.len() - 1] - rows[0]) as f64)
        .collect();
    spreads.sort_by(|a, b| a.total_cmp(b));

    calculate_quantile(&spreads, quantile)
}

/// Quantile of sorted values using linear interpolation between order statistics.
fn calculate_quantile(sorted: &[f64], quantile: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return sorted[0];
    }

    // Index in range [0, n-1]
    let index = quantile.clamp(0.0, 1.0) * (n - 1) as f64;
    let lower_idx = index.floor() as usize;
    let upper_idx = index.ceil() as usize;

    if lower_idx == upper_idx {
        sorted[lower_idx]
    } else {
        let frac = index.fract();
        sorted[lower_idx] + (sorted[upper_idx] - sorted[lower_idx]) * frac
    }
}

fn clamp_range(range: Range<usize>, len: usize) -> Range<usize> {
    let end = range.end.min(len);
    range.start.min(end)..end
}
