//! Pixel-space to data-space mapping for one rendered chart.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::Range;
use std::path::Path;

/// Drawable area of a chart plus per-axis scale factors.
///
/// `origin` is the pixel position where the drawable area starts ("today",
/// zero cases), `corner` the opposite corner. Scales are data units per pixel:
/// days per pixel for x, cases per pixel for y.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationFrame {
    pub origin_x: f64,
    pub origin_y: f64,
    pub corner_x: f64,
    pub corner_y: f64,
    pub x_scale: f64,
    pub y_scale: f64,
}

/// Accepted on-disk shapes: the named object, or the bare 6-tuple
/// `[origin_x, origin_y, corner_x, corner_y, x_scale, y_scale]` older
/// renderers emit.
#[derive(Deserialize)]
#[serde(untagged)]
enum FrameRepr {
    Named(CalibrationFrame),
    Tuple([f64; 6]),
}

impl From<FrameRepr> for CalibrationFrame {
    fn from(repr: FrameRepr) -> Self {
        match repr {
            FrameRepr::Named(frame) => frame,
            FrameRepr::Tuple([origin_x, origin_y, corner_x, corner_y, x_scale, y_scale]) => Self {
                origin_x,
                origin_y,
                corner_x,
                corner_y,
                x_scale,
                y_scale,
            },
        }
    }
}

impl CalibrationFrame {
    /// Fractional part of the origin's x pixel coordinate.
    pub fn sub_pixel_x_offset(&self) -> f64 {
        self.origin_x.rem_euclid(1.0)
    }

    /// Fractional part of the origin's y pixel coordinate.
    pub fn sub_pixel_y_offset(&self) -> f64 {
        self.origin_y.rem_euclid(1.0)
    }

    /// Pixel columns covered by the drawable area (not clamped to any raster).
    pub fn column_range(&self) -> Range<usize> {
        truncate_to_pixel(self.origin_x)..truncate_to_pixel(self.corner_x)
    }

    /// Pixel rows covered by the drawable area (not clamped to any raster).
    pub fn row_range(&self) -> Range<usize> {
        truncate_to_pixel(self.origin_y)..truncate_to_pixel(self.corner_y)
    }

    /// Height of the drawable area in pixels, measured from the sub-pixel
    /// aligned origin row.
    pub fn drawable_height(&self) -> f64 {
        self.corner_y - self.origin_y - self.sub_pixel_y_offset()
    }

    /// Parse a frame from JSON (object or 6-tuple form).
    pub fn from_json(content: &str) -> Result<Self> {
        let repr: FrameRepr =
            serde_json::from_str(content).context("Failed to parse calibration frame")?;
        Ok(repr.into())
    }

    /// Load a frame from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read calibration file: {}", path.display()))?;
        Self::from_json(&content)
    }
}

fn truncate_to_pixel(coord: f64) -> usize {
    coord.max(0.0) as usize
}
