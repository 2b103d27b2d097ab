//! Stroke extraction from a submission raster.
//!
//! This module provides:
//! - Raster loading (sum-of-channels intensity grids)
//! - Per-column stroke detection against the reference chart
//! - Stroke thickness estimation

pub mod line;
pub mod raster;

pub use line::{ColumnEstimate, ExtractionParams, extract_line};
pub use raster::RasterImage;
