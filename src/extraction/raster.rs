//! Scalar intensity rasters.

use anyhow::{Context, Result};
use image::{ImageBuffer, Rgb, RgbImage};
use std::path::Path;

/// A 2D grid of intensities, one per pixel, stored row-major.
///
/// The intensity of a pixel is the sum of its R, G and B values (0–765).
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    intensities: Vec<u32>,
}

impl RasterImage {
    /// Collapses an RGB image into a sum-of-channels raster.
    pub fn from_rgb(img: &ImageBuffer<Rgb<u8>, Vec<u8>>) -> Self {
        let (width, height) = img.dimensions();
        let intensities = img
            .pixels()
            .map(|p| p[0] as u32 + p[1] as u32 + p[2] as u32)
            .collect();

        Self {
            width,
            height,
            intensities,
        }
    }

    /// Builds a raster from raw intensities. Returns `None` if the length
    /// does not match `width * height`.
    pub fn from_intensities(width: u32, height: u32, intensities: Vec<u32>) -> Option<Self> {
        if intensities.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            intensities,
        })
    }

    /// Decodes an image file (any format the `image` crate reads).
    pub fn load(path: &Path) -> Result<Self> {
        let img: RgbImage = image::open(path)
            .context(format!("Failed to open image: {}", path.display()))?
            .to_rgb8();
        Ok(Self::from_rgb(&img))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Intensity at column `x`, row `y`. Panics when out of bounds.
    pub fn get(&self, x: u32, y: u32) -> u32 {
        self.intensities[y as usize * self.width as usize + x as usize]
    }
}
