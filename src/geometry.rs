//! Pyramid geometry for Deep Zoom addressing.
//!
//! Deep Zoom levels run from 0 (most downsampled) up to
//! `ceil(log2(max(width, height)))` at native resolution. The zoom factor
//! relates the sampling level at which a dataset materializes its pixel
//! array to the externally addressed pyramid, so callers never depend on
//! how a backend stores its downsampled representations.

use crate::error::GeometryError;

/// Native pixel extent, width by height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Longest edge in pixels.
    pub fn max_dimension(&self) -> u32 {
        self.width.max(self.height)
    }
}

/// Maximum pyramid level for an image of the given resolution.
///
/// max_level = ceil(log2(max(width, height)))
pub fn max_level(resolution: Resolution) -> Result<u32, GeometryError> {
    if resolution.width == 0 || resolution.height == 0 {
        return Err(GeometryError::InvalidResolution {
            width: resolution.width,
            height: resolution.height,
        });
    }

    let max_dim = resolution.max_dimension() as f64;
    if max_dim <= 1.0 {
        return Ok(0);
    }
    Ok(max_dim.log2().ceil() as u32)
}

/// Zoom factor relating a dataset's sampling level to the addressed pyramid.
///
/// `2^((max_level - sampling_level) + log2(tile_edge))`. The tile edge must
/// be a power of two; the result is then itself an exact power of two.
pub fn zoom_factor(
    resolution: Resolution,
    sampling_level: u32,
    tile_edge: u32,
) -> Result<f64, GeometryError> {
    if !tile_edge.is_power_of_two() {
        return Err(GeometryError::InvalidTileSize(tile_edge));
    }

    let max = max_level(resolution)?;
    let exponent = max as i32 - sampling_level as i32 + tile_edge.trailing_zeros() as i32;
    Ok(2f64.powi(exponent))
}

/// Pixel dimensions at a pyramid level.
///
/// At level L the extent is `ceil(native / 2^(max_level - L))`, floored at 1.
pub fn level_dimensions(resolution: Resolution, level: u32, max_level: u32) -> (u32, u32) {
    if level > max_level {
        return (0, 0);
    }

    let scale = 1u64 << (max_level - level);
    let level_width = (resolution.width as u64).div_ceil(scale) as u32;
    let level_height = (resolution.height as u64).div_ceil(scale) as u32;

    (level_width.max(1), level_height.max(1))
}

/// Tile grid extent (columns, rows) for a level's pixel dimensions.
pub fn tile_grid(level_width: u32, level_height: u32, tile_size: u32) -> (u32, u32) {
    let cols = level_width.div_ceil(tile_size);
    let rows = level_height.div_ceil(tile_size);
    (cols.max(1), rows.max(1))
}
