//! Flat raster slide decoder.
//!
//! Reference [`SlideDecoder`] built on the `image` crate. It materializes
//! the whole source once and synthesizes pyramid tiles by cropping the
//! native pixels and scaling them to the addressed level. Correct for
//! anything `image` can read; meant for moderately sized sources rather
//! than multi-gigapixel native formats, which get their own decoders.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use image::imageops::FilterType;
use image::DynamicImage;

use crate::error::DecodeError;
use crate::geometry::{self, Resolution};

use super::decoder::{SlideDecoder, SlideProperties, TileLayout};

/// Decoder for flat raster images (PNG, JPEG, BMP, plain TIFF).
#[derive(Debug, Clone, Default)]
pub struct RasterSlideDecoder {}

impl RasterSlideDecoder {
    pub fn new() -> Self {
        Self {}
    }
}

/// An opened flat raster image.
pub struct RasterSlide {
    path: PathBuf,
    pixels: DynamicImage,
}

impl RasterSlide {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Pyramid synthesized over a flat raster.
pub struct RasterPyramid {
    pixels: DynamicImage,
    resolution: Resolution,
    max_level: u32,
    layout: TileLayout,
}

impl RasterPyramid {
    pub fn max_level(&self) -> u32 {
        self.max_level
    }
}

#[async_trait]
impl SlideDecoder for RasterSlideDecoder {
    type Slide = RasterSlide;
    type Tiled = RasterPyramid;

    async fn open(&self, path: &Path) -> Result<RasterSlide, DecodeError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => DecodeError::NotFound {
                path: path.display().to_string(),
            },
            _ => DecodeError::Decode(e.to_string()),
        })?;

        let pixels =
            image::load_from_memory(&bytes).map_err(|e| DecodeError::Decode(e.to_string()))?;

        Ok(RasterSlide {
            path: path.to_path_buf(),
            pixels,
        })
    }

    fn dimensions(&self, slide: &RasterSlide) -> Resolution {
        Resolution::new(slide.pixels.width(), slide.pixels.height())
    }

    fn properties(&self, _slide: &RasterSlide) -> Option<SlideProperties> {
        // Flat rasters carry no scanner calibration
        None
    }

    async fn thumbnail(
        &self,
        slide: &RasterSlide,
        edge_size: u32,
    ) -> Result<DynamicImage, DecodeError> {
        if edge_size == 0 {
            return Err(DecodeError::Decode(
                "thumbnail edge must be positive".to_string(),
            ));
        }

        // Downscale only; a source already inside the box is returned as is
        if slide.pixels.width() <= edge_size && slide.pixels.height() <= edge_size {
            return Ok(slide.pixels.clone());
        }
        Ok(slide.pixels.thumbnail(edge_size, edge_size))
    }

    fn tiled_view(
        &self,
        slide: RasterSlide,
        layout: TileLayout,
    ) -> Result<RasterPyramid, DecodeError> {
        if layout.tile_size == 0 {
            return Err(DecodeError::Decode("tile size must be positive".to_string()));
        }

        let resolution = Resolution::new(slide.pixels.width(), slide.pixels.height());
        let max_level =
            geometry::max_level(resolution).map_err(|e| DecodeError::Decode(e.to_string()))?;

        Ok(RasterPyramid {
            pixels: slide.pixels,
            resolution,
            max_level,
            layout,
        })
    }

    async fn read_tile(
        &self,
        view: &RasterPyramid,
        level: u32,
        col: u32,
        row: u32,
    ) -> Result<DynamicImage, DecodeError> {
        if level > view.max_level {
            return Err(DecodeError::InvalidLevel {
                level,
                max_levels: view.max_level + 1,
            });
        }

        let (level_w, level_h) = geometry::level_dimensions(view.resolution, level, view.max_level);
        let ts = view.layout.tile_size;
        let (cols, rows) = geometry::tile_grid(level_w, level_h, ts);

        if col >= cols || row >= rows {
            return Err(DecodeError::TileOutOfBounds {
                level,
                col,
                row,
                cols,
                rows,
            });
        }

        // Tile extent in level space. Edge tiles shrink to the level bounds;
        // each border shared with a neighbor grows by the overlap.
        let ov = view.layout.overlap;
        let left = if col > 0 { ov } else { 0 };
        let top = if row > 0 { ov } else { 0 };
        let right = if col + 1 < cols { ov } else { 0 };
        let bottom = if row + 1 < rows { ov } else { 0 };

        let x0 = (col * ts).saturating_sub(left);
        let y0 = (row * ts).saturating_sub(top);
        let x1 = ((col + 1) * ts + right).min(level_w);
        let y1 = ((row + 1) * ts + bottom).min(level_h);

        let out_w = x1 - x0;
        let out_h = y1 - y0;

        // Map the level-space rectangle back to native pixels
        let scale = 1u64 << (view.max_level - level);
        let native_w = view.resolution.width as u64;
        let native_h = view.resolution.height as u64;

        let nx = (x0 as u64 * scale).min(native_w.saturating_sub(1));
        let ny = (y0 as u64 * scale).min(native_h.saturating_sub(1));
        let nw = (out_w as u64 * scale).min(native_w - nx).max(1);
        let nh = (out_h as u64 * scale).min(native_h - ny).max(1);

        let region = view
            .pixels
            .crop_imm(nx as u32, ny as u32, nw as u32, nh as u32);

        if scale == 1 {
            return Ok(region);
        }
        Ok(region.resize_exact(out_w, out_h, FilterType::Lanczos3))
    }
}
