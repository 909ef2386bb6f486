//! Slide decoding contract.
//!
//! A [`SlideDecoder`] is the collaborator that knows how to open a native
//! slide file and pull pixels out of it. The engine stays format-agnostic:
//! it asks for dimensions, a bounding-box thumbnail, or one tile of a
//! pyramidal view, and leaves level validity and pixel extraction to the
//! decoder. A missing source surfaces as [`DecodeError::NotFound`], which
//! the engine downgrades to an absent result.

use std::path::Path;

use async_trait::async_trait;
use image::DynamicImage;
use serde::Serialize;

use crate::error::DecodeError;
use crate::geometry::Resolution;

/// Pyramidal view configuration, mirroring Deep Zoom generator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileLayout {
    /// Square tile edge in pixels
    pub tile_size: u32,

    /// Pixels shared between adjacent tiles
    pub overlap: u32,

    /// Restrict the pyramid to the scanned region
    pub limit_bounds: bool,
}

impl Default for TileLayout {
    fn default() -> Self {
        Self {
            tile_size: 256,
            overlap: 0,
            limit_bounds: true,
        }
    }
}

/// Physical calibration metadata as recorded by the scanner.
///
/// Values stay raw strings: sources routinely carry missing or non-numeric
/// entries, and the policy for those (default to zero, never fail) belongs
/// to the engine, not the decoder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlideProperties {
    /// Microns per pixel along x
    pub mpp_x: Option<String>,

    /// Microns per pixel along y
    pub mpp_y: Option<String>,
}

/// Pixel bounds of the scanned region within a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlideBounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Opens native slide files and extracts pixels from them.
#[async_trait]
pub trait SlideDecoder: Send + Sync {
    /// An opened slide.
    type Slide: Send + Sync;

    /// A pyramidal view over an opened slide.
    type Tiled: Send + Sync;

    /// Open a slide. A missing source is [`DecodeError::NotFound`].
    async fn open(&self, path: &Path) -> Result<Self::Slide, DecodeError>;

    /// Native pixel extent of the slide.
    fn dimensions(&self, slide: &Self::Slide) -> Resolution;

    /// Calibration metadata, when the source carries any.
    fn properties(&self, slide: &Self::Slide) -> Option<SlideProperties>;

    /// Pixel bounds of the scanned region. Defaults to the full extent.
    fn bounds(&self, slide: &Self::Slide) -> SlideBounds {
        let res = self.dimensions(slide);
        SlideBounds {
            x: 0,
            y: 0,
            width: res.width,
            height: res.height,
        }
    }

    /// Bounding-box thumbnail of at most `edge_size` pixels per side,
    /// aspect ratio preserved.
    async fn thumbnail(
        &self,
        slide: &Self::Slide,
        edge_size: u32,
    ) -> Result<DynamicImage, DecodeError>;

    /// Build a pyramidal view of the slide with the given layout.
    fn tiled_view(
        &self,
        slide: Self::Slide,
        layout: TileLayout,
    ) -> Result<Self::Tiled, DecodeError>;

    /// Extract one tile. The decoder is the authority on grid validity:
    /// out-of-range coordinates are [`DecodeError::TileOutOfBounds`] and a
    /// level past the pyramid top is [`DecodeError::InvalidLevel`].
    async fn read_tile(
        &self,
        view: &Self::Tiled,
        level: u32,
        col: u32,
        row: u32,
    ) -> Result<DynamicImage, DecodeError>;
}
