//! Deep Zoom pyramid descriptors and image summaries.
//!
//! Deep Zoom counts levels up from the most downsampled: level 0 is at most
//! 1x1 and the top level is native resolution. The descriptor advertises the
//! pyramid to viewers such as OpenSeadragon, which then address tiles by
//! (level, column, row).
//!
//! Descriptors are cheap to build and always reflect the source, so they are
//! never cached.

use serde::{Deserialize, Serialize};

use crate::geometry::Resolution;
use crate::slide::SlideBounds;
use crate::tile::ImageFormat;

/// XML namespace every Deep Zoom descriptor declares.
pub const DEEPZOOM_XMLNS: &str = "http://schemas.microsoft.com/deepzoom/2008";

// =============================================================================
// PyramidDescriptor
// =============================================================================

/// JSON form of a Deep Zoom descriptor.
///
/// The schema is fixed by the viewers consuming it: one `Image` element with
/// `Overlap`, `TileSize`, and the `Size` extents all serialized as decimal
/// strings, not numbers. The tile size is advertised as-is; nothing here
/// requires it to be a power of two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PyramidDescriptor {
    #[serde(rename = "Image")]
    pub image: ImageElement,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageElement {
    pub xmlns: String,

    #[serde(rename = "Url")]
    pub url: String,

    #[serde(rename = "Format")]
    pub format: String,

    #[serde(rename = "Overlap")]
    pub overlap: String,

    #[serde(rename = "TileSize")]
    pub tile_size: String,

    #[serde(rename = "Size")]
    pub size: SizeElement,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeElement {
    #[serde(rename = "Height")]
    pub height: String,

    #[serde(rename = "Width")]
    pub width: String,
}

impl PyramidDescriptor {
    pub fn new(
        resource_url: &str,
        format: ImageFormat,
        overlap: u32,
        tile_size: u32,
        resolution: Resolution,
    ) -> Self {
        Self {
            image: ImageElement {
                xmlns: DEEPZOOM_XMLNS.to_string(),
                url: resource_url.to_string(),
                format: format.tag().to_string(),
                overlap: overlap.to_string(),
                tile_size: tile_size.to_string(),
                size: SizeElement {
                    height: resolution.height.to_string(),
                    width: resolution.width.to_string(),
                },
            },
        }
    }

    /// Render the equivalent `.dzi` XML document.
    pub fn to_dzi_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Image xmlns="{xmlns}"
       TileSize="{tile_size}"
       Overlap="{overlap}"
       Format="{format}">
  <Size Width="{width}" Height="{height}" />
</Image>"#,
            xmlns = self.image.xmlns,
            tile_size = self.image.tile_size,
            overlap = self.image.overlap,
            format = self.image.format,
            width = self.image.size.width,
            height = self.image.size.height,
        )
    }
}

// =============================================================================
// ImageSummary
// =============================================================================

/// Aggregate description of one image: physical calibration, pyramid
/// descriptor, and scanned-region bounds.
///
/// Absence never fails a summary. An unresolvable image yields zero
/// calibration and `None` members rather than an error.
#[derive(Debug, Clone, Serialize)]
pub struct ImageSummary {
    /// Mean microns-per-pixel of the two scanner axes; 0.0 when the source
    /// carries no usable calibration.
    pub image_mpp: f64,

    pub tile_sources: Option<PyramidDescriptor>,

    pub slide_bounds: Option<SlideBounds>,
}
