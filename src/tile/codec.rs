//! Pixel buffer encoding for transport.
//!
//! The codec turns raw pixel regions handed over by the slide decoder into
//! the bytes that get cached and served. Quality only applies to lossy
//! output; lossless formats encode the same way regardless of the requested
//! quality, which is also why quality never reaches their cache keys.

use std::io::Cursor;
use std::str::FromStr;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageReader};

use crate::error::CodecError;

/// Default JPEG quality (1-100).
pub const DEFAULT_QUALITY: u8 = 80;

/// Minimum allowed JPEG quality.
pub const MIN_QUALITY: u8 = 1;

/// Maximum allowed JPEG quality.
pub const MAX_QUALITY: u8 = 100;

// =============================================================================
// Output Format
// =============================================================================

/// Transport format for encoded tiles and thumbnails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// Lossy JPEG, quality-controlled
    Jpeg,
    /// Lossless PNG
    Png,
}

impl ImageFormat {
    /// Short tag used in cache keys and descriptors.
    pub fn tag(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Png => "png",
        }
    }

    /// Whether the quality setting changes the encoded output.
    pub fn is_lossy(&self) -> bool {
        matches!(self, ImageFormat::Jpeg)
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(ImageFormat::Jpeg),
            "png" => Ok(ImageFormat::Png),
            other => Err(format!("unknown image format '{other}' (expected jpeg or png)")),
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

// =============================================================================
// Codec
// =============================================================================

/// Encoder for raw pixel buffers.
///
/// Stateless; construct once and share freely.
#[derive(Debug, Clone, Default)]
pub struct TileCodec {}

impl TileCodec {
    pub fn new() -> Self {
        Self {}
    }

    /// Encode a pixel buffer, applying `quality` only for lossy formats.
    ///
    /// Encoding is deterministic: identical pixels, format, and quality
    /// always produce identical bytes.
    pub fn encode(
        &self,
        pixels: &DynamicImage,
        format: ImageFormat,
        quality: u8,
    ) -> Result<Bytes, CodecError> {
        match format {
            ImageFormat::Jpeg => self.encode_jpeg(pixels, quality),
            ImageFormat::Png => self.encode_png(pixels),
        }
    }

    fn encode_jpeg(&self, pixels: &DynamicImage, quality: u8) -> Result<Bytes, CodecError> {
        let quality = quality.clamp(MIN_QUALITY, MAX_QUALITY);

        // JPEG has no alpha channel; flatten to RGB first
        let rgb = pixels.to_rgb8();

        let mut output = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut output, quality);
        encoder
            .encode_image(&rgb)
            .map_err(|e| map_image_error("jpeg", e))?;

        Ok(Bytes::from(output))
    }

    fn encode_png(&self, pixels: &DynamicImage) -> Result<Bytes, CodecError> {
        let mut output = Vec::new();
        let encoder = PngEncoder::new(&mut output);
        pixels
            .write_with_encoder(encoder)
            .map_err(|e| map_image_error("png", e))?;

        Ok(Bytes::from(output))
    }

    /// Get encoded image dimensions without fully decoding.
    pub fn dimensions(&self, encoded: &[u8]) -> Result<(u32, u32), CodecError> {
        let reader = ImageReader::new(Cursor::new(encoded))
            .with_guessed_format()
            .map_err(|e| CodecError::Encode {
                format: "unknown",
                message: e.to_string(),
            })?;

        reader.into_dimensions().map_err(|e| CodecError::Encode {
            format: "unknown",
            message: e.to_string(),
        })
    }
}

fn map_image_error(format: &'static str, e: image::ImageError) -> CodecError {
    match e {
        image::ImageError::Unsupported(err) => CodecError::UnsupportedPixelLayout {
            format,
            message: err.to_string(),
        },
        other => CodecError::Encode {
            format,
            message: other.to_string(),
        },
    }
}

// =============================================================================
// Utility Functions
// =============================================================================

/// Validate a quality parameter.
///
/// Returns `true` if quality is in the valid range (1-100).
#[inline]
pub fn is_valid_quality(quality: u8) -> bool {
    quality >= MIN_QUALITY && quality <= MAX_QUALITY
}

/// Clamp quality to the valid range.
#[inline]
pub fn clamp_quality(quality: u8) -> u8 {
    quality.clamp(MIN_QUALITY, MAX_QUALITY)
}

// =============================================================================
// Tests
// =============================================================================
