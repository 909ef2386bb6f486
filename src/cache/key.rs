//! Deterministic cache keys for encoded artifacts.
//!
//! Two requests with identical addressing must produce identical keys, and
//! any one differing field must produce a different key. Quality joins the
//! key only for lossy output formats, and never for thumbnails, so lossless
//! requests at different quality settings share a single entry.

use std::fmt;

use crate::tile::ImageFormat;

/// Opaque key addressing one encoded tile or thumbnail in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for a pyramid tile.
    pub fn tile(
        image_id: &str,
        level: u32,
        col: u32,
        row: u32,
        tile_size: u32,
        format: ImageFormat,
        quality: u8,
    ) -> Self {
        let mut key = format!(
            "tile/img={image_id}/l={level}/c={col}/r={row}/ts={tile_size}/fmt={}",
            format.tag()
        );
        if format.is_lossy() {
            key.push_str(&format!("/q={quality}"));
        }
        Self(key)
    }

    /// Key for a whole-slide thumbnail.
    pub fn thumbnail(image_id: &str, edge_size: u32, format: ImageFormat) -> Self {
        Self(format!(
            "thumbnail/img={image_id}/e={edge_size}/fmt={}",
            format.tag()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
