//! Test utilities for integration tests.
//!
//! This module builds fully wired engines over a temporary slide directory,
//! with real decoding, encoding, and caching, plus helpers for writing
//! synthetic slides and validating encoded streams.

use std::path::PathBuf;
use std::sync::Arc;

use image::{Rgb, RgbImage};
use tempfile::TempDir;

use wsi_tiler::cache::MemoryCacheStore;
use wsi_tiler::config::EngineConfig;
use wsi_tiler::dataset::DatasetRegistry;
use wsi_tiler::slide::{DirectoryCatalog, RasterSlideDecoder};
use wsi_tiler::tile::TileEngine;

pub type TestEngine = TileEngine<RasterSlideDecoder, MemoryCacheStore, DirectoryCatalog>;

// =============================================================================
// Engine Construction
// =============================================================================

/// Build an engine with real collaborators serving slides out of `dir`.
pub fn build_engine(dir: &TempDir) -> TestEngine {
    build_engine_with_config(dir, EngineConfig::default())
}

pub fn build_engine_with_config(dir: &TempDir, config: EngineConfig) -> TestEngine {
    TileEngine::with_config(
        RasterSlideDecoder::new(),
        MemoryCacheStore::new(),
        DirectoryCatalog::new(dir.path()),
        Arc::new(DatasetRegistry::with_default_formats()),
        config,
    )
}

// =============================================================================
// Synthetic Slides
// =============================================================================

/// Write a gradient PNG slide into `dir` and return its path.
///
/// The gradient makes neighboring tiles visually distinct, so wrong crops
/// do not accidentally encode to identical bytes.
pub fn write_slide(dir: &TempDir, name: &str, width: u32, height: u32) -> PathBuf {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 251) as u8, (y % 241) as u8, ((x + y) % 231) as u8])
    });
    let path = dir.path().join(name);
    img.save(&path).unwrap();
    path
}

// =============================================================================
// Stream Validation
// =============================================================================

/// JPEG streams start with SOI and end with EOI.
pub fn is_valid_jpeg(data: &[u8]) -> bool {
    data.len() >= 4
        && data[0] == 0xFF
        && data[1] == 0xD8
        && data[data.len() - 2] == 0xFF
        && data[data.len() - 1] == 0xD9
}

/// PNG streams start with the fixed eight-byte signature.
pub fn is_valid_png(data: &[u8]) -> bool {
    data.len() >= 8 && data[..8] == [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]
}
