//! # WSI Tiler
//!
//! A cache-backed pyramid tile and thumbnail engine for Whole Slide Images (WSI).
//!
//! This library turns gigapixel microscopy slides into Deep Zoom pyramids:
//! callers ask for a tile at a (level, column, row) address or a bounded
//! thumbnail, and the engine serves encoded bytes out of a cache, decoding
//! and re-encoding from the slide only on a miss. Image identifiers are
//! resolved to files through a catalog, so the engine never trusts a path
//! from the outside.
//!
//! ## Features
//!
//! - **Cache-aside serving**: Encoded tiles and thumbnails are cached under
//!   deterministic keys; a degraded cache backend degrades latency, never
//!   correctness
//! - **Deep Zoom geometry**: Level math, tile grids, and DZI descriptors that
//!   standard viewers consume directly
//! - **Miss coalescing**: Concurrent requests for the same missing tile share
//!   a single decode
//! - **Pluggable datasets**: A suffix-driven registry opens slides as uniform
//!   array datasets for pixel-level access
//! - **Batch deletion**: A utility that retires slides from a remote catalog
//!   and removes their local artifacts
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`geometry`] - Pyramid level math shared by every component
//! - [`cache`] - Cache keys and the byte-cache abstraction
//! - [`slide`] - Slide decoding, properties, and identifier resolution
//! - [`dataset`] - Suffix-driven dataset registry for array access
//! - [`tile`] - The tile engine, codec, and Deep Zoom descriptors
//! - [`deleter`] - The batch deletion utility
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use wsi_tiler::tile::ImageFormat;
//! use wsi_tiler::{
//!     DatasetRegistry, DirectoryCatalog, MemoryCacheStore, RasterSlideDecoder, TileEngine,
//!     TileRequest,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = TileEngine::new(
//!         RasterSlideDecoder::new(),
//!         MemoryCacheStore::new(),
//!         DirectoryCatalog::new("/data/slides"),
//!         Arc::new(DatasetRegistry::with_default_formats()),
//!     );
//!
//!     let request = TileRequest::new("slide-1", 12, 0, 0, 256, ImageFormat::Jpeg);
//!     match engine.tile(request).await {
//!         Ok(Some(tile)) => println!("{} bytes (hit: {})", tile.data.len(), tile.cache_hit),
//!         Ok(None) => println!("unknown image"),
//!         Err(e) => eprintln!("tile failed: {}", e),
//!     }
//! }
//! ```

pub mod cache;
pub mod config;
pub mod dataset;
pub mod deleter;
pub mod error;
pub mod geometry;
pub mod slide;
pub mod tile;

// Re-export commonly used types
pub use cache::{CacheKey, CacheStore, MemoryCacheStore, DEFAULT_CACHE_CAPACITY};
pub use config::{
    Cli, Command, DeleteArgs, DescribeArgs, EngineConfig, DEFAULT_CACHE_TTL_SECS, DEFAULT_OVERLAP,
    DEFAULT_TILE_SIZE,
};
pub use dataset::{
    Dataset, DatasetFactory, DatasetRegistry, DatasetRegistryBuilder, RasterDataset,
    RasterDatasetFactory, DEFAULT_DATASET_TILE_SIZE,
};
pub use deleter::{
    load_slide_list, parse_slide_list, CatalogApi, DeletionReport, FileInfo, HttpCatalogApi,
    SlideDeleter,
};
pub use error::{
    ApiError, CacheError, CodecError, DatasetError, DecodeError, EngineError, GeometryError,
};
pub use geometry::{level_dimensions, max_level, tile_grid, zoom_factor, Resolution};
pub use slide::{
    DirectoryCatalog, ImageCatalog, RasterSlideDecoder, SlideBounds, SlideDecoder, SlideProperties,
    SourceOptions, TileLayout,
};
pub use tile::{
    clamp_quality, is_valid_quality, ImageFormat, ImageSummary, PyramidDescriptor,
    ThumbnailRequest, TileCodec, TileEngine, TileOutput, TileRequest, DEEPZOOM_XMLNS,
    DEFAULT_QUALITY, MAX_QUALITY, MIN_QUALITY,
};
