//! Tile engine layer.
//!
//! This module turns image ids and pyramid coordinates into encoded bytes,
//! with a cache in front of every expensive regeneration.
//!
//! # Architecture
//!
//! The engine sits between the caller and the slide abstraction:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          Caller (CLI, service)          │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │              TileEngine                 │
//! │  ┌──────────────┐  ┌─────────────────┐  │
//! │  │  CacheStore  │  │   TileCodec     │  │
//! │  │  (encoded    │  │  (pixels →      │  │
//! │  │   artifacts) │  │   jpeg/png)     │  │
//! │  └──────────────┘  └─────────────────┘  │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │      SlideDecoder + ImageCatalog        │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`TileEngine`]: main entry point, orchestrates the cache-aside pipeline
//! - [`TileCodec`]: encodes pixel buffers into the supported output formats
//! - [`TileRequest`] / [`ThumbnailRequest`]: request parameters
//! - [`TileOutput`]: encoded bytes plus cache provenance
//! - [`PyramidDescriptor`] / [`ImageSummary`]: Deep Zoom metadata documents

mod coalesce;
mod codec;
mod descriptor;
mod engine;

pub use codec::{
    clamp_quality, is_valid_quality, ImageFormat, TileCodec, DEFAULT_QUALITY, MAX_QUALITY,
    MIN_QUALITY,
};
pub use descriptor::{
    ImageElement, ImageSummary, PyramidDescriptor, SizeElement, DEEPZOOM_XMLNS,
};
pub use engine::{ThumbnailRequest, TileEngine, TileOutput, TileRequest};
