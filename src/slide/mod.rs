//! Slide access layer.
//!
//! Two collaborator contracts live here, with one reference implementation
//! each:
//!
//! - [`SlideDecoder`]: opens a native slide file and extracts pixels from
//!   it (dimensions, calibration, thumbnails, pyramid tiles). The engine
//!   never decodes anything itself.
//! - [`ImageCatalog`]: resolves an opaque image identifier to the source
//!   path and recorded dimensions, standing in for the hosting system's
//!   metadata store.
//!
//! [`RasterSlideDecoder`] and [`DirectoryCatalog`] give the crate a working
//! end-to-end path over flat raster files; native slide formats plug in by
//! implementing the same traits.

mod catalog;
mod decoder;
mod raster;

pub use catalog::{DirectoryCatalog, ImageCatalog, SourceOptions};
pub use decoder::{SlideBounds, SlideDecoder, SlideProperties, TileLayout};
pub use raster::{RasterPyramid, RasterSlide, RasterSlideDecoder};
