//! Uniform array-style access to opened slides.
//!
//! A [`Dataset`] is one slide materialized as an addressable pixel array at
//! a single pyramid level, regardless of how the bytes are stored on disk.
//! Format support is pluggable: each [`DatasetFactory`] claims a set of file
//! suffixes and the [`DatasetRegistry`] routes paths to the right factory,
//! falling back to a configurable default for suffixes nobody claimed.
//!
//! Datasets are ephemeral. They are opened per request, owned by that
//! request, and dropped when it completes; nothing here is pooled or shared.

mod raster;
mod registry;

use std::path::Path;

use async_trait::async_trait;
use image::DynamicImage;

use crate::error::{DatasetError, GeometryError};
use crate::geometry::{self, Resolution};

pub use raster::{RasterDataset, RasterDatasetFactory, DEFAULT_DATASET_TILE_SIZE};
pub use registry::{DatasetRegistry, DatasetRegistryBuilder};

// =============================================================================
// Dataset
// =============================================================================

/// One opened slide exposed as a pixel array.
///
/// `shape` follows array convention, (rows, cols), while
/// [`Resolution`] stays (width, height). Mixing the two up is the classic
/// off-by-transpose bug, so both orderings are spelled out at the accessor.
pub trait Dataset: Send + Sync + std::fmt::Debug {
    /// Array extent at the sampling level, as (rows, cols).
    fn shape(&self) -> (u32, u32);

    /// Edge length of the dataset's storage tiles, in pixels.
    fn tile_size(&self) -> u32;

    /// Pyramid level at which the array was materialized.
    fn sampling_level(&self) -> u32;

    /// Path of the backing slide file.
    fn slide_path(&self) -> &Path;

    /// Native resolution of the source slide, as (width, height).
    fn slide_resolution(&self) -> Resolution;

    /// The materialized pixels.
    fn pixel_array(&self) -> &DynamicImage;

    /// Scale factor between the sampling level and the deepest zoom the
    /// pyramid can serve. Always an exact power of two.
    fn zoom_factor(&self) -> Result<f64, GeometryError> {
        geometry::zoom_factor(
            self.slide_resolution(),
            self.sampling_level(),
            self.tile_size(),
        )
    }
}

// =============================================================================
// DatasetFactory
// =============================================================================

/// Constructor for one family of source formats.
#[async_trait]
pub trait DatasetFactory: Send + Sync {
    /// File suffixes this factory serves, lowercase, without the dot.
    fn suffixes(&self) -> &[&str];

    /// Open the dataset stored at `path`.
    async fn open(&self, path: &Path) -> Result<Box<dyn Dataset>, DatasetError>;
}
