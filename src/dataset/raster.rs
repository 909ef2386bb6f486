use std::path::{Path, PathBuf};

use async_trait::async_trait;
use image::DynamicImage;

use crate::dataset::{Dataset, DatasetFactory};
use crate::error::DatasetError;
use crate::geometry::{self, Resolution};

/// Storage tile edge assumed for flat rasters, which carry no intrinsic
/// chunking of their own.
pub const DEFAULT_DATASET_TILE_SIZE: u32 = 256;

const RASTER_SUFFIXES: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

// =============================================================================
// RasterDataset
// =============================================================================

/// Flat raster file materialized at native resolution.
///
/// With no pyramid in the file, the sampling level is the top of the
/// computed pyramid and `shape` mirrors the native extent transposed.
#[derive(Debug)]
pub struct RasterDataset {
    path: PathBuf,
    pixels: DynamicImage,
    resolution: Resolution,
    sampling_level: u32,
    tile_size: u32,
}

impl Dataset for RasterDataset {
    fn shape(&self) -> (u32, u32) {
        (self.resolution.height, self.resolution.width)
    }

    fn tile_size(&self) -> u32 {
        self.tile_size
    }

    fn sampling_level(&self) -> u32 {
        self.sampling_level
    }

    fn slide_path(&self) -> &Path {
        &self.path
    }

    fn slide_resolution(&self) -> Resolution {
        self.resolution
    }

    fn pixel_array(&self) -> &DynamicImage {
        &self.pixels
    }
}

// =============================================================================
// RasterDatasetFactory
// =============================================================================

/// Opens flat raster files; also serves as the registry fallback.
///
/// Decoding sniffs the content, so a misnamed file still opens as long as
/// the bytes are a format the `image` crate recognizes.
pub struct RasterDatasetFactory {
    tile_size: u32,
}

impl RasterDatasetFactory {
    pub fn new() -> Self {
        Self {
            tile_size: DEFAULT_DATASET_TILE_SIZE,
        }
    }

    pub fn with_tile_size(tile_size: u32) -> Self {
        Self { tile_size }
    }
}

impl Default for RasterDatasetFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatasetFactory for RasterDatasetFactory {
    fn suffixes(&self) -> &[&str] {
        RASTER_SUFFIXES
    }

    async fn open(&self, path: &Path) -> Result<Box<dyn Dataset>, DatasetError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| DatasetError::Open {
                path: path.display().to_string(),
                message: source.to_string(),
            })?;

        let pixels = image::load_from_memory(&bytes)
            .map_err(|source| DatasetError::Decode(source.to_string()))?;
        let resolution = Resolution::new(pixels.width(), pixels.height());
        let sampling_level = geometry::max_level(resolution)
            .map_err(|source| DatasetError::Decode(source.to_string()))?;

        Ok(Box::new(RasterDataset {
            path: path.to_path_buf(),
            pixels,
            resolution,
            sampling_level,
            tile_size: self.tile_size,
        }))
    }
}
