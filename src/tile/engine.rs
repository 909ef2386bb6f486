//! Cache-aside orchestration of tile and thumbnail requests.
//!
//! The engine owns the protocol every rendered artifact follows:
//!
//! 1. Derive the deterministic cache key for the request
//! 2. Look it up in the cache; a backend failure counts as a miss
//! 3. On a miss, resolve the image id to a source path
//! 4. Open the slide and extract the requested pixels
//! 5. Encode in the requested output format
//! 6. Best-effort store under the key, then return the bytes
//!
//! Absence is a `None`, not an error: an id the catalog cannot resolve, or
//! a resolved path whose file is gone, yields `Ok(None)` so callers can map
//! it to their own not-found handling. Decode and encode failures are real
//! per-request errors. Cache backend failures are logged and absorbed; the
//! engine must keep serving from sources when the cache is down.

use std::sync::Arc;

use bytes::Bytes;
use tracing::warn;

use crate::cache::{CacheKey, CacheStore};
use crate::config::EngineConfig;
use crate::dataset::{Dataset, DatasetRegistry};
use crate::error::{DecodeError, EngineError};
use crate::slide::{ImageCatalog, SlideDecoder, SlideProperties, SourceOptions, TileLayout};
use crate::tile::codec::DEFAULT_QUALITY;
use crate::tile::coalesce::MissCoalescer;
use crate::tile::descriptor::{ImageSummary, PyramidDescriptor};
use crate::tile::{ImageFormat, TileCodec};

// =============================================================================
// Requests
// =============================================================================

/// A request for a whole-slide thumbnail.
#[derive(Debug, Clone)]
pub struct ThumbnailRequest {
    /// Opaque image identifier
    pub image_id: String,

    /// Maximum edge of the bounding box, in pixels
    pub edge_size: u32,

    /// Output encoding
    pub format: ImageFormat,

    /// Encoding quality, applied only to lossy formats
    pub quality: u8,

    /// Which source file backs the id
    pub source: SourceOptions,
}

impl ThumbnailRequest {
    pub fn new(image_id: impl Into<String>, edge_size: u32, format: ImageFormat) -> Self {
        Self {
            image_id: image_id.into(),
            edge_size,
            format,
            quality: DEFAULT_QUALITY,
            source: SourceOptions::default(),
        }
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_source(mut self, source: SourceOptions) -> Self {
        self.source = source;
        self
    }
}

/// A request for one pyramid tile.
#[derive(Debug, Clone)]
pub struct TileRequest {
    /// Opaque image identifier
    pub image_id: String,

    /// Deep Zoom level, 0 = most downsampled
    pub level: u32,

    /// Tile column, 0-indexed from the left
    pub col: u32,

    /// Tile row, 0-indexed from the top
    pub row: u32,

    /// Square tile edge in pixels
    pub tile_size: u32,

    /// Output encoding
    pub format: ImageFormat,

    /// Encoding quality, applied only to lossy formats
    pub quality: u8,

    /// Which source file backs the id
    pub source: SourceOptions,
}

impl TileRequest {
    pub fn new(
        image_id: impl Into<String>,
        level: u32,
        col: u32,
        row: u32,
        tile_size: u32,
        format: ImageFormat,
    ) -> Self {
        Self {
            image_id: image_id.into(),
            level,
            col,
            row,
            tile_size,
            format,
            quality: DEFAULT_QUALITY,
            source: SourceOptions::default(),
        }
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_source(mut self, source: SourceOptions) -> Self {
        self.source = source;
        self
    }
}

// =============================================================================
// Output
// =============================================================================

/// An encoded artifact ready to serve.
#[derive(Debug, Clone)]
pub struct TileOutput {
    /// The encoded bytes
    pub data: Bytes,

    /// The encoding of `data`
    pub format: ImageFormat,

    /// Whether the bytes came out of the cache
    pub cache_hit: bool,
}

// =============================================================================
// TileEngine
// =============================================================================

/// Cache-backed pyramid tile engine.
///
/// Generic over its collaborators so deployments can swap the slide decoder,
/// cache backend, and catalog independently. The engine itself holds no
/// mutable state; share it behind an `Arc` and call it from as many tasks as
/// needed. Slides are opened fresh per request and dropped when the request
/// completes; nothing is pooled.
pub struct TileEngine<D: SlideDecoder, C: CacheStore, M: ImageCatalog> {
    decoder: D,
    cache: C,
    catalog: M,
    registry: Arc<DatasetRegistry>,
    codec: TileCodec,
    coalescer: MissCoalescer,
    config: EngineConfig,
}

impl<D, C, M> TileEngine<D, C, M>
where
    D: SlideDecoder,
    C: CacheStore,
    M: ImageCatalog,
{
    pub fn new(decoder: D, cache: C, catalog: M, registry: Arc<DatasetRegistry>) -> Self {
        Self::with_config(decoder, cache, catalog, registry, EngineConfig::default())
    }

    pub fn with_config(
        decoder: D,
        cache: C,
        catalog: M,
        registry: Arc<DatasetRegistry>,
        config: EngineConfig,
    ) -> Self {
        Self {
            decoder,
            cache,
            catalog,
            registry,
            codec: TileCodec::new(),
            coalescer: MissCoalescer::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Serve a whole-slide thumbnail.
    ///
    /// `Ok(None)` means the image id does not resolve to a readable source.
    pub async fn thumbnail(
        &self,
        request: ThumbnailRequest,
    ) -> Result<Option<TileOutput>, EngineError> {
        let key = CacheKey::thumbnail(&request.image_id, request.edge_size, request.format);

        if let Some(data) = self.cache_get(&key).await {
            return Ok(Some(TileOutput {
                data,
                format: request.format,
                cache_hit: true,
            }));
        }

        let generated = if self.config.coalesce_misses {
            self.coalescer
                .run(&key, || self.regenerate_thumbnail(&request, &key))
                .await?
        } else {
            self.regenerate_thumbnail(&request, &key).await?
        };

        Ok(generated.map(|data| TileOutput {
            data,
            format: request.format,
            cache_hit: false,
        }))
    }

    /// Serve one pyramid tile.
    ///
    /// `Ok(None)` means the image id does not resolve to a readable source.
    /// Coordinates outside the level's grid are an error, not an absence;
    /// the decoder is the authority on grid validity.
    pub async fn tile(&self, request: TileRequest) -> Result<Option<TileOutput>, EngineError> {
        let key = CacheKey::tile(
            &request.image_id,
            request.level,
            request.col,
            request.row,
            request.tile_size,
            request.format,
            request.quality,
        );

        if let Some(data) = self.cache_get(&key).await {
            return Ok(Some(TileOutput {
                data,
                format: request.format,
                cache_hit: true,
            }));
        }

        let generated = if self.config.coalesce_misses {
            self.coalescer
                .run(&key, || self.regenerate_tile(&request, &key))
                .await?
        } else {
            self.regenerate_tile(&request, &key).await?
        };

        Ok(generated.map(|data| TileOutput {
            data,
            format: request.format,
            cache_hit: false,
        }))
    }

    /// Deep Zoom descriptor for an image.
    ///
    /// Dimensions come from the catalog record (the highest-resolution entry
    /// of the fileset) or, for original uploads, by opening the file and
    /// measuring. Descriptors are never cached.
    pub async fn descriptor(
        &self,
        resource_url: &str,
        image_id: &str,
        tile_size: u32,
        source: &SourceOptions,
    ) -> Result<Option<PyramidDescriptor>, EngineError> {
        let resolution = if source.original_file {
            match self.catalog.resolve_path(image_id, source).await {
                Some(path) => match self.decoder.open(&path).await {
                    Ok(slide) => Some(self.decoder.dimensions(&slide)),
                    Err(DecodeError::NotFound { .. }) => None,
                    Err(err) => return Err(err.into()),
                },
                None => None,
            }
        } else {
            self.catalog.dimensions(image_id).await
        };

        Ok(resolution.map(|resolution| {
            PyramidDescriptor::new(
                resource_url,
                self.config.format,
                self.config.overlap,
                tile_size,
                resolution,
            )
        }))
    }

    /// Aggregate calibration, descriptor, and scanned-region bounds.
    ///
    /// Never fails on absence: an unresolvable image reports zero
    /// microns-per-pixel and `None` members.
    pub async fn image_summary(
        &self,
        resource_url: &str,
        image_id: &str,
        tile_size: u32,
        source: &SourceOptions,
    ) -> Result<ImageSummary, EngineError> {
        let (image_mpp, slide_bounds) = match self.catalog.resolve_path(image_id, source).await {
            Some(path) => match self.decoder.open(&path).await {
                Ok(slide) => {
                    let mpp = self
                        .decoder
                        .properties(&slide)
                        .map(|properties| mean_mpp(&properties))
                        .unwrap_or(0.0);
                    (mpp, Some(self.decoder.bounds(&slide)))
                }
                Err(DecodeError::NotFound { .. }) => (0.0, None),
                Err(err) => return Err(err.into()),
            },
            None => (0.0, None),
        };

        let tile_sources = self
            .descriptor(resource_url, image_id, tile_size, source)
            .await?;

        Ok(ImageSummary {
            image_mpp,
            tile_sources,
            slide_bounds,
        })
    }

    /// Open the image as a [`Dataset`] for array-style consumers.
    ///
    /// The dataset is owned by the caller and dropped when done; datasets
    /// are never cached or pooled.
    pub async fn open_dataset(
        &self,
        image_id: &str,
        source: &SourceOptions,
    ) -> Result<Option<Box<dyn Dataset>>, EngineError> {
        let Some(path) = self.catalog.resolve_path(image_id, source).await else {
            return Ok(None);
        };

        let dataset = self.registry.resolve(&path).await?;
        Ok(Some(dataset))
    }

    async fn regenerate_thumbnail(
        &self,
        request: &ThumbnailRequest,
        key: &CacheKey,
    ) -> Result<Option<Bytes>, EngineError> {
        let Some(path) = self
            .catalog
            .resolve_path(&request.image_id, &request.source)
            .await
        else {
            return Ok(None);
        };

        let slide = match self.decoder.open(&path).await {
            Ok(slide) => slide,
            Err(DecodeError::NotFound { .. }) => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let pixels = self.decoder.thumbnail(&slide, request.edge_size).await?;
        let data = self.codec.encode(&pixels, request.format, request.quality)?;

        self.cache_put(key, data.clone()).await;
        Ok(Some(data))
    }

    async fn regenerate_tile(
        &self,
        request: &TileRequest,
        key: &CacheKey,
    ) -> Result<Option<Bytes>, EngineError> {
        let Some(path) = self
            .catalog
            .resolve_path(&request.image_id, &request.source)
            .await
        else {
            return Ok(None);
        };

        let slide = match self.decoder.open(&path).await {
            Ok(slide) => slide,
            Err(DecodeError::NotFound { .. }) => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let layout = TileLayout {
            tile_size: request.tile_size,
            overlap: self.config.overlap,
            limit_bounds: self.config.limit_bounds,
        };
        let view = self.decoder.tiled_view(slide, layout)?;
        let pixels = self
            .decoder
            .read_tile(&view, request.level, request.col, request.row)
            .await?;
        let data = self.codec.encode(&pixels, request.format, request.quality)?;

        self.cache_put(key, data.clone()).await;
        Ok(Some(data))
    }

    async fn cache_get(&self, key: &CacheKey) -> Option<Bytes> {
        match self.cache.get(key).await {
            Ok(hit) => hit,
            Err(err) => {
                warn!(key = %key, error = %err, "cache read failed, treating as miss");
                None
            }
        }
    }

    async fn cache_put(&self, key: &CacheKey, data: Bytes) {
        if let Err(err) = self.cache.put(key, data, self.config.cache_ttl).await {
            warn!(key = %key, error = %err, "cache write failed, serving uncached");
        }
    }
}

/// Mean of the two scanner calibration axes.
///
/// Missing or non-numeric entries mean "uncalibrated", reported as 0.0 and
/// never as an error.
fn mean_mpp(properties: &SlideProperties) -> f64 {
    let parse = |value: &Option<String>| {
        value
            .as_deref()
            .and_then(|raw| raw.trim().parse::<f64>().ok())
    };

    match (parse(&properties.mpp_x), parse(&properties.mpp_y)) {
        (Some(x), Some(y)) => (x + y) / 2.0,
        _ => 0.0,
    }
}
