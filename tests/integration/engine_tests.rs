//! End-to-end engine tests over real collaborators.
//!
//! Tests verify:
//! - Tile round trips produce valid encoded streams and byte-identical hits
//! - Thumbnails respect the bounding box
//! - Cache entries expire after their TTL
//! - Quality variants are cached independently
//! - Unknown images are absent, bad addresses are errors
//! - Datasets resolve through the suffix registry

use std::time::Duration;

use tempfile::TempDir;

use wsi_tiler::config::EngineConfig;
use wsi_tiler::error::{DecodeError, EngineError};
use wsi_tiler::slide::SourceOptions;
use wsi_tiler::tile::{ImageFormat, ThumbnailRequest, TileRequest};

use super::test_utils::{
    build_engine, build_engine_with_config, is_valid_jpeg, is_valid_png, write_slide,
};

// =============================================================================
// Tile Round Trips
// =============================================================================

#[tokio::test]
async fn test_tile_round_trip_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    write_slide(&dir, "slide.png", 200, 120);
    let engine = build_engine(&dir);

    // 200x120 tops out at level 8; a 64px grid there is 4x2
    let request = TileRequest::new("slide.png", 8, 1, 1, 64, ImageFormat::Jpeg);

    let first = engine.tile(request.clone()).await.unwrap().unwrap();
    assert!(!first.cache_hit);
    assert!(is_valid_jpeg(&first.data));

    let second = engine.tile(request).await.unwrap().unwrap();
    assert!(second.cache_hit);
    assert_eq!(first.data, second.data);
}

#[tokio::test]
async fn test_png_tile_decodes_to_requested_extent() {
    let dir = TempDir::new().unwrap();
    write_slide(&dir, "slide.png", 200, 120);
    let engine = build_engine(&dir);

    let request = TileRequest::new("slide.png", 8, 0, 0, 64, ImageFormat::Png);
    let tile = engine.tile(request).await.unwrap().unwrap();
    assert!(is_valid_png(&tile.data));

    let decoded = image::load_from_memory(&tile.data).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (64, 64));

    // The last column shrinks to the remainder: 200 - 3*64 = 8
    let request = TileRequest::new("slide.png", 8, 3, 0, 64, ImageFormat::Png);
    let tile = engine.tile(request).await.unwrap().unwrap();
    let decoded = image::load_from_memory(&tile.data).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (8, 64));
}

#[tokio::test]
async fn test_unknown_image_is_absent() {
    let dir = TempDir::new().unwrap();
    let engine = build_engine(&dir);

    let request = TileRequest::new("ghost.png", 0, 0, 0, 64, ImageFormat::Jpeg);
    assert!(engine.tile(request).await.unwrap().is_none());

    let request = ThumbnailRequest::new("ghost.png", 50, ImageFormat::Jpeg);
    assert!(engine.thumbnail(request).await.unwrap().is_none());
}

#[tokio::test]
async fn test_bad_tile_address_is_an_error() {
    let dir = TempDir::new().unwrap();
    write_slide(&dir, "slide.png", 200, 120);
    let engine = build_engine(&dir);

    let request = TileRequest::new("slide.png", 99, 0, 0, 64, ImageFormat::Jpeg);
    let result = engine.tile(request).await;
    assert!(matches!(
        result,
        Err(EngineError::Decode(DecodeError::InvalidLevel { .. }))
    ));

    let request = TileRequest::new("slide.png", 8, 40, 0, 64, ImageFormat::Jpeg);
    let result = engine.tile(request).await;
    assert!(matches!(
        result,
        Err(EngineError::Decode(DecodeError::TileOutOfBounds { .. }))
    ));
}

// =============================================================================
// Thumbnails
// =============================================================================

#[tokio::test]
async fn test_thumbnail_fits_bounding_box() {
    let dir = TempDir::new().unwrap();
    write_slide(&dir, "slide.png", 200, 120);
    let engine = build_engine(&dir);

    let request = ThumbnailRequest::new("slide.png", 50, ImageFormat::Png);
    let thumb = engine.thumbnail(request.clone()).await.unwrap().unwrap();
    assert!(!thumb.cache_hit);

    // Aspect ratio preserved inside a 50px box: 200x120 scales to 50x30
    let decoded = image::load_from_memory(&thumb.data).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (50, 30));

    let again = engine.thumbnail(request).await.unwrap().unwrap();
    assert!(again.cache_hit);
    assert_eq!(thumb.data, again.data);
}

// =============================================================================
// Cache Behavior
// =============================================================================

#[tokio::test]
async fn test_cache_entries_expire_after_ttl() {
    let dir = TempDir::new().unwrap();
    write_slide(&dir, "slide.png", 200, 120);
    let config = EngineConfig {
        cache_ttl: Duration::from_millis(50),
        ..EngineConfig::default()
    };
    let engine = build_engine_with_config(&dir, config);

    let request = TileRequest::new("slide.png", 8, 0, 0, 64, ImageFormat::Jpeg);
    let first = engine.tile(request.clone()).await.unwrap().unwrap();
    assert!(!first.cache_hit);

    let warm = engine.tile(request.clone()).await.unwrap().unwrap();
    assert!(warm.cache_hit);

    tokio::time::sleep(Duration::from_millis(120)).await;

    let expired = engine.tile(request).await.unwrap().unwrap();
    assert!(!expired.cache_hit);
    assert_eq!(first.data, expired.data);
}

#[tokio::test]
async fn test_quality_variants_are_cached_independently() {
    let dir = TempDir::new().unwrap();
    write_slide(&dir, "slide.png", 200, 120);
    let engine = build_engine(&dir);

    let low = TileRequest::new("slide.png", 8, 0, 0, 64, ImageFormat::Jpeg).with_quality(30);
    let high = TileRequest::new("slide.png", 8, 0, 0, 64, ImageFormat::Jpeg).with_quality(90);

    let low_tile = engine.tile(low.clone()).await.unwrap().unwrap();
    let high_tile = engine.tile(high).await.unwrap().unwrap();
    assert!(!low_tile.cache_hit);
    assert!(!high_tile.cache_hit);
    assert_ne!(low_tile.data, high_tile.data);

    // The low-quality entry survived the high-quality miss
    let low_again = engine.tile(low).await.unwrap().unwrap();
    assert!(low_again.cache_hit);
    assert_eq!(low_tile.data, low_again.data);
}

// =============================================================================
// Dataset Resolution
// =============================================================================

#[tokio::test]
async fn test_dataset_resolves_through_registry() {
    let dir = TempDir::new().unwrap();
    write_slide(&dir, "slide.png", 200, 120);
    let engine = build_engine(&dir);

    let dataset = engine
        .open_dataset("slide.png", &SourceOptions::default())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(dataset.shape(), (120, 200));
    assert_eq!(dataset.sampling_level(), 8);
    assert_eq!(dataset.tile_size(), 256);
    assert!(dataset.slide_path().ends_with("slide.png"));

    let zoom = dataset.zoom_factor().unwrap();
    assert_eq!(zoom, 256.0);
    assert_eq!(zoom.log2().fract(), 0.0);
}

#[tokio::test]
async fn test_dataset_of_unknown_image_is_absent() {
    let dir = TempDir::new().unwrap();
    let engine = build_engine(&dir);

    let dataset = engine
        .open_dataset("ghost.png", &SourceOptions::default())
        .await
        .unwrap();
    assert!(dataset.is_none());
}
