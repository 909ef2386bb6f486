//! Deep Zoom descriptor and summary tests over real files.
//!
//! Tests verify:
//! - Descriptors measured from repository files and original uploads
//! - The MIME-type hint selecting among candidate uploads
//! - Summary aggregation (calibration, descriptor, bounds) and its
//!   never-fails-on-absence contract

use tempfile::TempDir;

use wsi_tiler::slide::SourceOptions;
use wsi_tiler::tile::DEEPZOOM_XMLNS;

use super::test_utils::{build_engine, write_slide};

// =============================================================================
// Descriptors
// =============================================================================

#[tokio::test]
async fn test_descriptor_measured_from_repository_file() {
    let dir = TempDir::new().unwrap();
    write_slide(&dir, "slide.png", 200, 120);
    let engine = build_engine(&dir);

    let descriptor = engine
        .descriptor(
            "https://host/deepzoom/get/slide.dzi",
            "slide.png",
            254,
            &SourceOptions::default(),
        )
        .await
        .unwrap()
        .unwrap();

    let value = serde_json::to_value(&descriptor).unwrap();
    let image = &value["Image"];
    assert_eq!(image["xmlns"], DEEPZOOM_XMLNS);
    assert_eq!(image["Url"], "https://host/deepzoom/get/slide.dzi");
    assert_eq!(image["Format"], "jpeg");
    assert_eq!(image["Overlap"], "0");
    assert_eq!(image["TileSize"], "254");
    assert_eq!(image["Size"]["Width"], "200");
    assert_eq!(image["Size"]["Height"], "120");
}

#[tokio::test]
async fn test_descriptor_renders_dzi_xml() {
    let dir = TempDir::new().unwrap();
    write_slide(&dir, "slide.png", 200, 120);
    let engine = build_engine(&dir);

    let descriptor = engine
        .descriptor("slide.dzi", "slide.png", 256, &SourceOptions::default())
        .await
        .unwrap()
        .unwrap();

    let xml = descriptor.to_dzi_xml();
    assert!(xml.contains("TileSize=\"256\""));
    assert!(xml.contains("<Size Width=\"200\" Height=\"120\" />"));
}

#[tokio::test]
async fn test_mimetype_hint_selects_the_upload() {
    let dir = TempDir::new().unwrap();
    write_slide(&dir, "sample.png", 30, 20);
    write_slide(&dir, "sample.jpeg", 60, 40);
    let engine = build_engine(&dir);

    let png = engine
        .descriptor(
            "sample.dzi",
            "sample",
            256,
            &SourceOptions::original(Some("image/png".into())),
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(png.image.size.width, "30");
    assert_eq!(png.image.size.height, "20");

    let jpeg = engine
        .descriptor(
            "sample.dzi",
            "sample",
            256,
            &SourceOptions::original(Some("image/jpeg".into())),
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(jpeg.image.size.width, "60");
    assert_eq!(jpeg.image.size.height, "40");
}

// =============================================================================
// Summaries
// =============================================================================

#[tokio::test]
async fn test_summary_members_from_real_file() {
    let dir = TempDir::new().unwrap();
    write_slide(&dir, "slide.png", 200, 120);
    let engine = build_engine(&dir);

    let summary = engine
        .image_summary("slide.dzi", "slide.png", 256, &SourceOptions::default())
        .await
        .unwrap();

    // Flat rasters carry no scanner calibration
    assert_eq!(summary.image_mpp, 0.0);

    let value = serde_json::to_value(&summary).unwrap();
    assert_eq!(value["tile_sources"]["Image"]["Size"]["Width"], "200");
    assert_eq!(value["slide_bounds"]["x"], 0);
    assert_eq!(value["slide_bounds"]["y"], 0);
    assert_eq!(value["slide_bounds"]["width"], 200);
    assert_eq!(value["slide_bounds"]["height"], 120);
}

#[tokio::test]
async fn test_summary_of_unknown_image_is_all_absent() {
    let dir = TempDir::new().unwrap();
    let engine = build_engine(&dir);

    let summary = engine
        .image_summary("ghost.dzi", "ghost", 256, &SourceOptions::default())
        .await
        .unwrap();

    assert_eq!(summary.image_mpp, 0.0);
    assert!(summary.tile_sources.is_none());
    assert!(summary.slide_bounds.is_none());
}
