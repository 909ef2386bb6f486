//! Batch deletion tests against real local artifacts.
//!
//! Tests verify:
//! - Local removal happens only after the catalog acknowledged the deletion
//! - Missing local artifacts warn but never abort the batch
//! - Identifier lists load from disk with blanks dropped

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tempfile::TempDir;

use wsi_tiler::deleter::{
    load_slide_list, CatalogApi, FileInfo, SlideDeleter, INDEX_FILE_MIMETYPE,
};
use wsi_tiler::error::ApiError;

// =============================================================================
// Static Catalog Mock
// =============================================================================

/// A catalog with a fixed record table and a fixed deletion answer.
struct StaticApi {
    records: HashMap<String, (PathBuf, PathBuf)>,
    acknowledge: bool,
}

impl StaticApi {
    fn new(acknowledge: bool) -> Self {
        Self {
            records: HashMap::new(),
            acknowledge,
        }
    }

    fn with_record(mut self, slide: &str, index: PathBuf, folder: PathBuf) -> Self {
        self.records.insert(slide.to_string(), (index, folder));
        self
    }
}

#[async_trait]
impl CatalogApi for StaticApi {
    async fn file_info(
        &self,
        file_name: &str,
        mimetype: &str,
    ) -> Result<Option<FileInfo>, ApiError> {
        let Some((index, folder)) = self.records.get(file_name) else {
            return Ok(None);
        };
        let file_path = if mimetype == INDEX_FILE_MIMETYPE {
            index.clone()
        } else {
            folder.clone()
        };
        Ok(Some(FileInfo { file_path }))
    }

    async fn delete_original(&self, _file_name: &str) -> Result<bool, ApiError> {
        Ok(self.acknowledge)
    }
}

/// Create an index file and a data folder for `slide` under `dir`.
fn make_artifacts(dir: &TempDir, slide: &str) -> (PathBuf, PathBuf) {
    let index = dir.path().join(format!("{slide}.mrxs"));
    std::fs::write(&index, b"index").unwrap();

    let folder = dir.path().join(slide);
    std::fs::create_dir(&folder).unwrap();
    std::fs::write(folder.join("Data0000.dat"), b"data").unwrap();

    (index, folder)
}

// =============================================================================
// Local Removal
// =============================================================================

#[tokio::test]
async fn test_acknowledged_deletion_removes_local_artifacts() {
    let dir = TempDir::new().unwrap();
    let (index, folder) = make_artifacts(&dir, "case-17");
    let api = StaticApi::new(true).with_record("case-17", index.clone(), folder.clone());

    let report = SlideDeleter::new(api)
        .run(&["case-17".to_string()], true)
        .await
        .unwrap();

    assert_eq!(report.processed, 1);
    assert_eq!(report.deleted, 1);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.warnings, 0);
    assert!(!index.exists());
    assert!(!folder.exists());
}

#[tokio::test]
async fn test_refused_deletion_keeps_local_artifacts() {
    let dir = TempDir::new().unwrap();
    let (index, folder) = make_artifacts(&dir, "case-17");
    let api = StaticApi::new(false).with_record("case-17", index.clone(), folder.clone());

    let report = SlideDeleter::new(api)
        .run(&["case-17".to_string()], true)
        .await
        .unwrap();

    assert_eq!(report.deleted, 0);
    assert!(index.exists());
    assert!(folder.exists());
}

#[tokio::test]
async fn test_missing_local_artifacts_warn_but_continue() {
    let dir = TempDir::new().unwrap();
    let index = dir.path().join("gone.mrxs");
    let folder = dir.path().join("gone");
    let api = StaticApi::new(true).with_record("gone-slide", index, folder);

    let report = SlideDeleter::new(api)
        .run(&["gone-slide".to_string()], true)
        .await
        .unwrap();

    // Remote deletion succeeded; both local removals warned
    assert_eq!(report.processed, 1);
    assert_eq!(report.deleted, 1);
    assert_eq!(report.warnings, 2);
}

// =============================================================================
// Identifier Lists
// =============================================================================

#[tokio::test]
async fn test_slide_list_loads_from_disk() {
    let dir = TempDir::new().unwrap();
    let list = dir.path().join("slides.txt");
    std::fs::write(&list, "case-1\n\n  case-2  \n\ncase-3\n").unwrap();

    let slides = load_slide_list(&list).await.unwrap();
    assert_eq!(slides, vec!["case-1", "case-2", "case-3"]);
}

#[tokio::test]
async fn test_missing_list_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let result = load_slide_list(&dir.path().join("absent.txt")).await;
    assert!(result.is_err());
}
