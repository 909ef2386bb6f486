//! Batch deletion of slides from the remote catalog and, optionally, disk.
//!
//! A slide lives in three places: as a catalog record, as an index file on
//! disk, and as a data folder next to it. The deleter walks a list of
//! identifiers and removes all three, in that order of authority: local
//! artifacts are only touched after the catalog acknowledged the remote
//! deletion.
//!
//! The batch never aborts over one bad identifier. A missing catalog record
//! logs a warning and skips that identifier; filesystem failures log a
//! warning and move on. Only transport-level failures (the catalog is
//! unreachable) end the run early.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

use crate::error::ApiError;

/// Catalog MIME type of a slide's index file.
pub const INDEX_FILE_MIMETYPE: &str = "mirax/index";

/// Catalog MIME type of a slide's data folder.
pub const DATA_FOLDER_MIMETYPE: &str = "mirax/datafolder";

// =============================================================================
// CatalogApi
// =============================================================================

/// Catalog record locating one stored file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileInfo {
    pub file_path: PathBuf,
}

/// Remote catalog operations the deleter drives.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Where the catalog stores `file_name` for the given MIME type.
    /// `Ok(None)` when the catalog has no usable record.
    async fn file_info(
        &self,
        file_name: &str,
        mimetype: &str,
    ) -> Result<Option<FileInfo>, ApiError>;

    /// Ask the catalog to delete the original file object. Returns whether
    /// the catalog acknowledged the deletion.
    async fn delete_original(&self, file_name: &str) -> Result<bool, ApiError>;
}

// =============================================================================
// HttpCatalogApi
// =============================================================================

/// HTTP client for the catalog's file-info and deletion endpoints.
#[derive(Debug)]
pub struct HttpCatalogApi {
    client: reqwest::Client,
    info_url: Url,
    delete_url: Url,
}

impl HttpCatalogApi {
    /// Build a client for the catalog at `base_url`.
    ///
    /// The base must end with a trailing slash for relative joins to land
    /// under it; one is appended when missing.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base = Url::parse(&normalized).map_err(|err| ApiError::Url(err.to_string()))?;
        let info_url = base
            .join("file/info/")
            .map_err(|err| ApiError::Url(err.to_string()))?;
        let delete_url = base
            .join("mirax/delete_files/")
            .map_err(|err| ApiError::Url(err.to_string()))?;

        Ok(Self {
            client: reqwest::Client::new(),
            info_url,
            delete_url,
        })
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogApi {
    async fn file_info(
        &self,
        file_name: &str,
        mimetype: &str,
    ) -> Result<Option<FileInfo>, ApiError> {
        let url = self
            .info_url
            .join(&format!("{file_name}/"))
            .map_err(|err| ApiError::Url(err.to_string()))?;

        let response = self
            .client
            .get(url)
            .query(&[("mimetype", mimetype)])
            .send()
            .await
            .map_err(|err| ApiError::Request(err.to_string()))?;

        if !response.status().is_success() {
            return Ok(None);
        }

        // A success with an unusable body counts as "no record" as well.
        match response.json::<FileInfo>().await {
            Ok(info) => Ok(Some(info)),
            Err(_) => Ok(None),
        }
    }

    async fn delete_original(&self, file_name: &str) -> Result<bool, ApiError> {
        let url = self
            .delete_url
            .join(&format!("{file_name}/"))
            .map_err(|err| ApiError::Url(err.to_string()))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| ApiError::Request(err.to_string()))?;

        if response.status().is_success() {
            Ok(true)
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!(status, body = %body, "catalog refused deletion");
            Ok(false)
        }
    }
}

// =============================================================================
// SlideDeleter
// =============================================================================

/// Outcome of one deletion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionReport {
    /// Identifiers taken from the list
    pub processed: usize,

    /// Remote deletions acknowledged by the catalog
    pub deleted: usize,

    /// Identifiers skipped for missing catalog records
    pub skipped: usize,

    /// Warnings emitted along the way
    pub warnings: usize,
}

/// Batch deleter driving a [`CatalogApi`].
pub struct SlideDeleter<A: CatalogApi> {
    api: A,
}

impl<A: CatalogApi> SlideDeleter<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Delete every identifier in `slides`.
    ///
    /// With `delete_files` set, each identifier's index file and data folder
    /// are located up front; an identifier the catalog cannot locate is
    /// warned about and skipped entirely, remote deletion included. Local
    /// artifacts are removed only after the catalog acknowledged the remote
    /// deletion.
    pub async fn run(
        &self,
        slides: &[String],
        delete_files: bool,
    ) -> Result<DeletionReport, ApiError> {
        info!(count = slides.len(), "starting deletion job");
        let mut report = DeletionReport::default();

        for slide in slides {
            report.processed += 1;

            let local_paths = if delete_files {
                let index = self.api.file_info(slide, INDEX_FILE_MIMETYPE).await?;
                let folder = self.api.file_info(slide, DATA_FOLDER_MIMETYPE).await?;
                match (index, folder) {
                    (Some(index), Some(folder)) => Some((index.file_path, folder.file_path)),
                    _ => {
                        warn!(slide = %slide, "no file with this name on the server, skipping");
                        report.skipped += 1;
                        report.warnings += 1;
                        continue;
                    }
                }
            } else {
                None
            };

            let deleted = self.api.delete_original(slide).await?;
            if deleted {
                report.deleted += 1;
            }

            if let Some((index_path, folder_path)) = local_paths {
                if deleted {
                    self.remove_local(&index_path, false, &mut report).await;
                    self.remove_local(&folder_path, true, &mut report).await;
                }
            }
        }

        info!(
            processed = report.processed,
            deleted = report.deleted,
            skipped = report.skipped,
            warnings = report.warnings,
            "deletion job completed"
        );
        Ok(report)
    }

    async fn remove_local(&self, path: &Path, is_folder: bool, report: &mut DeletionReport) {
        info!(path = %path.display(), "deleting from disk");
        let result = if is_folder {
            tokio::fs::remove_dir_all(path).await
        } else {
            tokio::fs::remove_file(path).await
        };

        if let Err(err) = result {
            warn!(path = %path.display(), error = %err, "could not remove from disk");
            report.warnings += 1;
        }
    }
}

/// Parse a newline-delimited identifier list, dropping blank lines.
pub fn parse_slide_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Read and parse an identifier list file.
pub async fn load_slide_list(path: &Path) -> Result<Vec<String>, std::io::Error> {
    let contents = tokio::fs::read_to_string(path).await?;
    Ok(parse_slide_list(&contents))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// In-memory catalog double recording every call.
    struct MockApi {
        records: HashMap<String, (PathBuf, PathBuf)>,
        refused: Vec<String>,
        info_calls: Mutex<usize>,
        delete_calls: Mutex<Vec<String>>,
    }

    impl MockApi {
        fn new() -> Self {
            Self {
                records: HashMap::new(),
                refused: Vec::new(),
                info_calls: Mutex::new(0),
                delete_calls: Mutex::new(Vec::new()),
            }
        }

        fn with_record(mut self, slide: &str, index: &str, folder: &str) -> Self {
            self.records.insert(
                slide.to_string(),
                (PathBuf::from(index), PathBuf::from(folder)),
            );
            self
        }

        fn refusing(mut self, slide: &str) -> Self {
            self.refused.push(slide.to_string());
            self
        }
    }

    #[async_trait]
    impl CatalogApi for MockApi {
        async fn file_info(
            &self,
            file_name: &str,
            mimetype: &str,
        ) -> Result<Option<FileInfo>, ApiError> {
            *self.info_calls.lock().unwrap() += 1;
            Ok(self.records.get(file_name).map(|(index, folder)| {
                let file_path = match mimetype {
                    INDEX_FILE_MIMETYPE => index.clone(),
                    _ => folder.clone(),
                };
                FileInfo { file_path }
            }))
        }

        async fn delete_original(&self, file_name: &str) -> Result<bool, ApiError> {
            self.delete_calls
                .lock()
                .unwrap()
                .push(file_name.to_string());
            Ok(!self.refused.contains(&file_name.to_string()))
        }
    }

    fn slides(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    /// Lay out an index file and data folder for one slide.
    fn make_artifacts(dir: &tempfile::TempDir, slide: &str) -> (PathBuf, PathBuf) {
        let index = dir.path().join(format!("{slide}.mrxs"));
        let folder = dir.path().join(slide);
        std::fs::write(&index, b"index").unwrap();
        std::fs::create_dir(&folder).unwrap();
        std::fs::write(folder.join("Data0000.dat"), b"pixels").unwrap();
        (index, folder)
    }

    #[tokio::test]
    async fn test_missing_record_warns_once_and_skips() {
        let dir = tempfile::TempDir::new().unwrap();
        let (index_a, folder_a) = make_artifacts(&dir, "a");
        let (index_c, folder_c) = make_artifacts(&dir, "c");
        let api = MockApi::new()
            .with_record("a", index_a.to_str().unwrap(), folder_a.to_str().unwrap())
            .with_record("c", index_c.to_str().unwrap(), folder_c.to_str().unwrap());
        let deleter = SlideDeleter::new(api);

        let report = deleter
            .run(&slides(&["a", "b", "c"]), true)
            .await
            .unwrap();

        assert_eq!(report.processed, 3);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.deleted, 2);
        // Exactly the one warning for the unknown id.
        assert_eq!(report.warnings, 1);

        // The skipped id never reached the remote delete endpoint.
        let deletes = deleter.api.delete_calls.lock().unwrap().clone();
        assert_eq!(deletes, vec!["a".to_string(), "c".to_string()]);

        // Acknowledged slides lost their local artifacts.
        assert!(!index_a.exists());
        assert!(!folder_a.exists());
        assert!(!index_c.exists());
        assert!(!folder_c.exists());
    }

    #[tokio::test]
    async fn test_remote_only_run_never_asks_for_paths() {
        let api = MockApi::new();
        let deleter = SlideDeleter::new(api);

        let report = deleter
            .run(&slides(&["a", "b", "c"]), false)
            .await
            .unwrap();

        assert_eq!(report.processed, 3);
        assert_eq!(report.deleted, 3);
        assert_eq!(report.skipped, 0);
        assert_eq!(*deleter.api.info_calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_refused_deletion_is_counted_but_does_not_abort() {
        let api = MockApi::new().refusing("b");
        let deleter = SlideDeleter::new(api);

        let report = deleter
            .run(&slides(&["a", "b", "c"]), false)
            .await
            .unwrap();

        assert_eq!(report.processed, 3);
        assert_eq!(report.deleted, 2);
    }

    #[test]
    fn test_slide_list_parsing_drops_blanks() {
        let contents = "slide-1\n\n  slide-2  \n\t\nslide-3";
        assert_eq!(
            parse_slide_list(contents),
            vec!["slide-1", "slide-2", "slide-3"]
        );
    }

    #[test]
    fn test_base_url_gains_a_trailing_slash() {
        let api = HttpCatalogApi::new("https://catalog.example/ome").unwrap();
        assert_eq!(
            api.info_url.as_str(),
            "https://catalog.example/ome/file/info/"
        );
        assert_eq!(
            api.delete_url.as_str(),
            "https://catalog.example/ome/mirax/delete_files/"
        );
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let err = HttpCatalogApi::new("not a url").unwrap_err();
        assert!(matches!(err, ApiError::Url(_)));
    }
}
