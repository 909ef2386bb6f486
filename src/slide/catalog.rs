//! Image catalog contract.
//!
//! The catalog stands in for the metadata/object store of the hosting
//! system: it resolves opaque image identifiers to source paths and knows
//! the recorded dimensions of the highest-resolution entry. Absence is the
//! one interesting answer here. An unknown id yields `None`, which the
//! engine propagates as an absent result instead of an error.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::geometry::Resolution;

/// Options selecting which source file backs a logical image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceOptions {
    /// Address the originally uploaded file rather than the repository copy
    pub original_file: bool,

    /// MIME-type hint picking among multiple source files for one image
    pub mimetype: Option<String>,
}

impl SourceOptions {
    /// Options addressing the original upload, optionally narrowed by MIME type.
    pub fn original(mimetype: Option<String>) -> Self {
        Self {
            original_file: true,
            mimetype,
        }
    }
}

/// Resolves image identifiers to paths and recorded dimensions.
#[async_trait]
pub trait ImageCatalog: Send + Sync {
    /// Resolve an image id to its source path. `None` when the id is unknown.
    async fn resolve_path(&self, image_id: &str, opts: &SourceOptions) -> Option<PathBuf>;

    /// Native resolution of the highest-resolution entry for this image,
    /// when the catalog has it on record.
    async fn dimensions(&self, image_id: &str) -> Option<Resolution>;
}

/// Catalog serving a flat directory of image files.
///
/// The identifier is the file name. An id without a matching file is looked
/// up by stem, with the MIME-type hint narrowing the candidates; ties break
/// by name for determinism. Repository copy and original upload are the
/// same file here, so `original_file` does not change resolution.
pub struct DirectoryCatalog {
    root: PathBuf,
}

impl DirectoryCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn extensions_for(mimetype: &str) -> Option<&'static [&'static str]> {
        match mimetype {
            "image/png" => Some(&["png"]),
            "image/jpeg" => Some(&["jpg", "jpeg"]),
            "image/bmp" => Some(&["bmp"]),
            "image/tiff" => Some(&["tif", "tiff"]),
            _ => None,
        }
    }
}

#[async_trait]
impl ImageCatalog for DirectoryCatalog {
    async fn resolve_path(&self, image_id: &str, opts: &SourceOptions) -> Option<PathBuf> {
        // Exact file name first
        let direct = self.root.join(image_id);
        if tokio::fs::metadata(&direct)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
        {
            return Some(direct);
        }

        // Stem lookup, narrowed by the MIME hint when one is given
        let allowed = opts.mimetype.as_deref().and_then(Self::extensions_for);

        let mut entries = tokio::fs::read_dir(&self.root).await.ok()?;
        let mut candidates = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if !entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false)
            {
                continue;
            }
            let stem_matches = path
                .file_stem()
                .map(|s| s.to_string_lossy() == image_id)
                .unwrap_or(false);
            if !stem_matches {
                continue;
            }
            if let Some(allowed) = allowed {
                let ext = path
                    .extension()
                    .map(|e| e.to_string_lossy().to_ascii_lowercase());
                if !ext.map(|e| allowed.contains(&e.as_str())).unwrap_or(false) {
                    continue;
                }
            }
            candidates.push(path);
        }

        candidates.sort();
        candidates.into_iter().next()
    }

    async fn dimensions(&self, image_id: &str) -> Option<Resolution> {
        let path = self
            .resolve_path(image_id, &SourceOptions::default())
            .await?;
        let bytes = tokio::fs::read(&path).await.ok()?;

        let reader = image::ImageReader::new(std::io::Cursor::new(bytes))
            .with_guessed_format()
            .ok()?;
        let (width, height) = reader.into_dimensions().ok()?;
        Some(Resolution::new(width, height))
    }
}
