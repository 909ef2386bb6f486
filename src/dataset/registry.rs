use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::dataset::{Dataset, DatasetFactory, RasterDatasetFactory};
use crate::error::DatasetError;

// =============================================================================
// DatasetRegistry
// =============================================================================

/// Maps file suffixes to dataset factories.
///
/// Built once at startup and shared read-only afterwards. Lookup is by the
/// lowercased final extension; a path with no extension looks up the empty
/// suffix.
pub struct DatasetRegistry {
    factories: HashMap<String, Arc<dyn DatasetFactory>>,
    default: Option<Arc<dyn DatasetFactory>>,
}

impl DatasetRegistry {
    pub fn builder() -> DatasetRegistryBuilder {
        DatasetRegistryBuilder::default()
    }

    /// Registry preloaded with the built-in formats.
    ///
    /// The raster factory covers the common flat formats and doubles as the
    /// fallback for anything unclaimed.
    pub fn with_default_formats() -> Self {
        let raster: Arc<dyn DatasetFactory> = Arc::new(RasterDatasetFactory::new());
        Self::builder()
            .register(Arc::clone(&raster))
            .default_factory(raster)
            .build()
    }

    /// Open the dataset at `path`, picking the factory by file suffix.
    ///
    /// A suffix nobody registered falls back silently to the default
    /// factory. [`DatasetError::NoDefaultFactory`] fires only when the
    /// registry was built without a fallback, which is a deployment fault
    /// rather than a per-request one. A stricter registry would reject
    /// unknown suffixes instead of guessing; the fallback is long-standing
    /// behavior that callers rely on for extensionless exports.
    pub async fn resolve(&self, path: &Path) -> Result<Box<dyn Dataset>, DatasetError> {
        let suffix = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        let factory = match self.factories.get(suffix.as_str()) {
            Some(factory) => factory,
            None => {
                debug!(suffix = %suffix, "no dataset factory for suffix, trying default");
                self.default
                    .as_ref()
                    .ok_or(DatasetError::NoDefaultFactory { suffix })?
            }
        };

        factory.open(path).await
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Registered suffixes, sorted, for startup logging.
    pub fn registered_suffixes(&self) -> Vec<&str> {
        let mut suffixes: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        suffixes.sort_unstable();
        suffixes
    }
}

// =============================================================================
// DatasetRegistryBuilder
// =============================================================================

#[derive(Default)]
pub struct DatasetRegistryBuilder {
    factories: HashMap<String, Arc<dyn DatasetFactory>>,
    default: Option<Arc<dyn DatasetFactory>>,
}

impl DatasetRegistryBuilder {
    /// Register `factory` under every suffix it declares.
    ///
    /// Later registrations win on suffix collisions.
    pub fn register(mut self, factory: Arc<dyn DatasetFactory>) -> Self {
        for suffix in factory.suffixes() {
            self.factories
                .insert(suffix.to_ascii_lowercase(), Arc::clone(&factory));
        }
        self
    }

    /// Designate the fallback used when no suffix matches.
    pub fn default_factory(mut self, factory: Arc<dyn DatasetFactory>) -> Self {
        self.default = Some(factory);
        self
    }

    pub fn build(self) -> DatasetRegistry {
        DatasetRegistry {
            factories: self.factories,
            default: self.default,
        }
    }
}
