use std::sync::Arc;

use checklist_core::model::{Catalog, Locale};
use storage::repository::{CatalogSource, StorageError};
use tracing::{info, warn};

/// Loads the read-only catalog for a locale.
#[derive(Clone)]
pub struct CatalogService {
    source: Arc<dyn CatalogSource>,
}

impl CatalogService {
    #[must_use]
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self { source }
    }

    /// Load the catalog, surfacing failures.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when any catalog document is missing or malformed.
    pub async fn try_load(&self, locale: Locale) -> Result<Catalog, StorageError> {
        self.source.load_catalog(locale).await
    }

    /// Load the catalog, degrading to an empty one on failure.
    pub async fn load_or_empty(&self, locale: Locale) -> Catalog {
        match self.try_load(locale).await {
            Ok(catalog) => {
                info!(locale = %locale, tests = catalog.test_count(), "catalog ready");
                catalog
            }
            Err(err) => {
                warn!(locale = %locale, error = %err, "catalog load failed, continuing with empty catalog");
                Catalog::empty()
            }
        }
    }
}
