use std::path::{Path, PathBuf};

use async_trait::async_trait;
use checklist_core::model::{Catalog, CatalogSources, Locale};
use tracing::debug;

use crate::repository::{CatalogSource, StorageError};

pub const CHECKLIST_FILE: &str = "checklist.json";
pub const CATEGORY_DESCRIPTIONS_FILE: &str = "category_descriptions.json";
pub const TEST_INFO_FILE: &str = "checklist_info_data.json";
pub const CLASSIFICATION_FILE: &str = "owasp_top_10.json";

/// Reads `<root>/<locale>/{checklist,category_descriptions,...}.json`.
#[derive(Clone, Debug)]
pub struct FsCatalogSource {
    root: PathBuf,
}

impl FsCatalogSource {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn locale_dir(&self, locale: Locale) -> PathBuf {
        self.root.join(locale.code())
    }
}

async fn read_text(dir: &Path, file: &str) -> Result<String, StorageError> {
    Ok(tokio::fs::read_to_string(dir.join(file)).await?)
}

#[async_trait]
impl CatalogSource for FsCatalogSource {
    async fn load_catalog(&self, locale: Locale) -> Result<Catalog, StorageError> {
        let dir = self.locale_dir(locale);
        let (checklist, category_descriptions, test_info, classification) = tokio::try_join!(
            read_text(&dir, CHECKLIST_FILE),
            read_text(&dir, CATEGORY_DESCRIPTIONS_FILE),
            read_text(&dir, TEST_INFO_FILE),
            read_text(&dir, CLASSIFICATION_FILE),
        )?;

        let catalog = Catalog::from_sources(CatalogSources {
            checklist: &checklist,
            category_descriptions: &category_descriptions,
            test_info: &test_info,
            classification: &classification,
        })?;
        debug!(
            locale = %locale,
            categories = catalog.categories().len(),
            tests = catalog.test_count(),
            "catalog loaded"
        );
        Ok(catalog)
    }
}
