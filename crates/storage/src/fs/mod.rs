//! File-backed adapters: progress documents as JSON files on disk and the
//! per-locale catalog bundle.

mod catalog;
mod documents;

pub use catalog::{
    CATEGORY_DESCRIPTIONS_FILE, CHECKLIST_FILE, CLASSIFICATION_FILE, FsCatalogSource,
    TEST_INFO_FILE,
};
pub use documents::FsDocumentStore;
