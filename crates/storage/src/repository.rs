use async_trait::async_trait;
use checklist_core::Clock;
use checklist_core::model::{
    AppSettings, Catalog, CatalogError, DocumentError, Locale, ProgressDocument,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("document is corrupt: {0}")]
    Corrupt(String),

    #[error("i/o error: {0}")]
    Io(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl From<DocumentError> for StorageError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::Corrupt(message) => Self::Corrupt(message),
            other => Self::Serialization(other.to_string()),
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound
        } else {
            Self::Io(err.to_string())
        }
    }
}

//
// ─── HANDLES ───────────────────────────────────────────────────────────────────
//

/// Opaque reference to a stored progress document (a path for file storage).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentHandle(String);

impl DocumentHandle {
    #[must_use]
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-readable label: the last path segment.
    #[must_use]
    pub fn label(&self) -> &str {
        self.0
            .rsplit(['/', '\\'])
            .find(|segment| !segment.is_empty())
            .unwrap_or(&self.0)
    }
}

impl fmt::Debug for DocumentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentHandle({})", self.0)
    }
}

impl fmt::Display for DocumentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Listing entry for the saved-session browser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentSummary {
    pub handle: DocumentHandle,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

//
// ─── CONTRACTS ─────────────────────────────────────────────────────────────────
//

/// Where progress documents live.
#[async_trait]
pub trait DocumentGateway: Send + Sync {
    /// Best-effort lookup of the document used last; `None` is not an error.
    async fn locate_last_document(&self) -> Option<DocumentHandle>;

    /// Raw document bytes.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or `StorageError::Io`.
    async fn retrieve(&self, handle: &DocumentHandle) -> Result<Vec<u8>, StorageError>;

    /// Retrieve and parse a document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound`, `StorageError::Corrupt` or other storage errors.
    async fn read_document(&self, handle: &DocumentHandle) -> Result<ProgressDocument, StorageError> {
        let bytes = self.retrieve(handle).await?;
        Ok(ProgressDocument::from_slice(&bytes)?)
    }

    /// Persist a document, returning the canonical handle actually written.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the document cannot be stored.
    async fn write_document(
        &self,
        handle: &DocumentHandle,
        doc: &ProgressDocument,
    ) -> Result<DocumentHandle, StorageError>;

    /// Record `handle` as the last used document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the pointer cannot be stored.
    async fn remember_document(&self, handle: &DocumentHandle) -> Result<(), StorageError>;

    /// Every stored document with enough metadata to sort by recency.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the listing fails.
    async fn list_documents(&self) -> Result<Vec<DocumentSummary>, StorageError>;
}

/// Persisted app preferences (single row).
#[async_trait]
pub trait AppSettingsRepository: Send + Sync {
    /// Load settings, `None` when nothing was stored yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read or decode failures.
    async fn get_settings(&self) -> Result<Option<AppSettings>, StorageError>;

    /// Upsert settings.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the settings cannot be stored.
    async fn save_settings(&self, settings: &AppSettings) -> Result<(), StorageError>;
}

/// Read-only supplier of the per-locale catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Load the catalog and its auxiliary documents for `locale`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if any document is missing or malformed.
    async fn load_catalog(&self, locale: Locale) -> Result<Catalog, StorageError>;
}

//
// ─── IN MEMORY ─────────────────────────────────────────────────────────────────
//

#[derive(Clone, Debug)]
struct StoredDocument {
    bytes: Vec<u8>,
    modified: DateTime<Utc>,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    documents: Arc<Mutex<HashMap<DocumentHandle, StoredDocument>>>,
    settings: Arc<Mutex<Option<AppSettings>>>,
    catalogs: Arc<Mutex<HashMap<Locale, Catalog>>>,
    clock: Clock,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Store raw bytes under `handle`, bypassing serialization.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the store lock is poisoned.
    pub fn insert_raw(
        &self,
        handle: &DocumentHandle,
        bytes: impl Into<Vec<u8>>,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .documents
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(
            handle.clone(),
            StoredDocument {
                bytes: bytes.into(),
                modified: self.clock.now(),
            },
        );
        Ok(())
    }

    /// Register the catalog served for `locale`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the store lock is poisoned.
    pub fn insert_catalog(&self, locale: Locale, catalog: Catalog) -> Result<(), StorageError> {
        let mut guard = self
            .catalogs
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(locale, catalog);
        Ok(())
    }

    /// Whether a document exists under `handle`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the store lock is poisoned.
    pub fn contains(&self, handle: &DocumentHandle) -> Result<bool, StorageError> {
        let guard = self
            .documents
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.contains_key(handle))
    }
}

#[async_trait]
impl DocumentGateway for InMemoryRepository {
    async fn locate_last_document(&self) -> Option<DocumentHandle> {
        let guard = self.settings.lock().ok()?;
        guard
            .as_ref()
            .and_then(AppSettings::last_document)
            .map(DocumentHandle::new)
    }

    async fn retrieve(&self, handle: &DocumentHandle) -> Result<Vec<u8>, StorageError> {
        let guard = self
            .documents
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .get(handle)
            .map(|stored| stored.bytes.clone())
            .ok_or(StorageError::NotFound)
    }

    async fn write_document(
        &self,
        handle: &DocumentHandle,
        doc: &ProgressDocument,
    ) -> Result<DocumentHandle, StorageError> {
        let text = doc.to_json_pretty()?;
        self.insert_raw(handle, text)?;
        Ok(handle.clone())
    }

    async fn remember_document(&self, handle: &DocumentHandle) -> Result<(), StorageError> {
        let mut guard = self
            .settings
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let current = guard.take().unwrap_or_default();
        *guard = Some(current.with_last_document(handle.as_str()));
        Ok(())
    }

    async fn list_documents(&self) -> Result<Vec<DocumentSummary>, StorageError> {
        let guard = self
            .documents
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .iter()
            .map(|(handle, stored)| DocumentSummary {
                handle: handle.clone(),
                size: stored.bytes.len() as u64,
                last_modified: stored.modified,
            })
            .collect())
    }
}

#[async_trait]
impl AppSettingsRepository for InMemoryRepository {
    async fn get_settings(&self) -> Result<Option<AppSettings>, StorageError> {
        let guard = self
            .settings
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save_settings(&self, settings: &AppSettings) -> Result<(), StorageError> {
        let mut guard = self
            .settings
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(settings.clone());
        Ok(())
    }
}

#[async_trait]
impl CatalogSource for InMemoryRepository {
    async fn load_catalog(&self, locale: Locale) -> Result<Catalog, StorageError> {
        let guard = self
            .catalogs
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(&locale).cloned().ok_or(StorageError::NotFound)
    }
}

/// Aggregates the storage contracts behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub documents: Arc<dyn DocumentGateway>,
    pub settings: Arc<dyn AppSettingsRepository>,
    pub catalog: Arc<dyn CatalogSource>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repository(InMemoryRepository::new())
    }

    /// Share one in-memory repository across every contract, keeping the
    /// caller's clone for seeding and inspection.
    #[must_use]
    pub fn from_repository(repo: InMemoryRepository) -> Self {
        let documents: Arc<dyn DocumentGateway> = Arc::new(repo.clone());
        let settings: Arc<dyn AppSettingsRepository> = Arc::new(repo.clone());
        let catalog: Arc<dyn CatalogSource> = Arc::new(repo);
        Self {
            documents,
            settings,
            catalog,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checklist_core::model::{TestId, TestStatus};
    use checklist_core::time::fixed_clock;
    use std::collections::BTreeMap;

    #[test]
    fn handle_label_is_last_segment() {
        assert_eq!(DocumentHandle::new("/home/me/saves/a.json").label(), "a.json");
        assert_eq!(DocumentHandle::new(r"C:\saves\b.json").label(), "b.json");
        assert_eq!(DocumentHandle::new("plain.json").label(), "plain.json");
        assert_eq!(DocumentHandle::new("dir/").label(), "dir");
    }

    #[tokio::test]
    async fn round_trips_document_and_tracks_last_handle() {
        let repo = InMemoryRepository::new().with_clock(fixed_clock());
        let handle = DocumentHandle::new("progress.json");
        let mut status = BTreeMap::new();
        status.insert(TestId::new("WSTG-INFO-01"), TestStatus::Done);
        let doc = ProgressDocument::new(status, BTreeMap::new());

        assert!(repo.locate_last_document().await.is_none());
        let written = repo.write_document(&handle, &doc).await.unwrap();
        repo.remember_document(&written).await.unwrap();

        assert_eq!(repo.read_document(&handle).await.unwrap(), doc);
        assert_eq!(repo.locate_last_document().await, Some(handle));
        let listed = repo.list_documents().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].size > 0);
    }

    #[tokio::test]
    async fn read_reports_missing_and_corrupt_documents() {
        let repo = InMemoryRepository::new();
        let handle = DocumentHandle::new("broken.json");

        assert!(matches!(
            repo.read_document(&handle).await,
            Err(StorageError::NotFound)
        ));

        repo.insert_raw(&handle, "{{{").unwrap();
        assert!(matches!(
            repo.read_document(&handle).await,
            Err(StorageError::Corrupt(_))
        ));
    }

    #[tokio::test]
    async fn missing_catalog_is_not_found() {
        let storage = Storage::in_memory();
        assert!(matches!(
            storage.catalog.load_catalog(Locale::It).await,
            Err(StorageError::NotFound)
        ));
    }
}
