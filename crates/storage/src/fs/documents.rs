use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use checklist_core::model::ProgressDocument;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::repository::{
    AppSettingsRepository, DocumentGateway, DocumentHandle, DocumentSummary, StorageError,
};

const DOCUMENT_EXTENSION: &str = "json";

/// Progress documents stored as pretty-printed JSON files.
///
/// Relative handles (a bare filename typed into the save prompt, for
/// instance) resolve under `root`. Handles returned by writes are absolute.
/// The last-document pointer is delegated to the settings repository.
#[derive(Clone)]
pub struct FsDocumentStore {
    root: PathBuf,
    settings: Arc<dyn AppSettingsRepository>,
}

impl FsDocumentStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, settings: Arc<dyn AppSettingsRepository>) -> Self {
        Self {
            root: root.into(),
            settings,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, handle: &DocumentHandle) -> PathBuf {
        let path = Path::new(handle.as_str());
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn is_document(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(DOCUMENT_EXTENSION))
}

#[async_trait]
impl DocumentGateway for FsDocumentStore {
    async fn locate_last_document(&self) -> Option<DocumentHandle> {
        let settings = match self.settings.get_settings().await {
            Ok(settings) => settings?,
            Err(err) => {
                warn!(error = %err, "could not read last document pointer");
                return None;
            }
        };
        let handle = DocumentHandle::new(settings.last_document()?);
        match tokio::fs::try_exists(self.resolve(&handle)).await {
            Ok(true) => Some(handle),
            Ok(false) => {
                debug!(handle = %handle, "last document no longer exists");
                None
            }
            Err(err) => {
                warn!(handle = %handle, error = %err, "could not check last document");
                None
            }
        }
    }

    async fn retrieve(&self, handle: &DocumentHandle) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(handle);
        let bytes = tokio::fs::read(&path).await?;
        debug!(path = %path.display(), bytes = bytes.len(), "document read");
        Ok(bytes)
    }

    async fn write_document(
        &self,
        handle: &DocumentHandle,
        doc: &ProgressDocument,
    ) -> Result<DocumentHandle, StorageError> {
        let path = self.resolve(handle);
        let text = doc.to_json_pretty()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Readers never observe a half-written document.
        let tmp = temp_path_for(&path);
        tokio::fs::write(&tmp, text.as_bytes()).await?;
        if let Err(err) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(err.into());
        }

        let canonical = tokio::fs::canonicalize(&path).await?;
        debug!(path = %canonical.display(), bytes = text.len(), "document written");
        Ok(DocumentHandle::new(canonical.to_string_lossy()))
    }

    async fn remember_document(&self, handle: &DocumentHandle) -> Result<(), StorageError> {
        let current = self.settings.get_settings().await?.unwrap_or_default();
        self.settings
            .save_settings(&current.with_last_document(handle.as_str()))
            .await
    }

    async fn list_documents(&self) -> Result<Vec<DocumentSummary>, StorageError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut out = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !is_document(&path) {
                continue;
            }
            let meta = entry.metadata().await?;
            if !meta.is_file() {
                continue;
            }
            let last_modified: DateTime<Utc> = meta
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_default();
            out.push(DocumentSummary {
                handle: DocumentHandle::new(path.to_string_lossy()),
                size: meta.len(),
                last_modified,
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_keeps_directory() {
        let tmp = temp_path_for(Path::new("/saves/a.json"));
        assert_eq!(tmp, PathBuf::from("/saves/a.json.tmp"));
    }

    #[test]
    fn only_json_files_are_documents() {
        assert!(is_document(Path::new("a.json")));
        assert!(is_document(Path::new("B.JSON")));
        assert!(!is_document(Path::new("a.json.tmp")));
        assert!(!is_document(Path::new("notes.txt")));
    }
}
