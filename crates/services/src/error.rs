//! Shared error types for the services crate.

use thiserror::Error;

use checklist_core::model::AppSettingsError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the session controller flows.
///
/// Cancelling the save prompt is not an error; see `SaveOutcome::Cancelled`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("document is corrupt: {0}")]
    DocumentCorrupt(String),
    #[error("document not found")]
    DocumentNotFound,
    #[error("i/o error: {0}")]
    Io(String),
    #[error("storage did not respond in time")]
    TimedOut,
    #[error("another save or load is already running")]
    Busy,
    #[error("session is not ready")]
    NotReady,
    #[error("session already started")]
    AlreadyStarted,
}

impl From<StorageError> for SessionError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => Self::DocumentNotFound,
            StorageError::Corrupt(message) => Self::DocumentCorrupt(message),
            other => Self::Io(other.to_string()),
        }
    }
}

impl SessionError {
    /// Whether the failure should be shown to the user as a notification.
    #[must_use]
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            Self::DocumentCorrupt(_) | Self::DocumentNotFound | Self::Io(_) | Self::TimedOut
        )
    }
}

/// Errors emitted by `AppSettingsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppSettingsServiceError {
    #[error(transparent)]
    Validation(#[from] AppSettingsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
