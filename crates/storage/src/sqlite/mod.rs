use std::sync::Arc;
use std::time::Duration;

use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use thiserror::Error;

use crate::fs::{FsCatalogSource, FsDocumentStore};
use crate::repository::{AppSettingsRepository, CatalogSource, DocumentGateway, Storage};

mod app_settings_repo;
mod migrate;

/// `SQLite` backend for the small amount of relational state the app keeps:
/// the settings row with the locale and the last-document pointer.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl SqliteRepository {
    /// Connect to `SQLite` using the given URL.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the connection cannot be established or a
    /// setup pragma fails.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(2)
            .acquire_timeout(Duration::from_secs(5))
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query("PRAGMA journal_mode = WAL;")
                        .execute(&mut *conn)
                        .await?;
                    sqlx::query("PRAGMA busy_timeout = 5000;")
                        .execute(&mut *conn)
                        .await?;
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create tables if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if migration queries fail.
    pub async fn migrate(&self) -> Result<(), SqliteInitError> {
        migrate::run_migrations(&self.pool).await
    }
}

impl Storage {
    /// Build the desktop `Storage`: progress documents as JSON files under
    /// `data_dir`, catalogs read from `catalog_dir`, settings in `SQLite`.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if connection or migrations cannot be
    /// completed.
    pub async fn local(
        database_url: &str,
        data_dir: impl Into<std::path::PathBuf>,
        catalog_dir: impl Into<std::path::PathBuf>,
    ) -> Result<Self, SqliteInitError> {
        let repo = SqliteRepository::connect(database_url).await?;
        repo.migrate().await?;
        let settings: Arc<dyn AppSettingsRepository> = Arc::new(repo);
        let documents: Arc<dyn DocumentGateway> =
            Arc::new(FsDocumentStore::new(data_dir, Arc::clone(&settings)));
        let catalog: Arc<dyn CatalogSource> = Arc::new(FsCatalogSource::new(catalog_dir));
        Ok(Self {
            documents,
            settings,
            catalog,
        })
    }
}
