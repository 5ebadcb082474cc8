use std::path::PathBuf;
use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::app_settings_service::AppSettingsService;
use crate::catalog_service::CatalogService;
use crate::error::AppServicesError;
use crate::session::{SessionConfig, SessionController};
use crate::shell::HostShell;

/// Assembles app-facing services around one session.
#[derive(Clone)]
pub struct AppServices {
    session: Arc<SessionController>,
    catalog: Arc<CatalogService>,
    app_settings: Arc<AppSettingsService>,
}

impl AppServices {
    /// Wire services over an already-built `Storage`.
    #[must_use]
    pub fn from_storage(
        storage: &Storage,
        clock: Clock,
        config: SessionConfig,
        shell: Arc<dyn HostShell>,
    ) -> Self {
        let catalog = CatalogService::new(Arc::clone(&storage.catalog));
        let app_settings = AppSettingsService::new(Arc::clone(&storage.settings));
        let session = Arc::new(SessionController::new(
            clock,
            config,
            Arc::clone(&storage.documents),
            catalog.clone(),
            app_settings.clone(),
            shell,
        ));

        Self {
            session,
            catalog: Arc::new(catalog),
            app_settings: Arc::new(app_settings),
        }
    }

    /// Build services backed by JSON files, the catalog directory and
    /// `SQLite` settings.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_local(
        db_url: &str,
        data_dir: impl Into<PathBuf>,
        catalog_dir: impl Into<PathBuf>,
        clock: Clock,
        config: SessionConfig,
        shell: Arc<dyn HostShell>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::local(db_url, data_dir, catalog_dir).await?;
        Ok(Self::from_storage(&storage, clock, config, shell))
    }

    #[must_use]
    pub fn session(&self) -> Arc<SessionController> {
        Arc::clone(&self.session)
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn app_settings(&self) -> Arc<AppSettingsService> {
        Arc::clone(&self.app_settings)
    }
}
