use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use crate::repository::{AppSettingsRepository, StorageError};
use checklist_core::model::AppSettings;

use super::SqliteRepository;

#[async_trait]
impl AppSettingsRepository for SqliteRepository {
    async fn get_settings(&self) -> Result<Option<AppSettings>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT locale, last_document
            FROM app_settings
            WHERE id = 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let locale: Option<String> = row
            .try_get("locale")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let last_document: Option<String> = row
            .try_get("last_document")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        AppSettings::from_persisted(locale, last_document)
            .map(Some)
            .map_err(|err| StorageError::Serialization(err.to_string()))
    }

    async fn save_settings(&self, settings: &AppSettings) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO app_settings (id, locale, last_document, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                locale = excluded.locale,
                last_document = excluded.last_document,
                updated_at = excluded.updated_at
            ",
        )
        .bind(1_i64)
        .bind(settings.locale().code())
        .bind(settings.last_document())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}
