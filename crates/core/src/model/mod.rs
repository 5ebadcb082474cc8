mod app_settings;
mod catalog;
mod filter;
mod ids;
mod progress;
mod status;

pub use app_settings::{AppSettings, AppSettingsDraft, AppSettingsError};
pub use catalog::{
    Catalog, CatalogError, CatalogSources, CatalogTest, Category, ClassificationItem, Locale,
    RiskLevel, TestInfo, classification_codes,
};
pub use filter::{ChecklistFilter, FilteredCategory};
pub use ids::{CategoryId, ParseIdError, TestId};
pub use progress::{DocumentError, ProgressDocument, ProgressStore};
pub use status::{CategoryStatus, ParseStatusError, TestStatus};
