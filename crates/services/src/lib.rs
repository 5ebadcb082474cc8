#![forbid(unsafe_code)]

pub mod app_services;
pub mod app_settings_service;
pub mod catalog_service;
pub mod checklist_view;
pub mod error;
pub mod session;
pub mod shell;

pub use checklist_core::Clock;

pub use app_services::AppServices;
pub use app_settings_service::AppSettingsService;
pub use catalog_service::CatalogService;
pub use checklist_view::{CategoryRow, ChecklistSummary, ProgressBand, StatusCounts};
pub use error::{AppServicesError, AppSettingsServiceError, SessionError};
pub use session::{
    CloseRequest, ExitDecision, ExitOutcome, LoadOutcome, RestoreSource, SaveOutcome,
    SessionConfig, SessionController, SessionPhase, SessionState, StartupReport,
};
pub use shell::{HostShell, SaveLocation, default_save_name};
