//! Boundary to the surrounding application shell (window, dialogs, process).

use async_trait::async_trait;
use storage::repository::DocumentHandle;

/// Result of the interactive save-location prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveLocation {
    Chosen(DocumentHandle),
    Cancelled,
}

/// Calls the session makes into the host application.
#[async_trait]
pub trait HostShell: Send + Sync {
    /// Ask the user where to save. Not bounded by the gateway timeout.
    async fn request_save_location(&self, suggested_name: &str) -> SaveLocation;

    /// Fire-and-forget notification used to guard window close.
    fn report_dirty_state(&self, dirty: bool);

    /// End the process (or close the window).
    fn terminate(&self);
}

/// Suggested filename for a new save, e.g. `wstg-progress-2024-05-01.json`.
#[must_use]
pub fn default_save_name(clock: &checklist_core::Clock) -> String {
    format!("wstg-progress-{}.json", clock.date_stamp())
}
