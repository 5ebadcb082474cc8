use std::sync::Arc;

use checklist_core::DirtyTracker;
use checklist_core::model::{Catalog, Locale, ProgressStore};

/// Where the controller is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionPhase {
    #[default]
    Idle,
    LoadingCatalog,
    RestoringProgress,
    Ready,
    Saving,
    Loading,
    ConfirmingExit,
    Terminated,
}

impl SessionPhase {
    /// Phases from which a save, load or exit flow may start.
    #[must_use]
    pub fn accepts_flows(self) -> bool {
        matches!(self, Self::Ready | Self::ConfirmingExit)
    }
}

/// Everything the session owns: progress, baseline, current document label
/// and the active catalog.
#[derive(Clone, Debug, Default)]
pub struct SessionState {
    pub(crate) phase: SessionPhase,
    pub(crate) locale: Locale,
    pub(crate) catalog: Arc<Catalog>,
    pub(crate) progress: ProgressStore,
    pub(crate) tracker: DirtyTracker,
    pub(crate) document_label: Option<String>,
    pub(crate) flow_in_flight: bool,
}

impl SessionState {
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn locale(&self) -> Locale {
        self.locale
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.tracker.is_dirty()
    }

    /// Label of the associated document; `None` means no document.
    #[must_use]
    pub fn document_label(&self) -> Option<&str> {
        self.document_label.as_deref()
    }

    /// Recompute the dirty flag after a mutation.
    pub(crate) fn observe_dirty(&mut self) -> Option<bool> {
        let current = self.progress.export_document();
        self.tracker.observe(&current)
    }
}
