//! Unsaved-change detection against the last saved or loaded baseline.

use crate::model::ProgressDocument;

/// Tracks whether the live progress differs from the last persisted baseline.
///
/// Nothing is computed until the restore sequence signals completion, so the
/// asynchronous startup never reports phantom changes. Comparison is
/// structural on `ProgressDocument`, whose mappings are sorted, so key order
/// can never produce a false positive.
#[derive(Clone, Debug, Default)]
pub struct DirtyTracker {
    baseline: Option<ProgressDocument>,
    initial_load_complete: bool,
    dirty: bool,
}

impl DirtyTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_initial_load_complete(&self) -> bool {
        self.initial_load_complete
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[must_use]
    pub fn baseline(&self) -> Option<&ProgressDocument> {
        self.baseline.as_ref()
    }

    /// Called once the restore sequence finished. Takes `current` as the
    /// baseline unless one was already recorded.
    pub fn mark_restore_complete(&mut self, current: &ProgressDocument) -> bool {
        self.initial_load_complete = true;
        if self.baseline.is_none() {
            self.baseline = Some(current.clone());
        }
        self.dirty = self.baseline.as_ref() != Some(current);
        self.dirty
    }

    /// Recompute the flag after a mutation. Returns `None` while the initial
    /// load is still running.
    pub fn observe(&mut self, current: &ProgressDocument) -> Option<bool> {
        if !self.initial_load_complete {
            return None;
        }
        let baseline = self.baseline.as_ref()?;
        self.dirty = baseline != current;
        Some(self.dirty)
    }

    /// A save or load succeeded: `persisted` becomes the new baseline.
    pub fn reset_baseline(&mut self, persisted: ProgressDocument) {
        self.baseline = Some(persisted);
        self.dirty = false;
    }

    /// Drop the flag without touching the baseline (discard-and-exit).
    pub fn clear(&mut self) {
        self.dirty = false;
    }
}
