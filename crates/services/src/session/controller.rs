use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use checklist_core::Clock;
use checklist_core::model::{Catalog, Locale, ProgressDocument, TestId, TestStatus};
use storage::repository::{DocumentGateway, DocumentHandle, DocumentSummary, StorageError};
use tracing::{debug, info, warn};

use super::state::{SessionPhase, SessionState};
use crate::app_settings_service::AppSettingsService;
use crate::catalog_service::CatalogService;
use crate::checklist_view::ChecklistSummary;
use crate::error::SessionError;
use crate::shell::{HostShell, SaveLocation, default_save_name};

pub const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(5);

/// Launch-time knobs for the controller.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Bundled fallback read when the last document cannot be restored.
    pub default_document: Option<DocumentHandle>,
    /// Upper bound for every gateway call. The save prompt is not bounded.
    pub gateway_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_document: None,
            gateway_timeout: DEFAULT_GATEWAY_TIMEOUT,
        }
    }
}

/// Which source populated the progress store during startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RestoreSource {
    LastDocument(DocumentHandle),
    BundledDefault(DocumentHandle),
    Empty,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StartupReport {
    pub locale: Locale,
    pub source: RestoreSource,
    pub catalog_tests: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved { handle: DocumentHandle },
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadOutcome {
    pub label: String,
    pub handle: Option<DocumentHandle>,
}

/// Answer to a close attempt from the shell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseRequest {
    /// Nothing unsaved; the shell was told to terminate.
    Terminated,
    /// Unsaved changes; ask the user and call `resolve_exit`.
    NeedsDecision,
    /// A save, load or locale flow is running. Nothing changed; the shell
    /// should keep the window open.
    Busy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitDecision {
    SaveThenExit,
    DiscardAndExit,
    Cancel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitOutcome {
    Terminated,
    Stayed,
}

/// Owns the session state and runs the startup, save, load and exit flows.
///
/// State lives behind a plain mutex that is never held across an await;
/// gateway calls happen with the lock released. At most one save/load/locale
/// flow runs at a time, a second request gets `SessionError::Busy`.
pub struct SessionController {
    clock: Clock,
    config: SessionConfig,
    documents: Arc<dyn DocumentGateway>,
    catalog: CatalogService,
    settings: AppSettingsService,
    shell: Arc<dyn HostShell>,
    state: Mutex<SessionState>,
}

/// Releases the in-flight slot and leaves transient phases on drop, so a
/// cancelled future cannot wedge the session.
struct FlightGuard<'a> {
    controller: &'a SessionController,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.controller.lock();
        state.flow_in_flight = false;
        if matches!(
            state.phase,
            SessionPhase::Saving | SessionPhase::Loading | SessionPhase::LoadingCatalog
        ) {
            state.phase = SessionPhase::Ready;
        }
    }
}

impl SessionController {
    #[must_use]
    pub fn new(
        clock: Clock,
        config: SessionConfig,
        documents: Arc<dyn DocumentGateway>,
        catalog: CatalogService,
        settings: AppSettingsService,
        shell: Arc<dyn HostShell>,
    ) -> Self {
        Self {
            clock,
            config,
            documents,
            catalog,
            settings,
            shell,
            state: Mutex::new(SessionState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read-only access to the whole session state.
    pub fn with_state<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        f(&self.lock())
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.lock().phase
    }

    #[must_use]
    pub fn locale(&self) -> Locale {
        self.lock().locale
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.lock().catalog)
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.lock().is_dirty()
    }

    #[must_use]
    pub fn document_label(&self) -> Option<String> {
        self.lock().document_label.clone()
    }

    /// Bumped on every progress mutation; lets views skip redundant work.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.lock().progress.revision()
    }

    #[must_use]
    pub fn status(&self, id: &TestId) -> TestStatus {
        self.lock().progress.status(id)
    }

    #[must_use]
    pub fn note(&self, id: &TestId) -> String {
        self.lock().progress.note(id).to_owned()
    }

    #[must_use]
    pub fn export_document(&self) -> ProgressDocument {
        self.lock().progress.export_document()
    }

    /// Count catalog tests currently in `status`.
    #[must_use]
    pub fn count_by_status(&self, status: TestStatus) -> usize {
        let state = self.lock();
        state
            .progress
            .count_by_status(state.catalog.tests().map(|test| &test.id), status)
    }

    #[must_use]
    pub fn summary(&self) -> ChecklistSummary {
        let state = self.lock();
        ChecklistSummary::build(&state.catalog, &state.progress)
    }

    #[must_use]
    pub fn suggested_save_name(&self) -> String {
        default_save_name(&self.clock)
    }

    //
    // ─── MUTATIONS ─────────────────────────────────────────────────────────────
    //

    fn mutate<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let (out, dirty) = {
            let mut state = self.lock();
            let out = f(&mut state);
            (out, state.observe_dirty())
        };
        if let Some(dirty) = dirty {
            self.shell.report_dirty_state(dirty);
        }
        out
    }

    pub fn set_status(&self, id: TestId, status: TestStatus) -> bool {
        self.mutate(|state| state.progress.set_status(id, status))
    }

    pub fn cycle_status(&self, id: &TestId) -> TestStatus {
        self.mutate(|state| state.progress.cycle_status(id))
    }

    pub fn set_many_status<I>(&self, ids: I, status: TestStatus) -> usize
    where
        I: IntoIterator<Item = TestId>,
    {
        self.mutate(|state| state.progress.set_many_status(ids, status))
    }

    /// Bulk-assign every catalog test between `from` and `to` (inclusive).
    pub fn set_range_status(&self, from: &TestId, to: &TestId, status: TestStatus) -> usize {
        self.mutate(|state| {
            let ids = state.catalog.tests_between(from, to);
            state.progress.set_many_status(ids, status)
        })
    }

    pub fn set_note(&self, id: TestId, blob: impl Into<String>) -> bool {
        let blob = blob.into();
        self.mutate(|state| state.progress.set_note(id, blob))
    }

    //
    // ─── STARTUP ───────────────────────────────────────────────────────────────
    //

    /// Load the catalog, restore progress (last document, then bundled
    /// default, then empty) and arm dirty tracking.
    ///
    /// `locale` overrides the persisted choice for this run.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyStarted` if called more than once.
    /// Restore failures are recovered, never returned.
    pub async fn start(&self, locale: Option<Locale>) -> Result<StartupReport, SessionError> {
        {
            let mut state = self.lock();
            if state.phase != SessionPhase::Idle {
                return Err(SessionError::AlreadyStarted);
            }
            state.phase = SessionPhase::LoadingCatalog;
        }

        let locale = match locale {
            Some(locale) => locale,
            None => self.persisted_locale().await,
        };
        let catalog = self.load_catalog(locale).await;
        let catalog_tests = catalog.test_count();
        {
            let mut state = self.lock();
            state.locale = locale;
            state.catalog = Arc::new(catalog);
            state.phase = SessionPhase::RestoringProgress;
        }

        let source = self.restore_progress().await;

        let dirty = {
            let mut state = self.lock();
            let current = state.progress.export_document();
            let dirty = state.tracker.mark_restore_complete(&current);
            state.phase = SessionPhase::Ready;
            dirty
        };
        self.shell.report_dirty_state(dirty);
        info!(locale = %locale, tests = catalog_tests, source = ?source, "session ready");

        Ok(StartupReport {
            locale,
            source,
            catalog_tests,
        })
    }

    async fn persisted_locale(&self) -> Locale {
        match tokio::time::timeout(self.config.gateway_timeout, self.settings.load()).await {
            Ok(Ok(settings)) => settings.locale(),
            Ok(Err(err)) => {
                warn!(error = %err, "could not read settings, using default locale");
                Locale::default()
            }
            Err(_) => {
                warn!("settings read timed out, using default locale");
                Locale::default()
            }
        }
    }

    async fn load_catalog(&self, locale: Locale) -> Catalog {
        match tokio::time::timeout(self.config.gateway_timeout, self.catalog.load_or_empty(locale))
            .await
        {
            Ok(catalog) => catalog,
            Err(_) => {
                warn!(locale = %locale, "catalog load timed out, continuing with empty catalog");
                Catalog::empty()
            }
        }
    }

    async fn restore_progress(&self) -> RestoreSource {
        let last = self
            .bounded("locate", async {
                Ok(self.documents.locate_last_document().await)
            })
            .await
            .ok()
            .flatten();

        if let Some(handle) = last {
            match self.bounded("read", self.documents.read_document(&handle)).await {
                Ok(doc) => {
                    self.apply_restored(doc, Some(handle.label().to_owned()));
                    return RestoreSource::LastDocument(handle);
                }
                Err(err) => warn!(handle = %handle, error = %err, "last document not restored"),
            }
        }

        if let Some(handle) = self.config.default_document.clone() {
            match self.bounded("read", self.documents.read_document(&handle)).await {
                Ok(doc) => {
                    self.apply_restored(doc, None);
                    return RestoreSource::BundledDefault(handle);
                }
                Err(err) => warn!(handle = %handle, error = %err, "bundled default not restored"),
            }
        }

        self.lock().document_label = None;
        RestoreSource::Empty
    }

    fn apply_restored(&self, doc: ProgressDocument, label: Option<String>) {
        let mut state = self.lock();
        state.progress.import_document(doc);
        state.document_label = label;
    }

    //
    // ─── SAVE / LOAD ───────────────────────────────────────────────────────────
    //

    fn begin_flow(&self, phase: SessionPhase) -> Result<FlightGuard<'_>, SessionError> {
        let mut state = self.lock();
        if state.flow_in_flight {
            return Err(SessionError::Busy);
        }
        if !state.phase.accepts_flows() {
            return Err(SessionError::NotReady);
        }
        state.flow_in_flight = true;
        state.phase = phase;
        Ok(FlightGuard { controller: self })
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T, SessionError>
    where
        F: Future<Output = Result<T, StorageError>>,
    {
        match tokio::time::timeout(self.config.gateway_timeout, fut).await {
            Ok(result) => result.map_err(SessionError::from),
            Err(_) => {
                warn!(
                    operation,
                    timeout = ?self.config.gateway_timeout,
                    "gateway operation timed out"
                );
                Err(SessionError::TimedOut)
            }
        }
    }

    async fn remember(&self, handle: &DocumentHandle) {
        if let Err(err) = self
            .bounded("remember", self.documents.remember_document(handle))
            .await
        {
            warn!(handle = %handle, error = %err, "could not record last document");
        }
    }

    /// Export, prompt for a location, write, then make the written document
    /// the new baseline.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Busy` or `NotReady` when the flow cannot start,
    /// and `Io`/`TimedOut` when the write fails. The session is unchanged on
    /// error and on cancellation.
    pub async fn save_with_prompt(&self) -> Result<SaveOutcome, SessionError> {
        let _guard = self.begin_flow(SessionPhase::Saving)?;
        let doc = self.export_document();

        let suggested = self.suggested_save_name();
        let handle = match self.shell.request_save_location(&suggested).await {
            SaveLocation::Chosen(handle) => handle,
            SaveLocation::Cancelled => {
                debug!("save cancelled at location prompt");
                return Ok(SaveOutcome::Cancelled);
            }
        };

        let written = self
            .bounded("write", self.documents.write_document(&handle, &doc))
            .await?;

        let dirty = {
            let mut state = self.lock();
            state.document_label = Some(written.label().to_owned());
            state.tracker.reset_baseline(doc);
            state.observe_dirty().unwrap_or(false)
        };
        self.shell.report_dirty_state(dirty);
        self.remember(&written).await;
        info!(handle = %written, "progress document saved");

        Ok(SaveOutcome::Saved { handle: written })
    }

    /// Load externally supplied document content (e.g. a file picked by the
    /// user). Parsing happens here; a corrupt blob leaves the session intact.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::DocumentCorrupt` on parse failure, or `Busy` /
    /// `NotReady` when the flow cannot start.
    pub async fn load_from_bytes(
        &self,
        label: &str,
        bytes: &[u8],
    ) -> Result<LoadOutcome, SessionError> {
        let _guard = self.begin_flow(SessionPhase::Loading)?;
        self.apply_loaded(label.to_owned(), None, bytes)
    }

    /// Load a stored document through the gateway, e.g. from the saved
    /// session browser, and remember it as the last document.
    ///
    /// # Errors
    ///
    /// Returns `DocumentNotFound`, `DocumentCorrupt`, `Io` or `TimedOut`; the
    /// session is unchanged on error.
    pub async fn load_document(&self, handle: &DocumentHandle) -> Result<LoadOutcome, SessionError> {
        let _guard = self.begin_flow(SessionPhase::Loading)?;
        let bytes = self.bounded("retrieve", self.documents.retrieve(handle)).await?;
        let outcome = self.apply_loaded(handle.label().to_owned(), Some(handle.clone()), &bytes)?;
        self.remember(handle).await;
        Ok(outcome)
    }

    fn apply_loaded(
        &self,
        label: String,
        handle: Option<DocumentHandle>,
        bytes: &[u8],
    ) -> Result<LoadOutcome, SessionError> {
        let doc = ProgressDocument::from_slice(bytes).map_err(|err| {
            warn!(label = %label, error = %err, "rejected corrupt progress document");
            SessionError::from(StorageError::from(err))
        })?;

        {
            let mut state = self.lock();
            state.progress.import_document(doc);
            let baseline = state.progress.export_document();
            state.tracker.reset_baseline(baseline);
            state.document_label = Some(label.clone());
        }
        self.shell.report_dirty_state(false);
        info!(label = %label, "progress document loaded");

        Ok(LoadOutcome { label, handle })
    }

    /// Saved documents, most recently modified first.
    ///
    /// # Errors
    ///
    /// Returns `Io` or `TimedOut` if the listing fails.
    pub async fn list_saved_documents(&self) -> Result<Vec<DocumentSummary>, SessionError> {
        let mut docs = self
            .bounded("list", self.documents.list_documents())
            .await?;
        docs.sort_by(|a, b| {
            b.last_modified
                .cmp(&a.last_modified)
                .then_with(|| a.handle.cmp(&b.handle))
        });
        Ok(docs)
    }

    //
    // ─── LOCALE ────────────────────────────────────────────────────────────────
    //

    /// Swap the catalog for `locale` and persist the choice. Progress, the
    /// baseline and the document label are kept.
    ///
    /// # Errors
    ///
    /// Returns `Busy` or `NotReady` when another flow is running.
    pub async fn change_locale(&self, locale: Locale) -> Result<(), SessionError> {
        let _guard = self.begin_flow(SessionPhase::LoadingCatalog)?;
        let catalog = self.load_catalog(locale).await;
        {
            let mut state = self.lock();
            state.locale = locale;
            state.catalog = Arc::new(catalog);
        }
        match tokio::time::timeout(self.config.gateway_timeout, self.settings.set_locale(locale))
            .await
        {
            Ok(Ok(_)) => {}
            Ok(Err(err)) => warn!(locale = %locale, error = %err, "could not persist locale"),
            Err(_) => warn!(locale = %locale, "persisting locale timed out"),
        }
        info!(locale = %locale, "locale changed");
        Ok(())
    }

    //
    // ─── EXIT ──────────────────────────────────────────────────────────────────
    //

    /// The shell detected a close request.
    pub fn on_close_attempted(&self) -> CloseRequest {
        {
            let mut state = self.lock();
            if state.flow_in_flight {
                debug!(phase = ?state.phase, "close requested while a flow is running");
                return CloseRequest::Busy;
            }
            if state.is_dirty() {
                if state.phase == SessionPhase::Ready {
                    state.phase = SessionPhase::ConfirmingExit;
                }
                return CloseRequest::NeedsDecision;
            }
            state.phase = SessionPhase::Terminated;
        }
        self.shell.terminate();
        CloseRequest::Terminated
    }

    /// Apply the user's answer to the unsaved-changes prompt.
    ///
    /// # Errors
    ///
    /// Propagates save failures for `SaveThenExit`; the session stays open.
    pub async fn resolve_exit(&self, decision: ExitDecision) -> Result<ExitOutcome, SessionError> {
        {
            let mut state = self.lock();
            if state.phase == SessionPhase::ConfirmingExit {
                state.phase = SessionPhase::Ready;
            }
        }
        match decision {
            ExitDecision::Cancel => Ok(ExitOutcome::Stayed),
            ExitDecision::DiscardAndExit => {
                self.on_discard_and_terminate_requested();
                Ok(ExitOutcome::Terminated)
            }
            ExitDecision::SaveThenExit => match self.save_with_prompt().await? {
                SaveOutcome::Saved { .. } => {
                    self.on_force_terminate_requested();
                    Ok(ExitOutcome::Terminated)
                }
                SaveOutcome::Cancelled => Ok(ExitOutcome::Stayed),
            },
        }
    }

    /// Terminal signal: leave without touching progress.
    pub fn on_force_terminate_requested(&self) {
        self.lock().phase = SessionPhase::Terminated;
        self.shell.terminate();
    }

    /// Terminal signal: drop unsaved changes and leave.
    pub fn on_discard_and_terminate_requested(&self) {
        {
            let mut state = self.lock();
            state.tracker.clear();
            state.phase = SessionPhase::Terminated;
        }
        self.shell.report_dirty_state(false);
        self.shell.terminate();
        info!("exiting without saving");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controller_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SessionController>();
    }

    #[test]
    fn default_config_has_timeout() {
        let config = SessionConfig::default();
        assert_eq!(config.gateway_timeout, DEFAULT_GATEWAY_TIMEOUT);
        assert!(config.default_document.is_none());
    }
}
