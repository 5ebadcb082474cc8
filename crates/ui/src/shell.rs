//! Host shell for the desktop window.
//!
//! The session asks for a save location through `HostShell`; the window
//! answers it with an in-app dialog. A request parks a oneshot sender here
//! until the dialog confirms or cancels. Native close requests travel the
//! other way: the window event loop posts them here and the view tree picks
//! them up and runs the exit flow.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use services::{HostShell, SaveLocation};
use storage::repository::DocumentHandle;
use tokio::sync::{Notify, oneshot};
use tracing::{debug, info};

const DOCUMENT_EXTENSION: &str = "json";

type TerminateFn = Box<dyn Fn() + Send + Sync>;

struct PendingPrompt {
    suggested: String,
    reply: oneshot::Sender<SaveLocation>,
}

pub struct DesktopShell {
    data_dir: PathBuf,
    dirty: AtomicBool,
    pending: Mutex<Option<PendingPrompt>>,
    prompt_ready: Notify,
    close_requested: Notify,
    on_terminate: TerminateFn,
}

impl DesktopShell {
    #[must_use]
    pub fn new(
        data_dir: impl Into<PathBuf>,
        on_terminate: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self {
            data_dir: data_dir.into(),
            dirty: AtomicBool::new(false),
            pending: Mutex::new(None),
            prompt_ready: Notify::new(),
            close_requested: Notify::new(),
            on_terminate: Box::new(on_terminate),
        }
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Last value reported by the session.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Suggested filename of the prompt waiting for an answer, if any.
    #[must_use]
    pub fn pending_prompt(&self) -> Option<String> {
        self.lock().as_ref().map(|prompt| prompt.suggested.clone())
    }

    /// Resolves once per save request with the suggested name. A request
    /// posted before anyone waits is not lost.
    pub async fn next_prompt(&self) -> String {
        loop {
            self.prompt_ready.notified().await;
            if let Some(suggested) = self.pending_prompt() {
                return suggested;
            }
        }
    }

    /// Post a close request from the window (title bar button, Alt+F4).
    /// Requests made before anyone waits are kept, repeated ones collapse.
    pub fn request_close(&self) {
        debug!("window close requested");
        self.close_requested.notify_one();
    }

    /// Resolves once per posted close request.
    pub async fn next_close_request(&self) {
        self.close_requested.notified().await;
    }

    /// Answer the pending prompt with a filename. Returns `false` when the
    /// name is blank or nothing is waiting.
    pub fn answer_prompt(&self, filename: &str) -> bool {
        let Some(handle) = self.resolve_filename(filename) else {
            return false;
        };
        let Some(prompt) = self.lock().take() else {
            return false;
        };
        debug!(handle = %handle, "save location chosen");
        prompt.reply.send(SaveLocation::Chosen(handle)).is_ok()
    }

    pub fn cancel_prompt(&self) {
        if let Some(prompt) = self.lock().take() {
            debug!("save prompt cancelled");
            let _ = prompt.reply.send(SaveLocation::Cancelled);
        }
    }

    /// Bare names land in the data directory and get a `.json` extension.
    fn resolve_filename(&self, filename: &str) -> Option<DocumentHandle> {
        let name = filename.trim();
        if name.is_empty() {
            return None;
        }
        let mut path = PathBuf::from(name);
        let has_extension = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(DOCUMENT_EXTENSION));
        if !has_extension {
            let mut with_ext = path.into_os_string();
            with_ext.push(".");
            with_ext.push(DOCUMENT_EXTENSION);
            path = PathBuf::from(with_ext);
        }
        if path.is_relative() {
            path = self.data_dir.join(path);
        }
        Some(DocumentHandle::new(path.to_string_lossy()))
    }

    fn lock(&self) -> MutexGuard<'_, Option<PendingPrompt>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl HostShell for DesktopShell {
    async fn request_save_location(&self, suggested_name: &str) -> SaveLocation {
        let (reply, answer) = oneshot::channel();
        let replaced = self.lock().replace(PendingPrompt {
            suggested: suggested_name.to_owned(),
            reply,
        });
        if let Some(previous) = replaced {
            let _ = previous.reply.send(SaveLocation::Cancelled);
        }
        self.prompt_ready.notify_one();

        // A dropped sender means the window went away.
        answer.await.unwrap_or(SaveLocation::Cancelled)
    }

    fn report_dirty_state(&self, dirty: bool) {
        if self.dirty.swap(dirty, Ordering::AcqRel) != dirty {
            debug!(dirty, "dirty state changed");
        }
    }

    fn terminate(&self) {
        info!("terminating");
        (self.on_terminate)();
    }
}
