use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use checklist_core::model::Locale;
use dioxus::prelude::*;
use services::{CloseRequest, SessionController};

use crate::platform::LinkOpenerRef;
use crate::shell::DesktopShell;

pub trait UiApp: Send + Sync {
    fn session(&self) -> Arc<SessionController>;
    fn shell(&self) -> Arc<DesktopShell>;
    fn link_opener(&self) -> LinkOpenerRef;

    /// Locale forced from the command line for this launch.
    fn locale_override(&self) -> Option<Locale>;
}

#[derive(Clone)]
pub struct AppContext {
    session: Arc<SessionController>,
    shell: Arc<DesktopShell>,
    link_opener: LinkOpenerRef,
    locale_override: Option<Locale>,
    startup_pending: Arc<AtomicBool>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            session: app.session(),
            shell: app.shell(),
            link_opener: app.link_opener(),
            locale_override: app.locale_override(),
            startup_pending: Arc::new(AtomicBool::new(true)),
        }
    }

    #[must_use]
    pub fn session(&self) -> Arc<SessionController> {
        Arc::clone(&self.session)
    }

    #[must_use]
    pub fn shell(&self) -> Arc<DesktopShell> {
        Arc::clone(&self.shell)
    }

    #[must_use]
    pub fn link_opener(&self) -> LinkOpenerRef {
        Arc::clone(&self.link_opener)
    }

    #[must_use]
    pub fn locale_override(&self) -> Option<Locale> {
        self.locale_override
    }

    /// True exactly once: the first caller runs the startup sequence.
    #[must_use]
    pub fn take_startup(&self) -> bool {
        self.startup_pending.swap(false, Ordering::AcqRel)
    }
}

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}

/// Window-wide reactive state. The session itself is not reactive, so every
/// flow bumps `tick` after it touches the session.
#[derive(Clone, Copy)]
pub struct UiSignals {
    pub tick: Signal<u64>,
    /// Bumped when the progress is replaced wholesale (load, locale change),
    /// so note editors drop their drafts.
    pub epoch: Signal<u64>,
    pub notice: Signal<Option<String>>,
    pub save_prompt: Signal<Option<String>>,
    pub load_prompt: Signal<bool>,
    pub exit_prompt: Signal<bool>,
}

impl UiSignals {
    pub fn refresh(self) {
        let mut tick = self.tick;
        *tick.write() += 1;
    }

    pub fn replace_progress(self) {
        let mut epoch = self.epoch;
        *epoch.write() += 1;
        self.refresh();
    }

    pub fn notify(self, message: impl Into<String>) {
        let mut notice = self.notice;
        notice.set(Some(message.into()));
    }

    /// Close attempt from the Quit button or the window frame. A clean
    /// session terminates inside `on_close_attempted`.
    pub fn close_window(self, session: &SessionController) {
        match session.on_close_attempted() {
            CloseRequest::NeedsDecision => {
                let mut exit_prompt = self.exit_prompt;
                exit_prompt.set(true);
            }
            CloseRequest::Busy => {
                self.notify("Wait for the current save or load to finish before quitting.");
            }
            CloseRequest::Terminated => {}
        }
        self.refresh();
    }
}

/// Create the window signals and provide them to descendants.
pub fn use_ui_signals_provider() -> UiSignals {
    let tick = use_signal(|| 0_u64);
    let epoch = use_signal(|| 0_u64);
    let notice = use_signal(|| None);
    let save_prompt = use_signal(|| None);
    let load_prompt = use_signal(|| false);
    let exit_prompt = use_signal(|| false);
    use_context_provider(|| UiSignals {
        tick,
        epoch,
        notice,
        save_prompt,
        load_prompt,
        exit_prompt,
    })
}
