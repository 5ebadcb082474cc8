use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use checklist_core::model::{Catalog, CatalogSources, Locale};
use checklist_core::time::fixed_clock;
use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use services::{AppServices, SessionConfig, SessionController};
use storage::repository::{DocumentGateway, DocumentHandle, InMemoryRepository, Storage};

use crate::context::{UiApp, build_app_context, use_ui_signals_provider};
use crate::platform::{LinkOpenerRef, UiLinkOpener};
use crate::shell::DesktopShell;
use crate::views::{ChecklistView, Header, SessionsView, WindowOverlays};

pub const CHECKLIST: &str = r#"{"categories": {
    "Information Gathering": {"id": "WSTG-INFO", "tests": [
        {"id": "WSTG-INFO-01", "name": "Search Engine Discovery", "reference": "https://owasp.org/info-01"},
        {"id": "WSTG-INFO-02", "name": "Fingerprint Web Server"}
    ]},
    "Configuration Testing": {"id": "WSTG-CONF", "tests": [
        {"id": "WSTG-CONF-01", "name": "Network Infrastructure Configuration"},
        {"id": "WSTG-CONF-02", "name": "Application Platform Configuration"}
    ]}
}}"#;

struct NoopLinkOpener;

impl UiLinkOpener for NoopLinkOpener {
    fn open_url(&self, _url: &str) {}
}

struct TestApp {
    session: Arc<SessionController>,
    shell: Arc<DesktopShell>,
}

impl UiApp for TestApp {
    fn session(&self) -> Arc<SessionController> {
        Arc::clone(&self.session)
    }

    fn shell(&self) -> Arc<DesktopShell> {
        Arc::clone(&self.shell)
    }

    fn link_opener(&self) -> LinkOpenerRef {
        Arc::new(NoopLinkOpener)
    }

    fn locale_override(&self) -> Option<Locale> {
        None
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Checklist,
    Sessions,
    Chrome,
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_ui_signals_provider();
    use_context_provider(|| props.view);
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Checklist => rsx! { ChecklistView {} },
        ViewKind::Sessions => rsx! { SessionsView {} },
        ViewKind::Chrome => rsx! {
            Header {}
            WindowOverlays {}
        },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub repo: InMemoryRepository,
    pub session: Arc<SessionController>,
    pub shell: Arc<DesktopShell>,
    terminations: Arc<AtomicUsize>,
}

impl ViewHarness {
    pub fn terminations(&self) -> usize {
        self.terminations.load(Ordering::SeqCst)
    }

    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub fn fixture_catalog() -> Catalog {
    Catalog::from_sources(CatalogSources {
        checklist: CHECKLIST,
        category_descriptions: "{}",
        test_info: "{}",
        classification: "{}",
    })
    .expect("fixture catalog parses")
}

/// Repository with the fixture catalog and, when given, a last document.
pub async fn seeded_repo(last_document: Option<(&str, &str)>) -> InMemoryRepository {
    let repo = InMemoryRepository::new().with_clock(fixed_clock());
    repo.insert_catalog(Locale::En, fixture_catalog())
        .expect("insert catalog");
    if let Some((name, json)) = last_document {
        let handle = DocumentHandle::new(name);
        repo.insert_raw(&handle, json).expect("insert document");
        repo.remember_document(&handle).await.expect("remember");
    }
    repo
}

/// Started session over `repo`, mounted in a router for `view`.
pub async fn setup_view_harness(view: ViewKind, repo: InMemoryRepository) -> ViewHarness {
    setup_view_harness_in(view, repo, "/saves").await
}

/// Like `setup_view_harness`, with the saves folder at `data_dir`.
pub async fn setup_view_harness_in(
    view: ViewKind,
    repo: InMemoryRepository,
    data_dir: impl Into<std::path::PathBuf>,
) -> ViewHarness {
    let terminations = Arc::new(AtomicUsize::new(0));
    let shell = Arc::new(DesktopShell::new(data_dir, {
        let terminations = Arc::clone(&terminations);
        move || {
            terminations.fetch_add(1, Ordering::SeqCst);
        }
    }));
    let storage = Storage::from_repository(repo.clone());
    let services = AppServices::from_storage(
        &storage,
        fixed_clock(),
        SessionConfig::default(),
        shell.clone(),
    );
    let session = services.session();
    session.start(None).await.expect("session starts");

    let app = Arc::new(TestApp {
        session: Arc::clone(&session),
        shell: Arc::clone(&shell),
    });
    let dom = VirtualDom::new_with_props(ViewRouterHarness, ViewHarnessProps { app, view });

    ViewHarness {
        dom,
        repo,
        session,
        shell,
        terminations,
    }
}
