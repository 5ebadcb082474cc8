use std::sync::Arc;

use dioxus::desktop::tao::event::{Event, WindowEvent};
use dioxus::desktop::{use_window, use_wry_event_handler};
use dioxus::prelude::*;
use dioxus_router::Router;
use tracing::{error, info};

use crate::context::{AppContext, UiSignals, use_ui_signals_provider};
use crate::routes::Route;

#[component]
pub fn App() -> Element {
    let ctx = use_context::<AppContext>();
    let signals = use_ui_signals_provider();

    let startup_ctx = ctx.clone();
    use_future(move || {
        let ctx = startup_ctx.clone();
        async move {
            if !ctx.take_startup() {
                return;
            }
            match ctx.session().start(ctx.locale_override()).await {
                Ok(report) => info!(
                    locale = %report.locale,
                    tests = report.catalog_tests,
                    source = ?report.source,
                    "session ready"
                ),
                Err(err) => {
                    error!(error = %err, "session startup failed");
                    signals.notify(format!("Startup failed: {err}"));
                }
            }
            signals.replace_progress();
        }
    });

    rsx! {
        document::Stylesheet { href: asset!("/assets/style.css") }
        NativeCloseGuard {}

        div { class: "app-root",
            ErrorBoundary {
                handle_error: |errors: ErrorContext| rsx! {
                    div { class: "fatal",
                        h1 { "Something went wrong" }
                        pre { "{errors:?}" }
                    }
                },
                Router::<Route> {}
            }
        }
    }
}

/// Routes the window frame's close button into the exit flow.
///
/// The window is configured to hide instead of closing, so the event loop
/// never tears it down on its own. When the session needs a decision, or
/// the close is refused with a notice, the window is shown again.
#[component]
fn NativeCloseGuard() -> Element {
    let ctx = use_context::<AppContext>();
    let signals = use_context::<UiSignals>();
    let desktop = use_window();

    let shell = ctx.shell();
    let window_id = desktop.window.id();
    use_wry_event_handler(move |event, _| {
        if let Event::WindowEvent {
            window_id: id,
            event: WindowEvent::CloseRequested,
            ..
        } = event
        {
            if *id == window_id {
                shell.request_close();
            }
        }
    });

    let shown = Arc::clone(&desktop.window);
    use_effect(move || {
        let has_notice = signals.notice.read().is_some();
        if (signals.exit_prompt)() || has_notice {
            shown.set_visible(true);
            shown.set_focus();
        }
    });

    rsx! {}
}
