use std::sync::Arc;

use checklist_core::model::Locale;
use dioxus::prelude::*;
use dioxus_router::Link;
use services::{SaveOutcome, SessionController};
use tracing::debug;

use crate::context::{AppContext, UiSignals};
use crate::routes::Route;
use crate::views::session_error_message;
use crate::vm::build_header;

const LOCALES: [Locale; 2] = [Locale::En, Locale::It];

async fn run_save(session: Arc<SessionController>, signals: UiSignals) {
    match session.save_with_prompt().await {
        Ok(SaveOutcome::Saved { handle }) => debug!(handle = %handle, "save flow finished"),
        Ok(SaveOutcome::Cancelled) => {}
        Err(err) => signals.notify(session_error_message("Save", &err)),
    }
    signals.refresh();
}

async fn run_locale_change(session: Arc<SessionController>, locale: Locale, signals: UiSignals) {
    if let Err(err) = session.change_locale(locale).await {
        signals.notify(session_error_message("Language change", &err));
    }
    signals.replace_progress();
}

/// OS window title with the unsaved-changes marker.
#[component]
pub fn WindowTitle() -> Element {
    let ctx = use_context::<AppContext>();
    let signals = use_context::<UiSignals>();
    let _ = (signals.tick)();
    let title = ctx.session().with_state(|state| {
        build_header(
            state.catalog(),
            state.progress(),
            state.document_label(),
            state.is_dirty(),
        )
        .window_title()
    });
    rsx! {
        document::Title { "{title}" }
    }
}

/// Progress bar, current file and the window-level actions.
#[component]
pub fn Header() -> Element {
    let ctx = use_context::<AppContext>();
    let signals = use_context::<UiSignals>();
    let _ = (signals.tick)();

    let session = ctx.session();
    let (header, locale, ready) = session.with_state(|state| {
        (
            build_header(
                state.catalog(),
                state.progress(),
                state.document_label(),
                state.is_dirty(),
            ),
            state.locale(),
            state.phase().accepts_flows(),
        )
    });
    let bar_width = format!("width: {:.1}%;", header.percentage);

    let on_save = {
        let session = ctx.session();
        move |_: MouseEvent| {
            spawn(run_save(session.clone(), signals));
        }
    };
    let mut load_prompt = signals.load_prompt;
    let on_load = move |_: MouseEvent| load_prompt.set(true);
    let on_quit = {
        let session = ctx.session();
        move |_: MouseEvent| signals.close_window(&session)
    };
    let on_locale = {
        let session = ctx.session();
        move |evt: FormEvent| {
            let Ok(locale) = evt.value().parse::<Locale>() else {
                return;
            };
            spawn(run_locale_change(session.clone(), locale, signals));
        }
    };

    rsx! {
        header { class: "app-header",
            div { class: "header-brand",
                h1 { "WSTG Checklist" }
                span {
                    class: if header.dirty { "header-file dirty" } else { "header-file" },
                    title: if header.dirty { "Unsaved changes" } else { "" },
                    "{header.document_label}"
                    if header.dirty {
                        span { class: "dirty-marker", " *" }
                    }
                }
            }
            div { class: "header-progress {header.band_class}",
                div { class: "progress-track",
                    div { class: "progress-fill", style: "{bar_width}" }
                }
                span { class: "progress-label", "{header.percentage_label}" }
                span { class: "progress-counts",
                    "{header.done} done · {header.in_progress} in progress · {header.total} total"
                }
            }
            nav { class: "header-nav",
                Link { to: Route::Checklist {}, "Checklist" }
                Link { to: Route::Sessions {}, "Saved sessions" }
            }
            div { class: "header-actions",
                select {
                    class: "header-locale",
                    title: "Checklist language",
                    disabled: !ready,
                    value: "{locale.code()}",
                    onchange: on_locale,
                    for option_locale in LOCALES {
                        option { value: "{option_locale.code()}", "{option_locale.display_name()}" }
                    }
                }
                button {
                    class: "btn btn-primary",
                    r#type: "button",
                    disabled: !ready,
                    onclick: on_save,
                    "Save"
                }
                button {
                    class: "btn",
                    r#type: "button",
                    disabled: !ready,
                    onclick: on_load,
                    "Load"
                }
                button {
                    class: "btn",
                    r#type: "button",
                    onclick: on_quit,
                    "Quit"
                }
            }
        }
    }
}
