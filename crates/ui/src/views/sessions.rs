use dioxus::prelude::*;
use dioxus_router::use_navigator;
use storage::repository::DocumentHandle;

use crate::context::{AppContext, UiSignals};
use crate::routes::Route;
use crate::views::{ViewError, ViewState, session_error_message, view_state_from_resource};
use crate::vm::{SavedSessionVm, map_saved_sessions};

#[derive(Clone, Debug, PartialEq)]
struct SessionsData {
    rows: Vec<SavedSessionVm>,
    dirty: bool,
}

#[component]
pub fn SessionsView() -> Element {
    let ctx = use_context::<AppContext>();
    let signals = use_context::<UiSignals>();
    let navigator = use_navigator();
    let session = ctx.session();

    let list_session = ctx.session();
    let resource = use_resource(move || {
        let session = list_session.clone();
        let _ = (signals.tick)();
        async move {
            let items = session
                .list_saved_documents()
                .await
                .map_err(|err| ViewError::from(&err))?;
            let rows = map_saved_sessions(&items, session.document_label().as_deref());
            Ok(SessionsData {
                rows,
                dirty: session.is_dirty(),
            })
        }
    });

    let on_open = use_callback(move |handle: DocumentHandle| {
        let session = session.clone();
        spawn(async move {
            match session.load_document(&handle).await {
                Ok(_) => {
                    signals.replace_progress();
                    navigator.push(Route::Checklist {});
                }
                Err(err) => {
                    signals.notify(session_error_message("Load", &err));
                    signals.refresh();
                }
            }
        });
    });

    let state = view_state_from_resource(resource);

    rsx! {
        div { class: "page sessions",
            h2 { "Saved sessions" }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(data) => rsx! {
                    if data.dirty {
                        p { class: "sessions-warning",
                            "Opening a session replaces your unsaved changes."
                        }
                    }
                    if data.rows.is_empty() {
                        p { "No saved sessions yet." }
                    } else {
                        ul { class: "sessions-list",
                            for row in data.rows {
                                SessionRow { key: "{row.handle}", row, on_open }
                            }
                        }
                    }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                },
            }
        }
    }
}

#[component]
fn SessionRow(row: SavedSessionVm, on_open: Callback<DocumentHandle>) -> Element {
    let handle = row.handle.clone();
    rsx! {
        li { class: if row.is_current { "session-row current" } else { "session-row" },
            div { class: "session-meta",
                span { class: "session-label", "{row.label}" }
                span { class: "session-date", "{row.modified_str}" }
                span { class: "session-size", "{row.size_str}" }
            }
            button {
                class: "btn session-open",
                r#type: "button",
                onclick: move |_| on_open.call(handle.clone()),
                if row.is_current { "Reopen" } else { "Open" }
            }
        }
    }
}
