use std::path::{Path, PathBuf};
use std::sync::Arc;

use dioxus::prelude::*;
use services::{LoadOutcome, SessionController};
use tracing::warn;

use crate::context::UiSignals;
use crate::views::session_error_message;

/// Bare names and relative paths are looked up in the saves folder.
fn resolve_input(data_dir: &Path, input: &str) -> Option<PathBuf> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    let path = PathBuf::from(trimmed);
    Some(if path.is_absolute() {
        path
    } else {
        data_dir.join(path)
    })
}

/// Read a progress file picked by the user and hand its bytes to the
/// session. The error is the notice text to show.
pub(crate) async fn load_file(
    session: &SessionController,
    data_dir: &Path,
    input: &str,
) -> Result<LoadOutcome, String> {
    let Some(path) = resolve_input(data_dir, input) else {
        return Err("Load failed: no file was given.".to_owned());
    };
    let bytes = tokio::fs::read(&path).await.map_err(|err| {
        warn!(path = %path.display(), error = %err, "could not read progress file");
        format!("Load failed: could not read {}: {err}.", path.display())
    })?;
    let label = path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    );
    session
        .load_from_bytes(&label, &bytes)
        .await
        .map_err(|err| session_error_message("Load", &err))
}

pub(crate) async fn run_load(
    session: Arc<SessionController>,
    data_dir: PathBuf,
    input: String,
    signals: UiSignals,
) {
    match load_file(&session, &data_dir, &input).await {
        Ok(_) => signals.replace_progress(),
        Err(message) => {
            signals.notify(message);
            signals.refresh();
        }
    }
}

#[component]
pub fn LoadDialog(
    dirty: bool,
    on_confirm: Callback<String>,
    on_cancel: Callback<()>,
) -> Element {
    let mut path = use_signal(String::new);
    let blank = path.read().trim().is_empty();

    rsx! {
        div {
            class: "modal-overlay",
            onclick: move |_| on_cancel.call(()),
            div {
                class: "modal",
                onclick: move |evt| evt.stop_propagation(),
                h3 { class: "modal-title", "Load progress" }
                p { class: "modal-body",
                    "Path of a progress file. Bare names are looked up in the saves folder."
                }
                if dirty {
                    p { class: "modal-body modal-warning",
                        "Loading replaces your unsaved changes."
                    }
                }
                input {
                    class: "modal-input",
                    r#type: "text",
                    placeholder: "wstg-progress.json",
                    value: "{path}",
                    oninput: move |evt| path.set(evt.value()),
                    onkeydown: move |evt| match evt.data.key() {
                        Key::Enter if !blank => on_confirm.call(path()),
                        Key::Escape => on_cancel.call(()),
                        _ => {}
                    },
                }
                div { class: "modal-actions",
                    button {
                        class: "btn modal-cancel",
                        r#type: "button",
                        onclick: move |_| on_cancel.call(()),
                        "Cancel"
                    }
                    button {
                        class: "btn btn-primary",
                        r#type: "button",
                        disabled: blank,
                        onclick: move |_| on_confirm.call(path()),
                        "Load"
                    }
                }
            }
        }
    }
}
