use std::sync::Arc;

use dioxus::prelude::*;
use services::ExitDecision;

use crate::context::{AppContext, UiSignals};
use crate::views::loading::{LoadDialog, run_load};
use crate::views::session_error_message;

#[component]
pub fn SaveDialog(
    suggested: String,
    on_confirm: Callback<String>,
    on_cancel: Callback<()>,
) -> Element {
    let mut filename = use_signal(|| suggested.clone());
    let blank = filename.read().trim().is_empty();

    rsx! {
        div {
            class: "modal-overlay",
            onclick: move |_| on_cancel.call(()),
            div {
                class: "modal",
                onclick: move |evt| evt.stop_propagation(),
                h3 { class: "modal-title", "Save progress" }
                p { class: "modal-body", "File name in the saves folder:" }
                input {
                    class: "modal-input",
                    r#type: "text",
                    value: "{filename}",
                    oninput: move |evt| filename.set(evt.value()),
                    onkeydown: move |evt| match evt.data.key() {
                        Key::Enter if !blank => on_confirm.call(filename()),
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
                        onclick: move |_| on_confirm.call(filename()),
                        "Save"
                    }
                }
            }
        }
    }
}

#[component]
pub fn ExitDialog(
    on_save: Callback<()>,
    on_discard: Callback<()>,
    on_cancel: Callback<()>,
) -> Element {
    rsx! {
        div {
            class: "modal-overlay",
            onclick: move |_| on_cancel.call(()),
            div {
                class: "modal",
                onclick: move |evt| evt.stop_propagation(),
                h3 { class: "modal-title", "Unsaved changes" }
                p { class: "modal-body",
                    "Your progress has changed since it was last saved. Save before quitting?"
                }
                div { class: "modal-actions",
                    button {
                        class: "btn modal-cancel",
                        r#type: "button",
                        onclick: move |_| on_cancel.call(()),
                        "Keep Working"
                    }
                    button {
                        class: "btn modal-danger",
                        r#type: "button",
                        onclick: move |_| on_discard.call(()),
                        "Quit Without Saving"
                    }
                    button {
                        class: "btn btn-primary",
                        r#type: "button",
                        onclick: move |_| on_save.call(()),
                        "Save and Quit"
                    }
                }
            }
        }
    }
}

#[component]
pub fn MessageModal(message: String, on_close: Callback<()>) -> Element {
    rsx! {
        div {
            class: "modal-overlay",
            onclick: move |_| on_close.call(()),
            div {
                class: "modal",
                onclick: move |evt| evt.stop_propagation(),
                p { class: "modal-body", "{message}" }
                div { class: "modal-actions",
                    button {
                        class: "btn btn-primary",
                        r#type: "button",
                        onclick: move |_| on_close.call(()),
                        "OK"
                    }
                }
            }
        }
    }
}

/// Save prompt, exit confirmation and notices, wired to the session.
#[component]
pub fn WindowOverlays() -> Element {
    let ctx = use_context::<AppContext>();
    let signals = use_context::<UiSignals>();
    let mut save_prompt = signals.save_prompt;
    let mut load_prompt = signals.load_prompt;
    let mut exit_prompt = signals.exit_prompt;
    let mut notice = signals.notice;

    let prompt_shell = ctx.shell();
    use_future(move || {
        let shell = Arc::clone(&prompt_shell);
        let mut save_prompt = signals.save_prompt;
        async move {
            loop {
                let suggested = shell.next_prompt().await;
                save_prompt.set(Some(suggested));
            }
        }
    });

    let close_shell = ctx.shell();
    let close_session = ctx.session();
    use_future(move || {
        let shell = Arc::clone(&close_shell);
        let session = Arc::clone(&close_session);
        async move {
            loop {
                shell.next_close_request().await;
                signals.close_window(&session);
            }
        }
    });

    let confirm_save = {
        let shell = ctx.shell();
        use_callback(move |filename: String| {
            shell.answer_prompt(&filename);
            save_prompt.set(None);
        })
    };
    let cancel_save = {
        let shell = ctx.shell();
        use_callback(move |()| {
            shell.cancel_prompt();
            save_prompt.set(None);
        })
    };

    let confirm_load = {
        let session = ctx.session();
        let shell = ctx.shell();
        use_callback(move |input: String| {
            load_prompt.set(false);
            spawn(run_load(
                session.clone(),
                shell.data_dir().to_path_buf(),
                input,
                signals,
            ));
        })
    };

    let resolve_exit = {
        let session = ctx.session();
        use_callback(move |decision: ExitDecision| {
            exit_prompt.set(false);
            let session = session.clone();
            spawn(async move {
                if let Err(err) = session.resolve_exit(decision).await {
                    signals.notify(session_error_message("Save", &err));
                }
                signals.refresh();
            });
        })
    };

    let suggested = save_prompt();
    let message = notice();
    let dirty = ctx.session().is_dirty();

    rsx! {
        if let Some(suggested) = suggested {
            SaveDialog {
                suggested,
                on_confirm: confirm_save,
                on_cancel: cancel_save,
            }
        }
        if load_prompt() {
            LoadDialog {
                dirty,
                on_confirm: confirm_load,
                on_cancel: move |()| load_prompt.set(false),
            }
        }
        if exit_prompt() {
            ExitDialog {
                on_save: move |()| resolve_exit.call(ExitDecision::SaveThenExit),
                on_discard: move |()| resolve_exit.call(ExitDecision::DiscardAndExit),
                on_cancel: move |()| resolve_exit.call(ExitDecision::Cancel),
            }
        }
        if let Some(message) = message {
            MessageModal {
                message,
                on_close: move |()| notice.set(None),
            }
        }
    }
}
