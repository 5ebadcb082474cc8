use checklist_core::model::{TestId, TestStatus};
use dioxus::prelude::*;

use crate::context::{AppContext, UiSignals};
use crate::vm::{
    ClassificationVm, TestDetailVm, markdown_to_html, note_for_editing, note_for_storage,
    status_class, status_label,
};

const STATUSES: [TestStatus; 3] = [TestStatus::Pending, TestStatus::InProgress, TestStatus::Done];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DetailTab {
    #[default]
    Info,
    Notes,
}

#[component]
pub fn TestDetail(
    detail: TestDetailVm,
    status: TestStatus,
    tab: DetailTab,
    epoch: u64,
    on_tab: Callback<DetailTab>,
    on_status: Callback<(TestId, TestStatus)>,
    on_open_link: Callback<String>,
) -> Element {
    let note_key = format!("{epoch}-{}", detail.id);
    let reference = detail.reference.clone();

    rsx! {
        section { class: "test-detail",
            header { class: "detail-header",
                p { class: "detail-category", "{detail.category_name}" }
                h2 { class: "detail-title",
                    span { class: "detail-id", "{detail.id}" }
                    " {detail.name}"
                }
                div { class: "detail-status",
                    for option_status in STATUSES {
                        StatusButton {
                            id: detail.id.clone(),
                            status: option_status,
                            current: status == option_status,
                            on_status,
                        }
                    }
                }
                if let Some(url) = reference {
                    button {
                        class: "btn btn-link detail-reference",
                        r#type: "button",
                        onclick: move |_| on_open_link.call(url.clone()),
                        "Open WSTG reference"
                    }
                }
            }
            nav { class: "detail-tabs",
                button {
                    class: if tab == DetailTab::Info { "tab active" } else { "tab" },
                    r#type: "button",
                    onclick: move |_| on_tab.call(DetailTab::Info),
                    "Info"
                }
                button {
                    class: if tab == DetailTab::Notes { "tab active" } else { "tab" },
                    r#type: "button",
                    onclick: move |_| on_tab.call(DetailTab::Notes),
                    "Notes"
                }
            }
            match tab {
                DetailTab::Info => rsx! {
                    InfoPane { detail: detail.clone(), on_open_link }
                },
                DetailTab::Notes => rsx! {
                    NotesPane { key: "{note_key}", id: detail.id.clone() }
                },
            }
        }
    }
}

#[component]
fn StatusButton(
    id: TestId,
    status: TestStatus,
    current: bool,
    on_status: Callback<(TestId, TestStatus)>,
) -> Element {
    let class = if current {
        format!("btn status-button {} current", status_class(status))
    } else {
        format!("btn status-button {}", status_class(status))
    };
    rsx! {
        button {
            class: "{class}",
            r#type: "button",
            onclick: move |_| on_status.call((id.clone(), status)),
            "{status_label(status)}"
        }
    }
}

#[component]
fn InfoPane(detail: TestDetailVm, on_open_link: Callback<String>) -> Element {
    rsx! {
        div { class: "info-pane",
            if let Some(description) = detail.category_description.clone() {
                p { class: "category-description", "{description}" }
            }
            if !detail.objectives.is_empty() {
                div { class: "info-section",
                    h4 { "Objectives" }
                    ul {
                        for objective in detail.objectives.clone() {
                            li { "{objective}" }
                        }
                    }
                }
            }
            for section in detail.sections.clone() {
                div { class: "info-section",
                    h4 { "{section.title}" }
                    div { class: "rich-text", dangerous_inner_html: "{section.html}" }
                }
            }
            if detail.sections.is_empty() && detail.objectives.is_empty() {
                p { class: "info-empty", "No guidance available for this test." }
            }
            if !detail.classification.is_empty() {
                div { class: "info-section",
                    h4 { "OWASP Top 10" }
                    table { class: "classification-table",
                        tbody {
                            for row in detail.classification.clone() {
                                ClassificationRow { row, on_open_link }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn ClassificationRow(row: ClassificationVm, on_open_link: Callback<String>) -> Element {
    let link = row.link.clone();
    rsx! {
        tr {
            td { class: "classification-key",
                if let Some(url) = link {
                    a {
                        href: "#",
                        onclick: move |evt| {
                            evt.prevent_default();
                            on_open_link.call(url.clone());
                        },
                        "{row.key}"
                    }
                } else {
                    "{row.key}"
                }
            }
            td { "{row.description}" }
            td {
                span { class: "risk-badge {row.level_class}", "{row.level_label}" }
            }
        }
    }
}

/// Markdown editor for one test's note. Every edit goes straight to the
/// session; the draft only lives as long as this component.
#[component]
fn NotesPane(id: TestId) -> Element {
    let ctx = use_context::<AppContext>();
    let signals = use_context::<UiSignals>();
    let session = ctx.session();
    let mut draft = use_signal(|| note_for_editing(&session.note(&id)));
    let preview = markdown_to_html(&draft.read());

    rsx! {
        div { class: "notes-pane",
            textarea {
                class: "notes-editor",
                placeholder: "Findings, payloads, evidence (markdown)",
                value: "{draft}",
                oninput: move |evt| {
                    let value = evt.value();
                    session.set_note(id.clone(), note_for_storage(&value));
                    draft.set(value);
                    signals.refresh();
                },
            }
            div { class: "notes-preview rich-text", dangerous_inner_html: "{preview}" }
        }
    }
}
