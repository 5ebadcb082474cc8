use checklist_core::model::{CategoryId, ChecklistFilter, TestId, TestStatus};
use dioxus::prelude::*;
use services::SessionPhase;

use super::detail::{DetailTab, TestDetail};
use super::tree::{CategoryTree, FilterBar};
use crate::context::{AppContext, UiSignals};
use crate::vm::{RowClick, TreeSelection, build_category_tree, build_test_detail};

fn empty_catalog_message(phase: SessionPhase) -> &'static str {
    match phase {
        SessionPhase::Idle | SessionPhase::LoadingCatalog | SessionPhase::RestoringProgress => {
            "Loading checklist..."
        }
        _ => "No checklist is available for this language.",
    }
}

#[component]
pub fn ChecklistView() -> Element {
    let ctx = use_context::<AppContext>();
    let signals = use_context::<UiSignals>();
    let epoch = (signals.epoch)();
    let _ = (signals.tick)();

    let mut filter = use_signal(ChecklistFilter::default);
    let mut selection = use_signal(TreeSelection::default);
    let mut tab = use_signal(DetailTab::default);

    let session = ctx.session();
    let catalog = session.catalog();
    let (tree, detail, phase) = session.with_state(|state| {
        let tree = build_category_tree(
            state.catalog(),
            state.progress(),
            &filter.read(),
            &selection.read(),
        );
        let detail = selection.read().active.as_ref().and_then(|id| {
            build_test_detail(state.catalog(), id).map(|vm| (vm, state.progress().status(id)))
        });
        (tree, detail, state.phase())
    });
    let categories: Vec<(CategoryId, String)> = catalog
        .categories()
        .iter()
        .map(|category| (category.id.clone(), category.name.clone()))
        .collect();
    let selected_count = selection.read().selected.len();

    // The catalog changes under the selection on a locale switch.
    let effect_session = ctx.session();
    use_effect(move || {
        let _ = (signals.epoch)();
        selection.write().retain_known(&effect_session.catalog());
    });

    let on_query = use_callback(move |query: String| filter.write().query = query);
    let on_status_filter =
        use_callback(move |status: Option<TestStatus>| filter.write().status = status);
    let on_category_filter =
        use_callback(move |category: Option<CategoryId>| filter.write().category = category);
    let on_collapse_all = {
        let session = ctx.session();
        use_callback(move |()| selection.write().collapse_all(&session.catalog()))
    };
    let on_expand_all = use_callback(move |()| selection.write().expand_all());
    let on_toggle_category =
        use_callback(move |id: CategoryId| selection.write().toggle_collapsed(&id));
    let on_row_click = {
        let session = ctx.session();
        use_callback(move |(id, kind): (TestId, RowClick)| {
            selection.write().click(&session.catalog(), &id, kind);
        })
    };
    let on_cycle = {
        let session = ctx.session();
        use_callback(move |id: TestId| {
            session.cycle_status(&id);
            signals.refresh();
        })
    };
    let on_set_status = {
        let session = ctx.session();
        use_callback(move |(id, status): (TestId, TestStatus)| {
            session.set_status(id, status);
            signals.refresh();
        })
    };
    let on_bulk = {
        let session = ctx.session();
        use_callback(move |status: TestStatus| {
            let ids = selection.read().selected_ids(&session.catalog());
            session.set_many_status(ids, status);
            signals.refresh();
        })
    };
    let on_open_link = {
        let opener = ctx.link_opener();
        use_callback(move |url: String| opener.open_url(&url))
    };

    if catalog.is_empty() {
        return rsx! {
            div { class: "page checklist-empty",
                p { "{empty_catalog_message(phase)}" }
            }
        };
    }

    rsx! {
        div { class: "page checklist",
            aside { class: "checklist-sidebar",
                FilterBar {
                    filter: filter(),
                    categories,
                    on_query,
                    on_status: on_status_filter,
                    on_category: on_category_filter,
                    on_collapse_all,
                    on_expand_all,
                }
                if selected_count > 1 {
                    div { class: "bulk-bar",
                        span { class: "bulk-count", "{selected_count} selected" }
                        button {
                            class: "btn btn-small",
                            r#type: "button",
                            onclick: move |_| on_bulk.call(TestStatus::Done),
                            "Mark done"
                        }
                        button {
                            class: "btn btn-small",
                            r#type: "button",
                            onclick: move |_| on_bulk.call(TestStatus::InProgress),
                            "Mark in progress"
                        }
                        button {
                            class: "btn btn-small",
                            r#type: "button",
                            onclick: move |_| on_bulk.call(TestStatus::Pending),
                            "Reset"
                        }
                        button {
                            class: "btn btn-small btn-link",
                            r#type: "button",
                            onclick: move |_| selection.write().clear_selection(),
                            "Clear"
                        }
                    }
                }
                if tree.is_empty() {
                    p { class: "tree-empty", "No tests match the current filter." }
                } else {
                    CategoryTree {
                        tree,
                        on_toggle_category,
                        on_row_click,
                        on_cycle,
                    }
                }
            }
            div { class: "checklist-detail",
                if let Some((detail, status)) = detail {
                    TestDetail {
                        detail,
                        status,
                        tab: tab(),
                        epoch,
                        on_tab: move |next| tab.set(next),
                        on_status: on_set_status,
                        on_open_link,
                    }
                } else {
                    p { class: "detail-placeholder", "Select a test to see its guidance and notes." }
                }
            }
        }
    }
}
