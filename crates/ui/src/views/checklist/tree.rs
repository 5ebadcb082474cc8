use checklist_core::model::{CategoryId, ChecklistFilter, TestId, TestStatus};
use dioxus::prelude::*;

use crate::vm::{CategoryVm, RowClick, TestRowVm};

const STATUS_FILTERS: [(&str, &str); 4] = [
    ("", "All statuses"),
    ("pending", "Pending"),
    ("in-progress", "In progress"),
    ("done", "Done"),
];

#[component]
pub fn FilterBar(
    filter: ChecklistFilter,
    categories: Vec<(CategoryId, String)>,
    on_query: Callback<String>,
    on_status: Callback<Option<TestStatus>>,
    on_category: Callback<Option<CategoryId>>,
    on_collapse_all: Callback<()>,
    on_expand_all: Callback<()>,
) -> Element {
    let status_value = filter.status.map_or("", TestStatus::as_str);
    let category_value = filter
        .category
        .as_ref()
        .map_or_else(String::new, ToString::to_string);
    let has_query = !filter.query.is_empty();

    rsx! {
        div { class: "filter-bar",
            div { class: "filter-search",
                input {
                    class: "filter-search-input",
                    r#type: "text",
                    placeholder: "Search by id or name",
                    value: "{filter.query}",
                    oninput: move |evt| on_query.call(evt.value()),
                    onkeydown: move |evt| {
                        if matches!(evt.data.key(), Key::Escape) {
                            evt.prevent_default();
                            on_query.call(String::new());
                        }
                    },
                }
                if has_query {
                    button {
                        class: "filter-search-clear",
                        r#type: "button",
                        title: "Clear search",
                        onclick: move |_| on_query.call(String::new()),
                        "×"
                    }
                }
            }
            div { class: "filter-controls",
                select {
                    class: "filter-select",
                    title: "Filter by status",
                    value: "{status_value}",
                    onchange: move |evt| on_status.call(evt.value().parse().ok()),
                    for (value, label) in STATUS_FILTERS {
                        option { value: "{value}", "{label}" }
                    }
                }
                select {
                    class: "filter-select",
                    title: "Filter by category",
                    value: "{category_value}",
                    onchange: move |evt| {
                        let value = evt.value();
                        if value.is_empty() {
                            on_category.call(None);
                        } else {
                            on_category.call(Some(CategoryId::new(value)));
                        }
                    },
                    option { value: "", "All categories" }
                    for (id, name) in categories {
                        option { value: "{id}", "{name}" }
                    }
                }
            }
            div { class: "filter-tree-actions",
                button {
                    class: "btn btn-small",
                    r#type: "button",
                    onclick: move |_| on_collapse_all.call(()),
                    "Collapse all"
                }
                button {
                    class: "btn btn-small",
                    r#type: "button",
                    onclick: move |_| on_expand_all.call(()),
                    "Expand all"
                }
            }
        }
    }
}

#[component]
pub fn CategoryTree(
    tree: Vec<CategoryVm>,
    on_toggle_category: Callback<CategoryId>,
    on_row_click: Callback<(TestId, RowClick)>,
    on_cycle: Callback<TestId>,
) -> Element {
    rsx! {
        ul { class: "category-tree",
            for category in tree {
                CategoryNode {
                    key: "{category.id}",
                    category,
                    on_toggle_category,
                    on_row_click,
                    on_cycle,
                }
            }
        }
    }
}

#[component]
fn CategoryNode(
    category: CategoryVm,
    on_toggle_category: Callback<CategoryId>,
    on_row_click: Callback<(TestId, RowClick)>,
    on_cycle: Callback<TestId>,
) -> Element {
    let id = category.id.clone();
    let chevron = if category.collapsed { "▸" } else { "▾" };

    rsx! {
        li { class: "category-node {category.status_class}",
            button {
                class: "category-header",
                r#type: "button",
                onclick: move |_| on_toggle_category.call(id.clone()),
                span { class: "category-chevron", "{chevron}" }
                span { class: "category-name", "{category.name}" }
                span { class: "category-count", "{category.done}/{category.total}" }
            }
            if !category.collapsed {
                ul { class: "test-list",
                    for row in category.tests {
                        TestRow { key: "{row.id}", row, on_row_click, on_cycle }
                    }
                }
            }
        }
    }
}

#[component]
fn TestRow(
    row: TestRowVm,
    on_row_click: Callback<(TestId, RowClick)>,
    on_cycle: Callback<TestId>,
) -> Element {
    let click_id = row.id.clone();
    let cycle_id = row.id.clone();
    let mut classes = vec!["test-row", row.status_class];
    if row.selected {
        classes.push("selected");
    }
    if row.active {
        classes.push("active");
    }
    let class = classes.join(" ");
    let note_title = row.note_preview.clone().unwrap_or_default();

    rsx! {
        li {
            class: "{class}",
            onclick: move |evt| {
                let modifiers = evt.data.modifiers();
                let kind = RowClick::from_modifiers(
                    modifiers.contains(Modifiers::SHIFT),
                    modifiers.contains(Modifiers::CONTROL) || modifiers.contains(Modifiers::META),
                );
                on_row_click.call((click_id.clone(), kind));
            },
            button {
                class: "status-chip {row.status_class}",
                r#type: "button",
                title: "Change status",
                onclick: move |evt| {
                    evt.stop_propagation();
                    on_cycle.call(cycle_id.clone());
                },
                "{row.status_label}"
            }
            span { class: "test-id", "{row.id}" }
            span { class: "test-name", "{row.name}" }
            if row.note_preview.is_some() {
                span { class: "test-note-marker", title: "{note_title}", "✎" }
            }
        }
    }
}
