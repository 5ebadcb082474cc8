use std::collections::HashSet;

use checklist_core::model::{
    Catalog, CategoryId, CategoryStatus, ChecklistFilter, ProgressStore, TestId, TestStatus,
};
use services::{CategoryRow, StatusCounts};

use crate::vm::note_vm::note_preview;

pub const NO_DOCUMENT_LABEL: &str = "No file loaded";

#[must_use]
pub fn status_label(status: TestStatus) -> &'static str {
    match status {
        TestStatus::Pending => "Pending",
        TestStatus::InProgress => "In progress",
        TestStatus::Done => "Done",
    }
}

#[must_use]
pub fn status_class(status: TestStatus) -> &'static str {
    match status {
        TestStatus::Pending => "status-pending",
        TestStatus::InProgress => "status-progress",
        TestStatus::Done => "status-done",
    }
}

#[must_use]
pub fn category_status_class(status: CategoryStatus) -> &'static str {
    match status {
        CategoryStatus::Pending => "category-pending",
        CategoryStatus::Progress => "category-progress",
        CategoryStatus::Done => "category-done",
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HeaderVm {
    pub done: usize,
    pub in_progress: usize,
    pub total: usize,
    pub percentage: f64,
    pub percentage_label: String,
    pub band_class: String,
    pub document_label: String,
    pub dirty: bool,
}

impl HeaderVm {
    #[must_use]
    pub fn window_title(&self) -> String {
        let marker = if self.dirty { " *" } else { "" };
        format!("WSTG Checklist - {}{marker}", self.document_label)
    }
}

#[must_use]
pub fn build_header(
    catalog: &Catalog,
    progress: &ProgressStore,
    document_label: Option<&str>,
    dirty: bool,
) -> HeaderVm {
    let ids: Vec<&TestId> = catalog.tests().map(|test| &test.id).collect();
    let counts = StatusCounts::over(progress, &ids);
    let percentage = counts.percentage();
    HeaderVm {
        done: counts.done,
        in_progress: counts.in_progress,
        total: counts.total,
        percentage,
        percentage_label: format!("{percentage:.1}%"),
        band_class: format!("band-{}", counts.band().as_str()),
        document_label: document_label.unwrap_or(NO_DOCUMENT_LABEL).to_owned(),
        dirty,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestRowVm {
    pub id: TestId,
    pub name: String,
    pub status: TestStatus,
    pub status_label: &'static str,
    pub status_class: &'static str,
    pub note_preview: Option<String>,
    pub selected: bool,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryVm {
    pub id: CategoryId,
    pub name: String,
    pub status_class: &'static str,
    pub done: usize,
    pub total: usize,
    pub collapsed: bool,
    pub tests: Vec<TestRowVm>,
}

/// How a test row was clicked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowClick {
    Single,
    /// Ctrl/Cmd click.
    Toggle,
    /// Shift click, from the anchor to the clicked row.
    Range,
}

impl RowClick {
    #[must_use]
    pub fn from_modifiers(shift: bool, toggle: bool) -> Self {
        if shift {
            Self::Range
        } else if toggle {
            Self::Toggle
        } else {
            Self::Single
        }
    }
}

/// What the sidebar needs besides catalog and progress.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TreeSelection {
    pub collapsed: HashSet<CategoryId>,
    pub selected: HashSet<TestId>,
    pub active: Option<TestId>,
    pub anchor: Option<TestId>,
}

impl TreeSelection {
    pub fn click(&mut self, catalog: &Catalog, id: &TestId, kind: RowClick) {
        let range = match (kind, &self.anchor) {
            (RowClick::Range, Some(anchor)) => catalog.tests_between(anchor, id),
            _ => Vec::new(),
        };

        if !range.is_empty() {
            self.selected = range.into_iter().collect();
        } else if kind == RowClick::Toggle {
            if !self.selected.remove(id) {
                self.selected.insert(id.clone());
            }
            self.anchor = Some(id.clone());
        } else {
            self.selected = HashSet::from([id.clone()]);
            self.anchor = Some(id.clone());
        }
        self.active = Some(id.clone());
    }

    pub fn toggle_collapsed(&mut self, id: &CategoryId) {
        if !self.collapsed.remove(id) {
            self.collapsed.insert(id.clone());
        }
    }

    pub fn collapse_all(&mut self, catalog: &Catalog) {
        self.collapsed = catalog
            .categories()
            .iter()
            .map(|category| category.id.clone())
            .collect();
    }

    pub fn expand_all(&mut self) {
        self.collapsed.clear();
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
        self.anchor = self.active.clone();
    }

    /// Selected ids in catalog order.
    #[must_use]
    pub fn selected_ids(&self, catalog: &Catalog) -> Vec<TestId> {
        catalog
            .tests()
            .filter(|test| self.selected.contains(&test.id))
            .map(|test| test.id.clone())
            .collect()
    }

    /// Drop ids the catalog no longer has, e.g. after a locale change.
    pub fn retain_known(&mut self, catalog: &Catalog) {
        self.selected.retain(|id| catalog.find_test(id).is_some());
        if self
            .active
            .as_ref()
            .is_some_and(|id| catalog.find_test(id).is_none())
        {
            self.active = None;
            self.anchor = None;
        }
    }
}

/// Filtered category tree. Category counters always cover every test in the
/// category, not only the visible ones.
#[must_use]
pub fn build_category_tree(
    catalog: &Catalog,
    progress: &ProgressStore,
    filter: &ChecklistFilter,
    selection: &TreeSelection,
) -> Vec<CategoryVm> {
    filter
        .apply(catalog.categories(), progress)
        .into_iter()
        .map(|filtered| {
            let row = CategoryRow::from_category(filtered.category, progress);
            let tests = filtered
                .tests
                .into_iter()
                .map(|test| {
                    let status = progress.status(&test.id);
                    TestRowVm {
                        id: test.id.clone(),
                        name: test.name.clone(),
                        status,
                        status_label: status_label(status),
                        status_class: status_class(status),
                        note_preview: progress
                            .has_note(&test.id)
                            .then(|| note_preview(progress.note(&test.id))),
                        selected: selection.selected.contains(&test.id),
                        active: selection.active.as_ref() == Some(&test.id),
                    }
                })
                .collect();
            CategoryVm {
                id: row.id,
                name: row.name,
                status_class: category_status_class(row.status),
                done: row.counts.done,
                total: row.counts.total,
                collapsed: selection.collapsed.contains(&filtered.category.id),
                tests,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use checklist_core::model::{CatalogTest, Category};

    fn test(id: &str, name: &str) -> CatalogTest {
        CatalogTest {
            id: TestId::new(id),
            name: name.to_owned(),
            reference: String::new(),
            objectives: Vec::new(),
        }
    }

    fn catalog() -> Catalog {
        Catalog::from_categories(vec![
            Category {
                id: CategoryId::new("WSTG-INFO"),
                name: "Information Gathering".into(),
                tests: vec![
                    test("WSTG-INFO-01", "Search Engine Discovery"),
                    test("WSTG-INFO-02", "Fingerprint Web Server"),
                    test("WSTG-INFO-03", "Review Webserver Metafiles"),
                ],
            },
            Category {
                id: CategoryId::new("WSTG-CRYP"),
                name: "Cryptography".into(),
                tests: vec![test("WSTG-CRYP-01", "Weak Transport Layer Security")],
            },
        ])
    }

    #[test]
    fn header_reports_counts_band_and_label() {
        let mut progress = ProgressStore::new();
        progress.set_status(TestId::new("WSTG-INFO-01"), TestStatus::Done);
        progress.set_status(TestId::new("WSTG-INFO-02"), TestStatus::InProgress);

        let header = build_header(&catalog(), &progress, None, true);
        assert_eq!(header.done, 1);
        assert_eq!(header.total, 4);
        assert_eq!(header.percentage_label, "25.0%");
        assert_eq!(header.band_class, "band-low");
        assert_eq!(header.document_label, NO_DOCUMENT_LABEL);
        assert_eq!(header.window_title(), "WSTG Checklist - No file loaded *");

        let clean = build_header(&catalog(), &progress, Some("run.json"), false);
        assert_eq!(clean.window_title(), "WSTG Checklist - run.json");
    }

    #[test]
    fn tree_counts_whole_category_even_when_filtered() {
        let mut progress = ProgressStore::new();
        progress.set_status(TestId::new("WSTG-INFO-01"), TestStatus::Done);
        progress.set_note(TestId::new("WSTG-INFO-01"), "<p>robots.txt</p>");
        let filter = ChecklistFilter {
            query: "search".into(),
            ..ChecklistFilter::default()
        };
        let selection = TreeSelection {
            active: Some(TestId::new("WSTG-INFO-01")),
            ..TreeSelection::default()
        };

        let tree = build_category_tree(&catalog(), &progress, &filter, &selection);
        assert_eq!(tree.len(), 1);
        let info = &tree[0];
        assert_eq!(info.tests.len(), 1);
        assert_eq!(info.total, 3);
        assert_eq!(info.done, 1);
        assert_eq!(info.status_class, "category-progress");
        let row = &info.tests[0];
        assert_eq!(row.note_preview.as_deref(), Some("robots.txt"));
        assert!(row.active);
        assert!(!row.selected);
        assert_eq!(row.status_label, "Done");
        assert_eq!(row.status_class, "status-done");
    }

    #[test]
    fn collapsed_and_selected_flags_follow_selection() {
        let progress = ProgressStore::new();
        let mut selection = TreeSelection::default();
        selection.collapsed.insert(CategoryId::new("WSTG-CRYP"));
        selection.selected.insert(TestId::new("WSTG-INFO-02"));

        let tree = build_category_tree(
            &catalog(),
            &progress,
            &ChecklistFilter::default(),
            &selection,
        );
        assert!(!tree[0].collapsed);
        assert!(tree[1].collapsed);
        assert!(tree[0].tests[1].selected);
        assert_eq!(tree[1].status_class, "category-pending");
        assert!(tree[0].tests[0].note_preview.is_none());
    }

    #[test]
    fn clicks_select_single_toggle_and_range() {
        let catalog = catalog();
        let id = |raw: &str| TestId::new(raw);
        let mut selection = TreeSelection::default();

        selection.click(&catalog, &id("WSTG-INFO-02"), RowClick::Single);
        selection.click(&catalog, &id("WSTG-CRYP-01"), RowClick::Range);
        assert_eq!(
            selection.selected_ids(&catalog),
            [id("WSTG-INFO-02"), id("WSTG-INFO-03"), id("WSTG-CRYP-01")]
        );
        assert_eq!(selection.active, Some(id("WSTG-CRYP-01")));

        selection.click(&catalog, &id("WSTG-INFO-03"), RowClick::Toggle);
        assert_eq!(
            selection.selected_ids(&catalog),
            [id("WSTG-INFO-02"), id("WSTG-CRYP-01")]
        );

        selection.click(&catalog, &id("WSTG-INFO-01"), RowClick::Single);
        assert_eq!(selection.selected_ids(&catalog), [id("WSTG-INFO-01")]);
    }

    #[test]
    fn range_without_anchor_selects_one() {
        let catalog = catalog();
        let mut selection = TreeSelection::default();
        selection.click(&catalog, &TestId::new("WSTG-INFO-03"), RowClick::Range);
        assert_eq!(
            selection.selected_ids(&catalog),
            [TestId::new("WSTG-INFO-03")]
        );
        assert_eq!(RowClick::from_modifiers(true, true), RowClick::Range);
        assert_eq!(RowClick::from_modifiers(false, true), RowClick::Toggle);
    }

    #[test]
    fn collapse_all_then_expand_all() {
        let catalog = catalog();
        let mut selection = TreeSelection::default();
        selection.collapse_all(&catalog);
        assert_eq!(selection.collapsed.len(), 2);
        selection.toggle_collapsed(&CategoryId::new("WSTG-INFO"));
        assert!(!selection.collapsed.contains(&CategoryId::new("WSTG-INFO")));
        selection.expand_all();
        assert!(selection.collapsed.is_empty());
    }

    #[test]
    fn unknown_ids_are_dropped_after_catalog_swap() {
        let mut selection = TreeSelection::default();
        selection.click(&catalog(), &TestId::new("WSTG-INFO-01"), RowClick::Single);
        selection.retain_known(&Catalog::empty());
        assert!(selection.selected.is_empty());
        assert!(selection.active.is_none());
    }
}
