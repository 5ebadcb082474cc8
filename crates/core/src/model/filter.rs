use crate::model::catalog::{CatalogTest, Category};
use crate::model::ids::CategoryId;
use crate::model::progress::ProgressStore;
use crate::model::status::TestStatus;

/// Search and narrowing criteria for the checklist tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChecklistFilter {
    pub query: String,
    pub category: Option<CategoryId>,
    pub status: Option<TestStatus>,
}

/// A category with the subset of its tests that passed the filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilteredCategory<'a> {
    pub category: &'a Category,
    pub tests: Vec<&'a CatalogTest>,
}

impl ChecklistFilter {
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.query.trim().is_empty() || self.category.is_some() || self.status.is_some()
    }

    /// Case-insensitive match on test id or name.
    #[must_use]
    pub fn matches_query(&self, test: &CatalogTest) -> bool {
        let query = self.query.trim();
        if query.is_empty() {
            return true;
        }
        let needle = query.to_lowercase();
        test.id.as_str().to_lowercase().contains(&needle)
            || test.name.to_lowercase().contains(&needle)
    }

    /// Filter categories against the current progress. Categories that end up
    /// without tests are dropped, except when no test-level criterion is set.
    #[must_use]
    pub fn apply<'a>(
        &self,
        categories: &'a [Category],
        progress: &ProgressStore,
    ) -> Vec<FilteredCategory<'a>> {
        let narrows_tests = self.status.is_some() || !self.query.trim().is_empty();

        categories
            .iter()
            .filter(|category| self.category.as_ref().is_none_or(|id| &category.id == id))
            .filter_map(|category| {
                let tests: Vec<&CatalogTest> = category
                    .tests
                    .iter()
                    .filter(|test| self.status.is_none_or(|s| progress.status(&test.id) == s))
                    .filter(|test| self.matches_query(test))
                    .collect();
                if narrows_tests && tests.is_empty() {
                    None
                } else {
                    Some(FilteredCategory { category, tests })
                }
            })
            .collect()
    }
}
