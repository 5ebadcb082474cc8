//! Presentation-agnostic progress projection over the catalog.

use checklist_core::model::{
    Catalog, Category, CategoryId, CategoryStatus, ProgressStore, TestId, TestStatus,
};

/// Colour band of the overall progress bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressBand {
    Low,
    Medium,
    High,
}

impl ProgressBand {
    #[must_use]
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage < 33.0 {
            Self::Low
        } else if percentage < 66.0 {
            Self::Medium
        } else {
            Self::High
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Counters over a set of tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub done: usize,
    pub in_progress: usize,
    pub total: usize,
}

impl StatusCounts {
    #[must_use]
    pub fn over(progress: &ProgressStore, ids: &[&TestId]) -> Self {
        Self {
            done: progress.count_by_status(ids.iter().copied(), TestStatus::Done),
            in_progress: progress.count_by_status(ids.iter().copied(), TestStatus::InProgress),
            total: ids.len(),
        }
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.total - self.done - self.in_progress
    }

    /// Completed share in percent, `0.0` for an empty set.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.done as f64 / self.total as f64 * 100.0
    }

    #[must_use]
    pub fn band(&self) -> ProgressBand {
        ProgressBand::from_percentage(self.percentage())
    }
}

/// One row of the category sidebar.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryRow {
    pub id: CategoryId,
    pub name: String,
    pub status: CategoryStatus,
    pub counts: StatusCounts,
}

impl CategoryRow {
    #[must_use]
    pub fn from_category(category: &Category, progress: &ProgressStore) -> Self {
        let ids: Vec<&TestId> = category.test_ids().collect();
        Self {
            id: category.id.clone(),
            name: category.name.clone(),
            status: progress.category_status(ids.iter().copied()),
            counts: StatusCounts::over(progress, &ids),
        }
    }
}

/// Whole-checklist summary used by the header and the sidebar.
#[derive(Clone, Debug, PartialEq)]
pub struct ChecklistSummary {
    pub totals: StatusCounts,
    pub categories: Vec<CategoryRow>,
}

impl ChecklistSummary {
    #[must_use]
    pub fn build(catalog: &Catalog, progress: &ProgressStore) -> Self {
        let ids: Vec<&TestId> = catalog.tests().map(|test| &test.id).collect();
        Self {
            totals: StatusCounts::over(progress, &ids),
            categories: catalog
                .categories()
                .iter()
                .map(|category| CategoryRow::from_category(category, progress))
                .collect(),
        }
    }
}
