use storage::repository::{DocumentHandle, DocumentSummary};

use crate::vm::time_fmt::{format_datetime, format_size};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavedSessionVm {
    pub handle: DocumentHandle,
    pub label: String,
    pub modified_str: String,
    pub size_str: String,
    pub is_current: bool,
}

/// Rows for the saved-session browser, in the order the session returns them.
#[must_use]
pub fn map_saved_sessions(
    items: &[DocumentSummary],
    current_label: Option<&str>,
) -> Vec<SavedSessionVm> {
    items
        .iter()
        .map(|item| {
            let label = item.handle.label().to_owned();
            SavedSessionVm {
                is_current: current_label == Some(label.as_str()),
                handle: item.handle.clone(),
                label,
                modified_str: format_datetime(item.last_modified),
                size_str: format_size(item.size),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use checklist_core::time::fixed_now;

    #[test]
    fn rows_use_labels_and_flag_the_open_document() {
        let items = vec![
            DocumentSummary {
                handle: DocumentHandle::new("/saves/b.json"),
                size: 2048,
                last_modified: fixed_now(),
            },
            DocumentSummary {
                handle: DocumentHandle::new("/saves/a.json"),
                size: 10,
                last_modified: fixed_now(),
            },
        ];
        let rows = map_saved_sessions(&items, Some("a.json"));
        assert_eq!(rows[0].label, "b.json");
        assert_eq!(rows[0].size_str, "2.0 KiB");
        assert!(!rows[0].is_current);
        assert!(rows[1].is_current);
    }
}
