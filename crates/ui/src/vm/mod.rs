mod checklist_vm;
mod detail_vm;
mod note_vm;
mod session_list_vm;
mod time_fmt;

pub use checklist_vm::{
    CategoryVm, HeaderVm, NO_DOCUMENT_LABEL, RowClick, TestRowVm, TreeSelection,
    build_category_tree, build_header, category_status_class, status_class, status_label,
};
pub use detail_vm::{ClassificationVm, InfoSectionVm, TestDetailVm, build_test_detail};
pub use note_vm::{
    html_to_markdown, looks_like_html, markdown_to_html, normalize_markdown, note_for_editing,
    note_for_storage, note_preview, sanitize_html, strip_html_tags,
};
pub use session_list_vm::{SavedSessionVm, map_saved_sessions};
pub use time_fmt::{format_datetime, format_size};
