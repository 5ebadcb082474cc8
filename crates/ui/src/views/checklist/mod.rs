mod detail;
mod tree;
mod view;

pub use view::ChecklistView;
