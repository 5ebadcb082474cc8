mod checklist;
mod header;
mod loading;
mod modals;
mod sessions;
mod state;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use checklist::ChecklistView;
pub use header::{Header, WindowTitle};
pub use loading::LoadDialog;
pub use modals::{ExitDialog, MessageModal, SaveDialog, WindowOverlays};
pub use sessions::SessionsView;
pub use state::{ViewError, ViewState, session_error_message, view_state_from_resource};
