use dioxus::prelude::*;
use services::SessionError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    Unknown,
    TimedOut,
    Storage,
}

impl ViewError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Unknown => "Something went wrong. Please try again.",
            Self::TimedOut => "Storage did not answer in time. Please try again.",
            Self::Storage => "Saved sessions could not be read.",
        }
    }
}

impl From<&SessionError> for ViewError {
    fn from(err: &SessionError) -> Self {
        match err {
            SessionError::TimedOut => Self::TimedOut,
            SessionError::Io(_) | SessionError::DocumentNotFound => Self::Storage,
            _ => Self::Unknown,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

#[must_use]
pub fn view_state_from_resource<T: Clone>(
    resource: Resource<Result<T, ViewError>>,
) -> ViewState<T> {
    match resource.state().cloned() {
        UseResourceState::Pending => ViewState::Loading,
        UseResourceState::Ready => match resource.value().read().as_ref() {
            Some(Ok(data)) => ViewState::Ready(data.clone()),
            Some(Err(err)) => ViewState::Error(*err),
            None => ViewState::Error(ViewError::Unknown),
        },
        UseResourceState::Paused | UseResourceState::Stopped => ViewState::Idle,
    }
}

/// Notification text for a failed save, load or locale flow.
#[must_use]
pub fn session_error_message(action: &str, err: &SessionError) -> String {
    match err {
        SessionError::Busy => "Another save or load is still running.".to_owned(),
        SessionError::NotReady => "The checklist is still loading.".to_owned(),
        SessionError::DocumentCorrupt(_) => {
            format!("{action} failed: the file is not a valid progress document.")
        }
        other => format!("{action} failed: {other}."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_errors_map_to_messages() {
        assert_eq!(
            session_error_message("Save", &SessionError::Busy),
            "Another save or load is still running."
        );
        assert_eq!(
            session_error_message("Load", &SessionError::DocumentCorrupt("eof".into())),
            "Load failed: the file is not a valid progress document."
        );
        assert_eq!(
            session_error_message("Save", &SessionError::Io("denied".into())),
            "Save failed: i/o error: denied."
        );
        assert_eq!(ViewError::from(&SessionError::TimedOut), ViewError::TimedOut);
    }
}
