//! Startup, save, load and exit orchestration around one progress session.

mod controller;
mod state;

pub use controller::{
    CloseRequest, DEFAULT_GATEWAY_TIMEOUT, ExitDecision, ExitOutcome, LoadOutcome, RestoreSource,
    SaveOutcome, SessionConfig, SessionController, StartupReport,
};
pub use state::{SessionPhase, SessionState};
