#![forbid(unsafe_code)]

pub mod dirty;
pub mod error;
pub mod model;
pub mod time;

pub use dirty::DirtyTracker;
pub use error::Error;
pub use time::Clock;
