mod controller;
mod progress;
mod service;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use controller::{SessionController, Step};
pub use progress::SessionProgress;
pub use service::{Advance, NavOutcome, Session};
pub use view::{QuestionMarker, TimerDisplay};
pub use workflow::SessionRunner;
