#![forbid(unsafe_code)]

pub mod error;
pub mod sessions;
pub mod timer;

pub use quiz_core::Clock;

pub use error::{LoadError, SessionError, SubmitError};

pub use sessions::{
    Advance, NavOutcome, QuestionMarker, Session, SessionController, SessionProgress,
    SessionRunner, Step, TimerDisplay,
};
pub use timer::{TimerEvent, TimerSlot, TimerTask, spawn_countdown};
