use quiz_core::model::{QuestionId, TimerAlert};
use quiz_core::time::format_clock;

use super::service::Session;

/// Presentation-agnostic state for one entry in the question-number strip.
///
/// `answered` means the recorded selection is non-empty; `current` marks the
/// question being shown. How these render (colors, badges) is up to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionMarker {
    pub index: usize,
    pub question_id: QuestionId,
    pub answered: bool,
    pub current: bool,
}

impl QuestionMarker {
    /// Markers for every question of the session, in question order.
    #[must_use]
    pub fn for_session(session: &Session) -> Vec<Self> {
        session
            .questions()
            .iter()
            .enumerate()
            .map(|(index, question)| Self {
                index,
                question_id: question.id(),
                answered: session
                    .selection(question.id())
                    .is_some_and(|s| !s.is_empty()),
                current: index == session.current_index(),
            })
            .collect()
    }
}

/// Countdown state ready for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerDisplay {
    pub remaining_secs: u32,
    pub alert: TimerAlert,
}

impl TimerDisplay {
    #[must_use]
    pub fn new(remaining_secs: u32, alert: TimerAlert) -> Self {
        Self {
            remaining_secs,
            alert,
        }
    }

    /// Zero-padded `MM:SS` rendering of the remaining time.
    #[must_use]
    pub fn clock(&self) -> String {
        format_clock(self.remaining_secs)
    }
}
