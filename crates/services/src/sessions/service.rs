use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

use quiz_core::model::{
    AnswerId, Question, QuestionId, Selection, TestId, TimerConfig,
};

use super::progress::SessionProgress;
use crate::error::SessionError;

//
// ─── NAVIGATION OUTCOMES ───────────────────────────────────────────────────────
//

/// Result of a `go_to`/`retreat` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// The index was out of range (or the session is complete); nothing
    /// changed.
    Unchanged,
    /// The session now shows the question at `index`. In per-question timer
    /// mode the caller restarts the countdown on this outcome.
    Moved { index: usize },
}

/// Result of an `advance` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved forward to the question at `index`.
    Moved { index: usize },
    /// Already on the last question; the attempt should be finished instead.
    AtEnd,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory state for one test attempt.
///
/// Owns the ordered question list, the per-question answer selections and the
/// current position. The question list is immutable for the session lifetime
/// and the timer mode is fixed at construction. All mutation happens through
/// the methods below; network and timers live in the layers above.
pub struct Session {
    test_id: TestId,
    questions: Vec<Question>,
    selections: BTreeMap<QuestionId, Selection>,
    current: usize,
    timer: TimerConfig,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Create a new session over an ordered question list.
    ///
    /// `started_at` should come from the services layer clock to keep time
    /// deterministic.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no questions are provided.
    pub fn new(
        test_id: TestId,
        questions: Vec<Question>,
        timer: TimerConfig,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }

        Ok(Self {
            test_id,
            questions,
            selections: BTreeMap::new(),
            current: 0,
            timer,
            started_at,
            completed_at: None,
        })
    }

    // Accessors
    #[must_use]
    pub fn test_id(&self) -> TestId {
        self.test_id
    }

    #[must_use]
    pub fn timer(&self) -> TimerConfig {
        self.timer
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Index of the question currently shown. Always within
    /// `0..question_count()`.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The question currently shown.
    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    #[must_use]
    pub fn question(&self, question_id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id() == question_id)
    }

    /// The recorded selection for a question, if any interaction happened.
    #[must_use]
    pub fn selection(&self, question_id: QuestionId) -> Option<&Selection> {
        self.selections.get(&question_id)
    }

    /// Number of questions with a non-empty selection.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.selections.values().filter(|s| !s.is_empty()).count()
    }

    /// Returns a summary of the current session progress.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.question_count(),
            answered: self.answered_count(),
            current_index: self.current,
            is_complete: self.is_complete(),
        }
    }

    /// Record an answer toggle for a question.
    ///
    /// Single-select questions replace their selection regardless of
    /// `checked`; multi-select questions add or remove `answer_id`. Repeating
    /// the same call is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` after a successful finish,
    /// `SessionError::UnknownQuestion` when the question is not part of this
    /// session and `SessionError::UnknownAnswer` when the answer id does not
    /// belong to the question.
    pub fn select_answer(
        &mut self,
        question_id: QuestionId,
        answer_id: AnswerId,
        checked: bool,
    ) -> Result<(), SessionError> {
        if self.is_complete() {
            return Err(SessionError::Completed);
        }
        let question = self
            .question(question_id)
            .ok_or(SessionError::UnknownQuestion(question_id))?;
        if !question.has_answer(answer_id) {
            return Err(SessionError::UnknownAnswer {
                question: question_id,
                answer: answer_id,
            });
        }
        let multiple = question.is_multiple();

        self.selections
            .entry(question_id)
            .or_default()
            .apply(answer_id, checked, multiple);
        Ok(())
    }

    /// Move to the question at `index`. Out-of-range indices (and completed
    /// sessions) leave everything untouched.
    pub fn go_to(&mut self, index: usize) -> NavOutcome {
        if self.is_complete() || index >= self.questions.len() {
            return NavOutcome::Unchanged;
        }
        self.current = index;
        NavOutcome::Moved { index }
    }

    /// Move forward one question, or report that the session is on its last
    /// question and should be finished.
    pub fn advance(&mut self) -> Advance {
        if !self.is_complete() && self.current + 1 < self.questions.len() {
            self.current += 1;
            Advance::Moved {
                index: self.current,
            }
        } else {
            Advance::AtEnd
        }
    }

    /// Move back one question; a no-op at index zero.
    pub fn retreat(&mut self) -> NavOutcome {
        if self.current == 0 {
            return NavOutcome::Unchanged;
        }
        self.go_to(self.current - 1)
    }

    /// The submission payload: one entry per question, in question order,
    /// empty when unanswered.
    #[must_use]
    pub fn answers_payload(&self) -> BTreeMap<QuestionId, Vec<AnswerId>> {
        self.questions
            .iter()
            .map(|q| {
                let chosen = self
                    .selections
                    .get(&q.id())
                    .map(Selection::ids)
                    .unwrap_or_default();
                (q.id(), chosen)
            })
            .collect()
    }

    pub(crate) fn mark_completed(&mut self, at: DateTime<Utc>) {
        self.completed_at = Some(at);
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("test_id", &self.test_id)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("answered", &self.answered_count())
            .field("timer", &self.timer)
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
