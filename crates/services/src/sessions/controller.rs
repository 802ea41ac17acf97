use std::fmt;
use tokio::sync::mpsc;

use quiz_core::model::{
    Answer, AnswerId, QuestionId, ScoreReport, TestId, TimerConfig, TimerMode,
};

use super::service::{Advance, NavOutcome, Session};
use super::workflow::SessionRunner;
use crate::error::SessionError;
use crate::timer::{TimerEvent, TimerSlot};

/// What a controller operation did to the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Nothing changed (out-of-range navigation, tick on a finished session).
    Stayed,
    /// The session moved to the question at `index`.
    Moved { index: usize },
    /// The attempt was submitted; carries the authoritative score.
    Finished(ScoreReport),
}

/// Event-driven shell around one session.
///
/// Owns the session state, the runner and the single timer slot, and routes
/// every input (user commands and timer events alike) through one place so
/// state mutation stays on the caller's event loop. Exactly one countdown is
/// live at a time: arming the slot for a new question cancels the previous
/// countdown, which is what makes per-question navigation safe.
///
/// Countdown events arrive on the receiver handed out by [`Self::start`];
/// the embedding event loop feeds them back through
/// [`Self::handle_timer_event`].
pub struct SessionController {
    runner: SessionRunner,
    session: Session,
    timer: TimerSlot,
    events_tx: mpsc::UnboundedSender<TimerEvent>,
    report: Option<ScoreReport>,
}

impl SessionController {
    /// Load the test and begin the attempt, arming the configured timer.
    ///
    /// Returns the controller together with the countdown-event receiver for
    /// the caller's event loop.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Load` when the question fetch fails and
    /// `SessionError::Empty` when the test has no questions.
    pub async fn start(
        runner: SessionRunner,
        test_id: TestId,
        timer: TimerConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<TimerEvent>), SessionError> {
        let session = runner.start(test_id, timer).await?;
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let mut controller = Self {
            runner,
            session,
            timer: TimerSlot::new(),
            events_tx,
            report: None,
        };
        controller.arm_timer();
        Ok((controller, events_rx))
    }

    fn arm_timer(&mut self) {
        if let Some(countdown) = self.session.timer().countdown() {
            self.timer.arm(countdown, &self.events_tx);
        }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The score report once the attempt has been submitted successfully.
    #[must_use]
    pub fn report(&self) -> Option<&ScoreReport> {
        self.report.as_ref()
    }

    /// Record an answer toggle on the current session.
    ///
    /// # Errors
    ///
    /// See [`Session::select_answer`].
    pub fn select_answer(
        &mut self,
        question_id: QuestionId,
        answer_id: AnswerId,
        checked: bool,
    ) -> Result<(), SessionError> {
        self.session.select_answer(question_id, answer_id, checked)
    }

    /// Jump to the question at `index`; restarts the per-question countdown
    /// when that mode is active. Partial time on the old question is neither
    /// carried over nor refunded.
    pub fn go_to(&mut self, index: usize) -> Step {
        match self.session.go_to(index) {
            NavOutcome::Unchanged => Step::Stayed,
            NavOutcome::Moved { index } => {
                self.restart_question_timer();
                Step::Moved { index }
            }
        }
    }

    /// Move forward, finishing the attempt when already on the last question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Submit` when the final submission fails and
    /// `SessionError::Completed` when the session had already finished.
    pub async fn next(&mut self) -> Result<Step, SessionError> {
        match self.session.advance() {
            Advance::Moved { index } => {
                self.restart_question_timer();
                Ok(Step::Moved { index })
            }
            Advance::AtEnd => self.finish().await.map(Step::Finished),
        }
    }

    /// Move back one question; a no-op on the first.
    pub fn previous(&mut self) -> Step {
        match self.session.retreat() {
            NavOutcome::Unchanged => Step::Stayed,
            NavOutcome::Moved { index } => {
                self.restart_question_timer();
                Step::Moved { index }
            }
        }
    }

    /// Fetch the correct answers for display; selections are untouched.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Load` when the fetch fails.
    pub async fn reveal_correct_answers(
        &self,
        question_id: QuestionId,
    ) -> Result<Vec<Answer>, SessionError> {
        self.runner.reveal_correct_answers(question_id).await
    }

    /// Stop the timer and submit the attempt.
    ///
    /// On submit failure the timer stays stopped but all answers and the
    /// current position survive, so `finish` can simply be called again.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Submit` when the server call fails and
    /// `SessionError::Completed` on repeated finishes.
    pub async fn finish(&mut self) -> Result<ScoreReport, SessionError> {
        self.timer.disarm();
        let report = self.runner.finish(&mut self.session).await?;
        self.report = Some(report);
        Ok(report)
    }

    /// React to a countdown event.
    ///
    /// Ticks never mutate the session. Expiry forces `finish` in total-budget
    /// mode and auto-advances in per-question mode (finishing on the last
    /// question). Events arriving after completion are ignored, so `finish`
    /// runs at most once no matter how the attempt ended.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Submit` when an expiry-triggered submission
    /// fails.
    pub async fn handle_timer_event(&mut self, event: TimerEvent) -> Result<Step, SessionError> {
        if self.session.is_complete() {
            return Ok(Step::Stayed);
        }

        match event {
            TimerEvent::Tick { .. } => Ok(Step::Stayed),
            TimerEvent::Expired => match self.session.timer().mode() {
                TimerMode::Total => self.finish().await.map(Step::Finished),
                TimerMode::PerQuestion => self.next().await,
                TimerMode::None => Ok(Step::Stayed),
            },
        }
    }

    fn restart_question_timer(&mut self) {
        if self.session.timer().mode() == TimerMode::PerQuestion {
            self.arm_timer();
        }
    }
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("session", &self.session)
            .field("timer_armed", &self.timer.is_armed())
            .field("report", &self.report)
            .finish_non_exhaustive()
    }
}
