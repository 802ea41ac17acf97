use std::sync::Arc;
use tracing::{debug, info, warn};

use gateway::{Submission, TestGateway};
use quiz_core::Clock;
use quiz_core::model::{Answer, QuestionId, ScoreReport, TestId, TimerConfig};
use quiz_core::time::elapsed_seconds;

use super::service::Session;
use crate::error::{LoadError, SessionError, SubmitError};

/// Orchestrates session start, answer reveals and final submission against
/// the server gateway.
#[derive(Clone)]
pub struct SessionRunner {
    clock: Clock,
    gateway: Arc<dyn TestGateway>,
}

impl SessionRunner {
    #[must_use]
    pub fn new(clock: Clock, gateway: Arc<dyn TestGateway>) -> Self {
        Self { clock, gateway }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Fetch the question list and build a fresh session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Load` when the fetch fails and
    /// `SessionError::Empty` when the test has no questions; in both cases no
    /// session exists and the caller may retry.
    pub async fn start(
        &self,
        test_id: TestId,
        timer: TimerConfig,
    ) -> Result<Session, SessionError> {
        let questions = self
            .gateway
            .fetch_questions(test_id)
            .await
            .map_err(LoadError::from)?;
        let session = Session::new(test_id, questions, timer, self.clock.now())?;
        info!(
            target: "session",
            %test_id,
            questions = session.question_count(),
            mode = ?timer.mode(),
            "session started"
        );
        Ok(session)
    }

    /// Fetch the authoritative correct-answer set for one question.
    ///
    /// Display-only: never touches recorded selections or scoring.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Load` when the fetch fails.
    pub async fn reveal_correct_answers(
        &self,
        question_id: QuestionId,
    ) -> Result<Vec<Answer>, SessionError> {
        debug!(target: "session", %question_id, "revealing correct answers");
        let answers = self
            .gateway
            .fetch_correct_answers(question_id)
            .await
            .map_err(LoadError::from)?;
        Ok(answers)
    }

    /// Submit the attempt and mark the session complete.
    ///
    /// On failure the session is left untouched so the submission can be
    /// retried without losing answers.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` when the session already finished
    /// and `SessionError::Submit` when the server call fails.
    pub async fn finish(&self, session: &mut Session) -> Result<ScoreReport, SessionError> {
        if session.is_complete() {
            return Err(SessionError::Completed);
        }

        let now = self.clock.now();
        let submission = Submission {
            test_id: session.test_id(),
            answers: session.answers_payload(),
            time_spent_secs: elapsed_seconds(session.started_at(), now),
        };

        let report = match self.gateway.submit(&submission).await {
            Ok(report) => report,
            Err(e) => {
                warn!(target: "session", test_id = %session.test_id(), error = %e, "submission failed; session kept for retry");
                return Err(SubmitError::from(e).into());
            }
        };

        session.mark_completed(now);
        info!(
            target: "session",
            test_id = %session.test_id(),
            score = report.score(),
            total = report.total(),
            "session finished"
        );
        Ok(report)
    }
}
