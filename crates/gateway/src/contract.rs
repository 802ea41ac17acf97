use async_trait::async_trait;
use quiz_core::model::{Answer, AnswerId, Question, QuestionId, ScoreReport, TestId};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by gateway implementations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// The server answered but reported failure (`success: false`).
    #[error("server rejected the request: {0}")]
    Rejected(String),

    #[error("unexpected http status {0}")]
    Status(u16),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Everything the client sends when a session finishes.
///
/// The answer map carries an entry for every question of the test, with an
/// empty list when the question was left unanswered, so the server can record
/// a per-question audit row either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub test_id: TestId,
    pub answers: BTreeMap<QuestionId, Vec<AnswerId>>,
    pub time_spent_secs: u64,
}

/// Contract for the three server endpoints the client consumes.
///
/// The server owns question storage, grading and persistence; everything here
/// is read-only except `submit`, which hands the finished attempt over.
#[async_trait]
pub trait TestGateway: Send + Sync {
    /// Fetch the ordered question list for a test.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` when the call fails or the server reports
    /// failure.
    async fn fetch_questions(&self, test_id: TestId) -> Result<Vec<Question>, GatewayError>;

    /// Fetch the authoritative correct-answer set for one question.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` when the call fails or the server reports
    /// failure.
    async fn fetch_correct_answers(
        &self,
        question_id: QuestionId,
    ) -> Result<Vec<Answer>, GatewayError>;

    /// Submit a finished attempt and receive the authoritative score.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` when the call fails or the server reports
    /// failure.
    async fn submit(&self, submission: &Submission) -> Result<ScoreReport, GatewayError>;
}

/// In-memory gateway for tests, demos and offline runs.
///
/// Grading reproduces the server rule: one point per question whose selected
/// set equals the correct set exactly, percentage rounded to two decimals.
#[derive(Clone, Default)]
pub struct InMemoryGateway {
    tests: Arc<Mutex<HashMap<TestId, Vec<Question>>>>,
    correct: Arc<Mutex<HashMap<QuestionId, Vec<AnswerId>>>>,
}

impl InMemoryGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a test with its ordered question list.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn insert_test(&self, test_id: TestId, questions: Vec<Question>) {
        let mut guard = self.tests.lock().expect("gateway lock poisoned");
        guard.insert(test_id, questions);
    }

    /// Record the correct answer ids for one question.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_correct_answers(&self, question_id: QuestionId, answer_ids: Vec<AnswerId>) {
        let mut guard = self.correct.lock().expect("gateway lock poisoned");
        guard.insert(question_id, answer_ids);
    }

    fn find_question(&self, question_id: QuestionId) -> Option<Question> {
        let guard = self.tests.lock().ok()?;
        guard
            .values()
            .flat_map(|questions| questions.iter())
            .find(|q| q.id() == question_id)
            .cloned()
    }
}

#[async_trait]
impl TestGateway for InMemoryGateway {
    async fn fetch_questions(&self, test_id: TestId) -> Result<Vec<Question>, GatewayError> {
        let guard = self
            .tests
            .lock()
            .map_err(|e| GatewayError::Connection(e.to_string()))?;
        guard
            .get(&test_id)
            .cloned()
            .ok_or_else(|| GatewayError::Rejected(format!("unknown test {test_id}")))
    }

    async fn fetch_correct_answers(
        &self,
        question_id: QuestionId,
    ) -> Result<Vec<Answer>, GatewayError> {
        let question = self
            .find_question(question_id)
            .ok_or_else(|| GatewayError::Rejected(format!("unknown question {question_id}")))?;
        let guard = self
            .correct
            .lock()
            .map_err(|e| GatewayError::Connection(e.to_string()))?;
        let ids = guard.get(&question_id).cloned().unwrap_or_default();

        Ok(question
            .answers()
            .iter()
            .filter(|a| ids.contains(&a.id()))
            .cloned()
            .collect())
    }

    async fn submit(&self, submission: &Submission) -> Result<ScoreReport, GatewayError> {
        let total = {
            let guard = self
                .tests
                .lock()
                .map_err(|e| GatewayError::Connection(e.to_string()))?;
            let questions = guard.get(&submission.test_id).ok_or_else(|| {
                GatewayError::Rejected(format!("unknown test {}", submission.test_id))
            })?;
            u32::try_from(questions.len())
                .map_err(|_| GatewayError::Serialization("question count overflow".into()))?
        };
        if total == 0 {
            return Err(GatewayError::Rejected("test has no questions".into()));
        }

        let correct = self
            .correct
            .lock()
            .map_err(|e| GatewayError::Connection(e.to_string()))?;

        let mut score = 0_u32;
        for (question_id, chosen) in &submission.answers {
            let expected: BTreeSet<AnswerId> = correct
                .get(question_id)
                .map(|ids| ids.iter().copied().collect())
                .unwrap_or_default();
            let selected: BTreeSet<AnswerId> = chosen.iter().copied().collect();
            if expected == selected {
                score = score.saturating_add(1);
            }
        }

        let percentage =
            (f64::from(score) / f64::from(total) * 100.0 * 100.0).round() / 100.0;
        ScoreReport::new(score, total, percentage)
            .map_err(|e| GatewayError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::Answer;

    fn build_question(id: u64, multiple: bool, answer_ids: &[u64]) -> Question {
        let answers = answer_ids
            .iter()
            .map(|a| Answer::new(AnswerId::new(*a), format!("option {a}")).unwrap())
            .collect();
        Question::new(QuestionId::new(id), format!("Q{id}"), None, multiple, answers).unwrap()
    }

    fn seeded_gateway() -> InMemoryGateway {
        let gateway = InMemoryGateway::new();
        gateway.insert_test(
            TestId::new(1),
            vec![
                build_question(1, false, &[11, 12]),
                build_question(2, true, &[21, 22, 23]),
                build_question(3, false, &[31, 32]),
            ],
        );
        gateway.set_correct_answers(QuestionId::new(1), vec![AnswerId::new(11)]);
        gateway.set_correct_answers(QuestionId::new(2), vec![AnswerId::new(21), AnswerId::new(23)]);
        gateway.set_correct_answers(QuestionId::new(3), vec![AnswerId::new(32)]);
        gateway
    }

    #[tokio::test]
    async fn fetch_questions_preserves_order() {
        let gateway = seeded_gateway();
        let questions = gateway.fetch_questions(TestId::new(1)).await.unwrap();
        let ids: Vec<u64> = questions.iter().map(|q| q.id().value()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn fetch_questions_rejects_unknown_test() {
        let gateway = seeded_gateway();
        let err = gateway.fetch_questions(TestId::new(99)).await.unwrap_err();
        assert!(matches!(err, GatewayError::Rejected(_)));
    }

    #[tokio::test]
    async fn fetch_correct_answers_returns_texts() {
        let gateway = seeded_gateway();
        let correct = gateway
            .fetch_correct_answers(QuestionId::new(2))
            .await
            .unwrap();
        let ids: Vec<u64> = correct.iter().map(|a| a.id().value()).collect();
        assert_eq!(ids, vec![21, 23]);
    }

    #[tokio::test]
    async fn submit_scores_exact_set_matches() {
        let gateway = seeded_gateway();
        let mut answers = BTreeMap::new();
        // Q1 right, Q2 partially right (one of two), Q3 unanswered.
        answers.insert(QuestionId::new(1), vec![AnswerId::new(11)]);
        answers.insert(QuestionId::new(2), vec![AnswerId::new(21)]);
        answers.insert(QuestionId::new(3), Vec::new());

        let report = gateway
            .submit(&Submission {
                test_id: TestId::new(1),
                answers,
                time_spent_secs: 42,
            })
            .await
            .unwrap();

        assert_eq!(report.score(), 1);
        assert_eq!(report.total(), 3);
        assert!((report.percentage() - 33.33).abs() < 1e-9);
    }

    #[tokio::test]
    async fn submit_full_marks_rounds_to_hundred() {
        let gateway = seeded_gateway();
        let mut answers = BTreeMap::new();
        answers.insert(QuestionId::new(1), vec![AnswerId::new(11)]);
        answers.insert(QuestionId::new(2), vec![AnswerId::new(21), AnswerId::new(23)]);
        answers.insert(QuestionId::new(3), vec![AnswerId::new(32)]);

        let report = gateway
            .submit(&Submission {
                test_id: TestId::new(1),
                answers,
                time_spent_secs: 7,
            })
            .await
            .unwrap();

        assert_eq!(report.score(), 3);
        assert!((report.percentage() - 100.0).abs() < f64::EPSILON);
    }
}
