use thiserror::Error;

use crate::model::ids::{AnswerId, QuestionId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("answer text cannot be empty")]
    EmptyAnswerText,

    #[error("question must offer at least one answer")]
    NoAnswers,

    #[error("duplicate answer id: {0}")]
    DuplicateAnswerId(AnswerId),
}

//
// ─── ANSWER ────────────────────────────────────────────────────────────────────
//

/// One selectable answer option, nested under a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    id: AnswerId,
    text: String,
}

impl Answer {
    /// Creates a new Answer.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyAnswerText` if text is empty or whitespace-only.
    pub fn new(id: AnswerId, text: impl Into<String>) -> Result<Self, QuestionError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuestionError::EmptyAnswerText);
        }

        Ok(Self {
            id,
            text: text.trim().to_owned(),
        })
    }

    #[must_use]
    pub fn id(&self) -> AnswerId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// One quiz item: prompt text, optional image reference and its answer options.
///
/// Questions are fetched once at session start and are immutable for the
/// lifetime of the session. `multiple` switches selection semantics between
/// radio (at most one answer) and checkbox (any subset).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    text: String,
    image: Option<String>,
    multiple: bool,
    answers: Vec<Answer>,
}

impl Question {
    /// Creates a new Question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyText` if the prompt is empty or
    /// whitespace-only, `QuestionError::NoAnswers` if no options are given,
    /// or `QuestionError::DuplicateAnswerId` if two options share an id.
    pub fn new(
        id: QuestionId,
        text: impl Into<String>,
        image: Option<String>,
        multiple: bool,
        answers: Vec<Answer>,
    ) -> Result<Self, QuestionError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if answers.is_empty() {
            return Err(QuestionError::NoAnswers);
        }
        for (idx, answer) in answers.iter().enumerate() {
            if answers[..idx].iter().any(|a| a.id() == answer.id()) {
                return Err(QuestionError::DuplicateAnswerId(answer.id()));
            }
        }

        let image = image.map(|i| i.trim().to_owned()).filter(|i| !i.is_empty());

        Ok(Self {
            id,
            text: text.trim().to_owned(),
            image,
            multiple,
            answers,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Returns true when the question allows multiple selections.
    #[must_use]
    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    #[must_use]
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    /// Returns true when `answer_id` names one of this question's options.
    #[must_use]
    pub fn has_answer(&self, answer_id: AnswerId) -> bool {
        self.answers.iter().any(|a| a.id() == answer_id)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn build_answers(ids: &[u64]) -> Vec<Answer> {
        ids.iter()
            .map(|id| Answer::new(AnswerId::new(*id), format!("option {id}")).unwrap())
            .collect()
    }

    #[test]
    fn question_new_rejects_empty_text() {
        let err = Question::new(
            QuestionId::new(1),
            "   ",
            None,
            false,
            build_answers(&[1, 2]),
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::EmptyText);
    }

    #[test]
    fn question_new_rejects_missing_answers() {
        let err = Question::new(QuestionId::new(1), "2 + 2 = ?", None, false, Vec::new())
            .unwrap_err();
        assert_eq!(err, QuestionError::NoAnswers);
    }

    #[test]
    fn question_new_rejects_duplicate_answer_ids() {
        let answers = vec![
            Answer::new(AnswerId::new(7), "yes").unwrap(),
            Answer::new(AnswerId::new(7), "no").unwrap(),
        ];
        let err =
            Question::new(QuestionId::new(1), "Pick one", None, false, answers).unwrap_err();
        assert_eq!(err, QuestionError::DuplicateAnswerId(AnswerId::new(7)));
    }

    #[test]
    fn answer_new_rejects_empty_text() {
        let err = Answer::new(AnswerId::new(1), "  ").unwrap_err();
        assert_eq!(err, QuestionError::EmptyAnswerText);
    }

    #[test]
    fn question_trims_text_and_filters_empty_image() {
        let question = Question::new(
            QuestionId::new(3),
            "  Which planet is closest to the sun?  ",
            Some("   ".into()),
            false,
            build_answers(&[1, 2, 3]),
        )
        .unwrap();

        assert_eq!(question.text(), "Which planet is closest to the sun?");
        assert_eq!(question.image(), None);
        assert!(!question.is_multiple());
        assert_eq!(question.answers().len(), 3);
    }

    #[test]
    fn question_keeps_image_reference() {
        let question = Question::new(
            QuestionId::new(3),
            "What is shown?",
            Some("static/uploads/q3.png".into()),
            true,
            build_answers(&[1, 2]),
        )
        .unwrap();

        assert_eq!(question.image(), Some("static/uploads/q3.png"));
        assert!(question.is_multiple());
    }

    #[test]
    fn has_answer_checks_option_ids() {
        let question = Question::new(
            QuestionId::new(3),
            "Pick",
            None,
            false,
            build_answers(&[10, 20]),
        )
        .unwrap();

        assert!(question.has_answer(AnswerId::new(10)));
        assert!(!question.has_answer(AnswerId::new(30)));
    }
}
