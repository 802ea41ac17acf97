//! Shared error types for the services crate.

use thiserror::Error;

use gateway::GatewayError;
use quiz_core::model::{AnswerId, QuestionId};

/// A question-list or correct-answer fetch failed.
///
/// Recovered at the presentation boundary: surface the message and let the
/// user retry the load.
#[derive(Debug, Error)]
#[error("failed to load from server: {source}")]
pub struct LoadError {
    #[from]
    source: GatewayError,
}

/// The final submission failed.
///
/// The session keeps all local state so the submission can be retried
/// without losing answers.
#[derive(Debug, Error)]
#[error("failed to submit attempt: {source}")]
pub struct SubmitError {
    #[from]
    source: GatewayError,
}

/// Errors emitted by session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    Empty,

    #[error("session already completed")]
    Completed,

    #[error("unknown question: {0}")]
    UnknownQuestion(QuestionId),

    #[error("question {question} has no answer option {answer}")]
    UnknownAnswer {
        question: QuestionId,
        answer: AnswerId,
    },

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Submit(#[from] SubmitError),
}
