use thiserror::Error;

use crate::model::{QuestionError, ReportError, TimerError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Timer(#[from] TimerError),
    #[error(transparent)]
    Report(#[from] ReportError),
}
