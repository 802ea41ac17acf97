mod ids;
mod question;
mod report;
mod selection;
mod timer;

pub use ids::{AnswerId, ParseIdError, QuestionId, TestId};

pub use question::{Answer, Question, QuestionError};
pub use report::{ReportError, ScoreReport};
pub use selection::Selection;
pub use timer::{TimerAlert, TimerConfig, TimerError, TimerMode};
