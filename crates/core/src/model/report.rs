use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReportError {
    #[error("score ({score}) exceeds total ({total})")]
    ScoreExceedsTotal { score: u32, total: u32 },

    #[error("percentage must be a finite value in 0..=100")]
    InvalidPercentage,
}

/// Authoritative scoring result for a finished session.
///
/// The server owns grading; the client only carries these values through to
/// presentation. The percentage is kept as reported (two decimals at the
/// source) rather than recomputed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreReport {
    score: u32,
    total: u32,
    percentage: f64,
}

impl ScoreReport {
    /// Creates a report from server-reported values.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::ScoreExceedsTotal` when the score is larger than
    /// the question count, or `ReportError::InvalidPercentage` when the
    /// percentage is not a finite value in 0..=100.
    pub fn new(score: u32, total: u32, percentage: f64) -> Result<Self, ReportError> {
        if score > total {
            return Err(ReportError::ScoreExceedsTotal { score, total });
        }
        if !percentage.is_finite() || !(0.0..=100.0).contains(&percentage) {
            return Err(ReportError::InvalidPercentage);
        }

        Ok(Self {
            score,
            total,
            percentage,
        })
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn percentage(&self) -> f64 {
        self.percentage
    }
}
