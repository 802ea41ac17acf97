use thiserror::Error;

use crate::countdown::Countdown;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TimerError {
    #[error("total time budget must be at least {MIN_TOTAL_BUDGET_SECS} seconds")]
    InvalidTotalBudget,

    #[error("per-question budget must be between 5 and 600 seconds")]
    InvalidQuestionBudget,
}

//
// ─── MODE & ALERTS ─────────────────────────────────────────────────────────────
//

/// Countdown discipline for one session. Chosen before start, never changed
/// mid-session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMode {
    /// No countdown; the session ends only via an explicit finish.
    None,
    /// One countdown spanning the whole session.
    Total,
    /// A countdown restarted on every question change.
    PerQuestion,
}

/// Presentation-only urgency level derived from the remaining time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAlert {
    Normal,
    Warning,
    Danger,
}

/// Total-budget mode shows a warning at one minute remaining.
pub const TOTAL_WARNING_SECS: u32 = 60;
/// Total-budget mode escalates to danger at thirty seconds remaining.
pub const TOTAL_DANGER_SECS: u32 = 30;
/// Per-question mode goes straight to danger in the last ten seconds.
pub const QUESTION_DANGER_SECS: u32 = 10;

/// Default per-question budget when none is configured.
pub const DEFAULT_QUESTION_BUDGET_SECS: u32 = 60;

/// Smallest accepted total budget.
pub const MIN_TOTAL_BUDGET_SECS: u32 = 30;

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

/// Validated timer configuration for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    mode: TimerMode,
    budget_secs: u32,
}

impl TimerConfig {
    /// No countdown at all.
    #[must_use]
    pub fn none() -> Self {
        Self {
            mode: TimerMode::None,
            budget_secs: 0,
        }
    }

    /// One countdown of `budget_secs` spanning the whole session.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::InvalidTotalBudget` for budgets under
    /// `MIN_TOTAL_BUDGET_SECS`.
    pub fn total(budget_secs: u32) -> Result<Self, TimerError> {
        if budget_secs < MIN_TOTAL_BUDGET_SECS {
            return Err(TimerError::InvalidTotalBudget);
        }
        Ok(Self {
            mode: TimerMode::Total,
            budget_secs,
        })
    }

    /// A per-question countdown of `budget_secs`, restarted on every
    /// question change.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::InvalidQuestionBudget` for budgets outside
    /// 5..=600 seconds.
    pub fn per_question(budget_secs: u32) -> Result<Self, TimerError> {
        if !(5..=600).contains(&budget_secs) {
            return Err(TimerError::InvalidQuestionBudget);
        }
        Ok(Self {
            mode: TimerMode::PerQuestion,
            budget_secs,
        })
    }

    /// Per-question mode with the default sixty-second budget.
    #[must_use]
    pub fn per_question_default() -> Self {
        Self {
            mode: TimerMode::PerQuestion,
            budget_secs: DEFAULT_QUESTION_BUDGET_SECS,
        }
    }

    #[must_use]
    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    /// Configured budget in seconds; zero when the mode is `None`.
    #[must_use]
    pub fn budget_secs(&self) -> u32 {
        self.budget_secs
    }

    /// Build the countdown this configuration calls for, with the
    /// mode-appropriate alert thresholds. `None` when no timer is configured.
    #[must_use]
    pub fn countdown(&self) -> Option<Countdown> {
        match self.mode {
            TimerMode::None => None,
            TimerMode::Total => Some(Countdown::new(
                self.budget_secs,
                Some(TOTAL_WARNING_SECS),
                Some(TOTAL_DANGER_SECS),
            )),
            TimerMode::PerQuestion => Some(Countdown::new(
                self.budget_secs,
                None,
                Some(QUESTION_DANGER_SECS),
            )),
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self::none()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
