//! Pure countdown state machine, ticked once per second by a driver.
//!
//! The countdown itself knows nothing about clocks or tasks; callers decide
//! when a second has elapsed and call [`Countdown::tick`]. Once expired, a
//! countdown stays expired and further ticks report [`CountdownTick::Idle`],
//! so a late or duplicated tick can never fire the expiry action twice.

use crate::model::TimerAlert;

/// Outcome of a single one-second tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    /// Time remains; carries the new remaining seconds and the alert level.
    Running { remaining: u32, alert: TimerAlert },
    /// This tick consumed the last second. Reported exactly once.
    Expired,
    /// The countdown had already expired; nothing changed.
    Idle,
}

/// A one-tick-per-second countdown with optional alert thresholds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
    warn_below: Option<u32>,
    danger_below: Option<u32>,
    expired: bool,
}

impl Countdown {
    /// Creates a countdown of `budget_secs` seconds.
    ///
    /// `warn_below` and `danger_below` are inclusive remaining-seconds
    /// thresholds for [`TimerAlert::Warning`] and [`TimerAlert::Danger`].
    #[must_use]
    pub fn new(budget_secs: u32, warn_below: Option<u32>, danger_below: Option<u32>) -> Self {
        Self {
            remaining: budget_secs,
            warn_below,
            danger_below,
            expired: false,
        }
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Alert level for the current remaining time.
    #[must_use]
    pub fn alert(&self) -> TimerAlert {
        if let Some(threshold) = self.danger_below {
            if self.remaining <= threshold {
                return TimerAlert::Danger;
            }
        }
        if let Some(threshold) = self.warn_below {
            if self.remaining <= threshold {
                return TimerAlert::Warning;
            }
        }
        TimerAlert::Normal
    }

    /// Consume one second.
    pub fn tick(&mut self) -> CountdownTick {
        if self.expired {
            return CountdownTick::Idle;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.expired = true;
            return CountdownTick::Expired;
        }

        CountdownTick::Running {
            remaining: self.remaining,
            alert: self.alert(),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_counts_down_to_expiry_once() {
        let mut countdown = Countdown::new(3, None, None);

        assert_eq!(
            countdown.tick(),
            CountdownTick::Running {
                remaining: 2,
                alert: TimerAlert::Normal
            }
        );
        assert_eq!(
            countdown.tick(),
            CountdownTick::Running {
                remaining: 1,
                alert: TimerAlert::Normal
            }
        );
        assert_eq!(countdown.tick(), CountdownTick::Expired);
        assert!(countdown.is_expired());
    }

    #[test]
    fn ticks_after_expiry_are_idle() {
        let mut countdown = Countdown::new(1, None, None);
        assert_eq!(countdown.tick(), CountdownTick::Expired);

        for _ in 0..5 {
            assert_eq!(countdown.tick(), CountdownTick::Idle);
        }
        assert_eq!(countdown.remaining(), 0);
    }

    #[test]
    fn sixty_second_budget_expires_on_the_sixtieth_tick() {
        let mut countdown = Countdown::new(60, Some(60), Some(30));

        let mut expired_at = None;
        for tick in 1..=61 {
            if countdown.tick() == CountdownTick::Expired {
                assert!(expired_at.is_none());
                expired_at = Some(tick);
            }
        }
        assert_eq!(expired_at, Some(60));
    }

    #[test]
    fn alert_thresholds_are_inclusive() {
        let countdown = Countdown::new(60, Some(60), Some(30));
        assert_eq!(countdown.alert(), TimerAlert::Warning);

        let countdown = Countdown::new(61, Some(60), Some(30));
        assert_eq!(countdown.alert(), TimerAlert::Normal);

        let countdown = Countdown::new(30, Some(60), Some(30));
        assert_eq!(countdown.alert(), TimerAlert::Danger);
    }
}
