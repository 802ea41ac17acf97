//! Cancellable countdown tasks.
//!
//! A countdown runs as a spawned task ticking once per second and reporting
//! over an unbounded channel. Dropping the [`TimerTask`] aborts the task, so
//! holding at most one task in a [`TimerSlot`] gives the session its
//! cancellation-on-replace rule: arming a new countdown implicitly cancels
//! the previous one, and no tick from a cancelled countdown is ever
//! delivered afterwards.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, MissedTickBehavior};
use tracing::debug;

use quiz_core::countdown::{Countdown, CountdownTick};
use quiz_core::model::TimerAlert;

/// One message from a running countdown task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// A second elapsed; time remains.
    Tick { remaining: u32, alert: TimerAlert },
    /// The countdown hit zero. Sent exactly once, then the task exits.
    Expired,
}

/// Handle to a spawned countdown task; aborts the task when dropped.
#[derive(Debug)]
pub struct TimerTask {
    handle: JoinHandle<()>,
}

impl Drop for TimerTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Spawn a task that drives `countdown` at one tick per second, reporting
/// each tick on `events` and exiting after expiry or when the receiver goes
/// away.
#[must_use]
pub fn spawn_countdown(
    mut countdown: Countdown,
    events: mpsc::UnboundedSender<TimerEvent>,
) -> TimerTask {
    let handle = tokio::spawn(async move {
        let mut interval = time::interval(Duration::from_secs(1));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first interval tick completes immediately; consume it so the
        // first countdown tick lands a full second after arming.
        interval.tick().await;

        loop {
            interval.tick().await;
            match countdown.tick() {
                CountdownTick::Running { remaining, alert } => {
                    if events.send(TimerEvent::Tick { remaining, alert }).is_err() {
                        break;
                    }
                }
                CountdownTick::Expired => {
                    debug!(target: "session", "countdown expired");
                    let _ = events.send(TimerEvent::Expired);
                    break;
                }
                CountdownTick::Idle => break,
            }
        }
    });

    TimerTask { handle }
}

/// Holds at most one live countdown task.
#[derive(Debug, Default)]
pub struct TimerSlot {
    active: Option<TimerTask>,
}

impl TimerSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `countdown`, cancelling whichever countdown was running before.
    pub fn arm(&mut self, countdown: Countdown, events: &mpsc::UnboundedSender<TimerEvent>) {
        self.active = Some(spawn_countdown(countdown, events.clone()));
    }

    /// Cancel the running countdown, if any.
    pub fn disarm(&mut self) {
        self.active = None;
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.active.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn countdown_ticks_then_expires() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _task = spawn_countdown(Countdown::new(3, None, None), tx);

        assert_eq!(
            rx.recv().await,
            Some(TimerEvent::Tick {
                remaining: 2,
                alert: TimerAlert::Normal
            })
        );
        assert_eq!(
            rx.recv().await,
            Some(TimerEvent::Tick {
                remaining: 1,
                alert: TimerAlert::Normal
            })
        );
        assert_eq!(rx.recv().await, Some(TimerEvent::Expired));
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_cancels_the_previous_countdown() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut slot = TimerSlot::new();

        slot.arm(Countdown::new(100, None, None), &tx);
        slot.arm(Countdown::new(2, None, None), &tx);

        // Only the short countdown reports; nothing from the cancelled one.
        let mut seen = Vec::new();
        loop {
            match rx.recv().await.unwrap() {
                TimerEvent::Tick { remaining, .. } => seen.push(remaining),
                TimerEvent::Expired => break,
            }
        }
        assert_eq!(seen, vec![1]);
    }

    #[tokio::test(start_paused = true)]
    async fn disarm_stops_the_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut slot = TimerSlot::new();

        slot.arm(Countdown::new(60, None, None), &tx);
        assert!(slot.is_armed());
        slot.disarm();
        assert!(!slot.is_armed());

        drop(tx);
        assert_eq!(rx.recv().await, None);
    }
}
