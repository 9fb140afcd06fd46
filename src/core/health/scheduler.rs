//! Notification debounce.
//!
//! A two-state machine (`Quiet` / `Alerting`) deciding once per cycle whether
//! the verdict is sent. Rules, in priority order:
//!
//! 1. nothing was sent for longer than the resend interval: send (heartbeat)
//! 2. the verdict is bad: send, every cycle while it stays bad
//! 3. the previous verdict was bad and this one is good: send once (recovery)
//! 4. otherwise skip

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::evaluator::Verdict;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertState {
    Quiet,
    Alerting,
}

/// Why a report goes out this cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SendReason {
    Heartbeat,
    Breach,
    Recovery,
}

impl std::fmt::Display for SendReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SendReason::Heartbeat => write!(f, "heartbeat"),
            SendReason::Breach => write!(f, "breach"),
            SendReason::Recovery => write!(f, "recovery"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Send(SendReason),
    Skip,
}

impl Decision {
    pub fn should_send(&self) -> bool {
        matches!(self, Decision::Send(_))
    }
}

/// Process-lifetime scheduler state, never persisted.
///
/// `last_sent_at` is monotonic; `None` means nothing was sent since startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationState {
    pub last_sent_at: Option<Instant>,
    pub was_bad: bool,
}

impl NotificationState {
    pub fn alert_state(&self) -> AlertState {
        if self.was_bad {
            AlertState::Alerting
        } else {
            AlertState::Quiet
        }
    }
}

/// The transition function: current state plus this cycle's verdict gives
/// the decision and the next state.
pub fn decide(
    state: &NotificationState,
    verdict_ok: bool,
    now: Instant,
    resend_interval: Duration,
) -> (Decision, NotificationState) {
    let heartbeat_due = match state.last_sent_at {
        None => true,
        Some(sent) => now.saturating_duration_since(sent) > resend_interval,
    };

    let decision = if heartbeat_due {
        Decision::Send(SendReason::Heartbeat)
    } else if !verdict_ok {
        Decision::Send(SendReason::Breach)
    } else if state.was_bad {
        Decision::Send(SendReason::Recovery)
    } else {
        Decision::Skip
    };

    let next = NotificationState {
        last_sent_at: if decision.should_send() {
            Some(now)
        } else {
            state.last_sent_at
        },
        was_bad: !verdict_ok,
    };

    (decision, next)
}

/// Owns the [`NotificationState`] for the monitoring loop.
#[derive(Debug, Clone)]
pub struct NotificationScheduler {
    resend_interval: Duration,
    state: NotificationState,
}

impl NotificationScheduler {
    pub fn new(resend_interval: Duration) -> Self {
        Self {
            resend_interval,
            state: NotificationState::default(),
        }
    }

    pub fn state(&self) -> NotificationState {
        self.state
    }

    pub fn alert_state(&self) -> AlertState {
        self.state.alert_state()
    }

    /// Decide for this cycle and commit the resulting state.
    pub fn observe(&mut self, verdict: &Verdict, now: Instant) -> Decision {
        let (decision, next) = decide(&self.state, verdict.ok, now, self.resend_interval);

        if next.alert_state() != self.state.alert_state() {
            log::info!(
                "Health state changed: {:?} -> {:?}",
                self.state.alert_state(),
                next.alert_state()
            );
        }

        self.state = next;
        decision
    }
}
