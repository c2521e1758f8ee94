//! Hold-to-complete countdown
//!
//! Three states: `Idle` (not holding), `Holding` (green accuracy sustained,
//! counting down), `Completed` (terminal). Any observation below the hold
//! floor while holding resets the countdown to the full duration; partial
//! credit for a near-complete hold is deliberately not kept.
//!
//! Remaining time derives from elapsed wall-clock milliseconds against the
//! hold start, never from frame counts. [`Countdown::tick`] lets the owner
//! advance the state between frames, so a hold can complete even when no
//! new frame arrives.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::scoring::ColorBand;

/// Minimum accuracy that sustains a hold
pub const HOLD_ACCURACY_FLOOR: f32 = 70.0;

/// Lifecycle transition surfaced to clients, at most one per observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEvent {
    /// Accuracy first reached the hold floor; countdown started
    HoldingStarted,
    /// Accuracy dropped during a hold; countdown reset to full duration
    HoldingReset,
    /// The pose was held for the full duration
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownState {
    Idle,
    Holding {
        /// Clock reading when the current hold began
        started_ms: u64,
    },
    Completed,
}

/// Countdown for one session's hold
#[derive(Debug)]
pub struct Countdown {
    duration_ms: u64,
    state: CountdownState,
}

impl Countdown {
    pub fn new(duration_secs: u32) -> Self {
        Self {
            duration_ms: u64::from(duration_secs) * 1000,
            state: CountdownState::Idle,
        }
    }

    /// Feed one evaluation result into the state machine.
    ///
    /// Returns the transition this observation caused, if any. `Completed`
    /// is emitted exactly once; afterwards the countdown ignores input.
    pub fn observe(&mut self, accuracy: f32, color: ColorBand, now_ms: u64) -> Option<SessionEvent> {
        let qualifies = color == ColorBand::Green && accuracy >= HOLD_ACCURACY_FLOOR;

        match self.state {
            CountdownState::Completed => None,
            CountdownState::Idle => {
                if qualifies {
                    self.state = CountdownState::Holding { started_ms: now_ms };
                    debug!(accuracy, "hold started");
                    Some(SessionEvent::HoldingStarted)
                } else {
                    None
                }
            }
            CountdownState::Holding { started_ms } => {
                if !qualifies {
                    self.state = CountdownState::Idle;
                    debug!(accuracy, "hold reset");
                    return Some(SessionEvent::HoldingReset);
                }
                if now_ms.saturating_sub(started_ms) >= self.duration_ms {
                    self.state = CountdownState::Completed;
                    debug!("hold completed");
                    return Some(SessionEvent::Completed);
                }
                None
            }
        }
    }

    /// Advance the countdown on wall-clock time alone.
    ///
    /// Completes an in-progress hold whose duration has elapsed even though
    /// no frame arrived to observe it.
    pub fn tick(&mut self, now_ms: u64) -> Option<SessionEvent> {
        if let CountdownState::Holding { started_ms } = self.state {
            if now_ms.saturating_sub(started_ms) >= self.duration_ms {
                self.state = CountdownState::Completed;
                debug!("hold completed on tick");
                return Some(SessionEvent::Completed);
            }
        }
        None
    }

    /// Whole seconds left in the current hold, rounded up. The configured
    /// duration while idle, zero once completed.
    pub fn remaining_secs(&self, now_ms: u64) -> u32 {
        let remaining_ms = match self.state {
            CountdownState::Idle => self.duration_ms,
            CountdownState::Completed => 0,
            CountdownState::Holding { started_ms } => self
                .duration_ms
                .saturating_sub(now_ms.saturating_sub(started_ms)),
        };
        remaining_ms.div_ceil(1000) as u32
    }

    pub fn is_holding(&self) -> bool {
        matches!(self.state, CountdownState::Holding { .. })
    }

    pub fn is_completed(&self) -> bool {
        self.state == CountdownState::Completed
    }

    pub fn state(&self) -> CountdownState {
        self.state
    }
}
