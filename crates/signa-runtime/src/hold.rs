//! Hold-timer state machine
//!
//! Idle → Armed → Holding → Triggered → (Armed | Idle)
//!
//! The timer is pure: it is driven by tracker ticks carrying the current
//! session time and never reads a clock itself. It fires exactly once per
//! hold and stays in `Triggered`, ignoring ticks, until the round finishes.

use std::time::Duration;

use signa_core::SessionTime;
use tracing::debug;

/// Time the learner must hold the pose before capture
pub const DEFAULT_HOLD_THRESHOLD: Duration = Duration::from_millis(5000);

/// Hold-timer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldState {
    /// Not checking; ticks are ignored
    Idle,
    /// Checking; the next tick starts the hold
    Armed,
    /// Hold in progress since `started_at`
    Holding { started_at: SessionTime },
    /// Threshold reached; a capture round owns the engine
    Triggered,
}

/// Result of feeding one tick to the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not checking, or a round is in flight
    Ignored,
    /// Still holding; `remaining` until capture
    Holding { remaining: Duration },
    /// The threshold elapsed on this tick
    Triggered,
}

/// Hold session owner
#[derive(Debug, Clone)]
pub struct HoldTimer {
    state: HoldState,
    threshold: Duration,
    remaining: Duration,
}

impl HoldTimer {
    pub fn new(threshold: Duration) -> Self {
        Self {
            state: HoldState::Idle,
            threshold,
            remaining: threshold,
        }
    }

    pub fn state(&self) -> HoldState {
        self.state
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Last published time until capture
    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Armed or holding
    pub fn is_checking(&self) -> bool {
        matches!(self.state, HoldState::Armed | HoldState::Holding { .. })
    }

    /// Caller signalled "start checking".
    ///
    /// Only `Idle` arms; returns whether the state changed.
    pub fn start_checking(&mut self) -> bool {
        if self.state != HoldState::Idle {
            return false;
        }
        self.state = HoldState::Armed;
        self.remaining = self.threshold;
        debug!("Hold timer armed");
        true
    }

    /// Caller signalled "pause": back to `Idle` with a full threshold
    pub fn pause(&mut self) {
        if self.state != HoldState::Idle {
            debug!(from = ?self.state, "Hold timer paused");
        }
        self.state = HoldState::Idle;
        self.remaining = self.threshold;
    }

    /// Feed one tracker tick
    pub fn on_tick(&mut self, now: SessionTime) -> TickOutcome {
        match self.state {
            HoldState::Idle | HoldState::Triggered => TickOutcome::Ignored,
            HoldState::Armed => {
                self.state = HoldState::Holding { started_at: now };
                self.remaining = self.threshold;
                debug!(?now, "Hold started");
                TickOutcome::Holding {
                    remaining: self.remaining,
                }
            }
            HoldState::Holding { started_at } => {
                let elapsed = now - started_at;
                if elapsed >= self.threshold {
                    self.state = HoldState::Triggered;
                    self.remaining = Duration::ZERO;
                    debug!(?elapsed, "Hold threshold reached");
                    TickOutcome::Triggered
                } else {
                    self.remaining = self.threshold - elapsed;
                    TickOutcome::Holding {
                        remaining: self.remaining,
                    }
                }
            }
        }
    }

    /// A capture round completed; re-arm or go idle.
    ///
    /// A pause during the round has already moved the timer to `Idle`, and
    /// it stays there.
    pub fn finish_round(&mut self, rearm: bool) -> HoldState {
        if self.state == HoldState::Triggered {
            self.state = if rearm { HoldState::Armed } else { HoldState::Idle };
            self.remaining = self.threshold;
        }
        self.state
    }
}

impl Default for HoldTimer {
    fn default() -> Self {
        Self::new(DEFAULT_HOLD_THRESHOLD)
    }
}
