//! Scripted tracker - deterministic stand-in for the landmark tracker
//!
//! Publishes a fixed hand pose into a tracker feed and moves a shared
//! [`ManualClock`] forward with every tick. Tick spacing follows a period
//! with optional seeded jitter so runs are reproducible.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use signa_capture::{tracker_feed, TrackerFeed, TrackerSender};
use signa_core::{Handedness, Joint, LandmarkFrame, LandmarkPoint, SessionTime};
use signa_runtime::{Clock, ManualClock};

/// Tick timing of a scripted tracker
#[derive(Clone, Debug)]
pub struct TrackerConfig {
    /// Nominal spacing between results
    pub period_ms: u64,
    /// Maximum deviation from the period per tick
    pub jitter_ms: u64,
    /// RNG seed for jitter
    pub seed: u64,
}

impl TrackerConfig {
    pub fn new(period_ms: u64, jitter_ms: u64, seed: u64) -> Self {
        TrackerConfig {
            period_ms,
            jitter_ms,
            seed,
        }
    }

    /// One result per second, no jitter
    pub fn steady() -> Self {
        Self::new(1000, 0, 0)
    }

    /// Roughly 30 results per second with frame-time jitter
    pub fn camera() -> Self {
        Self::new(33, 8, 42)
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::steady()
    }
}

/// Joints of a plausible open hand, shifted right by `shift`
pub fn sample_joints(shift: f32) -> Vec<Joint> {
    (0..21u32)
        .map(|id| {
            let finger = id.saturating_sub(1) / 4;
            let segment = if id == 0 { 0 } else { (id - 1) % 4 + 1 };
            Joint::new(
                id,
                0.35 + finger as f32 * 0.06 + shift,
                0.75 - segment as f32 * 0.08,
            )
        })
        .collect()
}

/// Tracker frame holding one hand built from [`sample_joints`]
pub fn sample_frame(hand: Handedness, shift: f32) -> LandmarkFrame {
    let points = sample_joints(shift)
        .iter()
        .map(|j| LandmarkPoint::new(j.x, j.y, 0.0).with_visibility(1.0))
        .collect();
    LandmarkFrame::new().with_group(hand.group(), points)
}

/// Drives a tracker feed and a manual clock
pub struct ScriptedTracker {
    sender: TrackerSender,
    clock: ManualClock,
    config: TrackerConfig,
    rng: StdRng,
    frame: LandmarkFrame,
    sent: u64,
}

impl ScriptedTracker {
    /// Create a tracker and the feed the engine should watch
    pub fn new(config: TrackerConfig, clock: ManualClock) -> (Self, TrackerFeed) {
        let (sender, feed) = tracker_feed();
        let tracker = ScriptedTracker {
            sender,
            clock,
            rng: StdRng::seed_from_u64(config.seed),
            config,
            frame: sample_frame(Handedness::Right, 0.0),
            sent: 0,
        };
        (tracker, feed)
    }

    /// Replace the pose published on later ticks
    pub fn set_frame(&mut self, frame: LandmarkFrame) {
        self.frame = frame;
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    pub fn now(&self) -> SessionTime {
        self.clock.now()
    }

    /// Ticks published so far
    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Advance by one (jittered) period and publish
    pub fn tick(&mut self) -> SessionTime {
        let step = self.next_step();
        self.clock.advance(step);
        self.publish()
    }

    /// Publish at an absolute session time
    pub fn tick_at(&mut self, millis: u64) -> SessionTime {
        self.clock.set_millis(millis);
        self.publish()
    }

    /// Publish a result with no landmarks (hands out of frame)
    pub fn tick_empty(&mut self) -> SessionTime {
        let step = self.next_step();
        self.clock.advance(step);
        self.sender.send_replace(Some(LandmarkFrame::new()));
        self.sent += 1;
        self.clock.now()
    }

    /// Stop the feed; a running engine exits
    pub fn close(self) {
        drop(self.sender);
    }

    fn next_step(&mut self) -> Duration {
        let base = self.config.period_ms as i64;
        let jitter = if self.config.jitter_ms > 0 {
            let j = self.config.jitter_ms as i64;
            self.rng.gen_range(-j..=j)
        } else {
            0
        };
        Duration::from_millis((base + jitter).max(1) as u64)
    }

    fn publish(&mut self) -> SessionTime {
        self.sender.send_replace(Some(self.frame.clone()));
        self.sent += 1;
        self.clock.now()
    }
}
