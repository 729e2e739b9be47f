//! Capture plans - how many evidence frames a lesson needs

use std::time::Duration;

/// Spacing between frames of a multi-frame capture
pub const MULTI_FRAME_INTERVAL: Duration = Duration::from_millis(1500);

/// Per-lesson capture configuration
///
/// `frame_count` is at least 1. A single-frame plan always has a zero interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapturePlan {
    frame_count: u32,
    interval: Duration,
}

impl CapturePlan {
    /// Single still, no spacing
    pub const fn single() -> Self {
        Self {
            frame_count: 1,
            interval: Duration::ZERO,
        }
    }

    /// Plan for a frame count using the fixed spacing policy.
    ///
    /// A count of zero is treated as one.
    pub fn from_frame_count(frame_count: u32) -> Self {
        Self::with_interval(frame_count, MULTI_FRAME_INTERVAL)
    }

    /// Plan with explicit spacing; ignored for single-frame plans
    pub fn with_interval(frame_count: u32, interval: Duration) -> Self {
        let frame_count = frame_count.max(1);
        let interval = if frame_count > 1 {
            interval
        } else {
            Duration::ZERO
        };
        Self {
            frame_count,
            interval,
        }
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_sequence(&self) -> bool {
        self.frame_count > 1
    }
}

impl Default for CapturePlan {
    fn default() -> Self {
        Self::single()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_has_no_interval() {
        let plan = CapturePlan::with_interval(1, Duration::from_secs(9));
        assert_eq!(plan, CapturePlan::single());
        assert!(!plan.is_sequence());
    }

    #[test]
    fn test_multi_frame_policy() {
        let plan = CapturePlan::from_frame_count(3);
        assert_eq!(plan.frame_count(), 3);
        assert_eq!(plan.interval(), Duration::from_millis(1500));
        assert!(plan.is_sequence());
    }

    #[test]
    fn test_zero_frames_is_single() {
        assert_eq!(CapturePlan::from_frame_count(0), CapturePlan::single());
    }
}
