//! Engine events
//!
//! Events are what the surrounding page code observes: countdown telemetry,
//! capture progress, scores and the terminal feedback of each round.

use std::fmt;
use std::time::Duration;

/// Message shown when no still could be taken
pub const CAPTURE_FAILED_MESSAGE: &str = "Failed to capture image";

/// Message shown when the scoring backend could not be reached
pub const ANALYSIS_FAILED_MESSAGE: &str = "Failed to analyze. Please try again.";

/// UI-observable engine event
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Time left before capture triggers
    Countdown { remaining: Duration },
    /// Frame `current` of `total` is about to be captured
    CaptureProgress { current: u32, total: u32 },
    /// Capture progress fields were reset for the next round
    ProgressCleared,
    /// Evidence is (or is no longer) being evaluated
    Analyzing(bool),
    /// Latest score on the 0-100 scale
    ScoreUpdated(u8),
    /// Gesture accepted
    Success,
    /// Dismissable feedback for the learner
    Feedback { message: String, score: u8 },
    /// The caller paused while a capture sequence was running
    RoundCancelled,
}

impl EngineEvent {
    /// Countdown reset to a full threshold
    pub fn countdown(remaining: Duration) -> Self {
        EngineEvent::Countdown { remaining }
    }

    pub fn feedback(message: impl Into<String>, score: u8) -> Self {
        EngineEvent::Feedback {
            message: message.into(),
            score,
        }
    }

    /// Terminal events end a round from the learner's point of view
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EngineEvent::Success | EngineEvent::Feedback { .. } | EngineEvent::RoundCancelled
        )
    }
}

impl fmt::Display for EngineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineEvent::Countdown { remaining } if remaining.is_zero() => write!(f, "Sending..."),
            EngineEvent::Countdown { remaining } => {
                write!(f, "Next check: {:.1}s", remaining.as_secs_f32())
            }
            EngineEvent::CaptureProgress { current, total } => {
                write!(f, "Capturing frame {}/{}", current, total)
            }
            EngineEvent::ProgressCleared => write!(f, "Ready"),
            EngineEvent::Analyzing(true) => write!(f, "Analyzing..."),
            EngineEvent::Analyzing(false) => write!(f, "Analysis finished"),
            EngineEvent::ScoreUpdated(score) => write!(f, "Score: {}", score),
            EngineEvent::Success => write!(f, "Success!"),
            EngineEvent::Feedback { message, score } => {
                write!(f, "Score: {}/100 - {}", score, message)
            }
            EngineEvent::RoundCancelled => write!(f, "Paused"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_display() {
        assert_eq!(
            EngineEvent::countdown(Duration::from_millis(2500)).to_string(),
            "Next check: 2.5s"
        );
        assert_eq!(EngineEvent::countdown(Duration::ZERO).to_string(), "Sending...");
        assert_eq!(
            EngineEvent::CaptureProgress { current: 2, total: 3 }.to_string(),
            "Capturing frame 2/3"
        );
        assert_eq!(
            EngineEvent::feedback("Bend your index finger", 42).to_string(),
            "Score: 42/100 - Bend your index finger"
        );
    }

    #[test]
    fn test_terminal_events() {
        assert!(EngineEvent::Success.is_terminal());
        assert!(EngineEvent::feedback(CAPTURE_FAILED_MESSAGE, 0).is_terminal());
        assert!(!EngineEvent::ScoreUpdated(10).is_terminal());
        assert!(!EngineEvent::Analyzing(true).is_terminal());
    }
}
