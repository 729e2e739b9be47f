//! Error types for the capture engine

use std::time::Duration;

use thiserror::Error;

/// Core Signa errors
///
/// Payloads are plain strings so an error can be carried inside a terminal
/// round outcome and cloned into UI events.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignaError {
    // Capture errors
    #[error("Capture unavailable: {0}")]
    CaptureUnavailable(String),

    #[error("Capture aborted after {captured} of {expected} frames")]
    PartialCapture { captured: u32, expected: u32 },

    #[error("Image encoding failed: {0}")]
    Encoding(String),

    // Lesson errors
    #[error("Invalid lesson id: {0:?}")]
    InvalidLessonId(String),

    #[error("Lesson info unavailable: {0}")]
    LessonInfo(String),

    #[error("Invalid capture plan: {0}")]
    InvalidPlan(String),

    #[error("Invalid reference pose: {0}")]
    InvalidReferencePose(String),

    // Scoring errors
    #[error("Scoring service error: {0}")]
    ScoringService(String),

    #[error("Scoring service timed out after {0:?}")]
    ScoringTimeout(Duration),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Runtime errors
    #[error("Engine has stopped")]
    EngineStopped,
}

impl SignaError {
    /// Capture failures abort the round but leave the session usable
    pub fn is_capture_failure(&self) -> bool {
        matches!(
            self,
            SignaError::CaptureUnavailable(_) | SignaError::PartialCapture { .. } | SignaError::Encoding(_)
        )
    }

    /// Failures worth retrying on the next round without user changes
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            SignaError::InvalidLessonId(_) | SignaError::Config(_) | SignaError::EngineStopped
        )
    }
}

/// Result type for Signa operations
pub type SignaResult<T> = Result<T, SignaError>;
