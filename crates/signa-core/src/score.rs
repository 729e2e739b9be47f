//! Score results and round outcomes

use serde::{Deserialize, Serialize};

use crate::SignaError;

/// Message shown when the service rejects an attempt without explanation
pub const DEFAULT_RETRY_MESSAGE: &str = "Keep practicing and try again.";

/// What the scoring backend says about one attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub is_correct: bool,
    /// Similarity in [0, 1]
    pub score: f32,
    #[serde(default)]
    pub feedback: Option<String>,
}

impl ScoreResult {
    pub fn new(is_correct: bool, score: f32, feedback: Option<String>) -> Self {
        Self {
            is_correct,
            score,
            feedback,
        }
    }

    /// Score on the 0-100 display scale
    pub fn score_percent(&self) -> u8 {
        (self.score.clamp(0.0, 1.0) * 100.0).round() as u8
    }

    /// Non-blank feedback text, if any
    pub fn feedback_text(&self) -> Option<&str> {
        self.feedback
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Terminal outcome of one capture round
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Gesture accepted; the round ends without re-arming
    Success { score_percent: u8 },
    /// Gesture rejected with guidance for the learner
    Retry { feedback: String, score_percent: u8 },
    /// Capture or scoring failed; the round is abandoned
    Error(SignaError),
    /// The caller paused while frames were still being captured
    Cancelled,
}

impl Outcome {
    /// Map a scored result onto success or retry
    pub fn from_result(result: &ScoreResult) -> Self {
        let score_percent = result.score_percent();
        if result.is_correct || score_percent == 100 {
            Outcome::Success { score_percent }
        } else {
            let feedback = result
                .feedback_text()
                .unwrap_or(DEFAULT_RETRY_MESSAGE)
                .to_string();
            Outcome::Retry {
                feedback,
                score_percent,
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn is_retry(&self) -> bool {
        matches!(self, Outcome::Retry { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_is_success() {
        let outcome = Outcome::from_result(&ScoreResult::new(true, 0.3, None));
        assert_eq!(outcome, Outcome::Success { score_percent: 30 });
    }

    #[test]
    fn test_full_score_is_success() {
        let outcome = Outcome::from_result(&ScoreResult::new(false, 1.0, Some("x".into())));
        assert!(outcome.is_success());
    }

    #[test]
    fn test_rounded_full_score_is_success() {
        let outcome = Outcome::from_result(&ScoreResult::new(false, 0.996, Some("x".into())));
        assert_eq!(outcome, Outcome::Success { score_percent: 100 });

        let outcome = Outcome::from_result(&ScoreResult::new(false, 0.994, Some("x".into())));
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_retry_carries_feedback() {
        let result = ScoreResult::new(false, 0.42, Some("Raise your thumb".into()));
        assert_eq!(
            Outcome::from_result(&result),
            Outcome::Retry {
                feedback: "Raise your thumb".into(),
                score_percent: 42
            }
        );
    }

    #[test]
    fn test_blank_feedback_uses_default() {
        let result = ScoreResult::new(false, 0.1, Some("   ".into()));
        match Outcome::from_result(&result) {
            Outcome::Retry { feedback, .. } => assert_eq!(feedback, DEFAULT_RETRY_MESSAGE),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_wire_format() {
        let result: ScoreResult =
            serde_json::from_str(r#"{"isCorrect":false,"score":0.5,"feedback":"more"}"#).unwrap();
        assert_eq!(result.score_percent(), 50);
        assert_eq!(result.feedback_text(), Some("more"));

        let bare: ScoreResult = serde_json::from_str(r#"{"isCorrect":true,"score":1}"#).unwrap();
        assert!(bare.feedback.is_none());
    }

    #[test]
    fn test_score_percent_clamps() {
        assert_eq!(ScoreResult::new(false, 1.7, None).score_percent(), 100);
        assert_eq!(ScoreResult::new(false, -0.2, None).score_percent(), 0);
    }
}
