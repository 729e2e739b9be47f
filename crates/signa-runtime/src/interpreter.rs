//! Feedback interpreter
//!
//! Submits a complete evidence batch and maps the service's answer to a
//! round outcome. Lesson ids are validated before anything is sent; a
//! malformed id never reaches the scoring service.

use std::time::Duration;

use signa_core::{EvidenceBatch, LessonId, Outcome, SignaError};
use signa_scoring::ScoringService;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// Application-level bound on one scoring call
pub const DEFAULT_SCORING_TIMEOUT: Duration = Duration::from_secs(15);

/// Maps scoring results to outcomes
pub struct FeedbackInterpreter<S> {
    service: S,
    timeout: Duration,
}

impl<S: ScoringService> FeedbackInterpreter<S> {
    pub fn new(service: S) -> Self {
        Self::with_timeout(service, DEFAULT_SCORING_TIMEOUT)
    }

    pub fn with_timeout(service: S, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Validate a raw lesson id, then submit
    pub async fn submit(&self, lesson: &str, batch: &EvidenceBatch) -> Outcome {
        match LessonId::parse(lesson) {
            Ok(lesson) => self.submit_validated(lesson, batch).await,
            Err(e) => {
                error!(lesson, "Refusing to submit evidence for an invalid lesson id");
                Outcome::Error(e)
            }
        }
    }

    /// Submit for an already validated lesson
    pub async fn submit_validated(&self, lesson: LessonId, batch: &EvidenceBatch) -> Outcome {
        match timeout(self.timeout, self.service.evaluate(lesson, batch)).await {
            Ok(Ok(result)) => {
                let outcome = Outcome::from_result(&result);
                info!(
                    %lesson,
                    score = result.score_percent(),
                    correct = outcome.is_success(),
                    "Attempt scored"
                );
                outcome
            }
            Ok(Err(e)) => {
                warn!(%lesson, error = %e, "Scoring service failed");
                Outcome::Error(e)
            }
            Err(_) => {
                warn!(%lesson, timeout = ?self.timeout, "Scoring service timed out");
                Outcome::Error(SignaError::ScoringTimeout(self.timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use signa_core::{Evidence, ScoreResult, SignaResult, StillImage, DEFAULT_RETRY_MESSAGE};
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CannedService {
        result: SignaResult<ScoreResult>,
        delay: Duration,
        calls: AtomicU32,
    }

    impl CannedService {
        fn new(result: SignaResult<ScoreResult>) -> Self {
            Self {
                result,
                delay: Duration::ZERO,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl ScoringService for CannedService {
        async fn evaluate(&self, _lesson: LessonId, _batch: &EvidenceBatch) -> SignaResult<ScoreResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.result.clone()
        }
    }

    fn batch() -> EvidenceBatch {
        EvidenceBatch::single(Evidence::Image(StillImage::jpeg(vec![0xFF, 0xD8], 1, 1)))
    }

    #[tokio::test]
    async fn test_correct_is_success() {
        let interpreter = FeedbackInterpreter::new(CannedService::new(Ok(ScoreResult::new(true, 0.7, None))));
        assert_eq!(
            interpreter.submit("3", &batch()).await,
            Outcome::Success { score_percent: 70 }
        );
    }

    #[tokio::test]
    async fn test_full_score_is_success() {
        let interpreter = FeedbackInterpreter::new(CannedService::new(Ok(ScoreResult::new(false, 1.0, None))));
        assert!(interpreter.submit("3", &batch()).await.is_success());
    }

    #[tokio::test]
    async fn test_rejection_is_retry() {
        let interpreter = FeedbackInterpreter::new(CannedService::new(Ok(ScoreResult::new(
            false,
            0.42,
            Some("Curl your fingers".to_string()),
        ))));
        assert_eq!(
            interpreter.submit("3", &batch()).await,
            Outcome::Retry {
                feedback: "Curl your fingers".to_string(),
                score_percent: 42
            }
        );
    }

    #[tokio::test]
    async fn test_missing_feedback_still_retries() {
        let interpreter = FeedbackInterpreter::new(CannedService::new(Ok(ScoreResult::new(false, 0.1, None))));
        match interpreter.submit("3", &batch()).await {
            Outcome::Retry { feedback, score_percent } => {
                assert_eq!(feedback, DEFAULT_RETRY_MESSAGE);
                assert_eq!(score_percent, 10);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_lesson_never_calls_service() {
        let interpreter = FeedbackInterpreter::new(CannedService::new(Ok(ScoreResult::new(true, 1.0, None))));
        let outcome = interpreter.submit("abc", &batch()).await;

        assert_eq!(outcome, Outcome::Error(SignaError::InvalidLessonId("abc".to_string())));
        assert_eq!(interpreter.service().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_service_error_is_error() {
        let interpreter = FeedbackInterpreter::new(CannedService::new(Err(SignaError::ScoringService(
            "HTTP 502".to_string(),
        ))));
        assert!(interpreter.submit("3", &batch()).await.is_error());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_service_times_out() {
        let service = CannedService {
            delay: Duration::from_secs(60),
            ..CannedService::new(Ok(ScoreResult::new(true, 1.0, None)))
        };
        let interpreter = FeedbackInterpreter::with_timeout(service, Duration::from_secs(15));

        assert_eq!(
            interpreter.submit("3", &batch()).await,
            Outcome::Error(SignaError::ScoringTimeout(Duration::from_secs(15)))
        );
    }
}
