//! Recording fakes for the engine's collaborators
//!
//! Each fake records what the engine asked of it so scenarios can assert on
//! call counts and batch sizes as well as on emitted events.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use signa_capture::FrameCapture;
use signa_core::{
    Evidence, EvidenceBatch, LandmarkFrame, LessonId, ScoreResult, SignaError, SignaResult,
    StillImage,
};
use signa_scoring::{CapturePlanInfo, LessonInfo, ScoringService};

// ============================================================================
// SCORING SERVICE
// ============================================================================

/// One request seen by [`FakeScoringService`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoringCall {
    pub lesson: LessonId,
    /// Evidence frames in the batch
    pub frames: usize,
    pub landmarks: bool,
}

/// Scoring service answering from a queue of canned responses
pub struct FakeScoringService {
    queued: Mutex<VecDeque<SignaResult<ScoreResult>>>,
    fallback: SignaResult<ScoreResult>,
    delay: Duration,
    calls: Mutex<Vec<ScoringCall>>,
}

impl FakeScoringService {
    /// Answer every request with `result`
    pub fn always(result: ScoreResult) -> Self {
        Self::with_fallback(Ok(result))
    }

    /// Accept every gesture with the given 0-1 score
    pub fn accepting(score: f32) -> Self {
        Self::always(ScoreResult::new(true, score, None))
    }

    /// Reject every gesture with feedback
    pub fn rejecting(score: f32, feedback: &str) -> Self {
        Self::always(ScoreResult::new(false, score, Some(feedback.to_string())))
    }

    /// Fail every request
    pub fn failing(error: SignaError) -> Self {
        Self::with_fallback(Err(error))
    }

    fn with_fallback(fallback: SignaResult<ScoreResult>) -> Self {
        FakeScoringService {
            queued: Mutex::new(VecDeque::new()),
            fallback,
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer the next unanswered request with `result` before the fallback
    pub fn then(self, result: SignaResult<ScoreResult>) -> Self {
        self.queued.lock().push_back(result);
        self
    }

    /// Respond only after `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<ScoringCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl ScoringService for FakeScoringService {
    async fn evaluate(&self, lesson: LessonId, batch: &EvidenceBatch) -> SignaResult<ScoreResult> {
        self.calls.lock().push(ScoringCall {
            lesson,
            frames: batch.len(),
            landmarks: batch.is_landmarks(),
        });
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let next = self.queued.lock().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

// ============================================================================
// LESSON INFO
// ============================================================================

/// Lesson backend with per-lesson frame counts
pub struct FakeLessonInfo {
    plans: HashMap<LessonId, SignaResult<u32>>,
    default_frames: u32,
    calls: AtomicUsize,
}

impl FakeLessonInfo {
    /// Every lesson is single-frame unless configured otherwise
    pub fn new() -> Self {
        Self::uniform(1)
    }

    /// Every lesson uses `frames`
    pub fn uniform(frames: u32) -> Self {
        FakeLessonInfo {
            plans: HashMap::new(),
            default_frames: frames,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_plan(mut self, lesson: u32, frames: u32) -> Self {
        self.plans.insert(LessonId::new(lesson), Ok(frames));
        self
    }

    pub fn with_failure(mut self, lesson: u32, error: SignaError) -> Self {
        self.plans.insert(LessonId::new(lesson), Err(error));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for FakeLessonInfo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LessonInfo for FakeLessonInfo {
    async fn capture_plan(&self, lesson: LessonId) -> SignaResult<CapturePlanInfo> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let frames = match self.plans.get(&lesson) {
            Some(planned) => planned.clone()?,
            None => self.default_frames,
        };
        Ok(CapturePlanInfo { frame_count: frames })
    }
}

// ============================================================================
// FRAME CAPTURE
// ============================================================================

/// Frame capture producing canned evidence, optionally failing once
pub struct ScriptedCapture {
    evidence: Evidence,
    fail_at: Option<usize>,
    attempts: AtomicUsize,
}

impl ScriptedCapture {
    /// Tiny JPEG stills
    pub fn stills() -> Self {
        let jpeg = vec![0xFF, 0xD8, 0xFF, 0xD9];
        Self::of(Evidence::Image(StillImage::jpeg(jpeg, 1, 1)))
    }

    /// A fixed landmark snapshot
    pub fn landmarks(frame: LandmarkFrame) -> Self {
        Self::of(Evidence::Landmarks(frame))
    }

    fn of(evidence: Evidence) -> Self {
        ScriptedCapture {
            evidence,
            fail_at: None,
            attempts: AtomicUsize::new(0),
        }
    }

    /// Fail the capture attempt with this zero-based index
    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl FrameCapture for ScriptedCapture {
    fn capture(&self) -> SignaResult<Evidence> {
        let index = self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_at == Some(index) {
            return Err(SignaError::CaptureUnavailable(format!(
                "scripted failure at capture {}",
                index
            )));
        }
        Ok(self.evidence.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch() -> EvidenceBatch {
        EvidenceBatch::single(ScriptedCapture::stills().capture().unwrap())
    }

    #[tokio::test]
    async fn test_scoring_queue_then_fallback() {
        let scoring = FakeScoringService::accepting(0.9)
            .then(Ok(ScoreResult::new(false, 0.2, Some("Again".into()))));

        let first = scoring.evaluate(LessonId::new(3), &batch()).await.unwrap();
        assert!(!first.is_correct);
        let second = scoring.evaluate(LessonId::new(3), &batch()).await.unwrap();
        assert!(second.is_correct);

        assert_eq!(scoring.call_count(), 2);
        assert_eq!(
            scoring.calls()[0],
            ScoringCall {
                lesson: LessonId::new(3),
                frames: 1,
                landmarks: false
            }
        );
    }

    #[tokio::test]
    async fn test_failing_scoring() {
        let scoring = FakeScoringService::failing(SignaError::ScoringService("down".into()));
        assert!(scoring.evaluate(LessonId::new(1), &batch()).await.is_err());
    }

    #[tokio::test]
    async fn test_lesson_plans() {
        let lessons = FakeLessonInfo::new()
            .with_plan(4, 3)
            .with_failure(5, SignaError::LessonInfo("missing".into()));

        assert_eq!(lessons.capture_plan(LessonId::new(4)).await.unwrap().frame_count, 3);
        assert_eq!(lessons.capture_plan(LessonId::new(9)).await.unwrap().frame_count, 1);
        assert!(lessons.capture_plan(LessonId::new(5)).await.is_err());
        assert_eq!(lessons.calls(), 3);
    }

    #[test]
    fn test_capture_fails_once() {
        let capture = ScriptedCapture::stills().failing_at(1);
        assert!(capture.capture().is_ok());
        assert!(matches!(capture.capture(), Err(SignaError::CaptureUnavailable(_))));
        assert!(capture.capture().is_ok());
        assert_eq!(capture.attempts(), 3);
    }
}
