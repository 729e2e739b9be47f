//! End-to-end engine scenarios
//!
//! Each scenario spawns a real [`Engine`] task, drives it through a
//! [`ScriptedTracker`] and an [`EngineHandle`] the way page code would, and
//! reports what the engine did:
//! - Hold threshold and pause/re-arm behaviour
//! - Multi-frame sequencing, cancellation and capture failure
//! - Scoring outcomes, timeouts and lesson id validation
//! - Dialogue practice and client-side landmark scoring
//!
//! Scenarios are meant to run on a paused tokio clock so that flash and
//! inter-frame delays complete instantly.

use std::sync::Arc;
use std::time::Duration;

use signa_capture::{FrameCapture, LandmarkCapture, TrackerFeed};
use signa_core::{EngineEvent, Handedness, LessonId, ScoreResult, SignaError, SignaResult};
use signa_pose::{ReferencePose, TargetGesture};
use signa_runtime::{
    DialogueCursor, DialogueScript, DialogueStep, Engine, EngineConfig, EngineHandle, EngineStats,
    ManualClock,
};
use signa_scoring::{LessonInfo, LocalScoringService, ScoringService};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Instant};
use tracing::debug;

use crate::fakes::{FakeLessonInfo, FakeScoringService, ScoringCall, ScriptedCapture};
use crate::recorder::EventRecorder;
use crate::tracker::{sample_frame, sample_joints, ScriptedTracker, TrackerConfig};

/// Longest a harness waits for a round to wind down
pub const ROUND_WAIT: Duration = Duration::from_secs(60);

// ============================================================================
// SESSION HARNESS
// ============================================================================

/// What a scenario observed
#[derive(Clone, Debug, Default)]
pub struct ScenarioResult {
    pub stats: EngineStats,
    pub events: Vec<EngineEvent>,
    /// Session time (ms) of every tick published
    pub ticks: Vec<u64>,
    /// Session time (ms) of every tick that triggered a round
    pub triggers: Vec<u64>,
    /// Time from triggering tick to the end of each awaited round
    pub round_durations: Vec<Duration>,
    pub scoring_calls: Vec<ScoringCall>,
    /// Frame capture attempts
    pub captures: usize,
}

impl ScenarioResult {
    pub fn contains(&self, event: &EngineEvent) -> bool {
        self.events.contains(event)
    }

    pub fn count(&self, event: &EngineEvent) -> usize {
        self.events.iter().filter(|e| *e == event).count()
    }

    /// Lessons the scoring service was asked about, in order
    pub fn scored_lessons(&self) -> Vec<LessonId> {
        self.scoring_calls.iter().map(|c| c.lesson).collect()
    }
}

/// A running engine plus everything needed to drive and observe it
pub struct SessionHarness {
    handle: EngineHandle,
    tracker: ScriptedTracker,
    recorder: EventRecorder,
    task: JoinHandle<EngineStats>,
    ticks: Vec<u64>,
    triggers: Vec<u64>,
    round_durations: Vec<Duration>,
    round: Option<(usize, Instant)>,
}

impl SessionHarness {
    /// Spawn an engine watching a steady scripted tracker
    pub fn spawn<C, S, L>(config: EngineConfig, lesson: &str, capture: C, scoring: S, lessons: L) -> Self
    where
        C: FrameCapture + 'static,
        S: ScoringService + 'static,
        L: LessonInfo + 'static,
    {
        let (tracker, feed) = ScriptedTracker::new(TrackerConfig::steady(), ManualClock::new());
        Self::spawn_with(tracker, feed, config, lesson, capture, scoring, lessons)
    }

    /// Spawn an engine watching `feed`, driven by `tracker`
    pub fn spawn_with<C, S, L>(
        tracker: ScriptedTracker,
        feed: TrackerFeed,
        config: EngineConfig,
        lesson: &str,
        capture: C,
        scoring: S,
        lessons: L,
    ) -> Self
    where
        C: FrameCapture + 'static,
        S: ScoringService + 'static,
        L: LessonInfo + 'static,
    {
        let (events, recorder) = EventRecorder::channel();
        let engine = Engine::new(
            config,
            lesson,
            capture,
            scoring,
            lessons,
            tracker.clock().clone(),
            events,
        );
        let handle = engine.handle();
        let task = tokio::spawn(engine.run(feed));

        SessionHarness {
            handle,
            tracker,
            recorder,
            task,
            ticks: Vec::new(),
            triggers: Vec::new(),
            round_durations: Vec::new(),
            round: None,
        }
    }

    pub fn handle(&self) -> &EngineHandle {
        &self.handle
    }

    pub fn tracker_mut(&mut self) -> &mut ScriptedTracker {
        &mut self.tracker
    }

    pub fn recorder_mut(&mut self) -> &mut EventRecorder {
        &mut self.recorder
    }

    /// Let the engine task catch up
    pub async fn settle(&self) {
        sleep(Duration::from_millis(1)).await;
    }

    pub async fn start_checking(&self) -> SignaResult<()> {
        self.handle.start_checking()?;
        self.settle().await;
        Ok(())
    }

    pub async fn pause(&self) -> SignaResult<()> {
        self.handle.pause()?;
        self.settle().await;
        Ok(())
    }

    pub async fn set_lesson(&self, lesson: &str) -> SignaResult<()> {
        self.handle.set_lesson(lesson)?;
        self.settle().await;
        Ok(())
    }

    /// Publish a tick at an absolute session time. Returns whether it
    /// triggered a round.
    pub async fn tick_at(&mut self, millis: u64) -> bool {
        let started = Instant::now();
        let seen = self.recorder.history().len();
        let now = self.tracker.tick_at(millis);
        self.after_tick(now.as_millis(), seen, started).await
    }

    /// Publish the tracker's next periodic tick
    pub async fn tick(&mut self) -> bool {
        let started = Instant::now();
        let seen = self.recorder.history().len();
        let now = self.tracker.tick();
        self.after_tick(now.as_millis(), seen, started).await
    }

    /// Tick every `step` ms from `from` through `to`
    pub async fn hold(&mut self, from: u64, to: u64, step: u64) {
        let mut t = from;
        while t <= to {
            self.tick_at(t).await;
            t += step.max(1);
        }
    }

    async fn after_tick(&mut self, at: u64, seen: usize, started: Instant) -> bool {
        self.ticks.push(at);
        self.settle().await;
        let fresh = &self.recorder.collect()[seen..];
        let triggered = fresh.contains(&EngineEvent::countdown(Duration::ZERO));
        if triggered {
            debug!(at, "Tick triggered a round");
            self.triggers.push(at);
            self.round = Some((seen, started));
        }
        triggered
    }

    /// Wait for the latest triggered round to wind down
    pub async fn wait_round_end(&mut self) -> bool {
        let Some((seen, started)) = self.round.take() else {
            return false;
        };
        let finished = self.recorder.history()[seen..].contains(&EngineEvent::ProgressCleared)
            || matches!(
                timeout(ROUND_WAIT, self.recorder.wait_round_end()).await,
                Ok(Some(_))
            );
        if finished {
            self.round_durations.push(started.elapsed());
        }
        finished
    }

    /// Shut the engine down and collect the session record
    pub async fn finish(mut self) -> ScenarioResult {
        let _ = self.handle.shutdown();
        let stats = match self.task.await {
            Ok(stats) => stats,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => EngineStats::default(),
        };
        ScenarioResult {
            stats,
            events: self.recorder.take(),
            ticks: self.ticks,
            triggers: self.triggers,
            round_durations: self.round_durations,
            ..ScenarioResult::default()
        }
    }
}

// ============================================================================
// SCENARIOS
// ============================================================================

/// Ticks at 0..4000 and 4999 never trigger; 5000 triggers exactly once
pub async fn scenario_hold_threshold() -> SignaResult<ScenarioResult> {
    let scoring = Arc::new(FakeScoringService::accepting(1.0));
    let capture = Arc::new(ScriptedCapture::stills());
    let mut h = SessionHarness::spawn(
        EngineConfig::default(),
        "7",
        capture.clone(),
        scoring.clone(),
        FakeLessonInfo::new(),
    );

    h.start_checking().await?;
    for t in [0, 1000, 2000, 3000, 4000, 4999, 5000, 6000, 7000] {
        h.tick_at(t).await;
    }

    Ok(ScenarioResult {
        scoring_calls: scoring.calls(),
        captures: capture.attempts(),
        ..h.finish().await
    })
}

/// Pausing mid-hold discards the elapsed time
pub async fn scenario_pause_resets_hold() -> SignaResult<ScenarioResult> {
    let scoring = Arc::new(FakeScoringService::accepting(1.0));
    let mut h = SessionHarness::spawn(
        EngineConfig::default(),
        "7",
        ScriptedCapture::stills(),
        scoring.clone(),
        FakeLessonInfo::new(),
    );

    h.start_checking().await?;
    h.hold(0, 3000, 1000).await;
    h.pause().await?;
    h.tick_at(3500).await;

    h.start_checking().await?;
    h.hold(4000, 9000, 1000).await;

    Ok(ScenarioResult {
        scoring_calls: scoring.calls(),
        ..h.finish().await
    })
}

/// A three-frame lesson captures three frames 1500 ms apart
pub async fn scenario_multi_frame_sequence() -> SignaResult<ScenarioResult> {
    let scoring = Arc::new(FakeScoringService::accepting(0.9));
    let capture = Arc::new(ScriptedCapture::stills());
    let mut h = SessionHarness::spawn(
        EngineConfig::default(),
        "8",
        capture.clone(),
        scoring.clone(),
        FakeLessonInfo::uniform(3),
    );

    h.start_checking().await?;
    h.hold(0, 5000, 1000).await;
    // Ticks during the round are dropped
    h.tick_at(5200).await;
    h.wait_round_end().await;

    Ok(ScenarioResult {
        scoring_calls: scoring.calls(),
        captures: capture.attempts(),
        ..h.finish().await
    })
}

/// One failed frame discards the whole sequence
pub async fn scenario_capture_failure() -> SignaResult<ScenarioResult> {
    let scoring = Arc::new(FakeScoringService::accepting(1.0));
    let capture = Arc::new(ScriptedCapture::stills().failing_at(1));
    let mut h = SessionHarness::spawn(
        EngineConfig::default(),
        "8",
        capture.clone(),
        scoring.clone(),
        FakeLessonInfo::uniform(3),
    );

    h.start_checking().await?;
    h.hold(0, 5000, 1000).await;
    h.wait_round_end().await;

    Ok(ScenarioResult {
        scoring_calls: scoring.calls(),
        captures: capture.attempts(),
        ..h.finish().await
    })
}

/// Pausing during a sequence stops before the next frame
pub async fn scenario_pause_mid_sequence() -> SignaResult<ScenarioResult> {
    let scoring = Arc::new(FakeScoringService::accepting(1.0));
    let capture = Arc::new(ScriptedCapture::stills());
    let mut h = SessionHarness::spawn(
        EngineConfig::default(),
        "8",
        capture.clone(),
        scoring.clone(),
        FakeLessonInfo::uniform(3),
    );

    h.start_checking().await?;
    h.hold(0, 5000, 1000).await;
    h.pause().await?;
    h.wait_round_end().await;

    Ok(ScenarioResult {
        scoring_calls: scoring.calls(),
        captures: capture.attempts(),
        ..h.finish().await
    })
}

/// A non-numeric lesson id never reaches capture or scoring
pub async fn scenario_invalid_lesson() -> SignaResult<ScenarioResult> {
    let scoring = Arc::new(FakeScoringService::accepting(1.0));
    let capture = Arc::new(ScriptedCapture::stills());
    let mut h = SessionHarness::spawn(
        EngineConfig::default(),
        "abc",
        capture.clone(),
        scoring.clone(),
        FakeLessonInfo::new(),
    );

    h.start_checking().await?;
    h.hold(0, 5000, 1000).await;

    Ok(ScenarioResult {
        scoring_calls: scoring.calls(),
        captures: capture.attempts(),
        ..h.finish().await
    })
}

/// A rejected attempt, a manual re-arm, then an accepted one
pub async fn scenario_retry_then_success() -> SignaResult<ScenarioResult> {
    let scoring = Arc::new(
        FakeScoringService::accepting(0.95).then(Ok(ScoreResult::new(
            false,
            0.42,
            Some("Bend your index finger".to_string()),
        ))),
    );
    let mut h = SessionHarness::spawn(
        EngineConfig::default(),
        "7",
        ScriptedCapture::stills(),
        scoring.clone(),
        FakeLessonInfo::new(),
    );

    h.start_checking().await?;
    h.hold(0, 5000, 1000).await;
    // Stays idle until the learner dismisses the feedback
    h.tick_at(6000).await;

    h.start_checking().await?;
    h.hold(7000, 12000, 1000).await;

    Ok(ScenarioResult {
        scoring_calls: scoring.calls(),
        ..h.finish().await
    })
}

/// A backend slower than the scoring timeout ends the round with an error
pub async fn scenario_scoring_timeout() -> SignaResult<ScenarioResult> {
    let scoring = Arc::new(FakeScoringService::accepting(1.0).with_delay(Duration::from_secs(20)));
    let mut h = SessionHarness::spawn(
        EngineConfig::default(),
        "7",
        ScriptedCapture::stills(),
        scoring.clone(),
        FakeLessonInfo::new(),
    );

    h.start_checking().await?;
    h.hold(0, 5000, 1000).await;
    h.wait_round_end().await;

    Ok(ScenarioResult {
        scoring_calls: scoring.calls(),
        ..h.finish().await
    })
}

/// Hold at camera rate with jittered tick spacing
pub async fn scenario_camera_rate_hold() -> SignaResult<ScenarioResult> {
    let scoring = Arc::new(FakeScoringService::accepting(1.0));
    let (tracker, feed) = ScriptedTracker::new(TrackerConfig::camera(), ManualClock::new());
    let mut h = SessionHarness::spawn_with(
        tracker,
        feed,
        EngineConfig::default(),
        "7",
        ScriptedCapture::stills(),
        scoring.clone(),
        FakeLessonInfo::new(),
    );

    h.start_checking().await?;
    for _ in 0..240 {
        h.tick().await;
    }

    Ok(ScenarioResult {
        scoring_calls: scoring.calls(),
        ..h.finish().await
    })
}

/// Sample conversation practicing two lessons
pub const CAFE_DIALOGUE: &str = r#"{
    "situation": "Ordering at a cafe",
    "dialogue": [
        { "speaker": "AI", "text": "Hello! What would you like?" },
        { "speaker": "User", "text": "Coffee, please.", "target_lesson_id": 14 },
        { "speaker": "AI", "text": "Anything else?" },
        { "speaker": "User", "text": "Thank you.", "target_lesson_id": 3 }
    ]
}"#;

/// Walk a dialogue, signing each user line
pub async fn scenario_dialogue() -> SignaResult<ScenarioResult> {
    let script = DialogueScript::from_json(CAFE_DIALOGUE)
        .map_err(|e| SignaError::Config(format!("dialogue script: {}", e)))?;
    let mut cursor = DialogueCursor::new(script);

    let scoring = Arc::new(FakeScoringService::accepting(0.9));
    let mut h = SessionHarness::spawn(
        EngineConfig::default(),
        "",
        ScriptedCapture::stills(),
        scoring.clone(),
        FakeLessonInfo::new(),
    );

    let mut t = 0;
    loop {
        if cursor.advance_engine(h.handle())? == DialogueStep::Complete {
            break;
        }
        h.settle().await;
        if !cursor.awaiting_user() {
            continue;
        }

        h.start_checking().await?;
        h.hold(t, t + 5000, 1000).await;
        t += 6000;
    }

    Ok(ScenarioResult {
        scoring_calls: scoring.calls(),
        ..h.finish().await
    })
}

/// Landmark evidence scored on the client against a reference gesture
pub async fn scenario_local_landmarks() -> SignaResult<ScenarioResult> {
    let gesture = TargetGesture::new(
        Handedness::Right,
        ReferencePose::Static {
            joints: sample_joints(0.0),
        },
    );
    let scoring = Arc::new(LocalScoringService::default());
    scoring.register(LessonId::new(21), gesture)?;

    let (mut tracker, feed) = ScriptedTracker::new(TrackerConfig::steady(), ManualClock::new());
    tracker.set_frame(sample_frame(Handedness::Left, 0.0));
    let capture = LandmarkCapture::new(feed.clone());
    let mut h = SessionHarness::spawn_with(
        tracker,
        feed,
        EngineConfig::default(),
        "21",
        capture,
        scoring,
        FakeLessonInfo::new(),
    );

    // Wrong hand first
    h.start_checking().await?;
    h.hold(0, 5000, 1000).await;

    h.tracker_mut().set_frame(sample_frame(Handedness::Right, 0.0));
    h.start_checking().await?;
    h.hold(6000, 11000, 1000).await;

    Ok(h.finish().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use signa_core::{ANALYSIS_FAILED_MESSAGE, CAPTURE_FAILED_MESSAGE};

    #[tokio::test(start_paused = true)]
    async fn test_hold_threshold() {
        let result = scenario_hold_threshold().await.unwrap();

        assert_eq!(result.triggers, vec![5000]);
        assert_eq!(result.scoring_calls.len(), 1);
        assert_eq!(result.captures, 1);
        assert_eq!(result.stats.rounds, 1);
        assert_eq!(result.stats.ticks, 9);
        assert!(result.contains(&EngineEvent::countdown(Duration::from_millis(1))));
        assert_eq!(result.count(&EngineEvent::Success), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_resets_hold() {
        let result = scenario_pause_resets_hold().await.unwrap();

        // The second hold starts at 4000, not 0
        assert_eq!(result.triggers, vec![9000]);
        assert_eq!(result.scoring_calls.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_multi_frame_sequence() {
        let result = scenario_multi_frame_sequence().await.unwrap();

        assert_eq!(result.captures, 3);
        assert_eq!(result.scoring_calls.len(), 1);
        assert_eq!(result.scoring_calls[0].frames, 3);
        assert!(result.round_durations[0] >= Duration::from_millis(3 * 500 + 2 * 1000));
        for current in 1..=3 {
            assert!(result.contains(&EngineEvent::CaptureProgress { current, total: 3 }));
        }
        assert_eq!(result.stats.rounds, 1);
        assert!(result.contains(&EngineEvent::ScoreUpdated(90)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_failure_submits_nothing() {
        let result = scenario_capture_failure().await.unwrap();

        assert_eq!(result.captures, 2);
        assert!(result.scoring_calls.is_empty());
        assert_eq!(result.stats.errors, 1);
        assert!(result.contains(&EngineEvent::feedback(CAPTURE_FAILED_MESSAGE, 0)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_mid_sequence_cancels() {
        let result = scenario_pause_mid_sequence().await.unwrap();

        assert_eq!(result.captures, 1);
        assert!(result.scoring_calls.is_empty());
        assert_eq!(result.stats.cancelled, 1);
        assert!(result.contains(&EngineEvent::RoundCancelled));
        assert!(!result.contains(&EngineEvent::CaptureProgress { current: 2, total: 3 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_lesson_never_scored() {
        let result = scenario_invalid_lesson().await.unwrap();

        assert!(result.scoring_calls.is_empty());
        assert_eq!(result.captures, 0);
        assert_eq!(result.stats.errors, 1);
        assert!(result
            .events
            .iter()
            .any(|e| matches!(e, EngineEvent::Feedback { score: 0, .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_then_success() {
        let result = scenario_retry_then_success().await.unwrap();

        assert_eq!(result.triggers, vec![5000, 12000]);
        assert_eq!(result.stats.retries, 1);
        assert_eq!(result.stats.successes, 1);

        let scores: Vec<u8> = result
            .events
            .iter()
            .filter_map(|e| match e {
                EngineEvent::ScoreUpdated(s) => Some(*s),
                _ => None,
            })
            .collect();
        assert_eq!(scores, vec![42, 95]);
        assert!(result.contains(&EngineEvent::feedback("Bend your index finger", 42)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_scoring_timeout() {
        let result = scenario_scoring_timeout().await.unwrap();

        assert_eq!(result.stats.errors, 1);
        assert!(result.contains(&EngineEvent::feedback(ANALYSIS_FAILED_MESSAGE, 0)));
        assert!(result.round_durations[0] >= Duration::from_secs(15));
        assert!(result.round_durations[0] < Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_camera_rate_hold() {
        let result = scenario_camera_rate_hold().await.unwrap();

        assert_eq!(result.triggers.len(), 1);
        let held = result.triggers[0] - result.ticks[0];
        assert!((5000..5041).contains(&held), "held {}", held);
        assert_eq!(result.stats.ticks, 240);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dialogue_walk() {
        let result = scenario_dialogue().await.unwrap();

        assert_eq!(result.scored_lessons(), vec![LessonId::new(14), LessonId::new(3)]);
        assert_eq!(result.stats.successes, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_local_landmark_scoring() {
        let result = scenario_local_landmarks().await.unwrap();

        assert_eq!(result.stats.retries, 1);
        assert_eq!(result.stats.successes, 1);
        assert!(result.contains(&EngineEvent::feedback("Show your right hand to the camera", 0)));
        assert!(result.contains(&EngineEvent::ScoreUpdated(100)));
        assert!(result.contains(&EngineEvent::Success));
    }
}
