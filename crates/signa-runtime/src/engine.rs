//! Capture engine - runtime loop implementation
//!
//! One task owns all round state. The loop selects over control commands
//! and tracker ticks, biased toward commands so a pause is always seen
//! before the next tick. The checking flag is shared with every
//! [`EngineHandle`] and is read synchronously at the top of each tick and
//! between captured frames.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use signa_capture::{FrameCapture, TrackerFeed};
use signa_core::{
    CapturePlan, EngineEvent, LessonId, Outcome, SignaError, SignaResult, ANALYSIS_FAILED_MESSAGE,
    CAPTURE_FAILED_MESSAGE,
};
use signa_scoring::{LessonInfo, PlanResolver, ScoringService};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::{
    CaptureSequencer, Clock, EngineConfig, EventSink, FeedbackInterpreter, HoldState, HoldTimer,
    SequenceOutcome, TickOutcome,
};

/// Control command sent through an [`EngineHandle`]
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    StartChecking,
    Pause,
    SetLesson(String),
    Shutdown,
}

/// Report of one completed capture round
#[derive(Debug, Clone, PartialEq)]
pub struct RoundReport {
    pub outcome: Outcome,
    pub plan: CapturePlan,
    /// Evidence frames submitted to the scoring service
    pub evidence_count: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub ticks: u64,
    pub rounds: u64,
    pub successes: u64,
    pub retries: u64,
    pub errors: u64,
    pub cancelled: u64,
}

impl EngineStats {
    fn record(&mut self, outcome: &Outcome) {
        self.rounds += 1;
        match outcome {
            Outcome::Success { .. } => self.successes += 1,
            Outcome::Retry { .. } => self.retries += 1,
            Outcome::Error(_) => self.errors += 1,
            Outcome::Cancelled => self.cancelled += 1,
        }
    }
}

/// Cloneable control surface of a running engine
#[derive(Debug, Clone)]
pub struct EngineHandle {
    commands: mpsc::UnboundedSender<Command>,
    checking: Arc<AtomicBool>,
}

impl EngineHandle {
    fn send(&self, command: Command) -> SignaResult<()> {
        self.commands
            .send(command)
            .map_err(|_| SignaError::EngineStopped)
    }

    /// Arm the hold timer
    pub fn start_checking(&self) -> SignaResult<()> {
        self.checking.store(true, Ordering::SeqCst);
        self.send(Command::StartChecking)
    }

    /// Stop checking. Takes effect at the next tick or between frames.
    pub fn pause(&self) -> SignaResult<()> {
        self.checking.store(false, Ordering::SeqCst);
        self.send(Command::Pause)
    }

    /// Retarget the engine to another lesson (raw route id)
    pub fn set_lesson(&self, lesson: impl Into<String>) -> SignaResult<()> {
        self.send(Command::SetLesson(lesson.into()))
    }

    pub fn shutdown(&self) -> SignaResult<()> {
        self.send(Command::Shutdown)
    }

    /// Whether the engine is (or has been asked to be) checking
    pub fn is_checking(&self) -> bool {
        self.checking.load(Ordering::SeqCst)
    }
}

/// Capture-and-feedback engine
pub struct Engine<C, S, L, K> {
    config: EngineConfig,
    lesson: String,
    hold: HoldTimer,
    capture: C,
    sequencer: CaptureSequencer,
    interpreter: FeedbackInterpreter<S>,
    resolver: PlanResolver<L>,
    clock: K,
    events: EventSink,
    checking: Arc<AtomicBool>,
    commands_tx: mpsc::UnboundedSender<Command>,
    commands: mpsc::UnboundedReceiver<Command>,
    stats: EngineStats,
}

impl<C, S, L, K> Engine<C, S, L, K>
where
    C: FrameCapture,
    S: ScoringService,
    L: LessonInfo,
    K: Clock,
{
    pub fn new(
        config: EngineConfig,
        lesson: impl Into<String>,
        capture: C,
        scoring: S,
        lessons: L,
        clock: K,
        events: EventSink,
    ) -> Self {
        let (commands_tx, commands) = mpsc::unbounded_channel();
        Engine {
            hold: HoldTimer::new(config.hold_threshold()),
            sequencer: CaptureSequencer::new(config.flash()),
            interpreter: FeedbackInterpreter::with_timeout(scoring, config.scoring_timeout()),
            resolver: PlanResolver::with_interval(lessons, config.multi_frame_interval()),
            config,
            lesson: lesson.into(),
            capture,
            clock,
            events,
            checking: Arc::new(AtomicBool::new(false)),
            commands_tx,
            commands,
            stats: EngineStats::default(),
        }
    }

    pub fn handle(&self) -> EngineHandle {
        EngineHandle {
            commands: self.commands_tx.clone(),
            checking: self.checking.clone(),
        }
    }

    pub fn lesson(&self) -> &str {
        &self.lesson
    }

    pub fn hold_state(&self) -> HoldState {
        self.hold.state()
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Drive the engine until shutdown or until the tracker feed closes
    pub async fn run(mut self, mut frames: TrackerFeed) -> EngineStats {
        info!(lesson = %self.lesson, "Engine started");
        loop {
            tokio::select! {
                biased;

                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.apply(command),
                },

                changed = frames.changed() => {
                    if changed.is_err() {
                        debug!("Tracker feed closed");
                        break;
                    }
                    frames.borrow_and_update();
                    if self.on_tick().await.is_some() {
                        // Ticks delivered during the round are dropped
                        frames.borrow_and_update();
                    }
                }
            }
        }
        info!(rounds = self.stats.rounds, "Engine stopped");
        self.stats
    }

    /// Apply one control command
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::StartChecking => {
                self.checking.store(true, Ordering::SeqCst);
                if self.hold.start_checking() {
                    self.publish_countdown(self.hold.threshold());
                }
            }
            Command::Pause => {
                self.checking.store(false, Ordering::SeqCst);
                self.hold.pause();
                self.publish_countdown(self.hold.threshold());
            }
            Command::SetLesson(lesson) => {
                info!(from = %self.lesson, to = %lesson, "Lesson changed");
                self.lesson = lesson;
            }
            Command::Shutdown => {
                self.checking.store(false, Ordering::SeqCst);
                self.hold.pause();
            }
        }
    }

    /// Tracker tick handler.
    ///
    /// Returns the round report when this tick triggered a capture round.
    pub async fn on_tick(&mut self) -> Option<RoundReport> {
        self.stats.ticks += 1;

        if !self.checking.load(Ordering::SeqCst) {
            if self.hold.state() != HoldState::Idle {
                self.hold.pause();
                self.publish_countdown(self.hold.threshold());
            }
            return None;
        }

        match self.hold.on_tick(self.clock.now()) {
            TickOutcome::Ignored => None,
            TickOutcome::Holding { remaining } => {
                self.publish_countdown(remaining);
                None
            }
            TickOutcome::Triggered => {
                self.publish_countdown(Duration::ZERO);
                Some(self.run_round().await)
            }
        }
    }

    async fn run_round(&mut self) -> RoundReport {
        info!(lesson = %self.lesson, "Hold complete, starting capture round");
        let report = self.capture_round().await;

        self.events.emit(EngineEvent::ProgressCleared);
        self.stats.record(&report.outcome);

        let rearm = report.outcome.is_retry()
            && self.config.auto_rearm_on_retry
            && self.checking.load(Ordering::SeqCst);
        if !rearm {
            self.checking.store(false, Ordering::SeqCst);
        }
        if self.hold.finish_round(rearm) == HoldState::Armed {
            self.publish_countdown(self.hold.threshold());
        }
        report
    }

    async fn capture_round(&mut self) -> RoundReport {
        let lesson = match LessonId::parse(&self.lesson) {
            Ok(lesson) => lesson,
            Err(e) => {
                error!(lesson = %self.lesson, "Invalid lesson id, round aborted");
                self.events.emit(EngineEvent::feedback(e.to_string(), 0));
                return RoundReport {
                    outcome: Outcome::Error(e),
                    plan: CapturePlan::single(),
                    evidence_count: 0,
                };
            }
        };

        let plan = self.resolver.resolve(lesson).await;
        let sequence = self
            .sequencer
            .run(&self.capture, &plan, &self.checking, &self.events)
            .await;

        let batch = match sequence {
            Ok(SequenceOutcome::Complete(batch)) => batch,
            Ok(SequenceOutcome::Cancelled { captured }) => {
                info!(captured, "Round cancelled by pause");
                self.events.emit(EngineEvent::RoundCancelled);
                return RoundReport {
                    outcome: Outcome::Cancelled,
                    plan,
                    evidence_count: 0,
                };
            }
            Err(e) => {
                warn!(error = %e, "Capture failed, round aborted");
                self.events
                    .emit(EngineEvent::feedback(CAPTURE_FAILED_MESSAGE, 0));
                return RoundReport {
                    outcome: Outcome::Error(e),
                    plan,
                    evidence_count: 0,
                };
            }
        };

        self.events.emit(EngineEvent::Analyzing(true));
        let outcome = self.interpreter.submit_validated(lesson, &batch).await;
        self.events.emit(EngineEvent::Analyzing(false));

        match &outcome {
            Outcome::Success { score_percent } => {
                self.events.emit(EngineEvent::ScoreUpdated(*score_percent));
                self.events.emit(EngineEvent::Success);
            }
            Outcome::Retry {
                feedback,
                score_percent,
            } => {
                self.events.emit(EngineEvent::ScoreUpdated(*score_percent));
                self.events
                    .emit(EngineEvent::feedback(feedback.clone(), *score_percent));
            }
            Outcome::Error(_) => {
                self.events
                    .emit(EngineEvent::feedback(ANALYSIS_FAILED_MESSAGE, 0));
            }
            Outcome::Cancelled => {}
        }

        RoundReport {
            outcome,
            plan,
            evidence_count: batch.len(),
        }
    }

    fn publish_countdown(&self, remaining: Duration) {
        self.events.emit(EngineEvent::countdown(remaining));
    }
}
