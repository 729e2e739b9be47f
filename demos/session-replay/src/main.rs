//! Session replay - run a landmark recording through the capture engine
//!
//! In `landmarks` mode the recording is scored on the client against the
//! reference gesture. In `image` mode each tracker frame is drawn onto a
//! video surface and JPEG stills go to the scoring backend named in the
//! configuration.

mod recording;
mod render;

use std::error::Error;

use signa_capture::{tracker_feed, FrameCapture, LandmarkCapture, SharedSurface, StillCapture, TrackerFeed};
use signa_core::{EngineEvent, LandmarkFrame, LessonId};
use signa_pose::TargetGesture;
use signa_runtime::{
    init_tracing_with, Engine, EngineConfig, EngineStats, EventSink, EvidenceKind, MonotonicClock,
};
use signa_scoring::{
    HttpLessonInfo, HttpScoringClient, LessonInfo, LocalScoringService, ScoringService,
    SingleFrameLessons,
};
use tracing::{info, warn};

use crate::recording::Recording;

/// Lesson id the replayed gesture is registered under
const REPLAY_LESSON: u32 = 1;

const SYNTHETIC_FRAMES: usize = 600;
const SYNTHETIC_INTERVAL_MS: u64 = 33;
const SURFACE_SIZE: (u32, u32) = (640, 480);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        println!("Usage: session-replay <gesture.json> [config.json] [recording.json]");
        println!("Example: session-replay data/open_hand.json data/config.json");
        return Ok(());
    }

    let config = match args.get(2) {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    }
    .with_env_overrides();
    config.validate()?;
    init_tracing_with(config.log_format, "signa=info,session_replay=info");

    let gesture = TargetGesture::from_json(&std::fs::read_to_string(&args[1])?)?;
    let recording = match args.get(3) {
        Some(path) => Recording::load(path)?,
        None => Recording::synthesize(&gesture, SYNTHETIC_FRAMES, SYNTHETIC_INTERVAL_MS, 7),
    };
    info!(
        frames = recording.frames.len(),
        duration = ?recording.duration(),
        evidence = ?config.evidence,
        "Replaying session"
    );

    let lesson = LessonId::new(REPLAY_LESSON);
    let (tracker, feed) = tracker_feed();

    let stats = match config.evidence {
        EvidenceKind::Landmarks => {
            let scoring = LocalScoringService::new(&config.local_scoring);
            scoring.register(lesson, gesture)?;
            let capture = LandmarkCapture::new(feed.clone());
            replay(config, lesson, capture, scoring, SingleFrameLessons, feed, |frame| {
                tracker.send_replace(Some(frame.clone()));
            }, &recording)
            .await?
        }
        EvidenceKind::Image => {
            let scoring = HttpScoringClient::new(&config.scoring)?;
            let lessons = HttpLessonInfo::new(&config.lessons)?;
            let surface = SharedSurface::new();
            let capture = StillCapture::with_quality(surface.clone(), config.jpeg_quality);
            let (width, height) = SURFACE_SIZE;
            replay(config, lesson, capture, scoring, lessons, feed, |frame| {
                surface.publish(render::render_hands(frame, width, height));
                tracker.send_replace(Some(frame.clone()));
            }, &recording)
            .await?
        }
    };

    println!(
        "Replay finished: {} rounds, {} accepted, {} retries, {} errors, {} cancelled",
        stats.rounds, stats.successes, stats.retries, stats.errors, stats.cancelled
    );
    Ok(())
}

/// Feed the recording to a running engine, re-arming after every feedback
#[allow(clippy::too_many_arguments)]
async fn replay<C, S, L, P>(
    config: EngineConfig,
    lesson: LessonId,
    capture: C,
    scoring: S,
    lessons: L,
    feed: TrackerFeed,
    mut publish: P,
    recording: &Recording,
) -> Result<EngineStats, Box<dyn Error>>
where
    C: FrameCapture + 'static,
    S: ScoringService + 'static,
    L: LessonInfo + 'static,
    P: FnMut(&LandmarkFrame),
{
    let (events, mut stream) = EventSink::channel();
    let engine = Engine::new(
        config,
        lesson.to_string(),
        capture,
        scoring,
        lessons,
        MonotonicClock::new(),
        events,
    );
    let handle = engine.handle();
    let engine_task = tokio::spawn(engine.run(feed));

    let printer = {
        let handle = handle.clone();
        tokio::spawn(async move {
            let mut last_second = None;
            while let Some(event) = stream.recv().await {
                match &event {
                    EngineEvent::Countdown { remaining } => {
                        // One line per whole second
                        let second = remaining.as_millis().div_ceil(1000);
                        if last_second == Some(second) {
                            continue;
                        }
                        last_second = Some(second);
                    }
                    EngineEvent::Feedback { .. } => {
                        if handle.start_checking().is_err() {
                            warn!("Engine stopped before re-arm");
                        }
                    }
                    EngineEvent::Success => {
                        let _ = handle.shutdown();
                    }
                    _ => {}
                }
                println!("{}", event);
            }
        })
    };

    handle.start_checking()?;
    let interval = recording.interval();
    for frame in &recording.frames {
        if engine_task.is_finished() {
            break;
        }
        publish(frame);
        tokio::time::sleep(interval).await;
    }

    // Queued behind any round still in flight
    let _ = handle.shutdown();
    let stats = engine_task.await?;
    printer.await?;
    Ok(stats)
}
