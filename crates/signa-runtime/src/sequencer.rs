//! Capture sequencer
//!
//! Executes a capture plan. Frames are captured strictly one after another.
//! A multi-frame plan announces each frame, waits a short flash so the UI
//! can mark the capture instant, captures, then waits out the rest of the
//! interval. Any failed capture discards the whole sequence.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use signa_capture::FrameCapture;
use signa_core::{CapturePlan, EngineEvent, EvidenceBatch, SignaError, SignaResult};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::EventSink;

/// Flash shown before each frame of a multi-frame capture
pub const DEFAULT_FLASH: Duration = Duration::from_millis(500);

/// How a capture sequence ended without error
#[derive(Debug, Clone, PartialEq)]
pub enum SequenceOutcome {
    /// Every planned frame was captured
    Complete(EvidenceBatch),
    /// The caller paused before the sequence finished
    Cancelled { captured: u32 },
}

/// Runs capture plans
#[derive(Debug, Clone, Copy)]
pub struct CaptureSequencer {
    flash: Duration,
}

impl CaptureSequencer {
    pub fn new(flash: Duration) -> Self {
        Self { flash }
    }

    pub fn flash(&self) -> Duration {
        self.flash
    }

    /// Capture every frame of `plan`.
    ///
    /// `active` is the caller's checking flag. It is read between frames,
    /// never during one: a frame that has started is always completed.
    pub async fn run<C: FrameCapture + ?Sized>(
        &self,
        capture: &C,
        plan: &CapturePlan,
        active: &AtomicBool,
        events: &EventSink,
    ) -> SignaResult<SequenceOutcome> {
        if !plan.is_sequence() {
            let evidence = capture.capture()?;
            return Ok(SequenceOutcome::Complete(EvidenceBatch::single(evidence)));
        }

        let total = plan.frame_count();
        let gap = plan.interval().saturating_sub(self.flash);
        let mut frames = Vec::with_capacity(total as usize);
        info!(total, interval = ?plan.interval(), "Starting multi-frame capture");

        for current in 1..=total {
            if current > 1 && !active.load(Ordering::SeqCst) {
                info!(captured = frames.len(), total, "Capture sequence cancelled");
                return Ok(SequenceOutcome::Cancelled {
                    captured: frames.len() as u32,
                });
            }

            events.emit(EngineEvent::CaptureProgress { current, total });
            sleep(self.flash).await;

            match capture.capture() {
                Ok(evidence) => frames.push(evidence),
                Err(e) => {
                    warn!(frame = current, total, error = %e, "Capture failed, discarding sequence");
                    return Err(SignaError::PartialCapture {
                        captured: frames.len() as u32,
                        expected: total,
                    });
                }
            }
            debug!(frame = current, total, "Frame captured");

            if current < total {
                sleep(gap).await;
            }
        }

        EvidenceBatch::from_frames(frames, total).map(SequenceOutcome::Complete)
    }
}

impl Default for CaptureSequencer {
    fn default() -> Self {
        Self::new(DEFAULT_FLASH)
    }
}
