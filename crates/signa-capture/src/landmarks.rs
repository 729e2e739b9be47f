//! Landmark snapshot capture
//!
//! The tracker publishes each result into a `watch` channel; only the latest
//! frame is kept. A snapshot is a clone of whatever is current at capture time.

use signa_core::{Evidence, LandmarkFrame, SignaError, SignaResult};
use tokio::sync::watch;
use tracing::debug;

use crate::FrameCapture;

/// Sending half of a tracker feed
pub type TrackerSender = watch::Sender<Option<LandmarkFrame>>;

/// Receiving half of a tracker feed
pub type TrackerFeed = watch::Receiver<Option<LandmarkFrame>>;

/// New tracker feed with no frame yet
pub fn tracker_feed() -> (TrackerSender, TrackerFeed) {
    watch::channel(None)
}

/// Captures the latest tracker result as landmark evidence
#[derive(Debug, Clone)]
pub struct LandmarkCapture {
    feed: TrackerFeed,
}

impl LandmarkCapture {
    pub fn new(feed: TrackerFeed) -> Self {
        Self { feed }
    }
}

impl FrameCapture for LandmarkCapture {
    fn capture(&self) -> SignaResult<Evidence> {
        let frame = self
            .feed
            .borrow()
            .clone()
            .ok_or_else(|| SignaError::CaptureUnavailable("tracker has not reported yet".to_string()))?;

        if frame.is_empty() {
            return Err(SignaError::CaptureUnavailable(
                "tracker reported no landmarks".to_string(),
            ));
        }
        debug!(points = frame.point_count(), "Captured landmark snapshot");
        Ok(Evidence::Landmarks(frame))
    }
}
