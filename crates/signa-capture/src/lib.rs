//! Signa Capture - Frame capture adapter
//!
//! Produces one piece of evidence on demand from a live source:
//! - [`StillCapture`] encodes the current video frame as a JPEG still
//! - [`LandmarkCapture`] snapshots the latest tracker result
//!
//! Capture is stateless per call. The only side effect is a transient read
//! of the shared surface; nothing here writes to it.

pub mod landmarks;
pub mod still;
pub mod surface;

pub use landmarks::*;
pub use still::*;
pub use surface::*;

use signa_core::{Evidence, SignaResult};

/// Source of one evidence frame per call
///
/// Calls are made strictly one at a time by the capture sequencer.
pub trait FrameCapture: Send + Sync {
    fn capture(&self) -> SignaResult<Evidence>;
}

impl<T: FrameCapture + ?Sized> FrameCapture for std::sync::Arc<T> {
    fn capture(&self) -> SignaResult<Evidence> {
        (**self).capture()
    }
}

impl<T: FrameCapture + ?Sized> FrameCapture for Box<T> {
    fn capture(&self) -> SignaResult<Evidence> {
        (**self).capture()
    }
}
