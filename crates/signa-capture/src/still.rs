//! Still-image capture
//!
//! Evidence always reflects the true camera orientation. The on-screen
//! preview may be mirrored for the learner; the encoded still never is.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};
use signa_core::{Evidence, SignaError, SignaResult, StillImage};
use tracing::{debug, warn};

use crate::{FrameCapture, RawFrame, VideoSurface};

/// Default JPEG quality of captured stills
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Encode a raw RGBA frame as a JPEG still
pub fn encode_jpeg(frame: &RawFrame, quality: u8) -> SignaResult<StillImage> {
    if frame.width == 0 || frame.height == 0 {
        return Err(SignaError::CaptureUnavailable(
            "video surface has no dimensions yet".to_string(),
        ));
    }
    let rgba = RgbaImage::from_raw(frame.width, frame.height, frame.pixels.clone()).ok_or_else(|| {
        SignaError::CaptureUnavailable(format!(
            "pixel buffer of {} bytes does not match {}x{}",
            frame.pixels.len(),
            frame.width,
            frame.height
        ))
    })?;

    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgba8(rgba).to_rgb8();
    let mut data = Vec::new();
    JpegEncoder::new_with_quality(&mut data, quality.clamp(1, 100))
        .encode_image(&rgb)
        .map_err(|e| SignaError::Encoding(e.to_string()))?;

    Ok(StillImage::jpeg(data, frame.width, frame.height))
}

/// Captures the frame currently on a video surface as a JPEG still
#[derive(Debug, Clone)]
pub struct StillCapture<S> {
    surface: S,
    quality: u8,
}

impl<S: VideoSurface> StillCapture<S> {
    pub fn new(surface: S) -> Self {
        Self::with_quality(surface, DEFAULT_JPEG_QUALITY)
    }

    pub fn with_quality(surface: S, quality: u8) -> Self {
        Self { surface, quality }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}

impl<S: VideoSurface> FrameCapture for StillCapture<S> {
    fn capture(&self) -> SignaResult<Evidence> {
        let frame = self.surface.current_frame().ok_or_else(|| {
            warn!("Capture requested before the video surface had a frame");
            SignaError::CaptureUnavailable("video surface has no current frame".to_string())
        })?;

        let still = encode_jpeg(&frame, self.quality)?;
        debug!(
            width = still.width,
            height = still.height,
            bytes = still.len(),
            "Captured still"
        );
        Ok(Evidence::Image(still))
    }
}
