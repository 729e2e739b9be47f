//! Evidence - what gets submitted for one judged attempt

use bytes::Bytes;

use crate::{LandmarkFrame, SignaError, SignaResult};

/// An encoded still taken from the live video surface
#[derive(Debug, Clone, PartialEq)]
pub struct StillImage {
    /// Encoded image bytes
    pub data: Bytes,
    /// MIME type of `data`
    pub mime: &'static str,
    pub width: u32,
    pub height: u32,
}

impl StillImage {
    pub fn jpeg(data: impl Into<Bytes>, width: u32, height: u32) -> Self {
        Self {
            data: data.into(),
            mime: "image/jpeg",
            width,
            height,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// One captured frame of evidence
#[derive(Debug, Clone, PartialEq)]
pub enum Evidence {
    /// Encoded still image
    Image(StillImage),
    /// Landmark snapshot
    Landmarks(LandmarkFrame),
}

impl Evidence {
    pub fn as_image(&self) -> Option<&StillImage> {
        match self {
            Evidence::Image(image) => Some(image),
            Evidence::Landmarks(_) => None,
        }
    }

    pub fn as_landmarks(&self) -> Option<&LandmarkFrame> {
        match self {
            Evidence::Landmarks(frame) => Some(frame),
            Evidence::Image(_) => None,
        }
    }
}

/// Ordered, complete set of evidence frames for one attempt
///
/// A batch only exists once every planned frame was captured; a partial
/// sequence never becomes a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceBatch {
    frames: Vec<Evidence>,
}

impl EvidenceBatch {
    /// Batch of exactly one frame
    pub fn single(evidence: Evidence) -> Self {
        Self {
            frames: vec![evidence],
        }
    }

    /// Assemble a batch, checking it holds exactly `expected` frames
    pub fn from_frames(frames: Vec<Evidence>, expected: u32) -> SignaResult<Self> {
        if frames.is_empty() || frames.len() != expected as usize {
            return Err(SignaError::PartialCapture {
                captured: frames.len() as u32,
                expected,
            });
        }
        Ok(Self { frames })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[Evidence] {
        &self.frames
    }

    pub fn iter(&self) -> impl Iterator<Item = &Evidence> {
        self.frames.iter()
    }

    pub fn into_frames(self) -> Vec<Evidence> {
        self.frames
    }

    /// Every frame is a still image
    pub fn is_images(&self) -> bool {
        self.frames.iter().all(|e| e.as_image().is_some())
    }

    /// Every frame is a landmark snapshot
    pub fn is_landmarks(&self) -> bool {
        self.frames.iter().all(|e| e.as_landmarks().is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> Evidence {
        Evidence::Image(StillImage::jpeg(vec![0xFF, 0xD8], 2, 2))
    }

    #[test]
    fn test_complete_batch() {
        let batch = EvidenceBatch::from_frames(vec![image(), image(), image()], 3).unwrap();
        assert_eq!(batch.len(), 3);
        assert!(batch.is_images());
        assert!(!batch.is_landmarks());
    }

    #[test]
    fn test_partial_batch_rejected() {
        let err = EvidenceBatch::from_frames(vec![image()], 3).unwrap_err();
        assert_eq!(
            err,
            SignaError::PartialCapture {
                captured: 1,
                expected: 3
            }
        );
        assert!(EvidenceBatch::from_frames(Vec::new(), 0).is_err());
    }

    #[test]
    fn test_landmark_batch() {
        let batch = EvidenceBatch::single(Evidence::Landmarks(LandmarkFrame::new()));
        assert!(batch.is_landmarks());
        assert!(batch.frames()[0].as_image().is_none());
    }
}
