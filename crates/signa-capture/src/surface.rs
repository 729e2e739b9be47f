//! Video surfaces
//!
//! The live video surface is owned by the external camera pipeline. The
//! engine only ever reads the frame currently on display.

use std::sync::Arc;

use parking_lot::RwLock;

/// One decoded video frame, tightly packed RGBA8
#[derive(Debug, Clone, PartialEq)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RawFrame {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Single-colour frame
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self::new(width, height, pixels)
    }

    /// Pixel buffer length matches the dimensions
    pub fn is_consistent(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.pixels.len() == self.width as usize * self.height as usize * 4
    }
}

/// Read access to the live video surface
pub trait VideoSurface: Send + Sync {
    /// Frame currently on display, `None` before the stream has loaded
    fn current_frame(&self) -> Option<RawFrame>;
}

/// Surface shared between a camera pipeline (writer) and the engine (reader)
#[derive(Debug, Clone, Default)]
pub struct SharedSurface {
    inner: Arc<RwLock<Option<RawFrame>>>,
}

impl SharedSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a new frame, replacing the previous one
    pub fn publish(&self, frame: RawFrame) {
        *self.inner.write() = Some(frame);
    }

    /// Drop the current frame (stream stopped)
    pub fn clear(&self) {
        *self.inner.write() = None;
    }

    pub fn has_frame(&self) -> bool {
        self.inner.read().is_some()
    }
}

impl VideoSurface for SharedSurface {
    fn current_frame(&self) -> Option<RawFrame> {
        self.inner.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_surface_publish_clear() {
        let surface = SharedSurface::new();
        assert!(surface.current_frame().is_none());

        let reader = surface.clone();
        surface.publish(RawFrame::filled(2, 2, [1, 2, 3, 255]));
        assert!(reader.has_frame());
        assert_eq!(reader.current_frame().unwrap().pixels.len(), 16);

        surface.clear();
        assert!(!reader.has_frame());
    }

    #[test]
    fn test_frame_consistency() {
        assert!(RawFrame::filled(3, 2, [0; 4]).is_consistent());
        assert!(!RawFrame::new(3, 2, vec![0; 10]).is_consistent());
        assert!(!RawFrame::new(0, 2, Vec::new()).is_consistent());
    }
}
