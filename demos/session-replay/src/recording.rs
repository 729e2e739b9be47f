//! Landmark recordings

use std::path::Path;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use signa_core::{LandmarkFrame, LandmarkPoint, SignaError, SignaResult};
use signa_pose::TargetGesture;

/// Tracker results captured at a fixed rate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    #[serde(default = "default_interval")]
    pub frame_interval_ms: u64,
    pub frames: Vec<LandmarkFrame>,
}

fn default_interval() -> u64 {
    33
}

impl Recording {
    pub fn load(path: impl AsRef<Path>) -> SignaResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| SignaError::Config(format!("{}: {}", path.as_ref().display(), e)))?;
        serde_json::from_str(&raw).map_err(|e| SignaError::Config(format!("recording: {}", e)))
    }

    /// A learner holding the reference gesture with slight tremor
    pub fn synthesize(gesture: &TargetGesture, frames: usize, interval_ms: u64, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let frames = (0..frames)
            .map(|i| {
                let elapsed = Duration::from_millis(i as u64 * interval_ms);
                let mut joints = gesture.pose.joints_at(elapsed).to_vec();
                joints.sort_by_key(|j| j.id);
                let points = joints
                    .iter()
                    .map(|j| {
                        let x = (j.x + rng.gen_range(-0.004..0.004)).clamp(0.0, 1.0);
                        let y = (j.y + rng.gen_range(-0.004..0.004)).clamp(0.0, 1.0);
                        LandmarkPoint::new(x, y, 0.0).with_visibility(1.0)
                    })
                    .collect();
                LandmarkFrame::new().with_group(gesture.hand.group(), points)
            })
            .collect();

        Recording {
            frame_interval_ms: interval_ms,
            frames,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }

    /// Playback length
    pub fn duration(&self) -> Duration {
        self.interval() * self.frames.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signa_core::Handedness;

    const GESTURE: &str = include_str!("../data/open_hand.json");

    #[test]
    fn test_synthesized_frames_follow_gesture() {
        let gesture = TargetGesture::from_json(GESTURE).unwrap();
        let recording = Recording::synthesize(&gesture, 10, 33, 7);

        assert_eq!(recording.frames.len(), 10);
        let observed = recording.frames[0].hand_joints(Handedness::Right);
        assert_eq!(observed.len(), 21);
        assert!(recording.frames[0].hand_joints(Handedness::Left).is_empty());
        assert_eq!(recording.duration(), Duration::from_millis(330));
    }

    #[test]
    fn test_recording_json() {
        let raw = r#"{ "frames": [ { "right_hand_landmarks": [ { "x": 0.5, "y": 0.5, "z": 0.0 } ] } ] }"#;
        let recording: Recording = serde_json::from_str(raw).unwrap();
        assert_eq!(recording.frame_interval_ms, 33);
        assert_eq!(recording.frames[0].point_count(), 1);
    }
}
