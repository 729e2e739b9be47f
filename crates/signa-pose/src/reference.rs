//! Reference poses
//!
//! A reference pose is either a single static skeleton or a motion: an
//! ordered list of skeletons played back at a fixed frame interval. Every
//! motion frame must carry the same set of joint ids.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use signa_core::{Handedness, Joint, SignaError, SignaResult};

use crate::{PoseComparison, ScoreCalibration};

/// One skeleton of a motion reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseFrame {
    #[serde(default)]
    pub frame_index: u32,
    pub joints: Vec<Joint>,
}

/// Target skeleton(s) of a gesture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "motionType", rename_all = "UPPERCASE")]
pub enum ReferencePose {
    Static {
        joints: Vec<Joint>,
    },
    Motion {
        #[serde(rename = "frameIntervalMs")]
        frame_interval_ms: u64,
        frames: Vec<PoseFrame>,
    },
}

impl ReferencePose {
    /// Number of reference skeletons; a static pose has one
    pub fn frame_count(&self) -> usize {
        match self {
            ReferencePose::Static { .. } => 1,
            ReferencePose::Motion { frames, .. } => frames.len(),
        }
    }

    pub fn is_motion(&self) -> bool {
        matches!(self, ReferencePose::Motion { .. })
    }

    /// Frame shown after `elapsed` of looped playback
    pub fn frame_index_at(&self, elapsed: Duration) -> usize {
        match self {
            ReferencePose::Static { .. } => 0,
            ReferencePose::Motion {
                frame_interval_ms,
                frames,
            } => {
                if frames.is_empty() || *frame_interval_ms == 0 {
                    return 0;
                }
                let step = elapsed.as_millis() / u128::from(*frame_interval_ms);
                (step % frames.len() as u128) as usize
            }
        }
    }

    /// Skeleton of frame `index`, if it exists
    pub fn joints(&self, index: usize) -> Option<&[Joint]> {
        match self {
            ReferencePose::Static { joints } if index == 0 => Some(joints),
            ReferencePose::Static { .. } => None,
            ReferencePose::Motion { frames, .. } => frames.get(index).map(|f| f.joints.as_slice()),
        }
    }

    /// Skeleton shown after `elapsed` of playback
    pub fn joints_at(&self, elapsed: Duration) -> &[Joint] {
        self.joints(self.frame_index_at(elapsed)).unwrap_or(&[])
    }

    /// All skeletons in playback order
    pub fn skeletons(&self) -> Vec<&[Joint]> {
        match self {
            ReferencePose::Static { joints } => vec![joints.as_slice()],
            ReferencePose::Motion { frames, .. } => {
                frames.iter().map(|f| f.joints.as_slice()).collect()
            }
        }
    }

    /// Check structure and coordinate ranges
    pub fn validate(&self) -> SignaResult<()> {
        let skeletons = self.skeletons();
        if skeletons.is_empty() {
            return Err(SignaError::InvalidReferencePose(
                "motion has no frames".to_string(),
            ));
        }
        if let ReferencePose::Motion {
            frame_interval_ms: 0,
            ..
        } = self
        {
            return Err(SignaError::InvalidReferencePose(
                "frame interval must be positive".to_string(),
            ));
        }

        let expected: BTreeSet<u32> = skeletons[0].iter().map(|j| j.id).collect();
        if expected.is_empty() {
            return Err(SignaError::InvalidReferencePose(
                "reference has no joints".to_string(),
            ));
        }

        for (index, joints) in skeletons.iter().enumerate() {
            let ids: BTreeSet<u32> = joints.iter().map(|j| j.id).collect();
            if ids.len() != joints.len() {
                return Err(SignaError::InvalidReferencePose(format!(
                    "frame {} repeats a joint id",
                    index
                )));
            }
            if ids != expected {
                return Err(SignaError::InvalidReferencePose(format!(
                    "frame {} joint ids differ from frame 0",
                    index
                )));
            }
            let in_range = |v: f32| (0.0..=1.0).contains(&v);
            if let Some(j) = joints.iter().find(|j| !in_range(j.x) || !in_range(j.y)) {
                return Err(SignaError::InvalidReferencePose(format!(
                    "joint {} of frame {} is outside the unit square",
                    j.id, index
                )));
            }
        }
        Ok(())
    }

    /// Best comparison of `observed` against any reference skeleton.
    ///
    /// Ties keep the earliest frame. `None` when the pose has no skeleton.
    pub fn best_match(
        &self,
        observed: &[Joint],
        calibration: &ScoreCalibration,
    ) -> Option<PoseComparison> {
        self.skeletons()
            .into_iter()
            .map(|target| calibration.compare(target, observed))
            .fold(None, |best, c| match best {
                Some(b) if b.score >= c.score => Some(b),
                _ => Some(c),
            })
    }

    pub fn best_score(&self, observed: &[Joint], calibration: &ScoreCalibration) -> u8 {
        self.best_match(observed, calibration)
            .map(|c| c.score)
            .unwrap_or(0)
    }
}

/// A gesture to imitate: reference pose plus the hand that performs it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetGesture {
    #[serde(rename = "handType")]
    pub hand: Handedness,
    #[serde(flatten)]
    pub pose: ReferencePose,
}

impl TargetGesture {
    pub fn new(hand: Handedness, pose: ReferencePose) -> Self {
        Self { hand, pose }
    }

    /// Parse and validate a gesture from JSON
    pub fn from_json(raw: &str) -> SignaResult<Self> {
        let gesture: TargetGesture = serde_json::from_str(raw)
            .map_err(|e| SignaError::InvalidReferencePose(e.to_string()))?;
        gesture.pose.validate()?;
        Ok(gesture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skeleton(shift: f32) -> Vec<Joint> {
        (0..21)
            .map(|i| Joint::new(i, 0.4 + shift, 0.3 + i as f32 * 0.02))
            .collect()
    }

    fn motion() -> ReferencePose {
        ReferencePose::Motion {
            frame_interval_ms: 400,
            frames: vec![
                PoseFrame { frame_index: 0, joints: skeleton(0.0) },
                PoseFrame { frame_index: 1, joints: skeleton(0.1) },
                PoseFrame { frame_index: 2, joints: skeleton(0.2) },
            ],
        }
    }

    #[test]
    fn test_frame_index_loops() {
        let pose = motion();
        assert_eq!(pose.frame_index_at(Duration::ZERO), 0);
        assert_eq!(pose.frame_index_at(Duration::from_millis(399)), 0);
        assert_eq!(pose.frame_index_at(Duration::from_millis(400)), 1);
        assert_eq!(pose.frame_index_at(Duration::from_millis(1000)), 2);
        assert_eq!(pose.frame_index_at(Duration::from_millis(1200)), 0);
        assert!((pose.joints_at(Duration::from_millis(500))[0].x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_static_pose() {
        let pose = ReferencePose::Static { joints: skeleton(0.0) };
        assert_eq!(pose.frame_count(), 1);
        assert_eq!(pose.frame_index_at(Duration::from_secs(9)), 0);
        assert!(pose.joints(1).is_none());
        assert!(pose.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_mismatched_frames() {
        let pose = ReferencePose::Motion {
            frame_interval_ms: 400,
            frames: vec![
                PoseFrame { frame_index: 0, joints: skeleton(0.0) },
                PoseFrame { frame_index: 1, joints: skeleton(0.0)[..20].to_vec() },
            ],
        };
        assert!(matches!(pose.validate(), Err(SignaError::InvalidReferencePose(_))));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let empty = ReferencePose::Motion { frame_interval_ms: 400, frames: vec![] };
        assert!(empty.validate().is_err());

        let zero_interval = ReferencePose::Motion {
            frame_interval_ms: 0,
            frames: vec![PoseFrame { frame_index: 0, joints: skeleton(0.0) }],
        };
        assert!(zero_interval.validate().is_err());

        let outside = ReferencePose::Static { joints: vec![Joint::new(0, 1.5, 0.5)] };
        assert!(outside.validate().is_err());
    }

    #[test]
    fn test_best_score_picks_closest_frame() {
        let pose = motion();
        let calibration = ScoreCalibration::default();
        assert_eq!(pose.best_score(&skeleton(0.1), &calibration), 100);

        let best = pose.best_match(&skeleton(0.2), &calibration).unwrap();
        assert_eq!(best.score, 100);
        assert_eq!(pose.best_score(&[], &calibration), 0);
    }

    #[test]
    fn test_gesture_json() {
        let raw = r#"{
            "handType": "RIGHT",
            "motionType": "MOTION",
            "frameIntervalMs": 400,
            "frames": [
                { "frameIndex": 0, "joints": [{ "id": 0, "x": 0.5, "y": 0.5 }] },
                { "frameIndex": 1, "joints": [{ "id": 0, "x": 0.6, "y": 0.5 }] }
            ]
        }"#;
        let gesture = TargetGesture::from_json(raw).unwrap();
        assert_eq!(gesture.hand, Handedness::Right);
        assert_eq!(gesture.pose.frame_count(), 2);

        let still = r#"{ "handType": "LEFT", "motionType": "STATIC", "joints": [{ "id": 0, "x": 0.5, "y": 0.6 }] }"#;
        let gesture = TargetGesture::from_json(still).unwrap();
        assert_eq!(gesture.hand, Handedness::Left);
        assert!(!gesture.pose.is_motion());
    }

    #[test]
    fn test_gesture_json_rejects_unknown_motion() {
        let raw = r#"{ "handType": "LEFT", "motionType": "WAVE", "joints": [] }"#;
        assert!(TargetGesture::from_json(raw).is_err());
    }
}
