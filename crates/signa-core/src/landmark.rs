//! Landmarks - what the tracker reports for one video frame
//!
//! The tracker is an external collaborator. Its output is a set of named
//! landmark groups in normalized image coordinates; any group may be empty
//! when that body part is occluded or out of frame.

use serde::{Deserialize, Serialize};

/// A tracked anatomical point
///
/// `x` and `y` are normalized image-plane coordinates in [0, 1]; `z` is the
/// tracker's relative depth. Visibility defaults to 0 when the tracker omits it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    #[serde(default)]
    pub visibility: f32,
}

impl LandmarkPoint {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            visibility: 0.0,
        }
    }

    pub fn with_visibility(mut self, visibility: f32) -> Self {
        self.visibility = visibility.clamp(0.0, 1.0);
        self
    }

    /// Project onto a 2-D joint, dropping depth and visibility
    pub fn to_joint(&self, id: u32) -> Joint {
        Joint::new(id, self.x, self.y)
    }
}

/// Landmark group identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LandmarkGroup {
    Face,
    Pose,
    LeftHand,
    RightHand,
}

impl LandmarkGroup {
    /// All groups in wire order
    pub fn all() -> &'static [LandmarkGroup] {
        &[
            LandmarkGroup::Face,
            LandmarkGroup::Pose,
            LandmarkGroup::LeftHand,
            LandmarkGroup::RightHand,
        ]
    }
}

/// Which hand a gesture is performed with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn group(self) -> LandmarkGroup {
        match self {
            Handedness::Left => LandmarkGroup::LeftHand,
            Handedness::Right => LandmarkGroup::RightHand,
        }
    }
}

/// One tracker result. Superseded by the next frame.
///
/// Serializes in the scoring backend's raw-landmark layout.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LandmarkFrame {
    #[serde(rename = "face_landmarks", default)]
    pub face: Vec<LandmarkPoint>,
    #[serde(rename = "pose_landmarks", default)]
    pub pose: Vec<LandmarkPoint>,
    #[serde(rename = "left_hand_landmarks", default)]
    pub left_hand: Vec<LandmarkPoint>,
    #[serde(rename = "right_hand_landmarks", default)]
    pub right_hand: Vec<LandmarkPoint>,
}

impl LandmarkFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points of one group
    pub fn group(&self, group: LandmarkGroup) -> &[LandmarkPoint] {
        match group {
            LandmarkGroup::Face => &self.face,
            LandmarkGroup::Pose => &self.pose,
            LandmarkGroup::LeftHand => &self.left_hand,
            LandmarkGroup::RightHand => &self.right_hand,
        }
    }

    /// Replace one group
    pub fn with_group(mut self, group: LandmarkGroup, points: Vec<LandmarkPoint>) -> Self {
        match group {
            LandmarkGroup::Face => self.face = points,
            LandmarkGroup::Pose => self.pose = points,
            LandmarkGroup::LeftHand => self.left_hand = points,
            LandmarkGroup::RightHand => self.right_hand = points,
        }
        self
    }

    /// No group carries any point
    pub fn is_empty(&self) -> bool {
        LandmarkGroup::all().iter().all(|g| self.group(*g).is_empty())
    }

    /// Number of points across all groups
    pub fn point_count(&self) -> usize {
        LandmarkGroup::all().iter().map(|g| self.group(*g).len()).sum()
    }

    /// Hand landmarks as joints, ids taken from landmark order
    pub fn hand_joints(&self, hand: Handedness) -> Vec<Joint> {
        self.group(hand.group())
            .iter()
            .enumerate()
            .map(|(i, p)| p.to_joint(i as u32))
            .collect()
    }
}

/// A simplified 2-D point used for local scoring against a reference skeleton
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Joint {
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

impl Joint {
    pub fn new(id: u32, x: f32, y: f32) -> Self {
        Self { id, x, y }
    }

    /// Euclidean distance in normalized image space
    pub fn distance(&self, other: &Joint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_defaults_to_zero() {
        let point: LandmarkPoint = serde_json::from_str(r#"{"x":0.5,"y":0.25,"z":-0.1}"#).unwrap();
        assert_eq!(point.visibility, 0.0);
        assert_eq!(point.x, 0.5);
    }

    #[test]
    fn test_frame_wire_names() {
        let frame = LandmarkFrame::new()
            .with_group(LandmarkGroup::RightHand, vec![LandmarkPoint::new(0.1, 0.2, 0.0)]);
        let value = serde_json::to_value(&frame).unwrap();

        assert!(value["face_landmarks"].as_array().unwrap().is_empty());
        assert!(value["left_hand_landmarks"].as_array().unwrap().is_empty());
        assert_eq!(value["right_hand_landmarks"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_groups_deserialize_empty() {
        let frame: LandmarkFrame = serde_json::from_str(r#"{"pose_landmarks":[]}"#).unwrap();
        assert!(frame.is_empty());
    }

    #[test]
    fn test_hand_joints_ids_follow_order() {
        let points = (0..21)
            .map(|i| LandmarkPoint::new(i as f32 / 21.0, 0.5, 0.0))
            .collect();
        let frame = LandmarkFrame::new().with_group(LandmarkGroup::LeftHand, points);

        let joints = frame.hand_joints(Handedness::Left);
        assert_eq!(joints.len(), 21);
        assert_eq!(joints[20].id, 20);
        assert!(frame.hand_joints(Handedness::Right).is_empty());
        assert_eq!(frame.point_count(), 21);
    }

    #[test]
    fn test_joint_distance() {
        let a = Joint::new(0, 0.0, 0.0);
        let b = Joint::new(0, 0.3, 0.4);
        assert!((a.distance(&b) - 0.5).abs() < 1e-6);
    }
}
