//! Hand skeleton topology
//!
//! The 21-point hand model: joint 0 is the wrist, then four joints per
//! finger from knuckle to tip. Bones are fixed parent/child pairs.

use signa_core::Joint;

/// Number of joints in the hand model
pub const HAND_JOINT_COUNT: usize = 21;

/// A bone between two joint ids (parent, child)
pub type Bone = (u32, u32);

/// Fixed bones of the hand model
pub const HAND_CONNECTIONS: [Bone; 20] = [
    // Thumb
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 4),
    // Index
    (0, 5),
    (5, 6),
    (6, 7),
    (7, 8),
    // Middle
    (0, 9),
    (9, 10),
    (10, 11),
    (11, 12),
    // Ring
    (0, 13),
    (13, 14),
    (14, 15),
    (15, 16),
    // Pinky
    (0, 17),
    (17, 18),
    (18, 19),
    (19, 20),
];

/// Finger a joint belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Finger {
    Wrist,
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    /// Finger of a hand joint id, `None` outside the model
    pub fn of_joint(id: u32) -> Option<Finger> {
        match id {
            0 => Some(Finger::Wrist),
            1..=4 => Some(Finger::Thumb),
            5..=8 => Some(Finger::Index),
            9..=12 => Some(Finger::Middle),
            13..=16 => Some(Finger::Ring),
            17..=20 => Some(Finger::Pinky),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Finger::Wrist => "wrist",
            Finger::Thumb => "thumb",
            Finger::Index => "index finger",
            Finger::Middle => "middle finger",
            Finger::Ring => "ring finger",
            Finger::Pinky => "pinky",
        }
    }

    /// Tip joint id; the wrist is its own tip
    pub fn tip(self) -> u32 {
        match self {
            Finger::Wrist => 0,
            Finger::Thumb => 4,
            Finger::Index => 8,
            Finger::Middle => 12,
            Finger::Ring => 16,
            Finger::Pinky => 20,
        }
    }
}

/// Normalized joint position to surface pixel coordinates
pub fn to_pixels(joint: &Joint, width: u32, height: u32) -> (f32, f32) {
    (joint.x * width as f32, joint.y * height as f32)
}

/// Horizontally mirrored joints, for drawing over a mirrored preview
pub fn mirrored(joints: &[Joint]) -> Vec<Joint> {
    joints
        .iter()
        .map(|j| Joint::new(j.id, 1.0 - j.x, j.y))
        .collect()
}

/// Find a joint by id
pub fn find_joint(joints: &[Joint], id: u32) -> Option<&Joint> {
    joints.iter().find(|j| j.id == id)
}

/// Bones whose both endpoints are present in `joints`
pub fn present_bones(joints: &[Joint]) -> impl Iterator<Item = (&Joint, &Joint)> + '_ {
    HAND_CONNECTIONS.iter().filter_map(move |(a, b)| {
        let ja = find_joint(joints, *a)?;
        let jb = find_joint(joints, *b)?;
        Some((ja, jb))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connections_cover_model() {
        let mut seen = [false; HAND_JOINT_COUNT];
        for (a, b) in HAND_CONNECTIONS {
            seen[a as usize] = true;
            seen[b as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_finger_lookup() {
        assert_eq!(Finger::of_joint(0), Some(Finger::Wrist));
        assert_eq!(Finger::of_joint(4), Some(Finger::Thumb));
        assert_eq!(Finger::of_joint(8), Some(Finger::Index));
        assert_eq!(Finger::of_joint(20), Some(Finger::Pinky));
        assert_eq!(Finger::of_joint(21), None);
        assert_eq!(Finger::Index.tip(), 8);
    }

    #[test]
    fn test_to_pixels() {
        let (x, y) = to_pixels(&Joint::new(0, 0.5, 0.25), 640, 480);
        assert!((x - 320.0).abs() < 1e-3);
        assert!((y - 120.0).abs() < 1e-3);
    }

    #[test]
    fn test_mirrored() {
        let joints = mirrored(&[Joint::new(3, 0.2, 0.7)]);
        assert!((joints[0].x - 0.8).abs() < 1e-6);
        assert_eq!(joints[0].y, 0.7);
        assert_eq!(joints[0].id, 3);
    }

    #[test]
    fn test_present_bones_skips_missing() {
        let joints = vec![Joint::new(0, 0.5, 0.5), Joint::new(1, 0.4, 0.4), Joint::new(5, 0.6, 0.4)];
        assert_eq!(present_bones(&joints).count(), 2);
    }
}
