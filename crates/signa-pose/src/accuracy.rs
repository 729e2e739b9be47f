//! Accuracy classes for visualization
//!
//! These never feed back into the score.

use crate::{Bone, JointErrorMap};

/// Errors below this are drawn as accurate
pub const ACCURATE_ERROR: f32 = 0.03;

/// Errors below this (and not accurate) are drawn as moderate
pub const MODERATE_ERROR: f32 = 0.08;

/// Visual accuracy class of a joint or bone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointAccuracy {
    Accurate,
    Moderate,
    Error,
    NoData,
}

impl JointAccuracy {
    /// Classify a joint error; `None` means the joint was not compared
    pub fn classify(error: Option<f32>) -> Self {
        match error {
            None => JointAccuracy::NoData,
            Some(e) if e < ACCURATE_ERROR => JointAccuracy::Accurate,
            Some(e) if e < MODERATE_ERROR => JointAccuracy::Moderate,
            Some(_) => JointAccuracy::Error,
        }
    }

    /// Overlay colour (RGBA)
    pub fn rgba(self) -> [u8; 4] {
        match self {
            JointAccuracy::Accurate => [0, 255, 0, 230],
            JointAccuracy::Moderate => [255, 215, 0, 230],
            JointAccuracy::Error => [255, 0, 0, 230],
            JointAccuracy::NoData => [128, 128, 128, 178],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            JointAccuracy::Accurate => "accurate",
            JointAccuracy::Moderate => "moderate",
            JointAccuracy::Error => "error",
            JointAccuracy::NoData => "no data",
        }
    }
}

/// Class of a single joint id
pub fn joint_accuracy(errors: &JointErrorMap, id: u32) -> JointAccuracy {
    JointAccuracy::classify(errors.get(&id).copied())
}

/// Class of a bone: the worse of its two endpoints, a missing endpoint counting as exact
pub fn bone_accuracy(errors: &JointErrorMap, bone: Bone) -> JointAccuracy {
    let a = errors.get(&bone.0).copied().unwrap_or(0.0);
    let b = errors.get(&bone.1).copied().unwrap_or(0.0);
    JointAccuracy::classify(Some(a.max(b)))
}

/// Score-board band of a 0-100 score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreGrade {
    Good,
    Fair,
    Poor,
}

impl ScoreGrade {
    pub fn from_score(score: u8) -> Self {
        if score >= 80 {
            ScoreGrade::Good
        } else if score >= 60 {
            ScoreGrade::Fair
        } else {
            ScoreGrade::Poor
        }
    }

    /// Display colour as a hex string
    pub fn color(self) -> &'static str {
        match self {
            ScoreGrade::Good => "#00d26a",
            ScoreGrade::Fair => "#ffb800",
            ScoreGrade::Poor => "#ff4444",
        }
    }
}
