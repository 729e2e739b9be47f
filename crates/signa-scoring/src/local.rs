//! Client-side scoring against registered reference gestures
//!
//! Each landmark frame of a batch is scored against the lesson's reference
//! gesture using the hand that performs it. Motion references score the best
//! matching reference frame. The batch score is the mean over evidence frames.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use signa_core::{Evidence, EvidenceBatch, Handedness, LessonId, ScoreResult, SignaError, SignaResult};
use signa_pose::{PoseComparison, ScoreCalibration, TargetGesture};
use tracing::debug;

use crate::ScoringService;

/// Local scorer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalScoringConfig {
    /// Minimum 0-100 score accepted as correct
    pub pass_score: u8,
    /// Average joint error mapped to a score of zero
    pub zero_score_error: f32,
}

impl Default for LocalScoringConfig {
    fn default() -> Self {
        Self {
            pass_score: 80,
            zero_score_error: signa_pose::ZERO_SCORE_ERROR,
        }
    }
}

fn hand_name(hand: Handedness) -> &'static str {
    match hand {
        Handedness::Left => "left",
        Handedness::Right => "right",
    }
}

/// Scores landmark evidence on the client
#[derive(Debug)]
pub struct LocalScoringService {
    gestures: RwLock<HashMap<LessonId, TargetGesture>>,
    calibration: ScoreCalibration,
    pass_score: u8,
}

impl LocalScoringService {
    pub fn new(config: &LocalScoringConfig) -> Self {
        Self {
            gestures: RwLock::new(HashMap::new()),
            calibration: ScoreCalibration::new(config.zero_score_error),
            pass_score: config.pass_score.min(100),
        }
    }

    pub fn register_all(&self, gestures: impl IntoIterator<Item = (LessonId, TargetGesture)>) -> SignaResult<()> {
        for (lesson, gesture) in gestures {
            self.register(lesson, gesture)?;
        }
        Ok(())
    }

    /// Register (or replace) the reference gesture of a lesson
    pub fn register(&self, lesson: LessonId, gesture: TargetGesture) -> SignaResult<()> {
        gesture.pose.validate()?;
        self.gestures.write().insert(lesson, gesture);
        Ok(())
    }

    pub fn is_registered(&self, lesson: LessonId) -> bool {
        self.gestures.read().contains_key(&lesson)
    }

    pub fn pass_score(&self) -> u8 {
        self.pass_score
    }

    /// Score a batch against a gesture without touching the registry
    pub fn score_batch(&self, gesture: &TargetGesture, batch: &EvidenceBatch) -> SignaResult<ScoreResult> {
        let mut comparisons: Vec<PoseComparison> = Vec::with_capacity(batch.len());
        for evidence in batch.iter() {
            let frame = match evidence {
                Evidence::Landmarks(frame) => frame,
                Evidence::Image(_) => {
                    return Err(SignaError::ScoringService(
                        "local scoring needs landmark evidence".to_string(),
                    ))
                }
            };
            let observed = frame.hand_joints(gesture.hand);
            let comparison = gesture
                .pose
                .best_match(&observed, &self.calibration)
                .ok_or_else(|| SignaError::InvalidReferencePose("reference has no frames".to_string()))?;
            comparisons.push(comparison);
        }
        if comparisons.is_empty() {
            return Err(SignaError::ScoringService("empty evidence batch".to_string()));
        }

        let total: u32 = comparisons.iter().map(|c| u32::from(c.score)).sum();
        let mean = total as f32 / comparisons.len() as f32;
        let score_percent = mean.round() as u8;
        let is_correct = score_percent >= self.pass_score;

        let feedback = if is_correct {
            None
        } else {
            Some(self.feedback_for(gesture.hand, &comparisons))
        };
        debug!(score = score_percent, frames = comparisons.len(), "Scored batch locally");

        Ok(ScoreResult::new(is_correct, mean / 100.0, feedback))
    }

    /// Guidance from the weakest evidence frame
    fn feedback_for(&self, hand: Handedness, comparisons: &[PoseComparison]) -> String {
        let weakest = comparisons.iter().min_by_key(|c| c.score);
        match weakest {
            Some(c) if c.matched() == 0 => {
                format!("Show your {} hand to the camera", hand_name(hand))
            }
            Some(c) => match c.worst_finger() {
                Some((finger, _)) => format!("Adjust your {} position", finger.name()),
                None => signa_core::DEFAULT_RETRY_MESSAGE.to_string(),
            },
            None => signa_core::DEFAULT_RETRY_MESSAGE.to_string(),
        }
    }
}

impl Default for LocalScoringService {
    fn default() -> Self {
        Self::new(&LocalScoringConfig::default())
    }
}

#[async_trait]
impl ScoringService for LocalScoringService {
    async fn evaluate(&self, lesson: LessonId, batch: &EvidenceBatch) -> SignaResult<ScoreResult> {
        let gesture = self
            .gestures
            .read()
            .get(&lesson)
            .cloned()
            .ok_or_else(|| {
                SignaError::ScoringService(format!("no reference gesture for lesson {}", lesson))
            })?;
        self.score_batch(&gesture, batch)
    }
}
