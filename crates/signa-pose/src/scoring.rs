//! Joint errors and the 0-100 similarity score
//!
//! The score is a linear, clamped map of the average joint error. The
//! zero-score error (0.1 in normalized units) is a calibration default, not
//! a property of the tracker; it is exposed as [`ScoreCalibration`].

use std::collections::BTreeMap;

use signa_core::Joint;

use crate::Finger;

/// Average error at (and beyond) which the score reaches zero
pub const ZERO_SCORE_ERROR: f32 = 0.1;

/// Per-joint distance, keyed by joint id
pub type JointErrorMap = BTreeMap<u32, f32>;

/// Distance of every target joint to the observed joint of the same id.
///
/// Target joints without an observed counterpart are left out of the map;
/// they are not treated as zero error.
pub fn joint_errors(target: &[Joint], observed: &[Joint]) -> JointErrorMap {
    target
        .iter()
        .filter_map(|t| {
            observed
                .iter()
                .find(|o| o.id == t.id)
                .map(|o| (t.id, t.distance(o)))
        })
        .collect()
}

/// Mean of all errors, `None` for an empty map
pub fn average_error(errors: &JointErrorMap) -> Option<f32> {
    if errors.is_empty() {
        return None;
    }
    let total: f32 = errors.values().sum();
    Some(total / errors.len() as f32)
}

/// Linear error-to-score calibration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreCalibration {
    /// Average error mapped to a score of zero
    pub zero_score_error: f32,
}

impl Default for ScoreCalibration {
    fn default() -> Self {
        Self {
            zero_score_error: ZERO_SCORE_ERROR,
        }
    }
}

impl ScoreCalibration {
    pub fn new(zero_score_error: f32) -> Self {
        Self { zero_score_error }
    }

    /// Map an average error to the 0-100 scale
    pub fn score_for_error(&self, average_error: f32) -> u8 {
        if !average_error.is_finite() || self.zero_score_error <= 0.0 {
            return 0;
        }
        let raw = (1.0 - average_error / self.zero_score_error) * 100.0;
        raw.clamp(0.0, 100.0).round() as u8
    }

    /// Score an error map; an empty map scores zero
    pub fn score_errors(&self, errors: &JointErrorMap) -> u8 {
        average_error(errors)
            .map(|avg| self.score_for_error(avg))
            .unwrap_or(0)
    }

    /// Compare two skeletons
    pub fn compare(&self, target: &[Joint], observed: &[Joint]) -> PoseComparison {
        let errors = joint_errors(target, observed);
        let average_error = average_error(&errors);
        let score = self.score_errors(&errors);
        PoseComparison {
            errors,
            average_error,
            score,
        }
    }

    pub fn score(&self, target: &[Joint], observed: &[Joint]) -> u8 {
        self.score_errors(&joint_errors(target, observed))
    }
}

/// Similarity score of `observed` against `target` with the default calibration
pub fn score(target: &[Joint], observed: &[Joint]) -> u8 {
    ScoreCalibration::default().score(target, observed)
}

/// Result of comparing two skeletons
#[derive(Debug, Clone, PartialEq)]
pub struct PoseComparison {
    pub errors: JointErrorMap,
    pub average_error: Option<f32>,
    pub score: u8,
}

impl PoseComparison {
    /// Number of joints that could be compared
    pub fn matched(&self) -> usize {
        self.errors.len()
    }

    /// Finger with the largest mean joint error
    pub fn worst_finger(&self) -> Option<(Finger, f32)> {
        worst_finger(&self.errors)
    }
}

/// Mean error per finger, in finger order
pub fn finger_errors(errors: &JointErrorMap) -> Vec<(Finger, f32)> {
    let mut sums: BTreeMap<Finger, (f32, u32)> = BTreeMap::new();
    for (id, error) in errors {
        if let Some(finger) = Finger::of_joint(*id) {
            let entry = sums.entry(finger).or_insert((0.0, 0));
            entry.0 += *error;
            entry.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(finger, (sum, n))| (finger, sum / n as f32))
        .collect()
}

/// Finger with the largest mean error; ties keep the earlier finger
pub fn worst_finger(errors: &JointErrorMap) -> Option<(Finger, f32)> {
    finger_errors(errors)
        .into_iter()
        .fold(None, |worst, (finger, error)| match worst {
            Some((_, w)) if w >= error => worst,
            _ => Some((finger, error)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hand(offset_x: f32, offset_y: f32) -> Vec<Joint> {
        (0..21)
            .map(|i| {
                Joint::new(
                    i,
                    0.3 + (i % 5) as f32 * 0.05 + offset_x,
                    0.3 + (i / 5) as f32 * 0.05 + offset_y,
                )
            })
            .collect()
    }

    #[test]
    fn test_identical_scores_full() {
        let target = hand(0.0, 0.0);
        assert_eq!(score(&target, &target), 100);
    }

    #[test]
    fn test_missing_joints_excluded() {
        let target = hand(0.0, 0.0);
        let observed: Vec<Joint> = target.iter().take(5).copied().collect();

        let errors = joint_errors(&target, &observed);
        assert_eq!(errors.len(), 5);
        assert_eq!(score(&target, &observed), 100);
    }

    #[test]
    fn test_empty_observed_scores_zero() {
        let target = hand(0.0, 0.0);
        assert!(joint_errors(&target, &[]).is_empty());
        assert_eq!(score(&target, &[]), 0);
        assert_eq!(average_error(&JointErrorMap::new()), None);
    }

    #[test]
    fn test_linear_mapping() {
        let calibration = ScoreCalibration::default();
        assert_eq!(calibration.score_for_error(0.0), 100);
        assert_eq!(calibration.score_for_error(0.05), 50);
        assert_eq!(calibration.score_for_error(0.1), 0);
        assert_eq!(calibration.score_for_error(0.7), 0);
        assert_eq!(calibration.score_for_error(f32::NAN), 0);
    }

    #[test]
    fn test_custom_calibration() {
        let loose = ScoreCalibration::new(0.2);
        assert_eq!(loose.score_for_error(0.05), 75);
    }

    #[test]
    fn test_uniform_offset_score() {
        let target = hand(0.0, 0.0);
        let observed = hand(0.03, 0.04);
        let comparison = ScoreCalibration::default().compare(&target, &observed);

        assert_eq!(comparison.matched(), 21);
        assert!((comparison.average_error.unwrap() - 0.05).abs() < 1e-4);
        assert_eq!(comparison.score, 50);
    }

    #[test]
    fn test_worst_finger() {
        let target = hand(0.0, 0.0);
        let mut observed = target.clone();
        for joint in observed.iter_mut().filter(|j| (5..=8).contains(&j.id)) {
            joint.y += 0.06;
        }

        let comparison = ScoreCalibration::default().compare(&target, &observed);
        let (finger, error) = comparison.worst_finger().unwrap();
        assert_eq!(finger, Finger::Index);
        assert!((error - 0.06).abs() < 1e-4);
        assert_eq!(finger_errors(&comparison.errors).len(), 6);
    }

    proptest! {
        #[test]
        fn prop_identical_is_perfect(xs in prop::collection::vec((0.0f32..=1.0, 0.0f32..=1.0), 1..21)) {
            let target: Vec<Joint> = xs.iter().enumerate()
                .map(|(i, (x, y))| Joint::new(i as u32, *x, *y))
                .collect();
            prop_assert_eq!(score(&target, &target.clone()), 100);
        }

        #[test]
        fn prop_far_is_zero(d in 0.1f32..1.0, angle in 0.0f32..std::f32::consts::TAU) {
            let target = hand(0.0, 0.0);
            let observed = hand(d * angle.cos(), d * angle.sin());
            prop_assert_eq!(score(&target, &observed), 0);
        }

        #[test]
        fn prop_mapping_monotonic(a in 0.0f32..0.3, b in 0.0f32..0.3) {
            let calibration = ScoreCalibration::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(calibration.score_for_error(lo) >= calibration.score_for_error(hi));
        }

        #[test]
        fn prop_score_monotonic_in_offset(d in 0.0f32..0.15, extra in 0.001f32..0.1) {
            let target = hand(0.0, 0.0);
            let near = score(&target, &hand(d, 0.0));
            let far = score(&target, &hand(d + extra, 0.0));
            prop_assert!(near >= far);
        }
    }
}
