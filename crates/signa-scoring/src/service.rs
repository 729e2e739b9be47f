//! Collaborator interfaces

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use signa_core::{EvidenceBatch, LessonId, ScoreResult, SignaResult};

/// Judges one attempt
///
/// Network-bound and fallible. The lesson id is already validated; callers
/// holding a raw route string must parse it with [`LessonId::parse`] first.
#[async_trait]
pub trait ScoringService: Send + Sync {
    async fn evaluate(&self, lesson: LessonId, batch: &EvidenceBatch) -> SignaResult<ScoreResult>;
}

#[async_trait]
impl<T: ScoringService + ?Sized> ScoringService for Arc<T> {
    async fn evaluate(&self, lesson: LessonId, batch: &EvidenceBatch) -> SignaResult<ScoreResult> {
        (**self).evaluate(lesson, batch).await
    }
}

/// Capture requirements reported by the lesson backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturePlanInfo {
    pub frame_count: u32,
}

/// Lesson metadata source
#[async_trait]
pub trait LessonInfo: Send + Sync {
    async fn capture_plan(&self, lesson: LessonId) -> SignaResult<CapturePlanInfo>;
}

#[async_trait]
impl<T: LessonInfo + ?Sized> LessonInfo for Arc<T> {
    async fn capture_plan(&self, lesson: LessonId) -> SignaResult<CapturePlanInfo> {
        (**self).capture_plan(lesson).await
    }
}

/// Lesson info for deployments without a lesson backend: every lesson is single-frame
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleFrameLessons;

#[async_trait]
impl LessonInfo for SingleFrameLessons {
    async fn capture_plan(&self, _lesson: LessonId) -> SignaResult<CapturePlanInfo> {
        Ok(CapturePlanInfo { frame_count: 1 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_info_wire_format() {
        let info: CapturePlanInfo = serde_json::from_str(r#"{"frameCount":3}"#).unwrap();
        assert_eq!(info.frame_count, 3);
        assert!(serde_json::from_str::<CapturePlanInfo>(r#"{"frameCount":-1}"#).is_err());
    }

    #[tokio::test]
    async fn test_single_frame_lessons() {
        let info = SingleFrameLessons.capture_plan(LessonId::new(4)).await.unwrap();
        assert_eq!(info.frame_count, 1);
    }
}
