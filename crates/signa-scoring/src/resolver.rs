//! Capture plan resolution
//!
//! A lesson's plan is fetched once and cached for the session. Lookup
//! failures fall back to a single-frame plan so that capture is never
//! blocked on the lesson backend; fallbacks are not cached and the next
//! round asks again.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use signa_core::{CapturePlan, LessonId, SignaError, SignaResult, MULTI_FRAME_INTERVAL};
use tracing::{debug, warn};

use crate::LessonInfo;

/// Largest frame count accepted from the lesson backend
pub const MAX_FRAME_COUNT: u32 = 30;

/// Resolves and caches capture plans
pub struct PlanResolver<L> {
    lessons: L,
    interval: Duration,
    cache: Mutex<HashMap<LessonId, CapturePlan>>,
}

impl<L: LessonInfo> PlanResolver<L> {
    pub fn new(lessons: L) -> Self {
        Self::with_interval(lessons, MULTI_FRAME_INTERVAL)
    }

    /// Resolver with non-default multi-frame spacing
    pub fn with_interval(lessons: L, interval: Duration) -> Self {
        Self {
            lessons,
            interval,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Plan for a lesson; never fails
    pub async fn resolve(&self, lesson: LessonId) -> CapturePlan {
        if let Some(plan) = self.cached(lesson) {
            return plan;
        }

        match self.fetch(lesson).await {
            Ok(plan) => {
                debug!(%lesson, frames = plan.frame_count(), "Resolved capture plan");
                self.cache.lock().insert(lesson, plan);
                plan
            }
            Err(e) => {
                warn!(%lesson, error = %e, "Capture plan lookup failed, using single frame");
                CapturePlan::single()
            }
        }
    }

    async fn fetch(&self, lesson: LessonId) -> SignaResult<CapturePlan> {
        let info = self.lessons.capture_plan(lesson).await?;
        if info.frame_count > MAX_FRAME_COUNT {
            return Err(SignaError::InvalidPlan(format!(
                "{} frames exceeds the limit of {}",
                info.frame_count, MAX_FRAME_COUNT
            )));
        }
        Ok(CapturePlan::with_interval(info.frame_count, self.interval))
    }

    pub fn cached(&self, lesson: LessonId) -> Option<CapturePlan> {
        self.cache.lock().get(&lesson).copied()
    }

    /// Forget every cached plan (new session)
    pub fn clear(&self) {
        self.cache.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CapturePlanInfo;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingLessons {
        frames: SignaResult<u32>,
        calls: AtomicU32,
    }

    impl CountingLessons {
        fn new(frames: SignaResult<u32>) -> Self {
            Self {
                frames,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl LessonInfo for CountingLessons {
        async fn capture_plan(&self, _lesson: LessonId) -> SignaResult<CapturePlanInfo> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.frames.clone().map(|frame_count| CapturePlanInfo { frame_count })
        }
    }

    #[tokio::test]
    async fn test_multi_frame_plan_cached() {
        let resolver = PlanResolver::new(CountingLessons::new(Ok(3)));
        let lesson = LessonId::new(8);

        let plan = resolver.resolve(lesson).await;
        assert_eq!(plan.frame_count(), 3);
        assert_eq!(plan.interval(), Duration::from_millis(1500));

        resolver.resolve(lesson).await;
        assert_eq!(resolver.lessons.calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.cached(lesson), Some(plan));
    }

    #[tokio::test]
    async fn test_failure_falls_back_uncached() {
        let resolver = PlanResolver::new(CountingLessons::new(Err(SignaError::LessonInfo(
            "offline".to_string(),
        ))));
        let lesson = LessonId::new(8);

        assert_eq!(resolver.resolve(lesson).await, CapturePlan::single());
        assert_eq!(resolver.resolve(lesson).await, CapturePlan::single());
        assert_eq!(resolver.lessons.calls.load(Ordering::SeqCst), 2);
        assert!(resolver.cached(lesson).is_none());
    }

    #[tokio::test]
    async fn test_zero_and_oversized_counts() {
        let resolver = PlanResolver::new(CountingLessons::new(Ok(0)));
        assert_eq!(resolver.resolve(LessonId::new(1)).await, CapturePlan::single());

        let resolver = PlanResolver::new(CountingLessons::new(Ok(500)));
        assert_eq!(resolver.resolve(LessonId::new(1)).await, CapturePlan::single());
        assert!(resolver.cached(LessonId::new(1)).is_none());
    }

    #[tokio::test]
    async fn test_custom_interval_and_clear() {
        let resolver = PlanResolver::with_interval(CountingLessons::new(Ok(2)), Duration::from_millis(900));
        let plan = resolver.resolve(LessonId::new(1)).await;
        assert_eq!(plan.interval(), Duration::from_millis(900));

        resolver.clear();
        assert!(resolver.cached(LessonId::new(1)).is_none());
    }
}
