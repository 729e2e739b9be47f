//! Clock implementations for the capture engine

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use signa_core::SessionTime;
use tokio::time::Instant;

/// Source of session time
pub trait Clock: Send + Sync {
    /// Current session time
    /// INVARIANT: never decreases between calls
    fn now(&self) -> SessionTime;
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> SessionTime {
        (**self).now()
    }
}

/// Monotonic clock - time since construction
///
/// Backed by `tokio::time::Instant`, so it follows paused time in tests.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        MonotonicClock {
            origin: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> SessionTime {
        SessionTime::from_micros(self.origin.elapsed().as_micros() as u64)
    }
}

/// Manually driven clock for deterministic tests
///
/// Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    micros: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jump to an absolute time; earlier times are ignored
    pub fn set(&self, time: SessionTime) {
        self.micros.fetch_max(time.as_micros(), Ordering::SeqCst);
    }

    pub fn set_millis(&self, millis: u64) {
        self.set(SessionTime::from_millis(millis));
    }

    pub fn advance(&self, by: Duration) {
        self.micros
            .fetch_add(by.as_micros() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SessionTime {
        SessionTime::from_micros(self.micros.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared() {
        let clock = ManualClock::new();
        let other = clock.clone();

        clock.set_millis(1000);
        other.advance(Duration::from_millis(250));
        assert_eq!(clock.now(), SessionTime::from_millis(1250));
    }

    #[test]
    fn test_manual_clock_never_goes_back() {
        let clock = ManualClock::new();
        clock.set_millis(500);
        clock.set_millis(100);
        assert_eq!(clock.now().as_millis(), 500);
    }

    #[tokio::test(start_paused = true)]
    async fn test_monotonic_follows_tokio_time() {
        let clock = MonotonicClock::new();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(clock.now().as_millis(), 1500);
    }
}
