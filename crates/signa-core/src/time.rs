//! Time primitives for capture sessions
//!
//! Session time is monotonic and local: microseconds since the clock that
//! produced it was started. It is only ever compared against other readings
//! of the same clock.

use std::ops::{Add, Sub};
use std::time::Duration;

/// Session time - monotonic, local-driven
/// Represented as microseconds since clock start
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SessionTime(pub u64);

impl SessionTime {
    pub const ZERO: SessionTime = SessionTime(0);

    #[inline]
    pub fn from_micros(micros: u64) -> Self {
        SessionTime(micros)
    }

    #[inline]
    pub fn from_millis(millis: u64) -> Self {
        SessionTime(millis.saturating_mul(1000))
    }

    #[inline]
    pub fn as_micros(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn as_millis(self) -> u64 {
        self.0 / 1000
    }

    #[inline]
    pub fn saturating_add(self, duration: Duration) -> Self {
        SessionTime(self.0.saturating_add(duration.as_micros() as u64))
    }

    /// Time elapsed since an earlier reading; zero if `earlier` is later
    #[inline]
    pub fn since(self, earlier: SessionTime) -> Duration {
        self - earlier
    }
}

impl Add<Duration> for SessionTime {
    type Output = SessionTime;

    #[inline]
    fn add(self, rhs: Duration) -> Self::Output {
        self.saturating_add(rhs)
    }
}

impl Sub<SessionTime> for SessionTime {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: SessionTime) -> Self::Output {
        Duration::from_micros(self.0.saturating_sub(rhs.0))
    }
}

impl std::fmt::Debug for SessionTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t({:.3}ms)", self.0 as f64 / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_roundtrip() {
        let t = SessionTime::from_millis(4999);
        assert_eq!(t.as_millis(), 4999);
        assert_eq!(t.as_micros(), 4_999_000);
    }

    #[test]
    fn test_from_millis_saturates() {
        assert_eq!(SessionTime::from_millis(u64::MAX).as_micros(), u64::MAX);
        assert_eq!(SessionTime::from_millis(u64::MAX / 1000).as_millis(), u64::MAX / 1000);
    }

    #[test]
    fn test_sub_saturates() {
        let early = SessionTime::from_millis(100);
        let late = SessionTime::from_millis(350);
        assert_eq!(late - early, Duration::from_millis(250));
        assert_eq!(early - late, Duration::ZERO);
        assert_eq!(late.since(early), Duration::from_millis(250));
    }

    #[test]
    fn test_add_duration() {
        let t = SessionTime::ZERO + Duration::from_millis(5000);
        assert_eq!(t, SessionTime::from_millis(5000));
    }
}
