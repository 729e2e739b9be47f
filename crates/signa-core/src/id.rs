//! Identity types for lessons
//!
//! Lesson ids arrive as route strings from the surrounding page code and are
//! validated here before any network call is attempted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::SignaError;

/// Lesson identity - non-negative integer known to the lesson and scoring backends
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LessonId(pub u32);

impl LessonId {
    #[inline]
    pub fn new(id: u32) -> Self {
        LessonId(id)
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }

    /// Parse a lesson id from its textual form.
    ///
    /// Surrounding whitespace is tolerated; anything other than ASCII digits
    /// (signs, trailing letters, decimals) is rejected.
    pub fn parse(raw: &str) -> Result<Self, SignaError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SignaError::InvalidLessonId(raw.to_string()));
        }
        trimmed
            .parse::<u32>()
            .map(LessonId)
            .map_err(|_| SignaError::InvalidLessonId(raw.to_string()))
    }
}

impl FromStr for LessonId {
    type Err = SignaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LessonId::parse(s)
    }
}

impl fmt::Debug for LessonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lesson({})", self.0)
    }
}

impl fmt::Display for LessonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
