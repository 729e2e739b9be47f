//! Signa Scoring - External collaborators of the capture engine
//!
//! - [`ScoringService`]: judges an evidence batch for a lesson
//! - [`LessonInfo`]: reports how many frames a lesson needs
//! - [`HttpScoringClient`] / [`HttpLessonInfo`]: the backend over HTTP
//! - [`LocalScoringService`]: client-side scoring against reference gestures
//! - [`PlanResolver`]: per-session capture plan cache with a safe fallback

pub mod http;
pub mod local;
pub mod resolver;
pub mod service;

pub use http::*;
pub use local::*;
pub use resolver::*;
pub use service::*;
