//! Signa Core - Fundamental types and primitives
//!
//! This crate defines the types shared by every layer of the capture engine:
//! - Identifiers (LessonId)
//! - Session time (SessionTime)
//! - Landmarks and joints produced by the tracker
//! - Capture plans, evidence batches and score results
//! - Engine events and the error taxonomy

pub mod error;
pub mod event;
pub mod evidence;
pub mod id;
pub mod landmark;
pub mod plan;
pub mod score;
pub mod time;

pub use error::*;
pub use event::*;
pub use evidence::*;
pub use id::*;
pub use landmark::*;
pub use plan::*;
pub use score::*;
pub use time::*;
