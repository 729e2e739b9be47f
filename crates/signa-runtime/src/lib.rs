//! Signa Runtime - Capture-and-feedback orchestration
//!
//! The engine watches the tracker feed, measures how long the learner has
//! held the pose, and once the hold threshold elapses runs one capture
//! round:
//!
//! hold timer → capture plan → capture sequencer → feedback interpreter
//!
//! Everything runs on a single task. Tracker ticks that arrive while a round
//! is in flight are dropped, never queued. Pausing is advisory and checked
//! at the top of every tick and between captured frames.

pub mod clock;
pub mod config;
pub mod dialogue;
pub mod engine;
pub mod events;
pub mod hold;
pub mod interpreter;
pub mod sequencer;
pub mod telemetry;

pub use clock::*;
pub use config::*;
pub use dialogue::*;
pub use engine::*;
pub use events::*;
pub use hold::*;
pub use interpreter::*;
pub use sequencer::*;
pub use telemetry::*;
