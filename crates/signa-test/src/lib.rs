//! Signa Test Harness - Scripted tracker, recording fakes and engine scenarios
//!
//! This crate provides:
//! - A scripted tracker that publishes poses and drives a manual clock
//! - Fakes for the scoring service, lesson backend and frame capture
//! - An event recorder for asserting on what the engine published
//! - End-to-end scenarios that run a real engine task

pub mod fakes;
pub mod recorder;
pub mod scenarios;
pub mod tracker;

pub use fakes::*;
pub use recorder::*;
pub use scenarios::*;
pub use tracker::*;
