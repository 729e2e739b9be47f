//! Signa Pose - Skeleton geometry and similarity scoring
//!
//! Pure functions over 2-D joints in normalized image space. No state, no I/O.
//!
//! # Pipeline
//!
//! target joints + observed joints
//!   → per-joint error map (Euclidean distance, missing joints excluded)
//!   → average error
//!   → 0-100 score through a linear, clamped calibration
//!
//! Accuracy classes (accurate / moderate / error / no data) are derived from
//! the same error map and are used for visualization only.

pub mod accuracy;
pub mod reference;
pub mod scoring;
pub mod skeleton;

pub use accuracy::*;
pub use reference::*;
pub use scoring::*;
pub use skeleton::*;
