//! Engine configuration
//!
//! Loaded from a JSON file. Every field has a default, so a partial file
//! (or none at all) is valid.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use signa_core::{SignaError, SignaResult, MULTI_FRAME_INTERVAL};
use signa_scoring::{HttpLessonInfoConfig, HttpScoringConfig, LocalScoringConfig};
use tracing::{info, warn};

use crate::{LogFormat, DEFAULT_FLASH, DEFAULT_HOLD_THRESHOLD, DEFAULT_SCORING_TIMEOUT};

/// Kind of evidence captured for scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceKind {
    /// JPEG stills of the video surface
    #[default]
    Image,
    /// Tracker landmark snapshots
    Landmarks,
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Hold time before capture triggers (milliseconds)
    pub hold_threshold_ms: u64,
    /// Flash before each frame of a multi-frame capture (milliseconds)
    pub flash_ms: u64,
    /// Spacing between frames of a multi-frame capture (milliseconds)
    pub multi_frame_interval_ms: u64,
    /// Application-level bound on one scoring call (milliseconds)
    pub scoring_timeout_ms: u64,
    /// Re-arm the hold timer right after a rejected attempt
    pub auto_rearm_on_retry: bool,
    pub evidence: EvidenceKind,
    /// JPEG quality of captured stills (1-100)
    pub jpeg_quality: u8,
    pub log_format: LogFormat,
    pub scoring: HttpScoringConfig,
    pub lessons: HttpLessonInfoConfig,
    pub local_scoring: LocalScoringConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hold_threshold_ms: DEFAULT_HOLD_THRESHOLD.as_millis() as u64,
            flash_ms: DEFAULT_FLASH.as_millis() as u64,
            multi_frame_interval_ms: MULTI_FRAME_INTERVAL.as_millis() as u64,
            scoring_timeout_ms: DEFAULT_SCORING_TIMEOUT.as_millis() as u64,
            auto_rearm_on_retry: false,
            evidence: EvidenceKind::Image,
            jpeg_quality: 95,
            log_format: LogFormat::Pretty,
            scoring: HttpScoringConfig::default(),
            lessons: HttpLessonInfoConfig::default(),
            local_scoring: LocalScoringConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn hold_threshold(&self) -> Duration {
        Duration::from_millis(self.hold_threshold_ms)
    }

    pub fn flash(&self) -> Duration {
        Duration::from_millis(self.flash_ms)
    }

    pub fn multi_frame_interval(&self) -> Duration {
        Duration::from_millis(self.multi_frame_interval_ms)
    }

    pub fn scoring_timeout(&self) -> Duration {
        Duration::from_millis(self.scoring_timeout_ms)
    }

    /// Parse and validate a JSON document
    pub fn from_json(raw: &str) -> SignaResult<Self> {
        let config: EngineConfig =
            serde_json::from_str(raw).map_err(|e| SignaError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON file
    pub fn load(path: impl AsRef<Path>) -> SignaResult<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| SignaError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&raw)
    }

    /// Load a file, falling back to defaults when it is absent or invalid
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "Config file not found, using defaults");
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                info!(path = %path.display(), "Config loaded");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Invalid config, using defaults");
                Self::default()
            }
        }
    }

    /// Override backend URLs from `SIGNA_SCORING_URL` / `SIGNA_LESSONS_URL`
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Override backend URLs from an arbitrary variable lookup
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("SIGNA_SCORING_URL").filter(|v| !v.trim().is_empty()) {
            self.scoring.base_url = url;
        }
        if let Some(url) = lookup("SIGNA_LESSONS_URL").filter(|v| !v.trim().is_empty()) {
            self.lessons.base_url = url;
        }
        self
    }

    pub fn validate(&self) -> SignaResult<()> {
        if self.hold_threshold_ms == 0 {
            return Err(SignaError::Config(
                "hold_threshold_ms must be positive".to_string(),
            ));
        }
        if self.scoring_timeout_ms == 0 {
            return Err(SignaError::Config(
                "scoring_timeout_ms must be positive".to_string(),
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(SignaError::Config(format!(
                "jpeg_quality {} outside 1..=100",
                self.jpeg_quality
            )));
        }
        if self.local_scoring.pass_score > 100 {
            return Err(SignaError::Config(format!(
                "pass_score {} above 100",
                self.local_scoring.pass_score
            )));
        }
        if self.local_scoring.zero_score_error.partial_cmp(&0.0) != Some(std::cmp::Ordering::Greater) {
            return Err(SignaError::Config(
                "zero_score_error must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
