//! HTTP clients for the scoring and lesson backends
//!
//! Feedback: `POST {base}/api/lessons/{id}/feedback`
//! - image evidence as `multipart/form-data`, one JPEG part per frame
//!   (`file` for a single frame, `files` for a sequence)
//! - landmark evidence as JSON, `raw_landmarks` for one frame or `frames`
//!   for a sequence
//!
//! Capture plan: `GET {base}/api/lessons/{id}/capture-plan`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use signa_core::{Evidence, EvidenceBatch, LessonId, ScoreResult, SignaError, SignaResult};
use tracing::{debug, warn};

use crate::{CapturePlanInfo, LessonInfo, ScoringService};

/// Scoring backend connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpScoringConfig {
    pub base_url: String,
    /// Transport-level timeout of one request
    pub timeout_ms: u64,
}

impl Default for HttpScoringConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_ms: 30_000,
        }
    }
}

/// Lesson backend connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpLessonInfoConfig {
    pub base_url: String,
    /// Transport-level timeout of one request
    pub timeout_ms: u64,
}

impl Default for HttpLessonInfoConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_ms: 10_000,
        }
    }
}

fn lesson_url(base_url: &str, lesson: LessonId, leaf: &str) -> String {
    format!(
        "{}/api/lessons/{}/{}",
        base_url.trim_end_matches('/'),
        lesson,
        leaf
    )
}

/// Multipart field name for a batch of `count` images
pub fn image_field_name(count: usize) -> &'static str {
    if count == 1 {
        "file"
    } else {
        "files"
    }
}

/// Multipart form carrying every still of an image batch
pub fn image_form(batch: &EvidenceBatch) -> SignaResult<Form> {
    let field = image_field_name(batch.len());
    let mut form = Form::new();
    for (i, evidence) in batch.iter().enumerate() {
        let still = evidence.as_image().ok_or_else(|| {
            SignaError::ScoringService("batch mixes images and landmarks".to_string())
        })?;
        let part = Part::bytes(still.data.to_vec())
            .file_name(format!("frame_{}.jpg", i))
            .mime_str(still.mime)
            .map_err(|e| SignaError::ScoringService(e.to_string()))?;
        form = form.part(field, part);
    }
    Ok(form)
}

/// JSON body carrying every landmark snapshot of a batch
pub fn landmark_body(lesson: LessonId, batch: &EvidenceBatch) -> SignaResult<Value> {
    let frames = batch
        .iter()
        .map(|evidence| match evidence {
            Evidence::Landmarks(frame) => {
                serde_json::to_value(frame).map_err(|e| SignaError::ScoringService(e.to_string()))
            }
            Evidence::Image(_) => Err(SignaError::ScoringService(
                "batch mixes images and landmarks".to_string(),
            )),
        })
        .collect::<SignaResult<Vec<Value>>>()?;

    let body = match <[Value; 1]>::try_from(frames) {
        Ok([single]) => json!({ "target_word_id": lesson.get(), "raw_landmarks": single }),
        Err(frames) => json!({ "target_word_id": lesson.get(), "frames": frames }),
    };
    Ok(body)
}

fn build_client(timeout: Duration) -> SignaResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| SignaError::Config(format!("HTTP client: {}", e)))
}

async fn check_status(
    response: Response,
    context: &str,
    to_error: fn(String) -> SignaError,
) -> SignaResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!("{}: non-success status ({})", context, status);
    Err(to_error(format!("HTTP {}: {}", status.as_u16(), body.trim())))
}

/// Scoring backend over HTTP
#[derive(Debug, Clone)]
pub struct HttpScoringClient {
    client: Client,
    base_url: String,
}

impl HttpScoringClient {
    pub fn new(config: &HttpScoringConfig) -> SignaResult<Self> {
        Ok(Self {
            client: build_client(Duration::from_millis(config.timeout_ms))?,
            base_url: config.base_url.clone(),
        })
    }

    pub fn feedback_url(&self, lesson: LessonId) -> String {
        lesson_url(&self.base_url, lesson, "feedback")
    }
}

#[async_trait]
impl ScoringService for HttpScoringClient {
    async fn evaluate(&self, lesson: LessonId, batch: &EvidenceBatch) -> SignaResult<ScoreResult> {
        let url = self.feedback_url(lesson);
        let request = if batch.is_images() {
            self.client.post(&url).multipart(image_form(batch)?)
        } else {
            self.client.post(&url).json(&landmark_body(lesson, batch)?)
        };
        debug!(%url, frames = batch.len(), "Submitting evidence");

        let response = request
            .send()
            .await
            .map_err(|e| SignaError::ScoringService(e.to_string()))?;
        let response = check_status(response, "feedback", SignaError::ScoringService).await?;

        response
            .json::<ScoreResult>()
            .await
            .map_err(|e| SignaError::ScoringService(format!("malformed response: {}", e)))
    }
}

/// Lesson backend over HTTP
#[derive(Debug, Clone)]
pub struct HttpLessonInfo {
    client: Client,
    base_url: String,
}

impl HttpLessonInfo {
    pub fn new(config: &HttpLessonInfoConfig) -> SignaResult<Self> {
        Ok(Self {
            client: build_client(Duration::from_millis(config.timeout_ms))?,
            base_url: config.base_url.clone(),
        })
    }

    pub fn capture_plan_url(&self, lesson: LessonId) -> String {
        lesson_url(&self.base_url, lesson, "capture-plan")
    }
}

#[async_trait]
impl LessonInfo for HttpLessonInfo {
    async fn capture_plan(&self, lesson: LessonId) -> SignaResult<CapturePlanInfo> {
        let response = self
            .client
            .get(self.capture_plan_url(lesson))
            .send()
            .await
            .map_err(|e| SignaError::LessonInfo(e.to_string()))?;
        let response = check_status(response, "capture-plan", SignaError::LessonInfo).await?;

        response
            .json::<CapturePlanInfo>()
            .await
            .map_err(|e| SignaError::LessonInfo(format!("malformed response: {}", e)))
    }
}
