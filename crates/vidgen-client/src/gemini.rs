//! Gemini (Veo) video generation over the Generative Language REST API.
//!
//! Jobs are started with `models/{model}:predictLongRunning`, which returns a
//! long-running operation. The operation is re-fetched by name until it
//! reports `done`, at which point it carries either an error or the list of
//! generated samples with their download URIs.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::{header::CONTENT_TYPE, Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use vidgen_models::{
    ArtifactReference, AspectRatio, GeneratedSample, GenerationRequest, OperationHandle,
    Resolution,
};

use crate::config::GeminiConfig;
use crate::error::{JobError, JobResult};
use crate::service::{DownloadedVideo, VideoService};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// `predictLongRunning` request body.
#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    instances: Vec<Instance<'a>>,
    parameters: Parameters,
}

#[derive(Debug, Serialize)]
struct Instance<'a> {
    prompt: &'a str,
    image: InlineImage,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineImage {
    bytes_base64_encoded: String,
    mime_type: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Parameters {
    sample_count: u32,
    resolution: Resolution,
    aspect_ratio: AspectRatio,
}

impl<'a> From<&'a GenerationRequest> for PredictRequest<'a> {
    fn from(request: &'a GenerationRequest) -> Self {
        let spec = request.spec();
        Self {
            instances: vec![Instance {
                prompt: request.prompt(),
                image: InlineImage {
                    bytes_base64_encoded: STANDARD.encode(request.image().bytes()),
                    mime_type: request.image().media_type().as_str(),
                },
            }],
            parameters: Parameters {
                sample_count: spec.count,
                resolution: spec.resolution,
                aspect_ratio: spec.aspect_ratio,
            },
        }
    }
}

/// Long-running operation as returned by submit and poll.
#[derive(Debug, Deserialize)]
struct Operation {
    #[serde(default)]
    name: String,
    #[serde(default)]
    done: bool,
    error: Option<Status>,
    response: Option<OperationResult>,
}

#[derive(Debug, Deserialize)]
struct Status {
    #[serde(default)]
    code: Option<i32>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResult {
    generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateVideoResponse {
    #[serde(default)]
    generated_samples: Vec<Sample>,
    #[serde(default)]
    rai_media_filtered_reasons: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Sample {
    video: Option<VideoFile>,
}

#[derive(Debug, Deserialize)]
struct VideoFile {
    uri: Option<String>,
}

/// Error body of a non-2xx response.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Status,
}

impl From<Operation> for OperationHandle {
    fn from(op: Operation) -> Self {
        if !op.done {
            return OperationHandle::pending(op.name);
        }

        if let Some(status) = op.error {
            let message = match status.code {
                Some(code) if status.message.is_empty() => {
                    format!("Operation failed with code {}", code)
                }
                _ => status.message,
            };
            return OperationHandle::failed(op.name, message);
        }

        let (samples, filtered) = op
            .response
            .and_then(|r| r.generate_video_response)
            .map(|r| {
                let samples = r
                    .generated_samples
                    .into_iter()
                    .map(|s| GeneratedSample {
                        uri: s.video.and_then(|v| v.uri),
                    })
                    .collect();
                (samples, r.rai_media_filtered_reasons)
            })
            .unwrap_or_default();

        OperationHandle::completed(op.name, samples).with_filtered_reasons(filtered)
    }
}

/// [`VideoService`] backed by the Gemini API.
pub struct GeminiVideoService {
    http: Client,
    config: GeminiConfig,
}

impl GeminiVideoService {
    /// Create a new service client.
    pub fn new(config: GeminiConfig) -> JobResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| JobError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> JobResult<Self> {
        Self::new(GeminiConfig::from_env()?)
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn submit_url(&self) -> String {
        format!("{}/models/{}:predictLongRunning", self.base_url(), self.config.model)
    }

    fn operation_url(&self, name: &str) -> String {
        format!("{}/{}", self.base_url(), name.trim_start_matches('/'))
    }

    /// Turn a submit/poll response into an operation handle.
    async fn read_operation(response: Response) -> JobResult<OperationHandle> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| JobError::Upstream(format!("Failed to read video service response: {}", e)))?;

        if !status.is_success() {
            return Err(JobError::Upstream(upstream_error_message(status, &body)));
        }

        let operation: Operation = serde_json::from_str(&body).map_err(|e| {
            JobError::Upstream(format!("Failed to parse video service response: {}", e))
        })?;

        Ok(operation.into())
    }
}

/// Message for a failed call: the JSON error message when present, else
/// the status line and raw body.
fn upstream_error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => envelope.error.message,
        _ => format!("Video service returned {}: {}", status, body.trim()),
    }
}

#[async_trait]
impl VideoService for GeminiVideoService {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn submit(&self, request: &GenerationRequest) -> JobResult<OperationHandle> {
        let url = self.submit_url();
        let body = PredictRequest::from(request);

        debug!(
            "Submitting video generation to {} ({} byte {} image)",
            url,
            request.image().len(),
            request.image().media_type()
        );

        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, self.config.api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| JobError::Upstream(format!("Video service request failed: {}", e)))?;

        let operation = Self::read_operation(response).await?;
        if operation.name().is_empty() {
            return Err(JobError::Upstream(
                "Video service did not return an operation name".to_string(),
            ));
        }

        Ok(operation)
    }

    async fn poll(&self, operation: &OperationHandle) -> JobResult<OperationHandle> {
        let url = self.operation_url(operation.name());

        let response = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, self.config.api_key.expose())
            .send()
            .await
            .map_err(|e| JobError::Upstream(format!("Video service request failed: {}", e)))?;

        let next = Self::read_operation(response).await?;

        if next.is_done() && next.samples().is_empty() && !next.filtered_reasons().is_empty() {
            warn!(
                "Operation {} finished with filtered results: {}",
                next.name(),
                next.filtered_reasons().join("; ")
            );
        }

        // Some responses omit the name once done; keep the one we polled with.
        if next.name().is_empty() {
            return Ok(next.with_name(operation.name()));
        }

        Ok(next)
    }

    async fn download(&self, artifact: &ArtifactReference) -> JobResult<DownloadedVideo> {
        let url = artifact.with_query_param("key", self.config.api_key.expose());

        debug!("Downloading artifact {}", artifact);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| JobError::download_failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(JobError::download_failed(format!(
                "server responded with {}",
                status
            )));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| JobError::download_failed(e.to_string()))?;

        Ok(DownloadedVideo {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}
