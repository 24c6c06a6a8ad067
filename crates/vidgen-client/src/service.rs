//! Upstream video service abstraction.

use async_trait::async_trait;
use vidgen_models::{ArtifactReference, GenerationRequest, OperationHandle};

use crate::error::JobResult;

/// Bytes fetched from an artifact reference.
#[derive(Debug, Clone)]
pub struct DownloadedVideo {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// The remote service that runs generation jobs.
///
/// `submit` and `poll` report failures as [`JobError::Upstream`] with the
/// service's message; the job client classifies them. `download` reports
/// failures as [`JobError::DownloadFailed`].
///
/// [`JobError::Upstream`]: crate::JobError::Upstream
/// [`JobError::DownloadFailed`]: crate::JobError::DownloadFailed
#[async_trait]
pub trait VideoService: Send + Sync {
    /// Model id, used to label logs and metrics.
    fn model(&self) -> &str;

    /// Start a generation job.
    async fn submit(&self, request: &GenerationRequest) -> JobResult<OperationHandle>;

    /// Fetch the latest state of an operation.
    async fn poll(&self, operation: &OperationHandle) -> JobResult<OperationHandle>;

    /// Fetch the produced video.
    async fn download(&self, artifact: &ArtifactReference) -> JobResult<DownloadedVideo>;
}
