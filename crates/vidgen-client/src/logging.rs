//! Structured job logging utilities.
//!
//! Every line logged for a job carries the same `job_id` and `model`
//! fields so a single generation can be followed through submit, polling
//! and download.

use std::time::Duration;

use tracing::{debug, info, warn, Span};
use vidgen_models::{JobId, OperationHandle};

use crate::error::JobError;

/// Job logger for structured logging with consistent formatting.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
    model: String,
}

impl JobLogger {
    /// Create a new job logger for a specific job and model.
    pub fn new(job_id: &JobId, model: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            model: model.to_string(),
        }
    }

    /// Log that a request is about to be submitted.
    pub fn log_start(&self, image_bytes: usize, media_type: &str) {
        info!(
            job_id = %self.job_id,
            model = %self.model,
            image_bytes,
            media_type,
            "Submitting video generation job"
        );
    }

    /// Log the operation returned by the service.
    pub fn log_submitted(&self, operation: &OperationHandle) {
        info!(
            job_id = %self.job_id,
            model = %self.model,
            operation = %operation.name(),
            done = operation.is_done(),
            "Job accepted by video service"
        );
    }

    /// Log the result of one poll.
    pub fn log_poll(&self, poll: u32, operation: &OperationHandle) {
        debug!(
            job_id = %self.job_id,
            model = %self.model,
            operation = %operation.name(),
            poll,
            done = operation.is_done(),
            "Polled operation"
        );
    }

    /// Log that the operation finished without a usable result.
    pub fn log_missing_artifact(&self, operation: &OperationHandle) {
        warn!(
            job_id = %self.job_id,
            model = %self.model,
            operation = %operation.name(),
            samples = operation.samples().len(),
            filtered = %operation.filtered_reasons().join("; "),
            error = operation.error().unwrap_or(""),
            "Operation finished without a download link"
        );
    }

    /// Log a successful job.
    pub fn log_completion(&self, polls: u32, bytes: usize, elapsed: Duration) {
        info!(
            job_id = %self.job_id,
            model = %self.model,
            polls,
            bytes,
            elapsed_secs = elapsed.as_secs_f64(),
            "Job completed"
        );
    }

    /// Log a failed job.
    pub fn log_failure(&self, error: &JobError, elapsed: Duration) {
        warn!(
            job_id = %self.job_id,
            model = %self.model,
            kind = error.kind(),
            elapsed_secs = elapsed.as_secs_f64(),
            "Job failed: {}", error
        );
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Create a tracing span for this job.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("job", job_id = %self.job_id, model = %self.model)
    }
}
