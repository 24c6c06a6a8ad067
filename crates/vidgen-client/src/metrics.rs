//! Job metrics.
//!
//! Recorded through the `metrics` facade; installing an exporter is left
//! to the binary embedding the client.

use metrics::{counter, histogram};

use crate::error::JobError;

/// Metric names as constants for consistency.
pub mod names {
    pub const JOBS_SUBMITTED_TOTAL: &str = "vidgen_jobs_submitted_total";
    pub const JOBS_COMPLETED_TOTAL: &str = "vidgen_jobs_completed_total";
    pub const JOBS_FAILED_TOTAL: &str = "vidgen_jobs_failed_total";
    pub const JOB_POLLS: &str = "vidgen_job_polls";
    pub const JOB_DURATION_SECONDS: &str = "vidgen_job_duration_seconds";
    pub const ARTIFACT_BYTES: &str = "vidgen_artifact_bytes";
}

pub fn record_job_submitted(model: &str) {
    counter!(names::JOBS_SUBMITTED_TOTAL, "model" => model.to_string()).increment(1);
}

pub fn record_job_completed(model: &str, polls: u32, bytes: usize, duration_secs: f64) {
    let labels = [("model", model.to_string())];

    counter!(names::JOBS_COMPLETED_TOTAL, &labels).increment(1);
    histogram!(names::JOB_POLLS, &labels).record(polls as f64);
    histogram!(names::JOB_DURATION_SECONDS, &labels).record(duration_secs);
    histogram!(names::ARTIFACT_BYTES, &labels).record(bytes as f64);
}

pub fn record_job_failed(model: &str, error: &JobError, duration_secs: f64) {
    let labels = [
        ("model", model.to_string()),
        ("kind", error.kind().to_string()),
    ];

    counter!(names::JOBS_FAILED_TOTAL, &labels).increment(1);
    histogram!(names::JOB_DURATION_SECONDS, &labels).record(duration_secs);
}
