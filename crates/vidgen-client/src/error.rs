//! Job client error types.

use std::time::Duration;

use thiserror::Error;

pub type JobResult<T> = Result<T, JobError>;

/// Substring the service uses when it rejects the caller's API key.
const CREDENTIAL_REJECTION_MARKER: &str = "entity was not found";

/// Whether an upstream error message means the credential was rejected.
///
/// Best-effort: this matches on upstream phrasing, so a wording change
/// on the service side can misclassify errors in either direction.
pub fn is_credential_rejection(message: &str) -> bool {
    message.contains(CREDENTIAL_REJECTION_MARKER)
}

/// Terminal outcome of a failed job. Nothing is retried automatically.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("API key was rejected by the video service; select a valid key and try again")]
    CredentialInvalid,

    #[error("Video generation finished but returned no download link")]
    MissingArtifact,

    #[error("Failed to download generated video: {0}")]
    DownloadFailed(String),

    #[error("{0}")]
    Upstream(String),

    #[error("Video generation did not finish after {polls} polls ({elapsed:?})")]
    Timeout { polls: u32, elapsed: Duration },

    #[error("Video generation was cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl JobError {
    /// Classify an error message surfaced by a submit or poll call.
    pub fn from_upstream(message: impl Into<String>) -> Self {
        let message = message.into();
        if is_credential_rejection(&message) {
            Self::CredentialInvalid
        } else {
            Self::Upstream(message)
        }
    }

    pub fn download_failed(msg: impl Into<String>) -> Self {
        Self::DownloadFailed(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Re-run classification on an `Upstream` error; other kinds pass through.
    pub fn classify(self) -> Self {
        match self {
            Self::Upstream(message) => Self::from_upstream(message),
            other => other,
        }
    }

    /// Check if the caller should prompt for a new credential.
    pub fn is_credential_invalid(&self) -> bool {
        matches!(self, JobError::CredentialInvalid)
    }

    /// Whether the job is over. Always true: failures end the job and
    /// nothing is retried inside the client.
    pub fn is_terminal(&self) -> bool {
        match self {
            JobError::CredentialInvalid
            | JobError::MissingArtifact
            | JobError::DownloadFailed(_)
            | JobError::Upstream(_)
            | JobError::Timeout { .. }
            | JobError::Cancelled
            | JobError::Config(_) => true,
        }
    }

    /// Short label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            JobError::CredentialInvalid => "credential_invalid",
            JobError::MissingArtifact => "missing_artifact",
            JobError::DownloadFailed(_) => "download_failed",
            JobError::Upstream(_) => "upstream",
            JobError::Timeout { .. } => "timeout",
            JobError::Cancelled => "cancelled",
            JobError::Config(_) => "config",
        }
    }
}
