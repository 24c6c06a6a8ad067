//! Client configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{JobError, JobResult};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "veo-3.1-fast-generate-preview";

/// Environment variables checked for the API key, in order.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Shortest wait allowed between polls.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// API key for the video service. Redacted in debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Read the key from the first non-empty variable in [`API_KEY_VARS`].
    pub fn from_env() -> Option<Self> {
        API_KEY_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty())
            .map(Self)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Connection settings for the Gemini video service.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Base URL of the Generative Language API, including the version segment
    pub base_url: String,
    pub api_key: ApiKey,
    /// Video model id
    pub model: String,
    /// Timeout for a single HTTP round trip (not the whole job)
    pub request_timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
            request_timeout: Duration::from_secs(120),
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> JobResult<Self> {
        let api_key = ApiKey::from_env().ok_or_else(|| {
            JobError::config(format!("{} not set", API_KEY_VARS.join(" or ")))
        })?;

        Ok(Self {
            base_url: std::env::var("VIDGEN_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            api_key,
            model: std::env::var("VIDGEN_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            request_timeout: Duration::from_secs(
                env_parse("VIDGEN_REQUEST_TIMEOUT_SECS").unwrap_or(120),
            ),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// How the client waits for an operation to finish.
///
/// The default polls every 10 seconds with no upper bound, trusting the
/// service to eventually finish or fail. `max_polls` and `deadline` are
/// opt-in limits that end the job with [`JobError::Timeout`]. Intervals
/// below [`MIN_POLL_INTERVAL`] are raised to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    /// Wait between polls
    pub interval: Duration,
    /// Maximum number of polls before giving up
    pub max_polls: Option<u32>,
    /// Maximum wall-clock time from submission before giving up
    pub deadline: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_polls: None,
            deadline: None,
        }
    }
}

impl PollPolicy {
    /// Create policy from environment variables.
    pub fn from_env() -> Self {
        Self {
            interval: env_parse::<u64>("VIDGEN_POLL_INTERVAL_SECS")
                .filter(|&secs| secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(10)),
            max_polls: env_parse("VIDGEN_MAX_POLLS"),
            deadline: env_parse("VIDGEN_DEADLINE_SECS").map(Duration::from_secs),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    /// Wait actually used between polls.
    pub fn effective_interval(&self) -> Duration {
        self.interval.max(MIN_POLL_INTERVAL)
    }

    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = Some(max_polls);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn is_bounded(&self) -> bool {
        self.max_polls.is_some() || self.deadline.is_some()
    }
}

fn env_parse<T: FromStr>(var: &str) -> Option<T> {
    std::env::var(var).ok().and_then(|s| s.trim().parse().ok())
}
