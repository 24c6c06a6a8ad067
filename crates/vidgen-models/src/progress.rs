//! Progress events delivered to the caller while a job runs.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cosmetic messages cycled through while polling. They carry no
/// information about the actual state of the remote job.
pub const FLAVOR_MESSAGES: [&str; 6] = [
    "Analyzing image composition and depth...",
    "Sketching motion paths and camera moves...",
    "Rendering keyframes in high definition...",
    "Weaving frames into fluid motion...",
    "Applying cinematic lighting and color...",
    "Polishing the final sequence...",
];

/// Phase of a running job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// Submission has started
    Initializing,
    /// About to re-query the operation; `poll` counts from zero
    Polling { poll: u32 },
    /// Operation finished, fetching the video bytes
    Downloading,
}

impl ProgressEvent {
    pub fn polling(poll: u32) -> Self {
        ProgressEvent::Polling { poll }
    }

    /// Human-readable text for this event.
    pub fn message(&self) -> &'static str {
        match self {
            ProgressEvent::Initializing => "Initializing video generation engine...",
            ProgressEvent::Polling { poll } => {
                FLAVOR_MESSAGES[*poll as usize % FLAVOR_MESSAGES.len()]
            }
            ProgressEvent::Downloading => "Downloading final high-fidelity export...",
        }
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
