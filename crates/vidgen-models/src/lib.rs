//! Shared data models for the image-to-video job client.
//!
//! This crate provides Serde-serializable types for:
//! - Generation requests and their source image payloads
//! - Output video specification (resolution, aspect ratio)
//! - Long-running operation handles and artifact references
//! - Downloaded artifacts owned by the caller
//! - Progress events emitted while a job runs

pub mod artifact;
pub mod job;
pub mod media;
pub mod operation;
pub mod progress;
pub mod request;
pub mod video;

// Re-export common types
pub use artifact::{ArtifactLocator, LocalArtifact};
pub use job::JobId;
pub use media::{ImagePayload, MediaType, MediaTypeError};
pub use operation::{ArtifactReference, GeneratedSample, OperationHandle};
pub use progress::{ProgressEvent, FLAVOR_MESSAGES};
pub use request::{GenerationRequest, RequestError, DEFAULT_PROMPT};
pub use video::{AspectRatio, AspectRatioParseError, Resolution, ResolutionParseError, VideoSpec};
