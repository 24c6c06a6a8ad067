//! Long-running job client for image-to-video generation.
//!
//! This crate submits an image to the Gemini video models (Veo), polls the
//! resulting long-running operation until it finishes, and downloads the
//! generated video into a caller-owned [`LocalArtifact`].
//!
//! ```ignore
//! let client = AsyncJobClient::from_env()?;
//! let request = GenerationRequest::from_bytes(png_bytes, MediaType::Png)?;
//! let video = client
//!     .submit_and_await(&request, |event| println!("{}", event))
//!     .await?;
//! video.save_to("out.mp4").await?;
//! ```
//!
//! [`LocalArtifact`]: vidgen_models::LocalArtifact

pub mod client;
pub mod config;
pub mod error;
pub mod gemini;
pub mod logging;
pub mod metrics;
pub mod service;

pub use client::AsyncJobClient;
pub use config::{ApiKey, GeminiConfig, PollPolicy};
pub use error::{is_credential_rejection, JobError, JobResult};
pub use gemini::GeminiVideoService;
pub use service::{DownloadedVideo, VideoService};
pub use tokio_util::sync::CancellationToken;
