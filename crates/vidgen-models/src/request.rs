//! Generation requests.

use thiserror::Error;

use crate::{ImagePayload, MediaType, VideoSpec};

/// Directive sent with every request. Not user-editable.
pub const DEFAULT_PROMPT: &str = "Bring this image to life as a cinematic, photorealistic video. \
Add natural, fluid motion to the subject and environment, a slow and steady camera move, \
soft volumetric lighting and subtle depth of field. Keep the original composition, \
colors and identity of every element intact.";

/// Errors raised while building a request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Image payload is empty")]
    EmptyImage,

    #[error("Prompt is empty")]
    EmptyPrompt,

    #[error("Video count must be at least 1")]
    ZeroCount,
}

/// One image-to-video request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    image: ImagePayload,
    prompt: String,
    spec: VideoSpec,
}

impl GenerationRequest {
    /// Build a request with the fixed prompt and default output spec.
    pub fn new(image: ImagePayload) -> Result<Self, RequestError> {
        Self::with_options(image, DEFAULT_PROMPT, VideoSpec::default())
    }

    /// Convenience for raw bytes plus media type.
    pub fn from_bytes(bytes: Vec<u8>, media_type: MediaType) -> Result<Self, RequestError> {
        Self::new(ImagePayload::new(bytes, media_type))
    }

    pub fn with_options(
        image: ImagePayload,
        prompt: impl Into<String>,
        spec: VideoSpec,
    ) -> Result<Self, RequestError> {
        let prompt = prompt.into();

        if image.is_empty() {
            return Err(RequestError::EmptyImage);
        }
        if prompt.trim().is_empty() {
            return Err(RequestError::EmptyPrompt);
        }
        if spec.count == 0 {
            return Err(RequestError::ZeroCount);
        }

        Ok(Self {
            image,
            prompt,
            spec,
        })
    }

    pub fn image(&self) -> &ImagePayload {
        &self.image
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn spec(&self) -> &VideoSpec {
        &self.spec
    }
}
