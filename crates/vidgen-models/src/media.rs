//! Source image payloads and their media types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Still-image media types accepted by the video generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum MediaType {
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/webp")]
    Webp,
    #[serde(rename = "image/gif")]
    Gif,
    #[serde(rename = "image/heic")]
    Heic,
    #[serde(rename = "image/heif")]
    Heif,
}

impl MediaType {
    /// MIME string sent to the service.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Png => "image/png",
            MediaType::Jpeg => "image/jpeg",
            MediaType::Webp => "image/webp",
            MediaType::Gif => "image/gif",
            MediaType::Heic => "image/heic",
            MediaType::Heif => "image/heif",
        }
    }

    /// Guess the media type from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(MediaType::Png),
            "jpg" | "jpeg" => Some(MediaType::Jpeg),
            "webp" => Some(MediaType::Webp),
            "gif" => Some(MediaType::Gif),
            "heic" => Some(MediaType::Heic),
            "heif" => Some(MediaType::Heif),
            _ => None,
        }
    }

    /// Guess the media type from a path's extension.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = MediaTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Parameters such as "; charset=..." are irrelevant for images.
        let essence = s.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/png" => Ok(MediaType::Png),
            "image/jpeg" | "image/jpg" => Ok(MediaType::Jpeg),
            "image/webp" => Ok(MediaType::Webp),
            "image/gif" => Ok(MediaType::Gif),
            "image/heic" => Ok(MediaType::Heic),
            "image/heif" => Ok(MediaType::Heif),
            _ => Err(MediaTypeError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unsupported image media type: {0}")]
pub struct MediaTypeError(String);

/// Raw image bytes plus their declared media type.
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    bytes: Vec<u8>,
    media_type: MediaType,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>, media_type: MediaType) -> Self {
        Self { bytes, media_type }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Image bytes are never useful in logs.
impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePayload")
            .field("len", &self.bytes.len())
            .field("media_type", &self.media_type)
            .finish()
    }
}
