//! Downloaded video artifacts owned by the caller.

use chrono::{DateTime, Utc};
use std::fmt;
use std::path::Path;
use uuid::Uuid;

use crate::ArtifactReference;

/// Locally resolvable address of a downloaded artifact (`artifact://<uuid>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactLocator(Uuid);

impl ArtifactLocator {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl Default for ArtifactLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ArtifactLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "artifact://{}", self.0)
    }
}

/// Video bytes downloaded from an [`ArtifactReference`].
///
/// The caller owns the buffer. Dropping it (or calling [`release`]) frees
/// the memory; nothing is cleaned up on the caller's behalf.
///
/// [`release`]: LocalArtifact::release
pub struct LocalArtifact {
    locator: ArtifactLocator,
    bytes: Vec<u8>,
    content_type: Option<String>,
    source: ArtifactReference,
    downloaded_at: DateTime<Utc>,
}

impl LocalArtifact {
    pub fn new(bytes: Vec<u8>, content_type: Option<String>, source: ArtifactReference) -> Self {
        Self {
            locator: ArtifactLocator::new(),
            bytes,
            content_type,
            source,
            downloaded_at: Utc::now(),
        }
    }

    pub fn locator(&self) -> &ArtifactLocator {
        &self.locator
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Content type reported by the download response, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Remote reference the bytes were fetched from.
    pub fn source(&self) -> &ArtifactReference {
        &self.source
    }

    pub fn downloaded_at(&self) -> DateTime<Utc> {
        self.downloaded_at
    }

    /// Take ownership of the raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Write the video to `path`, replacing any existing file.
    pub async fn save_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        tokio::fs::write(path, &self.bytes).await
    }

    /// Release the artifact. Equivalent to dropping it.
    pub fn release(self) {}
}

impl fmt::Debug for LocalArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalArtifact")
            .field("locator", &self.locator.to_string())
            .field("len", &self.bytes.len())
            .field("content_type", &self.content_type)
            .field("source", &self.source.as_str())
            .field("downloaded_at", &self.downloaded_at)
            .finish()
    }
}
