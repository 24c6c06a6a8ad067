//! Long-running operation state reported by the video service.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Snapshot of one in-flight (or finished) upstream operation.
///
/// Every poll response yields a fresh handle; handles are never updated
/// in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationHandle {
    name: String,
    done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(default)]
    samples: Vec<GeneratedSample>,
    #[serde(default)]
    filtered_reasons: Vec<String>,
}

/// One generated item in a finished operation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GeneratedSample {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

impl GeneratedSample {
    pub fn with_uri(uri: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
        }
    }
}

impl OperationHandle {
    /// An operation that has not finished yet.
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: false,
            error: None,
            samples: Vec::new(),
            filtered_reasons: Vec::new(),
        }
    }

    /// A finished operation carrying its generated samples.
    pub fn completed(name: impl Into<String>, samples: Vec<GeneratedSample>) -> Self {
        Self {
            done: true,
            samples,
            ..Self::pending(name)
        }
    }

    /// A finished operation that reported an error instead of a result.
    pub fn failed(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            done: true,
            error: Some(error.into()),
            ..Self::pending(name)
        }
    }

    /// Same state under a different operation name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Attach the reasons the service gave for filtering out results.
    pub fn with_filtered_reasons(mut self, reasons: Vec<String>) -> Self {
        self.filtered_reasons = reasons;
        self
    }

    /// Upstream operation name, used to poll.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Error message reported by a finished operation.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn samples(&self) -> &[GeneratedSample] {
        &self.samples
    }

    pub fn filtered_reasons(&self) -> &[String] {
        &self.filtered_reasons
    }

    /// Reference to the produced video.
    ///
    /// Only the first sample is considered, and only once the operation is
    /// done. A missing or unparseable URI yields `None`.
    pub fn result_uri(&self) -> Option<ArtifactReference> {
        if !self.done {
            return None;
        }
        self.samples
            .first()
            .and_then(|s| s.uri.as_deref())
            .and_then(|uri| ArtifactReference::parse(uri).ok())
    }
}

/// URI of a completed video on the upstream service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactReference(Url);

impl ArtifactReference {
    pub fn parse(uri: &str) -> Result<Self, url::ParseError> {
        Url::parse(uri.trim()).map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn url(&self) -> &Url {
        &self.0
    }

    /// Copy of the URI with an extra query parameter appended.
    ///
    /// Existing query parameters are preserved.
    pub fn with_query_param(&self, key: &str, value: &str) -> Url {
        let mut url = self.0.clone();
        url.query_pairs_mut().append_pair(key, value);
        url
    }
}

impl fmt::Display for ArtifactReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}
