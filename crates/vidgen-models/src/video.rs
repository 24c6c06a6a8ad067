//! Output video specification.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Output resolution requested from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
pub enum Resolution {
    #[serde(rename = "720p")]
    Hd720,
    #[default]
    #[serde(rename = "1080p")]
    Hd1080,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Hd720 => "720p",
            Resolution::Hd1080 => "1080p",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = ResolutionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "720p" => Ok(Resolution::Hd720),
            "1080p" => Ok(Resolution::Hd1080),
            _ => Err(ResolutionParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown resolution: {0}")]
pub struct ResolutionParseError(String);

/// Aspect ratio specification.
///
/// Serialized as the `"W:H"` string the service expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    /// Widescreen landscape (16:9)
    pub const LANDSCAPE: AspectRatio = AspectRatio {
        width: 16,
        height: 9,
    };

    /// Portrait (9:16)
    pub const PORTRAIT: AspectRatio = AspectRatio {
        width: 9,
        height: 16,
    };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn as_f64(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::LANDSCAPE
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

impl FromStr for AspectRatio {
    type Err = AspectRatioParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(':')
            .ok_or_else(|| AspectRatioParseError::InvalidFormat(s.to_string()))?;

        let width: u32 = w
            .trim()
            .parse()
            .map_err(|_| AspectRatioParseError::InvalidNumber(w.to_string()))?;
        let height: u32 = h
            .trim()
            .parse()
            .map_err(|_| AspectRatioParseError::InvalidNumber(h.to_string()))?;

        if width == 0 || height == 0 {
            return Err(AspectRatioParseError::ZeroValue);
        }

        Ok(Self { width, height })
    }
}

impl Serialize for AspectRatio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AspectRatio {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Error)]
pub enum AspectRatioParseError {
    #[error("Invalid aspect ratio format: {0}, expected 'W:H'")]
    InvalidFormat(String),
    #[error("Invalid number in aspect ratio: {0}")]
    InvalidNumber(String),
    #[error("Aspect ratio cannot have zero values")]
    ZeroValue,
}

/// What the service is asked to produce for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoSpec {
    /// Number of videos to generate
    pub count: u32,
    pub resolution: Resolution,
    #[schemars(with = "String")]
    pub aspect_ratio: AspectRatio,
}

impl Default for VideoSpec {
    /// One 1080p widescreen video.
    fn default() -> Self {
        Self {
            count: 1,
            resolution: Resolution::Hd1080,
            aspect_ratio: AspectRatio::LANDSCAPE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio_parse() {
        assert_eq!("16:9".parse::<AspectRatio>().unwrap(), AspectRatio::LANDSCAPE);
        assert_eq!("9 : 16".parse::<AspectRatio>().unwrap(), AspectRatio::PORTRAIT);
        assert!(matches!(
            "16x9".parse::<AspectRatio>(),
            Err(AspectRatioParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            "a:9".parse::<AspectRatio>(),
            Err(AspectRatioParseError::InvalidNumber(_))
        ));
        assert!(matches!(
            "0:9".parse::<AspectRatio>(),
            Err(AspectRatioParseError::ZeroValue)
        ));
    }

    #[test]
    fn test_resolution_parse() {
        assert_eq!("1080P".parse::<Resolution>().unwrap(), Resolution::Hd1080);
        assert_eq!("720p".parse::<Resolution>().unwrap(), Resolution::Hd720);
        assert!("4k".parse::<Resolution>().is_err());
    }

    #[test]
    fn test_default_spec_is_single_1080p_widescreen() {
        let spec = VideoSpec::default();
        assert_eq!(spec.count, 1);
        assert_eq!(spec.resolution, Resolution::Hd1080);
        assert_eq!(spec.aspect_ratio.to_string(), "16:9");
    }

    #[test]
    fn test_spec_wire_format() {
        let json = serde_json::to_value(VideoSpec::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"count": 1, "resolution": "1080p", "aspectRatio": "16:9"})
        );
    }
}
