//! Command-line arguments.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::Parser;
use vidgen_client::PollPolicy;
use vidgen_models::MediaType;

/// Turn a still image into a generated video.
#[derive(Debug, Parser)]
#[command(name = "vidgen", version, about)]
pub struct Args {
    /// Image to animate (png, jpeg, webp, gif, heic, heif)
    pub image: PathBuf,

    /// Where to write the video [default: the image path with an .mp4 extension]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Video model to use instead of VIDGEN_MODEL / the built-in default
    #[arg(long)]
    pub model: Option<String>,

    /// Seconds between status checks
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval_secs: Option<u64>,

    /// Give up after this many status checks
    #[arg(long)]
    pub max_polls: Option<u32>,

    /// Give up after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl Args {
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.image.with_extension("mp4"))
    }

    pub fn media_type(&self) -> Result<MediaType> {
        MediaType::from_path(&self.image).ok_or_else(|| {
            anyhow!(
                "{} is not a supported image (expected png, jpeg, webp, gif, heic or heif)",
                self.image.display()
            )
        })
    }

    /// Layer command-line overrides on top of a policy read from the environment.
    pub fn poll_policy(&self, mut policy: PollPolicy) -> PollPolicy {
        if let Some(secs) = self.poll_interval_secs {
            policy = policy.with_interval(Duration::from_secs(secs));
        }
        if let Some(max) = self.max_polls {
            policy.max_polls = Some(max);
        }
        if let Some(secs) = self.timeout_secs {
            policy.deadline = Some(Duration::from_secs(secs));
        }
        policy
    }
}
