//! Image-to-video command-line front-end.

mod cli;
mod credentials;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vidgen_client::{
    AsyncJobClient, CancellationToken, GeminiConfig, GeminiVideoService, JobError, PollPolicy,
};
use vidgen_models::{GenerationRequest, ImagePayload};

use crate::cli::Args;

fn init_tracing() {
    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,vidgen=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // TLS for HTTPS; ignore if a provider is already installed
    let _ = rustls::crypto::ring::default_provider().install_default();

    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();

    if !credentials::has_credential() {
        eprintln!("{}", credentials::missing_credential_message());
        return ExitCode::from(2);
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<JobError>() {
            Some(JobError::CredentialInvalid) => {
                eprintln!("{}", credentials::reconnect_message());
                ExitCode::from(2)
            }
            Some(JobError::Cancelled) => {
                eprintln!("Cancelled. The remote job may still finish on the server.");
                ExitCode::from(130)
            }
            _ => {
                error!("Video generation failed: {:#}", e);
                eprintln!("Error: {:#}", e);
                ExitCode::FAILURE
            }
        },
    }
}

async fn run(args: Args) -> Result<()> {
    let media_type = args.media_type()?;
    let bytes = tokio::fs::read(&args.image)
        .await
        .with_context(|| format!("Failed to read {}", args.image.display()))?;
    let request = GenerationRequest::new(ImagePayload::new(bytes, media_type))?;

    let mut config = GeminiConfig::from_env()?;
    if let Some(model) = &args.model {
        config = config.with_model(model.clone());
    }
    let policy = args.poll_policy(PollPolicy::from_env());
    info!("Model: {}, poll policy: {:?}", config.model, policy);

    let client = AsyncJobClient::new(GeminiVideoService::new(config)?, policy);

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received interrupt, cancelling job");
            on_signal.cancel();
        }
    });

    let artifact = client
        .submit_and_await_with_cancel(&request, |event| println!("{}", event), &cancel)
        .await?;

    let output = args.output_path();
    artifact
        .save_to(&output)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "Saved {} ({:.1} MB) to {}",
        artifact.locator(),
        artifact.len() as f64 / 1_048_576.0,
        output.display()
    );
    artifact.release();

    Ok(())
}
