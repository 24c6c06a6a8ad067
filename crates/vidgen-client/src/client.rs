//! Long-running job client.
//!
//! [`AsyncJobClient`] drives one generation from submission to a downloaded
//! artifact: submit, poll until the operation reports done, resolve the
//! artifact reference, fetch the bytes. Progress is reported through a
//! caller-supplied callback; the outcome is a single `JobResult`.

use std::future::Future;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use vidgen_models::{
    ArtifactReference, GenerationRequest, JobId, LocalArtifact, OperationHandle, ProgressEvent,
};

use crate::config::PollPolicy;
use crate::error::{JobError, JobResult};
use crate::gemini::GeminiVideoService;
use crate::logging::JobLogger;
use crate::metrics;
use crate::service::VideoService;

/// Client for image-to-video jobs.
///
/// Holds no per-job state, so one instance can be shared by reference.
/// Callers are expected to run one job at a time per user-facing flow.
pub struct AsyncJobClient<S = GeminiVideoService> {
    service: S,
    policy: PollPolicy,
}

impl AsyncJobClient<GeminiVideoService> {
    /// Create a Gemini-backed client from environment variables.
    pub fn from_env() -> JobResult<Self> {
        Ok(Self::new(GeminiVideoService::from_env()?, PollPolicy::from_env()))
    }
}

impl<S: VideoService> AsyncJobClient<S> {
    pub fn new(service: S, policy: PollPolicy) -> Self {
        Self { service, policy }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Submit `request` and wait for the generated video.
    ///
    /// Runs until the service finishes the job or fails; the default poll
    /// policy never gives up on its own.
    pub async fn submit_and_await<F>(
        &self,
        request: &GenerationRequest,
        on_progress: F,
    ) -> JobResult<LocalArtifact>
    where
        F: FnMut(ProgressEvent) + Send,
    {
        self.submit_and_await_with_cancel(request, on_progress, &CancellationToken::new())
            .await
    }

    /// Like [`submit_and_await`](Self::submit_and_await), but stops with
    /// [`JobError::Cancelled`] at the next suspension point once `cancel`
    /// fires. The remote job is not cancelled and may keep running.
    pub async fn submit_and_await_with_cancel<F>(
        &self,
        request: &GenerationRequest,
        on_progress: F,
        cancel: &CancellationToken,
    ) -> JobResult<LocalArtifact>
    where
        F: FnMut(ProgressEvent) + Send,
    {
        let job_id = JobId::new();
        let logger = JobLogger::new(&job_id, self.service.model());
        let span = logger.create_span();

        async move {
            let started = Instant::now();
            metrics::record_job_submitted(self.service.model());

            let mut polls = 0;
            let result = self
                .run(request, on_progress, cancel, &logger, started, &mut polls)
                .await;

            let elapsed = started.elapsed();
            match &result {
                Ok(artifact) => {
                    logger.log_completion(polls, artifact.len(), elapsed);
                    metrics::record_job_completed(
                        self.service.model(),
                        polls,
                        artifact.len(),
                        elapsed.as_secs_f64(),
                    );
                }
                Err(e) => {
                    logger.log_failure(e, elapsed);
                    metrics::record_job_failed(self.service.model(), e, elapsed.as_secs_f64());
                }
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn run<F>(
        &self,
        request: &GenerationRequest,
        mut on_progress: F,
        cancel: &CancellationToken,
        logger: &JobLogger,
        started: Instant,
        polls: &mut u32,
    ) -> JobResult<LocalArtifact>
    where
        F: FnMut(ProgressEvent) + Send,
    {
        logger.log_start(request.image().len(), request.image().media_type().as_str());
        on_progress(ProgressEvent::Initializing);

        let mut operation = until_cancelled(cancel, self.service.submit(request))
            .await
            .map_err(JobError::classify)?;
        logger.log_submitted(&operation);

        while !operation.is_done() {
            self.check_bounds(*polls, started)?;

            until_cancelled(cancel, async {
                tokio::time::sleep(self.policy.effective_interval()).await;
                Ok(())
            })
            .await?;

            on_progress(ProgressEvent::polling(*polls));

            operation = until_cancelled(cancel, self.service.poll(&operation))
                .await
                .map_err(JobError::classify)?;
            logger.log_poll(*polls, &operation);
            *polls += 1;
        }

        let reference = resolve_artifact(&operation).inspect_err(|e| {
            if matches!(e, JobError::MissingArtifact) {
                logger.log_missing_artifact(&operation);
            }
        })?;

        on_progress(ProgressEvent::Downloading);

        let video = until_cancelled(cancel, self.service.download(&reference)).await?;

        Ok(LocalArtifact::new(video.bytes, video.content_type, reference))
    }

    /// Enforce the opt-in poll limits. Checked before each wait.
    fn check_bounds(&self, polls: u32, started: Instant) -> JobResult<()> {
        let elapsed = started.elapsed();
        let polls_exhausted = self.policy.max_polls.is_some_and(|max| polls >= max);
        let deadline_passed = self.policy.deadline.is_some_and(|d| elapsed >= d);

        if polls_exhausted || deadline_passed {
            return Err(JobError::Timeout { polls, elapsed });
        }
        Ok(())
    }
}

/// Extract the artifact reference from a finished operation.
///
/// A done operation without a usable first sample is `MissingArtifact`,
/// including one that reports an operation-level error.
fn resolve_artifact(operation: &OperationHandle) -> JobResult<ArtifactReference> {
    operation.result_uri().ok_or(JobError::MissingArtifact)
}

async fn until_cancelled<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = JobResult<T>>,
) -> JobResult<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(JobError::Cancelled),
        result = fut => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MIN_POLL_INTERVAL;
    use crate::service::DownloadedVideo;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;
    use vidgen_models::{GeneratedSample, MediaType, FLAVOR_MESSAGES};

    /// Service that replays scripted responses and records every call.
    #[derive(Default)]
    struct ScriptedService {
        submit: Mutex<Option<JobResult<OperationHandle>>>,
        polls: Mutex<VecDeque<JobResult<OperationHandle>>>,
        download: Mutex<Option<JobResult<DownloadedVideo>>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedService {
        fn new(submit: JobResult<OperationHandle>) -> Self {
            Self {
                submit: Mutex::new(Some(submit)),
                ..Default::default()
            }
        }

        fn then_poll(self, response: JobResult<OperationHandle>) -> Self {
            self.polls.lock().unwrap().push_back(response);
            self
        }

        fn then_download(self, response: JobResult<DownloadedVideo>) -> Self {
            *self.download.lock().unwrap() = Some(response);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl VideoService for ScriptedService {
        fn model(&self) -> &str {
            "scripted"
        }

        async fn submit(&self, _request: &GenerationRequest) -> JobResult<OperationHandle> {
            self.calls.lock().unwrap().push("submit".to_string());
            self.submit
                .lock()
                .unwrap()
                .take()
                .expect("submit called twice")
        }

        async fn poll(&self, operation: &OperationHandle) -> JobResult<OperationHandle> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("poll {}", operation.name()));
            self.polls
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(OperationHandle::pending(operation.name())))
        }

        async fn download(&self, artifact: &ArtifactReference) -> JobResult<DownloadedVideo> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("download {}", artifact));
            self.download
                .lock()
                .unwrap()
                .take()
                .expect("download not scripted")
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest::from_bytes(vec![0x89; 512], MediaType::Png).unwrap()
    }

    fn done_with(uri: &str) -> JobResult<OperationHandle> {
        Ok(OperationHandle::completed(
            "ops/1",
            vec![GeneratedSample::with_uri(uri)],
        ))
    }

    fn video(body: &[u8]) -> JobResult<DownloadedVideo> {
        Ok(DownloadedVideo {
            bytes: body.to_vec(),
            content_type: Some("video/mp4".to_string()),
        })
    }

    fn client(service: ScriptedService) -> AsyncJobClient<ScriptedService> {
        AsyncJobClient::new(service, PollPolicy::default())
    }

    async fn run(
        client: &AsyncJobClient<ScriptedService>,
    ) -> (JobResult<LocalArtifact>, Vec<ProgressEvent>) {
        let mut events = Vec::new();
        let result = client
            .submit_and_await(&request(), |event| events.push(event))
            .await;
        (result, events)
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_to_end_single_poll() {
        let service = ScriptedService::new(Ok(OperationHandle::pending("ops/1")))
            .then_poll(done_with("https://x/video123"))
            .then_download(video(b"mp4 body"));
        let client = client(service);

        let (result, events) = run(&client).await;
        let artifact = result.unwrap();

        assert_eq!(artifact.bytes(), b"mp4 body");
        assert_eq!(artifact.source().as_str(), "https://x/video123");
        assert_eq!(artifact.content_type(), Some("video/mp4"));

        let messages: Vec<_> = events.iter().map(|e| e.message()).collect();
        assert_eq!(
            messages,
            vec![
                "Initializing video generation engine...",
                FLAVOR_MESSAGES[0],
                "Downloading final high-fidelity export...",
            ]
        );
        assert_eq!(
            client.service().calls(),
            vec!["submit", "poll ops/1", "download https://x/video123"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_done_on_submit_skips_waiting() {
        let service = ScriptedService::new(done_with("https://x/v"))
            .then_download(video(b"x"));
        let client = client(service);

        let start = Instant::now();
        let (result, events) = run(&client).await;

        assert!(result.is_ok());
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(
            events,
            vec![ProgressEvent::Initializing, ProgressEvent::Downloading]
        );
        assert_eq!(client.service().calls(), vec!["submit", "download https://x/v"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_n_polls_wait_n_intervals_and_cycle_messages() {
        let mut service = ScriptedService::new(Ok(OperationHandle::pending("ops/1")));
        for _ in 0..7 {
            service = service.then_poll(Ok(OperationHandle::pending("ops/1")));
        }
        let service = service
            .then_poll(done_with("https://x/v"))
            .then_download(video(b"x"));
        let client = client(service);

        let start = Instant::now();
        let (result, events) = run(&client).await;

        assert!(result.is_ok());
        assert_eq!(start.elapsed(), Duration::from_secs(10) * 8);

        let polling: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Polling { .. }))
            .map(|e| e.message())
            .collect();
        assert_eq!(polling.len(), 8);
        for (i, message) in polling.iter().enumerate() {
            assert_eq!(*message, FLAVOR_MESSAGES[i % 6]);
        }
        assert_eq!(polling[6], FLAVOR_MESSAGES[0]);
        assert_eq!(events.first(), Some(&ProgressEvent::Initializing));
        assert_eq!(events.last(), Some(&ProgressEvent::Downloading));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_still_waits_between_polls() {
        let service = ScriptedService::new(Ok(OperationHandle::pending("ops/1")))
            .then_poll(Ok(OperationHandle::pending("ops/1")))
            .then_poll(done_with("https://x/v"))
            .then_download(video(b"x"));
        let policy = PollPolicy {
            interval: Duration::ZERO,
            ..PollPolicy::default()
        };
        let client = AsyncJobClient::new(service, policy);

        let start = Instant::now();
        let (result, _) = run(&client).await;

        assert!(result.is_ok());
        assert_eq!(start.elapsed(), MIN_POLL_INTERVAL * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_credential_rejection_on_submit() {
        let service = ScriptedService::new(Err(JobError::Upstream(
            "Requested entity was not found.".to_string(),
        )));
        let client = client(service);

        let (result, events) = run(&client).await;

        assert!(matches!(result, Err(JobError::CredentialInvalid)));
        assert_eq!(events, vec![ProgressEvent::Initializing]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_credential_rejection_on_poll() {
        let service = ScriptedService::new(Ok(OperationHandle::pending("ops/1"))).then_poll(Err(
            JobError::Upstream("404: entity was not found (key revoked)".to_string()),
        ));
        let client = client(service);

        let (result, _) = run(&client).await;
        assert!(matches!(result, Err(JobError::CredentialInvalid)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_upstream_errors_are_verbatim() {
        let service = ScriptedService::new(Ok(OperationHandle::pending("ops/1")))
            .then_poll(Err(JobError::Upstream("quota exceeded".to_string())));
        let client = client(service);

        let (result, _) = run(&client).await;
        assert!(matches!(result, Err(JobError::Upstream(ref m)) if m == "quota exceeded"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_operation_is_missing_artifact() {
        let service = ScriptedService::new(Ok(OperationHandle::pending("ops/1")))
            .then_poll(Ok(OperationHandle::failed("ops/1", "Video generation failed")));
        let client = client(service);

        let (result, events) = run(&client).await;
        assert!(matches!(result, Err(JobError::MissingArtifact)));
        assert!(!events.contains(&ProgressEvent::Downloading));
        assert!(!client.service().calls().iter().any(|c| c.starts_with("download")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_operation_with_credential_text_is_missing_artifact() {
        let service = ScriptedService::new(Ok(OperationHandle::failed(
            "ops/1",
            "Requested entity was not found.",
        )));
        let client = client(service);

        let (result, _) = run(&client).await;
        assert!(matches!(result, Err(JobError::MissingArtifact)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_results_are_missing_artifact() {
        let service = ScriptedService::new(Ok(OperationHandle::pending("ops/1"))).then_poll(Ok(
            OperationHandle::completed("ops/1", Vec::new())
                .with_filtered_reasons(vec!["filtered".to_string()]),
        ));
        let client = client(service);

        let (result, events) = run(&client).await;
        assert!(matches!(result, Err(JobError::MissingArtifact)));
        assert!(!events.contains(&ProgressEvent::Downloading));
        assert!(!client.service().calls().iter().any(|c| c.starts_with("download")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_sample_without_uri_is_missing_artifact() {
        let service = ScriptedService::new(Ok(OperationHandle::completed(
            "ops/1",
            vec![GeneratedSample::default(), GeneratedSample::with_uri("https://x/v")],
        )));
        let client = client(service);

        let (result, _) = run(&client).await;
        assert!(matches!(result, Err(JobError::MissingArtifact)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_download_failure() {
        let service = ScriptedService::new(done_with("https://x/v"))
            .then_download(Err(JobError::download_failed("server responded with 403")));
        let client = client(service);

        let (result, events) = run(&client).await;
        assert!(matches!(result, Err(JobError::DownloadFailed(_))));
        assert_eq!(events.last(), Some(&ProgressEvent::Downloading));
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_polls_times_out() {
        let service = ScriptedService::new(Ok(OperationHandle::pending("ops/1")));
        let client = AsyncJobClient::new(service, PollPolicy::default().with_max_polls(3));

        let (result, events) = run(&client).await;

        match result {
            Err(JobError::Timeout { polls, elapsed }) => {
                assert_eq!(polls, 3);
                assert_eq!(elapsed, Duration::from_secs(30));
            }
            other => panic!("expected timeout, got {:?}", other),
        }
        assert_eq!(events.len(), 4);
        assert_eq!(client.service().calls().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_times_out() {
        let service = ScriptedService::new(Ok(OperationHandle::pending("ops/1")));
        let client = AsyncJobClient::new(
            service,
            PollPolicy::default().with_deadline(Duration::from_secs(25)),
        );

        let (result, _) = run(&client).await;
        assert!(matches!(result, Err(JobError::Timeout { polls: 3, .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_polling() {
        let service = ScriptedService::new(Ok(OperationHandle::pending("ops/1")));
        let client = client(service);
        let cancel = CancellationToken::new();

        let mut events = Vec::new();
        let result = client
            .submit_and_await_with_cancel(
                &request(),
                |event| {
                    if event == ProgressEvent::polling(1) {
                        cancel.cancel();
                    }
                    events.push(event);
                },
                &cancel,
            )
            .await;

        assert!(matches!(result, Err(JobError::Cancelled)));
        assert_eq!(events.last(), Some(&ProgressEvent::polling(1)));
        assert_eq!(client.service().calls(), vec!["submit", "poll ops/1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_start() {
        let service = ScriptedService::new(Ok(OperationHandle::pending("ops/1")));
        let client = client(service);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = client
            .submit_and_await_with_cancel(&request(), |_| {}, &cancel)
            .await;
        assert!(matches!(result, Err(JobError::Cancelled)));
    }
}
