//! Submission/poll/resubmit loop for one generation request
//!
//! State per attempt: `Submitted → Polling → {Succeeded, Failed, TimedOut}`.
//! A failed or timed-out attempt is followed by a back-off and a brand-new
//! submission (new handle) until the attempt budget is spent.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use foodie_config::Config;
use foodie_model::GenerationRequest;
use foodie_utils::TourError;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::service::{ExecutionService, JobHandle, JobResult, JobStatus};

/// Timing and attempt policy for [`ExecutionPoller`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Sleep between status queries of a pending job
    pub poll_interval: Duration,
    /// Wall-clock budget of one attempt, measured from just before submission
    pub attempt_timeout: Duration,
    /// Total submissions allowed, including the first
    pub max_attempts: u32,
    /// Wait between a failed attempt and the next submission
    pub retry_backoff: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            attempt_timeout: Duration::from_secs(60),
            max_attempts: 2,
            retry_backoff: Duration::from_secs(5),
        }
    }
}

impl PollPolicy {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            attempt_timeout: config.attempt_timeout(),
            max_attempts: config.max_attempts(),
            retry_backoff: config.retry_backoff(),
        }
    }
}

/// Drives a [`GenerationRequest`] through an [`ExecutionService`] to a
/// terminal [`JobResult`].
///
/// All waits are tokio timers; the calling task is suspended, never blocked.
#[derive(Clone)]
pub struct ExecutionPoller {
    service: Arc<dyn ExecutionService>,
    policy: PollPolicy,
}

impl ExecutionPoller {
    pub fn new(service: Arc<dyn ExecutionService>, policy: PollPolicy) -> Self {
        Self { service, policy }
    }

    /// Run without external cancellation
    pub async fn run(&self, request: &GenerationRequest) -> JobResult {
        self.run_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// Run until success, attempt exhaustion, or cancellation.
    ///
    /// Returns `succeeded` with the raw payload, or `failed` with the last
    /// attempt's error and the number of attempts made. Cancellation returns
    /// `failed` with reason `cancelled` immediately, abandoning any in-flight
    /// request.
    pub async fn run_with_cancel(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> JobResult {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        let last_error = loop {
            attempt += 1;
            let started = Instant::now();

            let error = match self.run_attempt(request, cancel).await {
                Ok(payload) => {
                    info!(
                        city = %request.city,
                        attempt,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Execution succeeded"
                    );
                    return JobResult::succeeded(payload);
                }
                Err(TourError::Cancelled) => return JobResult::failed(TourError::Cancelled.to_string()),
                Err(e) => e,
            };

            warn!(
                city = %request.city,
                attempt,
                max_attempts,
                error = %error,
                "Execution attempt failed"
            );

            if !error.is_retryable() || attempt >= max_attempts {
                break error;
            }

            tokio::select! {
                () = cancel.cancelled() => return JobResult::failed(TourError::Cancelled.to_string()),
                () = tokio::time::sleep(self.policy.retry_backoff) => {}
            }
        };

        JobResult::failed(format!("{last_error} (after {attempt} attempt(s))"))
    }

    /// One submission polled to a terminal state or the attempt deadline
    async fn run_attempt(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<String, TourError> {
        let deadline = Instant::now() + self.policy.attempt_timeout;

        let handle = self
            .bounded(
                deadline,
                cancel,
                self.service.submit(&request.task, &request.input),
            )
            .await?;
        debug!(city = %request.city, job_id = %handle, "Execution submitted");

        loop {
            let result = self
                .bounded(deadline, cancel, self.service.get_status(&handle))
                .await?;

            if !result.status.is_terminal() {
                self.wait_for_next_poll(&handle, deadline, cancel).await?;
                continue;
            }

            return if result.status == JobStatus::Succeeded {
                result.payload.ok_or_else(|| {
                    TourError::RemoteFailure(format!("execution {handle} succeeded without output"))
                })
            } else {
                Err(TourError::RemoteFailure(
                    result
                        .error
                        .unwrap_or_else(|| format!("execution {handle} failed")),
                ))
            };
        }
    }

    async fn wait_for_next_poll(
        &self,
        handle: &JobHandle,
        deadline: Instant,
        cancel: &CancellationToken,
    ) -> Result<(), TourError> {
        tokio::select! {
            () = cancel.cancelled() => return Err(TourError::Cancelled),
            () = tokio::time::sleep(self.policy.poll_interval) => {}
        }

        if Instant::now() >= deadline {
            debug!(job_id = %handle, "Execution still pending at deadline");
            return Err(self.timed_out());
        }
        Ok(())
    }

    /// Await `fut` unless the deadline passes or the token is cancelled first
    async fn bounded<T>(
        &self,
        deadline: Instant,
        cancel: &CancellationToken,
        fut: impl Future<Output = Result<T, TourError>>,
    ) -> Result<T, TourError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(TourError::Cancelled),
            res = tokio::time::timeout_at(deadline, fut) => match res {
                Ok(inner) => inner,
                Err(_) => Err(self.timed_out()),
            },
        }
    }

    const fn timed_out(&self) -> TourError {
        TourError::Timeout {
            duration: self.policy.attempt_timeout,
        }
    }
}
