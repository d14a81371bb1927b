//! Wait-until-complete protocol for asynchronous remote jobs.
//!
//! Each poll suspends for the configured interval, then awaits exactly one
//! status fetch before deciding whether to continue. Polling is bounded by
//! an attempt cap and an optional deadline, and aborts promptly when the
//! cancellation signal fires (including while a fetch is in flight).

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use leap_client::LeapError;
use leap_models::{JobPhase, Pollable};

// =============================================================================
// Configuration
// =============================================================================

/// Polling bounds for one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay before each status fetch.
    pub interval: Duration,
    /// Maximum number of status fetches. Zero is treated as one.
    pub max_attempts: u32,
    /// Optional wall-clock bound on the whole wait.
    pub deadline: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_attempts: 180,
            deadline: None,
        }
    }
}

impl PollConfig {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
            deadline: None,
        }
    }

    /// Set the wall-clock deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PollError<E> {
    #[error("no terminal status after {attempts} polls ({elapsed:?}); last status {last_status:?}, last error {last_error:?}")]
    Timeout {
        attempts: u32,
        elapsed: Duration,
        last_status: Option<String>,
        last_error: Option<String>,
    },

    #[error("job ended with status '{status}'")]
    JobFailed { status: String },

    #[error("status fetch rejected after {attempts} polls: {error}")]
    Rejected { attempts: u32, error: E },

    #[error("polling cancelled after {attempts} polls")]
    Cancelled { attempts: u32 },
}

/// Fetch errors the wait loop can classify.
pub trait RetryableError: Display {
    /// `false` stops polling at once; `true` counts as a failed attempt.
    fn is_retryable(&self) -> bool;
}

impl RetryableError for LeapError {
    fn is_retryable(&self) -> bool {
        LeapError::is_retryable(self)
    }
}

// =============================================================================
// Cancellation
// =============================================================================

/// Resolves once the signal carries `true`. Never resolves if every sender
/// is gone without having signalled.
pub async fn cancelled(signal: &mut watch::Receiver<bool>) {
    loop {
        if *signal.borrow_and_update() {
            return;
        }
        if signal.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

// =============================================================================
// Wait loop
// =============================================================================

/// Consecutive fetch failures logged before the rest are suppressed.
const MAX_LOGGED_FAILURES: u32 = 3;

/// Poll `fetch` until the job reaches a terminal phase.
///
/// Returns the finished snapshot, or:
/// - `JobFailed` when the job reaches a failure terminal state,
/// - `Rejected` when a fetch fails with a non-retryable error,
/// - `Timeout` when the attempt cap or deadline is hit first,
/// - `Cancelled` when `cancel` fires.
///
/// Retryable fetch errors are logged, counted as attempts and retried until
/// the bounds are exhausted.
pub async fn wait_until_complete<T, E, F, Fut>(
    config: &PollConfig,
    label: &str,
    cancel: &mut watch::Receiver<bool>,
    mut fetch: F,
) -> Result<T, PollError<E>>
where
    T: Pollable,
    E: RetryableError,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = config.max_attempts.max(1);
    let start = Instant::now();
    let mut attempts = 0u32;
    let mut consecutive_failures = 0u32;
    let mut last_status: Option<String> = None;
    let mut last_error: Option<String> = None;

    loop {
        let delay = match config.deadline {
            Some(deadline) => config.interval.min(deadline.saturating_sub(start.elapsed())),
            None => config.interval,
        };

        tokio::select! {
            biased;
            _ = cancelled(cancel) => return Err(PollError::Cancelled { attempts }),
            _ = tokio::time::sleep(delay) => {}
        }

        attempts += 1;

        let result = tokio::select! {
            biased;
            _ = cancelled(cancel) => return Err(PollError::Cancelled { attempts }),
            result = fetch() => result,
        };

        match result {
            Ok(snapshot) => {
                if consecutive_failures > MAX_LOGGED_FAILURES {
                    debug!(
                        job = label,
                        "Status fetch recovered after {} consecutive failures",
                        consecutive_failures
                    );
                }
                consecutive_failures = 0;
                let status = snapshot.status_label().to_string();

                match snapshot.phase() {
                    JobPhase::Finished => {
                        info!(
                            job = label,
                            job_id = snapshot.job_id(),
                            attempt = attempts,
                            elapsed_ms = start.elapsed().as_millis() as u64,
                            "Job finished"
                        );
                        return Ok(snapshot);
                    }
                    JobPhase::Failed => {
                        warn!(
                            job = label,
                            job_id = snapshot.job_id(),
                            attempt = attempts,
                            status = %status,
                            "Job reached failure state"
                        );
                        return Err(PollError::JobFailed { status });
                    }
                    JobPhase::Pending => {
                        info!(
                            job = label,
                            job_id = snapshot.job_id(),
                            attempt = attempts,
                            status = %status,
                            "Job still pending"
                        );
                        last_status = Some(status);
                    }
                }
            }
            Err(e) if !e.is_retryable() => {
                warn!(job = label, attempt = attempts, "Status fetch rejected: {}", e);
                return Err(PollError::Rejected { attempts, error: e });
            }
            Err(e) => {
                consecutive_failures += 1;
                if consecutive_failures <= MAX_LOGGED_FAILURES {
                    warn!(
                        job = label,
                        attempt = attempts,
                        "Status fetch failed, will retry: {}",
                        e
                    );
                } else if consecutive_failures == MAX_LOGGED_FAILURES + 1 {
                    warn!(
                        job = label,
                        "Suppressing further status fetch errors after {} consecutive failures",
                        MAX_LOGGED_FAILURES
                    );
                }
                last_error = Some(e.to_string());
            }
        }

        let elapsed = start.elapsed();
        let past_deadline = config.deadline.is_some_and(|d| elapsed >= d);

        if attempts >= max_attempts || past_deadline {
            warn!(
                job = label,
                attempts,
                elapsed_ms = elapsed.as_millis() as u64,
                "Giving up waiting for job"
            );
            return Err(PollError::Timeout {
                attempts,
                elapsed,
                last_status,
                last_error,
            });
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
