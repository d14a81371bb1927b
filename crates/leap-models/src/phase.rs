//! Mapping of remote job statuses onto the polling protocol.

use serde::{Deserialize, Serialize};

/// Where an asynchronous remote job stands from the poller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    /// Still queued or running; keep polling.
    Pending,
    /// Reached the success terminal state.
    Finished,
    /// Reached a failure terminal state.
    Failed,
}

impl JobPhase {
    /// Check if this is a terminal phase (no more transitions expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobPhase::Finished | JobPhase::Failed)
    }
}

/// A status snapshot of a remote job that can be polled to completion.
pub trait Pollable {
    /// Current phase of the job.
    fn phase(&self) -> JobPhase;

    /// Raw status label, for logs and error messages.
    fn status_label(&self) -> &str;

    /// Remote identifier of the job.
    fn job_id(&self) -> &str;
}
