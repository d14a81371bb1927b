//! Pipeline error types.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use leap_client::LeapError;

pub type PipelineResult<T> = Result<T, PipelineError>;

/// One step of the fine-tune and generate workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    CreateModel,
    UploadSamples,
    QueueTraining,
    AwaitTraining,
    SubmitInference,
    AwaitInference,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::CreateModel => "create_model",
            Stage::UploadSamples => "upload_samples",
            Stage::QueueTraining => "queue_training",
            Stage::AwaitTraining => "await_training",
            Stage::SubmitInference => "submit_inference",
            Stage::AwaitInference => "await_inference",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Stage {stage} failed for {target}: {source}")]
    Request {
        stage: Stage,
        target: String,
        #[source]
        source: LeapError,
    },

    #[error("Stage {stage} timed out for {target} after {attempts} polls ({elapsed:?})")]
    Timeout {
        stage: Stage,
        target: String,
        attempts: u32,
        elapsed: Duration,
    },

    #[error("Stage {stage}: remote job for {target} ended with status '{status}'")]
    JobFailed {
        stage: Stage,
        target: String,
        status: String,
    },

    #[error("Stage {stage} cancelled")]
    Cancelled { stage: Stage },
}

impl PipelineError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Stage that failed, if the failure happened while running.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Config(_) | PipelineError::InvalidInput(_) => None,
            PipelineError::Request { stage, .. }
            | PipelineError::Timeout { stage, .. }
            | PipelineError::JobFailed { stage, .. }
            | PipelineError::Cancelled { stage } => Some(*stage),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, PipelineError::Cancelled { .. })
    }

    /// Process exit code for the binary.
    pub fn exit_code(&self) -> i32 {
        if self.is_cancelled() {
            130
        } else {
            1
        }
    }
}
