//! Inference (image generation) jobs.

use serde::{Deserialize, Serialize};

use crate::ids::InferenceId;
use crate::phase::{JobPhase, Pollable};

/// State of an inference job as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InferenceState {
    #[default]
    Queued,
    #[serde(alias = "processing")]
    Running,
    Finished,
    Failed,
    #[serde(other)]
    Unknown,
}

impl InferenceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            InferenceState::Queued => "queued",
            InferenceState::Running => "running",
            InferenceState::Finished => "finished",
            InferenceState::Failed => "failed",
            InferenceState::Unknown => "unknown",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, InferenceState::Finished | InferenceState::Failed)
    }
}

impl std::fmt::Display for InferenceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of one inference job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceJob {
    pub inference_id: InferenceId,
    pub state: InferenceState,
    /// First generated image URI. `None` when the job produced no images.
    #[serde(default)]
    pub image: Option<String>,
}

impl InferenceJob {
    pub fn new(inference_id: InferenceId, state: InferenceState) -> Self {
        Self {
            inference_id,
            state,
            image: None,
        }
    }

    /// Attach the first result URI.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

impl Pollable for InferenceJob {
    fn phase(&self) -> JobPhase {
        match self.state {
            InferenceState::Finished => JobPhase::Finished,
            InferenceState::Failed => JobPhase::Failed,
            _ => JobPhase::Pending,
        }
    }

    fn status_label(&self) -> &str {
        self.state.as_str()
    }

    fn job_id(&self) -> &str {
        self.inference_id.as_str()
    }
}
