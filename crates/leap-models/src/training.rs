//! Model versions (fine-tuning jobs).

use serde::{Deserialize, Serialize};

use crate::ids::VersionId;
use crate::phase::{JobPhase, Pollable};

/// Status of a training job as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TrainingStatus {
    /// Waiting for a training slot
    #[default]
    Queued,
    /// Training in progress
    #[serde(alias = "processing")]
    Running,
    /// Training completed, the version can be used for inference
    Finished,
    /// Training failed
    Failed,
    /// Any status this client does not know about
    #[serde(other)]
    Unknown,
}

impl TrainingStatus {
    /// Get string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingStatus::Queued => "queued",
            TrainingStatus::Running => "running",
            TrainingStatus::Finished => "finished",
            TrainingStatus::Failed => "failed",
            TrainingStatus::Unknown => "unknown",
        }
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TrainingStatus::Finished | TrainingStatus::Failed)
    }
}

impl std::fmt::Display for TrainingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of one training run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelVersion {
    pub version_id: VersionId,
    pub status: TrainingStatus,
}

impl ModelVersion {
    pub fn new(version_id: VersionId, status: TrainingStatus) -> Self {
        Self {
            version_id,
            status,
        }
    }
}

impl Pollable for ModelVersion {
    fn phase(&self) -> JobPhase {
        match self.status {
            TrainingStatus::Finished => JobPhase::Finished,
            TrainingStatus::Failed => JobPhase::Failed,
            TrainingStatus::Queued | TrainingStatus::Running | TrainingStatus::Unknown => {
                JobPhase::Pending
            }
        }
    }

    fn status_label(&self) -> &str {
        self.status.as_str()
    }

    fn job_id(&self) -> &str {
        self.version_id.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing() {
        let s: TrainingStatus = serde_json::from_str("\"running\"").unwrap();
        assert_eq!(s, TrainingStatus::Running);

        let s: TrainingStatus = serde_json::from_str("\"processing\"").unwrap();
        assert_eq!(s, TrainingStatus::Running);

        let s: TrainingStatus = serde_json::from_str("\"finished\"").unwrap();
        assert!(s.is_terminal());
    }

    #[test]
    fn test_unknown_status_keeps_polling() {
        let s: TrainingStatus = serde_json::from_str("\"warming_up\"").unwrap();
        assert_eq!(s, TrainingStatus::Unknown);

        let version = ModelVersion::new(VersionId::from("v1"), s);
        assert_eq!(version.phase(), JobPhase::Pending);
    }

    #[test]
    fn test_phase_mapping() {
        let v = ModelVersion::new(VersionId::from("v1"), TrainingStatus::Finished);
        assert_eq!(v.phase(), JobPhase::Finished);
        assert_eq!(v.job_id(), "v1");

        let v = ModelVersion::new(VersionId::from("v1"), TrainingStatus::Failed);
        assert_eq!(v.phase(), JobPhase::Failed);
        assert_eq!(v.status_label(), "failed");
    }
}
