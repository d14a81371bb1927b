//! Structured stage logging utilities.
//!
//! Provides consistent, structured logging for pipeline stages with
//! tracing spans and contextual information.

use tracing::{error, info, warn, Span};

use leap_models::{InferenceId, ModelId, VersionId};

use crate::error::Stage;

/// Stage logger for structured logging with consistent formatting.
///
/// Every event carries the stage name, a readable description of the remote
/// resource, and whichever of `model_id`, `version_id` and `inference_id`
/// are known for the stage.
#[derive(Debug, Clone)]
pub struct StageLogger {
    stage: Stage,
    target: String,
    model_id: Option<String>,
    version_id: Option<String>,
    inference_id: Option<String>,
}

impl StageLogger {
    /// Create a new logger for a stage acting on `target` (e.g. "title 'Sample'").
    pub fn new(stage: Stage, target: impl Into<String>) -> Self {
        Self {
            stage,
            target: target.into(),
            model_id: None,
            version_id: None,
            inference_id: None,
        }
    }

    /// Logger for a stage acting on an existing model.
    pub fn for_model(stage: Stage, model_id: &ModelId) -> Self {
        let mut logger = Self::new(stage, format!("model {}", model_id));
        logger.model_id = Some(model_id.to_string());
        logger
    }

    pub fn with_version(mut self, version_id: &VersionId) -> Self {
        self.target.push_str(&format!(" version {}", version_id));
        self.version_id = Some(version_id.to_string());
        self
    }

    pub fn with_inference(mut self, inference_id: &InferenceId) -> Self {
        self.target.push_str(&format!(" inference {}", inference_id));
        self.inference_id = Some(inference_id.to_string());
        self
    }

    pub fn log_start(&self, message: &str) {
        info!(
            stage = %self.stage,
            target_resource = %self.target,
            model_id = self.model_id.as_deref(),
            version_id = self.version_id.as_deref(),
            inference_id = self.inference_id.as_deref(),
            "Stage started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            stage = %self.stage,
            target_resource = %self.target,
            model_id = self.model_id.as_deref(),
            version_id = self.version_id.as_deref(),
            inference_id = self.inference_id.as_deref(),
            "Stage progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            stage = %self.stage,
            target_resource = %self.target,
            model_id = self.model_id.as_deref(),
            version_id = self.version_id.as_deref(),
            inference_id = self.inference_id.as_deref(),
            "Stage warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            stage = %self.stage,
            target_resource = %self.target,
            model_id = self.model_id.as_deref(),
            version_id = self.version_id.as_deref(),
            inference_id = self.inference_id.as_deref(),
            "Stage failed: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            stage = %self.stage,
            target_resource = %self.target,
            model_id = self.model_id.as_deref(),
            version_id = self.version_id.as_deref(),
            inference_id = self.inference_id.as_deref(),
            "Stage completed: {}", message
        );
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn model_id(&self) -> Option<&str> {
        self.model_id.as_deref()
    }

    pub fn version_id(&self) -> Option<&str> {
        self.version_id.as_deref()
    }

    pub fn inference_id(&self) -> Option<&str> {
        self.inference_id.as_deref()
    }

    /// Create a tracing span for this stage.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "stage",
            stage = %self.stage,
            target_resource = %self.target,
            model_id = self.model_id.as_deref(),
            version_id = self.version_id.as_deref(),
            inference_id = self.inference_id.as_deref()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_logger_creation() {
        let logger = StageLogger::new(Stage::QueueTraining, "model m1");

        assert_eq!(logger.stage(), Stage::QueueTraining);
        assert_eq!(logger.target(), "model m1");
        assert!(logger.model_id().is_none());
    }

    #[test]
    fn test_stage_logger_carries_ids() {
        let logger = StageLogger::for_model(Stage::AwaitTraining, &ModelId::from("m1"))
            .with_version(&VersionId::from("v1"));

        assert_eq!(logger.target(), "model m1 version v1");
        assert_eq!(logger.model_id(), Some("m1"));
        assert_eq!(logger.version_id(), Some("v1"));
        assert!(logger.inference_id().is_none());

        let logger = StageLogger::for_model(Stage::AwaitInference, &ModelId::from("m1"))
            .with_inference(&InferenceId::from("i1"));
        assert_eq!(logger.target(), "model m1 inference i1");
        assert_eq!(logger.inference_id(), Some("i1"));
    }
}
