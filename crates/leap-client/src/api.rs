//! The remote operations the pipeline depends on.

use async_trait::async_trait;

use leap_models::{GenerationOptions, InferenceId, InferenceJob, Model, ModelId, ModelVersion, VersionId};

use crate::error::LeapResult;

/// Operations offered by the Leap image fine-tuning API.
///
/// Creation calls return the job's *initial* state; the two getters are
/// idempotent reads that are safe to call repeatedly.
#[async_trait]
pub trait LeapApi: Send + Sync {
    /// Create a model tagged with the default subject keyword.
    async fn create_model(&self, title: &str) -> LeapResult<Model>;

    /// Attach reference image URLs to a model.
    async fn upload_image_samples(&self, model_id: &ModelId, images: &[String]) -> LeapResult<()>;

    /// Start fine-tuning a model.
    async fn queue_training_job(&self, model_id: &ModelId) -> LeapResult<ModelVersion>;

    /// Fetch the current state of a training run.
    async fn get_model_version(
        &self,
        model_id: &ModelId,
        version_id: &VersionId,
    ) -> LeapResult<ModelVersion>;

    /// Submit an image generation request.
    async fn generate_image(
        &self,
        model_id: &ModelId,
        prompt: &str,
        options: &GenerationOptions,
    ) -> LeapResult<InferenceJob>;

    /// Fetch the current state of an inference job.
    async fn get_inference_job(
        &self,
        model_id: &ModelId,
        inference_id: &InferenceId,
    ) -> LeapResult<InferenceJob>;
}
