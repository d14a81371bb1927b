//! Leap API request/response wire types.

use serde::{Deserialize, Serialize};

use crate::error::LeapError;
use leap_models::{
    GenerationOptions, InferenceId, InferenceJob, InferenceState, ModelId, ModelVersion,
    TrainingStatus, VersionId,
};

/// Body of `POST /images/models`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateModelRequest<'a> {
    pub title: &'a str,
    pub subject_keyword: &'a str,
}

/// Body of `POST /images/models/{id}/samples/url`.
#[derive(Debug, Clone, Serialize)]
pub struct UploadSamplesRequest<'a> {
    pub images: &'a [String],
}

/// Body of `POST /images/models/{id}/inferences`.
#[derive(Debug, Clone, Serialize)]
pub struct InferenceRequest<'a> {
    pub prompt: &'a str,
    #[serde(flatten)]
    pub options: GenerationOptions,
}

/// Model as returned by the service. Only the id is relied on.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelResponse {
    pub id: ModelId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subject_keyword: Option<String>,
}

/// Model version as returned by the queue and version endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelVersionResponse {
    pub id: VersionId,
    pub status: TrainingStatus,
}

impl From<ModelVersionResponse> for ModelVersion {
    fn from(r: ModelVersionResponse) -> Self {
        Self {
            version_id: r.id,
            status: r.status,
        }
    }
}

/// One generated image.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageResponse {
    pub uri: String,
}

/// Inference job as returned by the inference endpoints.
///
/// The submit endpoint reports `status`, the fetch endpoint reports `state`.
/// `state` wins when both are present.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceJobResponse {
    pub id: InferenceId,
    #[serde(default)]
    pub state: Option<InferenceState>,
    #[serde(default)]
    pub status: Option<InferenceState>,
    #[serde(default)]
    pub images: Option<Vec<ImageResponse>>,
}

impl TryFrom<InferenceJobResponse> for InferenceJob {
    type Error = LeapError;

    fn try_from(r: InferenceJobResponse) -> Result<Self, Self::Error> {
        let state = r.state.or(r.status).ok_or_else(|| {
            LeapError::invalid_response(format!("inference {} has neither state nor status", r.id))
        })?;

        Ok(Self {
            inference_id: r.id,
            state,
            image: r.images.and_then(|images| images.into_iter().next()).map(|i| i.uri),
        })
    }
}
