//! Leap REST API client.

use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info_span, Instrument};

use leap_models::{
    GenerationOptions, InferenceId, InferenceJob, Model, ModelId, ModelVersion, VersionId,
    DEFAULT_SUBJECT_KEYWORD,
};

use crate::api::LeapApi;
use crate::error::{LeapError, LeapResult};
use crate::types::{
    CreateModelRequest, InferenceJobResponse, InferenceRequest, ModelResponse,
    ModelVersionResponse, UploadSamplesRequest,
};

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.tryleap.ai/api/v1";

// =============================================================================
// Configuration
// =============================================================================

/// Leap client configuration.
#[derive(Clone)]
pub struct LeapClientConfig {
    /// API root, without trailing slash
    pub base_url: String,
    /// Bearer token sent on every request
    pub api_key: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
}

impl fmt::Debug for LeapClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeapClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl LeapClientConfig {
    /// Config with default timeouts against the given API root.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> LeapResult<Self> {
        let api_key = std::env::var("LEAP_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .map_err(|_| LeapError::config("LEAP_API_KEY or API_KEY must be set"))?;

        if api_key.trim().is_empty() {
            return Err(LeapError::config("LEAP_API_KEY or API_KEY cannot be empty"));
        }

        let base_url =
            std::env::var("LEAP_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let mut config = Self::new(base_url, api_key.trim());
        config.timeout = Duration::from_secs(
            std::env::var("LEAP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        );
        config.connect_timeout = Duration::from_secs(
            std::env::var("LEAP_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
        );

        Ok(config)
    }
}

// =============================================================================
// Client
// =============================================================================

/// Client for the Leap image fine-tuning API.
#[derive(Clone)]
pub struct LeapClient {
    http: Client,
    config: LeapClientConfig,
}

impl LeapClient {
    /// Create a new Leap client.
    pub fn new(config: LeapClientConfig) -> LeapResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(concat!("leap-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(LeapError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> LeapResult<Self> {
        Self::new(LeapClientConfig::from_env()?)
    }

    pub fn config(&self) -> &LeapClientConfig {
        &self.config
    }

    fn models_url(&self) -> String {
        format!("{}/images/models", self.config.base_url)
    }

    fn model_url(&self, model_id: &ModelId) -> String {
        format!("{}/{}", self.models_url(), model_id)
    }

    /// Attach auth and content negotiation headers.
    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .bearer_auth(&self.config.api_key)
            .header(header::ACCEPT, "application/json")
    }

    /// Send a request and turn non-success statuses into errors.
    async fn execute(&self, operation: &'static str, builder: RequestBuilder) -> LeapResult<Response> {
        let span = info_span!("leap_request", operation = operation);

        async {
            let start = Instant::now();
            let response = self.authorized(builder).send().await?;
            let status = response.status();

            debug!(
                status = status.as_u16(),
                latency_ms = start.elapsed().as_millis() as u64,
                "Leap request completed"
            );

            if status.is_success() {
                Ok(response)
            } else {
                let body = response.text().await.unwrap_or_default();
                Err(LeapError::from_http_status(
                    status.as_u16(),
                    format!("{} failed: {}", operation, body),
                ))
            }
        }
        .instrument(span)
        .await
    }

    /// Decode a JSON body, keeping the raw text on failure.
    async fn decode<T: DeserializeOwned>(operation: &str, response: Response) -> LeapResult<T> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            LeapError::invalid_response(format!("{} returned unexpected body ({}): {}", operation, e, body))
        })
    }
}

#[async_trait]
impl LeapApi for LeapClient {
    async fn create_model(&self, title: &str) -> LeapResult<Model> {
        let body = CreateModelRequest {
            title,
            subject_keyword: DEFAULT_SUBJECT_KEYWORD,
        };

        let response = self
            .execute("create_model", self.http.post(self.models_url()).json(&body))
            .await?;
        let model: ModelResponse = Self::decode("create_model", response).await?;

        Ok(Model {
            id: model.id,
            title: model.title.unwrap_or_else(|| title.to_string()),
            subject_keyword: model
                .subject_keyword
                .unwrap_or_else(|| DEFAULT_SUBJECT_KEYWORD.to_string()),
        })
    }

    async fn upload_image_samples(&self, model_id: &ModelId, images: &[String]) -> LeapResult<()> {
        if images.is_empty() {
            return Err(LeapError::invalid_request("no sample images to upload"));
        }

        let url = format!("{}/samples/url", self.model_url(model_id));
        let body = UploadSamplesRequest { images };

        self.execute("upload_image_samples", self.http.post(url).json(&body))
            .await?;
        Ok(())
    }

    async fn queue_training_job(&self, model_id: &ModelId) -> LeapResult<ModelVersion> {
        let url = format!("{}/queue", self.model_url(model_id));

        let response = self
            .execute("queue_training_job", self.http.post(url))
            .await?;
        let version: ModelVersionResponse = Self::decode("queue_training_job", response).await?;
        Ok(version.into())
    }

    async fn get_model_version(
        &self,
        model_id: &ModelId,
        version_id: &VersionId,
    ) -> LeapResult<ModelVersion> {
        let url = format!("{}/versions/{}", self.model_url(model_id), version_id);

        let response = self.execute("get_model_version", self.http.get(url)).await?;
        let version: ModelVersionResponse = Self::decode("get_model_version", response).await?;
        Ok(version.into())
    }

    async fn generate_image(
        &self,
        model_id: &ModelId,
        prompt: &str,
        options: &GenerationOptions,
    ) -> LeapResult<InferenceJob> {
        if prompt.trim().is_empty() {
            return Err(LeapError::invalid_request("prompt cannot be empty"));
        }
        options
            .validate()
            .map_err(|e| LeapError::invalid_request(e.to_string()))?;

        let url = format!("{}/inferences", self.model_url(model_id));
        let body = InferenceRequest {
            prompt,
            options: *options,
        };

        let response = self
            .execute("generate_image", self.http.post(url).json(&body))
            .await?;
        let job: InferenceJobResponse = Self::decode("generate_image", response).await?;
        InferenceJob::try_from(job)
    }

    async fn get_inference_job(
        &self,
        model_id: &ModelId,
        inference_id: &InferenceId,
    ) -> LeapResult<InferenceJob> {
        let url = format!("{}/inferences/{}", self.model_url(model_id), inference_id);

        let response = self.execute("get_inference_job", self.http.get(url)).await?;
        let job: InferenceJobResponse = Self::decode("get_inference_job", response).await?;
        InferenceJob::try_from(job)
    }
}

// =============================================================================
// Tests
// =============================================================================
