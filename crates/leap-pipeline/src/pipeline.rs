//! Fine-tune and generate orchestration.
//!
//! Stages run strictly in order; each one starts only after the previous
//! stage's identifier is in hand, and the first failure aborts the rest.

use std::future::Future;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::Instrument;

use leap_client::{LeapApi, LeapError};
use leap_models::{InferenceId, ModelId, Pollable, VersionId};

use crate::config::{PipelineConfig, PipelineRequest};
use crate::error::{PipelineError, PipelineResult, Stage};
use crate::logging::StageLogger;
use crate::poll::{cancelled, wait_until_complete, PollError};

/// Everything produced by a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    pub model_id: ModelId,
    pub version_id: VersionId,
    pub inference_id: InferenceId,
    /// First generated image. `None` means the job finished without images.
    pub image: Option<String>,
    pub finished_at: DateTime<Utc>,
}

/// Drives one model from creation to a generated image.
pub struct Pipeline<A> {
    api: A,
    config: PipelineConfig,
    cancel: watch::Receiver<bool>,
}

impl<A: LeapApi> Pipeline<A> {
    /// Create a pipeline that can only stop by finishing or failing.
    pub fn new(api: A, config: PipelineConfig) -> Self {
        let (_, cancel) = watch::channel(false);
        Self {
            api,
            config,
            cancel,
        }
    }

    /// Abort the run as soon as `cancel` carries `true`.
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Run every stage in order.
    pub async fn run(&self, request: &PipelineRequest) -> PipelineResult<PipelineOutput> {
        request.validate()?;

        // Create model
        let logger = StageLogger::new(Stage::CreateModel, format!("title '{}'", request.title));
        logger.log_start("creating model");
        let model = self
            .call(&logger, self.api.create_model(&request.title))
            .instrument(logger.create_span())
            .await?;
        let model_id = model.id;
        logger.log_completion(&format!("model {}", model_id));

        // Upload reference images
        let logger = StageLogger::for_model(Stage::UploadSamples, &model_id);
        logger.log_start(&format!("uploading {} images", request.images.len()));
        self.call(&logger, self.api.upload_image_samples(&model_id, &request.images))
            .instrument(logger.create_span())
            .await?;
        logger.log_completion("samples uploaded");

        // Queue training
        let logger = StageLogger::for_model(Stage::QueueTraining, &model_id);
        let queued = self
            .call(&logger, self.api.queue_training_job(&model_id))
            .instrument(logger.create_span())
            .await?;
        let version_id = queued.version_id.clone();
        logger.log_completion(&format!(
            "version {} initial status {}",
            version_id, queued.status
        ));

        // Wait for training
        let logger =
            StageLogger::for_model(Stage::AwaitTraining, &model_id).with_version(&version_id);
        logger.log_start(&format!("polling every {:?}", self.config.training_poll.interval));
        let mut cancel = self.cancel.clone();
        let trained = wait_until_complete(
            &self.config.training_poll,
            "training",
            &mut cancel,
            || self.api.get_model_version(&model_id, &version_id),
        )
        .instrument(logger.create_span())
        .await
        .map_err(|e| Self::poll_failed(&logger, e))?;
        logger.log_completion(&format!("status {}", trained.status_label()));

        // Submit inference
        let logger = StageLogger::for_model(Stage::SubmitInference, &model_id);
        if !request.mentions_subject() {
            logger.log_warning("prompt does not mention the subject keyword");
        }
        logger.log_progress(&format!("prompt '{}'", request.prompt));
        let submitted = self
            .call(
                &logger,
                self.api
                    .generate_image(&model_id, &request.prompt, &request.options),
            )
            .instrument(logger.create_span())
            .await?;
        let inference_id = submitted.inference_id.clone();
        logger.log_completion(&format!(
            "inference {} initial state {}",
            inference_id, submitted.state
        ));

        // Wait for inference
        let logger = StageLogger::for_model(Stage::AwaitInference, &model_id)
            .with_inference(&inference_id);
        logger.log_start(&format!("polling every {:?}", self.config.inference_poll.interval));
        let mut cancel = self.cancel.clone();
        let job = wait_until_complete(
            &self.config.inference_poll,
            "inference",
            &mut cancel,
            || self.api.get_inference_job(&model_id, &inference_id),
        )
        .instrument(logger.create_span())
        .await
        .map_err(|e| Self::poll_failed(&logger, e))?;

        match &job.image {
            Some(uri) => logger.log_completion(&format!("image {}", uri)),
            None => logger.log_warning("job finished without producing an image"),
        }

        Ok(PipelineOutput {
            model_id,
            version_id,
            inference_id,
            image: job.image,
            finished_at: Utc::now(),
        })
    }

    /// Await one remote call, aborting it if cancellation fires first.
    async fn call<T, Fut>(&self, logger: &StageLogger, request: Fut) -> PipelineResult<T>
    where
        Fut: Future<Output = Result<T, LeapError>>,
    {
        let mut cancel = self.cancel.clone();

        let result = tokio::select! {
            biased;
            _ = cancelled(&mut cancel) => {
                logger.log_warning("cancelled while request in flight");
                return Err(PipelineError::Cancelled { stage: logger.stage() });
            }
            result = request => result,
        };

        result.map_err(|source| {
            logger.log_error(&source.to_string());
            PipelineError::Request {
                stage: logger.stage(),
                target: logger.target().to_string(),
                source,
            }
        })
    }

    fn poll_failed(logger: &StageLogger, error: PollError<LeapError>) -> PipelineError {
        logger.log_error(&error.to_string());

        let stage = logger.stage();
        let target = logger.target().to_string();
        match error {
            PollError::Timeout {
                attempts, elapsed, ..
            } => PipelineError::Timeout {
                stage,
                target,
                attempts,
                elapsed,
            },
            PollError::JobFailed { status } => PipelineError::JobFailed {
                stage,
                target,
                status,
            },
            PollError::Rejected { error, .. } => PipelineError::Request {
                stage,
                target,
                source: error,
            },
            PollError::Cancelled { .. } => PipelineError::Cancelled { stage },
        }
    }
}
