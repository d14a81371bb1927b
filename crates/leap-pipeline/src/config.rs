//! Pipeline configuration.

use std::str::FromStr;
use std::time::Duration;

use url::Url;

use leap_models::{GenerationOptions, DEFAULT_SUBJECT_KEYWORD};

use crate::error::{PipelineError, PipelineResult};
use crate::poll::PollConfig;

/// Title given to the fine-tuned model.
pub const DEFAULT_MODEL_TITLE: &str = "Sample";

/// Prompt used for the generated portrait.
pub const DEFAULT_PROMPT: &str = "Detailed portrait of @me, futuristic sci-fi style, \
     low-emission-neon, bladerunner movie scene style";

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

/// Polling bounds for both asynchronous stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Wait for the training run to finish
    pub training_poll: PollConfig,
    /// Wait for the inference job to finish
    pub inference_poll: PollConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            training_poll: PollConfig::new(Duration::from_secs(10), 180), // 30 minutes
            inference_poll: PollConfig::new(Duration::from_secs(10), 60), // 10 minutes
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let interval = Duration::from_secs(env_parse("LEAP_POLL_INTERVAL_SECS").unwrap_or(10));

        let mut training_poll =
            PollConfig::new(interval, env_parse("LEAP_TRAINING_MAX_POLLS").unwrap_or(180));
        if let Some(secs) = env_parse::<u64>("LEAP_TRAINING_DEADLINE_SECS") {
            training_poll = training_poll.with_deadline(Duration::from_secs(secs));
        }

        let mut inference_poll =
            PollConfig::new(interval, env_parse("LEAP_INFERENCE_MAX_POLLS").unwrap_or(60));
        if let Some(secs) = env_parse::<u64>("LEAP_INFERENCE_DEADLINE_SECS") {
            inference_poll = inference_poll.with_deadline(Duration::from_secs(secs));
        }

        Self {
            training_poll,
            inference_poll,
        }
    }
}

/// What to train and what to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRequest {
    /// Model title
    pub title: String,
    /// Reference image URLs uploaded before training
    pub images: Vec<String>,
    /// Generation prompt; should mention the subject keyword
    pub prompt: String,
    /// Fixed generation parameters
    pub options: GenerationOptions,
}

impl PipelineRequest {
    pub fn new(images: Vec<String>) -> Self {
        Self {
            title: DEFAULT_MODEL_TITLE.to_string(),
            images,
            prompt: DEFAULT_PROMPT.to_string(),
            options: GenerationOptions::default(),
        }
    }

    /// Create the request from environment variables.
    pub fn from_env() -> PipelineResult<Self> {
        let images: Vec<String> = std::env::var("LEAP_SAMPLE_IMAGES")
            .map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let defaults = GenerationOptions::default();
        let options = GenerationOptions {
            steps: env_parse("LEAP_STEPS").unwrap_or(defaults.steps),
            width: env_parse("LEAP_WIDTH").unwrap_or(defaults.width),
            height: env_parse("LEAP_HEIGHT").unwrap_or(defaults.height),
            number_of_images: env_parse("LEAP_NUM_IMAGES").unwrap_or(defaults.number_of_images),
            seed: env_parse("LEAP_SEED").unwrap_or(defaults.seed),
        };

        let request = Self {
            title: std::env::var("LEAP_MODEL_TITLE")
                .unwrap_or_else(|_| DEFAULT_MODEL_TITLE.to_string()),
            images,
            prompt: std::env::var("LEAP_PROMPT").unwrap_or_else(|_| DEFAULT_PROMPT.to_string()),
            options,
        };

        request.validate()?;
        Ok(request)
    }

    /// Validate the request.
    pub fn validate(&self) -> PipelineResult<()> {
        if self.title.trim().is_empty() {
            return Err(PipelineError::invalid_input("model title cannot be empty"));
        }

        if self.images.is_empty() {
            return Err(PipelineError::invalid_input(
                "at least one sample image URL is required (LEAP_SAMPLE_IMAGES)",
            ));
        }

        for image in &self.images {
            let url = Url::parse(image)
                .map_err(|e| PipelineError::invalid_input(format!("invalid sample image URL '{}': {}", image, e)))?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(PipelineError::invalid_input(format!(
                    "sample image URL '{}' must use http or https",
                    image
                )));
            }
        }

        if self.prompt.trim().is_empty() {
            return Err(PipelineError::invalid_input("prompt cannot be empty"));
        }

        self.options
            .validate()
            .map_err(|e| PipelineError::invalid_input(e.to_string()))?;

        Ok(())
    }

    /// True if the prompt refers to the trained subject.
    pub fn mentions_subject(&self) -> bool {
        self.prompt.contains(DEFAULT_SUBJECT_KEYWORD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 13] = [
        "LEAP_POLL_INTERVAL_SECS",
        "LEAP_TRAINING_MAX_POLLS",
        "LEAP_TRAINING_DEADLINE_SECS",
        "LEAP_INFERENCE_MAX_POLLS",
        "LEAP_INFERENCE_DEADLINE_SECS",
        "LEAP_SAMPLE_IMAGES",
        "LEAP_MODEL_TITLE",
        "LEAP_PROMPT",
        "LEAP_STEPS",
        "LEAP_WIDTH",
        "LEAP_HEIGHT",
        "LEAP_NUM_IMAGES",
        "LEAP_SEED",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_pipeline_config_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.training_poll.interval, Duration::from_secs(10));
        assert_eq!(config.training_poll.max_attempts, 180);
        assert_eq!(config.inference_poll.max_attempts, 60);
    }

    #[test]
    fn test_default_request_mentions_subject() {
        let request = PipelineRequest::new(vec!["https://img.test/1.jpg".to_string()]);
        assert!(request.mentions_subject());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        let request = PipelineRequest::new(vec!["not a url".to_string()]);
        assert!(matches!(request.validate(), Err(PipelineError::InvalidInput(_))));

        let request = PipelineRequest::new(vec!["ftp://img.test/1.jpg".to_string()]);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_images() {
        let request = PipelineRequest::new(Vec::new());
        assert!(matches!(request.validate(), Err(PipelineError::InvalidInput(_))));
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        clear_env();
        std::env::set_var("LEAP_POLL_INTERVAL_SECS", "2");
        std::env::set_var("LEAP_TRAINING_MAX_POLLS", "7");
        std::env::set_var("LEAP_INFERENCE_DEADLINE_SECS", "90");

        let config = PipelineConfig::from_env();
        assert_eq!(config.training_poll.interval, Duration::from_secs(2));
        assert_eq!(config.training_poll.max_attempts, 7);
        assert!(config.training_poll.deadline.is_none());
        assert_eq!(config.inference_poll.max_attempts, 60);
        assert_eq!(config.inference_poll.deadline, Some(Duration::from_secs(90)));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_config_handles_invalid_env_values() {
        clear_env();
        std::env::set_var("LEAP_POLL_INTERVAL_SECS", "soon");

        let config = PipelineConfig::from_env();
        assert_eq!(config.training_poll.interval, Duration::from_secs(10));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_request_from_env() {
        clear_env();
        std::env::set_var(
            "LEAP_SAMPLE_IMAGES",
            "https://img.test/1.jpg, https://img.test/2.jpg,,",
        );
        std::env::set_var("LEAP_SEED", "42");

        let request = PipelineRequest::from_env().unwrap();
        assert_eq!(request.images.len(), 2);
        assert_eq!(request.images[1], "https://img.test/2.jpg");
        assert_eq!(request.options.seed, 42);
        assert_eq!(request.options.steps, 50);
        assert_eq!(request.title, DEFAULT_MODEL_TITLE);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_request_from_env_requires_images() {
        clear_env();
        let result = PipelineRequest::from_env();
        assert!(matches!(result, Err(PipelineError::InvalidInput(_))));
    }

    #[test]
    #[serial]
    fn test_request_from_env_rejects_invalid_dimensions() {
        clear_env();
        std::env::set_var("LEAP_SAMPLE_IMAGES", "https://img.test/1.jpg");
        std::env::set_var("LEAP_WIDTH", "333");

        let result = PipelineRequest::from_env();
        assert!(matches!(result, Err(PipelineError::InvalidInput(_))));

        clear_env();
    }
}
