//! Fine-tune and generate pipeline for the Leap image API.
//!
//! This crate provides:
//! - A bounded, cancellable wait-until-complete loop for remote jobs
//! - The stage-by-stage orchestration from model creation to image URI
//! - Environment-driven configuration
//! - Stage-labelled errors and structured logging

pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod poll;

pub use config::{PipelineConfig, PipelineRequest};
pub use error::{PipelineError, PipelineResult, Stage};
pub use logging::StageLogger;
pub use pipeline::{Pipeline, PipelineOutput};
pub use poll::{wait_until_complete, PollConfig, PollError, RetryableError};
