//! Shared data models for the Leap fine-tune pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Remote identifiers (models, versions, inferences)
//! - Training and inference job snapshots
//! - Generation parameters
//! - The job phase abstraction used by the poller

pub mod generation;
pub mod ids;
pub mod inference;
pub mod model;
pub mod phase;
pub mod training;

pub use generation::{GenerationOptions, GenerationOptionsError};
pub use ids::{InferenceId, ModelId, VersionId};
pub use inference::{InferenceJob, InferenceState};
pub use model::{Model, DEFAULT_SUBJECT_KEYWORD};
pub use phase::{JobPhase, Pollable};
pub use training::{ModelVersion, TrainingStatus};
