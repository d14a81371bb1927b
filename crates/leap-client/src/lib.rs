//! HTTP client for the Leap image fine-tuning API.
//!
//! This crate provides:
//! - One typed call per remote endpoint (models, samples, training, inference)
//! - Bearer-token configuration loaded from the environment
//! - Status-aware error mapping; failures are always returned, never swallowed

pub mod api;
pub mod client;
pub mod error;
pub mod types;


pub use api::LeapApi;
pub use client::{LeapClient, LeapClientConfig, DEFAULT_BASE_URL};
pub use error::{LeapError, LeapResult};
