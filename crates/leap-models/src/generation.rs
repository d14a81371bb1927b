//! Image generation parameters.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum diffusion steps accepted for a single inference.
pub const MAX_STEPS: u32 = 100;
/// Smallest output edge in pixels.
pub const MIN_DIMENSION: u32 = 128;
/// Largest output edge in pixels.
pub const MAX_DIMENSION: u32 = 1024;
/// Maximum images per inference request.
pub const MAX_IMAGES: u32 = 20;

/// Why a set of generation options was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationOptionsError {
    #[error("steps must be between 1 and 100, got {0}")]
    Steps(u32),

    #[error("{0} must be between 128 and 1024 and a multiple of 64, got {1}")]
    Dimension(&'static str, u32),

    #[error("number of images must be between 1 and 20, got {0}")]
    ImageCount(u32),
}

/// Fixed generation parameters sent with an inference request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    pub steps: u32,
    pub width: u32,
    pub height: u32,
    pub number_of_images: u32,
    /// Fixed seed so repeated runs give comparable output
    pub seed: u64,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            steps: 50,
            width: 512,
            height: 512,
            number_of_images: 1,
            seed: 4523184,
        }
    }
}

impl GenerationOptions {
    /// Validate the options.
    pub fn validate(&self) -> Result<(), GenerationOptionsError> {
        if self.steps == 0 || self.steps > MAX_STEPS {
            return Err(GenerationOptionsError::Steps(self.steps));
        }

        for (name, value) in [("width", self.width), ("height", self.height)] {
            if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&value) || value % 64 != 0 {
                return Err(GenerationOptionsError::Dimension(name, value));
            }
        }

        if self.number_of_images == 0 || self.number_of_images > MAX_IMAGES {
            return Err(GenerationOptionsError::ImageCount(self.number_of_images));
        }

        Ok(())
    }
}
