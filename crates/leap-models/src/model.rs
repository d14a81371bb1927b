//! Fine-tunable models.

use serde::{Deserialize, Serialize};

use crate::ids::ModelId;

/// Subject keyword used in prompts to refer to the uploaded reference images.
pub const DEFAULT_SUBJECT_KEYWORD: &str = "@me";

/// A remote model. Immutable once created, apart from its version history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub id: ModelId,
    pub title: String,
    pub subject_keyword: String,
}
