//! Error types for definition lookup and expansion.

use crate::linearize::LinearizeError;
use crate::validate::ValidationError;

#[derive(thiserror::Error, Debug)]
pub enum LocatorError {
    #[error("Model not found: {name}")]
    NotFound { name: String },

    #[error("Cannot linearize bases of {name}: {source}")]
    Linearization {
        name: String,
        source: LinearizeError,
    },

    #[error("Invalid definition {name}: {source}")]
    Definition {
        name: String,
        source: ValidationError,
    },

    #[error("Malformed definition {name}: {source}")]
    Malformed {
        name: String,
        source: serde_yaml::Error,
    },

    #[error("Malformed document {document}: {source}")]
    Document {
        document: String,
        source: mm_core::CoreError,
    },

    #[error("Resource error: {0}")]
    Resource(#[from] mm_resource::ResourceError),
}

impl LocatorError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LocatorError::NotFound { .. })
    }
}
