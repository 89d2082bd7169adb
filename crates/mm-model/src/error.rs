//! Error types for the model layer.

use mm_engine::EngineError;
use mm_locator::LocatorError;
use mm_resource::ResourceError;

#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    #[error("No {what} named {name}")]
    NotFound { what: &'static str, name: String },

    #[error("Range {range} has no initial conditions named {name}")]
    MissingInitialConditions { range: String, name: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Locator error: {0}")]
    Locator(#[from] LocatorError),

    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),
}

impl ModelError {
    pub(crate) fn not_found(what: &'static str, name: &str) -> Self {
        ModelError::NotFound {
            what,
            name: name.to_string(),
        }
    }
}

pub type ModelResult<T> = Result<T, ModelError>;
