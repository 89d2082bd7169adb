//! Error types for engine operations.

use thiserror::Error;

/// Errors raised by a simulation engine.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Engine rejected `{command}`: {message}")]
    Command { command: String, message: String },

    #[error("Command log error: {0}")]
    Log(#[source] std::io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
