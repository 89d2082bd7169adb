use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Expected a mapping for {what}")]
    NotAMapping { what: String },

    #[error("Expected a string for {what}")]
    NotAString { what: String },
}
