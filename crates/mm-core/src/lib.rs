//! mm-core: shared foundation for madmodel.
//!
//! Contains:
//! - error (shared error types)
//! - value (YAML mapping accessors used by every definition consumer)
//! - merge (recursive mapping merge used by definition expansion)

pub mod error;
pub mod merge;
pub mod value;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use merge::{deep_merge, merged};
pub use value::*;
