//! mm-locator: model definition lookup and expansion.
//!
//! Definition documents (`*.cpymad.yml`) each map several model names to
//! entries. A model may `extend` other entries, possibly declared in other
//! documents; the [`Locator`] linearizes that graph (C3) and deep-merges the
//! entries into one self-contained [`ModelDefinition`]. [`DistinctLocator`]
//! serves namespaces with one model per document, and [`ChainLocator`]
//! combines locators of either kind.

pub mod chain;
pub mod distinct;
pub mod error;
pub mod linearize;
pub mod locator;
pub mod schema;
pub mod validate;

pub use chain::ChainLocator;
pub use distinct::DistinctLocator;
pub use error::LocatorError;
pub use linearize::{LinearizeError, linearize};
pub use locator::{DBDIRS_ENV, Locator, LocatorConfig, ModelLocator};
pub use schema::*;
pub use validate::{ValidationError, validate_model};

pub type LocatorResult<T> = Result<T, LocatorError>;
