//! mm-resource: resource namespaces that model definitions and their data
//! files are read from.
//!
//! A [`ResourceProvider`] lists and opens named resources below some root.
//! Two backends are provided: [`FileResource`] for directories on disk and
//! [`MemoryResource`] for in-process fixtures. Handing a resource to an
//! external tool goes through [`Resource::local_path`], whose guard keeps the
//! path valid only while it is alive.

pub mod file;
pub mod memory;
pub mod provider;
pub mod resource;

pub use file::FileResource;
pub use memory::MemoryResource;
pub use provider::ResourceProvider;
pub use resource::{LocalPath, Resource};

pub type ResourceResult<T> = Result<T, ResourceError>;

#[derive(thiserror::Error, Debug)]
pub enum ResourceError {
    #[error("Resource not found: {name}")]
    NotFound { name: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse {name}: {source}")]
    Yaml {
        name: String,
        source: serde_yaml::Error,
    },

    #[error("Resource {name} is not valid UTF-8")]
    InvalidUtf8 { name: String },

    #[error("Resource {name} does not contain a mapping at top level")]
    NotAMapping { name: String },
}
