//! Resource provider trait.

use mm_core::Mapping;

use crate::resource::Resource;
use crate::{ResourceError, ResourceResult};

/// Abstract resource namespace.
///
/// Implementations resolve logical names (relative, `/`-separated) to
/// readable [`Resource`]s and can be narrowed to a sub-namespace with
/// [`child`](ResourceProvider::child).
pub trait ResourceProvider {
    /// Names of the resources directly below this namespace whose name ends
    /// with `extension`, sorted.
    fn list(&self, extension: &str) -> ResourceResult<Vec<String>>;

    /// Open a resource by name.
    fn get(&self, name: &str) -> ResourceResult<Resource>;

    /// A provider rooted at `offset` below this one.
    fn child(&self, offset: &str) -> ResourceResult<Box<dyn ResourceProvider>>;

    /// Human-readable location, used in log output.
    fn describe(&self) -> String;

    /// Parse a YAML (or JSON) document whose top level is a mapping.
    fn read_structured(&self, name: &str) -> ResourceResult<Mapping> {
        let text = self.get(name)?.read_to_string()?;
        let value: serde_yaml::Value =
            serde_yaml::from_str(&text).map_err(|source| ResourceError::Yaml {
                name: name.to_string(),
                source,
            })?;
        match value {
            serde_yaml::Value::Mapping(map) => Ok(map),
            serde_yaml::Value::Null => Ok(Mapping::new()),
            _ => Err(ResourceError::NotAMapping {
                name: name.to_string(),
            }),
        }
    }
}

/// Join a sub-path onto a `/`-separated prefix.
pub(crate) fn join_offset(prefix: &str, offset: &str) -> String {
    let offset = offset.trim_matches('/');
    match (prefix.is_empty(), offset.is_empty()) {
        (_, true) => prefix.to_string(),
        (true, false) => offset.to_string(),
        (false, false) => format!("{}/{}", prefix.trim_end_matches('/'), offset),
    }
}
