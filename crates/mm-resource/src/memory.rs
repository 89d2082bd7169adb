//! In-memory resource provider.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::provider::{ResourceProvider, join_offset};
use crate::resource::Resource;
use crate::{ResourceError, ResourceResult};

/// Resources held in memory under `/`-separated names.
///
/// Children share the same storage and only narrow the visible prefix.
#[derive(Clone, Debug, Default)]
pub struct MemoryResource {
    entries: Arc<BTreeMap<String, Arc<[u8]>>>,
    prefix: String,
}

impl MemoryResource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a resource. Builder style.
    pub fn with(mut self, name: &str, content: impl AsRef<[u8]>) -> Self {
        self.insert(name, content);
        self
    }

    /// Add (or replace) a resource relative to this provider's prefix.
    pub fn insert(&mut self, name: &str, content: impl AsRef<[u8]>) {
        let full = join_offset(&self.prefix, name);
        Arc::make_mut(&mut self.entries).insert(full, Arc::from(content.as_ref()));
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl ResourceProvider for MemoryResource {
    fn list(&self, extension: &str) -> ResourceResult<Vec<String>> {
        let dir = if self.prefix.is_empty() {
            String::new()
        } else {
            format!("{}/", self.prefix)
        };
        Ok(self
            .entries
            .keys()
            .filter_map(|full| full.strip_prefix(&dir))
            .filter(|rest| !rest.contains('/') && rest.ends_with(extension))
            .map(str::to_string)
            .collect())
    }

    fn get(&self, name: &str) -> ResourceResult<Resource> {
        let full = join_offset(&self.prefix, name);
        self.entries
            .get(&full)
            .map(|data| Resource::from_bytes(name, data.clone()))
            .ok_or(ResourceError::NotFound { name: full })
    }

    fn child(&self, offset: &str) -> ResourceResult<Box<dyn ResourceProvider>> {
        Ok(Box::new(MemoryResource {
            entries: self.entries.clone(),
            prefix: join_offset(&self.prefix, offset),
        }))
    }

    fn describe(&self) -> String {
        format!("memory:/{}", self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> MemoryResource {
        MemoryResource::new()
            .with("lhc.cpymad.yml", "LHC: {real: true}\n")
            .with("notes.txt", "ignored")
            .with("repdata/lhc/base.seq", "! base\n")
            .with("repdata/lhc/nested/deep.cpymad.yml", "X: {}\n")
    }

    #[test]
    fn list_filters_by_extension_and_depth() {
        let res = fixture();
        assert_eq!(res.list(".cpymad.yml").unwrap(), vec!["lhc.cpymad.yml"]);
        let repo = res.child("repdata/lhc").unwrap();
        assert!(repo.list(".cpymad.yml").unwrap().is_empty());
        assert_eq!(repo.list(".seq").unwrap(), vec!["base.seq"]);
    }

    #[test]
    fn child_resolves_relative_names() {
        let repo = fixture().child("repdata").unwrap().child("lhc").unwrap();
        let res = repo.get("base.seq").unwrap();
        assert_eq!(res.name(), "base.seq");
        assert_eq!(res.read_to_string().unwrap(), "! base\n");
        assert!(matches!(
            repo.get("missing.seq"),
            Err(ResourceError::NotFound { name }) if name == "repdata/lhc/missing.seq"
        ));
    }

    #[test]
    fn structured_documents_parse() {
        let doc = fixture().read_structured("lhc.cpymad.yml").unwrap();
        assert!(mm_core::get_flag(
            mm_core::as_mapping(mm_core::get(&doc, "LHC").unwrap(), "LHC").unwrap(),
            "real"
        ));
    }

    #[test]
    fn non_mapping_documents_are_rejected() {
        let res = MemoryResource::new().with("list.cpymad.yml", "- a\n- b\n");
        assert!(matches!(
            res.read_structured("list.cpymad.yml"),
            Err(ResourceError::NotAMapping { .. })
        ));
    }
}
