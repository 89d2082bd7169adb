//! Locating model definitions in a resource namespace.

use std::collections::HashMap;
use std::path::PathBuf;

use indexmap::IndexMap;
use mm_core::Mapping;
use mm_resource::{FileResource, ResourceProvider};

use crate::LocatorResult;
use crate::error::LocatorError;
use crate::linearize::{LinearizeError, linearize};
use crate::schema::ModelDefinition;
use crate::validate::validate_model;

/// Environment variable holding extra override roots (platform path list).
pub const DBDIRS_ENV: &str = "MADMODEL_DBDIRS";

/// Finds model definitions and the providers holding their files.
pub trait ModelLocator {
    /// Names of all instantiable models.
    fn list_names(&self) -> LocatorResult<Vec<String>>;

    /// Fully expanded, validated definition of a model.
    fn definition(&self, name: &str) -> LocatorResult<ModelDefinition>;

    /// Resource provider rooted at the model's engine input files.
    fn repository_for(
        &self,
        definition: &ModelDefinition,
    ) -> LocatorResult<Box<dyn ResourceProvider>>;

    /// Resource provider rooted at the model's auxiliary data
    /// (`path-offsets.resource-offset`).
    fn resource_for(
        &self,
        definition: &ModelDefinition,
    ) -> LocatorResult<Box<dyn ResourceProvider>>;
}

#[derive(Clone, Debug)]
pub struct LocatorConfig {
    /// Suffix of definition documents.
    pub extension: String,
    /// Sub-namespace below which `repository-offset` is resolved.
    pub repository_root: String,
    /// Sub-namespace below which `resource-offset` is resolved.
    pub resource_root: String,
    /// Filesystem roots tried after a definition's own `dbdirs`.
    pub override_roots: Vec<PathBuf>,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            extension: ".cpymad.yml".to_string(),
            repository_root: "repdata".to_string(),
            resource_root: "resdata".to_string(),
            override_roots: Vec::new(),
        }
    }
}

impl LocatorConfig {
    /// Defaults plus override roots from `MADMODEL_DBDIRS`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(paths) = std::env::var_os(DBDIRS_ENV) {
            config.override_roots = std::env::split_paths(&paths).collect();
        }
        config
    }
}

/// Locator for namespaces whose documents each hold several model entries.
pub struct Locator {
    provider: Box<dyn ResourceProvider>,
    config: LocatorConfig,
}

/// A model entry and the document declaring it.
struct Entry {
    document: String,
    data: Mapping,
}

impl Entry {
    fn bases(&self) -> LocatorResult<Vec<String>> {
        mm_core::get_str_list(&self.data, "extends").map_err(|source| LocatorError::Document {
            document: self.document.clone(),
            source,
        })
    }
}

/// Everything one scan of the namespace found.
struct Scan {
    /// First `real` entry with the requested name.
    candidate: Option<Entry>,
    /// Every entry by name; the first declaration wins.
    entries: IndexMap<String, Entry>,
}

impl Locator {
    pub fn new(provider: Box<dyn ResourceProvider>) -> Self {
        Self::with_config(provider, LocatorConfig::default())
    }

    pub fn with_config(provider: Box<dyn ResourceProvider>, config: LocatorConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Every entry of every definition document, in scan order.
    fn entries(&self) -> LocatorResult<Vec<(String, Entry)>> {
        let mut entries = Vec::new();
        for document in self.provider.list(&self.config.extension)? {
            let doc = self.provider.read_structured(&document)?;
            for (name, value) in mm_core::string_entries(&doc) {
                let data = mm_core::as_mapping(value, name).map_err(|source| {
                    LocatorError::Document {
                        document: document.clone(),
                        source,
                    }
                })?;
                let entry = Entry {
                    document: document.clone(),
                    data: data.clone(),
                };
                entries.push((name.to_string(), entry));
            }
        }
        Ok(entries)
    }

    fn scan(&self, wanted: &str) -> LocatorResult<Scan> {
        let mut scan = Scan {
            candidate: None,
            entries: IndexMap::new(),
        };

        for (name, entry) in self.entries()? {
            if name == wanted && scan.candidate.is_none() && mm_core::get_flag(&entry.data, "real")
            {
                tracing::debug!(model = %name, document = %entry.document, "found model definition");
                scan.candidate = Some(Entry {
                    document: entry.document.clone(),
                    data: entry.data.clone(),
                });
            }
            if scan.entries.contains_key(&name) {
                tracing::warn!(model = %name, document = %entry.document, "duplicate model definition ignored");
                continue;
            }
            scan.entries.insert(name, entry);
        }

        Ok(scan)
    }

    /// Expand a model: linearize its `extends` graph and deep-merge every
    /// entry from the most basic to the model itself.
    pub fn resolve(&self, name: &str) -> LocatorResult<Mapping> {
        let scan = self.scan(name)?;
        let Some(candidate) = scan.candidate else {
            return Err(LocatorError::NotFound {
                name: name.to_string(),
            });
        };

        let entry_of = |model: &str| {
            if model == name {
                Some(&candidate)
            } else {
                scan.entries.get(model)
            }
        };

        // Bases of every entry reachable from the model. A malformed
        // `extends` anywhere on the way fails the lookup.
        let mut graph: HashMap<String, Vec<String>> = HashMap::new();
        let mut pending = vec![name.to_string()];
        while let Some(model) = pending.pop() {
            if graph.contains_key(&model) {
                continue;
            }
            let Some(entry) = entry_of(model.as_str()) else {
                continue;
            };
            let bases = entry.bases()?;
            pending.extend(bases.iter().cloned());
            graph.insert(model, bases);
        }

        let order = linearize(name, |model| graph.get(model).cloned()).map_err(|e| match e {
            LinearizeError::UnknownBase { base, by } => {
                tracing::debug!(model = name, %base, %by, "missing base definition");
                LocatorError::NotFound { name: base }
            }
            source => LocatorError::Linearization {
                name: name.to_string(),
                source,
            },
        })?;
        tracing::debug!(model = name, order = ?order, "linearized model bases");

        let layers: Vec<&Mapping> = order
            .iter()
            .filter_map(|m| entry_of(m.as_str()))
            .map(|entry| &entry.data)
            .rev()
            .collect();
        Ok(mm_core::merged(layers))
    }

    /// The first existing directory among the definition's `dbdirs` and the
    /// configured override roots.
    fn override_root(&self, definition: &ModelDefinition) -> Option<PathBuf> {
        definition
            .model
            .dbdirs
            .iter()
            .chain(self.config.override_roots.iter())
            .find(|dir| dir.is_dir())
            .cloned()
    }
}

impl ModelLocator for Locator {
    fn list_names(&self) -> LocatorResult<Vec<String>> {
        Ok(self
            .entries()?
            .into_iter()
            .filter(|(_, entry)| mm_core::get_flag(&entry.data, "real"))
            .map(|(name, _)| name)
            .collect())
    }

    fn definition(&self, name: &str) -> LocatorResult<ModelDefinition> {
        let expanded = ModelDefinition::from_expanded(name, self.resolve(name)?)?;
        validate_model(&expanded.model).map_err(|source| LocatorError::Definition {
            name: name.to_string(),
            source,
        })?;
        Ok(expanded)
    }

    fn repository_for(
        &self,
        definition: &ModelDefinition,
    ) -> LocatorResult<Box<dyn ResourceProvider>> {
        let offset = definition.repository_offset();
        if let Some(root) = self.override_root(definition) {
            tracing::debug!(model = %definition.name, root = %root.display(), "using override repository");
            return Ok(FileResource::new(root).child(offset)?);
        }
        let repository = self
            .provider
            .child(&self.config.repository_root)?
            .child(offset)?;
        tracing::debug!(model = %definition.name, repository = %repository.describe(), "resolved repository");
        Ok(repository)
    }

    fn resource_for(
        &self,
        definition: &ModelDefinition,
    ) -> LocatorResult<Box<dyn ResourceProvider>> {
        Ok(self
            .provider
            .child(&self.config.resource_root)?
            .child(definition.resource_offset())?)
    }
}
