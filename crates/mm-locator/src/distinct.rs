//! Namespaces holding one model per document.

use mm_core::{Mapping, Value};
use mm_resource::{ResourceError, ResourceProvider};

use crate::LocatorResult;
use crate::error::LocatorError;
use crate::locator::{LocatorConfig, ModelLocator};
use crate::schema::ModelDefinition;
use crate::validate::{ValidationError, validate_model};

/// Locator for namespaces where each model has its own document.
///
/// `<name><extension>` holds the definition itself, without a name key and
/// without `extends`. Every such document is instantiable. Its path offsets
/// are resolved below the sub-namespace `<name>`.
pub struct DistinctLocator {
    provider: Box<dyn ResourceProvider>,
    extension: String,
}

impl DistinctLocator {
    pub fn new(provider: Box<dyn ResourceProvider>) -> Self {
        Self::with_config(provider, &LocatorConfig::default())
    }

    pub fn with_config(provider: Box<dyn ResourceProvider>, config: &LocatorConfig) -> Self {
        Self {
            provider,
            extension: config.extension.clone(),
        }
    }

    fn document(&self, name: &str) -> LocatorResult<Mapping> {
        match self.provider.read_structured(&format!("{name}{}", self.extension)) {
            Ok(doc) => Ok(doc),
            Err(ResourceError::NotFound { .. }) => Err(LocatorError::NotFound {
                name: name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn model_root(&self, name: &str) -> LocatorResult<Box<dyn ResourceProvider>> {
        Ok(self.provider.child(name)?)
    }
}

impl ModelLocator for DistinctLocator {
    fn list_names(&self) -> LocatorResult<Vec<String>> {
        Ok(self
            .provider
            .list(&self.extension)?
            .into_iter()
            .filter_map(|doc| doc.strip_suffix(self.extension.as_str()).map(str::to_string))
            .filter(|name| !name.is_empty())
            .collect())
    }

    fn definition(&self, name: &str) -> LocatorResult<ModelDefinition> {
        let mut data = self.document(name)?;
        let invalid = |source| LocatorError::Definition {
            name: name.to_string(),
            source,
        };
        if !mm_core::get_str_list(&data, "extends").is_ok_and(|bases| bases.is_empty()) {
            return Err(invalid(ValidationError::Unsupported {
                key: "extends".to_string(),
            }));
        }
        if mm_core::get(&data, "real").is_none() {
            data.insert(mm_core::key("real"), Value::Bool(true));
        }

        let definition = ModelDefinition::from_expanded(name, data)?;
        validate_model(&definition.model).map_err(invalid)?;
        tracing::debug!(model = name, "found single-model definition");
        Ok(definition)
    }

    fn repository_for(
        &self,
        definition: &ModelDefinition,
    ) -> LocatorResult<Box<dyn ResourceProvider>> {
        Ok(self
            .model_root(&definition.name)?
            .child(definition.repository_offset())?)
    }

    fn resource_for(
        &self,
        definition: &ModelDefinition,
    ) -> LocatorResult<Box<dyn ResourceProvider>> {
        Ok(self
            .model_root(&definition.name)?
            .child(definition.resource_offset())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mm_resource::MemoryResource;

    fn namespace() -> MemoryResource {
        MemoryResource::new()
            .with(
                "psb.cpymad.yml",
                "path-offsets: {repository-offset: repo, resource-offset: res}\ninit-files: [psb.seq]\n",
            )
            .with("psb/repo/psb.seq", "! psb\n")
            .with("psb/res/aperture.tfs", "@ aperture\n")
            .with("derived.cpymad.yml", "extends: [psb]\n")
    }

    #[test]
    fn each_document_is_one_model() {
        let locator = DistinctLocator::new(Box::new(namespace()));
        assert_eq!(locator.list_names().unwrap(), vec!["derived", "psb"]);

        let def = locator.definition("psb").unwrap();
        assert!(def.model.real);
        assert_eq!(def.model.init_files, vec!["psb.seq"]);
    }

    #[test]
    fn offsets_resolve_below_the_model() {
        let locator = DistinctLocator::new(Box::new(namespace()));
        let def = locator.definition("psb").unwrap();
        let repository = locator.repository_for(&def).unwrap();
        assert_eq!(repository.describe(), "memory:/psb/repo");
        assert!(repository.get("psb.seq").is_ok());
        let resources = locator.resource_for(&def).unwrap();
        assert!(resources.get("aperture.tfs").is_ok());
    }

    #[test]
    fn extends_and_missing_models_are_rejected() {
        let locator = DistinctLocator::new(Box::new(namespace()));
        assert!(matches!(
            locator.definition("derived"),
            Err(LocatorError::Definition {
                source: ValidationError::Unsupported { .. },
                ..
            })
        ));
        assert!(locator.definition("sps").unwrap_err().is_not_found());
    }
}
