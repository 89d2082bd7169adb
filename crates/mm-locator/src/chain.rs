use mm_resource::ResourceProvider;

use crate::LocatorResult;
use crate::error::LocatorError;
use crate::locator::ModelLocator;
use crate::schema::ModelDefinition;

/// Tries several locators in order.
#[derive(Default)]
pub struct ChainLocator {
    locators: Vec<Box<dyn ModelLocator>>,
}

impl ChainLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, locator: Box<dyn ModelLocator>) {
        self.locators.push(locator);
    }

    pub fn with(mut self, locator: Box<dyn ModelLocator>) -> Self {
        self.push(locator);
        self
    }

    fn owner_of(&self, name: &str) -> LocatorResult<(&dyn ModelLocator, ModelDefinition)> {
        for locator in &self.locators {
            match locator.definition(name) {
                Ok(definition) => return Ok((locator.as_ref(), definition)),
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(e),
            }
        }
        Err(LocatorError::NotFound {
            name: name.to_string(),
        })
    }
}

impl ModelLocator for ChainLocator {
    fn list_names(&self) -> LocatorResult<Vec<String>> {
        let mut names = Vec::new();
        for locator in &self.locators {
            names.extend(locator.list_names()?);
        }
        Ok(names)
    }

    fn definition(&self, name: &str) -> LocatorResult<ModelDefinition> {
        self.owner_of(name).map(|(_, definition)| definition)
    }

    fn repository_for(
        &self,
        definition: &ModelDefinition,
    ) -> LocatorResult<Box<dyn ResourceProvider>> {
        let (owner, _) = self.owner_of(&definition.name)?;
        owner.repository_for(definition)
    }

    fn resource_for(
        &self,
        definition: &ModelDefinition,
    ) -> LocatorResult<Box<dyn ResourceProvider>> {
        let (owner, _) = self.owner_of(&definition.name)?;
        owner.resource_for(definition)
    }
}
