//! Filesystem-backed resource provider.

use std::fs;
use std::path::{Path, PathBuf};

use crate::provider::ResourceProvider;
use crate::resource::Resource;
use crate::{ResourceError, ResourceResult};

/// Resources stored as files below a root directory.
#[derive(Clone, Debug)]
pub struct FileResource {
    root: PathBuf,
}

impl FileResource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> PathBuf {
        name.split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |path, part| path.join(part))
    }
}

impl ResourceProvider for FileResource {
    fn list(&self, extension: &str) -> ResourceResult<Vec<String>> {
        let mut names = Vec::new();

        if !self.root.is_dir() {
            return Ok(names);
        }

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.path().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name.ends_with(extension) {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }

    fn get(&self, name: &str) -> ResourceResult<Resource> {
        let path = self.resolve(name);
        if !path.is_file() {
            return Err(ResourceError::NotFound {
                name: path.display().to_string(),
            });
        }
        Ok(Resource::from_file(name, path))
    }

    fn child(&self, offset: &str) -> ResourceResult<Box<dyn ResourceProvider>> {
        Ok(Box::new(FileResource::new(self.resolve(offset))))
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}
