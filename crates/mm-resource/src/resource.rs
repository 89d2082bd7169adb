//! Opened resources and scoped local paths.

use std::fmt;
use std::io::Write;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{ResourceError, ResourceResult};

/// A named resource that can be read or exposed as a local file.
#[derive(Clone)]
pub struct Resource {
    name: String,
    source: Source,
}

#[derive(Clone)]
enum Source {
    File(PathBuf),
    Bytes(Arc<[u8]>),
}

impl Resource {
    /// A resource backed by an existing file on disk.
    pub fn from_file(name: impl Into<String>, path: PathBuf) -> Self {
        Self {
            name: name.into(),
            source: Source::File(path),
        }
    }

    /// A resource backed by an in-memory buffer.
    pub fn from_bytes(name: impl Into<String>, data: Arc<[u8]>) -> Self {
        Self {
            name: name.into(),
            source: Source::Bytes(data),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn read_bytes(&self) -> ResourceResult<Vec<u8>> {
        match &self.source {
            Source::File(path) => Ok(std::fs::read(path)?),
            Source::Bytes(data) => Ok(data.to_vec()),
        }
    }

    pub fn read_to_string(&self) -> ResourceResult<String> {
        String::from_utf8(self.read_bytes()?).map_err(|_| ResourceError::InvalidUtf8 {
            name: self.name.clone(),
        })
    }

    /// Expose the resource under a local filesystem path.
    ///
    /// File-backed resources hand out their own path. Buffer-backed resources
    /// are written to a temporary file that is removed when the returned
    /// guard is dropped, so the path must not be used past the guard.
    pub fn local_path(&self) -> ResourceResult<LocalPath> {
        match &self.source {
            Source::File(path) => Ok(LocalPath {
                inner: LocalPathInner::Borrowed(path.clone()),
            }),
            Source::Bytes(data) => {
                let suffix = Path::new(&self.name)
                    .extension()
                    .map(|ext| format!(".{}", ext.to_string_lossy()))
                    .unwrap_or_default();
                let mut file = tempfile::Builder::new()
                    .prefix("madmodel-")
                    .suffix(&suffix)
                    .tempfile()?;
                file.write_all(data)?;
                file.flush()?;
                let path = file.into_temp_path();
                tracing::trace!(resource = %self.name, path = %path.display(), "materialized resource");
                Ok(LocalPath {
                    inner: LocalPathInner::Temporary(path),
                })
            }
        }
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Source::File(path) => write!(f, "Resource({:?} at {})", self.name, path.display()),
            Source::Bytes(data) => write!(f, "Resource({:?}, {} bytes)", self.name, data.len()),
        }
    }
}

/// Scoped local path for a [`Resource`].
///
/// Temporary files behind the path are deleted when this guard drops.
pub struct LocalPath {
    inner: LocalPathInner,
}

enum LocalPathInner {
    Borrowed(PathBuf),
    Temporary(tempfile::TempPath),
}

impl LocalPath {
    pub fn path(&self) -> &Path {
        match &self.inner {
            LocalPathInner::Borrowed(path) => path.as_path(),
            LocalPathInner::Temporary(path) => &**path,
        }
    }

    /// Whether the path points at a temporary copy.
    pub fn is_temporary(&self) -> bool {
        matches!(self.inner, LocalPathInner::Temporary(_))
    }
}

impl Deref for LocalPath {
    type Target = Path;

    fn deref(&self) -> &Path {
        self.path()
    }
}

impl AsRef<Path> for LocalPath {
    fn as_ref(&self) -> &Path {
        self.path()
    }
}

impl fmt::Debug for LocalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LocalPath").field(&self.path()).finish()
    }
}
