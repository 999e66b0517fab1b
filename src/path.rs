use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{DirlinError, Result};

/// A path known to point at an existing directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderPath(PathBuf);

impl FolderPath {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_dir() {
            return Err(DirlinError::NotADirectory(path));
        }
        Ok(Self(path))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.0.join(name)
    }

    /// Whether `name` exists inside this folder
    pub fn contains(&self, name: impl AsRef<Path>) -> bool {
        self.0.join(name).exists()
    }

    /// Use `path` as-is when it exists, otherwise treat it as relative to this folder
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() || path.exists() {
            path.to_path_buf()
        } else {
            self.0.join(path)
        }
    }
}

impl AsRef<Path> for FolderPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for FolderPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}
