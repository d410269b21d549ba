//! Artifact stores for reading and writing payloads and metadata documents

use crate::error::{OccupancyError, Result};
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Trait for I/O operations on artifacts addressed by path
///
/// Writes are independent: storing two related artifacts is two separate
/// operations, and a failure in the second leaves the first in place.
pub trait ArtifactStore: Send + Sync {
    /// Read data from a path
    fn read(&self, path: &Path) -> Result<Bytes>;

    /// Write data to a path, replacing any existing artifact
    fn write(&self, path: &Path, data: &[u8]) -> Result<()>;

    /// Check if a path exists
    fn exists(&self, path: &Path) -> Result<bool>;

    /// Get the size of data at a path
    fn size(&self, path: &Path) -> Result<usize>;
}

/// File system artifact store
#[derive(Debug, Clone, Default)]
pub struct FileSystemStore {
    base_path: PathBuf,
}

impl FileSystemStore {
    /// Create a store rooted at `base_path`. Absolute artifact paths ignore
    /// the base.
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Get the full path for a relative path
    fn full_path(&self, path: &Path) -> PathBuf {
        self.base_path.join(path)
    }
}

impl ArtifactStore for FileSystemStore {
    fn read(&self, path: &Path) -> Result<Bytes> {
        let full_path = self.full_path(path);
        let data = fs::read(&full_path).map_err(|e| not_found_or_io(e, &full_path))?;
        Ok(Bytes::from(data))
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let full_path = self.full_path(path);

        // Create parent directories if they don't exist
        if let Some(parent) = full_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(&full_path, data)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        Ok(self.full_path(path).exists())
    }

    fn size(&self, path: &Path) -> Result<usize> {
        let full_path = self.full_path(path);
        let metadata = fs::metadata(&full_path).map_err(|e| not_found_or_io(e, &full_path))?;
        Ok(metadata.len() as usize)
    }
}

fn not_found_or_io(err: std::io::Error, path: &Path) -> OccupancyError {
    if err.kind() == std::io::ErrorKind::NotFound {
        OccupancyError::NotFound(path.display().to_string())
    } else {
        OccupancyError::Io(err)
    }
}

/// In-process artifact store
#[derive(Debug, Default)]
pub struct MemoryStore {
    artifacts: RwLock<HashMap<PathBuf, Bytes>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an artifact directly
    pub fn insert(&self, path: impl Into<PathBuf>, data: impl Into<Bytes>) {
        self.artifacts.write().insert(path.into(), data.into());
    }

    /// Remove an artifact, returning its contents
    pub fn remove(&self, path: &Path) -> Option<Bytes> {
        self.artifacts.write().remove(path)
    }

    /// Paths of all stored artifacts, sorted
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<_> = self.artifacts.read().keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl ArtifactStore for MemoryStore {
    fn read(&self, path: &Path) -> Result<Bytes> {
        self.artifacts
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| OccupancyError::NotFound(path.display().to_string()))
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        self.insert(path, Bytes::copy_from_slice(data));
        Ok(())
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        Ok(self.artifacts.read().contains_key(path))
    }

    fn size(&self, path: &Path) -> Result<usize> {
        Ok(self.read(path)?.len())
    }
}
