//! Filesystem storage backend
//!
//! Persists each storage key as one file under a base directory. Used by
//! desktop/native hosts where the wizard state must survive process
//! restarts without a browser storage layer.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{StorageBackend, StorageError};

/// Filesystem-backed key/value store (one file per key).
#[derive(Clone)]
pub struct FileSystemStorageBackend {
    base_path: PathBuf,
}

impl FileSystemStorageBackend {
    /// Create a backend rooted at `base_path`. The directory is created on
    /// first write.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        // Storage keys are flat identifiers; strip path separators so a key
        // can never escape the base directory.
        let safe: String = key
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' => '_',
                _ => c,
            })
            .collect();
        self.base_path.join(safe)
    }
}

#[async_trait]
impl StorageBackend for FileSystemStorageBackend {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match tokio::fs::read(self.key_path(key)).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadError(format!(
                "Failed to read key '{}': {}",
                key, e
            ))),
        }
    }

    async fn write(&self, key: &str, data: &[u8]) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| StorageError::WriteError(format!("Failed to create base dir: {}", e)))?;
        tokio::fs::write(self.key_path(key), data)
            .await
            .map_err(|e| {
                StorageError::WriteError(format!("Failed to write key '{}': {}", key, e))
            })
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.key_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::WriteError(format!(
                "Failed to remove key '{}': {}",
                key, e
            ))),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        match tokio::fs::metadata(self.key_path(key)).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::ReadError(format!(
                "Failed to stat key '{}': {}",
                key, e
            ))),
        }
    }
}
