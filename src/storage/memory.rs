//! In-memory storage backend
//!
//! Backs the manager with a plain map. Clones share the underlying map, so
//! two managers constructed over clones of one backend model two browsing
//! contexts over the same local storage.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{StorageBackend, StorageError};

/// In-memory key/value backend with an optional byte quota.
#[derive(Clone, Default)]
pub struct MemoryStorageBackend {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    quota_bytes: Option<u64>,
}

impl MemoryStorageBackend {
    /// Create an unbounded in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that rejects writes once the total stored bytes
    /// would exceed `quota_bytes`, mirroring a browser storage quota.
    pub fn with_quota(quota_bytes: u64) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            quota_bytes: Some(quota_bytes),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>, StorageError> {
        self.entries
            .lock()
            .map_err(|e| StorageError::ReadError(format!("Poisoned storage lock: {}", e)))
    }
}

#[async_trait]
impl StorageBackend for MemoryStorageBackend {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn write(&self, key: &str, data: &[u8]) -> Result<(), StorageError> {
        let mut entries = self.lock()?;
        if let Some(quota) = self.quota_bytes {
            let other_bytes: u64 = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len() as u64)
                .sum();
            if other_bytes + data.len() as u64 > quota {
                return Err(StorageError::QuotaExceeded(format!(
                    "{} bytes requested, {} byte quota",
                    other_bytes + data.len() as u64,
                    quota
                )));
            }
        }
        entries.insert(key.to_string(), data.to_vec());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.lock()?.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
    }

    #[test]
    fn test_read_write_roundtrip() {
        runtime().block_on(async {
            let backend = MemoryStorageBackend::new();
            assert!(backend.read("drafts").await.unwrap().is_none());

            backend.write("drafts", b"payload").await.unwrap();
            assert_eq!(backend.read("drafts").await.unwrap().unwrap(), b"payload");
            assert!(backend.exists("drafts").await.unwrap());

            backend.remove("drafts").await.unwrap();
            assert!(!backend.exists("drafts").await.unwrap());
            // Removing again is not an error
            backend.remove("drafts").await.unwrap();
        });
    }

    #[test]
    fn test_clones_share_state() {
        runtime().block_on(async {
            let backend = MemoryStorageBackend::new();
            let other = backend.clone();
            backend.write("k", b"v").await.unwrap();
            assert_eq!(other.read("k").await.unwrap().unwrap(), b"v");
        });
    }

    #[test]
    fn test_quota_rejects_oversized_write() {
        runtime().block_on(async {
            let backend = MemoryStorageBackend::with_quota(10);
            backend.write("k", b"12345").await.unwrap();

            let err = backend.write("other", b"1234567890").await.unwrap_err();
            assert!(matches!(err, StorageError::QuotaExceeded(_)));

            // Replacing an existing key only counts the new value once
            backend.write("k", b"1234567890").await.unwrap();
        });
    }
}
