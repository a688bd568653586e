//! Storage backends
//!
//! The draft collection is persisted as a single value under one storage
//! key. Backends expose a minimal async key/value surface so the manager
//! works identically over browser-local storage, the filesystem, or an
//! in-memory map:
//! - `MemoryStorageBackend` - in-memory, optional quota (tests, previews)
//! - `FileSystemStorageBackend` - one file per key (desktop/native hosts)

pub mod filesystem;
pub mod memory;

use async_trait::async_trait;

pub use filesystem::FileSystemStorageBackend;
pub use memory::MemoryStorageBackend;

/// Error from a storage backend operation
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Read error: {0}")]
    ReadError(String),
    #[error("Write error: {0}")]
    WriteError(String),
    #[error("Storage quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Async key/value storage backend.
///
/// A backend call is the only suspension point in a manager operation;
/// within one context, operations run to completion in call order. Writes
/// replace the whole value for a key - there are no partial updates.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Read the raw value stored under `key`.
    ///
    /// Returns `None` if the key has never been written (or was removed).
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Write `data` under `key`, replacing any existing value.
    ///
    /// Backends with a capacity ceiling fail with
    /// [`StorageError::QuotaExceeded`] when the write does not fit.
    async fn write(&self, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Remove the value stored under `key`. Removing an absent key is not
    /// an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Check whether a value exists under `key`.
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;
}
