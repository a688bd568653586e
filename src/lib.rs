//! Wizard Draft SDK - Shared library for wizard draft persistence
//!
//! Provides durable, versioned, quota-aware storage of in-progress
//! multi-step form state for wizard-style builders:
//! - Draft save/load/delete with bounded version history
//! - Search, storage usage reporting, and age-based cleanup
//! - Import/export (JSON and reversibly-encoded variants)
//! - Best-effort cross-context change notification
//! - Pluggable storage backends and change-bus transports
//!
//! The UI layer owns form rendering, validation, and restore semantics; it
//! talks to this crate only through [`DraftManager`].

pub mod checksum;
pub mod codec;
pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod manager;
pub mod models;
pub mod progress;
pub mod search;
pub mod storage;
pub mod sync;

// Re-export commonly used types
pub use codec::{Base64Codec, Codec, CodecError, IdentityCodec, XorCodec};
pub use config::DraftManagerConfig;
pub use error::DraftError;
pub use export::{DraftExport, ExportFormat, ExportOptions, export_file_name};
pub use manager::{
    DraftManager, LoadOptions, LoadedDraft, SaveOptions, StorageInfo, Subscription,
};
pub use models::{DRAFT_SCHEMA_VERSION, Draft, DraftMetadata, DraftVersion, NavigationState};
pub use search::{SearchOptions, SortField, SortOrder};
pub use storage::{
    FileSystemStorageBackend, MemoryStorageBackend, StorageBackend, StorageError,
};
pub use sync::{ChangeBus, DraftChangeEvent, LocalChangeBus};
