//! Draft metadata
//!
//! [`DraftMetadata`] is the mutable envelope around a draft's version
//! history: timestamps, user-facing descriptors, the bounded version list,
//! and derived bookkeeping (`size`, `progress`) recomputed before every
//! persist.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::version::DraftVersion;

/// Schema version written into every stored draft.
pub const DRAFT_SCHEMA_VERSION: &str = "2.0.0";

/// Mutable envelope around a draft's version history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftMetadata {
    /// Stable identifier shared across all versions of the draft.
    pub id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_accessed_at: DateTime<Utc>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Stored-schema version, currently [`DRAFT_SCHEMA_VERSION`].
    pub version: String,
    /// Version history, insertion order, bounded to the configured maximum.
    pub versions: Vec<DraftVersion>,
    /// Serialized byte size of the draft, recomputed on every save.
    pub size: u64,
    pub compressed: bool,
    pub encrypted: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Derived 0-100 completion estimate.
    pub progress: u8,
}

impl DraftMetadata {
    /// Create metadata for a new draft with one initial version.
    pub fn new(id: String, title: String, initial_version: DraftVersion) -> Self {
        let now = Utc::now();
        Self {
            id,
            created_at: now,
            updated_at: now,
            last_accessed_at: now,
            title,
            description: None,
            version: DRAFT_SCHEMA_VERSION.to_string(),
            versions: vec![initial_version],
            size: 0,
            compressed: false,
            encrypted: false,
            tags: Vec::new(),
            progress: 0,
        }
    }

    /// Append a version, dropping the oldest surplus beyond `max_versions`.
    pub fn push_version(&mut self, version: DraftVersion, max_versions: usize) {
        self.versions.push(version);
        self.trim_versions(max_versions);
        self.updated_at = Utc::now();
    }

    /// Enforce the version cap by dropping the oldest surplus versions.
    pub fn trim_versions(&mut self, max_versions: usize) {
        let max_versions = max_versions.max(1);
        if self.versions.len() > max_versions {
            let surplus = self.versions.len() - max_versions;
            self.versions.drain(..surplus);
        }
    }

    /// De-duplicate versions sharing a checksum, keeping the first
    /// occurrence of each. Returns the number of versions removed.
    pub fn dedupe_versions(&mut self) -> usize {
        let before = self.versions.len();
        let mut seen = std::collections::HashSet::new();
        self.versions.retain(|v| seen.insert(v.checksum.clone()));
        before - self.versions.len()
    }

    pub fn touch_accessed(&mut self) {
        self.last_accessed_at = Utc::now();
    }
}
