//! Draft records
//!
//! A [`Draft`] pairs the mutable metadata envelope with the current
//! version. `current_version` is always the most recently appended (or an
//! explicitly selected) version; every draft has at least one.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::metadata::DraftMetadata;
use super::version::DraftVersion;

/// A saved, resumable snapshot of in-progress wizard state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub metadata: DraftMetadata,
    pub current_version: DraftVersion,
}

impl Draft {
    /// Look up a version by id, including the current version.
    pub fn version(&self, version_id: &str) -> Option<&DraftVersion> {
        if self.current_version.id == version_id {
            return Some(&self.current_version);
        }
        self.metadata.versions.iter().find(|v| v.id == version_id)
    }
}

/// Derive a default draft title from the form content.
///
/// Reads `generalInfo.name`, then a top-level `name`, then falls back to
/// "Untitled Project". The form data is otherwise opaque to the manager.
pub fn title_from_form_data(form_data: &Value) -> String {
    form_data
        .pointer("/generalInfo/name")
        .or_else(|| form_data.get("name"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "Untitled Project".to_string())
}
