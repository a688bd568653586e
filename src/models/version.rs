//! Draft versions
//!
//! A [`DraftVersion`] is an immutable snapshot of the wizard's form state;
//! updates to a draft append new versions rather than mutating old ones.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::checksum::checksum;

/// Wizard position at snapshot time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationState {
    pub current_step: u32,
    pub total_steps: u32,
}

/// One immutable snapshot within a draft's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftVersion {
    /// Version identifier, derived from the owning draft id and the
    /// snapshot timestamp (plus a suffix, since millisecond timestamps
    /// collide under rapid successive saves).
    pub id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// Full deep copy of the wizard's form state at snapshot time.
    pub form_data: Value,
    pub navigation_state: NavigationState,
    /// Content checksum of `form_data`, used for de-duplication.
    pub checksum: String,
}

impl DraftVersion {
    /// Create a snapshot of `form_data` for the draft `draft_id`.
    pub fn new(draft_id: &str, form_data: Value, navigation_state: NavigationState) -> Self {
        let timestamp = Utc::now();
        let suffix = Uuid::new_v4().simple().to_string();
        Self {
            id: format!(
                "{}-v{}-{}",
                draft_id,
                timestamp.timestamp_millis(),
                &suffix[..8]
            ),
            timestamp,
            checksum: checksum(&form_data),
            form_data,
            navigation_state,
        }
    }
}
