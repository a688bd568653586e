//! Draft manager configuration

use std::time::Duration;

/// Configuration for a [`DraftManager`](crate::manager::DraftManager).
///
/// All fields have defaults; construct with `DraftManagerConfig::default()`
/// and override what the host needs.
#[derive(Debug, Clone)]
pub struct DraftManagerConfig {
    /// Storage key the whole draft collection is persisted under.
    pub storage_key: String,
    /// Maximum number of drafts kept; inserting beyond the cap evicts the
    /// oldest draft by insertion order.
    pub max_drafts: usize,
    /// Maximum versions retained per draft; oldest surplus versions are
    /// dropped on save.
    pub max_versions: usize,
    /// Apply the placeholder compression codec to persisted data.
    pub compression_enabled: bool,
    /// Apply the placeholder encryption codec to persisted data.
    pub encryption_enabled: bool,
    /// Publish/consume change events on the injected change bus.
    pub cross_tab_sync_enabled: bool,
    /// Interval of the automatic cleanup sweep. `None` disables the timer;
    /// `cleanup_old_drafts` can still be invoked manually.
    pub cleanup_interval: Option<Duration>,
    /// Drafts whose creation time is older than this are removed by the
    /// cleanup sweep.
    pub max_age: Duration,
    /// Storage capacity estimate reported by `get_storage_info`. This is
    /// not an OS/browser query.
    pub quota_bytes: u64,
}

impl Default for DraftManagerConfig {
    fn default() -> Self {
        Self {
            storage_key: "wizard_form_drafts".to_string(),
            max_drafts: 10,
            max_versions: 5,
            compression_enabled: false,
            encryption_enabled: false,
            cross_tab_sync_enabled: true,
            cleanup_interval: Some(Duration::from_secs(60 * 60)),
            max_age: Duration::from_secs(30 * 24 * 60 * 60),
            // Common browser localStorage ceiling
            quota_bytes: 5 * 1024 * 1024,
        }
    }
}
