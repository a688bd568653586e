//! Draft manager
//!
//! Owns the draft collection: durable, versioned, quota-aware storage of
//! in-progress wizard form state, with recovery, search, portability, and
//! best-effort cross-context change notification.
//!
//! The whole collection lives under one storage key and every mutation is a
//! full read-modify-write of that key. Within one context, operations run
//! in call order; across contexts the last completed write wins, and the
//! change bus only signals that *something* changed. That limitation is by
//! contract - see [`crate::sync`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::codec::{Base64Codec, Codec, IdentityCodec, XorCodec};
use crate::config::DraftManagerConfig;
use crate::error::DraftError;
use crate::export::{ExportOptions, export_draft};
use crate::import::parse_export;
use crate::models::{Draft, DraftMetadata, DraftVersion, NavigationState, title_from_form_data};
use crate::progress::estimate_progress;
use crate::search::{self, SearchOptions};
use crate::storage::{StorageBackend, StorageError};
use crate::sync::{ChangeBus, DraftChangeEvent};

pub use crate::export::ExportFormat;

/// Options for [`DraftManager::save_draft`].
#[derive(Debug, Clone, Default)]
pub struct SaveOptions {
    /// Save into an existing draft. When absent, a new draft is created.
    pub draft_id: Option<String>,
    /// Override the draft title (otherwise derived from form content for
    /// new drafts, and kept as-is for existing ones).
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

/// Options for [`DraftManager::load_draft`].
///
/// Restoration flags (restore form data / step position / merge) are
/// consumed by the caller, not the manager, so they are not represented
/// here.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Load a specific version instead of the current one.
    pub version_id: Option<String>,
}

/// Snapshot returned by [`DraftManager::load_draft`]: a deep copy of the
/// stored state, never the manager-owned object.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDraft {
    pub form_data: Value,
    pub navigation_state: NavigationState,
}

/// Storage usage report. Quota is the configured estimate, not an
/// OS/browser query.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageInfo {
    pub used_bytes: u64,
    pub available_bytes: u64,
    pub quota_bytes: u64,
    pub draft_count: usize,
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub oldest_draft: Option<DateTime<Utc>>,
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub newest_draft: Option<DateTime<Utc>>,
}

type ChangeCallback = Box<dyn Fn(&DraftChangeEvent) + Send + Sync>;

#[derive(Default)]
struct CallbackRegistry {
    next_id: u64,
    entries: HashMap<u64, ChangeCallback>,
}

/// Handle returned by [`DraftManager::on_draft_change`]. Dropping the
/// handle keeps the subscription alive; call [`Subscription::unsubscribe`]
/// to remove it.
pub struct Subscription {
    id: u64,
    registry: Arc<Mutex<CallbackRegistry>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        let mut registry = self
            .registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        registry.entries.remove(&self.id);
    }
}

struct Inner<B: StorageBackend> {
    config: DraftManagerConfig,
    storage: B,
    codecs: Vec<Box<dyn Codec>>,
    bus: Option<Arc<dyn ChangeBus>>,
    context_id: Uuid,
    callbacks: Arc<Mutex<CallbackRegistry>>,
}

/// Versioned, quota-aware draft store over a [`StorageBackend`].
///
/// Construct one per application context, call [`initialize`] to start the
/// cleanup timer and change listener, and [`destroy`] (or drop) to release
/// them. All operations are async; the default backends resolve without
/// real suspension but the contract allows asynchronous storage.
///
/// [`initialize`]: DraftManager::initialize
/// [`destroy`]: DraftManager::destroy
pub struct DraftManager<B: StorageBackend + 'static> {
    inner: Arc<Inner<B>>,
    cleanup_task: Option<JoinHandle<()>>,
    listener_task: Option<JoinHandle<()>>,
}

impl<B: StorageBackend + 'static> DraftManager<B> {
    /// Create a manager with default configuration and no change bus.
    pub fn new(storage: B) -> Self {
        Self::with_config(storage, DraftManagerConfig::default())
    }

    /// Create a manager with explicit configuration.
    pub fn with_config(storage: B, config: DraftManagerConfig) -> Self {
        Self::build(storage, config, None)
    }

    /// Create a manager wired to a change bus shared with other contexts.
    pub fn with_change_bus(
        storage: B,
        config: DraftManagerConfig,
        bus: Arc<dyn ChangeBus>,
    ) -> Self {
        Self::build(storage, config, Some(bus))
    }

    fn build(storage: B, config: DraftManagerConfig, bus: Option<Arc<dyn ChangeBus>>) -> Self {
        let mut codecs: Vec<Box<dyn Codec>> = Vec::new();
        if config.compression_enabled {
            codecs.push(Box::new(Base64Codec));
        }
        if config.encryption_enabled {
            codecs.push(Box::new(XorCodec::default()));
        }
        if codecs.is_empty() {
            codecs.push(Box::new(IdentityCodec));
        }

        Self {
            inner: Arc::new(Inner {
                config,
                storage,
                codecs,
                bus,
                context_id: Uuid::new_v4(),
                callbacks: Arc::new(Mutex::new(CallbackRegistry::default())),
            }),
            cleanup_task: None,
            listener_task: None,
        }
    }

    /// Start the recurring cleanup sweep and the cross-context change
    /// listener. Must be called from within a tokio runtime. Idempotent.
    pub fn initialize(&mut self) {
        if self.cleanup_task.is_none()
            && let Some(interval) = self.inner.config.cleanup_interval
        {
            let inner = Arc::clone(&self.inner);
            self.cleanup_task = Some(tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                // The first tick of a tokio interval fires immediately
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    if let Err(e) = inner.cleanup_old_drafts().await {
                        warn!("Scheduled draft cleanup failed: {}", e);
                    }
                }
            }));
        }

        if self.listener_task.is_none()
            && self.inner.config.cross_tab_sync_enabled
            && let Some(bus) = &self.inner.bus
        {
            let mut receiver = bus.subscribe();
            let context_id = self.inner.context_id;
            let storage_key = self.inner.config.storage_key.clone();
            let callbacks = Arc::clone(&self.inner.callbacks);
            self.listener_task = Some(tokio::spawn(async move {
                loop {
                    match receiver.recv().await {
                        Ok(event) => {
                            if event.origin == context_id || event.storage_key != storage_key {
                                continue;
                            }
                            let registry = callbacks
                                .lock()
                                .unwrap_or_else(|poisoned| poisoned.into_inner());
                            for callback in registry.entries.values() {
                                callback(&event);
                            }
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                            debug!("Change listener lagged, skipped {} event(s)", skipped);
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    }
                }
            }));
        }
    }

    /// Stop the cleanup timer and change listener and drop all registered
    /// change callbacks. The manager remains usable for direct operations.
    pub fn destroy(&mut self) {
        if let Some(task) = self.cleanup_task.take() {
            task.abort();
        }
        if let Some(task) = self.listener_task.take() {
            task.abort();
        }
        let mut registry = self
            .inner
            .callbacks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        registry.entries.clear();
    }

    /// Register a callback invoked when *another* context writes the draft
    /// collection. Best-effort: no ordering or delivery guarantee.
    pub fn on_draft_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&DraftChangeEvent) + Send + Sync + 'static,
    {
        let mut registry = self
            .inner
            .callbacks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let id = registry.next_id;
        registry.next_id += 1;
        registry.entries.insert(id, Box::new(callback));
        Subscription {
            id,
            registry: Arc::clone(&self.inner.callbacks),
        }
    }

    /// Snapshot `form_data` into a new or existing draft and persist the
    /// collection. Returns the draft id.
    ///
    /// Re-saving identical content appends a new version (the checksum
    /// keeps duplicates detectable for [`optimize_storage`]). On quota
    /// exhaustion the oldest ~20% of drafts are evicted and the write is
    /// retried once; a second failure propagates.
    ///
    /// [`optimize_storage`]: DraftManager::optimize_storage
    pub async fn save_draft(
        &self,
        form_data: &Value,
        navigation_state: NavigationState,
        options: SaveOptions,
    ) -> Result<String, DraftError> {
        self.inner
            .save_draft(form_data, navigation_state, options)
            .await
    }

    /// Load a deep copy of a draft's form state and navigation position.
    ///
    /// Defaults to the current version; `options.version_id` selects an
    /// older one. Updates `last_accessed_at` and persists the touch.
    pub async fn load_draft(
        &self,
        draft_id: &str,
        options: LoadOptions,
    ) -> Result<LoadedDraft, DraftError> {
        self.inner.load_draft(draft_id, options).await
    }

    /// Remove a draft. Deleting an unknown id is a no-op, not an error.
    pub async fn delete_draft(&self, draft_id: &str) -> Result<(), DraftError> {
        self.inner.delete_draft(draft_id).await
    }

    /// The full collection. Empty (never an error) when storage holds
    /// nothing or unparseable data.
    pub async fn get_all_drafts(&self) -> Result<Vec<Draft>, DraftError> {
        self.inner.read_collection().await
    }

    /// Metadata envelopes only, with version payloads stripped - for
    /// listing UIs.
    pub async fn get_draft_metadata(&self) -> Result<Vec<DraftMetadata>, DraftError> {
        Ok(self
            .inner
            .read_collection()
            .await?
            .into_iter()
            .map(strip_versions)
            .collect())
    }

    /// Filter, sort, and truncate the collection's metadata.
    pub async fn search_drafts(
        &self,
        options: &SearchOptions,
    ) -> Result<Vec<DraftMetadata>, DraftError> {
        let mut results: Vec<DraftMetadata> = self
            .inner
            .read_collection()
            .await?
            .into_iter()
            .map(strip_versions)
            .filter(|m| search::matches(m, options))
            .collect();
        search::sort(&mut results, options.sort_by, options.sort_order);
        if let Some(limit) = options.limit {
            results.truncate(limit);
        }
        Ok(results)
    }

    /// Report usage against the configured quota estimate.
    pub async fn get_storage_info(&self) -> Result<StorageInfo, DraftError> {
        let drafts = self.inner.read_collection().await?;
        let used_bytes: u64 = drafts.iter().map(|d| d.metadata.size).sum();
        let quota_bytes = self.inner.config.quota_bytes;
        Ok(StorageInfo {
            used_bytes,
            available_bytes: quota_bytes.saturating_sub(used_bytes),
            quota_bytes,
            draft_count: drafts.len(),
            oldest_draft: drafts.iter().map(|d| d.metadata.created_at).min(),
            newest_draft: drafts.iter().map(|d| d.metadata.created_at).max(),
        })
    }

    /// Delete drafts older than the configured `max_age`. Runs on the
    /// cleanup timer and can be invoked manually. Returns the removal
    /// count.
    pub async fn cleanup_old_drafts(&self) -> Result<usize, DraftError> {
        self.inner.cleanup_old_drafts().await
    }

    /// De-duplicate versions by checksum (first occurrence wins) and
    /// re-apply the version cap. Never changes `current_version`.
    /// Idempotent.
    pub async fn optimize_storage(&self) -> Result<(), DraftError> {
        self.inner.optimize_storage().await
    }

    /// Produce a portable representation of one draft.
    pub async fn export_draft(
        &self,
        draft_id: &str,
        options: &ExportOptions,
    ) -> Result<String, DraftError> {
        let drafts = self.inner.read_collection().await?;
        let draft = drafts
            .iter()
            .find(|d| d.metadata.id == draft_id)
            .ok_or_else(|| DraftError::NotFound(draft_id.to_string()))?;
        export_draft(draft, options)
    }

    /// Import an exported draft as a new local draft. Returns the new id.
    pub async fn import_draft(
        &self,
        data: &str,
        format: ExportFormat,
    ) -> Result<String, DraftError> {
        self.inner.import_draft(data, format).await
    }
}

impl<B: StorageBackend + 'static> Drop for DraftManager<B> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<B: StorageBackend> Inner<B> {
    /// Read and decode the stored collection. Absent data is an empty
    /// collection; unparseable data is discarded with a warning (fail-open
    /// so the wizard stays usable).
    async fn read_collection(&self) -> Result<Vec<Draft>, DraftError> {
        let raw = match self.storage.read(&self.config.storage_key).await? {
            Some(bytes) => bytes,
            None => return Ok(Vec::new()),
        };
        match self.decode_collection(&raw) {
            Ok(drafts) => Ok(drafts),
            Err(reason) => {
                warn!(
                    "Discarding unparseable draft collection under '{}': {}",
                    self.config.storage_key, reason
                );
                Ok(Vec::new())
            }
        }
    }

    fn decode_collection(&self, raw: &[u8]) -> Result<Vec<Draft>, String> {
        let mut bytes = raw.to_vec();
        for codec in self.codecs.iter().rev() {
            bytes = codec.decode(&bytes).map_err(|e| e.to_string())?;
        }
        serde_json::from_slice(&bytes).map_err(|e| e.to_string())
    }

    fn encode_collection(&self, drafts: &[Draft]) -> Result<Vec<u8>, DraftError> {
        let mut bytes = serde_json::to_vec(drafts)?;
        for codec in &self.codecs {
            bytes = codec.encode(&bytes);
        }
        Ok(bytes)
    }

    /// Persist the collection, evicting the oldest ~20% of drafts and
    /// retrying once if the backend reports quota exhaustion. Publishes a
    /// change event after every successful write.
    async fn write_collection(&self, drafts: &mut Vec<Draft>) -> Result<(), DraftError> {
        let payload = self.encode_collection(drafts)?;
        match self.storage.write(&self.config.storage_key, &payload).await {
            Ok(()) => {
                self.publish_change();
                Ok(())
            }
            Err(StorageError::QuotaExceeded(reason)) => {
                // Never evict the most recently inserted draft - a single
                // over-quota draft fails outright instead of silently
                // vanishing after a "successful" save
                let evict = drafts
                    .len()
                    .div_ceil(5)
                    .min(drafts.len().saturating_sub(1));
                if evict == 0 {
                    return Err(StorageError::QuotaExceeded(reason).into());
                }
                warn!(
                    "Storage quota exceeded ({}); evicting {} oldest draft(s) and retrying",
                    reason, evict
                );
                drafts.drain(..evict);
                let payload = self.encode_collection(drafts)?;
                self.storage.write(&self.config.storage_key, &payload).await?;
                self.publish_change();
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn publish_change(&self) {
        if !self.config.cross_tab_sync_enabled {
            return;
        }
        if let Some(bus) = &self.bus {
            bus.publish(DraftChangeEvent {
                storage_key: self.config.storage_key.clone(),
                origin: self.context_id,
                timestamp: Utc::now(),
            });
        }
    }

    async fn save_draft(
        &self,
        form_data: &Value,
        navigation_state: NavigationState,
        options: SaveOptions,
    ) -> Result<String, DraftError> {
        let mut drafts = self.read_collection().await?;
        let draft_id = options
            .draft_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let version = DraftVersion::new(&draft_id, form_data.clone(), navigation_state);

        if let Some(draft) = drafts.iter_mut().find(|d| d.metadata.id == draft_id) {
            draft
                .metadata
                .push_version(version.clone(), self.config.max_versions);
            draft.current_version = version;
            if let Some(title) = options.title {
                draft.metadata.title = title;
            }
            if options.description.is_some() {
                draft.metadata.description = options.description;
            }
            if !options.tags.is_empty() {
                draft.metadata.tags = options.tags;
            }
            self.refresh_derived(draft)?;
        } else {
            let title = options
                .title
                .unwrap_or_else(|| title_from_form_data(form_data));
            let mut metadata = DraftMetadata::new(draft_id.clone(), title, version.clone());
            metadata.description = options.description;
            metadata.tags = options.tags;
            let mut draft = Draft {
                metadata,
                current_version: version,
            };
            self.refresh_derived(&mut draft)?;
            drafts.push(draft);
            // Cap the collection: oldest-by-insertion drafts are evicted
            while drafts.len() > self.config.max_drafts.max(1) {
                let evicted = drafts.remove(0);
                info!(
                    "Draft cap reached; evicted oldest draft '{}'",
                    evicted.metadata.id
                );
            }
        }

        self.write_collection(&mut drafts).await?;
        Ok(draft_id)
    }

    /// Recompute the derived fields that must never be stale: `size`,
    /// `progress`, and the storage-encoding flags.
    fn refresh_derived(&self, draft: &mut Draft) -> Result<(), DraftError> {
        draft.metadata.progress = estimate_progress(
            &draft.current_version.form_data,
            &draft.current_version.navigation_state,
        );
        draft.metadata.compressed = self.config.compression_enabled;
        draft.metadata.encrypted = self.config.encryption_enabled;
        draft.metadata.size = serde_json::to_vec(&draft)?.len() as u64;
        Ok(())
    }

    async fn load_draft(
        &self,
        draft_id: &str,
        options: LoadOptions,
    ) -> Result<LoadedDraft, DraftError> {
        let mut drafts = self.read_collection().await?;
        let draft = drafts
            .iter_mut()
            .find(|d| d.metadata.id == draft_id)
            .ok_or_else(|| DraftError::NotFound(draft_id.to_string()))?;

        let version = match &options.version_id {
            Some(version_id) => draft
                .version(version_id)
                .cloned()
                .ok_or_else(|| DraftError::VersionNotFound(version_id.clone()))?,
            None => draft.current_version.clone(),
        };

        draft.metadata.touch_accessed();

        // `version` is already a clone of the stored snapshot, so the
        // caller can never mutate manager-owned state through it
        let loaded = LoadedDraft {
            form_data: version.form_data,
            navigation_state: version.navigation_state,
        };
        self.write_collection(&mut drafts).await?;
        Ok(loaded)
    }

    async fn delete_draft(&self, draft_id: &str) -> Result<(), DraftError> {
        let mut drafts = self.read_collection().await?;
        let before = drafts.len();
        drafts.retain(|d| d.metadata.id != draft_id);
        if drafts.len() != before {
            self.write_collection(&mut drafts).await?;
        }
        Ok(())
    }

    async fn cleanup_old_drafts(&self) -> Result<usize, DraftError> {
        let max_age = chrono::Duration::from_std(self.config.max_age)
            .unwrap_or_else(|_| chrono::Duration::days(30));
        let cutoff = Utc::now() - max_age;

        let mut drafts = self.read_collection().await?;
        let before = drafts.len();
        drafts.retain(|d| d.metadata.created_at >= cutoff);
        let removed = before - drafts.len();
        if removed > 0 {
            info!("Cleanup removed {} expired draft(s)", removed);
            self.write_collection(&mut drafts).await?;
        }
        Ok(removed)
    }

    async fn optimize_storage(&self) -> Result<(), DraftError> {
        let mut drafts = self.read_collection().await?;
        let mut changed = false;
        for draft in &mut drafts {
            let deduped = draft.metadata.dedupe_versions();
            let before = draft.metadata.versions.len();
            draft.metadata.trim_versions(self.config.max_versions);
            if deduped > 0 || draft.metadata.versions.len() != before {
                changed = true;
            }
        }
        if changed {
            self.write_collection(&mut drafts).await?;
        }
        Ok(())
    }

    async fn import_draft(&self, data: &str, format: ExportFormat) -> Result<String, DraftError> {
        let mut draft = parse_export(data, format)?;
        draft.metadata.trim_versions(self.config.max_versions);
        self.refresh_derived(&mut draft)?;
        let new_id = draft.metadata.id.clone();

        let mut drafts = self.read_collection().await?;
        drafts.push(draft);
        while drafts.len() > self.config.max_drafts.max(1) {
            drafts.remove(0);
        }
        self.write_collection(&mut drafts).await?;
        info!("Imported draft as '{}'", new_id);
        Ok(new_id)
    }
}

fn strip_versions(draft: Draft) -> DraftMetadata {
    let mut metadata = draft.metadata;
    metadata.versions = Vec::new();
    metadata
}
