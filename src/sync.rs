//! Cross-context change notifications
//!
//! When one context persists the draft collection, other contexts sharing
//! the same storage are told that *something* changed under the key - not
//! what, and not in what order. This mirrors the browser `storage` event:
//! best-effort notification, never a synchronization primitive. Concurrent
//! writers race and the last completed write wins.
//!
//! The bus is injectable so non-browser hosts can bridge a different
//! transport (file watch, IPC) into the same contract.

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Notification that a context wrote the draft collection.
#[derive(Debug, Clone)]
pub struct DraftChangeEvent {
    /// Storage key that was written.
    pub storage_key: String,
    /// Context that performed the write. Subscribers in the same context
    /// never observe their own writes.
    pub origin: Uuid,
    pub timestamp: DateTime<Utc>,
}

/// Publish/subscribe transport for [`DraftChangeEvent`]s.
pub trait ChangeBus: Send + Sync {
    /// Publish an event to all current subscribers. Delivery is
    /// best-effort; publishing with no subscribers is not an error.
    fn publish(&self, event: DraftChangeEvent);

    /// Subscribe to events published after this call.
    fn subscribe(&self) -> broadcast::Receiver<DraftChangeEvent>;
}

/// In-process change bus over a tokio broadcast channel.
///
/// Clones share the channel; hand the same bus (or clones of it) to every
/// manager that should observe the others' writes.
#[derive(Clone)]
pub struct LocalChangeBus {
    sender: broadcast::Sender<DraftChangeEvent>,
}

impl LocalChangeBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(64);
        Self { sender }
    }
}

impl Default for LocalChangeBus {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeBus for LocalChangeBus {
    fn publish(&self, event: DraftChangeEvent) {
        // send() fails only when there are no subscribers
        let _ = self.sender.send(event);
    }

    fn subscribe(&self) -> broadcast::Receiver<DraftChangeEvent> {
        self.sender.subscribe()
    }
}
