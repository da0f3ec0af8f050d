//! User-visible status message registry.
//!
//! An ordered collection of named status messages ("Downloading 240
//! items…", "Syncing 40/120 items…"). Each message is keyed by a stable
//! [`StatusHandle`], so replacing updates text in place instead of
//! stacking duplicates.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Stable key identifying one status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusHandle(Uuid);

/// Progress snapshot emitted repeatedly by the sync engine during a pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncProgress {
    /// Items downloaded so far in this pass
    pub retrieved_count: usize,
    /// Items uploaded so far in this pass
    pub current: usize,
    /// Total items queued for upload
    pub total: usize,
}

#[derive(Debug, Clone)]
struct StatusEntry {
    handle: StatusHandle,
    text: String,
}

/// Ordered registry of user-visible status messages.
#[derive(Clone, Default)]
pub struct StatusRegistry {
    entries: Arc<RwLock<Vec<StatusEntry>>>,
}

impl StatusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new status message.
    pub async fn add(&self, text: impl Into<String>) -> StatusHandle {
        let handle = StatusHandle(Uuid::new_v4());
        self.entries.write().await.push(StatusEntry {
            handle,
            text: text.into(),
        });
        handle
    }

    /// Replace the message under `handle`, preserving its position.
    ///
    /// When `handle` is `None` or no longer present, the message is
    /// appended instead, so callers can thread an `Option` through
    /// repeated updates.
    pub async fn replace(
        &self,
        handle: Option<StatusHandle>,
        text: impl Into<String>,
    ) -> StatusHandle {
        let text = text.into();
        if let Some(handle) = handle {
            let mut entries = self.entries.write().await;
            if let Some(entry) = entries.iter_mut().find(|e| e.handle == handle) {
                entry.text = text;
                return handle;
            }
        }
        self.add(text).await
    }

    /// Remove a status message. Unknown handles are ignored.
    pub async fn remove(&self, handle: StatusHandle) {
        self.entries.write().await.retain(|e| e.handle != handle);
    }

    /// Current message texts, in insertion order.
    pub async fn messages(&self) -> Vec<String> {
        self.entries
            .read()
            .await
            .iter()
            .map(|e| e.text.clone())
            .collect()
    }

    /// Text currently shown under `handle`, if any.
    pub async fn text_for(&self, handle: StatusHandle) -> Option<String> {
        self.entries
            .read()
            .await
            .iter()
            .find(|e| e.handle == handle)
            .map(|e| e.text.clone())
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl std::fmt::Debug for StatusRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusRegistry")
            .field(
                "entries",
                &self.entries.try_read().map(|e| e.len()).unwrap_or(0),
            )
            .finish()
    }
}
