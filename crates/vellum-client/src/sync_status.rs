//! Sync status aggregation.
//!
//! Turns the raw progress snapshots the sync engine emits during a pass
//! into a small set of de-duplicated, human-readable status messages: at
//! most one download-phase message and one upload-phase message at a
//! time, both keyed by stable handles so updates replace text in place.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use vellum_core::engines::SyncStatusObserver;
use vellum_core::{ClientConfig, StatusHandle, StatusRegistry, SyncProgress};

#[derive(Debug, Default)]
struct AggregatorState {
    download_status: Option<StatusHandle>,
    showing_download: bool,
    /// Bumped each time a download completes; the handle is reused in
    /// place, so pending removal tasks key on this instead.
    download_generation: u64,
    upload_status: Option<StatusHandle>,
}

/// Aggregates sync progress into user-visible statuses.
///
/// Rules are evaluated in order, first match wins:
/// 1. many items retrieved → show/update "Downloading N items"
/// 2. a download status was showing → "Download Complete.", removed
///    after a short linger
/// 3. many items to upload → show/update "Syncing x/y items"
/// 4. an upload status is showing → remove it
#[derive(Clone)]
pub struct SyncStatusAggregator {
    registry: StatusRegistry,
    config: ClientConfig,
    state: Arc<Mutex<AggregatorState>>,
}

impl SyncStatusAggregator {
    pub fn new(registry: StatusRegistry, config: ClientConfig) -> Self {
        Self {
            registry,
            config,
            state: Arc::new(Mutex::new(AggregatorState::default())),
        }
    }

    /// The registry this aggregator writes to.
    pub fn registry(&self) -> &StatusRegistry {
        &self.registry
    }

    /// Build the observer callback to install on the sync engine.
    pub fn observer(&self) -> SyncStatusObserver {
        let aggregator = self.clone();
        Arc::new(move |progress| {
            let aggregator = aggregator.clone();
            Box::pin(async move {
                aggregator.handle_progress(progress).await;
            })
        })
    }

    /// Apply one progress snapshot.
    pub async fn handle_progress(&self, progress: SyncProgress) {
        let threshold = self.config.status_item_threshold;
        let mut state = self.state.lock().await;

        if progress.retrieved_count > threshold {
            let text = format!(
                "Downloading {} items. Keep app open.",
                progress.retrieved_count
            );
            let handle = self.registry.replace(state.download_status, text).await;
            state.download_status = Some(handle);
            state.showing_download = true;
        } else if state.showing_download {
            state.showing_download = false;
            state.download_generation += 1;
            let handle = self
                .registry
                .replace(state.download_status, "Download Complete.")
                .await;
            state.download_status = Some(handle);
            self.schedule_download_status_removal(handle, state.download_generation);
        } else if progress.total > threshold {
            let text = format!("Syncing {}/{} items...", progress.current, progress.total);
            let handle = self.registry.replace(state.upload_status, text).await;
            state.upload_status = Some(handle);
        } else if let Some(handle) = state.upload_status.take() {
            self.registry.remove(handle).await;
        }
    }

    /// Remove the lingering "Download Complete." message after the
    /// configured delay, unless a newer download took the status over
    /// in the meantime.
    fn schedule_download_status_removal(&self, handle: StatusHandle, generation: u64) {
        let registry = self.registry.clone();
        let state = self.state.clone();
        let linger = self.config.download_complete_linger();
        tokio::spawn(async move {
            tokio::time::sleep(linger).await;
            let mut state = state.lock().await;
            if state.download_generation == generation
                && state.download_status == Some(handle)
                && !state.showing_download
            {
                registry.remove(handle).await;
                state.download_status = None;
                debug!("download status cleared");
            }
        });
    }
}
