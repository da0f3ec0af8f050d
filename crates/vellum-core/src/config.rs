//! Client configuration.
//!
//! Typed configuration with serde defaults, loadable from a TOML file.
//! Every timing and threshold constant the orchestration layer uses flows
//! from here, so tests and deployments can tighten or relax them without
//! code changes.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, CoreResult};

/// Configuration for the sync client orchestration layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Default sync server
    pub server_url: String,

    /// How often the periodic timer triggers ordinary sync passes
    pub auto_sync_interval_secs: u64,

    /// Minimum wall-clock gap between session-invalid alerts
    pub session_invalid_alert_interval_secs: u64,

    /// Item-count threshold above which download/upload statuses are
    /// shown
    pub status_item_threshold: usize,

    /// How long "Download Complete." lingers before removal
    pub download_complete_linger_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "https://sync.vellum.app".to_string(),
            auto_sync_interval_secs: 30,
            session_invalid_alert_interval_secs: 30,
            status_item_threshold: 20,
            download_complete_linger_secs: 2,
        }
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file.
    pub async fn load_from_path(path: impl AsRef<Path>) -> CoreResult<Self> {
        let content = tokio::fs::read_to_string(path.as_ref())
            .await
            .map_err(|e| CoreError::Config(format!("read {}: {}", path.as_ref().display(), e)))?;
        toml::from_str(&content).map_err(|e| CoreError::Config(e.to_string()))
    }

    pub fn auto_sync_interval(&self) -> Duration {
        Duration::from_secs(self.auto_sync_interval_secs)
    }

    pub fn session_invalid_alert_interval(&self) -> Duration {
        Duration::from_secs(self.session_invalid_alert_interval_secs)
    }

    pub fn download_complete_linger(&self) -> Duration {
        Duration::from_secs(self.download_complete_linger_secs)
    }
}
