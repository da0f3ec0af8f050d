//! Backup import pipeline.
//!
//! Decrypts and merges externally supplied backup payloads into the live
//! data set: parse, derive keys if the payload is an encrypted backup,
//! decrypt non-destructively (per-item failures are counted, never
//! thrown), strip encryption fields from the survivors, force component
//! items inactive, merge, then request a sync pass.

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

use vellum_core::{
    AlertPresenter, AuthParams, CoreError, CoreResult, CryptoEngine, Item, ModelStore,
    SyncEngine, SyncOptions,
};

use crate::strings::{STRING_ERROR_DECRYPTING_IMPORT, STRING_INVALID_IMPORT_FILE};

/// An externally supplied backup document.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportPayload {
    /// Present when the backup is encrypted; keys derive from
    /// `(password, auth_params)`
    #[serde(default)]
    pub auth_params: Option<AuthParams>,

    #[serde(default)]
    pub items: Vec<Item>,
}

impl ImportPayload {
    /// Whether decryption (and therefore a password prompt) is required.
    pub fn requires_password(&self) -> bool {
        self.auth_params.is_some()
    }
}

/// Result of a completed import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    /// Items that failed decryption and were excluded from the merge
    pub error_count: usize,
    /// Items merged into the live model
    pub imported_count: usize,
}

impl ImportReport {
    pub fn is_full_success(&self) -> bool {
        self.error_count == 0
    }
}

/// Funnels decrypted backup items into the live model.
pub struct ImportPipeline {
    crypto: Arc<dyn CryptoEngine>,
    model: Arc<dyn ModelStore>,
    sync: Arc<dyn SyncEngine>,
    alerts: Arc<dyn AlertPresenter>,
    /// Shared with reconciliation; see `AccountCoordinator`.
    write_guard: Arc<Mutex<()>>,
}

impl ImportPipeline {
    pub fn new(
        crypto: Arc<dyn CryptoEngine>,
        model: Arc<dyn ModelStore>,
        sync: Arc<dyn SyncEngine>,
        alerts: Arc<dyn AlertPresenter>,
        write_guard: Arc<Mutex<()>>,
    ) -> Self {
        Self {
            crypto,
            model,
            sync,
            alerts,
            write_guard,
        }
    }

    /// Parse raw text as a backup payload. A parse failure surfaces the
    /// file-format alert and aborts.
    pub async fn classify(&self, raw_text: &str) -> CoreResult<ImportPayload> {
        match serde_json::from_str::<ImportPayload>(raw_text) {
            Ok(payload) => Ok(payload),
            Err(error) => {
                self.alerts.alert(STRING_INVALID_IMPORT_FILE).await;
                Err(CoreError::InvalidImportFile(error))
            }
        }
    }

    /// Import a parsed payload. `password` is required when
    /// [`ImportPayload::requires_password`] is true.
    pub async fn import(
        &self,
        payload: ImportPayload,
        password: Option<&str>,
    ) -> CoreResult<ImportReport> {
        let mut items = payload.items;
        let mut error_count = 0usize;

        if let Some(auth_params) = &payload.auth_params {
            items = match self.decrypt_backup(items, auth_params, password).await {
                Ok((kept, errors)) => {
                    error_count = errors;
                    kept
                }
                Err(error) => {
                    // Whole-batch key derivation failed: one alert, no
                    // partial merge.
                    self.alerts.alert(STRING_ERROR_DECRYPTING_IMPORT).await;
                    return Err(error);
                }
            };
        }

        // Never activate components during import, in case a corrupted or
        // malicious backup carries an auto-executing extension.
        for item in &mut items {
            if item.is_component() {
                item.active = false;
            }
        }

        let merged = {
            let _write = self.write_guard.lock().await;
            self.model.import_items(items).await?
        };

        if let Err(error) = self.sync.sync(SyncOptions::default()).await {
            warn!(%error, "post-import sync failed");
        }

        info!(
            imported = merged.len(),
            errors = error_count,
            "import completed"
        );
        Ok(ImportReport {
            error_count,
            imported_count: merged.len(),
        })
    }

    /// Convenience: parse then import in one step.
    pub async fn import_text(
        &self,
        raw_text: &str,
        password: Option<&str>,
    ) -> CoreResult<ImportReport> {
        let payload = self.classify(raw_text).await?;
        self.import(payload, password).await
    }

    /// Decrypt an encrypted backup non-destructively. Returns the items
    /// that decrypted cleanly (encryption fields stripped) and the count
    /// of per-item failures.
    async fn decrypt_backup(
        &self,
        items: Vec<Item>,
        auth_params: &AuthParams,
        password: Option<&str>,
    ) -> CoreResult<(Vec<Item>, usize)> {
        let password = password.ok_or_else(|| {
            CoreError::ImportKeyDerivation("password required for encrypted backup".to_string())
        })?;

        let keys = self
            .crypto
            .derive_keys(password, auth_params)
            .await
            .map_err(|e| CoreError::ImportKeyDerivation(e.to_string()))?;

        let decrypted = self.crypto.decrypt_items(items, &keys, false).await?;

        let mut kept = Vec::with_capacity(decrypted.len());
        let mut error_count = 0usize;
        for mut item in decrypted {
            if item.error_decrypting {
                error_count += 1;
            } else {
                // Treated as plaintext on merge.
                item.strip_encryption_fields();
                kept.push(item);
            }
        }
        Ok((kept, error_count))
    }
}
