//! Authentication and session transitions.
//!
//! Login, registration, and sign-out, plus the local-data reconciliation
//! that runs when the authentication identity changes. Periodic sync is
//! locked for the duration of a login/register transaction and released
//! exactly once on every path, so a failed credential exchange can never
//! leave the timer permanently suspended.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use vellum_core::{
    AlertPresenter, AppEvent, AppHandle, EventBus, IdentityEngine, LoginRequest, ModelStore,
    CoreResult, StoreAdapter, SyncEngine, SyncOptions,
};

use crate::strings::{STRING_NON_MATCHING_PASSWORDS, STRING_SIGN_OUT_CONFIRMATION};

/// Outcome of a login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials accepted; reconciliation ran and a checked sync pass
    /// was requested.
    Authenticated,
    /// The server issued an MFA challenge. Retry with the code under
    /// `mfa_key` in the request's extra parameters.
    MfaRequired {
        /// Request parameter name the retried login must populate
        mfa_key: String,
        /// Message accompanying the challenge (set when a previous code
        /// was rejected)
        message: Option<String>,
    },
    /// Authentication failed; the session stays anonymous/offline.
    Failed { message: String },
}

/// Outcome of a register attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    Authenticated,
    Failed { message: String },
}

/// Releases the sync lock when dropped.
///
/// Acquiring locks; dropping unlocks. Every exit path out of a
/// login/register transaction therefore unlocks exactly once.
struct SyncLockGuard {
    sync: Arc<dyn SyncEngine>,
}

impl SyncLockGuard {
    fn acquire(sync: Arc<dyn SyncEngine>) -> Self {
        sync.lock_syncing();
        Self { sync }
    }
}

impl Drop for SyncLockGuard {
    fn drop(&mut self) {
        self.sync.unlock_syncing();
    }
}

/// Coordinates auth transitions and post-auth reconciliation.
pub struct AccountCoordinator {
    bus: EventBus,
    sync: Arc<dyn SyncEngine>,
    identity: Arc<dyn IdentityEngine>,
    store: Arc<dyn StoreAdapter>,
    model: Arc<dyn ModelStore>,
    alerts: Arc<dyn AlertPresenter>,
    app: Arc<dyn AppHandle>,
    /// Serializes store-mutating transitions (reconciliation, import
    /// merge) against each other.
    write_guard: Arc<Mutex<()>>,
}

impl AccountCoordinator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        bus: EventBus,
        sync: Arc<dyn SyncEngine>,
        identity: Arc<dyn IdentityEngine>,
        store: Arc<dyn StoreAdapter>,
        model: Arc<dyn ModelStore>,
        alerts: Arc<dyn AlertPresenter>,
        app: Arc<dyn AppHandle>,
        write_guard: Arc<Mutex<()>>,
    ) -> Self {
        Self {
            bus,
            sync,
            identity,
            store,
            model,
            alerts,
            app,
            write_guard,
        }
    }

    /// Attempt a login.
    ///
    /// `merge_local` chooses the reconciliation branch run on success:
    /// merge pushes all local work upstream under fresh identifiers,
    /// otherwise local data is discarded.
    pub async fn login(&self, request: &LoginRequest, merge_local: bool) -> CoreResult<LoginOutcome> {
        // Prevent a timed sync from occurring while signing in.
        let lock = SyncLockGuard::acquire(self.sync.clone());

        let response = match self.identity.login(request).await {
            Ok(response) => response,
            Err(error) => {
                warn!(%error, "login request failed");
                return Ok(LoginOutcome::Failed {
                    message: error.to_string(),
                });
            }
        };

        if response.is_success() {
            info!(email = %request.email, "login succeeded");
            self.reconcile(merge_local).await?;
            drop(lock);
            if let Err(error) = self.sync.sync(SyncOptions::checked()).await {
                warn!(%error, "post-login sync failed");
            }
            return Ok(LoginOutcome::Authenticated);
        }

        let error = response.error.unwrap_or_default();
        if error.is_mfa_challenge() {
            match error.mfa_key() {
                Some(mfa_key) => {
                    debug!(tag = ?error.tag, "login requires mfa");
                    return Ok(LoginOutcome::MfaRequired {
                        mfa_key: mfa_key.to_string(),
                        message: error.message.clone(),
                    });
                }
                None => {
                    warn!("mfa challenge missing mfa_key payload");
                }
            }
        }

        let message = error.display_message().to_string();
        self.alerts.alert(&message).await;
        Ok(LoginOutcome::Failed { message })
    }

    /// Register a new account. Password and confirmation must match
    /// exactly or the transition is rejected before any network call.
    pub async fn register(
        &self,
        url: &str,
        email: &str,
        password: &str,
        password_confirmation: &str,
        ephemeral: bool,
    ) -> CoreResult<RegisterOutcome> {
        let lock = SyncLockGuard::acquire(self.sync.clone());

        if password != password_confirmation {
            self.alerts.alert(STRING_NON_MATCHING_PASSWORDS).await;
            return Ok(RegisterOutcome::Failed {
                message: STRING_NON_MATCHING_PASSWORDS.to_string(),
            });
        }

        let response = match self.identity.register(url, email, password, ephemeral).await {
            Ok(response) => response,
            Err(error) => {
                warn!(%error, "register request failed");
                return Ok(RegisterOutcome::Failed {
                    message: error.to_string(),
                });
            }
        };

        if response.is_success() {
            info!(email = %email, "registration succeeded");
            // Only the merge branch is meaningful for a brand-new account.
            self.reconcile(true).await?;
            drop(lock);
            if let Err(error) = self.sync.sync(SyncOptions::default()).await {
                warn!(%error, "post-register sync failed");
            }
            return Ok(RegisterOutcome::Authenticated);
        }

        let error = response.error.unwrap_or_default();
        let message = error.display_message().to_string();
        self.alerts.alert(&message).await;
        Ok(RegisterOutcome::Failed { message })
    }

    /// Reconcile local data with the newly authenticated identity.
    ///
    /// With `merge_local`, the persisted store is cleared and every
    /// in-memory item is re-marked dirty under freshly alternated
    /// identifiers, so all local work uploads without colliding with
    /// items the remote account already owns. Without it, local data is
    /// discarded. Either branch concludes by re-attempting previously
    /// errored items.
    pub async fn reconcile(&self, merge_local: bool) -> CoreResult<()> {
        let _write = self.write_guard.lock().await;

        if merge_local {
            self.bus.publish(AppEvent::MajorDataChange, Value::Null).await;
            self.store.clear_all().await?;
            self.sync.mark_all_dirty(true).await?;
        } else {
            self.model.remove_all_from_memory().await;
            self.store.clear_all().await?;
        }

        self.sync.refresh_errored_items().await?;
        Ok(())
    }

    /// Sign out after destructive confirmation.
    ///
    /// Returns `false` when the user declined. On confirmation the
    /// authenticated session is destroyed (its observers purge in-memory
    /// items and sync session state) and a full application restart is
    /// requested; stale in-memory key material is never cleaned up
    /// piecemeal.
    pub async fn sign_out(&self) -> CoreResult<bool> {
        if !self.alerts.confirm(STRING_SIGN_OUT_CONFIRMATION, true).await {
            return Ok(false);
        }

        self.identity.sign_out().await?;
        self.app.request_reload();
        Ok(true)
    }
}
