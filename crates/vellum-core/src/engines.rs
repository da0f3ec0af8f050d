//! External collaborator interfaces.
//!
//! The orchestration core consumes the encryption engine, sync transport,
//! storage adapter, and model store through these seams; it never reaches
//! behind them. Each trait follows async/await with `CoreResult` returns.
//! Production implementations live outside this workspace; the client
//! integration tests ship deterministic mocks.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;

use crate::errors::CoreResult;
use crate::events::SyncEventKind;
use crate::item::{AuthParams, ContentType, Item, KeyMaterial};
use crate::session::{AuthResponse, IdentityEvent, User};
use crate::status::SyncProgress;

/// Key material and mode handed back to the sync engine on request.
#[derive(Debug, Clone)]
pub struct KeyResponse {
    /// Current keys, or `None` when encryption is not enabled
    pub keys: Option<KeyMaterial>,
    /// Whether this is an offline/passcode session
    pub offline: bool,
    /// Auth parameters matching the keys
    pub auth_params: Option<AuthParams>,
}

/// Options for a single sync pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Additionally verify overall data consistency against the remote
    /// store, beyond ordinary incremental exchange.
    pub perform_integrity_check: bool,
}

impl SyncOptions {
    /// An integrity-checked pass.
    pub fn checked() -> Self {
        Self {
            perform_integrity_check: true,
        }
    }
}

/// Callback invoked when the sync engine needs current key material.
pub type KeyRequestHandler =
    Arc<dyn Fn() -> BoxFuture<'static, CoreResult<KeyResponse>> + Send + Sync>;

/// Callback receiving progress snapshots during a sync pass.
pub type SyncStatusObserver = Arc<dyn Fn(SyncProgress) -> BoxFuture<'static, ()> + Send + Sync>;

/// Callback receiving relayed sync engine events.
pub type SyncEventHandler =
    Arc<dyn Fn(SyncEventKind, Value) -> BoxFuture<'static, ()> + Send + Sync>;

/// Callback receiving `(loaded, total)` during local item loading.
pub type LoadProgressObserver =
    Arc<dyn Fn(usize, usize) -> BoxFuture<'static, ()> + Send + Sync>;

/// Callback receiving identity engine events.
pub type IdentityEventHandler =
    Arc<dyn Fn(IdentityEvent) -> BoxFuture<'static, ()> + Send + Sync>;

/// Hook run by the store adapter when migration detection reports a
/// missing or new store version.
pub type MigrationHook = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Parameters for a login attempt.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub url: String,
    pub email: String,
    pub password: String,
    /// Do not persist the session beyond this process
    pub ephemeral: bool,
    /// Reject protocol-version downgrades
    pub strict: bool,
    /// Extra request parameters, e.g. an MFA code keyed by the
    /// challenge's `mfa_key`
    pub extra: Value,
}

impl LoginRequest {
    pub fn new(url: impl Into<String>, email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            email: email.into(),
            password: password.into(),
            ephemeral: false,
            strict: false,
            extra: Value::Null,
        }
    }

    /// Attach extra request parameters (builder style).
    pub fn with_extra(mut self, extra: Value) -> Self {
        self.extra = extra;
        self
    }
}

/// Local persisted store adapter.
#[async_trait]
pub trait StoreAdapter: Send + Sync {
    /// Open the store. `on_migration_needed` runs when the store version
    /// is missing or new, before any item is served.
    async fn open(&self, on_migration_needed: MigrationHook) -> CoreResult<()>;

    /// Remove every persisted item.
    async fn clear_all(&self) -> CoreResult<()>;
}

/// Low-level sync transport and conflict-resolution engine.
#[async_trait]
pub trait SyncEngine: Send + Sync {
    /// Run one sync pass.
    async fn sync(&self, options: SyncOptions) -> CoreResult<()>;

    /// Forget the saved sync cursor so the next pass re-fetches
    /// everything from the server.
    async fn clear_cursor(&self) -> CoreResult<()>;

    /// Install the progress observer for status reporting.
    async fn register_status_observer(&self, observer: SyncStatusObserver);

    /// Install the handler the engine calls back into whenever it needs
    /// current key material or auth parameters.
    async fn set_key_request_handler(&self, handler: KeyRequestHandler);

    /// Install the event handler; every engine event is delivered here.
    async fn add_event_handler(&self, handler: SyncEventHandler);

    /// Suspend timer-driven sync (during a login/register transaction).
    fn lock_syncing(&self);

    /// Resume timer-driven sync.
    fn unlock_syncing(&self);

    /// Whether syncing is currently locked.
    fn is_sync_locked(&self) -> bool;

    /// Load already-persisted items into memory, reporting incremental
    /// progress.
    async fn load_local_items(&self, on_progress: LoadProgressObserver) -> CoreResult<()>;

    /// Mark every in-memory item dirty; with `alternate_ids`, assign
    /// fresh identifiers first so re-upload cannot collide with items
    /// already owned by the remote account.
    async fn mark_all_dirty(&self, alternate_ids: bool) -> CoreResult<()>;

    /// Re-attempt items previously marked as errored.
    async fn refresh_errored_items(&self) -> CoreResult<()>;

    /// Purge the engine's own session state (cursor, queues) after the
    /// active identity signed out.
    async fn clear_session_state(&self) -> CoreResult<()>;

    /// The server this engine syncs against.
    async fn server_url(&self) -> CoreResult<String>;
}

/// Identity and account-key engine.
#[async_trait]
pub trait IdentityEngine: Send + Sync {
    /// Attempt a login. Failures and MFA challenges come back as a
    /// structured [`AuthResponse`], never as `Err`.
    async fn login(&self, request: &LoginRequest) -> CoreResult<AuthResponse>;

    /// Register a new account.
    async fn register(
        &self,
        url: &str,
        email: &str,
        password: &str,
        ephemeral: bool,
    ) -> CoreResult<AuthResponse>;

    /// Destroy the authenticated session.
    async fn sign_out(&self) -> CoreResult<()>;

    /// Keys for the authenticated session. May suspend on derivation.
    async fn keys(&self) -> CoreResult<Option<KeyMaterial>>;

    /// Auth parameters for the authenticated session.
    async fn auth_params(&self) -> CoreResult<Option<AuthParams>>;

    /// Locally derived keys for an offline/passcode session. May suspend
    /// on derivation.
    async fn passcode_keys(&self) -> CoreResult<Option<KeyMaterial>>;

    /// Auth parameters for the local passcode.
    async fn passcode_auth_params(&self) -> CoreResult<Option<AuthParams>>;

    /// Whether no remote identity is signed in.
    fn is_offline(&self) -> bool;

    /// Whether a local passcode protects the offline session.
    fn has_local_passcode(&self) -> bool;

    /// The signed-in user, if any.
    fn current_user(&self) -> Option<User>;

    /// Install an observer for identity events (sign-out).
    async fn add_event_handler(&self, handler: IdentityEventHandler);
}

/// Encryption/decryption engine.
#[async_trait]
pub trait CryptoEngine: Send + Sync {
    /// Derive item keys from a password and auth parameters.
    async fn derive_keys(&self, password: &str, auth_params: &AuthParams)
        -> CoreResult<KeyMaterial>;

    /// Decrypt a batch of items. With `throw_on_error` false, per-item
    /// failures set `error_decrypting` instead of failing the batch.
    async fn decrypt_items(
        &self,
        items: Vec<Item>,
        keys: &KeyMaterial,
        throw_on_error: bool,
    ) -> CoreResult<Vec<Item>>;
}

/// In-memory item model.
#[async_trait]
pub trait ModelStore: Send + Sync {
    /// Merge items into the live model; returns the merged items.
    async fn import_items(&self, items: Vec<Item>) -> CoreResult<Vec<Item>>;

    /// Discard every in-memory item without touching persisted storage.
    async fn remove_all_from_memory(&self);

    /// Count in-memory items matching the given content types.
    async fn count_by_types(&self, types: &[ContentType]) -> usize;
}

/// User-facing alert/confirmation presenter.
#[async_trait]
pub trait AlertPresenter: Send + Sync {
    /// Show a dismissable alert.
    async fn alert(&self, text: &str);

    /// Ask for confirmation; `destructive` marks irreversible actions.
    async fn confirm(&self, text: &str, destructive: bool) -> bool;
}

/// Cached application settings.
#[async_trait]
pub trait PreferencesStore: Send + Sync {
    /// Load cached preferences, returning them as opaque JSON.
    async fn load(&self) -> CoreResult<Value>;
}

/// Narrow capability interface to the hosting application.
///
/// Replaces ambient globals: components that need to trigger a clean
/// restart hold this instead of reaching for process-wide state.
pub trait AppHandle: Send + Sync {
    /// Request a full application restart. In-memory structures are
    /// assumed to hold stale key material, so teardown is never
    /// attempted piecemeal.
    fn request_reload(&self);
}
