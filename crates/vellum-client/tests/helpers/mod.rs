//! Deterministic mock collaborators for integration tests.
//!
//! Mocks are in-memory, deterministic, and observable: every operation is
//! recorded so tests can assert on exactly what the orchestration layer
//! did. Error injection is supported where tests need failure paths.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use uuid::Uuid;

use vellum_core::engines::{
    IdentityEventHandler, KeyRequestHandler, LoadProgressObserver, MigrationHook,
    SyncEventHandler, SyncStatusObserver,
};
use vellum_core::{
    AlertPresenter, AppHandle, AuthParams, AuthResponse, ContentType, CoreError, CoreResult,
    CryptoEngine, IdentityEngine, IdentityEvent, Item, KeyMaterial, KeyResponse, LoginRequest,
    ModelStore, PreferencesStore, StatusRegistry, StoreAdapter, SyncEngine, SyncEventKind,
    SyncOptions, SyncProgress, User,
};

/// Marker value: items whose `enc_item_key` equals this fail decryption.
pub const UNDECRYPTABLE_KEY: &str = "undecryptable";

// ============================================================================
// Sync engine
// ============================================================================

#[derive(Default)]
pub struct MockSyncEngine {
    pub lock_count: AtomicUsize,
    pub unlock_count: AtomicUsize,
    locked: AtomicBool,
    pub sync_calls: Mutex<Vec<SyncOptions>>,
    pub clear_cursor_count: AtomicUsize,
    pub mark_all_dirty_calls: Mutex<Vec<bool>>,
    pub refresh_errored_count: AtomicUsize,
    pub clear_session_count: AtomicUsize,
    pub fail_sync: AtomicBool,
    /// Items "persisted locally", loaded by `load_local_items`
    pub local_items: Mutex<Vec<Item>>,
    /// Model the engine marks dirty; shared with the test's model store
    pub model: Option<Arc<MockModelStore>>,
    /// When set, `load_local_items` and `sync` snapshot this registry's
    /// messages so tests can observe transient statuses.
    probed_registry: Mutex<Option<StatusRegistry>>,
    pub load_statuses: Mutex<Vec<Vec<String>>>,
    pub sync_statuses: Mutex<Vec<Vec<String>>>,
    status_observer: Mutex<Option<SyncStatusObserver>>,
    event_handlers: Mutex<Vec<SyncEventHandler>>,
    key_handler: Mutex<Option<KeyRequestHandler>>,
}

impl MockSyncEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(model: Arc<MockModelStore>) -> Self {
        Self {
            model: Some(model),
            ..Self::default()
        }
    }

    pub fn sync_count(&self) -> usize {
        self.sync_calls.lock().unwrap().len()
    }

    /// Snapshot `registry` on every sync pass and load progress step.
    pub fn probe_registry(&self, registry: StatusRegistry) {
        *self.probed_registry.lock().unwrap() = Some(registry);
    }

    async fn snapshot_registry(&self, into: &Mutex<Vec<Vec<String>>>) {
        let registry = self.probed_registry.lock().unwrap().clone();
        if let Some(registry) = registry {
            let messages = registry.messages().await;
            into.lock().unwrap().push(messages);
        }
    }

    pub fn recorded_sync_options(&self) -> Vec<SyncOptions> {
        self.sync_calls.lock().unwrap().clone()
    }

    /// Deliver a progress snapshot to the installed status observer.
    pub async fn emit_progress(&self, progress: SyncProgress) {
        let observer = self.status_observer.lock().unwrap().clone();
        if let Some(observer) = observer {
            observer(progress).await;
        }
    }

    /// Deliver an engine event to every installed event handler.
    pub async fn emit_event(&self, kind: SyncEventKind, data: Value) {
        let handlers: Vec<SyncEventHandler> = self.event_handlers.lock().unwrap().clone();
        for handler in handlers {
            handler(kind.clone(), data.clone()).await;
        }
    }

    /// Invoke the installed key-request handler, as the engine would.
    pub async fn request_keys(&self) -> CoreResult<KeyResponse> {
        let handler = self.key_handler.lock().unwrap().clone();
        match handler {
            Some(handler) => handler().await,
            None => Err(CoreError::Internal("no key request handler".into())),
        }
    }

    pub fn has_key_handler(&self) -> bool {
        self.key_handler.lock().unwrap().is_some()
    }

    pub fn has_status_observer(&self) -> bool {
        self.status_observer.lock().unwrap().is_some()
    }
}

#[async_trait]
impl SyncEngine for MockSyncEngine {
    async fn sync(&self, options: SyncOptions) -> CoreResult<()> {
        self.sync_calls.lock().unwrap().push(options);
        self.snapshot_registry(&self.sync_statuses).await;
        if self.fail_sync.load(Ordering::SeqCst) {
            return Err(CoreError::sync("injected sync failure"));
        }
        Ok(())
    }

    async fn clear_cursor(&self) -> CoreResult<()> {
        self.clear_cursor_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn register_status_observer(&self, observer: SyncStatusObserver) {
        *self.status_observer.lock().unwrap() = Some(observer);
    }

    async fn set_key_request_handler(&self, handler: KeyRequestHandler) {
        *self.key_handler.lock().unwrap() = Some(handler);
    }

    async fn add_event_handler(&self, handler: SyncEventHandler) {
        self.event_handlers.lock().unwrap().push(handler);
    }

    fn lock_syncing(&self) {
        self.lock_count.fetch_add(1, Ordering::SeqCst);
        self.locked.store(true, Ordering::SeqCst);
    }

    fn unlock_syncing(&self) {
        self.unlock_count.fetch_add(1, Ordering::SeqCst);
        self.locked.store(false, Ordering::SeqCst);
    }

    fn is_sync_locked(&self) -> bool {
        self.locked.load(Ordering::SeqCst)
    }

    async fn load_local_items(&self, on_progress: LoadProgressObserver) -> CoreResult<()> {
        let items = self.local_items.lock().unwrap().clone();
        let total = items.len().max(2);
        on_progress(total / 2, total).await;
        self.snapshot_registry(&self.load_statuses).await;
        on_progress(total, total).await;
        self.snapshot_registry(&self.load_statuses).await;
        if let Some(model) = &self.model {
            model.import_items(items).await?;
        }
        Ok(())
    }

    async fn mark_all_dirty(&self, alternate_ids: bool) -> CoreResult<()> {
        self.mark_all_dirty_calls.lock().unwrap().push(alternate_ids);
        if let Some(model) = &self.model {
            model.mark_all_dirty(alternate_ids);
        }
        Ok(())
    }

    async fn refresh_errored_items(&self) -> CoreResult<()> {
        self.refresh_errored_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn clear_session_state(&self) -> CoreResult<()> {
        self.clear_session_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn server_url(&self) -> CoreResult<String> {
        Ok("https://sync.test.invalid".to_string())
    }
}

// ============================================================================
// Identity engine
// ============================================================================

pub struct MockIdentityEngine {
    pub login_responses: Mutex<VecDeque<AuthResponse>>,
    pub register_responses: Mutex<VecDeque<AuthResponse>>,
    pub login_requests: Mutex<Vec<LoginRequest>>,
    pub register_count: AtomicUsize,
    pub sign_out_count: AtomicUsize,
    user: Mutex<Option<User>>,
    offline: AtomicBool,
    has_passcode: AtomicBool,
    handlers: Mutex<Vec<IdentityEventHandler>>,
    pub account_keys: Mutex<Option<KeyMaterial>>,
    pub passcode_key_material: Mutex<Option<KeyMaterial>>,
}

impl Default for MockIdentityEngine {
    fn default() -> Self {
        Self {
            login_responses: Mutex::new(VecDeque::new()),
            register_responses: Mutex::new(VecDeque::new()),
            login_requests: Mutex::new(Vec::new()),
            register_count: AtomicUsize::new(0),
            sign_out_count: AtomicUsize::new(0),
            user: Mutex::new(None),
            offline: AtomicBool::new(true),
            has_passcode: AtomicBool::new(false),
            handlers: Mutex::new(Vec::new()),
            account_keys: Mutex::new(None),
            passcode_key_material: Mutex::new(None),
        }
    }
}

impl MockIdentityEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn test_user() -> User {
        User {
            uuid: Uuid::new_v4(),
            email: "user@example.org".to_string(),
        }
    }

    /// Queue the next login response.
    pub fn push_login_response(&self, response: AuthResponse) {
        self.login_responses.lock().unwrap().push_back(response);
    }

    pub fn push_register_response(&self, response: AuthResponse) {
        self.register_responses.lock().unwrap().push_back(response);
    }

    pub fn set_signed_in(&self, user: User) {
        *self.user.lock().unwrap() = Some(user);
        self.offline.store(false, Ordering::SeqCst);
    }

    pub fn set_passcode(&self, keys: KeyMaterial) {
        self.has_passcode.store(true, Ordering::SeqCst);
        *self.passcode_key_material.lock().unwrap() = Some(keys);
    }

    pub fn set_account_keys(&self, keys: KeyMaterial) {
        *self.account_keys.lock().unwrap() = Some(keys);
    }
}

#[async_trait]
impl IdentityEngine for MockIdentityEngine {
    async fn login(&self, request: &LoginRequest) -> CoreResult<AuthResponse> {
        self.login_requests.lock().unwrap().push(request.clone());
        let response = self
            .login_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| AuthResponse::success(Self::test_user()));
        if response.is_success() {
            *self.user.lock().unwrap() = response.user.clone();
            self.offline.store(false, Ordering::SeqCst);
        }
        Ok(response)
    }

    async fn register(
        &self,
        _url: &str,
        email: &str,
        _password: &str,
        _ephemeral: bool,
    ) -> CoreResult<AuthResponse> {
        self.register_count.fetch_add(1, Ordering::SeqCst);
        let response = self
            .register_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                AuthResponse::success(User {
                    uuid: Uuid::new_v4(),
                    email: email.to_string(),
                })
            });
        if response.is_success() {
            *self.user.lock().unwrap() = response.user.clone();
            self.offline.store(false, Ordering::SeqCst);
        }
        Ok(response)
    }

    async fn sign_out(&self) -> CoreResult<()> {
        self.sign_out_count.fetch_add(1, Ordering::SeqCst);
        *self.user.lock().unwrap() = None;
        self.offline.store(true, Ordering::SeqCst);
        let handlers: Vec<IdentityEventHandler> = self.handlers.lock().unwrap().clone();
        for handler in handlers {
            handler(IdentityEvent::SignedOut).await;
        }
        Ok(())
    }

    async fn keys(&self) -> CoreResult<Option<KeyMaterial>> {
        Ok(self.account_keys.lock().unwrap().clone())
    }

    async fn auth_params(&self) -> CoreResult<Option<AuthParams>> {
        Ok(Some(json!({"pw_cost": 110000, "version": "003"})))
    }

    async fn passcode_keys(&self) -> CoreResult<Option<KeyMaterial>> {
        Ok(self.passcode_key_material.lock().unwrap().clone())
    }

    async fn passcode_auth_params(&self) -> CoreResult<Option<AuthParams>> {
        Ok(Some(json!({"pw_cost": 3000, "version": "003", "local": true})))
    }

    fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    fn has_local_passcode(&self) -> bool {
        self.has_passcode.load(Ordering::SeqCst)
    }

    fn current_user(&self) -> Option<User> {
        self.user.lock().unwrap().clone()
    }

    async fn add_event_handler(&self, handler: IdentityEventHandler) {
        self.handlers.lock().unwrap().push(handler);
    }
}

// ============================================================================
// Store adapter
// ============================================================================

#[derive(Default)]
pub struct MockStoreAdapter {
    pub open_count: AtomicUsize,
    pub clear_all_count: AtomicUsize,
    /// When set, `open` reports a missing/new store version.
    pub migration_needed: AtomicBool,
    pub persisted: Mutex<Vec<Item>>,
}

impl MockStoreAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn persisted_count(&self) -> usize {
        self.persisted.lock().unwrap().len()
    }
}

#[async_trait]
impl StoreAdapter for MockStoreAdapter {
    async fn open(&self, on_migration_needed: MigrationHook) -> CoreResult<()> {
        self.open_count.fetch_add(1, Ordering::SeqCst);
        if self.migration_needed.load(Ordering::SeqCst) {
            on_migration_needed().await;
        }
        Ok(())
    }

    async fn clear_all(&self) -> CoreResult<()> {
        self.clear_all_count.fetch_add(1, Ordering::SeqCst);
        self.persisted.lock().unwrap().clear();
        Ok(())
    }
}

// ============================================================================
// Model store
// ============================================================================

#[derive(Default)]
pub struct MockModelStore {
    pub items: Mutex<Vec<Item>>,
    pub import_count: AtomicUsize,
    pub remove_all_count: AtomicUsize,
}

impl MockModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item_count(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn dirty_count(&self) -> usize {
        self.items.lock().unwrap().iter().filter(|i| i.dirty).count()
    }

    pub fn mark_all_dirty(&self, alternate_ids: bool) {
        for item in self.items.lock().unwrap().iter_mut() {
            if alternate_ids {
                item.alternate_uuid();
            }
            item.mark_dirty();
        }
    }

    pub fn snapshot(&self) -> Vec<Item> {
        self.items.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelStore for MockModelStore {
    async fn import_items(&self, items: Vec<Item>) -> CoreResult<Vec<Item>> {
        self.import_count.fetch_add(1, Ordering::SeqCst);
        let mut stored = self.items.lock().unwrap();
        for item in &items {
            match stored.iter_mut().find(|s| s.uuid == item.uuid) {
                Some(existing) => *existing = item.clone(),
                None => stored.push(item.clone()),
            }
        }
        Ok(items)
    }

    async fn remove_all_from_memory(&self) {
        self.remove_all_count.fetch_add(1, Ordering::SeqCst);
        self.items.lock().unwrap().clear();
    }

    async fn count_by_types(&self, types: &[ContentType]) -> usize {
        self.items
            .lock()
            .unwrap()
            .iter()
            .filter(|i| types.contains(&i.content_type))
            .count()
    }
}

// ============================================================================
// Crypto engine
// ============================================================================

#[derive(Default)]
pub struct MockCryptoEngine {
    pub derive_count: AtomicUsize,
    pub decrypt_count: AtomicUsize,
    /// When set, key derivation fails regardless of password.
    pub fail_derivation: AtomicBool,
}

impl MockCryptoEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CryptoEngine for MockCryptoEngine {
    async fn derive_keys(
        &self,
        password: &str,
        _auth_params: &AuthParams,
    ) -> CoreResult<KeyMaterial> {
        self.derive_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_derivation.load(Ordering::SeqCst) {
            return Err(CoreError::crypto("key derivation failed"));
        }
        Ok(KeyMaterial::new(format!("mk-{}", password), "ak"))
    }

    async fn decrypt_items(
        &self,
        items: Vec<Item>,
        _keys: &KeyMaterial,
        throw_on_error: bool,
    ) -> CoreResult<Vec<Item>> {
        self.decrypt_count.fetch_add(1, Ordering::SeqCst);
        let mut decrypted = Vec::with_capacity(items.len());
        for mut item in items {
            if item.enc_item_key.as_deref() == Some(UNDECRYPTABLE_KEY) {
                if throw_on_error {
                    return Err(CoreError::crypto("undecryptable item"));
                }
                item.error_decrypting = true;
            }
            decrypted.push(item);
        }
        Ok(decrypted)
    }
}

// ============================================================================
// Alerts, preferences, app handle
// ============================================================================

pub struct MockAlertPresenter {
    pub alerts: Mutex<Vec<String>>,
    pub confirmations: Mutex<Vec<(String, bool)>>,
    pub confirm_response: AtomicBool,
}

impl Default for MockAlertPresenter {
    fn default() -> Self {
        Self {
            alerts: Mutex::new(Vec::new()),
            confirmations: Mutex::new(Vec::new()),
            confirm_response: AtomicBool::new(true),
        }
    }
}

impl MockAlertPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alert_count(&self) -> usize {
        self.alerts.lock().unwrap().len()
    }

    pub fn last_alert(&self) -> Option<String> {
        self.alerts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl AlertPresenter for MockAlertPresenter {
    async fn alert(&self, text: &str) {
        self.alerts.lock().unwrap().push(text.to_string());
    }

    async fn confirm(&self, text: &str, destructive: bool) -> bool {
        self.confirmations
            .lock()
            .unwrap()
            .push((text.to_string(), destructive));
        self.confirm_response.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct MockPreferencesStore {
    pub load_count: AtomicUsize,
}

#[async_trait]
impl PreferencesStore for MockPreferencesStore {
    async fn load(&self) -> CoreResult<Value> {
        self.load_count.fetch_add(1, Ordering::SeqCst);
        Ok(json!({"sort_by": "updated_at"}))
    }
}

#[derive(Default)]
pub struct MockAppHandle {
    pub reload_count: AtomicUsize,
}

impl AppHandle for MockAppHandle {
    fn request_reload(&self) {
        self.reload_count.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Item builders
// ============================================================================

pub fn plaintext_note(title: &str) -> Item {
    Item::new(ContentType::Note).with_content(json!({"title": title}))
}

pub fn encrypted_note(title: &str) -> Item {
    let mut item = plaintext_note(title);
    item.enc_item_key = Some("003:valid".to_string());
    item.auth_hash = Some("cafe".to_string());
    item
}

pub fn undecryptable_note(title: &str) -> Item {
    let mut item = plaintext_note(title);
    item.enc_item_key = Some(UNDECRYPTABLE_KEY.to_string());
    item.auth_hash = Some("cafe".to_string());
    item
}
