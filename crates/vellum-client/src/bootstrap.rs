//! Session bootstrap.
//!
//! Deterministically sequences application startup so that data is
//! available, encrypted state is unlocked, and the UI can render: store
//! open (with migration handling), preferences, sync status observer,
//! key-request wiring, sync event relay, sign-out observer, local item
//! load, one integrity-checked sync pass, then the permanent periodic
//! sync timer.
//!
//! A failed step never aborts the sequence; each step guards its own
//! errors. The periodic timer is the terminal state and runs until the
//! application terminates.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use vellum_core::engines::{
    IdentityEventHandler, KeyRequestHandler, LoadProgressObserver, MigrationHook,
    SyncEventHandler,
};
use vellum_core::{
    AlertPresenter, AppEvent, ClientConfig, EventBus, IdentityEngine, IdentityEvent,
    KeyResponse, ModelStore, PreferencesStore, StatusRegistry, StoreAdapter, SyncEngine,
    SyncEventKind, SyncOptions,
};

use crate::strings::{sync_exception_string, STRING_SESSION_EXPIRED};
use crate::sync_status::SyncStatusAggregator;

/// Sequences startup for a sync session.
pub struct SessionBootstrapper {
    config: ClientConfig,
    bus: EventBus,
    registry: StatusRegistry,
    aggregator: SyncStatusAggregator,
    store: Arc<dyn StoreAdapter>,
    sync: Arc<dyn SyncEngine>,
    identity: Arc<dyn IdentityEngine>,
    model: Arc<dyn ModelStore>,
    alerts: Arc<dyn AlertPresenter>,
    preferences: Arc<dyn PreferencesStore>,
}

impl SessionBootstrapper {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: ClientConfig,
        bus: EventBus,
        registry: StatusRegistry,
        store: Arc<dyn StoreAdapter>,
        sync: Arc<dyn SyncEngine>,
        identity: Arc<dyn IdentityEngine>,
        model: Arc<dyn ModelStore>,
        alerts: Arc<dyn AlertPresenter>,
        preferences: Arc<dyn PreferencesStore>,
    ) -> Self {
        let aggregator = SyncStatusAggregator::new(registry.clone(), config.clone());
        Self {
            config,
            bus,
            registry,
            aggregator,
            store,
            sync,
            identity,
            model,
            alerts,
            preferences,
        }
    }

    /// The bus events are broadcast on.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Run the full startup sequence. Returns the handle of the periodic
    /// sync timer task, which runs until the application terminates.
    pub async fn run(&self) -> JoinHandle<()> {
        self.open_store().await;
        self.load_preferences().await;
        self.install_status_observer().await;
        self.install_key_request_handler().await;
        self.install_sync_event_relay().await;
        self.install_sign_out_observer().await;
        self.load_local_data().await
    }

    /// Step 1: open the store. A missing/new store version clears the
    /// saved sync cursor (forcing a full re-fetch) and triggers an
    /// immediate sync.
    async fn open_store(&self) {
        let sync = self.sync.clone();
        let on_migration_needed: MigrationHook = Arc::new(move || {
            let sync = sync.clone();
            Box::pin(async move {
                info!("store migration detected, clearing sync cursor");
                if let Err(error) = sync.clear_cursor().await {
                    warn!(%error, "failed to clear sync cursor");
                }
                if let Err(error) = sync.sync(SyncOptions::default()).await {
                    warn!(%error, "migration-triggered sync failed");
                }
            })
        });

        if let Err(error) = self.store.open(on_migration_needed).await {
            warn!(%error, "store open failed");
        }
    }

    /// Step 2: load cached settings/preferences.
    async fn load_preferences(&self) {
        match self.preferences.load().await {
            Ok(_) => debug!("preferences loaded"),
            Err(error) => warn!(%error, "preferences load failed"),
        }
    }

    /// Step 3: install the sync status observer.
    async fn install_status_observer(&self) {
        self.sync
            .register_status_observer(self.aggregator.observer())
            .await;
    }

    /// Step 4: install the key-request handler the sync engine calls
    /// back into whenever it needs current key material. Offline/passcode
    /// sessions answer with locally derived keys; online sessions with
    /// keys from the authenticated session. Both paths may suspend on key
    /// derivation.
    async fn install_key_request_handler(&self) {
        let identity = self.identity.clone();
        let handler: KeyRequestHandler = Arc::new(move || {
            let identity = identity.clone();
            Box::pin(async move {
                let offline = identity.is_offline();
                let (keys, auth_params) = if offline {
                    (
                        identity.passcode_keys().await?,
                        identity.passcode_auth_params().await?,
                    )
                } else {
                    (identity.keys().await?, identity.auth_params().await?)
                };
                Ok(KeyResponse {
                    keys,
                    offline,
                    auth_params,
                })
            })
        });
        self.sync.set_key_request_handler(handler).await;
    }

    /// Step 5: relay every sync engine event verbatim onto the bus. A
    /// session-invalid event additionally raises a user-facing alert, at
    /// most once per configured interval; an engine exception alerts
    /// immediately.
    async fn install_sync_event_relay(&self) {
        let bus = self.bus.clone();
        let alerts = self.alerts.clone();
        let alert_interval = self.config.session_invalid_alert_interval();
        let last_shown: Arc<Mutex<Option<Instant>>> = Arc::new(Mutex::new(None));

        let handler: SyncEventHandler = Arc::new(move |kind: SyncEventKind, data: Value| {
            let bus = bus.clone();
            let alerts = alerts.clone();
            let last_shown = last_shown.clone();
            Box::pin(async move {
                bus.publish(AppEvent::Sync(kind.clone()), data.clone()).await;

                match kind {
                    SyncEventKind::SessionInvalid => {
                        let due = {
                            let mut last = last_shown.lock().await;
                            let due = last
                                .map_or(true, |shown| shown.elapsed() >= alert_interval);
                            if due {
                                *last = Some(Instant::now());
                            }
                            due
                        };
                        if due {
                            alerts.alert(STRING_SESSION_EXPIRED).await;
                        }
                    }
                    SyncEventKind::SyncException => {
                        alerts.alert(&sync_exception_string(&data)).await;
                    }
                    _ => {}
                }
            })
        });
        self.sync.add_event_handler(handler).await;
    }

    /// Step 6: when the active identity signs out, purge in-memory items
    /// and the sync engine's own session state.
    async fn install_sign_out_observer(&self) {
        let model = self.model.clone();
        let sync = self.sync.clone();
        let handler: IdentityEventHandler = Arc::new(move |event: IdentityEvent| {
            let model = model.clone();
            let sync = sync.clone();
            Box::pin(async move {
                if event == IdentityEvent::SignedOut {
                    info!("identity signed out, purging session state");
                    model.remove_all_from_memory().await;
                    if let Err(error) = sync.clear_session_state().await {
                        warn!(%error, "failed to clear sync session state");
                    }
                }
            })
        });
        self.identity.add_event_handler(handler).await;
    }

    /// Step 7: load persisted items with incremental progress, broadcast
    /// `InitialDataLoaded`, run one integrity-checked pass, and only then
    /// arm the periodic timer.
    async fn load_local_data(&self) -> JoinHandle<()> {
        let encryption_enabled =
            self.identity.current_user().is_some() || self.identity.has_local_passcode();
        let label = if encryption_enabled {
            "Decrypting"
        } else {
            "Loading"
        };

        let initial_status = self.registry.add(format!("{} items...", label)).await;

        let registry = self.registry.clone();
        let on_progress: LoadProgressObserver = Arc::new(move |current, total| {
            let registry = registry.clone();
            Box::pin(async move {
                registry
                    .replace(
                        Some(initial_status),
                        format!("{} {}/{} items...", label, current, total),
                    )
                    .await;
            })
        });

        if let Err(error) = self.sync.load_local_items(on_progress).await {
            warn!(%error, "local item load failed");
        }

        self.bus
            .publish(AppEvent::InitialDataLoaded, Value::Null)
            .await;

        self.registry.replace(Some(initial_status), "Syncing...").await;
        if let Err(error) = self.sync.sync(SyncOptions::checked()).await {
            warn!(%error, "initial integrity-checked sync failed");
        }
        self.registry.remove(initial_status).await;

        self.arm_periodic_sync()
    }

    /// Arm the permanent periodic sync timer. Never cancelled except by
    /// app termination.
    fn arm_periodic_sync(&self) -> JoinHandle<()> {
        let sync = self.sync.clone();
        let period = self.config.auto_sync_interval();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick fires immediately; the initial checked pass
            // already ran.
            interval.tick().await;
            loop {
                interval.tick().await;
                if let Err(error) = sync.sync(SyncOptions::default()).await {
                    warn!(%error, "periodic sync failed");
                }
            }
        })
    }
}
