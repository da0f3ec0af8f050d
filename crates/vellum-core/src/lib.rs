//! # Vellum Core
//!
//! Data model, event bus, status registry, and external-collaborator
//! interfaces for the Vellum sync client. The orchestration logic that
//! drives these types lives in `vellum-client`; the heavy engines
//! (encryption, transport, persistent storage) live outside this
//! workspace and are consumed through the traits in [`engines`].

#![warn(clippy::all)]

pub mod config;
pub mod engines;
pub mod errors;
pub mod events;
pub mod item;
pub mod session;
pub mod status;

pub use config::ClientConfig;
pub use engines::{
    AlertPresenter, AppHandle, CryptoEngine, IdentityEngine, IdentityEventHandler,
    KeyRequestHandler, KeyResponse, LoadProgressObserver, LoginRequest, MigrationHook,
    ModelStore, PreferencesStore, StoreAdapter, SyncEngine, SyncEventHandler, SyncOptions,
    SyncStatusObserver,
};
pub use errors::{CoreError, CoreResult};
pub use events::{observer, AppEvent, AppState, EventBus, Observer, SubscriptionId, SyncEventKind};
pub use item::{AuthParams, ContentType, Item, KeyMaterial};
pub use session::{AuthError, AuthResponse, IdentityEvent, User};
pub use status::{StatusHandle, StatusRegistry, SyncProgress};
