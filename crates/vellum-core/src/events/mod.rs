//! Event system for the Vellum client.
//!
//! # Architecture
//!
//! ```text
//! EventBus (core owns)
//!    │
//!    ├── UI controllers (subscribe at startup)
//!    ├── Session bootstrapper (publishes lifecycle events)
//!    └── Sync event relay (republishes engine events verbatim)
//! ```
//!
//! Subscribers are invoked in subscription order; delivery is deferred one
//! scheduler tick; `publish` resolves after the slowest subscriber.
//!
//! # Key components
//!
//! - [`AppEvent`] / [`SyncEventKind`]: the closed set of event kinds
//! - [`EventBus`]: the pub/sub channel with removable subscriptions
//! - [`AppState`]: selection state publishing typed transitions

pub mod app_event;
pub mod app_state;
pub mod bus;

pub use app_event::{AppEvent, SyncEventKind};
pub use app_state::AppState;
pub use bus::{observer, EventBus, Observer, ObserverFuture, SubscriptionId};
