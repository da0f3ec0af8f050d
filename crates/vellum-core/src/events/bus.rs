//! Ordered, asynchronous multi-subscriber event bus.
//!
//! Subscribers are invoked in subscription order. Delivery is deferred by
//! one scheduler tick so that subscribers registered during the same
//! initialization phase are attached before the first event fires, and
//! `publish` resolves only after every subscriber's handler (including
//! awaited work) completes, so callers can serialize on "this event has
//! been fully observed."
//!
//! A subscriber returning `Err` is logged and does not block its siblings.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::warn;

use super::AppEvent;

/// Future returned by an observer invocation.
pub type ObserverFuture = BoxFuture<'static, anyhow::Result<()>>;

/// Boxed observer callback.
pub type Observer = Arc<dyn Fn(AppEvent, Value) -> ObserverFuture + Send + Sync>;

/// Handle identifying a subscription, usable for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Wrap an async closure into a boxed [`Observer`].
pub fn observer<F, Fut>(f: F) -> Observer
where
    F: Fn(AppEvent, Value) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move |event, payload| Box::pin(f(event, payload)))
}

/// Application-wide pub/sub channel for state transitions.
///
/// Cheap to clone; clones share the same subscriber list.
#[derive(Clone)]
pub struct EventBus {
    observers: Arc<RwLock<Vec<(SubscriptionId, Observer)>>>,
    next_id: Arc<AtomicU64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            observers: Arc::new(RwLock::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Register an observer; returns a handle usable with
    /// [`unsubscribe`](Self::unsubscribe).
    pub async fn subscribe(&self, observer: Observer) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers.write().await.push((id, observer));
        id
    }

    /// Remove a subscription. Returns `false` if the handle was unknown.
    pub async fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers.write().await;
        let before = observers.len();
        observers.retain(|(sub_id, _)| *sub_id != id);
        observers.len() != before
    }

    /// Number of live subscriptions.
    pub async fn subscriber_count(&self) -> usize {
        self.observers.read().await.len()
    }

    /// Publish an event to every subscriber, in subscription order.
    ///
    /// Resolves only after the slowest subscriber completes.
    pub async fn publish(&self, event: AppEvent, payload: Value) {
        // One tick of deferral so same-phase registrations are attached
        // before delivery begins.
        tokio::task::yield_now().await;

        let observers: Vec<(SubscriptionId, Observer)> =
            self.observers.read().await.iter().cloned().collect();

        for (id, observer) in observers {
            if let Err(error) = observer(event.clone(), payload.clone()).await {
                warn!(subscription = id.0, %error, event = ?event, "event observer failed");
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field(
                "observers",
                &self.observers.try_read().map(|o| o.len()).unwrap_or(0),
            )
            .finish()
    }
}
