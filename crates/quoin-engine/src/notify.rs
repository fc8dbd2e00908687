//! Publish/subscribe hub for engine events
//!
//! Subscribers register a handler for one event kind and receive events
//! synchronously, in registration order. A failing handler is logged and
//! never blocks delivery to the handlers behind it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use quoin_core::{PricingStrategy, Recommendation};

/// The kinds of event the engine emits
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    RecommendationProduced,
    StrategyUpdated,
}

/// An engine event with its payload
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    RecommendationProduced {
        recommendation: Recommendation,
    },
    StrategyUpdated {
        development_id: String,
        strategy: PricingStrategy,
    },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::RecommendationProduced { .. } => EventKind::RecommendationProduced,
            Event::StrategyUpdated { .. } => EventKind::StrategyUpdated,
        }
    }
}

/// Handler callback for subscribed events
pub type EventHandler = Arc<dyn Fn(&Event) -> anyhow::Result<()> + Send + Sync>;

/// Opaque handle identifying one subscription
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

struct Subscription {
    id: SubscriptionId,
    kind: EventKind,
    handler: EventHandler,
}

/// Synchronous publish/subscribe channel for engine events
#[derive(Default)]
pub struct NotificationHub {
    subscribers: RwLock<Vec<Subscription>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one event kind and return its handle.
    pub async fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let id = SubscriptionId(Uuid::new_v4());
        self.subscribers.write().await.push(Subscription {
            id,
            kind,
            handler: Arc::new(handler),
        });
        id
    }

    /// Remove a subscription; returns whether the handle was registered.
    pub async fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write().await;
        let before = subscribers.len();
        subscribers.retain(|subscription| subscription.id != id);
        subscribers.len() != before
    }

    /// Deliver an event to every subscriber of its kind, in registration
    /// order. Handler failures are logged and swallowed.
    pub async fn publish(&self, event: &Event) {
        let subscribers = self.subscribers.read().await;
        for subscription in subscribers
            .iter()
            .filter(|subscription| subscription.kind == event.kind())
        {
            if let Err(e) = (subscription.handler)(event) {
                tracing::warn!(
                    error = %e,
                    kind = ?event.kind(),
                    "Event handler failed"
                );
            }
        }
    }
}
