//! Keyed per-development stores for intelligence and strategy
//!
//! Both stores are read-mostly maps behind an async `RwLock`: writes are
//! administrative, and readers always observe a fully-written value.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use quoin_core::{MarketIntelligence, PricingStrategy};

use crate::notify::{Event, NotificationHub};

/// Per-development market intelligence snapshots, populated by an
/// external ingestion process.
#[derive(Default)]
pub struct MarketIntelligenceStore {
    inner: RwLock<HashMap<String, MarketIntelligence>>,
}

impl MarketIntelligenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, development_id: &str) -> Option<MarketIntelligence> {
        self.inner.read().await.get(development_id).cloned()
    }

    /// Replace the snapshot for a development. The whole snapshot swaps
    /// under the write guard, so no reader sees a partial update.
    pub async fn set(&self, intelligence: MarketIntelligence) {
        self.inner
            .write()
            .await
            .insert(intelligence.development_id.clone(), intelligence);
    }
}

/// Per-development pricing strategies. Updates publish a
/// `strategy_updated` event through the injected hub.
pub struct StrategyStore {
    inner: RwLock<HashMap<String, PricingStrategy>>,
    hub: Arc<NotificationHub>,
}

impl StrategyStore {
    pub fn new(hub: Arc<NotificationHub>) -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            hub,
        }
    }

    pub async fn get(&self, development_id: &str) -> Option<PricingStrategy> {
        self.inner.read().await.get(development_id).cloned()
    }

    /// Store the strategy and notify subscribers. The write guard is
    /// released before delivery so handlers may read the store.
    pub async fn set(&self, development_id: &str, strategy: PricingStrategy) {
        {
            let mut inner = self.inner.write().await;
            inner.insert(development_id.to_string(), strategy.clone());
        }
        self.hub
            .publish(&Event::StrategyUpdated {
                development_id: development_id.to_string(),
                strategy,
            })
            .await;
    }
}
