//! # Quoin Engine
//!
//! The stateful layer of the Quoin dynamic pricing engine: keyed stores
//! for market intelligence and pricing strategy, a bounded per-unit
//! recommendation history, a publish/subscribe notification hub, and the
//! `RecommendationEngine` that orchestrates them around the pure
//! computation in `quoin-core`.

pub mod config;
pub mod engine;
pub mod history;
pub mod notify;
pub mod stores;

pub use engine::RecommendationEngine;
pub use history::HistoryLedger;
pub use notify::{Event, EventKind, NotificationHub, SubscriptionId};
pub use stores::{MarketIntelligenceStore, StrategyStore};
