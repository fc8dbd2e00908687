//! Bounded per-unit recommendation history

use std::collections::{HashMap, VecDeque};

use tokio::sync::RwLock;

use quoin_core::Recommendation;

/// Recommendations retained per unit; older entries are evicted
pub const HISTORY_CAP: usize = 30;

/// Most-recent-first log of past recommendations, keyed by unit id.
///
/// Appends for the same unit are serialized through the write guard, so
/// concurrent computations cannot corrupt the cap.
#[derive(Default)]
pub struct HistoryLedger {
    entries: RwLock<HashMap<String, VecDeque<Recommendation>>>,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a recommendation, evicting the oldest past the cap.
    pub async fn append(&self, recommendation: Recommendation) {
        let mut entries = self.entries.write().await;
        let log = entries
            .entry(recommendation.unit_id.clone())
            .or_default();
        log.push_front(recommendation);
        log.truncate(HISTORY_CAP);
    }

    /// Most-recent-first history for a unit; empty for an unknown id.
    pub async fn history(&self, unit_id: &str) -> Vec<Recommendation> {
        let entries = self.entries.read().await;
        entries
            .get(unit_id)
            .map(|log| log.iter().cloned().collect())
            .unwrap_or_default()
    }
}
