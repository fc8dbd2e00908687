//! The recommendation engine: orchestration over stores, ledger and hub
//!
//! `RecommendationEngine` is constructed with its collaborators injected,
//! so tests can run isolated instances side by side. The per-unit pricing
//! math itself lives in `quoin-core`; this module loads configuration for
//! a development, runs the computation, records the result, and notifies
//! subscribers.

use std::sync::Arc;

use rust_decimal::Decimal;

use quoin_core::{
    build_recommendation, bulk, MarketIntelligence, MarketTrend, PricingError, PricingFactors,
    PricingResult, PricingStrategy, Recommendation, UnitSummary,
};

use crate::history::HistoryLedger;
use crate::notify::{Event, EventKind, NotificationHub, SubscriptionId};
use crate::stores::{MarketIntelligenceStore, StrategyStore};

pub struct RecommendationEngine {
    intelligence: Arc<MarketIntelligenceStore>,
    strategies: Arc<StrategyStore>,
    ledger: Arc<HistoryLedger>,
    hub: Arc<NotificationHub>,

    /// Seasonality applied to every unit of a bulk pass; bulk rows carry
    /// no per-unit seasonality signal
    bulk_seasonality_factor: Decimal,
}

impl RecommendationEngine {
    pub fn new(
        intelligence: Arc<MarketIntelligenceStore>,
        strategies: Arc<StrategyStore>,
        ledger: Arc<HistoryLedger>,
        hub: Arc<NotificationHub>,
        bulk_seasonality_factor: Decimal,
    ) -> Self {
        Self {
            intelligence,
            strategies,
            ledger,
            hub,
            bulk_seasonality_factor,
        }
    }

    /// Derive a recommendation for one unit, record it in the unit's
    /// history, and publish a `recommendation_produced` event.
    pub async fn compute(
        &self,
        unit_id: &str,
        development_id: &str,
        factors: &PricingFactors,
    ) -> PricingResult<Recommendation> {
        let intelligence = self
            .intelligence
            .get(development_id)
            .await
            .ok_or_else(|| PricingError::IntelligenceNotFound(development_id.to_string()))?;
        let strategy = self
            .strategies
            .get(development_id)
            .await
            .ok_or_else(|| PricingError::StrategyNotFound(development_id.to_string()))?;

        let recommendation =
            build_recommendation(unit_id, development_id, factors, &intelligence, &strategy)?;

        tracing::info!(
            unit = %unit_id,
            development = %development_id,
            recommended = %recommendation.recommended_price,
            change_pct = %recommendation.price_change_percent.round_dp(2),
            confidence = recommendation.confidence,
            urgency = ?recommendation.urgency,
            "Recommendation produced"
        );

        self.ledger.append(recommendation.clone()).await;
        self.hub
            .publish(&Event::RecommendationProduced {
                recommendation: recommendation.clone(),
            })
            .await;

        Ok(recommendation)
    }

    /// Score every unit of a development in one pass.
    ///
    /// A single demand level is estimated for the whole batch, each unit's
    /// location premium is derived from its features, and the results come
    /// back sorted by descending confidence. Missing intelligence or
    /// strategy fails the batch before any unit is computed.
    pub async fn compute_bulk(
        &self,
        development_id: &str,
        units: &[UnitSummary],
        market_trend: MarketTrend,
    ) -> PricingResult<Vec<Recommendation>> {
        if units.is_empty() {
            return Err(PricingError::InvalidInput(
                "units must not be empty for bulk computation".to_string(),
            ));
        }

        let intelligence = self
            .intelligence
            .get(development_id)
            .await
            .ok_or_else(|| PricingError::IntelligenceNotFound(development_id.to_string()))?;
        if self.strategies.get(development_id).await.is_none() {
            return Err(PricingError::StrategyNotFound(development_id.to_string()));
        }

        let demand_level = bulk::batch_demand_level(units)?;
        let competitor_pricing: Vec<Decimal> = intelligence
            .competitors
            .iter()
            .map(|competitor| competitor.average_price)
            .collect();

        tracing::info!(
            development = %development_id,
            units = units.len(),
            demand = %demand_level,
            trend = %market_trend,
            "Starting bulk computation"
        );

        let mut recommendations = Vec::with_capacity(units.len());
        for unit in units {
            let factors = PricingFactors {
                base_price: unit.base_price,
                current_price: unit.current_price,
                demand_level,
                inventory_level: units.len() as u32,
                total_inventory: intelligence.total_units,
                competitor_pricing: competitor_pricing.clone(),
                market_trend,
                time_on_market_days: unit.time_on_market_days,
                viewing_activity: unit.viewing_activity,
                interest_expressions: unit.interest_expressions,
                seasonality_factor: self.bulk_seasonality_factor,
                location_premium_factor: bulk::location_premium(
                    &unit.features,
                    &intelligence.buyer_behavior.feature_value_map,
                ),
            };
            recommendations.push(self.compute(&unit.unit_id, development_id, &factors).await?);
        }

        recommendations.sort_by(|a, b| b.confidence.cmp(&a.confidence));
        Ok(recommendations)
    }

    pub async fn market_intelligence(&self, development_id: &str) -> Option<MarketIntelligence> {
        self.intelligence.get(development_id).await
    }

    /// Store a development's strategy; publishes `strategy_updated`.
    pub async fn update_strategy(&self, development_id: &str, strategy: PricingStrategy) {
        self.strategies.set(development_id, strategy).await;
    }

    /// Most-recent-first recommendation history for a unit.
    pub async fn history(&self, unit_id: &str) -> Vec<Recommendation> {
        self.ledger.history(unit_id).await
    }

    pub async fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.hub.subscribe(kind, handler).await
    }

    pub async fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.hub.unsubscribe(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;
    use rust_decimal_macros::dec;

    use quoin_core::{
        BuyerBehavior, CompetitorSummary, DemandLevel, StrategyKind,
    };

    use crate::history::HISTORY_CAP;

    fn intelligence() -> MarketIntelligence {
        let mut feature_value_map = HashMap::new();
        feature_value_map.insert("corner_site".to_string(), dec!(25000));
        feature_value_map.insert("south_facing_garden".to_string(), dec!(15000));

        MarketIntelligence {
            development_id: "fitzgerald-gardens".to_string(),
            average_price: dec!(320000),
            median_price: dec!(315000),
            price_per_sqm: dec!(3400),
            sales_velocity_per_month: dec!(2.5),
            demand_to_supply_ratio: dec!(1.4),
            total_units: 30,
            competitors: vec![CompetitorSummary {
                name: "Riverside Manor".to_string(),
                average_price: dec!(310000),
                available_units: 12,
            }],
            buyer_behavior: BuyerBehavior {
                average_decision_time_days: 21,
                price_elasticity: dec!(1.5),
                feature_value_map,
            },
            captured_at: Utc::now(),
            metadata: None,
        }
    }

    fn strategy() -> PricingStrategy {
        PricingStrategy {
            kind: StrategyKind::Balanced,
            target_margin_percent: dec!(15),
            max_discount_percent: dec!(8),
            max_premium_percent: dec!(20),
            price_update_frequency_hours: 24,
        }
    }

    fn factors() -> PricingFactors {
        PricingFactors {
            base_price: dec!(300000),
            current_price: dec!(300000),
            demand_level: DemandLevel::Medium,
            inventory_level: 15,
            total_inventory: 30,
            competitor_pricing: vec![dec!(310000)],
            market_trend: MarketTrend::Stable,
            time_on_market_days: 20,
            viewing_activity: 6,
            interest_expressions: 2,
            seasonality_factor: dec!(1.0),
            location_premium_factor: dec!(1.0),
        }
    }

    fn unit(unit_id: &str, viewing_activity: u32, interest_expressions: u32) -> UnitSummary {
        UnitSummary {
            unit_id: unit_id.to_string(),
            current_price: dec!(300000),
            base_price: dec!(300000),
            viewing_activity,
            interest_expressions,
            time_on_market_days: 10,
            features: vec!["corner_site".to_string()],
        }
    }

    async fn engine() -> RecommendationEngine {
        let hub = Arc::new(NotificationHub::new());
        let engine = RecommendationEngine::new(
            Arc::new(MarketIntelligenceStore::new()),
            Arc::new(StrategyStore::new(Arc::clone(&hub))),
            Arc::new(HistoryLedger::new()),
            hub,
            dec!(1.0),
        );
        engine.intelligence.set(intelligence()).await;
        engine
            .update_strategy("fitzgerald-gardens", strategy())
            .await;
        engine
    }

    #[tokio::test]
    async fn missing_intelligence_fails_with_not_found() {
        let hub = Arc::new(NotificationHub::new());
        let engine = RecommendationEngine::new(
            Arc::new(MarketIntelligenceStore::new()),
            Arc::new(StrategyStore::new(Arc::clone(&hub))),
            Arc::new(HistoryLedger::new()),
            hub,
            dec!(1.0),
        );

        let err = engine
            .compute("unit-1", "unconfigured", &factors())
            .await
            .unwrap_err();
        assert!(matches!(err, PricingError::IntelligenceNotFound(ref id) if id == "unconfigured"));
    }

    #[tokio::test]
    async fn missing_strategy_fails_with_not_found() {
        let hub = Arc::new(NotificationHub::new());
        let engine = RecommendationEngine::new(
            Arc::new(MarketIntelligenceStore::new()),
            Arc::new(StrategyStore::new(Arc::clone(&hub))),
            Arc::new(HistoryLedger::new()),
            hub,
            dec!(1.0),
        );
        engine.intelligence.set(intelligence()).await;

        let err = engine
            .compute("unit-1", "fitzgerald-gardens", &factors())
            .await
            .unwrap_err();
        assert!(matches!(err, PricingError::StrategyNotFound(_)));
    }

    #[tokio::test]
    async fn compute_records_history_and_publishes_once() {
        let engine = engine().await;
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        engine
            .subscribe(EventKind::RecommendationProduced, move |event| {
                assert!(matches!(event, Event::RecommendationProduced { .. }));
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await;

        let rec = engine
            .compute("unit-1", "fitzgerald-gardens", &factors())
            .await
            .unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        let history = engine.history("unit-1").await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].recommended_price, rec.recommended_price);
    }

    #[tokio::test]
    async fn repeated_computes_respect_the_history_cap() {
        let engine = engine().await;
        for _ in 0..(HISTORY_CAP + 5) {
            engine
                .compute("unit-1", "fitzgerald-gardens", &factors())
                .await
                .unwrap();
        }
        assert_eq!(engine.history("unit-1").await.len(), HISTORY_CAP);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_computes_keep_the_cap_intact() {
        let engine = Arc::new(engine().await);

        let mut handles = Vec::new();
        for _ in 0..4 {
            let engine = Arc::clone(&engine);
            handles.push(tokio::spawn(async move {
                for _ in 0..10 {
                    engine
                        .compute("unit-1", "fitzgerald-gardens", &factors())
                        .await
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(engine.history("unit-1").await.len(), HISTORY_CAP);
    }

    #[tokio::test]
    async fn bulk_results_sort_by_descending_confidence() {
        let engine = engine().await;
        let units = vec![
            unit("unit-1", 0, 0),
            unit("unit-2", 12, 6),
            unit("unit-3", 3, 1),
        ];

        let recommendations = engine
            .compute_bulk("fitzgerald-gardens", &units, MarketTrend::Rising)
            .await
            .unwrap();

        assert_eq!(recommendations.len(), 3);
        for pair in recommendations.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
        // The active unit carries the most corroborating signal
        assert_eq!(recommendations[0].unit_id, "unit-2");
    }

    #[tokio::test]
    async fn bulk_applies_feature_location_premium() {
        let engine = engine().await;
        let mut plain = unit("unit-plain", 5, 2);
        plain.features.clear();
        let premium = unit("unit-corner", 5, 2);

        let recommendations = engine
            .compute_bulk(
                "fitzgerald-gardens",
                &[plain, premium],
                MarketTrend::Stable,
            )
            .await
            .unwrap();

        let plain_rec = recommendations
            .iter()
            .find(|r| r.unit_id == "unit-plain")
            .unwrap();
        let corner_rec = recommendations
            .iter()
            .find(|r| r.unit_id == "unit-corner")
            .unwrap();
        assert!(corner_rec.recommended_price > plain_rec.recommended_price);
    }

    #[tokio::test]
    async fn empty_bulk_batch_is_rejected() {
        let engine = engine().await;
        let err = engine
            .compute_bulk("fitzgerald-gardens", &[], MarketTrend::Rising)
            .await
            .unwrap_err();
        assert!(matches!(err, PricingError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn bulk_fails_whole_batch_on_missing_intelligence() {
        let engine = engine().await;
        let err = engine
            .compute_bulk("unconfigured", &[unit("unit-1", 5, 2)], MarketTrend::Rising)
            .await
            .unwrap_err();
        assert!(matches!(err, PricingError::IntelligenceNotFound(_)));
        // No partial results leak into history
        assert!(engine.history("unit-1").await.is_empty());
    }

    #[tokio::test]
    async fn history_of_unknown_unit_is_empty() {
        let engine = engine().await;
        assert!(engine.history("never-computed").await.is_empty());
    }
}
