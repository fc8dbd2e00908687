//! Quoin demo binary
//!
//! Wires the engine end to end for one iteration: seeds market
//! intelligence and a pricing strategy for the Fitzgerald Gardens
//! development, subscribes to recommendation events, prices one unit,
//! runs a bulk pass over the phase-one units, and reads history back.
//! In production the seeding is done by the ingestion pipeline and the
//! bulk pass is driven by a scheduler.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal_macros::dec;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use quoin_core::{
    BuyerBehavior, CompetitorSummary, DemandLevel, MarketIntelligence, MarketTrend,
    PricingFactors, UnitSummary,
};
use quoin_engine::config::AppConfig;
use quoin_engine::{
    Event, EventKind, HistoryLedger, MarketIntelligenceStore, NotificationHub,
    RecommendationEngine, StrategyStore,
};

const DEVELOPMENT_ID: &str = "fitzgerald-gardens";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("quoin=info,quoin_engine=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Quoin pricing engine demo");

    let config = AppConfig::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        e
    })?;
    tracing::info!(
        bulk_seasonality = config.engine.bulk_seasonality_factor,
        "Configuration loaded"
    );

    let hub = Arc::new(NotificationHub::new());
    let intelligence_store = Arc::new(MarketIntelligenceStore::new());
    let strategy_store = Arc::new(StrategyStore::new(Arc::clone(&hub)));
    let ledger = Arc::new(HistoryLedger::new());
    let engine = RecommendationEngine::new(
        Arc::clone(&intelligence_store),
        Arc::clone(&strategy_store),
        ledger,
        Arc::clone(&hub),
        config.engine.bulk_seasonality(),
    );

    engine
        .subscribe(EventKind::RecommendationProduced, |event| {
            if let Event::RecommendationProduced { recommendation } = event {
                println!(
                    "  -> event: {} now recommended at {} ({:?} urgency, {} confidence)",
                    recommendation.unit_id,
                    recommendation.recommended_price,
                    recommendation.urgency,
                    recommendation.confidence
                );
            }
            Ok(())
        })
        .await;

    // Stand-in for the ingestion pipeline: one snapshot of the Fitzgerald
    // Gardens development on Ballymakenny Road, Drogheda.
    intelligence_store.set(fitzgerald_gardens()).await;
    engine
        .update_strategy(DEVELOPMENT_ID, config.strategy_defaults.to_strategy())
        .await;

    if let Some(snapshot) = engine.market_intelligence(DEVELOPMENT_ID).await {
        println!(
            "Priced against {}: average {}, {} competitors, demand/supply {}",
            snapshot.development_id,
            snapshot.average_price,
            snapshot.competitors.len(),
            snapshot.demand_to_supply_ratio
        );
    }

    println!("== Single-unit recommendation ==");
    let factors = PricingFactors {
        base_price: dec!(385000),
        current_price: dec!(385000),
        demand_level: DemandLevel::High,
        inventory_level: 6,
        total_inventory: 27,
        competitor_pricing: vec![dec!(365000), dec!(410000)],
        market_trend: MarketTrend::Rising,
        time_on_market_days: 12,
        viewing_activity: 14,
        interest_expressions: 4,
        seasonality_factor: dec!(1.05),
        location_premium_factor: dec!(1.1),
    };
    let recommendation = engine.compute("fg-4b-07", DEVELOPMENT_ID, &factors).await?;
    println!("{}", serde_json::to_string_pretty(&recommendation)?);

    println!("== Bulk pass over phase-one units ==");
    let recommendations = engine
        .compute_bulk(DEVELOPMENT_ID, &phase_one_units(), MarketTrend::Rising)
        .await?;
    for rec in &recommendations {
        println!(
            "  {}: {} -> {} ({:?}, confidence {})",
            rec.unit_id,
            rec.current_price,
            rec.recommended_price,
            rec.market_position,
            rec.confidence
        );
    }

    println!("== History for fg-4b-07 ==");
    for rec in engine.history("fg-4b-07").await {
        println!(
            "  {}: recommended {}",
            rec.generated_at.format("%Y-%m-%d %H:%M:%S"),
            rec.recommended_price
        );
    }

    tracing::info!("Demo complete");
    Ok(())
}

fn fitzgerald_gardens() -> MarketIntelligence {
    let mut feature_value_map = HashMap::new();
    feature_value_map.insert("corner_site".to_string(), dec!(25000));
    feature_value_map.insert("south_facing_garden".to_string(), dec!(15000));
    feature_value_map.insert("river_view".to_string(), dec!(20000));
    feature_value_map.insert("upgraded_kitchen".to_string(), dec!(10000));

    MarketIntelligence {
        development_id: DEVELOPMENT_ID.to_string(),
        average_price: dec!(310000),
        median_price: dec!(302500),
        price_per_sqm: dec!(3250),
        sales_velocity_per_month: dec!(2.8),
        demand_to_supply_ratio: dec!(2.3),
        total_units: 27,
        competitors: vec![
            CompetitorSummary {
                name: "Riverside Manor".to_string(),
                average_price: dec!(295000),
                available_units: 14,
            },
            CompetitorSummary {
                name: "Ellwood".to_string(),
                average_price: dec!(328000),
                available_units: 9,
            },
        ],
        buyer_behavior: BuyerBehavior {
            average_decision_time_days: 21,
            price_elasticity: dec!(1.5),
            feature_value_map,
        },
        captured_at: Utc::now(),
        metadata: Some(serde_json::json!({
            "source": "demo-seed",
            "address": "Ballymakenny Road, Drogheda"
        })),
    }
}

fn phase_one_units() -> Vec<UnitSummary> {
    vec![
        UnitSummary {
            unit_id: "fg-2b-01".to_string(),
            current_price: dec!(235000),
            base_price: dec!(235000),
            viewing_activity: 9,
            interest_expressions: 3,
            time_on_market_days: 18,
            features: vec!["south_facing_garden".to_string()],
        },
        UnitSummary {
            unit_id: "fg-3b-04".to_string(),
            current_price: dec!(285000),
            base_price: dec!(285000),
            viewing_activity: 16,
            interest_expressions: 7,
            time_on_market_days: 9,
            features: vec!["corner_site".to_string(), "upgraded_kitchen".to_string()],
        },
        UnitSummary {
            unit_id: "fg-3b-11".to_string(),
            current_price: dec!(295000),
            base_price: dec!(295000),
            viewing_activity: 4,
            interest_expressions: 1,
            time_on_market_days: 64,
            features: vec![],
        },
        UnitSummary {
            unit_id: "fg-4b-07".to_string(),
            current_price: dec!(385000),
            base_price: dec!(385000),
            viewing_activity: 14,
            interest_expressions: 4,
            time_on_market_days: 12,
            features: vec!["river_view".to_string(), "corner_site".to_string()],
        },
    ]
}
