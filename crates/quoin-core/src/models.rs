//! Domain models for the pricing recommendation engine
//!
//! These are the canonical structures shared between the pure computation
//! in this crate and the stateful engine in `quoin-engine`. Monetary
//! amounts and multipliers are `rust_decimal::Decimal` so band boundaries
//! and strategy clamps stay exact.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

// =============================================================================
// Pricing Factors (per-request input)
// =============================================================================

/// The multi-factor demand/market signals for a single inventory unit.
///
/// Invariant: `0 < inventory_level <= total_inventory` and
/// `current_price > 0`; violations are rejected before any arithmetic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingFactors {
    /// The list price the recommendation is derived from
    pub base_price: Decimal,

    /// The price the unit is currently offered at
    pub current_price: Decimal,

    /// Coarse categorical buyer-interest signal
    pub demand_level: DemandLevel,

    /// Unsold units remaining in the development
    pub inventory_level: u32,

    /// Total units in the development
    pub total_inventory: u32,

    /// Competitor asking prices for comparable units
    pub competitor_pricing: Vec<Decimal>,

    /// Direction of the wider market
    pub market_trend: MarketTrend,

    /// Days this unit has been listed
    pub time_on_market_days: u32,

    /// Viewings recorded for this unit
    pub viewing_activity: u32,

    /// Formal expressions of interest recorded for this unit
    pub interest_expressions: u32,

    /// Seasonal adjustment, expected in [0.8, 1.2]
    pub seasonality_factor: Decimal,

    /// Location/feature premium, expected in [0.9, 1.3]
    pub location_premium_factor: Decimal,
}

/// Coarse demand signal summarizing buyer interest
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DemandLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl DemandLevel {
    /// Price multiplier contributed by this demand level
    pub fn multiplier(&self) -> Decimal {
        match self {
            DemandLevel::Low => dec!(0.95),
            DemandLevel::Medium => dec!(1.00),
            DemandLevel::High => dec!(1.08),
            DemandLevel::Critical => dec!(1.15),
        }
    }
}

impl fmt::Display for DemandLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DemandLevel::Low => "low",
            DemandLevel::Medium => "medium",
            DemandLevel::High => "high",
            DemandLevel::Critical => "critical",
        };
        write!(f, "{}", label)
    }
}

/// Direction of the wider residential market
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MarketTrend {
    Declining,
    Stable,
    Rising,
    Hot,
}

impl MarketTrend {
    /// Price multiplier contributed by this trend
    pub fn multiplier(&self) -> Decimal {
        match self {
            MarketTrend::Declining => dec!(0.97),
            MarketTrend::Stable => dec!(1.00),
            MarketTrend::Rising => dec!(1.03),
            MarketTrend::Hot => dec!(1.08),
        }
    }
}

impl fmt::Display for MarketTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MarketTrend::Declining => "declining",
            MarketTrend::Stable => "stable",
            MarketTrend::Rising => "rising",
            MarketTrend::Hot => "hot",
        };
        write!(f, "{}", label)
    }
}

// =============================================================================
// Market Intelligence (per development, near-static)
// =============================================================================

/// A read-mostly snapshot of market conditions for one development.
///
/// Created and refreshed by an external ingestion process; the engine
/// only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketIntelligence {
    /// Development this snapshot describes
    pub development_id: String,

    /// Average sale price across the development
    pub average_price: Decimal,

    /// Median sale price across the development
    pub median_price: Decimal,

    /// Average price per square metre
    pub price_per_sqm: Decimal,

    /// Units sold per month at the current pace
    pub sales_velocity_per_month: Decimal,

    /// Active-buyer demand relative to unsold supply
    pub demand_to_supply_ratio: Decimal,

    /// Total units in the development, used by bulk computation
    pub total_units: u32,

    /// Competing developments in the catchment area
    pub competitors: Vec<CompetitorSummary>,

    /// Observed buyer-behavior constants for this catchment
    pub buyer_behavior: BuyerBehavior,

    /// When this snapshot was captured
    pub captured_at: DateTime<Utc>,

    /// Additional ingestion metadata (source, sample sizes, etc.)
    pub metadata: Option<serde_json::Value>,
}

/// Summary of one competing development
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorSummary {
    pub name: String,
    pub average_price: Decimal,
    pub available_units: u32,
}

/// Buyer-behavior constants observed for a catchment area
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyerBehavior {
    /// Average days from first viewing to a decision
    pub average_decision_time_days: u32,

    /// Price elasticity of demand (positive coefficient)
    pub price_elasticity: Decimal,

    /// Euro value buyers place on named unit features
    pub feature_value_map: HashMap<String, Decimal>,
}

// =============================================================================
// Pricing Strategy (per development, mutable)
// =============================================================================

/// Administrator-configured bounds and cadence for one development
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingStrategy {
    pub kind: StrategyKind,

    /// Target gross margin for the development
    pub target_margin_percent: Decimal,

    /// Largest discount any single recommendation may apply
    pub max_discount_percent: Decimal,

    /// Largest premium any single recommendation may apply
    pub max_premium_percent: Decimal,

    /// How often recommendations should be refreshed; also sets
    /// `valid_until` on each recommendation
    pub price_update_frequency_hours: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Aggressive,
    Balanced,
    Conservative,
    Premium,
}

// =============================================================================
// Bulk Input
// =============================================================================

/// Per-unit summary row for bulk computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSummary {
    pub unit_id: String,
    pub current_price: Decimal,
    pub base_price: Decimal,
    pub viewing_activity: u32,
    pub interest_expressions: u32,
    pub time_on_market_days: u32,

    /// Named unit features, valued via the intelligence feature map
    pub features: Vec<String>,
}

// =============================================================================
// Recommendation (output)
// =============================================================================

/// A single pricing recommendation, immutable once produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub unit_id: String,
    pub development_id: String,

    /// Price the unit was offered at when the recommendation was made
    pub current_price: Decimal,

    /// Recommended sale price, rounded to whole currency
    pub recommended_price: Decimal,

    /// Absolute change versus the current price
    pub price_change: Decimal,

    /// Percentage change versus the current price
    pub price_change_percent: Decimal,

    /// Confidence score in [0, 95]
    pub confidence: u8,

    /// One line per multiplier that moved the price, in application order
    pub reasoning: Vec<String>,

    pub urgency: Urgency,

    /// When a fresh recommendation should replace this one
    pub valid_until: DateTime<Utc>,

    /// Where the recommended price sits relative to the development average
    pub market_position: MarketPosition,

    pub expected_impact: ExpectedImpact,

    pub generated_at: DateTime<Utc>,
}

/// How quickly a recommended price change should be acted on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Immediate,
}

/// Classification of a price relative to the development average
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MarketPosition {
    BelowMarket,
    AtMarket,
    Premium,
    Luxury,
}

/// Estimated business impact of acting on a recommendation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedImpact {
    /// Estimated change in buyer demand, percent (2-decimal precision)
    pub demand_increase_percent: Decimal,

    /// Estimated reduction in time to sale; never negative
    pub time_to_sale_reduction_days: u32,

    /// Revenue delta versus selling at the current price, whole currency
    pub revenue_impact: Decimal,
}
