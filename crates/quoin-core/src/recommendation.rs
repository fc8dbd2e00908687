//! Per-unit recommendation computation
//!
//! This module contains the core pricing algorithm: a chain of multiplier
//! lookups over the supplied factors, clamped to the development's strategy
//! bounds, followed by confidence, urgency, market-position, and
//! business-impact scoring. Banded steps are ordered `(threshold, value)`
//! tables evaluated in order, so each band is independently testable.

use chrono::{Duration, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::error::{PricingError, PricingResult};
use crate::models::*;

/// Confidence every recommendation starts from
const CONFIDENCE_BASE: u32 = 70;

/// Confidence is capped here regardless of how many bonuses apply
const CONFIDENCE_CAP: u32 = 95;

/// Ascending remaining-fraction bands; the first band whose threshold is
/// not exceeded wins. Below 10% remaining stock commands the top premium.
const SCARCITY_BANDS: [(Decimal, Decimal); 4] = [
    (dec!(0.1), dec!(1.20)),
    (dec!(0.2), dec!(1.15)),
    (dec!(0.3), dec!(1.10)),
    (dec!(0.5), dec!(1.05)),
];

/// Descending activity-score bands; the first band whose threshold is met
/// wins. Scores below every band discount slightly.
const ACTIVITY_BANDS: [(Decimal, Decimal); 4] = [
    (dec!(20), dec!(1.12)),
    (dec!(15), dec!(1.08)),
    (dec!(10), dec!(1.04)),
    (dec!(5), dec!(1.00)),
];
const ACTIVITY_FLOOR: Decimal = dec!(0.98);

/// Ascending days-on-market bands; stale listings discount progressively.
const TIME_ON_MARKET_BANDS: [(u32, Decimal); 4] = [
    (7, dec!(1.02)),
    (30, dec!(1.00)),
    (60, dec!(0.98)),
    (90, dec!(0.95)),
];
const TIME_ON_MARKET_FLOOR: Decimal = dec!(0.92);

/// Descending |price-change-percent| bands for urgency
const URGENCY_BANDS: [(Decimal, Urgency); 3] = [
    (dec!(10), Urgency::Immediate),
    (dec!(5), Urgency::High),
    (dec!(2), Urgency::Medium),
];

/// Ascending recommended/average ratio bands for market position
const MARKET_POSITION_BANDS: [(Decimal, MarketPosition); 3] = [
    (dec!(0.90), MarketPosition::BelowMarket),
    (dec!(1.10), MarketPosition::AtMarket),
    (dec!(1.25), MarketPosition::Premium),
];

/// Derive a recommendation for one unit.
///
/// Pure aside from timestamping: identical inputs produce identical
/// prices, confidence, urgency and market position on repeated calls.
pub fn build_recommendation(
    unit_id: &str,
    development_id: &str,
    factors: &PricingFactors,
    intelligence: &MarketIntelligence,
    strategy: &PricingStrategy,
) -> PricingResult<Recommendation> {
    validate(factors, intelligence)?;

    let mut multiplier = Decimal::ONE;
    let mut reasoning: Vec<String> = Vec::new();

    // 1. Demand - always reported, even at the neutral medium level
    let demand = factors.demand_level.multiplier();
    multiplier *= demand;
    reasoning.push(format!(
        "Market demand is {}: {} adjustment",
        factors.demand_level,
        signed_pct(demand)
    ));

    // 2. Scarcity
    let remaining =
        Decimal::from(factors.inventory_level) / Decimal::from(factors.total_inventory);
    let scarcity = scarcity_multiplier(remaining);
    multiplier *= scarcity;
    if scarcity != Decimal::ONE {
        reasoning.push(format!(
            "Only {}% of inventory remaining: {} scarcity premium",
            (remaining * dec!(100)).round_dp(1).normalize(),
            signed_pct(scarcity)
        ));
    }

    // 3. Trend
    let trend = factors.market_trend.multiplier();
    multiplier *= trend;
    if trend != Decimal::ONE {
        reasoning.push(format!(
            "Market trend is {}: {} adjustment",
            factors.market_trend,
            signed_pct(trend)
        ));
    }

    // 4. Buyer activity
    let score = activity_score(factors.viewing_activity, factors.interest_expressions);
    let activity = activity_multiplier(score);
    multiplier *= activity;
    if activity != Decimal::ONE {
        reasoning.push(format!(
            "Buyer activity score {} ({} viewings, {} expressions of interest): {} adjustment",
            score.round_dp(1).normalize(),
            factors.viewing_activity,
            factors.interest_expressions,
            signed_pct(activity)
        ));
    }

    // 5. Time on market
    let staleness = time_on_market_multiplier(factors.time_on_market_days);
    multiplier *= staleness;
    if staleness != Decimal::ONE {
        reasoning.push(format!(
            "{} days on market: {} adjustment",
            factors.time_on_market_days,
            signed_pct(staleness)
        ));
    }

    // 6. Seasonality and location premium apply directly, no banding
    multiplier *= factors.seasonality_factor;
    if factors.seasonality_factor != Decimal::ONE {
        reasoning.push(format!(
            "Seasonality factor {}: {} adjustment",
            factors.seasonality_factor.normalize(),
            signed_pct(factors.seasonality_factor)
        ));
    }
    multiplier *= factors.location_premium_factor;
    if factors.location_premium_factor != Decimal::ONE {
        reasoning.push(format!(
            "Location premium factor {}: {} adjustment",
            factors.location_premium_factor.normalize(),
            signed_pct(factors.location_premium_factor)
        ));
    }

    // Strategy bounds cap any single recommendation
    let floor = Decimal::ONE - strategy.max_discount_percent / dec!(100);
    let ceiling = Decimal::ONE + strategy.max_premium_percent / dec!(100);
    let clamped = multiplier.clamp(floor, ceiling);

    let recommended_price = round_currency(factors.base_price * clamped);
    let price_change = recommended_price - factors.current_price;
    let price_change_percent = price_change / factors.current_price * dec!(100);

    let now = Utc::now();

    Ok(Recommendation {
        unit_id: unit_id.to_string(),
        development_id: development_id.to_string(),
        current_price: factors.current_price,
        recommended_price,
        price_change,
        price_change_percent,
        confidence: confidence_score(factors, intelligence),
        reasoning,
        urgency: urgency_for(price_change_percent),
        valid_until: now + Duration::hours(i64::from(strategy.price_update_frequency_hours)),
        market_position: market_position(recommended_price, intelligence.average_price),
        expected_impact: expected_impact(
            price_change_percent,
            factors.current_price,
            intelligence.buyer_behavior.price_elasticity,
        ),
        generated_at: now,
    })
}

/// Reject constraint violations before any arithmetic touches them
fn validate(factors: &PricingFactors, intelligence: &MarketIntelligence) -> PricingResult<()> {
    if factors.total_inventory == 0 {
        return Err(PricingError::InvalidInput(
            "total_inventory must be greater than zero".to_string(),
        ));
    }
    if factors.inventory_level == 0 || factors.inventory_level > factors.total_inventory {
        return Err(PricingError::InvalidInput(format!(
            "inventory_level must be between 1 and total_inventory ({} of {})",
            factors.inventory_level, factors.total_inventory
        )));
    }
    if factors.current_price <= Decimal::ZERO {
        return Err(PricingError::InvalidInput(
            "current_price must be positive".to_string(),
        ));
    }
    if intelligence.average_price <= Decimal::ZERO {
        return Err(PricingError::InvalidInput(
            "average_price must be positive".to_string(),
        ));
    }
    Ok(())
}

fn scarcity_multiplier(remaining_fraction: Decimal) -> Decimal {
    SCARCITY_BANDS
        .iter()
        .find(|(threshold, _)| remaining_fraction <= *threshold)
        .map(|(_, multiplier)| *multiplier)
        .unwrap_or(Decimal::ONE)
}

/// Weighted activity score: viewings carry more signal than expressions
pub fn activity_score(viewing_activity: u32, interest_expressions: u32) -> Decimal {
    dec!(0.6) * Decimal::from(viewing_activity) + dec!(0.4) * Decimal::from(interest_expressions)
}

fn activity_multiplier(score: Decimal) -> Decimal {
    ACTIVITY_BANDS
        .iter()
        .find(|(threshold, _)| score >= *threshold)
        .map(|(_, multiplier)| *multiplier)
        .unwrap_or(ACTIVITY_FLOOR)
}

fn time_on_market_multiplier(days: u32) -> Decimal {
    TIME_ON_MARKET_BANDS
        .iter()
        .find(|(threshold, _)| days <= *threshold)
        .map(|(_, multiplier)| *multiplier)
        .unwrap_or(TIME_ON_MARKET_FLOOR)
}

/// Bonus-only confidence: base 70, additive signals, capped at 95.
/// There is deliberately no penalty floor for weak signals; downstream
/// consumers rely on 70 meaning "no corroborating signal".
fn confidence_score(factors: &PricingFactors, intelligence: &MarketIntelligence) -> u8 {
    let mut score = CONFIDENCE_BASE;
    if factors.viewing_activity >= 5 {
        score += 10;
    }
    if factors.interest_expressions >= 3 {
        score += 10;
    }
    if factors.time_on_market_days <= 30 {
        score += 5;
    }
    if intelligence.demand_to_supply_ratio > dec!(2.0) {
        score += 10;
    }
    if matches!(
        factors.demand_level,
        DemandLevel::High | DemandLevel::Critical
    ) {
        score += 5;
    }
    score.min(CONFIDENCE_CAP) as u8
}

fn urgency_for(price_change_percent: Decimal) -> Urgency {
    let magnitude = price_change_percent.abs();
    URGENCY_BANDS
        .iter()
        .find(|(threshold, _)| magnitude >= *threshold)
        .map(|(_, urgency)| *urgency)
        .unwrap_or(Urgency::Low)
}

fn market_position(recommended_price: Decimal, average_price: Decimal) -> MarketPosition {
    let ratio = recommended_price / average_price;
    MARKET_POSITION_BANDS
        .iter()
        .find(|(threshold, _)| ratio <= *threshold)
        .map(|(_, position)| *position)
        .unwrap_or(MarketPosition::Luxury)
}

fn expected_impact(
    price_change_percent: Decimal,
    current_price: Decimal,
    price_elasticity: Decimal,
) -> ExpectedImpact {
    let demand_increase_percent = (-price_change_percent * price_elasticity * dec!(0.8))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    // A price rise lowers demand; the reduction in time-to-sale bottoms
    // out at zero days rather than going negative.
    let time_to_sale_reduction_days = (demand_increase_percent * dec!(0.5))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .unwrap_or(0);

    let revenue_impact = round_currency(current_price * price_change_percent / dec!(100));

    ExpectedImpact {
        demand_increase_percent,
        time_to_sale_reduction_days,
        revenue_impact,
    }
}

fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Render a multiplier as a signed percentage adjustment, e.g. "+8%"
fn signed_pct(multiplier: Decimal) -> String {
    let pct = ((multiplier - Decimal::ONE) * dec!(100)).normalize();
    if pct.is_sign_negative() {
        format!("{}%", pct)
    } else {
        format!("+{}%", pct)
    }
}
