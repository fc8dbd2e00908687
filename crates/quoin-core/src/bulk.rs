//! Batch-level demand estimation and per-unit location premiums
//!
//! Bulk computation scores every unit of a development in one pass. The
//! demand level is estimated once for the whole batch from aggregate
//! activity, and each unit's location premium is derived from the euro
//! value buyers place on its features.

use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::{PricingError, PricingResult};
use crate::models::{DemandLevel, UnitSummary};

/// Descending average-activity bands for the batch demand level
const BATCH_DEMAND_BANDS: [(Decimal, DemandLevel); 3] = [
    (dec!(20), DemandLevel::Critical),
    (dec!(15), DemandLevel::High),
    (dec!(8), DemandLevel::Medium),
];

/// Each feature contributes its buyer value divided by this
const FEATURE_VALUE_DIVISOR: Decimal = dec!(500000);

const LOCATION_PREMIUM_MIN: Decimal = dec!(0.9);
const LOCATION_PREMIUM_MAX: Decimal = dec!(1.3);

/// Estimate a single demand level for a whole batch of units from the
/// average of viewings plus expressions of interest.
///
/// Fails with `InvalidInput` on an empty batch: the average is undefined
/// and must not silently divide by zero.
pub fn batch_demand_level(units: &[UnitSummary]) -> PricingResult<DemandLevel> {
    if units.is_empty() {
        return Err(PricingError::InvalidInput(
            "units must not be empty for bulk computation".to_string(),
        ));
    }

    let total: u32 = units
        .iter()
        .map(|unit| unit.viewing_activity + unit.interest_expressions)
        .sum();
    let average = Decimal::from(total) / Decimal::from(units.len() as u32);

    Ok(BATCH_DEMAND_BANDS
        .iter()
        .find(|(threshold, _)| average >= *threshold)
        .map(|(_, level)| *level)
        .unwrap_or(DemandLevel::Low))
}

/// Derive a unit's location-premium multiplier from its features.
///
/// Starts at 1.0, adds `value / 500000` for each feature the intelligence
/// snapshot prices, and clamps to the [0.9, 1.3] range the engine accepts.
pub fn location_premium(
    features: &[String],
    feature_value_map: &HashMap<String, Decimal>,
) -> Decimal {
    let mut premium = Decimal::ONE;
    for feature in features {
        if let Some(value) = feature_value_map.get(feature) {
            premium += value / FEATURE_VALUE_DIVISOR;
        }
    }
    premium.clamp(LOCATION_PREMIUM_MIN, LOCATION_PREMIUM_MAX)
}
