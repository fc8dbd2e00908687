//! Application configuration
//!
//! Defaults are all in code; `config/default` and `config/local` files
//! and `QUOIN__`-prefixed environment variables override them.

use config::{Config, ConfigError, Environment, File};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;

use quoin_core::{PricingStrategy, StrategyKind};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub strategy_defaults: StrategyDefaults,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    /// Seasonality factor applied to every unit of a bulk pass
    pub bulk_seasonality_factor: f64,
}

/// Strategy seeded when a development is provisioned without explicit
/// bounds. Applied at provisioning time only; compute paths still fail
/// for unprovisioned developments.
#[derive(Debug, Deserialize, Clone)]
pub struct StrategyDefaults {
    pub kind: StrategyKind,
    pub target_margin_percent: f64,
    pub max_discount_percent: f64,
    pub max_premium_percent: f64,
    pub price_update_frequency_hours: u32,
}

impl EngineConfig {
    pub fn bulk_seasonality(&self) -> Decimal {
        Decimal::from_f64(self.bulk_seasonality_factor).unwrap_or(Decimal::ONE)
    }
}

impl StrategyDefaults {
    pub fn to_strategy(&self) -> PricingStrategy {
        PricingStrategy {
            kind: self.kind,
            target_margin_percent: Decimal::from_f64(self.target_margin_percent)
                .unwrap_or_default(),
            max_discount_percent: Decimal::from_f64(self.max_discount_percent)
                .unwrap_or_default(),
            max_premium_percent: Decimal::from_f64(self.max_premium_percent)
                .unwrap_or_default(),
            price_update_frequency_hours: self.price_update_frequency_hours,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Engine defaults
            .set_default("engine.bulk_seasonality_factor", 1.0)?
            // Strategy defaults
            .set_default("strategy_defaults.kind", "balanced")?
            .set_default("strategy_defaults.target_margin_percent", 15.0)?
            .set_default("strategy_defaults.max_discount_percent", 10.0)?
            .set_default("strategy_defaults.max_premium_percent", 15.0)?
            .set_default("strategy_defaults.price_update_frequency_hours", 24)?
            // Load from config files if they exist
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables
            // QUOIN__ENGINE__BULK_SEASONALITY_FACTOR, etc.
            .add_source(
                Environment::with_prefix("QUOIN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
