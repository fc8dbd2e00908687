//! Error types for the pricing computation

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PricingError {
    #[error("No market intelligence configured for development: {0}")]
    IntelligenceNotFound(String),

    #[error("No pricing strategy configured for development: {0}")]
    StrategyNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type PricingResult<T> = Result<T, PricingError>;
