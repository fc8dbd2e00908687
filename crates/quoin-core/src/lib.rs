//! # Quoin Core
//!
//! Domain models and the pure pricing computation for Quoin, a dynamic
//! pricing recommendation engine for residential development inventory.
//!
//! This crate has no runtime or I/O concerns: given pricing factors, a
//! market intelligence snapshot, and a strategy, it derives a single
//! immutable recommendation. The stateful engine lives in `quoin-engine`.

pub mod bulk;
pub mod error;
pub mod models;
pub mod recommendation;

pub use error::*;
pub use models::*;
pub use recommendation::build_recommendation;
