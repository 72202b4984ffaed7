//! Brickworth Valuation Library
//!
//! Intrinsic-value estimation for collectible retail sets from partial,
//! noisy marketplace signals: sanitization, composite scoring, bounded
//! multiplicative adjustments, hard-gate rejection, margin-of-safety
//! pricing, and multi-year projection. Pure and synchronous; every call
//! is deterministic for identical input.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod gates;
pub mod input;
pub mod money;
pub mod multipliers;
pub mod pricing;
pub mod projection;
pub mod scoring;

// Re-export commonly used types
pub use config::ValuationConfig;
pub use engine::{IntrinsicValueEngine, ValuationBreakdown};
pub use error::{Error, Result};
pub use input::{RawListing, ValuationInput};
pub use money::Cents;
