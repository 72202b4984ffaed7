//! Multiplier library
//!
//! Pure, independently testable adjustment functions. Each produces a
//! bounded scalar with a tier label and an explanation; the engine
//! compounds them onto the base value. Every "no data" branch returns the
//! multiplier's neutral identity - never null, never an error.

pub mod dead_stock;
pub mod liquidity;
pub mod ppd;
pub mod retirement;
pub mod saturation;
pub mod scarcity;
pub mod theme;
pub mod volatility;

use serde::{Deserialize, Serialize};

/// Which adjustment produced a multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiplierKind {
    Retirement,
    Theme,
    PartsPerDollar,
    Liquidity,
    Volatility,
    Saturation,
    Scarcity,
    DeadStock,
}

impl MultiplierKind {
    /// Documented output range for this multiplier
    pub fn range(&self) -> (f64, f64) {
        match self {
            MultiplierKind::Retirement => (0.95, 2.00),
            MultiplierKind::Theme => (0.70, 1.40),
            MultiplierKind::PartsPerDollar => (0.95, 1.10),
            MultiplierKind::Liquidity => (0.60, 1.10),
            MultiplierKind::Volatility => (0.85, 1.00),
            MultiplierKind::Saturation => (0.50, 1.05),
            MultiplierKind::Scarcity => (0.95, 1.10),
            MultiplierKind::DeadStock => (0.15, 1.00),
        }
    }
}

impl std::fmt::Display for MultiplierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MultiplierKind::Retirement => "retirement",
            MultiplierKind::Theme => "theme",
            MultiplierKind::PartsPerDollar => "parts_per_dollar",
            MultiplierKind::Liquidity => "liquidity",
            MultiplierKind::Volatility => "volatility",
            MultiplierKind::Saturation => "saturation",
            MultiplierKind::Scarcity => "scarcity",
            MultiplierKind::DeadStock => "dead_stock",
        };
        write!(f, "{name}")
    }
}

/// A bounded scalar adjustment with its audit trail
#[derive(Debug, Clone, Serialize)]
pub struct Multiplier {
    pub kind: MultiplierKind,
    pub value: f64,
    /// Tier label, e.g. "j_curve_mature" or "dead"
    pub tier: &'static str,
    /// Human-readable basis
    pub note: String,
    /// True when the value differs from the neutral identity
    pub applied: bool,
}

impl Multiplier {
    /// Build a multiplier, clamping into the kind's documented range
    ///
    /// The clamp is a belt over the ladder logic: interpolation bugs must
    /// not leak values outside the documented contract.
    pub fn new(kind: MultiplierKind, value: f64, tier: &'static str, note: impl Into<String>) -> Self {
        let (min, max) = kind.range();
        let value = if value.is_finite() {
            value.clamp(min, max)
        } else {
            1.0
        };
        Self {
            kind,
            value,
            tier,
            note: note.into(),
            applied: (value - 1.0).abs() > 1e-9,
        }
    }

    /// Neutral identity for a kind
    pub fn neutral(kind: MultiplierKind, note: impl Into<String>) -> Self {
        Self {
            kind,
            value: 1.0,
            tier: "neutral",
            note: note.into(),
            applied: false,
        }
    }
}

/// Months of inventory: available quantity over monthly sales rate
///
/// The core scarcity/saturation signal. None when velocity is absent or
/// zero (a zero rate makes the signal undefined, not infinite-and-dead;
/// dead inventory is handled by the zero-sales penalty and hard gates).
pub fn months_of_inventory(available_quantity: Option<u32>, sales_velocity: Option<f64>) -> Option<f64> {
    let quantity = available_quantity?;
    let velocity = sales_velocity?;
    if velocity <= 0.0 {
        return None;
    }
    Some(quantity as f64 / (velocity * 30.0))
}

/// Linear interpolation of `value` from [lo, hi] onto [from, to]
pub(crate) fn interpolate(value: f64, lo: f64, hi: f64, from: f64, to: f64) -> f64 {
    if hi <= lo {
        return from;
    }
    let t = ((value - lo) / (hi - lo)).clamp(0.0, 1.0);
    from + t * (to - from)
}
