//! Branded currency type in integer minor units
//!
//! All prices flow through [`Cents`]. Construction validates, arithmetic is
//! closed over the type, and conversion to major units is explicit and
//! read-only. This keeps dollars and cents from ever being mixed silently.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A non-negative amount of money in minor currency units (cents)
///
/// Serializes as a bare integer so wire formats stay flat.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Cents(u64);

impl Cents {
    /// Zero cents
    pub const ZERO: Cents = Cents(0);

    /// Create from a raw minor-unit count
    pub const fn new(minor_units: u64) -> Self {
        Cents(minor_units)
    }

    /// Create from a possibly-negative or fractional raw value
    ///
    /// Fails on negatives and non-finite values. This is the entry point
    /// for caller-supplied numbers; business-data bounds checking happens
    /// in the sanitizer, not here.
    pub fn try_from_f64(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(Error::InvalidAmount(format!("non-finite value {value}")));
        }
        if value < 0.0 {
            return Err(Error::InvalidAmount(format!("negative amount {value}")));
        }
        Ok(Cents(value.round() as u64))
    }

    /// Create from major units (e.g. dollars)
    pub fn from_major(major: f64) -> Result<Self> {
        Self::try_from_f64(major * 100.0)
    }

    /// Raw minor-unit count
    pub const fn minor_units(&self) -> u64 {
        self.0
    }

    /// Value in major units, for ratio math only
    pub fn as_major(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Whether this amount is zero
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition
    pub fn checked_add(&self, other: Cents) -> Option<Cents> {
        self.0.checked_add(other.0).map(Cents)
    }

    /// Subtraction floored at zero
    pub fn saturating_sub(&self, other: Cents) -> Cents {
        Cents(self.0.saturating_sub(other.0))
    }

    /// Multiply by a non-negative scalar, rounding to the nearest cent
    ///
    /// Negative or non-finite factors collapse to zero rather than
    /// propagating garbage into downstream totals.
    pub fn mul_f64(&self, factor: f64) -> Cents {
        if !factor.is_finite() || factor <= 0.0 {
            return Cents::ZERO;
        }
        let product = self.0 as f64 * factor;
        if !product.is_finite() {
            return Cents::ZERO;
        }
        Cents(product.round() as u64)
    }

    /// Take a percentage of this amount (e.g. `percentage(11.0)` = 11%)
    pub fn percentage(&self, pct: f64) -> Cents {
        self.mul_f64(pct / 100.0)
    }

    /// Ratio of this amount to another, 0.0 when the denominator is zero
    pub fn ratio_to(&self, other: Cents) -> f64 {
        if other.is_zero() {
            return 0.0;
        }
        self.0 as f64 / other.0 as f64
    }
}

impl std::fmt::Display for Cents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl std::iter::Sum for Cents {
    fn sum<I: Iterator<Item = Cents>>(iter: I) -> Self {
        iter.fold(Cents::ZERO, |acc, c| {
            acc.checked_add(c).unwrap_or(Cents(u64::MAX))
        })
    }
}
