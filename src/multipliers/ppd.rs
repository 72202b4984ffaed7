//! Parts-per-dollar multiplier
//!
//! Value density relative to reference price. A narrow band: density is a
//! quality proxy, not a price driver.

use super::{Multiplier, MultiplierKind};
use crate::input::ValuationInput;
use crate::money::Cents;
use crate::scoring::quality::parts_per_dollar;

/// PPD multiplier, 0.95x-1.10x
pub fn ppd_multiplier(input: &ValuationInput) -> Multiplier {
    let price: Option<Cents> = input.msrp.or(input.current_retail);
    let (Some(parts), Some(price)) = (input.parts_count, price) else {
        return Multiplier::neutral(MultiplierKind::PartsPerDollar, "no parts or price data");
    };
    let Some(ppd) = parts_per_dollar(parts, price) else {
        return Multiplier::neutral(MultiplierKind::PartsPerDollar, "no parts or price data");
    };

    let (value, tier) = if ppd >= 12.0 {
        (1.10, "excellent")
    } else if ppd >= 8.0 {
        (1.05, "good")
    } else if ppd >= 4.0 {
        (1.00, "fair")
    } else {
        (0.95, "poor")
    };

    Multiplier::new(
        MultiplierKind::PartsPerDollar,
        value,
        tier,
        format!("{ppd:.1} parts per dollar"),
    )
}
