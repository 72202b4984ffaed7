//! Saturation multiplier
//!
//! How long the current listed supply would take to clear at the observed
//! sales rate. Deep gluts halve the value; a market down to weeks of
//! inventory earns a small premium. Without a velocity reading the
//! absolute quantity and seller-count tiers stand in.

use serde::{Deserialize, Serialize};

use super::{interpolate, months_of_inventory, Multiplier, MultiplierKind};
use crate::input::ValuationInput;

/// Saturation multiplier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaturationConfig {
    /// Months of inventory above which the dead-stock floor applies
    #[serde(default = "default_dead_months")]
    pub dead_months: f64,
    /// Floor value for a dead market
    #[serde(default = "default_floor")]
    pub floor: f64,
    /// Ceiling value for a tight market
    #[serde(default = "default_ceiling")]
    pub ceiling: f64,
}

fn default_dead_months() -> f64 {
    24.0
}
fn default_floor() -> f64 {
    0.50
}
fn default_ceiling() -> f64 {
    1.05
}

impl Default for SaturationConfig {
    fn default() -> Self {
        Self {
            dead_months: default_dead_months(),
            floor: default_floor(),
            ceiling: default_ceiling(),
        }
    }
}

/// Tier score for absolute available quantity, 0-100, higher = scarcer
pub(crate) fn quantity_tier_score(quantity: u32) -> f64 {
    match quantity {
        0..=10 => 100.0,
        11..=50 => 80.0,
        51..=200 => 60.0,
        201..=1000 => 40.0,
        1001..=5000 => 20.0,
        _ => 0.0,
    }
}

/// Tier score for competing seller count, 0-100, higher = scarcer
pub(crate) fn seller_tier_score(listings: u32) -> f64 {
    match listings {
        0..=5 => 100.0,
        6..=20 => 80.0,
        21..=50 => 60.0,
        51..=100 => 40.0,
        101..=250 => 20.0,
        _ => 0.0,
    }
}

/// Saturation multiplier, 0.50x-1.05x
pub fn saturation_multiplier(config: &SaturationConfig, input: &ValuationInput) -> Multiplier {
    if let Some(moi) = months_of_inventory(input.available_quantity, input.sales_velocity) {
        let (value, tier) = if moi > config.dead_months {
            (config.floor, "dead")
        } else if moi > 12.0 {
            (
                interpolate(moi, 12.0, config.dead_months, 1.00, config.floor),
                "glut",
            )
        } else if moi > 3.0 {
            (1.00, "balanced")
        } else if moi > 1.0 {
            (interpolate(moi, 1.0, 3.0, config.ceiling, 1.00), "tightening")
        } else {
            (config.ceiling, "scarce")
        };

        return Multiplier::new(
            MultiplierKind::Saturation,
            value,
            tier,
            format!("{moi:.1} months of inventory"),
        );
    }

    // Fallback: tier scores from absolute quantity (weight 0.4) and seller
    // count (weight 0.3), renormalized over whichever are present
    let quantity = input.available_quantity.map(quantity_tier_score);
    let sellers = input.listing_count.map(seller_tier_score);
    let (sum, weight) = match (quantity, sellers) {
        (Some(q), Some(s)) => (q * 0.4 + s * 0.3, 0.7),
        (Some(q), None) => (q * 0.4, 0.4),
        (None, Some(s)) => (s * 0.3, 0.3),
        (None, None) => {
            return Multiplier::neutral(MultiplierKind::Saturation, "no supply data");
        }
    };
    let scarcity_score = sum / weight; // 0-100
    let value = config.floor + scarcity_score / 100.0 * (config.ceiling - config.floor);

    Multiplier::new(
        MultiplierKind::Saturation,
        value,
        "fallback_tiers",
        format!("no velocity; supply tier score {scarcity_score:.0}/100"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SaturationConfig {
        SaturationConfig::default()
    }

    fn with_supply(quantity: u32, velocity: f64) -> ValuationInput {
        let mut input = ValuationInput::default();
        input.available_quantity = Some(quantity);
        input.sales_velocity = Some(velocity);
        input
    }

    #[test]
    fn test_dead_inventory_floor() {
        // 3000 units at 1/day = 100 months of inventory
        let m = saturation_multiplier(&config(), &with_supply(3000, 1.0));
        assert_eq!(m.value, 0.50);
        assert_eq!(m.tier, "dead");
    }

    #[test]
    fn test_glut_interpolates() {
        // 18 months: midway between 12 (1.00) and 24 (0.50)
        let m = saturation_multiplier(&config(), &with_supply(540, 1.0));
        assert!((m.value - 0.75).abs() < 1e-9, "got {}", m.value);
        assert_eq!(m.tier, "glut");
    }

    #[test]
    fn test_balanced_is_neutral() {
        // 6 months of inventory
        let m = saturation_multiplier(&config(), &with_supply(180, 1.0));
        assert_eq!(m.value, 1.00);
        assert!(!m.applied);
    }

    #[test]
    fn test_tight_market_premium() {
        // 0.5 months
        let m = saturation_multiplier(&config(), &with_supply(15, 1.0));
        assert_eq!(m.value, 1.05);
        assert_eq!(m.tier, "scarce");

        // 2 months: midway between 1 (1.05) and 3 (1.00)
        let m = saturation_multiplier(&config(), &with_supply(60, 1.0));
        assert!((m.value - 1.025).abs() < 1e-9);
    }

    #[test]
    fn test_fallback_uses_quantity_and_sellers() {
        let mut input = ValuationInput::default();
        input.available_quantity = Some(8); // tier 100
        input.listing_count = Some(3); // tier 100
        let m = saturation_multiplier(&config(), &input);
        assert!((m.value - 1.05).abs() < 1e-9);
        assert_eq!(m.tier, "fallback_tiers");

        input.available_quantity = Some(20_000); // tier 0
        input.listing_count = Some(1000); // tier 0
        let m = saturation_multiplier(&config(), &input);
        assert!((m.value - 0.50).abs() < 1e-9);
    }

    #[test]
    fn test_fallback_single_signal() {
        let mut input = ValuationInput::default();
        input.listing_count = Some(3); // tier 100 alone
        let m = saturation_multiplier(&config(), &input);
        assert!((m.value - 1.05).abs() < 1e-9);
    }

    #[test]
    fn test_no_data_is_neutral() {
        let m = saturation_multiplier(&config(), &ValuationInput::default());
        assert_eq!(m.value, 1.0);
        assert!(!m.applied);
    }

    #[test]
    fn test_range_never_exceeded() {
        for qty in [0, 10, 100, 1000, 50_000] {
            for vel in [0.01, 0.1, 1.0, 10.0] {
                let v = saturation_multiplier(&config(), &with_supply(qty, vel)).value;
                assert!((0.50..=1.05).contains(&v), "qty {qty} vel {vel} gave {v}");
            }
        }
    }
}
