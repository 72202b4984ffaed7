//! True scarcity multiplier
//!
//! Reads the same months-of-inventory signal as saturation but maps it to
//! a premium scale: saturation discounts oversupply, scarcity rewards
//! genuine supply-vs-demand tightness. Both may apply; whether they do is
//! an engine configuration choice.

use serde::{Deserialize, Serialize};

use super::saturation::{quantity_tier_score, seller_tier_score};
use super::{months_of_inventory, Multiplier, MultiplierKind};
use crate::input::ValuationInput;

/// Scarcity multiplier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScarcityConfig {
    /// Floor for heavily oversupplied markets
    #[serde(default = "default_floor")]
    pub floor: f64,
    /// Ceiling for markets down to under a month of supply
    #[serde(default = "default_ceiling")]
    pub ceiling: f64,
}

fn default_floor() -> f64 {
    0.95
}
fn default_ceiling() -> f64 {
    1.10
}

impl Default for ScarcityConfig {
    fn default() -> Self {
        Self {
            floor: default_floor(),
            ceiling: default_ceiling(),
        }
    }
}

/// Scarcity multiplier, 0.95x-1.10x
pub fn scarcity_multiplier(config: &ScarcityConfig, input: &ValuationInput) -> Multiplier {
    if let Some(moi) = months_of_inventory(input.available_quantity, input.sales_velocity) {
        let (value, tier) = if moi <= 1.0 {
            (config.ceiling, "exhausting")
        } else if moi <= 3.0 {
            (1.05, "tight")
        } else if moi <= 12.0 {
            (1.00, "balanced")
        } else if moi <= 24.0 {
            (0.98, "loose")
        } else {
            (config.floor, "oversupplied")
        };

        return Multiplier::new(
            MultiplierKind::Scarcity,
            value,
            tier,
            format!("{moi:.1} months of inventory"),
        );
    }

    // Fallback: plain average of whichever tier scores are present
    let scores: Vec<f64> = [
        input.available_quantity.map(quantity_tier_score),
        input.listing_count.map(seller_tier_score),
    ]
    .into_iter()
    .flatten()
    .collect();

    if scores.is_empty() {
        return Multiplier::neutral(MultiplierKind::Scarcity, "no supply data");
    }

    let avg = scores.iter().sum::<f64>() / scores.len() as f64;
    let value = config.floor + avg / 100.0 * (config.ceiling - config.floor);

    Multiplier::new(
        MultiplierKind::Scarcity,
        value,
        "fallback_tiers",
        format!("no velocity; supply tier score {avg:.0}/100"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ScarcityConfig {
        ScarcityConfig::default()
    }

    fn with_supply(quantity: u32, velocity: f64) -> ValuationInput {
        let mut input = ValuationInput::default();
        input.available_quantity = Some(quantity);
        input.sales_velocity = Some(velocity);
        input
    }

    #[test]
    fn test_premium_ladder() {
        // 0.5 months
        assert_eq!(scarcity_multiplier(&config(), &with_supply(15, 1.0)).value, 1.10);
        // 2 months
        assert_eq!(scarcity_multiplier(&config(), &with_supply(60, 1.0)).value, 1.05);
        // 6 months
        assert_eq!(scarcity_multiplier(&config(), &with_supply(180, 1.0)).value, 1.00);
        // 18 months
        assert_eq!(scarcity_multiplier(&config(), &with_supply(540, 1.0)).value, 0.98);
        // 100 months
        assert_eq!(scarcity_multiplier(&config(), &with_supply(3000, 1.0)).value, 0.95);
    }

    #[test]
    fn test_premium_scale_distinct_from_saturation() {
        use crate::multipliers::saturation::{saturation_multiplier, SaturationConfig};
        // Same glutted input: saturation punishes hard, scarcity barely
        let input = with_supply(3000, 1.0);
        let sat = saturation_multiplier(&SaturationConfig::default(), &input);
        let scar = scarcity_multiplier(&config(), &input);
        assert_eq!(sat.value, 0.50);
        assert_eq!(scar.value, 0.95);
    }

    #[test]
    fn test_fallback_averages_tiers() {
        let mut input = ValuationInput::default();
        input.available_quantity = Some(8); // tier 100
        input.listing_count = Some(150); // tier 20
        let m = scarcity_multiplier(&config(), &input);
        // avg 60 -> 0.95 + 0.6 * 0.15 = 1.04
        assert!((m.value - 1.04).abs() < 1e-9, "got {}", m.value);
    }

    #[test]
    fn test_no_data_is_neutral() {
        let m = scarcity_multiplier(&config(), &ValuationInput::default());
        assert_eq!(m.value, 1.0);
        assert!(!m.applied);
    }

    #[test]
    fn test_range_never_exceeded() {
        for qty in [0, 50, 500, 50_000] {
            for vel in [0.01, 0.5, 5.0] {
                let v = scarcity_multiplier(&config(), &with_supply(qty, vel)).value;
                assert!((0.95..=1.10).contains(&v), "qty {qty} vel {vel} gave {v}");
            }
        }
    }
}
