//! Liquidity multiplier
//!
//! How quickly a position could actually be exited. Prefers the measured
//! sales velocity and falls back to the average gap between sales; the
//! five-tier ladder is linearly interpolated between tier boundaries so a
//! set at 0.09 units/day is not priced like one at 0.04.

use serde::{Deserialize, Serialize};

use super::{interpolate, Multiplier, MultiplierKind};
use crate::input::ValuationInput;

/// Liquidity multiplier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidityConfig {
    /// Value used when neither velocity nor sale-interval data exists
    #[serde(default = "default_no_data_value")]
    pub no_data_value: f64,
}

fn default_no_data_value() -> f64 {
    1.0
}

impl Default for LiquidityConfig {
    fn default() -> Self {
        Self {
            no_data_value: default_no_data_value(),
        }
    }
}

// Tier boundaries in units/day
const DEAD_MAX: f64 = 0.01; // one sale per 100 days
const LOW_MAX: f64 = 1.0 / 30.0; // one sale per month
const MEDIUM_MAX: f64 = 0.1;
const MEDIUM_HIGH_MAX: f64 = 1.0 / 3.0;
const HIGH_MAX: f64 = 0.5;

/// Liquidity multiplier, 0.60x-1.10x
pub fn liquidity_multiplier(config: &LiquidityConfig, input: &ValuationInput) -> Multiplier {
    let velocity = input
        .sales_velocity
        .or_else(|| input.avg_days_between_sales.map(|days| 1.0 / days));

    let Some(velocity) = velocity else {
        return Multiplier::new(
            MultiplierKind::Liquidity,
            config.no_data_value,
            "no_data",
            "no velocity or sale-interval data",
        );
    };

    let (value, tier) = if velocity < DEAD_MAX {
        (0.60, "dead")
    } else if velocity < LOW_MAX {
        (interpolate(velocity, DEAD_MAX, LOW_MAX, 0.60, 0.80), "low")
    } else if velocity < MEDIUM_MAX {
        (
            interpolate(velocity, LOW_MAX, MEDIUM_MAX, 0.80, 0.95),
            "medium",
        )
    } else if velocity < MEDIUM_HIGH_MAX {
        (
            interpolate(velocity, MEDIUM_MAX, MEDIUM_HIGH_MAX, 0.95, 1.05),
            "medium_high",
        )
    } else if velocity < HIGH_MAX {
        (
            interpolate(velocity, MEDIUM_HIGH_MAX, HIGH_MAX, 1.05, 1.10),
            "high",
        )
    } else {
        (1.10, "high")
    };

    Multiplier::new(
        MultiplierKind::Liquidity,
        value,
        tier,
        format!("{velocity:.3} units/day"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_velocity(v: f64) -> ValuationInput {
        let mut input = ValuationInput::default();
        input.sales_velocity = Some(v);
        input
    }

    fn config() -> LiquidityConfig {
        LiquidityConfig::default()
    }

    #[test]
    fn test_dead_floor() {
        let m = liquidity_multiplier(&config(), &with_velocity(0.001));
        assert_eq!(m.value, 0.60);
        assert_eq!(m.tier, "dead");
    }

    #[test]
    fn test_high_ceiling() {
        let m = liquidity_multiplier(&config(), &with_velocity(2.0));
        assert_eq!(m.value, 1.10);
    }

    #[test]
    fn test_interpolation_within_tier() {
        // Midpoint of the medium tier [1/30, 0.1) maps to the value midpoint
        let mid = (LOW_MAX + MEDIUM_MAX) / 2.0;
        let m = liquidity_multiplier(&config(), &with_velocity(mid));
        assert!((m.value - 0.875).abs() < 1e-9, "got {}", m.value);
        assert_eq!(m.tier, "medium");
    }

    #[test]
    fn test_monotonic_in_velocity() {
        let velocities = [0.005, 0.02, 0.05, 0.09, 0.2, 0.4, 0.6];
        let values: Vec<f64> = velocities
            .iter()
            .map(|&v| liquidity_multiplier(&config(), &with_velocity(v)).value)
            .collect();
        for pair in values.windows(2) {
            assert!(pair[0] <= pair[1], "not monotonic: {values:?}");
        }
    }

    #[test]
    fn test_fallback_to_sale_interval() {
        let mut input = ValuationInput::default();
        input.avg_days_between_sales = Some(2.0); // 0.5/day
        let m = liquidity_multiplier(&config(), &input);
        assert_eq!(m.value, 1.10);
        assert_eq!(m.tier, "high");
    }

    #[test]
    fn test_velocity_preferred_over_interval() {
        let mut input = ValuationInput::default();
        input.sales_velocity = Some(0.001);
        input.avg_days_between_sales = Some(1.0);
        let m = liquidity_multiplier(&config(), &input);
        assert_eq!(m.tier, "dead");
    }

    #[test]
    fn test_no_data_uses_configured_default() {
        let m = liquidity_multiplier(&config(), &ValuationInput::default());
        assert_eq!(m.value, 1.0);
        assert!(!m.applied);

        let cautious = LiquidityConfig { no_data_value: 0.90 };
        let m = liquidity_multiplier(&cautious, &ValuationInput::default());
        assert_eq!(m.value, 0.90);
    }

    #[test]
    fn test_range_never_exceeded() {
        for v in [0.0, 0.0099, 0.01, 0.033, 0.0999, 0.1, 0.33, 0.49, 0.5, 10.0] {
            let value = liquidity_multiplier(&config(), &with_velocity(v)).value;
            assert!((0.60..=1.10).contains(&value), "velocity {v} gave {value}");
        }
    }
}
