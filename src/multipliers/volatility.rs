//! Volatility multiplier
//!
//! Context-aware: for a matured retired set with a rising price trend,
//! high volatility is collector-demand noise and is not penalized. The
//! same volatility on a falling trend is distribution risk.

use serde::{Deserialize, Serialize};

use super::{Multiplier, MultiplierKind};
use crate::input::ValuationInput;

/// Volatility multiplier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolatilityConfig {
    /// Multiplies the CoV to form the discount
    #[serde(default = "default_risk_aversion")]
    pub risk_aversion: f64,
    /// Discount ceiling
    #[serde(default = "default_max_discount")]
    pub max_discount: f64,
    /// Years since retirement at which a set counts as matured
    #[serde(default = "default_maturity_years")]
    pub maturity_years: f64,
    /// CoV above which a falling matured set takes the severe penalty
    #[serde(default = "default_severe_cov")]
    pub severe_cov: f64,
}

fn default_risk_aversion() -> f64 {
    0.5
}
fn default_max_discount() -> f64 {
    0.15
}
fn default_maturity_years() -> f64 {
    2.0
}
fn default_severe_cov() -> f64 {
    0.30
}

impl Default for VolatilityConfig {
    fn default() -> Self {
        Self {
            risk_aversion: default_risk_aversion(),
            max_discount: default_max_discount(),
            maturity_years: default_maturity_years(),
            severe_cov: default_severe_cov(),
        }
    }
}

/// Volatility multiplier, 0.85x-1.00x
pub fn volatility_multiplier(config: &VolatilityConfig, input: &ValuationInput) -> Multiplier {
    let Some(volatility) = input.price_volatility else {
        return Multiplier::neutral(MultiplierKind::Volatility, "no volatility data");
    };

    let matured = input.is_retired()
        && input
            .years_post_retirement
            .is_some_and(|y| y >= config.maturity_years);

    if matured {
        match input.price_trend_pct {
            Some(trend) if trend > 0.0 => {
                // Rising matured set: churn is collectors competing, not risk
                return Multiplier::new(
                    MultiplierKind::Volatility,
                    1.0,
                    "collector_churn",
                    format!("CoV {volatility:.2} on rising matured set, not penalized"),
                );
            }
            Some(trend) if trend < 0.0 => {
                let (value, tier) = if volatility > config.severe_cov {
                    (0.85, "distribution_risk")
                } else {
                    (0.95, "soft_decline")
                };
                return Multiplier::new(
                    MultiplierKind::Volatility,
                    value,
                    tier,
                    format!("CoV {volatility:.2} on falling matured set"),
                );
            }
            _ => {} // flat or unknown trend falls through to the generic rule
        }
    }

    let discount = (volatility * config.risk_aversion).min(config.max_discount);
    Multiplier::new(
        MultiplierKind::Volatility,
        1.0 - discount,
        "risk_discount",
        format!("CoV {volatility:.2}, discount {:.1}%", discount * 100.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::RetirementStatus;

    fn config() -> VolatilityConfig {
        VolatilityConfig::default()
    }

    fn matured(volatility: f64, trend: Option<f64>) -> ValuationInput {
        let mut input =
            ValuationInput::default().with_retirement(RetirementStatus::Retired, 4.0);
        input.price_volatility = Some(volatility);
        input.price_trend_pct = trend;
        input
    }

    #[test]
    fn test_rising_matured_not_penalized() {
        let m = volatility_multiplier(&config(), &matured(0.45, Some(6.0)));
        assert_eq!(m.value, 1.0);
        assert_eq!(m.tier, "collector_churn");
    }

    #[test]
    fn test_falling_matured_scaled_by_severity() {
        let m = volatility_multiplier(&config(), &matured(0.45, Some(-6.0)));
        assert_eq!(m.value, 0.85);

        let m = volatility_multiplier(&config(), &matured(0.20, Some(-6.0)));
        assert_eq!(m.value, 0.95);
    }

    #[test]
    fn test_active_set_generic_discount() {
        let mut input = ValuationInput::default();
        input.retirement = Some(RetirementStatus::Active);
        input.price_volatility = Some(0.2);
        input.price_trend_pct = Some(5.0);
        let m = volatility_multiplier(&config(), &input);
        // 1 - 0.2 * 0.5 = 0.90
        assert!((m.value - 0.90).abs() < 1e-9);
    }

    #[test]
    fn test_generic_discount_capped() {
        let mut input = ValuationInput::default();
        input.price_volatility = Some(2.0);
        let m = volatility_multiplier(&config(), &input);
        assert_eq!(m.value, 0.85);
    }

    #[test]
    fn test_matured_without_trend_uses_generic_rule() {
        let m = volatility_multiplier(&config(), &matured(0.1, None));
        assert!((m.value - 0.95).abs() < 1e-9);
        assert_eq!(m.tier, "risk_discount");
    }

    #[test]
    fn test_no_data_is_neutral() {
        let m = volatility_multiplier(&config(), &ValuationInput::default());
        assert_eq!(m.value, 1.0);
        assert!(!m.applied);
    }

    #[test]
    fn test_range_never_exceeded() {
        for cov in [0.0, 0.1, 0.3, 0.5, 1.0, 5.0] {
            for trend in [Some(10.0), Some(-10.0), Some(0.0), None] {
                let v = volatility_multiplier(&config(), &matured(cov, trend)).value;
                assert!((0.85..=1.00).contains(&v), "cov {cov} trend {trend:?} gave {v}");
            }
        }
    }
}
