//! Retirement timing multiplier
//!
//! The J-curve: a freshly retired set dips below retail while the market
//! digests leftover stock, then appreciates as supply dries up. The premium
//! is demand-gated - age alone earns nothing if nobody is buying.

use serde::{Deserialize, Serialize};

use super::{Multiplier, MultiplierKind};
use crate::input::RetirementStatus;

/// Which retirement curve to apply
///
/// `Flat` reproduces the legacy behavior of a single post-retirement
/// premium with no age structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetirementCurve {
    #[default]
    JCurve,
    Flat,
}

/// Retirement multiplier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetirementConfig {
    #[serde(default)]
    pub curve: RetirementCurve,
    /// Raw demand score below which any premium is capped
    #[serde(default = "default_demand_gate")]
    pub demand_gate: f64,
    /// Premium cap under the demand gate
    #[serde(default = "default_low_demand_cap")]
    pub low_demand_cap: f64,
    /// Premium for sets announced as retiring soon
    #[serde(default = "default_retiring_soon_premium")]
    pub retiring_soon_premium: f64,
    /// Legacy flat premium for retired sets
    #[serde(default = "default_flat_premium")]
    pub flat_premium: f64,
}

fn default_demand_gate() -> f64 {
    40.0
}
fn default_low_demand_cap() -> f64 {
    1.02
}
fn default_retiring_soon_premium() -> f64 {
    1.08
}
fn default_flat_premium() -> f64 {
    1.15
}

impl Default for RetirementConfig {
    fn default() -> Self {
        Self {
            curve: RetirementCurve::default(),
            demand_gate: default_demand_gate(),
            low_demand_cap: default_low_demand_cap(),
            retiring_soon_premium: default_retiring_soon_premium(),
            flat_premium: default_flat_premium(),
        }
    }
}

/// J-curve value for a retired set by years since retirement
fn j_curve(years: f64) -> (f64, &'static str) {
    if years < 1.0 {
        (0.95, "j_curve_flooded")
    } else if years < 2.0 {
        (1.00, "j_curve_settling")
    } else if years < 5.0 {
        (1.15, "j_curve_appreciating")
    } else if years < 10.0 {
        (1.40, "j_curve_mature")
    } else {
        (2.00, "j_curve_vintage")
    }
}

/// Retirement timing multiplier, 0.95x-2.00x
///
/// `raw_demand` is the ungated demand score; the gate boundary is exact,
/// not interpolated: demand 39.99 is capped, demand 40.0 is not.
pub fn retirement_multiplier(
    config: &RetirementConfig,
    status: Option<RetirementStatus>,
    years_post_retirement: Option<f64>,
    raw_demand: f64,
) -> Multiplier {
    let Some(status) = status else {
        return Multiplier::neutral(MultiplierKind::Retirement, "no retirement data");
    };

    let gated = raw_demand < config.demand_gate;
    let cap = |value: f64, tier: &'static str, note: String| {
        if gated && value > config.low_demand_cap {
            Multiplier::new(
                MultiplierKind::Retirement,
                config.low_demand_cap,
                "demand_gated",
                format!("{note}; premium capped, demand {raw_demand:.0} below gate"),
            )
        } else {
            Multiplier::new(MultiplierKind::Retirement, value, tier, note)
        }
    };

    match status {
        RetirementStatus::Active => {
            Multiplier::new(MultiplierKind::Retirement, 1.0, "active", "still in production")
        }
        RetirementStatus::RetiringSoon => cap(
            config.retiring_soon_premium,
            "retiring_soon",
            "announced end of life".to_string(),
        ),
        RetirementStatus::Retired => {
            let Some(years) = years_post_retirement else {
                return Multiplier::neutral(
                    MultiplierKind::Retirement,
                    "retired, age unknown",
                );
            };
            match config.curve {
                RetirementCurve::JCurve => {
                    let (value, tier) = j_curve(years);
                    cap(value, tier, format!("{years:.1} years since retirement"))
                }
                RetirementCurve::Flat => cap(
                    config.flat_premium,
                    "flat_premium",
                    format!("legacy flat premium, {years:.1} years since retirement"),
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RetirementConfig {
        RetirementConfig::default()
    }

    fn retired(years: f64, demand: f64) -> Multiplier {
        retirement_multiplier(&config(), Some(RetirementStatus::Retired), Some(years), demand)
    }

    #[test]
    fn test_j_curve_ladder() {
        assert_eq!(retired(0.5, 70.0).value, 0.95);
        assert_eq!(retired(1.5, 70.0).value, 1.00);
        assert_eq!(retired(3.0, 70.0).value, 1.15);
        assert_eq!(retired(7.0, 70.0).value, 1.40);
        assert_eq!(retired(12.0, 70.0).value, 2.00);
    }

    #[test]
    fn test_j_curve_monotonic_after_year_one() {
        let ages = [0.5, 7.0, 12.0];
        let values: Vec<f64> = ages.iter().map(|&y| retired(y, 70.0).value).collect();
        assert!(values[0] < values[1] && values[1] < values[2]);
    }

    #[test]
    fn test_demand_gate_boundary_is_exact() {
        // 39 vs 40 with identical other inputs: the cap releases at exactly 40
        let below = retired(7.0, 39.0);
        let at = retired(7.0, 40.0);
        assert_eq!(below.value, 1.02);
        assert_eq!(below.tier, "demand_gated");
        assert_eq!(at.value, 1.40);
        assert_eq!(at.tier, "j_curve_mature");
    }

    #[test]
    fn test_gate_does_not_raise_the_dip() {
        // The first-year dip is below the cap and stays put under low demand
        let m = retired(0.5, 10.0);
        assert_eq!(m.value, 0.95);
    }

    #[test]
    fn test_active_is_unity() {
        let m = retirement_multiplier(&config(), Some(RetirementStatus::Active), None, 90.0);
        assert_eq!(m.value, 1.0);
        assert_eq!(m.tier, "active");
    }

    #[test]
    fn test_retiring_soon_premium_and_gate() {
        let m = retirement_multiplier(&config(), Some(RetirementStatus::RetiringSoon), None, 70.0);
        assert_eq!(m.value, 1.08);

        let m = retirement_multiplier(&config(), Some(RetirementStatus::RetiringSoon), None, 20.0);
        assert_eq!(m.value, 1.02);
    }

    #[test]
    fn test_unknown_status_or_age_is_neutral() {
        let m = retirement_multiplier(&config(), None, Some(5.0), 70.0);
        assert_eq!(m.value, 1.0);
        assert!(!m.applied);

        let m = retirement_multiplier(&config(), Some(RetirementStatus::Retired), None, 70.0);
        assert_eq!(m.value, 1.0);
    }

    #[test]
    fn test_flat_curve_variant() {
        let cfg = RetirementConfig {
            curve: RetirementCurve::Flat,
            ..RetirementConfig::default()
        };
        let m = retirement_multiplier(&cfg, Some(RetirementStatus::Retired), Some(0.5), 70.0);
        assert_eq!(m.value, 1.15);
        let m = retirement_multiplier(&cfg, Some(RetirementStatus::Retired), Some(12.0), 70.0);
        assert_eq!(m.value, 1.15);
    }

    #[test]
    fn test_range_never_exceeded() {
        for years in [0.0, 0.99, 1.0, 4.99, 9.99, 50.0] {
            for demand in [0.0, 39.0, 40.0, 100.0] {
                let v = retired(years, demand).value;
                assert!((0.95..=2.00).contains(&v), "value {v} out of range");
            }
        }
    }
}
