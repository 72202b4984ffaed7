//! Hard gates - the too-hard pile
//!
//! Policy rules that refuse to produce a valuation rather than risk a
//! misleading one. Checks run in a fixed order and the first match is
//! terminal; a rejection is a policy decision, not an error.

use serde::{Deserialize, Serialize};

use crate::input::ValuationInput;
use crate::multipliers::months_of_inventory;

/// Why a valuation was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionCategory {
    /// Quality score too low to trust any number
    InsufficientData,
    /// Demand score too low; a premium would be fiction
    InsufficientDemand,
    /// Effectively never sells
    DeadInventory,
    /// Years of supply on the market
    Oversaturated,
    /// Falling price into a glut - the classic trap
    ValueTrap,
}

impl std::fmt::Display for RejectionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RejectionCategory::InsufficientData => "INSUFFICIENT_DATA",
            RejectionCategory::InsufficientDemand => "INSUFFICIENT_DEMAND",
            RejectionCategory::DeadInventory => "DEAD_INVENTORY",
            RejectionCategory::Oversaturated => "OVERSATURATED",
            RejectionCategory::ValueTrap => "VALUE_TRAP",
        };
        write!(f, "{name}")
    }
}

/// A categorized refusal with its human-readable reason
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub category: RejectionCategory,
    pub reason: String,
}

/// Outcome of running the hard gates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GateDecision {
    Pass,
    Reject(Rejection),
}

impl GateDecision {
    pub fn is_pass(&self) -> bool {
        matches!(self, GateDecision::Pass)
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            GateDecision::Pass => None,
            GateDecision::Reject(r) => Some(r),
        }
    }
}

/// Hard gate thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardGateConfig {
    /// Minimum quality score to proceed
    #[serde(default = "default_min_quality")]
    pub min_quality_score: f64,
    /// Minimum demand score to proceed
    #[serde(default = "default_min_demand")]
    pub min_demand_score: f64,
    /// Velocity below this (when present) is dead inventory, units/day
    #[serde(default = "default_min_velocity")]
    pub min_sales_velocity: f64,
    /// Months of inventory above this is oversaturated
    #[serde(default = "default_max_months")]
    pub max_months_of_inventory: f64,
    /// Price decline above this percent, combined with the glut test, is a trap
    #[serde(default = "default_max_decline")]
    pub value_trap_decline_pct: f64,
    /// Months of inventory above this arms the value-trap check
    #[serde(default = "default_trap_months")]
    pub value_trap_months: f64,
}

fn default_min_quality() -> f64 {
    40.0
}
fn default_min_demand() -> f64 {
    40.0
}
fn default_min_velocity() -> f64 {
    1.0 / 30.0
}
fn default_max_months() -> f64 {
    24.0
}
fn default_max_decline() -> f64 {
    15.0
}
fn default_trap_months() -> f64 {
    12.0
}

impl Default for HardGateConfig {
    fn default() -> Self {
        Self {
            min_quality_score: default_min_quality(),
            min_demand_score: default_min_demand(),
            min_sales_velocity: default_min_velocity(),
            max_months_of_inventory: default_max_months(),
            value_trap_decline_pct: default_max_decline(),
            value_trap_months: default_trap_months(),
        }
    }
}

/// Evaluates the hard-gate checklist
pub struct HardGateEvaluator {
    config: HardGateConfig,
}

impl HardGateEvaluator {
    pub fn new(config: HardGateConfig) -> Self {
        Self { config }
    }

    /// Run the ordered checks; first match wins
    pub fn evaluate(
        &self,
        input: &ValuationInput,
        demand_score: f64,
        quality_score: f64,
    ) -> GateDecision {
        if quality_score < self.config.min_quality_score {
            return self.reject(
                RejectionCategory::InsufficientData,
                format!(
                    "quality score {quality_score:.0} below minimum {:.0}",
                    self.config.min_quality_score
                ),
            );
        }

        if demand_score < self.config.min_demand_score {
            return self.reject(
                RejectionCategory::InsufficientDemand,
                format!(
                    "demand score {demand_score:.0} below minimum {:.0}",
                    self.config.min_demand_score
                ),
            );
        }

        if let Some(velocity) = input.sales_velocity {
            if velocity < self.config.min_sales_velocity {
                return self.reject(
                    RejectionCategory::DeadInventory,
                    format!(
                        "sales velocity {velocity:.4}/day below {:.4}/day (about one sale a month)",
                        self.config.min_sales_velocity
                    ),
                );
            }
        }

        let moi = months_of_inventory(input.available_quantity, input.sales_velocity);
        if let Some(moi) = moi {
            if moi > self.config.max_months_of_inventory {
                return self.reject(
                    RejectionCategory::Oversaturated,
                    format!(
                        "{moi:.0} months of inventory exceeds {:.0}",
                        self.config.max_months_of_inventory
                    ),
                );
            }
        }

        if let (Some(decline), Some(moi)) = (input.price_decline_pct, moi) {
            if decline > self.config.value_trap_decline_pct && moi > self.config.value_trap_months {
                return self.reject(
                    RejectionCategory::ValueTrap,
                    format!(
                        "price down {decline:.0}% into {moi:.0} months of inventory"
                    ),
                );
            }
        }

        GateDecision::Pass
    }

    fn reject(&self, category: RejectionCategory, reason: String) -> GateDecision {
        tracing::debug!(%category, %reason, "hard gate rejection");
        GateDecision::Reject(Rejection { category, reason })
    }
}

impl Default for HardGateEvaluator {
    fn default() -> Self {
        Self::new(HardGateConfig::default())
    }
}
