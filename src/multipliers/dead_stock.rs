//! Zero-sales penalty
//!
//! A set that barely ever sells is dead inventory regardless of what the
//! ask prices say. The penalty compounds when the demand score agrees:
//! both signals pointing at "nobody wants this" is punished hardest.

use serde::{Deserialize, Serialize};

use super::{Multiplier, MultiplierKind};
use crate::input::ValuationInput;

/// Dead-stock penalty configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadStockConfig {
    /// Sales below this over the observation window trigger the penalty
    #[serde(default = "default_min_sales")]
    pub min_sales: u32,
    /// Base penalty when sales are below the threshold
    #[serde(default = "default_base_penalty")]
    pub base_penalty: f64,
    /// Extra factor when demand is also below the low-demand threshold
    #[serde(default = "default_low_demand_factor")]
    pub low_demand_factor: f64,
    /// Demand score below which the penalty compounds
    #[serde(default = "default_low_demand_threshold")]
    pub low_demand_threshold: f64,
}

fn default_min_sales() -> u32 {
    3
}
fn default_base_penalty() -> f64 {
    0.50
}
fn default_low_demand_factor() -> f64 {
    0.60
}
fn default_low_demand_threshold() -> f64 {
    40.0
}

impl Default for DeadStockConfig {
    fn default() -> Self {
        Self {
            min_sales: default_min_sales(),
            base_penalty: default_base_penalty(),
            low_demand_factor: default_low_demand_factor(),
            low_demand_threshold: default_low_demand_threshold(),
        }
    }
}

/// Zero-sales penalty, 0.15x-1.00x
///
/// `raw_demand` is the ungated demand score. An unknown sales count is
/// neutral: absence of data is not evidence of death.
pub fn dead_stock_multiplier(
    config: &DeadStockConfig,
    input: &ValuationInput,
    raw_demand: f64,
) -> Multiplier {
    let Some(times_sold) = input.times_sold else {
        return Multiplier::neutral(MultiplierKind::DeadStock, "no sales count data");
    };

    if times_sold >= config.min_sales {
        return Multiplier::new(
            MultiplierKind::DeadStock,
            1.0,
            "selling",
            format!("{times_sold} sales in window"),
        );
    }

    let low_demand = raw_demand < config.low_demand_threshold;
    let value = if low_demand {
        config.base_penalty * config.low_demand_factor
    } else {
        config.base_penalty
    };
    let tier = if low_demand { "dead_confirmed" } else { "stale" };

    Multiplier::new(
        MultiplierKind::DeadStock,
        value,
        tier,
        format!(
            "{times_sold} sales in window (< {}){}",
            config.min_sales,
            if low_demand {
                ", demand agrees"
            } else {
                ""
            }
        ),
    )
}
