//! Configuration loading and validation

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

// Re-export module-local configs so callers only import from here
pub use crate::engine::EngineConfig;
pub use crate::gates::HardGateConfig;
pub use crate::input::quality_gate::QualityGateConfig;
pub use crate::input::sanitizer::SanitizerConfig;
pub use crate::multipliers::dead_stock::DeadStockConfig;
pub use crate::multipliers::liquidity::LiquidityConfig;
pub use crate::multipliers::retirement::{RetirementConfig, RetirementCurve};
pub use crate::multipliers::saturation::SaturationConfig;
pub use crate::multipliers::scarcity::ScarcityConfig;
pub use crate::multipliers::volatility::VolatilityConfig;
pub use crate::pricing::PricingConfig;
pub use crate::projection::ProjectionConfig;
pub use crate::scoring::demand::DemandWeights;
pub use crate::scoring::quality::QualityWeights;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValuationConfig {
    #[serde(default)]
    pub sanitizer: SanitizerConfig,
    #[serde(default)]
    pub quality_gate: QualityGateConfig,
    #[serde(default)]
    pub demand_weights: DemandWeights,
    #[serde(default)]
    pub quality_weights: QualityWeights,
    #[serde(default)]
    pub retirement: RetirementConfig,
    #[serde(default)]
    pub liquidity: LiquidityConfig,
    #[serde(default)]
    pub volatility: VolatilityConfig,
    #[serde(default)]
    pub saturation: SaturationConfig,
    #[serde(default)]
    pub scarcity: ScarcityConfig,
    #[serde(default)]
    pub dead_stock: DeadStockConfig,
    #[serde(default)]
    pub hard_gates: HardGateConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub projection: ProjectionConfig,
}

impl ValuationConfig {
    /// Load configuration from file and environment variables
    ///
    /// The file is optional; environment variables with the `BRICKWORTH__`
    /// prefix override it (e.g. `BRICKWORTH__ENGINE__SANITY_UPPER=4.0`).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("BRICKWORTH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: ValuationConfig = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate().context("Invalid configuration")?;

        Ok(config)
    }

    /// Validate configuration values, failing fast at startup
    pub fn validate(&self) -> Result<()> {
        self.demand_weights.validate()?;
        self.quality_weights.validate()?;
        self.quality_gate.validate()?;
        self.engine.validate()?;
        self.pricing.validate()?;

        if self.sanitizer.min_price_cents >= self.sanitizer.max_price_cents {
            anyhow::bail!(
                "sanitizer price bounds [{}, {}] are not increasing",
                self.sanitizer.min_price_cents,
                self.sanitizer.max_price_cents
            );
        }
        if self.projection.min_cagr >= self.projection.max_cagr {
            anyhow::bail!(
                "projection CAGR bounds [{}, {}] are not increasing",
                self.projection.min_cagr,
                self.projection.max_cagr
            );
        }
        if self.retirement.demand_gate != self.dead_stock.low_demand_threshold {
            tracing::warn!(
                retirement_gate = self.retirement.demand_gate,
                dead_stock_threshold = self.dead_stock.low_demand_threshold,
                "demand gates differ between retirement and dead-stock rules"
            );
        }

        Ok(())
    }

    /// Configuration summary for display
    pub fn display(&self) -> String {
        format!(
            r#"Configuration:
  Engine:
    sanity band: [{:.2}x, {:.2}x]
    retirement curve: {:?}
    scarcity premium: {}
  Demand weights: velocity {:.2}, momentum {:.2}, depth {:.2}, supply/demand {:.2}, consistency {:.2}
  Quality weights: ppd {:.2}, complexity {:.2}, theme {:.2}, scarcity {:.2}
  Hard gates:
    min quality: {:.0}
    min demand: {:.0}
    max months of inventory: {:.0}
  Pricing:
    default margin: {:.0}%
    selling fee: {:.1}%
"#,
            self.engine.sanity_lower,
            self.engine.sanity_upper,
            self.retirement.curve,
            if self.engine.apply_scarcity { "on" } else { "off" },
            self.demand_weights.velocity,
            self.demand_weights.momentum,
            self.demand_weights.market_depth,
            self.demand_weights.supply_demand,
            self.demand_weights.consistency,
            self.quality_weights.parts_per_dollar,
            self.quality_weights.complexity,
            self.quality_weights.theme,
            self.quality_weights.scarcity,
            self.hard_gates.min_quality_score,
            self.hard_gates.min_demand_score,
            self.hard_gates.max_months_of_inventory,
            self.pricing.default_margin * 100.0,
            self.pricing.selling_fee_pct,
        )
    }
}
