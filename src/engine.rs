//! Intrinsic value engine
//!
//! Resolves a base value from the best available price source, runs the
//! hard gates, compounds the multiplier library onto the base, and clamps
//! the result into the sanity band. Every call produces a full audit
//! breakdown; a rejection and a computed value are mutually exclusive.

use serde::{Deserialize, Serialize};

use crate::config::ValuationConfig;
use crate::gates::{GateDecision, HardGateEvaluator, Rejection, RejectionCategory};
use crate::input::quality_gate::{DataQualityAssessment, DataQualityGate};
use crate::input::{Condition, ValuationInput};
use crate::money::Cents;
use crate::multipliers::{
    dead_stock::dead_stock_multiplier, liquidity::liquidity_multiplier, ppd::ppd_multiplier,
    retirement::retirement_multiplier, saturation::saturation_multiplier,
    scarcity::scarcity_multiplier, theme::theme_multiplier, volatility::volatility_multiplier,
    Multiplier,
};
use crate::scoring::{demand::DemandScorer, quality::QualityScorer, ScoreResult};

/// Which price source anchored the base value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseValueSource {
    Msrp,
    CurrentRetail,
    /// Weighted blend of marketplace average and maximum
    MarketplaceBlend,
    MarketplaceAvg,
    MarketplaceMax,
    /// No usable price source; valuation is zero
    None,
}

impl std::fmt::Display for BaseValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BaseValueSource::Msrp => "msrp",
            BaseValueSource::CurrentRetail => "current_retail",
            BaseValueSource::MarketplaceBlend => "marketplace_blend",
            BaseValueSource::MarketplaceAvg => "marketplace_avg",
            BaseValueSource::MarketplaceMax => "marketplace_max",
            BaseValueSource::None => "none",
        };
        write!(f, "{name}")
    }
}

/// Record of the sanity clamp firing
#[derive(Debug, Clone, Serialize)]
pub struct BoundAdjustment {
    /// Compounded value before clamping
    pub raw_value: Cents,
    /// Bound factor applied, as a multiple of base
    pub bound: f64,
    /// "upper" or "lower"
    pub direction: &'static str,
}

/// Full audit trail for one valuation
#[derive(Debug, Clone, Serialize)]
pub struct ValuationBreakdown {
    pub set_id: Option<String>,
    pub base_value: Cents,
    pub base_source: BaseValueSource,
    pub demand: Option<ScoreResult>,
    pub quality: Option<ScoreResult>,
    /// Empty when rejected or no price source
    pub multipliers: Vec<Multiplier>,
    /// Product of all multiplier values
    pub combined_multiplier: f64,
    pub bound_adjustment: Option<BoundAdjustment>,
    pub intrinsic_value: Cents,
    /// Present iff `intrinsic_value` is zero by policy
    pub rejection: Option<Rejection>,
    /// Present when the breakdown entry point ran the data quality gate
    pub data_quality: Option<DataQualityAssessment>,
}

impl ValuationBreakdown {
    pub fn is_rejected(&self) -> bool {
        self.rejection.is_some()
    }
}

/// Base value resolution and sanity-band settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Lower sanity bound, as a multiple of base
    #[serde(default = "default_sanity_lower")]
    pub sanity_lower: f64,
    /// Upper sanity bound, as a multiple of base
    #[serde(default = "default_sanity_upper")]
    pub sanity_upper: f64,
    /// Weight of marketplace avg in the blended estimate
    #[serde(default = "default_blend_avg_weight")]
    pub blend_avg_weight: f64,
    /// Weight of marketplace max in the blended estimate
    #[serde(default = "default_blend_max_weight")]
    pub blend_max_weight: f64,
    /// Haircut on the blended marketplace estimate (asks are not sales)
    #[serde(default = "default_blend_discount")]
    pub blend_discount: f64,
    /// Haircut when only the marketplace average is known
    #[serde(default = "default_avg_only_discount")]
    pub avg_only_discount: f64,
    /// Haircut when only the marketplace max is known
    #[serde(default = "default_max_only_discount")]
    pub max_only_discount: f64,
    /// Extra factor on the marketplace path for used-condition listings
    #[serde(default = "default_used_discount")]
    pub used_condition_discount: f64,
    /// Whether the scarcity premium applies alongside saturation
    #[serde(default = "default_apply_scarcity")]
    pub apply_scarcity: bool,
}

fn default_sanity_lower() -> f64 {
    0.30
}
fn default_sanity_upper() -> f64 {
    3.50
}
fn default_blend_avg_weight() -> f64 {
    0.7
}
fn default_blend_max_weight() -> f64 {
    0.3
}
fn default_blend_discount() -> f64 {
    0.70
}
fn default_avg_only_discount() -> f64 {
    0.50
}
fn default_max_only_discount() -> f64 {
    0.30
}
fn default_used_discount() -> f64 {
    0.80
}
fn default_apply_scarcity() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sanity_lower: default_sanity_lower(),
            sanity_upper: default_sanity_upper(),
            blend_avg_weight: default_blend_avg_weight(),
            blend_max_weight: default_blend_max_weight(),
            blend_discount: default_blend_discount(),
            avg_only_discount: default_avg_only_discount(),
            max_only_discount: default_max_only_discount(),
            used_condition_discount: default_used_discount(),
            apply_scarcity: default_apply_scarcity(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.sanity_lower <= 0.0 || self.sanity_upper < self.sanity_lower {
            return Err(crate::error::Error::Config(format!(
                "sanity bounds [{}, {}] are not an increasing positive range",
                self.sanity_lower, self.sanity_upper
            )));
        }
        let blend = self.blend_avg_weight + self.blend_max_weight;
        if (blend - 1.0).abs() > 1e-3 {
            return Err(crate::error::Error::Config(format!(
                "marketplace blend weights sum to {blend}, expected 1.0"
            )));
        }
        Ok(())
    }
}

/// The valuation pipeline: scores, gates, multipliers, sanity band
pub struct IntrinsicValueEngine {
    config: ValuationConfig,
    demand_scorer: DemandScorer,
    quality_scorer: QualityScorer,
    gate_evaluator: HardGateEvaluator,
    quality_gate: DataQualityGate,
}

impl IntrinsicValueEngine {
    pub fn new(config: ValuationConfig) -> Self {
        let demand_scorer = DemandScorer::new(config.demand_weights.clone());
        let quality_scorer = QualityScorer::new(config.quality_weights.clone());
        let gate_evaluator = HardGateEvaluator::new(config.hard_gates.clone());
        let quality_gate = DataQualityGate::new(config.quality_gate.clone());
        Self {
            config,
            demand_scorer,
            quality_scorer,
            gate_evaluator,
            quality_gate,
        }
    }

    /// Full breakdown entry point
    ///
    /// Runs the data quality gate first and short-circuits with its
    /// explanation when the input is not worth valuing.
    pub fn evaluate(&self, input: &ValuationInput) -> ValuationBreakdown {
        let assessment = self.quality_gate.assess(input);
        if !assessment.can_calculate {
            tracing::info!(
                set_id = input.set_id.as_deref().unwrap_or("?"),
                explanation = %assessment.explanation(),
                "valuation skipped"
            );
            return ValuationBreakdown {
                set_id: input.set_id.clone(),
                base_value: Cents::ZERO,
                base_source: BaseValueSource::None,
                demand: None,
                quality: None,
                multipliers: Vec::new(),
                combined_multiplier: 1.0,
                bound_adjustment: None,
                intrinsic_value: Cents::ZERO,
                rejection: Some(Rejection {
                    category: RejectionCategory::InsufficientData,
                    reason: assessment.explanation(),
                }),
                data_quality: Some(assessment),
            };
        }

        let mut breakdown = self.value(input);
        breakdown.data_quality = Some(assessment);
        breakdown
    }

    /// Value an input without the data quality gate
    ///
    /// Embedding callers that have already assessed completeness use this
    /// directly; `evaluate` is the safer front door.
    pub fn value(&self, input: &ValuationInput) -> ValuationBreakdown {
        let (base_value, base_source) = self.base_value(input);

        let mut breakdown = ValuationBreakdown {
            set_id: input.set_id.clone(),
            base_value,
            base_source,
            demand: None,
            quality: None,
            multipliers: Vec::new(),
            combined_multiplier: 1.0,
            bound_adjustment: None,
            intrinsic_value: Cents::ZERO,
            rejection: None,
            data_quality: None,
        };

        if base_value.is_zero() {
            return breakdown;
        }

        let demand = self.demand_scorer.score(input);
        let quality = self.quality_scorer.score(input);
        let raw_demand = demand.score;

        let decision = self.gate_evaluator.evaluate(input, demand.score, quality.score);
        breakdown.demand = Some(demand);
        breakdown.quality = Some(quality);

        if let GateDecision::Reject(rejection) = decision {
            tracing::info!(
                set_id = input.set_id.as_deref().unwrap_or("?"),
                category = %rejection.category,
                reason = %rejection.reason,
                "valuation rejected"
            );
            breakdown.rejection = Some(rejection);
            return breakdown;
        }

        let multipliers = self.multipliers(input, raw_demand);
        let combined: f64 = multipliers.iter().map(|m| m.value).product();
        breakdown.multipliers = multipliers;
        breakdown.combined_multiplier = combined;

        let raw_value = base_value.mul_f64(combined);
        let lower = base_value.mul_f64(self.config.engine.sanity_lower);
        let upper = base_value.mul_f64(self.config.engine.sanity_upper);

        breakdown.intrinsic_value = if raw_value < lower {
            tracing::debug!(%raw_value, %lower, "sanity clamp raised value to lower bound");
            breakdown.bound_adjustment = Some(BoundAdjustment {
                raw_value,
                bound: self.config.engine.sanity_lower,
                direction: "lower",
            });
            lower
        } else if raw_value > upper {
            tracing::debug!(%raw_value, %upper, "sanity clamp cut value to upper bound");
            breakdown.bound_adjustment = Some(BoundAdjustment {
                raw_value,
                bound: self.config.engine.sanity_upper,
                direction: "upper",
            });
            upper
        } else {
            raw_value
        };

        breakdown
    }

    /// Convenience: intrinsic value only
    pub fn intrinsic_value(&self, input: &ValuationInput) -> Cents {
        self.evaluate(input).intrinsic_value
    }

    /// Resolve the base value from the best available source
    ///
    /// MSRP and current retail are manufacturer prices and always refer to
    /// new condition. The marketplace path discounts ask-based estimates,
    /// and used-condition listings take a further haircut there.
    fn base_value(&self, input: &ValuationInput) -> (Cents, BaseValueSource) {
        if let Some(msrp) = input.msrp {
            return (msrp, BaseValueSource::Msrp);
        }
        if let Some(retail) = input.current_retail {
            return (retail, BaseValueSource::CurrentRetail);
        }

        let cfg = &self.config.engine;
        let condition_factor = match input.condition {
            Condition::New => 1.0,
            Condition::Used => cfg.used_condition_discount,
        };

        match (input.marketplace_avg, input.marketplace_max) {
            (Some(avg), Some(max)) => {
                let blended = avg
                    .mul_f64(cfg.blend_avg_weight)
                    .checked_add(max.mul_f64(cfg.blend_max_weight))
                    .unwrap_or(Cents::ZERO);
                (
                    blended.mul_f64(cfg.blend_discount * condition_factor),
                    BaseValueSource::MarketplaceBlend,
                )
            }
            (Some(avg), None) => (
                avg.mul_f64(cfg.avg_only_discount * condition_factor),
                BaseValueSource::MarketplaceAvg,
            ),
            (None, Some(max)) => (
                max.mul_f64(cfg.max_only_discount * condition_factor),
                BaseValueSource::MarketplaceMax,
            ),
            (None, None) => (Cents::ZERO, BaseValueSource::None),
        }
    }

    fn multipliers(&self, input: &ValuationInput, raw_demand: f64) -> Vec<Multiplier> {
        let cfg = &self.config;
        let mut multipliers = vec![
            retirement_multiplier(
                &cfg.retirement,
                input.retirement,
                input.years_post_retirement,
                raw_demand,
            ),
            theme_multiplier(input.theme.as_deref()),
            ppd_multiplier(input),
            liquidity_multiplier(&cfg.liquidity, input),
            volatility_multiplier(&cfg.volatility, input),
            saturation_multiplier(&cfg.saturation, input),
        ];
        if cfg.engine.apply_scarcity {
            multipliers.push(scarcity_multiplier(&cfg.scarcity, input));
        }
        multipliers.push(dead_stock_multiplier(&cfg.dead_stock, input, raw_demand));
        multipliers
    }
}

impl Default for IntrinsicValueEngine {
    fn default() -> Self {
        Self::new(ValuationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::RetirementStatus;

    fn engine() -> IntrinsicValueEngine {
        IntrinsicValueEngine::default()
    }

    /// A retired set that comfortably passes every gate
    fn solid_input(years: f64) -> ValuationInput {
        let mut input = ValuationInput::default()
            .with_msrp(85_000)
            .with_market(0.4, 120, 10)
            .with_retirement(RetirementStatus::Retired, years)
            .with_product("Star Wars", 5544);
        input.times_sold = Some(60);
        input.price_trend_pct = Some(4.0);
        input
    }

    #[test]
    fn test_base_value_priority() {
        let mut input = ValuationInput::default()
            .with_msrp(85_000)
            .with_marketplace(95_000, 120_000);
        input.current_retail = Some(Cents::new(80_000));

        let (value, source) = engine().base_value(&input);
        assert_eq!(source, BaseValueSource::Msrp);
        assert_eq!(value, Cents::new(85_000));

        input.msrp = None;
        let (value, source) = engine().base_value(&input);
        assert_eq!(source, BaseValueSource::CurrentRetail);
        assert_eq!(value, Cents::new(80_000));
    }

    #[test]
    fn test_marketplace_blend() {
        let input = ValuationInput::default().with_marketplace(10_000, 20_000);
        let (value, source) = engine().base_value(&input);
        assert_eq!(source, BaseValueSource::MarketplaceBlend);
        // (0.7 * 100 + 0.3 * 200) * 0.70 = 91.00
        assert_eq!(value, Cents::new(9_100));
    }

    #[test]
    fn test_marketplace_single_source_haircuts() {
        let mut input = ValuationInput::default();
        input.marketplace_avg = Some(Cents::new(10_000));
        let (value, source) = engine().base_value(&input);
        assert_eq!(source, BaseValueSource::MarketplaceAvg);
        assert_eq!(value, Cents::new(5_000));

        let mut input = ValuationInput::default();
        input.marketplace_max = Some(Cents::new(10_000));
        let (value, source) = engine().base_value(&input);
        assert_eq!(source, BaseValueSource::MarketplaceMax);
        assert_eq!(value, Cents::new(3_000));
    }

    #[test]
    fn test_used_condition_discounts_marketplace_path_only() {
        let mut input = ValuationInput::default().with_marketplace(10_000, 20_000);
        input.condition = Condition::Used;
        let (value, _) = engine().base_value(&input);
        // Blend 130.00 * 0.70 * 0.80 = 72.80
        assert_eq!(value, Cents::new(7_280));

        // MSRP is a new-condition price by definition; no discount
        let mut input = ValuationInput::default().with_msrp(85_000);
        input.condition = Condition::Used;
        let (value, _) = engine().base_value(&input);
        assert_eq!(value, Cents::new(85_000));
    }

    #[test]
    fn test_no_price_source_values_zero_without_multipliers() {
        let mut input = ValuationInput::default();
        input.times_sold = Some(10);
        let breakdown = engine().value(&input);
        assert_eq!(breakdown.intrinsic_value, Cents::ZERO);
        assert_eq!(breakdown.base_source, BaseValueSource::None);
        assert!(breakdown.multipliers.is_empty());
    }

    #[test]
    fn test_evaluate_short_circuits_on_quality_gate() {
        let breakdown = engine().evaluate(&ValuationInput::default());
        assert_eq!(breakdown.intrinsic_value, Cents::ZERO);
        let rejection = breakdown.rejection.as_ref().unwrap();
        assert_eq!(rejection.category, RejectionCategory::InsufficientData);
        assert!(!breakdown.data_quality.as_ref().unwrap().can_calculate);
        assert!(breakdown.multipliers.is_empty());
    }

    #[test]
    fn test_rejection_zeroes_value_and_skips_multipliers() {
        // Valid prices but glacial velocity: dead inventory gate
        let mut input = solid_input(3.0);
        input.sales_velocity = Some(0.005);
        input.times_sold = Some(60);
        let breakdown = engine().evaluate(&input);
        assert!(breakdown.is_rejected());
        assert_eq!(breakdown.intrinsic_value, Cents::ZERO);
        assert!(breakdown.multipliers.is_empty());
        assert_eq!(breakdown.combined_multiplier, 1.0);
    }

    #[test]
    fn test_j_curve_monotonic_across_ages() {
        let eng = engine();
        let young = eng.evaluate(&solid_input(0.5)).intrinsic_value;
        let mature = eng.evaluate(&solid_input(7.0)).intrinsic_value;
        let vintage = eng.evaluate(&solid_input(12.0)).intrinsic_value;
        assert!(
            young < mature && mature < vintage,
            "expected {young} < {mature} < {vintage}"
        );
    }

    #[test]
    fn test_sanity_upper_bound_clamps() {
        // Everything stacked: vintage retirement, premium theme, dense PPD,
        // hot velocity, under a month of inventory
        let mut input = ValuationInput::default()
            .with_msrp(20_000)
            .with_market(0.6, 15, 3)
            .with_retirement(RetirementStatus::Retired, 12.0)
            .with_product("Star Wars", 2400);
        input.times_sold = Some(50);
        input.price_trend_pct = Some(8.0);

        let breakdown = engine().evaluate(&input);
        assert!(!breakdown.is_rejected());
        let adjustment = breakdown.bound_adjustment.as_ref().expect("clamp should fire");
        assert_eq!(adjustment.direction, "upper");
        assert_eq!(breakdown.intrinsic_value, Cents::new(70_000)); // 3.5x base
        assert!(adjustment.raw_value > breakdown.intrinsic_value);
    }

    #[test]
    fn test_value_within_sanity_band_when_not_rejected() {
        let breakdown = engine().evaluate(&solid_input(3.0));
        assert!(!breakdown.is_rejected());
        let base = breakdown.base_value;
        assert!(breakdown.intrinsic_value >= base.mul_f64(0.30));
        assert!(breakdown.intrinsic_value <= base.mul_f64(3.50));
    }

    #[test]
    fn test_deterministic_breakdown() {
        let eng = engine();
        let input = solid_input(7.0);
        let a = serde_json::to_string(&eng.evaluate(&input)).unwrap();
        let b = serde_json::to_string(&eng.evaluate(&input)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_scarcity_can_be_disabled() {
        let mut config = ValuationConfig::default();
        config.engine.apply_scarcity = false;
        let eng = IntrinsicValueEngine::new(config);
        let breakdown = eng.evaluate(&solid_input(3.0));
        assert!(breakdown
            .multipliers
            .iter()
            .all(|m| m.kind != crate::multipliers::MultiplierKind::Scarcity));
    }

    #[test]
    fn test_engine_config_validation() {
        assert!(EngineConfig::default().validate().is_ok());

        let bad = EngineConfig {
            sanity_lower: 2.0,
            sanity_upper: 1.0,
            ..EngineConfig::default()
        };
        assert!(bad.validate().is_err());

        let bad = EngineConfig {
            blend_avg_weight: 0.9,
            ..EngineConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
