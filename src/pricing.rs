//! Margin-of-safety pricing layer
//!
//! Turns an intrinsic value into a defensible buy decision: how deep a
//! discount to demand, what the position actually nets after fees and
//! shipping, what it costs to hold, and how the quoted price compares to
//! every reference we have. All percentage math is guarded; a division by
//! zero reports 0, never NaN.

use serde::{Deserialize, Serialize};

use crate::engine::ValuationBreakdown;
use crate::error::{Error, Result};
use crate::input::ValuationInput;
use crate::money::Cents;

/// Named margin presets, from most to least cautious
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarginPreset {
    Conservative,
    Balanced,
    Aggressive,
}

impl MarginPreset {
    pub fn margin(&self) -> f64 {
        match self {
            MarginPreset::Conservative => 0.40,
            MarginPreset::Balanced => 0.30,
            MarginPreset::Aggressive => 0.20,
        }
    }
}

/// Where the chosen margin came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarginBasis {
    DataQuality,
    Preset,
    Override,
    Default,
}

/// The chosen margin of safety with its audit trail
#[derive(Debug, Clone, Serialize)]
pub struct MarginOfSafety {
    /// Fraction in [0.05, 0.50]
    pub value: f64,
    pub basis: MarginBasis,
    /// Nudges applied after the base was chosen
    pub adjustments: Vec<String>,
}

/// Cost breakdown of selling one unit at a given price
#[derive(Debug, Clone, Serialize)]
pub struct RealizedValue {
    pub gross: Cents,
    pub selling_fee: Cents,
    pub shipping: Cents,
    pub packaging: Cents,
    pub returns_allowance: Cents,
    /// Gross minus all costs, floored at zero
    pub net: Cents,
}

/// Three-ratio comparison of the quoted price against references
#[derive(Debug, Clone, Serialize)]
pub struct DealQualityMetrics {
    /// Discount from original retail, weight 0.40
    pub retail_discount_score: f64,
    /// Quoted price vs marketplace average, weight 0.30
    pub marketplace_score: f64,
    /// Quoted price vs intrinsic value, weight 0.30
    pub intrinsic_score: f64,
    /// Weighted 0-100 composite
    pub composite: f64,
    pub label: &'static str,
    pub recommendation: &'static str,
}

/// Full pricing decision for one quoted price
#[derive(Debug, Clone, Serialize)]
pub struct PricingDecision {
    pub intrinsic_value: Cents,
    pub quoted_price: Cents,
    pub margin_of_safety: MarginOfSafety,
    /// Intrinsic x (1 - margin); pay no more than this
    pub target_price: Cents,
    pub meets_target: bool,
    /// Paper ROI against intrinsic value, percent
    pub expected_roi_pct: f64,
    /// ROI after selling costs, percent
    pub realized_roi_pct: f64,
    pub realized_value: RealizedValue,
    pub holding_cost: Cents,
    pub deal_quality: DealQualityMetrics,
}

/// Pricing layer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Fallback margin when nothing better is known
    #[serde(default = "default_margin")]
    pub default_margin: f64,
    /// Data-quality score for the smallest margin band
    #[serde(default = "default_high_quality_threshold")]
    pub high_quality_threshold: f64,
    #[serde(default = "default_medium_quality_threshold")]
    pub medium_quality_threshold: f64,
    /// Marketplace selling fee, percent of sale price
    #[serde(default = "default_selling_fee_pct")]
    pub selling_fee_pct: f64,
    /// Flat shipping estimate, minor units
    #[serde(default = "default_shipping_flat_cents")]
    pub shipping_flat_cents: u64,
    /// Shipping per kilogram, minor units
    #[serde(default = "default_shipping_per_kg_cents")]
    pub shipping_per_kg_cents: u64,
    /// Flat packaging cost, minor units
    #[serde(default = "default_packaging_cents")]
    pub packaging_cents: u64,
    /// Returns/damage allowance, percent of sale price
    #[serde(default = "default_returns_pct")]
    pub returns_pct: f64,
    /// Annual storage cost rate
    #[serde(default = "default_storage_rate")]
    pub storage_rate: f64,
    /// Annual cost-of-capital rate
    #[serde(default = "default_capital_rate")]
    pub capital_rate: f64,
    /// Annual box-wear / degradation rate
    #[serde(default = "default_degradation_rate")]
    pub degradation_rate: f64,
}

fn default_margin() -> f64 {
    0.30
}
fn default_high_quality_threshold() -> f64 {
    80.0
}
fn default_medium_quality_threshold() -> f64 {
    50.0
}
fn default_selling_fee_pct() -> f64 {
    11.0
}
fn default_shipping_flat_cents() -> u64 {
    500
}
fn default_shipping_per_kg_cents() -> u64 {
    300
}
fn default_packaging_cents() -> u64 {
    200
}
fn default_returns_pct() -> f64 {
    2.0
}
fn default_storage_rate() -> f64 {
    0.02
}
fn default_capital_rate() -> f64 {
    0.05
}
fn default_degradation_rate() -> f64 {
    0.01
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            default_margin: default_margin(),
            high_quality_threshold: default_high_quality_threshold(),
            medium_quality_threshold: default_medium_quality_threshold(),
            selling_fee_pct: default_selling_fee_pct(),
            shipping_flat_cents: default_shipping_flat_cents(),
            shipping_per_kg_cents: default_shipping_per_kg_cents(),
            packaging_cents: default_packaging_cents(),
            returns_pct: default_returns_pct(),
            storage_rate: default_storage_rate(),
            capital_rate: default_capital_rate(),
            degradation_rate: default_degradation_rate(),
        }
    }
}

impl PricingConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("default_margin", self.default_margin),
            ("selling_fee_pct", self.selling_fee_pct / 100.0),
            ("returns_pct", self.returns_pct / 100.0),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidPercentage { name, value });
            }
        }
        Ok(())
    }
}

/// Margin floor and ceiling after nudges
const MARGIN_FLOOR: f64 = 0.05;
const MARGIN_CEILING: f64 = 0.50;

/// Inputs the margin choice considers, all optional
#[derive(Debug, Clone, Copy, Default)]
pub struct MarginContext {
    pub data_quality_score: Option<f64>,
    pub demand_score: Option<f64>,
    pub availability_score: Option<f64>,
    pub preset: Option<MarginPreset>,
    pub margin_override: Option<f64>,
}

/// Margin-of-safety pricing and deal comparison
pub struct PricingDecisionLayer {
    config: PricingConfig,
}

impl PricingDecisionLayer {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    /// Choose the margin of safety
    ///
    /// Priority: data-quality banding, then named preset, then explicit
    /// override, then the configured default. Nudged down when resale looks
    /// easy, up when demand is weak.
    pub fn margin_of_safety(&self, ctx: &MarginContext) -> MarginOfSafety {
        let (base, basis) = if let Some(quality) = ctx.data_quality_score {
            let margin = if quality >= self.config.high_quality_threshold {
                0.20
            } else if quality >= self.config.medium_quality_threshold {
                0.30
            } else {
                0.40
            };
            (margin, MarginBasis::DataQuality)
        } else if let Some(preset) = ctx.preset {
            (preset.margin(), MarginBasis::Preset)
        } else if let Some(value) = ctx.margin_override {
            (value.clamp(MARGIN_FLOOR, MARGIN_CEILING), MarginBasis::Override)
        } else {
            (self.config.default_margin, MarginBasis::Default)
        };

        let mut value = base;
        let mut adjustments = Vec::new();

        let easy_resale = ctx.demand_score.is_some_and(|d| d >= 70.0)
            || ctx.availability_score.is_some_and(|a| a >= 70.0);
        if easy_resale {
            value -= 0.05;
            adjustments.push("easy resale, margin -5%".to_string());
        }
        if ctx.demand_score.is_some_and(|d| d < 40.0) {
            value += 0.10;
            adjustments.push("weak demand, margin +10%".to_string());
        }

        MarginOfSafety {
            value: value.clamp(MARGIN_FLOOR, MARGIN_CEILING),
            basis,
            adjustments,
        }
    }

    /// Maximum price to pay for the given intrinsic value
    pub fn target_price(&self, intrinsic: Cents, margin: &MarginOfSafety) -> Cents {
        intrinsic.mul_f64(1.0 - margin.value)
    }

    /// What selling at `sale_price` actually nets
    pub fn realized_value(&self, sale_price: Cents, weight_grams: Option<f64>) -> RealizedValue {
        let selling_fee = sale_price.percentage(self.config.selling_fee_pct);
        let per_kg = Cents::new(self.config.shipping_per_kg_cents)
            .mul_f64(weight_grams.unwrap_or(0.0).max(0.0) / 1000.0);
        let shipping = Cents::new(self.config.shipping_flat_cents)
            .checked_add(per_kg)
            .unwrap_or(Cents::new(self.config.shipping_flat_cents));
        let packaging = Cents::new(self.config.packaging_cents);
        let returns_allowance = sale_price.percentage(self.config.returns_pct);

        let net = sale_price
            .saturating_sub(selling_fee)
            .saturating_sub(shipping)
            .saturating_sub(packaging)
            .saturating_sub(returns_allowance);

        RealizedValue {
            gross: sale_price,
            selling_fee,
            shipping,
            packaging,
            returns_allowance,
            net,
        }
    }

    /// Cost of holding `value` of stock for `years`
    pub fn holding_cost(&self, value: Cents, years: f64) -> Cents {
        let annual_rate =
            self.config.storage_rate + self.config.capital_rate + self.config.degradation_rate;
        value.mul_f64(annual_rate * years.max(0.0))
    }

    /// Percentage return of `value` over `cost`; 0 when undefined
    pub fn roi_pct(&self, cost: Cents, value: Cents) -> f64 {
        if cost.is_zero() {
            return 0.0;
        }
        let roi = (value.as_major() - cost.as_major()) / cost.as_major() * 100.0;
        if roi.is_finite() {
            roi
        } else {
            0.0
        }
    }

    /// Compare the quoted price against every reference we have
    pub fn deal_quality(
        &self,
        quoted: Cents,
        intrinsic: Cents,
        original_retail: Option<Cents>,
        marketplace_avg: Option<Cents>,
    ) -> DealQualityMetrics {
        // Discount from original retail: 0% discount scores 0, 40%+ scores 100
        let retail_discount_score = match original_retail {
            Some(original) if !original.is_zero() => {
                let discount = 1.0 - quoted.ratio_to(original);
                (discount / 0.40 * 100.0).clamp(0.0, 100.0)
            }
            _ => 0.0,
        };

        // Vs marketplace average: at or below 70% of avg scores 100, at or
        // above 110% scores 0, linear between
        let marketplace_score = match marketplace_avg {
            Some(avg) if !avg.is_zero() => {
                let ratio = quoted.ratio_to(avg);
                ((1.10 - ratio) / 0.40 * 100.0).clamp(0.0, 100.0)
            }
            _ => 0.0,
        };

        // Vs intrinsic: intrinsic worth 1.5x the price scores 100, parity
        // scores ~29, 0.8x or worse scores 0
        let intrinsic_score = if quoted.is_zero() || intrinsic.is_zero() {
            0.0
        } else {
            let ratio = intrinsic.ratio_to(quoted);
            ((ratio - 0.80) / 0.70 * 100.0).clamp(0.0, 100.0)
        };

        let composite = retail_discount_score * 0.40
            + marketplace_score * 0.30
            + intrinsic_score * 0.30;

        let label = if composite >= 80.0 {
            "excellent"
        } else if composite >= 60.0 {
            "good"
        } else if composite >= 40.0 {
            "fair"
        } else if composite >= 20.0 {
            "poor"
        } else {
            "bad"
        };
        let recommendation = if composite >= 70.0 {
            "strong_buy"
        } else if composite >= 50.0 {
            "buy"
        } else if composite >= 30.0 {
            "watch"
        } else {
            "pass"
        };

        DealQualityMetrics {
            retail_discount_score,
            marketplace_score,
            intrinsic_score,
            composite,
            label,
            recommendation,
        }
    }

    /// Full pricing decision for a quoted price, given a valuation
    pub fn decide(
        &self,
        breakdown: &ValuationBreakdown,
        input: &ValuationInput,
        quoted_price: Cents,
        holding_years: f64,
        preset: Option<MarginPreset>,
        margin_override: Option<f64>,
    ) -> PricingDecision {
        // Computed demand first; a sanitized externally supplied score fills
        // in when the scorer never ran
        let ctx = MarginContext {
            data_quality_score: breakdown.data_quality.as_ref().map(|a| a.quality_score),
            demand_score: breakdown
                .demand
                .as_ref()
                .map(|d| d.score)
                .or(input.demand_score),
            availability_score: input.availability_score,
            preset,
            margin_override,
        };
        let margin = self.margin_of_safety(&ctx);
        let intrinsic = breakdown.intrinsic_value;
        let target_price = self.target_price(intrinsic, &margin);
        let realized = self.realized_value(intrinsic, input.weight_grams);

        PricingDecision {
            intrinsic_value: intrinsic,
            quoted_price,
            meets_target: !quoted_price.is_zero() && quoted_price <= target_price,
            expected_roi_pct: self.roi_pct(quoted_price, intrinsic),
            realized_roi_pct: self.roi_pct(quoted_price, realized.net),
            deal_quality: self.deal_quality(
                quoted_price,
                intrinsic,
                input.original_retail,
                input.marketplace_avg,
            ),
            holding_cost: self.holding_cost(intrinsic, holding_years),
            realized_value: realized,
            margin_of_safety: margin,
            target_price,
        }
    }
}

impl Default for PricingDecisionLayer {
    fn default() -> Self {
        Self::new(PricingConfig::default())
    }
}
