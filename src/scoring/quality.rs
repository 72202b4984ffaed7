//! Quality scoring
//!
//! Four components: parts-per-dollar value density, build complexity from
//! absolute piece count, theme premium, and scarcity from competing
//! listings. PPD is computed in major currency units via [`Cents::as_major`]
//! so the density ladder means what it says.

use serde::{Deserialize, Serialize};

use super::{validate_weights, ComponentScore, DataFlags, ScoreResult};
use crate::error::Result;
use crate::input::ValuationInput;
use crate::money::Cents;
use crate::multipliers::theme::{theme_tier, UNRECOGNIZED_QUALITY_POINTS};

/// Component weights for quality scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityWeights {
    #[serde(default = "default_ppd_weight")]
    pub parts_per_dollar: f64,
    #[serde(default = "default_complexity_weight")]
    pub complexity: f64,
    #[serde(default = "default_theme_weight")]
    pub theme: f64,
    #[serde(default = "default_scarcity_weight")]
    pub scarcity: f64,
}

fn default_ppd_weight() -> f64 {
    0.40
}
fn default_complexity_weight() -> f64 {
    0.30
}
fn default_theme_weight() -> f64 {
    0.20
}
fn default_scarcity_weight() -> f64 {
    0.10
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            parts_per_dollar: default_ppd_weight(),
            complexity: default_complexity_weight(),
            theme: default_theme_weight(),
            scarcity: default_scarcity_weight(),
        }
    }
}

impl QualityWeights {
    pub fn validate(&self) -> Result<()> {
        validate_weights(
            "quality",
            &[
                self.parts_per_dollar,
                self.complexity,
                self.theme,
                self.scarcity,
            ],
        )
    }
}

/// Parts per dollar of reference price
pub fn parts_per_dollar(parts: u32, price: Cents) -> Option<f64> {
    let major = price.as_major();
    if major <= 0.0 {
        return None;
    }
    Some(parts as f64 / major)
}

/// Scores product quality for a set, 0-100
pub struct QualityScorer {
    weights: QualityWeights,
}

impl QualityScorer {
    pub fn new(weights: QualityWeights) -> Self {
        Self { weights }
    }

    /// Score a sanitized input
    pub fn score(&self, input: &ValuationInput) -> ScoreResult {
        let flags = DataFlags {
            has_parts: input.parts_count.is_some(),
            has_msrp: input.msrp.is_some(),
            has_theme: input.theme.is_some(),
            has_availability: input.listing_count.is_some(),
            ..DataFlags::default()
        };

        let components = vec![
            self.ppd_component(input),
            self.complexity_component(input),
            self.theme_component(input),
            self.scarcity_component(input),
        ];

        ScoreResult::combine(components, flags)
    }

    /// Value density: parts per dollar of msrp (or current retail fallback)
    fn ppd_component(&self, input: &ValuationInput) -> ComponentScore {
        let w = self.weights.parts_per_dollar;
        let price = input.msrp.or(input.current_retail);
        let (Some(parts), Some(price)) = (input.parts_count, price) else {
            return ComponentScore::no_data("parts_per_dollar", w);
        };
        let Some(ppd) = parts_per_dollar(parts, price) else {
            return ComponentScore::no_data("parts_per_dollar", w);
        };

        let (score, tier) = if ppd >= 12.0 {
            (100.0, "excellent")
        } else if ppd >= 10.0 {
            (75.0, "good")
        } else if ppd >= 6.0 {
            (55.0, "fair")
        } else if ppd >= 4.0 {
            (40.0, "poor")
        } else {
            (ppd / 4.0 * 30.0, "very poor")
        };

        ComponentScore::new(
            "parts_per_dollar",
            score,
            w,
            format!("{ppd:.1} parts/$ ({tier})"),
        )
    }

    /// Absolute piece count as a complexity proxy
    fn complexity_component(&self, input: &ValuationInput) -> ComponentScore {
        let w = self.weights.complexity;
        let Some(parts) = input.parts_count else {
            return ComponentScore::no_data("build_complexity", w);
        };

        let score = match parts {
            2000.. => 100.0,
            1000..=1999 => 80.0,
            500..=999 => 65.0,
            250..=499 => 45.0,
            100..=249 => 20.0,
            _ => 10.0,
        };

        ComponentScore::new("build_complexity", score, w, format!("{parts} parts"))
    }

    /// Theme tier points: 100/75/50 for recognized tiers, 25 otherwise
    fn theme_component(&self, input: &ValuationInput) -> ComponentScore {
        let w = self.weights.theme;
        let Some(theme) = input.theme.as_deref() else {
            return ComponentScore::no_data("theme_premium", w);
        };

        match theme_tier(theme) {
            Some(tier) => ComponentScore::new(
                "theme_premium",
                tier.quality_points(),
                w,
                format!("recognized theme '{theme}'"),
            ),
            None => ComponentScore::new(
                "theme_premium",
                UNRECOGNIZED_QUALITY_POINTS,
                w,
                format!("unrecognized theme '{theme}'"),
            ),
        }
    }

    /// Competing listing count, with a bonus for limited editions
    fn scarcity_component(&self, input: &ValuationInput) -> ComponentScore {
        let w = self.weights.scarcity;
        let Some(listings) = input.listing_count else {
            return ComponentScore::no_data("scarcity", w);
        };

        let base: f64 = match listings {
            0..=10 => 100.0,
            11..=25 => 80.0,
            26..=50 => 60.0,
            51..=100 => 40.0,
            101..=200 => 20.0,
            _ => 10.0,
        };
        let bonus = if input.limited_edition { 20.0 } else { 0.0 };

        ComponentScore::new(
            "scarcity",
            (base + bonus).min(100.0),
            w,
            format!(
                "{listings} competing listings{}",
                if input.limited_edition {
                    ", limited edition"
                } else {
                    ""
                }
            ),
        )
    }
}

impl Default for QualityScorer {
    fn default() -> Self {
        Self::new(QualityWeights::default())
    }
}
