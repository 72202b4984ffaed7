//! Data quality gate
//!
//! Scores how complete a sanitized input is across four categories and
//! decides whether a valuation is worth computing at all. The gate is
//! advisory-and-blocking: when `can_calculate` is false, downstream callers
//! skip valuation entirely and surface the assessment instead of a number.

use serde::{Deserialize, Serialize};

use super::ValuationInput;
use crate::error::{Error, Result};

/// Confidence tier derived from the overall quality score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
    Insufficient,
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfidenceLevel::High => write!(f, "HIGH"),
            ConfidenceLevel::Medium => write!(f, "MEDIUM"),
            ConfidenceLevel::Low => write!(f, "LOW"),
            ConfidenceLevel::Insufficient => write!(f, "INSUFFICIENT"),
        }
    }
}

/// Per-category completeness report
#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryReport {
    /// 0-100 completeness sub-score
    pub score: f64,
    pub missing_critical: Vec<String>,
    pub missing_optional: Vec<String>,
}

/// Overall data quality assessment
#[derive(Debug, Clone, Serialize)]
pub struct DataQualityAssessment {
    /// False iff any category reports a missing-critical item
    pub can_calculate: bool,
    /// Weighted 0-100 quality score
    pub quality_score: f64,
    pub confidence: ConfidenceLevel,
    /// Union of all categories' missing-critical items
    pub missing_critical: Vec<String>,
    /// Union of all categories' missing-optional items
    pub missing_optional: Vec<String>,
    pub pricing: CategoryReport,
    pub sales: CategoryReport,
    pub market: CategoryReport,
    pub product: CategoryReport,
}

impl DataQualityAssessment {
    /// One-line explanation, used when valuation is skipped
    pub fn explanation(&self) -> String {
        if self.can_calculate {
            format!(
                "data quality {:.0}/100 ({})",
                self.quality_score, self.confidence
            )
        } else {
            format!(
                "cannot calculate: missing {}",
                self.missing_critical.join(", ")
            )
        }
    }
}

/// Category weights and tier thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityGateConfig {
    #[serde(default = "default_pricing_weight")]
    pub pricing_weight: f64,
    #[serde(default = "default_sales_weight")]
    pub sales_weight: f64,
    #[serde(default = "default_market_weight")]
    pub market_weight: f64,
    #[serde(default = "default_product_weight")]
    pub product_weight: f64,
    /// quality_score >= this is HIGH confidence
    #[serde(default = "default_high_threshold")]
    pub high_threshold: f64,
    /// quality_score >= this is MEDIUM confidence
    #[serde(default = "default_medium_threshold")]
    pub medium_threshold: f64,
}

fn default_pricing_weight() -> f64 {
    0.30
}
fn default_sales_weight() -> f64 {
    0.35
}
fn default_market_weight() -> f64 {
    0.25
}
fn default_product_weight() -> f64 {
    0.10
}
fn default_high_threshold() -> f64 {
    80.0
}
fn default_medium_threshold() -> f64 {
    50.0
}

impl Default for QualityGateConfig {
    fn default() -> Self {
        Self {
            pricing_weight: default_pricing_weight(),
            sales_weight: default_sales_weight(),
            market_weight: default_market_weight(),
            product_weight: default_product_weight(),
            high_threshold: default_high_threshold(),
            medium_threshold: default_medium_threshold(),
        }
    }
}

impl QualityGateConfig {
    /// Startup invariant: category weights sum to 1.0 ± 1e-3
    pub fn validate(&self) -> Result<()> {
        let sum =
            self.pricing_weight + self.sales_weight + self.market_weight + self.product_weight;
        if (sum - 1.0).abs() > 1e-3 {
            return Err(Error::WeightSum {
                scorer: "quality_gate",
                sum,
                tolerance: 1e-3,
            });
        }
        Ok(())
    }
}

/// Scores input completeness and decides whether to proceed
pub struct DataQualityGate {
    config: QualityGateConfig,
}

impl DataQualityGate {
    pub fn new(config: QualityGateConfig) -> Self {
        Self { config }
    }

    /// Assess a sanitized input
    pub fn assess(&self, input: &ValuationInput) -> DataQualityAssessment {
        let pricing = self.assess_pricing(input);
        let sales = self.assess_sales(input);
        let market = self.assess_market(input);
        let product = self.assess_product(input);

        let quality_score = pricing.score * self.config.pricing_weight
            + sales.score * self.config.sales_weight
            + market.score * self.config.market_weight
            + product.score * self.config.product_weight;

        let missing_critical: Vec<String> = [&pricing, &sales, &market, &product]
            .iter()
            .flat_map(|c| c.missing_critical.iter().cloned())
            .collect();
        let missing_optional: Vec<String> = [&pricing, &sales, &market, &product]
            .iter()
            .flat_map(|c| c.missing_optional.iter().cloned())
            .collect();

        let can_calculate = missing_critical.is_empty();
        let confidence = if !can_calculate {
            ConfidenceLevel::Insufficient
        } else if quality_score >= self.config.high_threshold {
            ConfidenceLevel::High
        } else if quality_score >= self.config.medium_threshold {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        };

        DataQualityAssessment {
            can_calculate,
            quality_score,
            confidence,
            missing_critical,
            missing_optional,
            pricing,
            sales,
            market,
            product,
        }
    }

    fn assess_pricing(&self, input: &ValuationInput) -> CategoryReport {
        let mut report = CategoryReport::default();

        // Any one of these satisfies the critical base-price requirement
        let base_sources = [
            input.msrp.is_some(),
            input.current_retail.is_some(),
            input.marketplace_avg.is_some(),
        ];
        let base_present = base_sources.iter().filter(|p| **p).count();
        if base_present == 0 {
            report
                .missing_critical
                .push("base price source (msrp, current retail, or marketplace avg)".to_string());
        }

        let optionals = [
            (input.original_retail.is_some(), "original retail"),
            (input.marketplace_max.is_some(), "marketplace max"),
            (!input.price_history.is_empty(), "price history"),
        ];
        for (present, name) in optionals {
            if !present {
                report.missing_optional.push(name.to_string());
            }
        }

        // Critical slots count double: 3 base sources x2 + 3 optionals = 9 units
        let optional_present = optionals.iter().filter(|(p, _)| *p).count();
        report.score = 100.0 * (2.0 * base_present as f64 + optional_present as f64) / 9.0;
        report
    }

    fn assess_sales(&self, input: &ValuationInput) -> CategoryReport {
        let mut report = CategoryReport::default();

        let signals = [
            input.sales_velocity.is_some(),
            input.times_sold.is_some(),
            input.avg_days_between_sales.is_some(),
        ];
        let signals_present = signals.iter().filter(|p| **p).count();
        if signals_present == 0 && input.sales.is_empty() {
            report
                .missing_critical
                .push("sales history signal (velocity, times sold, or sale interval)".to_string());
        }

        let timestamped_depth = input.sales.len() >= 10;
        if !timestamped_depth {
            report
                .missing_optional
                .push("timestamped sales (>= 10 records)".to_string());
        }

        // 3 signals x2 + 1 optional = 7 units
        report.score =
            100.0 * (2.0 * signals_present as f64 + timestamped_depth as u8 as f64) / 7.0;
        report
    }

    fn assess_market(&self, input: &ValuationInput) -> CategoryReport {
        let mut report = CategoryReport::default();

        // No critical items: market depth refines a valuation, it does not
        // enable one.
        let optionals = [
            (input.available_quantity.is_some(), "available quantity"),
            (input.listing_count.is_some(), "competing listing count"),
            (input.price_volatility.is_some(), "price volatility"),
            (input.price_trend_pct.is_some(), "price trend"),
            (input.price_decline_pct.is_some(), "price decline rate"),
        ];
        for (present, name) in optionals {
            if !present {
                report.missing_optional.push(name.to_string());
            }
        }
        let present = optionals.iter().filter(|(p, _)| *p).count();
        report.score = 100.0 * present as f64 / optionals.len() as f64;
        report
    }

    fn assess_product(&self, input: &ValuationInput) -> CategoryReport {
        let mut report = CategoryReport::default();

        let optionals = [
            (input.theme.is_some(), "theme"),
            (input.parts_count.is_some(), "parts count"),
            (input.retirement.is_some(), "retirement status"),
            (input.years_post_retirement.is_some(), "years since retirement"),
            (input.year_released.is_some(), "year released"),
        ];
        for (present, name) in optionals {
            if !present {
                report.missing_optional.push(name.to_string());
            }
        }
        let present = optionals.iter().filter(|(p, _)| *p).count();
        report.score = 100.0 * present as f64 / optionals.len() as f64;
        report
    }
}

impl Default for DataQualityGate {
    fn default() -> Self {
        Self::new(QualityGateConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::RetirementStatus;

    fn gate() -> DataQualityGate {
        DataQualityGate::default()
    }

    fn rich_input() -> ValuationInput {
        let mut input = ValuationInput::default()
            .with_msrp(85_000)
            .with_marketplace(95_000, 120_000)
            .with_market(0.4, 120, 8)
            .with_retirement(RetirementStatus::Retired, 3.0)
            .with_product("Star Wars", 5544);
        input.original_retail = Some(crate::money::Cents::new(85_000));
        input.price_history = vec![crate::money::Cents::new(90_000)];
        input.times_sold = Some(60);
        input.avg_days_between_sales = Some(2.5);
        input.price_volatility = Some(0.12);
        input.price_trend_pct = Some(4.0);
        input.price_decline_pct = Some(0.0);
        input.year_released = Some(2017);
        input
    }

    #[test]
    fn test_rich_input_high_confidence() {
        let assessment = gate().assess(&rich_input());
        assert!(assessment.can_calculate);
        assert!(assessment.quality_score >= 80.0, "got {}", assessment.quality_score);
        assert_eq!(assessment.confidence, ConfidenceLevel::High);
        assert!(assessment.missing_critical.is_empty());
    }

    #[test]
    fn test_no_price_source_blocks() {
        let mut input = ValuationInput::default();
        input.times_sold = Some(10);
        let assessment = gate().assess(&input);
        assert!(!assessment.can_calculate);
        assert_eq!(assessment.confidence, ConfidenceLevel::Insufficient);
        assert!(assessment
            .missing_critical
            .iter()
            .any(|m| m.contains("base price source")));
    }

    #[test]
    fn test_no_sales_signal_blocks() {
        let input = ValuationInput::default().with_msrp(85_000);
        let assessment = gate().assess(&input);
        assert!(!assessment.can_calculate);
        assert!(assessment
            .missing_critical
            .iter()
            .any(|m| m.contains("sales history")));
    }

    #[test]
    fn test_sparse_but_calculable_is_low() {
        let mut input = ValuationInput::default().with_msrp(85_000);
        input.times_sold = Some(5);
        let assessment = gate().assess(&input);
        assert!(assessment.can_calculate);
        assert!(assessment.quality_score < 50.0);
        assert_eq!(assessment.confidence, ConfidenceLevel::Low);
        assert!(!assessment.missing_optional.is_empty());
    }

    #[test]
    fn test_explanation_text() {
        let assessment = gate().assess(&ValuationInput::default());
        assert!(assessment.explanation().starts_with("cannot calculate"));

        let assessment = gate().assess(&rich_input());
        assert!(assessment.explanation().contains("HIGH"));
    }

    #[test]
    fn test_config_weight_validation() {
        assert!(QualityGateConfig::default().validate().is_ok());

        let bad = QualityGateConfig {
            pricing_weight: 0.5,
            ..QualityGateConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
