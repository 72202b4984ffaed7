//! Demand scoring
//!
//! Five components: sales velocity, price momentum, market depth,
//! supply/demand ratio, and velocity consistency. Thresholds are ladders
//! calibrated for slow-moving collectibles, where half a unit a day is a
//! hot set.

use serde::{Deserialize, Serialize};

use super::{validate_weights, ComponentScore, DataFlags, ScoreResult};
use crate::error::Result;
use crate::input::ValuationInput;

/// Component weights for demand scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandWeights {
    #[serde(default = "default_velocity_weight")]
    pub velocity: f64,
    #[serde(default = "default_momentum_weight")]
    pub momentum: f64,
    #[serde(default = "default_depth_weight")]
    pub market_depth: f64,
    #[serde(default = "default_supply_demand_weight")]
    pub supply_demand: f64,
    #[serde(default = "default_consistency_weight")]
    pub consistency: f64,
}

fn default_velocity_weight() -> f64 {
    0.30
}
fn default_momentum_weight() -> f64 {
    0.25
}
fn default_depth_weight() -> f64 {
    0.20
}
fn default_supply_demand_weight() -> f64 {
    0.15
}
fn default_consistency_weight() -> f64 {
    0.10
}

impl Default for DemandWeights {
    fn default() -> Self {
        Self {
            velocity: default_velocity_weight(),
            momentum: default_momentum_weight(),
            market_depth: default_depth_weight(),
            supply_demand: default_supply_demand_weight(),
            consistency: default_consistency_weight(),
        }
    }
}

impl DemandWeights {
    pub fn validate(&self) -> Result<()> {
        validate_weights(
            "demand",
            &[
                self.velocity,
                self.momentum,
                self.market_depth,
                self.supply_demand,
                self.consistency,
            ],
        )
    }
}

/// Minimum timestamped sales for the consistency component
const MIN_SALES_FOR_CONSISTENCY: usize = 10;

/// Scores market demand for a set, 0-100
pub struct DemandScorer {
    weights: DemandWeights,
}

impl DemandScorer {
    pub fn new(weights: DemandWeights) -> Self {
        Self { weights }
    }

    /// Score a sanitized input
    pub fn score(&self, input: &ValuationInput) -> ScoreResult {
        let flags = DataFlags {
            has_velocity: input.sales_velocity.is_some(),
            has_sales: input.has_sales_signal(),
            has_availability: input.available_quantity.is_some(),
            has_trend: input.price_trend_pct.is_some(),
            ..DataFlags::default()
        };

        let components = vec![
            self.velocity_component(input),
            self.momentum_component(input),
            self.market_depth_component(input),
            self.supply_demand_component(input),
            self.consistency_component(input),
        ];

        ScoreResult::combine(components, flags)
    }

    /// Sales velocity ladder (units/day)
    fn velocity_component(&self, input: &ValuationInput) -> ComponentScore {
        let w = self.weights.velocity;
        let Some(velocity) = input.sales_velocity else {
            return ComponentScore::no_data("sales_velocity", w);
        };

        let score = if velocity >= 0.5 {
            100.0
        } else if velocity >= 0.2 {
            75.0
        } else if velocity >= 0.1 {
            50.0
        } else if velocity >= 1.0 / 30.0 {
            25.0
        } else if velocity >= 0.01 {
            10.0
        } else {
            // Below one sale per 100 days: scale the bottom rung down
            velocity / 0.01 * 10.0
        };

        ComponentScore::new(
            "sales_velocity",
            score,
            w,
            format!("{velocity:.3} units/day"),
        )
    }

    /// Price momentum centered at 0% = 50 points
    fn momentum_component(&self, input: &ValuationInput) -> ComponentScore {
        let w = self.weights.momentum;
        let Some(trend) = input.price_trend_pct else {
            return ComponentScore::no_data("price_momentum", w);
        };

        let score = 50.0 + trend * 2.5;
        ComponentScore::new(
            "price_momentum",
            score,
            w,
            format!("{trend:+.1}% over window"),
        )
    }

    /// Fewer competing sellers scores higher
    fn market_depth_component(&self, input: &ValuationInput) -> ComponentScore {
        let w = self.weights.market_depth;
        let Some(listings) = input.listing_count else {
            return ComponentScore::no_data("market_depth", w);
        };

        let score = match listings {
            0..=5 => 100.0,
            6..=20 => 80.0,
            21..=50 => 60.0,
            51..=100 => 40.0,
            101..=250 => 20.0,
            _ => 10.0,
        };

        ComponentScore::new("market_depth", score, w, format!("{listings} competing listings"))
    }

    /// Units sold over the window vs units still listed
    fn supply_demand_component(&self, input: &ValuationInput) -> ComponentScore {
        let w = self.weights.supply_demand;
        let (Some(sold), Some(available)) = (input.times_sold, input.available_quantity) else {
            return ComponentScore::no_data("supply_demand_ratio", w);
        };
        if available == 0 {
            // Nothing listed: demand exceeds visible supply
            return ComponentScore::new("supply_demand_ratio", 100.0, w, "no remaining supply");
        }

        let ratio = sold as f64 / available as f64;
        let score = if ratio >= 2.0 {
            100.0
        } else if ratio >= 1.0 {
            80.0
        } else if ratio >= 0.5 {
            60.0
        } else if ratio >= 0.25 {
            40.0
        } else if ratio >= 0.1 {
            20.0
        } else {
            10.0
        };

        ComponentScore::new(
            "supply_demand_ratio",
            score,
            w,
            format!("{sold} sold vs {available} available (ratio {ratio:.2})"),
        )
    }

    /// Coefficient of variation of inter-sale gaps; erratic selling is a
    /// weaker demand signal than a steady drumbeat
    fn consistency_component(&self, input: &ValuationInput) -> ComponentScore {
        let w = self.weights.consistency;
        if input.sales.len() < MIN_SALES_FOR_CONSISTENCY {
            return ComponentScore::with_confidence(
                "velocity_consistency",
                0.0,
                w,
                0.3,
                format!(
                    "{} timestamped sales, need {MIN_SALES_FOR_CONSISTENCY}",
                    input.sales.len()
                ),
            );
        }

        let gaps: Vec<f64> = input
            .sales
            .windows(2)
            .map(|pair| (pair[1].timestamp - pair[0].timestamp).num_seconds() as f64 / 86_400.0)
            .collect();

        let mean = gaps.iter().sum::<f64>() / gaps.len() as f64;
        if mean <= 0.0 {
            return ComponentScore::with_confidence(
                "velocity_consistency",
                0.0,
                w,
                0.3,
                "degenerate sale timestamps",
            );
        }
        let variance = gaps.iter().map(|g| (g - mean).powi(2)).sum::<f64>() / gaps.len() as f64;
        let cov = variance.sqrt() / mean;

        let score = if cov <= 0.5 {
            100.0
        } else if cov <= 1.0 {
            75.0
        } else if cov <= 1.5 {
            50.0
        } else if cov <= 2.0 {
            25.0
        } else {
            10.0
        };

        ComponentScore::new(
            "velocity_consistency",
            score,
            w,
            format!("inter-sale CoV {cov:.2} over {} sales", input.sales.len()),
        )
    }
}

impl Default for DemandScorer {
    fn default() -> Self {
        Self::new(DemandWeights::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::SaleRecord;
    use chrono::{Duration, Utc};

    fn scorer() -> DemandScorer {
        DemandScorer::default()
    }

    fn steady_sales(count: usize, gap_hours: i64) -> Vec<SaleRecord> {
        let start = Utc::now() - Duration::days(180);
        (0..count)
            .map(|i| SaleRecord {
                timestamp: start + Duration::hours(gap_hours * i as i64),
                price: None,
            })
            .collect()
    }

    #[test]
    fn test_empty_input_scores_zero() {
        let result = scorer().score(&ValuationInput::default());
        assert_eq!(result.score, 0.0);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.components.len(), 5);
    }

    #[test]
    fn test_velocity_ladder() {
        let cases = [
            (0.6, 100.0),
            (0.5, 100.0),
            (0.25, 75.0),
            (0.12, 50.0),
            (0.05, 25.0),
            (0.02, 10.0),
            (0.005, 5.0), // scaled bottom rung
        ];
        for (velocity, expected) in cases {
            let mut input = ValuationInput::default();
            input.sales_velocity = Some(velocity);
            let result = scorer().score(&input);
            let c = result.component("sales_velocity").unwrap();
            assert!(
                (c.score - expected).abs() < 1e-9,
                "velocity {velocity} expected {expected}, got {}",
                c.score
            );
        }
    }

    #[test]
    fn test_momentum_centered_at_fifty() {
        let mut input = ValuationInput::default();
        input.price_trend_pct = Some(0.0);
        let c = scorer().score(&input);
        assert_eq!(c.component("price_momentum").unwrap().score, 50.0);

        input.price_trend_pct = Some(10.0);
        let c = scorer().score(&input);
        assert_eq!(c.component("price_momentum").unwrap().score, 75.0);

        input.price_trend_pct = Some(-30.0);
        let c = scorer().score(&input);
        // Clamped at 0
        assert_eq!(c.component("price_momentum").unwrap().score, 0.0);
    }

    #[test]
    fn test_market_depth_inverse_to_listings() {
        let mut few = ValuationInput::default();
        few.listing_count = Some(8);
        let mut many = ValuationInput::default();
        many.listing_count = Some(220);

        let few_score = scorer().score(&few).component("market_depth").unwrap().score;
        let many_score = scorer()
            .score(&many)
            .component("market_depth")
            .unwrap()
            .score;
        assert!(few_score > many_score);
        assert_eq!(many_score, 20.0);
    }

    #[test]
    fn test_supply_demand_ratio() {
        let mut input = ValuationInput::default();
        input.times_sold = Some(120);
        input.available_quantity = Some(100);
        let c = scorer().score(&input);
        assert_eq!(c.component("supply_demand_ratio").unwrap().score, 80.0);

        input.available_quantity = Some(0);
        let c = scorer().score(&input);
        assert_eq!(c.component("supply_demand_ratio").unwrap().score, 100.0);
    }

    #[test]
    fn test_consistency_needs_ten_sales() {
        let mut input = ValuationInput::default();
        input.sales = steady_sales(6, 24);
        let result = scorer().score(&input);
        let c = result.component("velocity_consistency").unwrap();
        assert_eq!(c.score, 0.0);
        assert!((c.confidence - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_steady_sales_score_high_consistency() {
        let mut input = ValuationInput::default();
        input.sales = steady_sales(20, 24); // one per day, perfectly regular
        let result = scorer().score(&input);
        let c = result.component("velocity_consistency").unwrap();
        assert_eq!(c.score, 100.0);
        assert_eq!(c.confidence, 1.0);
    }

    #[test]
    fn test_hot_set_scores_high() {
        let mut input = ValuationInput::default().with_market(0.5, 20, 5);
        input.price_trend_pct = Some(8.0);
        input.times_sold = Some(90);
        input.sales = steady_sales(20, 48);

        let result = scorer().score(&input);
        assert!(result.score >= 80.0, "got {}", result.score);
        assert!(result.confidence > 0.9);
    }

    #[test]
    fn test_weights_validate() {
        assert!(DemandWeights::default().validate().is_ok());
        let bad = DemandWeights {
            velocity: 0.9,
            ..DemandWeights::default()
        };
        assert!(bad.validate().is_err());
    }
}
