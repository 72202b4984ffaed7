//! Composite scoring
//!
//! Demand and quality are each scored by a small set of independently
//! computed weighted components. A component with missing inputs scores 0
//! with zero confidence - bad until proven, never guessed optimistically.

pub mod demand;
pub mod quality;

use serde::Serialize;

use crate::error::{Error, Result};

/// One weighted scoring component
#[derive(Debug, Clone, Serialize)]
pub struct ComponentScore {
    /// Component name, stable across calls for audit diffing
    pub name: &'static str,
    /// 0-100
    pub score: f64,
    /// 0-1, fixed by configuration
    pub weight: f64,
    /// score x weight
    pub weighted_score: f64,
    /// 0-1, how much data backed this component
    pub confidence: f64,
    /// Human-readable basis for the score
    pub note: String,
}

impl ComponentScore {
    /// A fully-backed component
    pub fn new(name: &'static str, score: f64, weight: f64, note: impl Into<String>) -> Self {
        Self::with_confidence(name, score, weight, 1.0, note)
    }

    pub fn with_confidence(
        name: &'static str,
        score: f64,
        weight: f64,
        confidence: f64,
        note: impl Into<String>,
    ) -> Self {
        let score = score.clamp(0.0, 100.0);
        Self {
            name,
            score,
            weight,
            weighted_score: score * weight,
            confidence: confidence.clamp(0.0, 1.0),
            note: note.into(),
        }
    }

    /// Pessimistic default for a component with no usable data
    pub fn no_data(name: &'static str, weight: f64) -> Self {
        Self::with_confidence(name, 0.0, weight, 0.0, "no data")
    }
}

/// A scorer's combined output
#[derive(Debug, Clone, Serialize)]
pub struct ScoreResult {
    /// Weighted 0-100 score
    pub score: f64,
    /// Weight-weighted average of component confidences, 0-1
    pub confidence: f64,
    pub components: Vec<ComponentScore>,
    /// Which input facts were available, for the breakdown layer
    pub data_flags: DataFlags,
}

impl ScoreResult {
    /// Combine components into a final score and confidence
    pub fn combine(components: Vec<ComponentScore>, data_flags: DataFlags) -> Self {
        let score: f64 = components.iter().map(|c| c.weighted_score).sum();
        let weight_sum: f64 = components.iter().map(|c| c.weight).sum();
        let confidence = if weight_sum > 0.0 {
            components
                .iter()
                .map(|c| c.confidence * c.weight)
                .sum::<f64>()
                / weight_sum
        } else {
            0.0
        };

        Self {
            score: score.clamp(0.0, 100.0),
            confidence,
            components,
            data_flags,
        }
    }

    /// Look up a component by name
    pub fn component(&self, name: &str) -> Option<&ComponentScore> {
        self.components.iter().find(|c| c.name == name)
    }
}

/// Availability of the input facts a scorer cares about
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct DataFlags {
    pub has_parts: bool,
    pub has_msrp: bool,
    pub has_theme: bool,
    pub has_availability: bool,
    pub has_velocity: bool,
    pub has_sales: bool,
    pub has_trend: bool,
}

/// Startup invariant shared by both scorers: weights sum to 1.0 ± 1e-3
pub fn validate_weights(scorer: &'static str, weights: &[f64]) -> Result<()> {
    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > 1e-3 {
        return Err(Error::WeightSum {
            scorer,
            sum,
            tolerance: 1e-3,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_clamps_score() {
        let c = ComponentScore::new("velocity", 150.0, 0.3, "ladder top");
        assert_eq!(c.score, 100.0);
        assert!((c.weighted_score - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_data_is_pessimistic() {
        let c = ComponentScore::no_data("momentum", 0.25);
        assert_eq!(c.score, 0.0);
        assert_eq!(c.confidence, 0.0);
        assert_eq!(c.weighted_score, 0.0);
    }

    #[test]
    fn test_combine_weighted_sum() {
        let components = vec![
            ComponentScore::new("a", 100.0, 0.6, ""),
            ComponentScore::new("b", 50.0, 0.4, ""),
        ];
        let result = ScoreResult::combine(components, DataFlags::default());
        assert!((result.score - 80.0).abs() < 1e-9);
        assert!((result.confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_combine_confidence_is_weight_weighted() {
        let components = vec![
            ComponentScore::with_confidence("a", 100.0, 0.8, 1.0, ""),
            ComponentScore::no_data("b", 0.2),
        ];
        let result = ScoreResult::combine(components, DataFlags::default());
        assert!((result.confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_validate_weights() {
        assert!(validate_weights("demand", &[0.30, 0.25, 0.20, 0.15, 0.10]).is_ok());
        assert!(validate_weights("demand", &[0.30, 0.25, 0.20, 0.15]).is_err());
        // Within tolerance
        assert!(validate_weights("demand", &[0.3001, 0.25, 0.20, 0.15, 0.10]).is_ok());
    }
}
