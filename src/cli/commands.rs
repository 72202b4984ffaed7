//! CLI command implementations

use anyhow::{bail, Context, Result};
use std::io::Read;
use tracing::{info, warn};

use crate::config::ValuationConfig;
use crate::engine::{IntrinsicValueEngine, ValuationBreakdown};
use crate::input::sanitizer::InputSanitizer;
use crate::input::{RawListing, ValuationInput};
use crate::money::Cents;
use crate::pricing::{MarginPreset, PricingDecisionLayer};
use crate::projection::ValueProjector;

/// Read a raw listing document from a file, or stdin when `path` is "-"
fn read_listing(path: &str) -> Result<RawListing> {
    let text = if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read listing from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read listing file {path}"))?
    };
    serde_json::from_str(&text).with_context(|| format!("Malformed listing JSON in {path}"))
}

/// Sanitize a raw listing, surfacing warnings, failing when unusable
fn sanitize(config: &ValuationConfig, raw: &RawListing) -> Result<ValuationInput> {
    let sanitizer = InputSanitizer::new(config.sanitizer.clone());
    let sanitized = sanitizer.sanitize(raw);
    for warning in &sanitized.warnings {
        warn!("{warning}");
    }
    match sanitized.input {
        Some(input) if sanitized.is_valid => Ok(input),
        _ => bail!("listing has no usable price source after sanitization"),
    }
}

fn parse_preset(preset: Option<&str>) -> Result<Option<MarginPreset>> {
    match preset {
        None => Ok(None),
        Some("conservative") => Ok(Some(MarginPreset::Conservative)),
        Some("balanced") => Ok(Some(MarginPreset::Balanced)),
        Some("aggressive") => Ok(Some(MarginPreset::Aggressive)),
        Some(other) => bail!(
            "unknown preset '{other}' (expected conservative, balanced, or aggressive)"
        ),
    }
}

fn print_breakdown(breakdown: &ValuationBreakdown) {
    println!(
        "Set:             {}",
        breakdown.set_id.as_deref().unwrap_or("(unnamed)")
    );
    println!(
        "Base value:      {} (source: {})",
        breakdown.base_value, breakdown.base_source
    );

    if let Some(demand) = &breakdown.demand {
        println!(
            "Demand score:    {:.1}/100 (confidence {:.0}%)",
            demand.score,
            demand.confidence * 100.0
        );
    }
    if let Some(quality) = &breakdown.quality {
        println!(
            "Quality score:   {:.1}/100 (confidence {:.0}%)",
            quality.score,
            quality.confidence * 100.0
        );
    }
    if let Some(assessment) = &breakdown.data_quality {
        println!("Data quality:    {}", assessment.explanation());
    }

    if let Some(rejection) = &breakdown.rejection {
        println!("\nREJECTED [{}]: {}", rejection.category, rejection.reason);
        return;
    }

    if !breakdown.multipliers.is_empty() {
        println!("\nMultipliers:");
        for m in &breakdown.multipliers {
            println!("  {:<16} {:>5.2}x  {:<18} {}", m.kind.to_string(), m.value, m.tier, m.note);
        }
        println!("  {:<16} {:>5.2}x", "combined", breakdown.combined_multiplier);
    }
    if let Some(adjustment) = &breakdown.bound_adjustment {
        println!(
            "\nSanity clamp:    raw {} held at {:.2}x base ({} bound)",
            adjustment.raw_value, adjustment.bound, adjustment.direction
        );
    }
    println!("\nIntrinsic value: {}", breakdown.intrinsic_value);
}

/// Run the full pipeline and print a valuation with pricing advice
#[allow(clippy::too_many_arguments)]
pub fn evaluate(
    config: &ValuationConfig,
    input_path: &str,
    quoted_price_cents: Option<u64>,
    preset: Option<&str>,
    margin_override: Option<f64>,
    holding_years: f64,
    json: bool,
) -> Result<()> {
    let preset = parse_preset(preset)?;
    let raw = read_listing(input_path)?;
    let input = sanitize(config, &raw)?;

    let engine = IntrinsicValueEngine::new(config.clone());
    let breakdown = engine.evaluate(&input);

    let quoted = quoted_price_cents
        .map(Cents::new)
        .or(input.marketplace_avg);
    let decision = quoted.map(|price| {
        PricingDecisionLayer::new(config.pricing.clone()).decide(
            &breakdown,
            &input,
            price,
            holding_years,
            preset,
            margin_override,
        )
    });

    if json {
        let doc = serde_json::json!({
            "breakdown": breakdown,
            "pricing": decision,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    print_breakdown(&breakdown);

    if let Some(decision) = decision {
        println!("\nPricing:");
        println!(
            "  Margin of safety: {:.0}% ({:?})",
            decision.margin_of_safety.value * 100.0,
            decision.margin_of_safety.basis
        );
        for adjustment in &decision.margin_of_safety.adjustments {
            println!("    {adjustment}");
        }
        println!("  Target price:     {}", decision.target_price);
        println!(
            "  Quoted price:     {} ({})",
            decision.quoted_price,
            if decision.meets_target {
                "meets target"
            } else {
                "above target"
            }
        );
        println!("  Expected ROI:     {:+.1}%", decision.expected_roi_pct);
        println!(
            "  Realized ROI:     {:+.1}% (net {} after costs)",
            decision.realized_roi_pct, decision.realized_value.net
        );
        println!("  Holding cost:     {}", decision.holding_cost);
        println!(
            "  Deal quality:     {:.0}/100 ({}) -> {}",
            decision.deal_quality.composite,
            decision.deal_quality.label,
            decision.deal_quality.recommendation
        );
    } else {
        info!("no quoted price and no marketplace average; pricing advice skipped");
    }

    Ok(())
}

/// Print scores and data-quality assessment without a valuation
pub fn score(config: &ValuationConfig, input_path: &str, json: bool) -> Result<()> {
    let raw = read_listing(input_path)?;
    let input = sanitize(config, &raw)?;

    let demand = crate::scoring::demand::DemandScorer::new(config.demand_weights.clone());
    let quality = crate::scoring::quality::QualityScorer::new(config.quality_weights.clone());
    let gate = crate::input::quality_gate::DataQualityGate::new(config.quality_gate.clone());

    let demand = demand.score(&input);
    let quality = quality.score(&input);
    let assessment = gate.assess(&input);

    if json {
        let doc = serde_json::json!({
            "demand": demand,
            "quality": quality,
            "data_quality": assessment,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("Data quality: {}", assessment.explanation());
    for (label, result) in [("Demand", &demand), ("Quality", &quality)] {
        println!(
            "\n{label} score: {:.1}/100 (confidence {:.0}%)",
            result.score,
            result.confidence * 100.0
        );
        for c in &result.components {
            println!(
                "  {:<22} {:>5.1} x {:.2} = {:>5.1}  {}",
                c.name, c.score, c.weight, c.weighted_score, c.note
            );
        }
    }

    Ok(())
}

/// Print a multi-year value projection
pub fn project(config: &ValuationConfig, input_path: &str, json: bool) -> Result<()> {
    let raw = read_listing(input_path)?;
    let input = sanitize(config, &raw)?;

    let engine = IntrinsicValueEngine::new(config.clone());
    let breakdown = engine.evaluate(&input);
    if let Some(rejection) = &breakdown.rejection {
        bail!("cannot project a rejected valuation: {}", rejection.reason);
    }

    // Computed scores first; a sanitized externally supplied score fills in
    // when the scorer had nothing to work with
    let demand_score = breakdown
        .demand
        .as_ref()
        .map(|d| d.score)
        .or(input.demand_score)
        .unwrap_or(0.0);
    let quality_score = breakdown
        .quality
        .as_ref()
        .map(|q| q.score)
        .or(input.quality_score)
        .unwrap_or(0.0);
    let projector = ValueProjector::new(config.projection.clone());
    let projection = projector.project(
        &input,
        breakdown.intrinsic_value,
        demand_score,
        quality_score,
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&projection)?);
        return Ok(());
    }

    println!("Current value:  {}", projection.current_value);
    println!(
        "CAGR:           {:+.1}%/yr (base {:.1}%, demand x{:.2}, quality x{:.2}, scarcity +{:.1}%)",
        projection.cagr * 100.0,
        projection.components.base * 100.0,
        projection.components.demand_multiplier,
        projection.components.quality_multiplier,
        projection.components.scarcity_bonus * 100.0
    );
    println!("  1 year:       {}", projection.year_1);
    println!("  3 years:      {}", projection.year_3);
    println!("  5 years:      {}", projection.year_5);
    println!("Confidence:     {:.0}/100", projection.confidence);
    for assumption in &projection.assumptions {
        println!("  assumes: {assumption}");
    }
    for risk in &projection.risks {
        println!("  risk: {risk}");
    }

    Ok(())
}

/// Show the effective configuration
pub fn show_config(config: &ValuationConfig, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
    } else {
        println!("{}", config.display());
    }
    Ok(())
}
