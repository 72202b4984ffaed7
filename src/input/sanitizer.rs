//! Input sanitization
//!
//! Scraped marketplace data is noisy: bubble prices, negative counters,
//! bot-inflated velocities. The sanitizer drops identity-critical fields
//! that are outside sane bounds and clamps counter fields that are merely
//! out of range. Every drop or clamp produces a human-readable warning.
//! It never errors on business data - only the absence of any usable
//! pricing source makes the outcome invalid.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{RawListing, SaleRecord, ValuationInput};
use crate::money::Cents;

/// Bounds for sanitization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanitizerConfig {
    /// Minimum plausible price in minor units ($1)
    #[serde(default = "default_min_price_cents")]
    pub min_price_cents: u64,
    /// Maximum plausible price in minor units ($100k); rejects bubble data
    #[serde(default = "default_max_price_cents")]
    pub max_price_cents: u64,
    /// Maximum plausible sales velocity in units/day
    #[serde(default = "default_max_sales_velocity")]
    pub max_sales_velocity: f64,
    /// Parts count bounds
    #[serde(default = "default_min_parts")]
    pub min_parts: u32,
    #[serde(default = "default_max_parts")]
    pub max_parts: u32,
    /// Maximum plausible years since retirement
    #[serde(default = "default_max_years_post_retirement")]
    pub max_years_post_retirement: f64,
    /// Cap for available quantity (clamped, not dropped)
    #[serde(default = "default_max_available_quantity")]
    pub max_available_quantity: u32,
    /// Cap for competing listing count (clamped, not dropped)
    #[serde(default = "default_max_listing_count")]
    pub max_listing_count: u32,
    /// Cap for total times sold (clamped, not dropped)
    #[serde(default = "default_max_times_sold")]
    pub max_times_sold: u32,
    /// Maximum plausible price coefficient of variation
    #[serde(default = "default_max_volatility")]
    pub max_volatility: f64,
    /// Absolute bound on trend/decline percentages
    #[serde(default = "default_max_trend_pct")]
    pub max_trend_pct: f64,
}

fn default_min_price_cents() -> u64 {
    100
}
fn default_max_price_cents() -> u64 {
    10_000_000
}
fn default_max_sales_velocity() -> f64 {
    10.0
}
fn default_min_parts() -> u32 {
    1
}
fn default_max_parts() -> u32 {
    20_000
}
fn default_max_years_post_retirement() -> f64 {
    100.0
}
fn default_max_available_quantity() -> u32 {
    50_000
}
fn default_max_listing_count() -> u32 {
    10_000
}
fn default_max_times_sold() -> u32 {
    100_000
}
fn default_max_volatility() -> f64 {
    10.0
}
fn default_max_trend_pct() -> f64 {
    1_000.0
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            min_price_cents: default_min_price_cents(),
            max_price_cents: default_max_price_cents(),
            max_sales_velocity: default_max_sales_velocity(),
            min_parts: default_min_parts(),
            max_parts: default_max_parts(),
            max_years_post_retirement: default_max_years_post_retirement(),
            max_available_quantity: default_max_available_quantity(),
            max_listing_count: default_max_listing_count(),
            max_times_sold: default_max_times_sold(),
            max_volatility: default_max_volatility(),
            max_trend_pct: default_max_trend_pct(),
        }
    }
}

/// Result of sanitizing one raw listing
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedInput {
    /// False when no minimally usable pricing signal survived
    pub is_valid: bool,
    /// The sanitized record; None iff `is_valid` is false
    pub input: Option<ValuationInput>,
    /// One entry per drop or clamp
    pub warnings: Vec<String>,
}

/// Validates and clamps raw listing fields
pub struct InputSanitizer {
    config: SanitizerConfig,
}

impl InputSanitizer {
    pub fn new(config: SanitizerConfig) -> Self {
        Self { config }
    }

    /// Sanitize a raw listing into a typed input
    pub fn sanitize(&self, raw: &RawListing) -> SanitizedInput {
        let mut warnings = Vec::new();
        let w = &mut warnings;

        let mut input = ValuationInput {
            set_id: raw.set_id.clone(),
            msrp: self.price_field("msrp_cents", raw.msrp_cents, w),
            current_retail: self.price_field("current_retail_cents", raw.current_retail_cents, w),
            original_retail: self.price_field(
                "original_retail_cents",
                raw.original_retail_cents,
                w,
            ),
            marketplace_avg: self.price_field(
                "marketplace_avg_cents",
                raw.marketplace_avg_cents,
                w,
            ),
            marketplace_max: self.price_field(
                "marketplace_max_cents",
                raw.marketplace_max_cents,
                w,
            ),
            ..ValuationInput::default()
        };

        input.price_history = self.price_history(&raw.price_history_cents, w);
        input.sales = self.sale_records(raw, w);

        input.sales_velocity = self.bounded_field(
            "sales_velocity",
            raw.sales_velocity,
            0.0,
            self.config.max_sales_velocity,
            w,
        );
        input.avg_days_between_sales = self
            .bounded_field("avg_days_between_sales", raw.avg_days_between_sales, 0.0, 36_500.0, w)
            .and_then(|d| {
                if d > 0.0 {
                    Some(d)
                } else {
                    w.push("avg_days_between_sales is zero, dropped".to_string());
                    None
                }
            });
        input.price_volatility = self.bounded_field(
            "price_volatility",
            raw.price_volatility,
            0.0,
            self.config.max_volatility,
            w,
        );
        input.price_decline_pct = self.bounded_field(
            "price_decline_pct",
            raw.price_decline_pct,
            -self.config.max_trend_pct,
            self.config.max_trend_pct,
            w,
        );
        input.price_trend_pct = self.bounded_field(
            "price_trend_pct",
            raw.price_trend_pct,
            -self.config.max_trend_pct,
            self.config.max_trend_pct,
            w,
        );

        input.times_sold =
            self.count_field("times_sold", raw.times_sold, self.config.max_times_sold, w);
        input.available_quantity = self.count_field(
            "available_quantity",
            raw.available_quantity,
            self.config.max_available_quantity,
            w,
        );
        input.listing_count = self.count_field(
            "listing_count",
            raw.listing_count,
            self.config.max_listing_count,
            w,
        );

        input.retirement = raw.retirement;
        input.years_post_retirement = self.bounded_field(
            "years_post_retirement",
            raw.years_post_retirement,
            0.0,
            self.config.max_years_post_retirement,
            w,
        );
        input.year_released = raw.year_released.and_then(|y| {
            if (1949..=2100).contains(&y) {
                Some(y as u16)
            } else {
                w.push(format!("year_released {y} outside [1949, 2100], dropped"));
                None
            }
        });

        input.theme = raw
            .theme
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from);
        input.parts_count = raw.parts_count.and_then(|p| {
            if p >= self.config.min_parts as i64 && p <= self.config.max_parts as i64 {
                Some(p as u32)
            } else {
                w.push(format!(
                    "parts_count {p} outside [{}, {}], dropped",
                    self.config.min_parts, self.config.max_parts
                ));
                None
            }
        });
        input.limited_edition = raw.limited_edition.unwrap_or(false);
        input.condition = raw.condition.unwrap_or_default();
        input.weight_grams = self.bounded_field("weight_grams", raw.weight_grams, 0.0, 500_000.0, w);

        input.demand_score = self.score_field("demand_score", raw.demand_score, w);
        input.quality_score = self.score_field("quality_score", raw.quality_score, w);
        input.availability_score = self.score_field("availability_score", raw.availability_score, w);

        let is_valid = input.has_price_source();
        if !is_valid {
            warnings.push("no usable pricing source survived sanitization".to_string());
            tracing::debug!(set_id = ?raw.set_id, "listing rejected: no pricing source");
        }

        SanitizedInput {
            is_valid,
            input: is_valid.then_some(input),
            warnings,
        }
    }

    /// Identity-critical price field: drop outside bounds, never substitute
    fn price_field(&self, name: &str, raw: Option<f64>, warnings: &mut Vec<String>) -> Option<Cents> {
        let value = raw?;
        if !value.is_finite() {
            warnings.push(format!("{name} is not a finite number, dropped"));
            return None;
        }
        let cents = value.round();
        if cents < self.config.min_price_cents as f64 || cents > self.config.max_price_cents as f64 {
            warnings.push(format!(
                "{name} {value:.0} outside [{}, {}] cents, dropped",
                self.config.min_price_cents, self.config.max_price_cents
            ));
            return None;
        }
        Some(Cents::new(cents as u64))
    }

    /// Identity-critical float field: drop outside bounds
    fn bounded_field(
        &self,
        name: &str,
        raw: Option<f64>,
        min: f64,
        max: f64,
        warnings: &mut Vec<String>,
    ) -> Option<f64> {
        let value = raw?;
        if !value.is_finite() {
            warnings.push(format!("{name} is not a finite number, dropped"));
            return None;
        }
        if value < min || value > max {
            warnings.push(format!("{name} {value} outside [{min}, {max}], dropped"));
            return None;
        }
        Some(value)
    }

    /// Counter field: clamp rather than drop
    fn count_field(
        &self,
        name: &str,
        raw: Option<i64>,
        cap: u32,
        warnings: &mut Vec<String>,
    ) -> Option<u32> {
        let value = raw?;
        if value < 0 {
            warnings.push(format!("{name} {value} is negative, clamped to 0"));
            return Some(0);
        }
        if value > cap as i64 {
            warnings.push(format!("{name} {value} exceeds cap {cap}, clamped"));
            return Some(cap);
        }
        Some(value as u32)
    }

    /// Supplied score: drop outside [0, 100]
    fn score_field(&self, name: &str, raw: Option<f64>, warnings: &mut Vec<String>) -> Option<f64> {
        self.bounded_field(name, raw, 0.0, 100.0, warnings)
    }

    fn price_history(&self, raw: &[f64], warnings: &mut Vec<String>) -> Vec<Cents> {
        let mut dropped = 0usize;
        let history: Vec<Cents> = raw
            .iter()
            .filter_map(|&v| {
                let cents = v.round();
                if v.is_finite()
                    && cents >= self.config.min_price_cents as f64
                    && cents <= self.config.max_price_cents as f64
                {
                    Some(Cents::new(cents as u64))
                } else {
                    dropped += 1;
                    None
                }
            })
            .collect();
        if dropped > 0 {
            warnings.push(format!("{dropped} price history point(s) out of bounds, dropped"));
        }
        history
    }

    fn sale_records(&self, raw: &RawListing, warnings: &mut Vec<String>) -> Vec<SaleRecord> {
        let horizon = Utc::now() + Duration::days(1);
        let mut dropped = 0usize;
        let mut sales: Vec<SaleRecord> = raw
            .sales
            .iter()
            .filter_map(|s| {
                if s.timestamp > horizon {
                    dropped += 1;
                    return None;
                }
                let price = s.price_cents.and_then(|p| {
                    let cents = p.round();
                    if p.is_finite()
                        && cents >= self.config.min_price_cents as f64
                        && cents <= self.config.max_price_cents as f64
                    {
                        Some(Cents::new(cents as u64))
                    } else {
                        None
                    }
                });
                Some(SaleRecord {
                    timestamp: s.timestamp,
                    price,
                })
            })
            .collect();
        if dropped > 0 {
            warnings.push(format!("{dropped} sale record(s) with future timestamps, dropped"));
        }
        sales.sort_by_key(|s| s.timestamp);
        sales
    }
}

impl Default for InputSanitizer {
    fn default() -> Self {
        Self::new(SanitizerConfig::default())
    }
}
