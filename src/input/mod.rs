//! Valuation input records
//!
//! [`RawListing`] is the untrusted record a scraper hands over: every field
//! optional, numbers as loose f64/i64. [`ValuationInput`] is the sanitized,
//! typed record the engine works on. Absence always means unknown, never
//! zero - a set with no reported sales is a different animal from a set
//! with zero sales.

pub mod quality_gate;
pub mod sanitizer;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Cents;

/// Catalog retirement status of a set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetirementStatus {
    /// Still in production and on shelves
    Active,
    /// Announced end-of-life, still purchasable at retail
    RetiringSoon,
    /// Out of production
    Retired,
}

impl std::fmt::Display for RetirementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RetirementStatus::Active => write!(f, "active"),
            RetirementStatus::RetiringSoon => write!(f, "retiring_soon"),
            RetirementStatus::Retired => write!(f, "retired"),
        }
    }
}

/// Listing condition on the secondary market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Sealed / new in box
    #[default]
    New,
    /// Opened or assembled
    Used,
}

/// A single recorded sale with its timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub timestamp: DateTime<Utc>,
    /// Sale price, when the marketplace reports it
    pub price: Option<Cents>,
}

/// Raw sale record as scraped (prices as loose floats in minor units)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSale {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub price_cents: Option<f64>,
}

/// Untrusted per-listing record from data-acquisition collaborators
///
/// All currency fields are in minor units. Scores, when supplied, are
/// expected pre-normalized to 0-100 but are still bounds-checked by the
/// sanitizer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawListing {
    /// Set identifier, for warnings and logs only
    #[serde(default)]
    pub set_id: Option<String>,

    // Pricing (minor units)
    #[serde(default)]
    pub msrp_cents: Option<f64>,
    #[serde(default)]
    pub current_retail_cents: Option<f64>,
    #[serde(default)]
    pub original_retail_cents: Option<f64>,
    #[serde(default)]
    pub marketplace_avg_cents: Option<f64>,
    #[serde(default)]
    pub marketplace_max_cents: Option<f64>,
    #[serde(default)]
    pub price_history_cents: Vec<f64>,

    // Market signals
    /// Units sold per day
    #[serde(default)]
    pub sales_velocity: Option<f64>,
    #[serde(default)]
    pub avg_days_between_sales: Option<f64>,
    #[serde(default)]
    pub times_sold: Option<i64>,
    #[serde(default)]
    pub available_quantity: Option<i64>,
    /// Competing seller / lot count
    #[serde(default)]
    pub listing_count: Option<i64>,
    /// Price coefficient of variation
    #[serde(default)]
    pub price_volatility: Option<f64>,
    /// Percent price decline over the observation window
    #[serde(default)]
    pub price_decline_pct: Option<f64>,
    /// Signed percent price trend over the observation window
    #[serde(default)]
    pub price_trend_pct: Option<f64>,
    #[serde(default)]
    pub sales: Vec<RawSale>,

    // Catalog facts
    #[serde(default)]
    pub retirement: Option<RetirementStatus>,
    #[serde(default)]
    pub years_post_retirement: Option<f64>,
    #[serde(default)]
    pub year_released: Option<i64>,

    // Product facts
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub parts_count: Option<i64>,
    #[serde(default)]
    pub limited_edition: Option<bool>,
    #[serde(default)]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub weight_grams: Option<f64>,

    // Externally pre-computed scores (0-100)
    #[serde(default)]
    pub demand_score: Option<f64>,
    #[serde(default)]
    pub quality_score: Option<f64>,
    #[serde(default)]
    pub availability_score: Option<f64>,
}

/// Sanitized, typed valuation input
///
/// Produced only by [`sanitizer::InputSanitizer`]. Every numeric field that
/// is present lies within its documented bound.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuationInput {
    pub set_id: Option<String>,

    // Pricing
    pub msrp: Option<Cents>,
    pub current_retail: Option<Cents>,
    pub original_retail: Option<Cents>,
    pub marketplace_avg: Option<Cents>,
    pub marketplace_max: Option<Cents>,
    pub price_history: Vec<Cents>,

    // Market signals
    pub sales_velocity: Option<f64>,
    pub avg_days_between_sales: Option<f64>,
    pub times_sold: Option<u32>,
    pub available_quantity: Option<u32>,
    pub listing_count: Option<u32>,
    pub price_volatility: Option<f64>,
    pub price_decline_pct: Option<f64>,
    pub price_trend_pct: Option<f64>,
    pub sales: Vec<SaleRecord>,

    // Catalog facts
    pub retirement: Option<RetirementStatus>,
    pub years_post_retirement: Option<f64>,
    pub year_released: Option<u16>,

    // Product facts
    pub theme: Option<String>,
    pub parts_count: Option<u32>,
    pub limited_edition: bool,
    pub condition: Condition,
    pub weight_grams: Option<f64>,

    // Externally supplied scores (0-100)
    pub demand_score: Option<f64>,
    pub quality_score: Option<f64>,
    pub availability_score: Option<f64>,
}

impl ValuationInput {
    /// Whether any base price source survived sanitization
    pub fn has_price_source(&self) -> bool {
        self.msrp.is_some()
            || self.current_retail.is_some()
            || self.marketplace_avg.is_some()
            || self.marketplace_max.is_some()
    }

    /// Whether any sales-history signal is present
    pub fn has_sales_signal(&self) -> bool {
        self.sales_velocity.is_some()
            || self.times_sold.is_some()
            || self.avg_days_between_sales.is_some()
            || !self.sales.is_empty()
    }

    /// Whether the set is retired
    pub fn is_retired(&self) -> bool {
        self.retirement == Some(RetirementStatus::Retired)
    }

    // Builder-style helpers, mainly for tests and embedding callers

    pub fn with_msrp(mut self, cents: u64) -> Self {
        self.msrp = Some(Cents::new(cents));
        self
    }

    pub fn with_marketplace(mut self, avg_cents: u64, max_cents: u64) -> Self {
        self.marketplace_avg = Some(Cents::new(avg_cents));
        self.marketplace_max = Some(Cents::new(max_cents));
        self
    }

    pub fn with_market(mut self, velocity: f64, quantity: u32, listings: u32) -> Self {
        self.sales_velocity = Some(velocity);
        self.available_quantity = Some(quantity);
        self.listing_count = Some(listings);
        self
    }

    pub fn with_retirement(mut self, status: RetirementStatus, years: f64) -> Self {
        self.retirement = Some(status);
        self.years_post_retirement = Some(years);
        self
    }

    pub fn with_product(mut self, theme: &str, parts: u32) -> Self {
        self.theme = Some(theme.to_string());
        self.parts_count = Some(parts);
        self
    }
}
