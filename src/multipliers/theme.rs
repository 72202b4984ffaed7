//! Theme premium multiplier
//!
//! A fixed table of known themes with their secondary-market premium or
//! discount, plus the quality tier each theme occupies. Matching is by
//! normalized name with a small alias set; unrecognized themes are neutral.

use lazy_static::lazy_static;
use std::collections::HashMap;

use super::{Multiplier, MultiplierKind};

/// Quality tier of a recognized theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeTier {
    /// Licensed or collector lines with proven appreciation
    Premium,
    /// Enthusiast lines that hold value well
    Strong,
    /// Evergreen retail lines
    Standard,
}

impl ThemeTier {
    /// Quality-component points for this tier
    pub fn quality_points(&self) -> f64 {
        match self {
            ThemeTier::Premium => 100.0,
            ThemeTier::Strong => 75.0,
            ThemeTier::Standard => 50.0,
        }
    }
}

/// Quality-component points for an unrecognized theme
pub const UNRECOGNIZED_QUALITY_POINTS: f64 = 25.0;

struct ThemeEntry {
    tier: ThemeTier,
    multiplier: f64,
    label: &'static str,
}

lazy_static! {
    static ref THEME_TABLE: HashMap<&'static str, ThemeEntry> = {
        let mut m = HashMap::new();
        let mut add = |name: &'static str, tier: ThemeTier, multiplier: f64, label: &'static str| {
            m.insert(name, ThemeEntry { tier, multiplier, label });
        };

        // Premium: licensed and collector lines
        add("star wars", ThemeTier::Premium, 1.35, "premium");
        add("harry potter", ThemeTier::Premium, 1.25, "premium");
        add("creator expert", ThemeTier::Premium, 1.30, "premium");
        add("icons", ThemeTier::Premium, 1.30, "premium");
        add("modular buildings", ThemeTier::Premium, 1.30, "premium");

        // Strong: enthusiast lines
        add("technic", ThemeTier::Strong, 1.15, "strong");
        add("ideas", ThemeTier::Strong, 1.20, "strong");
        add("architecture", ThemeTier::Strong, 1.10, "strong");
        add("marvel", ThemeTier::Strong, 1.10, "strong");
        add("disney", ThemeTier::Strong, 1.10, "strong");

        // Standard: evergreen retail lines, discounted on the secondary market
        add("city", ThemeTier::Standard, 0.95, "budget");
        add("ninjago", ThemeTier::Standard, 0.95, "budget");
        add("speed champions", ThemeTier::Standard, 1.00, "standard");
        add("friends", ThemeTier::Standard, 0.90, "budget");
        add("creator", ThemeTier::Standard, 0.90, "budget");
        add("classic", ThemeTier::Standard, 0.80, "budget");
        add("duplo", ThemeTier::Standard, 0.80, "budget");
        add("education", ThemeTier::Standard, 0.70, "budget");

        m
    };

    static ref ALIASES: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("sw", "star wars");
        m.insert("ucs", "star wars");
        m.insert("hp", "harry potter");
        m.insert("wizarding world", "harry potter");
        m.insert("modular", "modular buildings");
        m.insert("marvel super heroes", "marvel");
        m.insert("super heroes marvel", "marvel");
        m.insert("creator 3 in 1", "creator");
        m
    };
}

/// Normalize a scraped theme name for table lookup
fn normalize(name: &str) -> String {
    let lowered: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .strip_prefix("lego ")
        .unwrap_or(&collapsed)
        .to_string()
}

fn lookup(name: &str) -> Option<&'static ThemeEntry> {
    let normalized = normalize(name);
    let key = ALIASES
        .get(normalized.as_str())
        .copied()
        .unwrap_or(normalized.as_str());
    THEME_TABLE.get(key)
}

/// Quality tier for a theme name, if recognized
pub fn theme_tier(name: &str) -> Option<ThemeTier> {
    lookup(name).map(|e| e.tier)
}

/// Theme multiplier, 0.70x-1.40x; unrecognized or absent themes are neutral
pub fn theme_multiplier(theme: Option<&str>) -> Multiplier {
    let Some(name) = theme else {
        return Multiplier::neutral(MultiplierKind::Theme, "no theme data");
    };

    match lookup(name) {
        Some(entry) => Multiplier::new(
            MultiplierKind::Theme,
            entry.multiplier,
            entry.label,
            format!("recognized theme '{name}'"),
        ),
        None => Multiplier::neutral(MultiplierKind::Theme, format!("unrecognized theme '{name}'")),
    }
}
