//! Seasonal adjustment.
//!
//! A pure function of sector and date. The adjuster only reports a
//! multiplier; bumping a priority tier is the caller's decision, made with
//! [`escalate`].

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::PriorityTier;

/// Multipliers at or above this bump the priority tier by one step.
pub const ESCALATION_MULTIPLIER: f64 = 1.5;

/// Calendar season.
///
/// `PreMonsoon` is referenced by the rule table but [`Season::for_month`]
/// never produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Winter,
    PreSummer,
    Summer,
    PreMonsoon,
    Monsoon,
    PostMonsoon,
}

impl Season {
    /// Season for a calendar month (1–12).
    pub fn for_month(month: u32) -> Self {
        match month {
            3 | 4 => Self::PreSummer,
            5 | 6 => Self::Summer,
            7..=9 => Self::Monsoon,
            10 => Self::PostMonsoon,
            _ => Self::Winter,
        }
    }

    pub fn for_date(date: NaiveDate) -> Self {
        Self::for_month(date.month())
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Winter => write!(f, "Winter"),
            Self::PreSummer => write!(f, "Pre-Summer"),
            Self::Summer => write!(f, "Summer"),
            Self::PreMonsoon => write!(f, "Pre-Monsoon"),
            Self::Monsoon => write!(f, "Monsoon"),
            Self::PostMonsoon => write!(f, "Post-Monsoon"),
        }
    }
}

/// One sector × season rule. The sector key matches case-insensitively as a
/// substring of the declared sector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeasonalRule {
    pub sector_key: &'static str,
    pub season: Season,
    pub multiplier: f64,
    pub rationale: &'static str,
}

/// First match wins.
pub const SEASONAL_RULES: [SeasonalRule; 7] = [
    SeasonalRule {
        sector_key: "drainage",
        season: Season::Monsoon,
        multiplier: 1.5,
        rationale: "Monsoon rains overload drainage networks",
    },
    SeasonalRule {
        sector_key: "water",
        season: Season::Monsoon,
        multiplier: 1.5,
        rationale: "Monsoon raises contamination and flooding risk for water lines",
    },
    SeasonalRule {
        sector_key: "road",
        season: Season::PostMonsoon,
        multiplier: 1.4,
        rationale: "Post-monsoon road damage peaks as surfaces dry and break up",
    },
    SeasonalRule {
        sector_key: "lighting",
        season: Season::Winter,
        multiplier: 1.2,
        rationale: "Longer winter nights increase reliance on street lighting",
    },
    SeasonalRule {
        sector_key: "water",
        season: Season::Summer,
        multiplier: 1.6,
        rationale: "Summer demand makes water supply failures critical",
    },
    SeasonalRule {
        sector_key: "water",
        season: Season::PreSummer,
        multiplier: 1.6,
        rationale: "Pre-summer shortages make water supply failures critical",
    },
    // Unreachable: Season::for_month never yields PreMonsoon.
    SeasonalRule {
        sector_key: "drainage",
        season: Season::PreMonsoon,
        multiplier: 1.3,
        rationale: "Pre-monsoon desilting window for drains",
    },
];

/// Result of the seasonal lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonalAdjustment {
    pub season: Season,
    pub multiplier: f64,
    pub rationale: String,
}

impl SeasonalAdjustment {
    pub fn warrants_escalation(&self) -> bool {
        self.multiplier >= ESCALATION_MULTIPLIER
    }
}

/// Seasonal multiplier for `sector` on `date`.
pub fn seasonal_adjustment(sector: Option<&str>, date: NaiveDate) -> SeasonalAdjustment {
    let season = Season::for_date(date);
    let sector = sector.map(|s| s.trim().to_lowercase()).unwrap_or_default();

    let rule = if sector.is_empty() {
        None
    } else {
        SEASONAL_RULES
            .iter()
            .find(|r| r.season == season && sector.contains(r.sector_key))
    };

    match rule {
        Some(rule) => SeasonalAdjustment {
            season,
            multiplier: rule.multiplier,
            rationale: rule.rationale.to_string(),
        },
        None => SeasonalAdjustment {
            season,
            multiplier: 1.0,
            rationale: format!("No seasonal adjustment for this sector in {season}"),
        },
    }
}

/// Convenience wrapper taking the injected clock.
pub fn seasonal_adjustment_at(sector: Option<&str>, now: DateTime<Utc>) -> SeasonalAdjustment {
    seasonal_adjustment(sector, now.date_naive())
}

/// Caller-side tier escalation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalEscalation {
    pub tier: PriorityTier,
    /// Explanatory note; present only when the tier was bumped.
    pub note: Option<String>,
}

/// Bump `tier` one step when the multiplier is at least 1.5.
pub fn escalate(tier: PriorityTier, adjustment: &SeasonalAdjustment) -> SeasonalEscalation {
    if !adjustment.warrants_escalation() {
        return SeasonalEscalation { tier, note: None };
    }
    let bumped = tier.bump();
    let note = format!(
        "Seasonal escalation ({}, x{:.1}): {} priority raised from {} to {}.",
        adjustment.season, adjustment.multiplier, adjustment.rationale, tier, bumped
    );
    SeasonalEscalation {
        tier: bumped,
        note: Some(note),
    }
}
