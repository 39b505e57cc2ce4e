//! Keyword taxonomies.
//!
//! A [`Taxonomy`] is the single authoritative rule table consumed by the
//! signal extractor and the aggregator. The built-in table is constructed
//! once per process and shared read-only; custom tables load from JSON.

mod tables;

use std::collections::HashSet;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::domain::{Result, TriageError};

pub use tables::{CITIZEN_SOURCE_SIGNAL, IMAGE_EVIDENCE_SIGNAL, LIFE_SAFETY_KEYWORDS};

/// Taxonomy a rule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonomyCategory {
    Sector,
    EventType,
    Location,
    Impact,
    Time,
    Confidence,
    Environmental,
    Financial,
    Reputational,
    DataIntegrity,
    CascadingFailure,
    Temporal,
    SocialEquity,
    InfrastructureCriticality,
    AiConfidence,
    CrossJurisdiction,
    PostResolution,
}

impl TaxonomyCategory {
    /// Order in which categories are scanned. Signal order, and with it the
    /// escalation tie-break, follows this order.
    pub const EVALUATION_ORDER: [TaxonomyCategory; 17] = [
        Self::Sector,
        Self::EventType,
        Self::Location,
        Self::Impact,
        Self::Time,
        Self::Confidence,
        Self::Environmental,
        Self::Financial,
        Self::Reputational,
        Self::DataIntegrity,
        Self::CascadingFailure,
        Self::Temporal,
        Self::SocialEquity,
        Self::InfrastructureCriticality,
        Self::AiConfidence,
        Self::CrossJurisdiction,
        Self::PostResolution,
    ];

    /// The eleven advanced-risk categories.
    pub fn is_advanced_risk(self) -> bool {
        !matches!(
            self,
            Self::Sector
                | Self::EventType
                | Self::Location
                | Self::Impact
                | Self::Time
                | Self::Confidence
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sector => "sector",
            Self::EventType => "event_type",
            Self::Location => "location",
            Self::Impact => "impact",
            Self::Time => "time",
            Self::Confidence => "confidence",
            Self::Environmental => "environmental",
            Self::Financial => "financial",
            Self::Reputational => "reputational",
            Self::DataIntegrity => "data_integrity",
            Self::CascadingFailure => "cascading_failure",
            Self::Temporal => "temporal",
            Self::SocialEquity => "social_equity",
            Self::InfrastructureCriticality => "infrastructure_criticality",
            Self::AiConfidence => "ai_confidence",
            Self::CrossJurisdiction => "cross_jurisdiction",
            Self::PostResolution => "post_resolution",
        }
    }

    /// Parse the snake_case name used on the command line and in JSON.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        Self::EVALUATION_ORDER
            .into_iter()
            .find(|c| c.as_str() == value)
    }
}

impl std::fmt::Display for TaxonomyCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a matched advanced-risk rule does besides (or instead of) scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskAction {
    /// Add the weight to the score.
    #[default]
    None,
    /// Lower confidence by 0.4; no score contribution.
    DowngradeConfidence,
    /// Lower confidence by 0.2; no score contribution.
    FlagUncertainty,
}

/// Numeric predicate on hours elapsed since the report was filed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HoursPredicate {
    AtLeast(f64),
    Below(f64),
}

impl HoursPredicate {
    pub fn holds(self, hours: f64) -> bool {
        match self {
            Self::AtLeast(limit) => hours >= limit,
            Self::Below(limit) => hours < limit,
        }
    }
}

/// One weighted, keyword-tagged rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyEntry {
    pub id: String,
    pub label: String,
    pub weight: i32,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub category: TaxonomyCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation_target: Option<String>,
    #[serde(default)]
    pub action: RiskAction,
    /// Only meaningful for `Time` entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<HoursPredicate>,
}

impl TaxonomyEntry {
    pub fn new(id: &str, label: &str, weight: i32, category: TaxonomyCategory) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            weight,
            keywords: Vec::new(),
            category,
            escalation_target: None,
            action: RiskAction::None,
            hours: None,
        }
    }

    pub fn keywords(mut self, keywords: &[&str]) -> Self {
        self.keywords = keywords.iter().map(|k| k.to_lowercase()).collect();
        self
    }

    pub fn escalate(mut self, target: &str) -> Self {
        self.escalation_target = Some(target.to_string());
        self
    }

    pub fn action(mut self, action: RiskAction) -> Self {
        self.action = action;
        self
    }

    pub fn hours(mut self, predicate: HoursPredicate) -> Self {
        self.hours = Some(predicate);
        self
    }

    /// First keyword found as a substring of `scan`, which must already be
    /// lowercase. Plain substring search: "fire" matches inside "firearm".
    pub fn matched_keyword(&self, scan: &str) -> Option<&str> {
        self.keywords
            .iter()
            .filter(|k| !k.is_empty())
            .find(|k| scan.contains(k.to_lowercase().as_str()))
            .map(String::as_str)
    }

    /// Exact, case-insensitive match of a declared value against the
    /// entry's keywords, label or id.
    pub fn matches_exactly(&self, declared: &str) -> bool {
        let declared = declared.trim().to_lowercase();
        if declared.is_empty() {
            return false;
        }
        self.id.to_lowercase() == declared
            || self.label.to_lowercase() == declared
            || self.keywords.iter().any(|k| k.to_lowercase() == declared)
    }
}

/// Largest absolute weight a single rule may carry.
pub const MAX_RULE_WEIGHT: i32 = 100;

static STANDARD: LazyLock<Taxonomy> = LazyLock::new(tables::standard_taxonomy);

/// The complete rule table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Taxonomy {
    pub entries: Vec<TaxonomyEntry>,
    /// Text that forces the life-safety override in the aggregator.
    #[serde(default = "default_life_safety_keywords")]
    pub life_safety_keywords: Vec<String>,
}

fn default_life_safety_keywords() -> Vec<String> {
    LIFE_SAFETY_KEYWORDS.iter().map(|k| k.to_string()).collect()
}

impl Taxonomy {
    /// Built-in rule table, constructed on first use.
    pub fn standard() -> &'static Taxonomy {
        &STANDARD
    }

    /// Build a taxonomy from entries, rejecting duplicate ids and blank
    /// keywords.
    pub fn from_entries(entries: Vec<TaxonomyEntry>) -> Result<Self> {
        let taxonomy = Self {
            entries,
            life_safety_keywords: default_life_safety_keywords(),
        };
        taxonomy.validate()?;
        Ok(taxonomy)
    }

    /// Parse and validate a JSON taxonomy document.
    pub fn from_json(json: &str) -> Result<Self> {
        let taxonomy: Taxonomy = serde_json::from_str(json)?;
        taxonomy.validate()?;
        Ok(taxonomy)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for entry in &self.entries {
            if entry.id.trim().is_empty() {
                return Err(TriageError::InvalidTaxonomy("entry with empty id".into()));
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(TriageError::InvalidTaxonomy(format!(
                    "duplicate entry id: {}",
                    entry.id
                )));
            }
            if !(-MAX_RULE_WEIGHT..=MAX_RULE_WEIGHT).contains(&entry.weight) {
                return Err(TriageError::InvalidTaxonomy(format!(
                    "entry {} weight {} outside -{MAX_RULE_WEIGHT}..={MAX_RULE_WEIGHT}",
                    entry.id, entry.weight
                )));
            }
            if entry.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(TriageError::InvalidTaxonomy(format!(
                    "entry {} has a blank keyword",
                    entry.id
                )));
            }
            if entry.hours.is_some() && entry.category != TaxonomyCategory::Time {
                return Err(TriageError::InvalidTaxonomy(format!(
                    "entry {} has an hours predicate outside the time category",
                    entry.id
                )));
            }
        }
        if self.life_safety_keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(TriageError::InvalidTaxonomy(
                "blank life-safety keyword".into(),
            ));
        }
        Ok(())
    }

    /// Entries of one category, in table order.
    pub fn category(&self, category: TaxonomyCategory) -> impl Iterator<Item = &TaxonomyEntry> {
        self.entries.iter().filter(move |e| e.category == category)
    }

    pub fn get(&self, id: &str) -> Option<&TaxonomyEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// First life-safety keyword found in `scan` (lowercase).
    pub fn life_safety_hit(&self, scan: &str) -> Option<&str> {
        self.life_safety_keywords
            .iter()
            .find(|k| scan.contains(k.to_lowercase().as_str()))
            .map(String::as_str)
    }
}
