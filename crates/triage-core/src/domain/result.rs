//! Triage output model: priority tiers, score breakdown and the result record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::digest::digest_of;
use super::error::Result;

/// Priority tier, used both for declared severity and for the computed risk
/// level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityTier {
    Low,
    Medium,
    High,
    Critical,
}

impl PriorityTier {
    /// Case-insensitive parse of a declared severity.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }

    /// One step up, saturating at `Critical`.
    pub fn bump(self) -> Self {
        match self {
            Self::Low => Self::Medium,
            Self::Medium => Self::High,
            Self::High | Self::Critical => Self::Critical,
        }
    }

    /// Tier for a clamped 0–100 score.
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => Self::Critical,
            60..=79 => Self::High,
            35..=59 => Self::Medium,
            _ => Self::Low,
        }
    }

    /// Human label shown next to the score.
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Routine",
            Self::Medium => "Scheduled",
            Self::High => "Urgent",
            Self::Critical => "Immediate action required",
        }
    }
}

impl std::fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
            Self::Critical => write!(f, "Critical"),
        }
    }
}

/// What a breakdown row represents.
///
/// Only `Base`, `Risk` and `Ai` rows are arithmetic. `Warning` and `Penalty`
/// rows carry sentinel display values that were never added to the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakdownKind {
    Base,
    Risk,
    Warning,
    Penalty,
    Ai,
}

impl BreakdownKind {
    pub fn is_arithmetic(self) -> bool {
        matches!(self, Self::Base | Self::Risk | Self::Ai)
    }
}

/// One line of the score breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownRow {
    pub name: String,
    pub contribution: i32,
    pub kind: BreakdownKind,
}

/// Append-only ordered list of breakdown rows.
///
/// Rows can only be appended from inside the crate; once a `TriageResult`
/// owns the breakdown it is read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreBreakdown {
    rows: Vec<BreakdownRow>,
}

impl ScoreBreakdown {
    pub(crate) fn push(&mut self, name: impl Into<String>, contribution: i32, kind: BreakdownKind) {
        self.rows.push(BreakdownRow {
            name: name.into(),
            contribution,
            kind,
        });
    }

    pub fn rows(&self) -> &[BreakdownRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows of the given kind, in insertion order.
    pub fn of_kind(&self, kind: BreakdownKind) -> impl Iterator<Item = &BreakdownRow> {
        self.rows.iter().filter(move |r| r.kind == kind)
    }

    /// Unclamped sum of the arithmetic rows.
    pub fn arithmetic_total(&self) -> i32 {
        self.rows
            .iter()
            .filter(|r| r.kind.is_arithmetic())
            .map(|r| r.contribution)
            .sum()
    }
}

/// Outcome of triaging one report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageResult {
    /// Priority score in 0–100.
    pub score: u8,
    pub label: String,
    pub risk_level: PriorityTier,
    pub breakdown: ScoreBreakdown,
    /// Ranked, deduplicated rationale joined into one sentence list.
    pub explanation: String,
    /// The individual reasons behind `explanation`, highest impact first.
    pub reasons: Vec<String>,
    /// Effective confidence in 0.0–1.0.
    pub confidence: f64,
    pub escalation_target: String,
    pub fraud_suspected: bool,
    /// Ids of the matched taxonomy entries.
    pub signals: Vec<String>,
    pub evaluated_at: DateTime<Utc>,
}

impl TriageResult {
    /// Canonical SHA-256 digest of this result.
    pub fn digest(&self) -> Result<String> {
        digest_of(self)
    }

    /// Caller-side seasonal escalation of the computed risk level.
    ///
    /// The tier bumped is `risk_level`, the tier derived from the final
    /// score, not the severity the reporter declared: a water report scored
    /// Medium in May becomes High whatever it was declared as. To escalate
    /// the declared tier instead, call [`crate::seasonal::escalate`] with it.
    ///
    /// When the multiplier warrants it, returns a new result one tier up
    /// whose rationale carries the seasonal note. The score and breakdown
    /// are left untouched. Results zeroed by the fraud gate are returned
    /// unchanged.
    pub fn with_seasonal_escalation(
        &self,
        adjustment: &crate::seasonal::SeasonalAdjustment,
    ) -> Self {
        if self.fraud_suspected {
            return self.clone();
        }
        let escalation = crate::seasonal::escalate(self.risk_level, adjustment);
        let mut next = self.clone();
        if let Some(note) = escalation.note {
            next.risk_level = escalation.tier;
            next.label = escalation.tier.label().to_string();
            next.explanation = if next.explanation.is_empty() {
                note.clone()
            } else {
                format!("{} {}", next.explanation, note)
            };
            next.reasons.push(note);
        }
        next
    }
}
