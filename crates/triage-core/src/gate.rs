//! Fraud / confidence gate.
//!
//! Applied after aggregation. An explicit authenticity failure or an
//! effective confidence below the fraud threshold zeroes the score and routes
//! the report to the vigilance authority, superseding everything computed
//! before. High confidence earns a small bonus.

use serde::{Deserialize, Serialize};

use crate::aggregate::{clamp_score, Aggregation};
use crate::config::TriageConfig;
use crate::domain::{BreakdownKind, IncidentReport, ScoreBreakdown};
use crate::explanation::{self, Explanation};

/// Message that replaces the rationale when the gate trips.
pub const FRAUD_MESSAGE: &str = "Submission flagged as potentially fraudulent or \
     low-confidence; routed for manual verification.";

/// Sentinel display value of the penalty row.
pub const FRAUD_PENALTY_SENTINEL: i32 = -100;

/// Why the gate tripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateReason {
    AuthenticityFailed,
    LowConfidence,
}

/// Gate decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum GateDecision {
    Passed,
    Boosted,
    Tripped { reason: GateReason },
}

/// Final scoring fields after the gate.
#[derive(Debug, Clone)]
pub struct GateOutcome {
    pub decision: GateDecision,
    pub score: u8,
    pub confidence: f64,
    pub escalation_target: Option<String>,
    pub breakdown: ScoreBreakdown,
    pub explanation: Explanation,
}

/// `clamp(base + modifier, 0, 1)`, where base is the prior analysis
/// confidence when present and the configured default otherwise.
pub fn effective_confidence(report: &IncidentReport, modifier: f64, config: &TriageConfig) -> f64 {
    let base = report
        .ai_analysis
        .as_ref()
        .and_then(|a| a.confidence)
        .filter(|c| c.is_finite())
        .unwrap_or(config.base_confidence);
    (base + modifier).clamp(0.0, 1.0)
}

/// Apply the gate to an aggregation.
pub fn apply_gate(
    report: &IncidentReport,
    aggregation: Aggregation,
    config: &TriageConfig,
) -> GateOutcome {
    let confidence = effective_confidence(report, aggregation.confidence_modifier, config);
    let authenticity_failed = report.ai_analysis.as_ref().and_then(|a| a.is_real) == Some(false);

    let Aggregation {
        score,
        escalation_target,
        mut breakdown,
        explanation: reasons,
        ..
    } = aggregation;

    if authenticity_failed || confidence < config.fraud_confidence_threshold {
        let reason = if authenticity_failed {
            GateReason::AuthenticityFailed
        } else {
            GateReason::LowConfidence
        };
        breakdown.push(
            "Fraud / low-confidence override",
            FRAUD_PENALTY_SENTINEL,
            BreakdownKind::Penalty,
        );
        return GateOutcome {
            decision: GateDecision::Tripped { reason },
            score: 0,
            confidence,
            escalation_target: Some(config.vigilance_authority.clone()),
            breakdown,
            explanation: explanation::single(FRAUD_MESSAGE),
        };
    }

    let mut reasons = reasons;
    let (decision, score) = if confidence > config.high_confidence_threshold {
        breakdown.push(
            "High confidence bonus",
            config.high_confidence_bonus,
            BreakdownKind::Ai,
        );
        reasons.add("High-confidence submission", config.high_confidence_bonus);
        (
            GateDecision::Boosted,
            clamp_score(i32::from(score).saturating_add(config.high_confidence_bonus)),
        )
    } else {
        (GateDecision::Passed, score)
    };

    GateOutcome {
        decision,
        score,
        confidence,
        escalation_target,
        breakdown,
        explanation: reasons.compose(config.max_reasons),
    }
}
