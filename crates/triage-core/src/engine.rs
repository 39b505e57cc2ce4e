//! Triage engine entry point.
//!
//! Wires extraction, aggregation, the confidence gate, the seasonal adjuster
//! and the evidence validator together. Every call takes the evaluation time
//! explicitly; the same report and the same `now` always produce the same
//! output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::aggregate;
use crate::config::EngineConfig;
use crate::consistency::{validate_evidence, ConsistencyVerdict};
use crate::domain::{IncidentReport, PriorityTier, Result, SensorReading, TriageResult};
use crate::gate::{apply_gate, GateDecision, GateReason};
use crate::obs;
use crate::seasonal::{seasonal_adjustment_at, SeasonalAdjustment};
use crate::signals::extract_signals;
use crate::taxonomy::Taxonomy;

/// Label used for results zeroed by the fraud gate.
pub const FLAGGED_LABEL: &str = "Flagged for verification";

/// Triage, consistency and seasonal output for one report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_id: Option<String>,
    pub triage: TriageResult,
    pub consistency: ConsistencyVerdict,
    pub seasonal: SeasonalAdjustment,
    /// Set when the evidence is inconsistent or the fraud gate tripped.
    pub flagged_for_review: bool,
}

impl Assessment {
    /// Apply the seasonal bump to the computed risk level (not the declared
    /// severity); see [`TriageResult::with_seasonal_escalation`].
    pub fn with_seasonal_escalation(&self) -> Self {
        let mut next = self.clone();
        next.triage = self.triage.with_seasonal_escalation(&self.seasonal);
        if next.triage.risk_level != self.triage.risk_level {
            obs::emit_seasonal_escalation(
                self.report_id.as_deref().unwrap_or("unidentified"),
                &self.seasonal.season.to_string(),
                self.seasonal.multiplier,
            );
        }
        next
    }
}

/// One entry of a batch input document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    pub report: IncidentReport,
    #[serde(default)]
    pub sensors: Vec<SensorReading>,
}

/// Stateless evaluator over a shared, read-only taxonomy.
#[derive(Debug, Clone)]
pub struct TriageEngine<'t> {
    taxonomy: &'t Taxonomy,
    config: EngineConfig,
}

impl TriageEngine<'static> {
    /// Engine over the built-in taxonomy with default configuration.
    pub fn standard() -> Self {
        Self {
            taxonomy: Taxonomy::standard(),
            config: EngineConfig::default(),
        }
    }
}

impl<'t> TriageEngine<'t> {
    pub fn new(taxonomy: &'t Taxonomy, config: EngineConfig) -> Result<Self> {
        taxonomy.validate()?;
        config.validate()?;
        Ok(Self { taxonomy, config })
    }

    pub fn taxonomy(&self) -> &'t Taxonomy {
        self.taxonomy
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Score one report.
    pub fn triage(
        &self,
        report: &IncidentReport,
        sensors: &[SensorReading],
        now: DateTime<Utc>,
    ) -> Result<TriageResult> {
        let report_id = report.display_id();
        if let Err(err) = report.validate() {
            obs::emit_report_rejected(report_id, &err);
            return Err(err);
        }
        let _span = obs::ReportSpan::enter(report_id);
        let config = &self.config.triage;

        let signals = extract_signals(report, self.taxonomy, now);
        let signal_ids = signals.ids();
        let aggregation = aggregate(report, &signals, sensors, self.taxonomy, config);
        if let Some(keyword) = &aggregation.life_safety_keyword {
            obs::emit_life_safety_override(report_id, keyword);
        }

        let outcome = apply_gate(report, aggregation, config);
        let (label, fraud_suspected) = match outcome.decision {
            GateDecision::Tripped { reason } => {
                let reason = match reason {
                    GateReason::AuthenticityFailed => "authenticity_failed",
                    GateReason::LowConfidence => "low_confidence",
                };
                obs::emit_fraud_override(report_id, reason, outcome.confidence);
                (FLAGGED_LABEL.to_string(), true)
            }
            GateDecision::Passed | GateDecision::Boosted => (
                PriorityTier::from_score(outcome.score).label().to_string(),
                false,
            ),
        };

        let risk_level = PriorityTier::from_score(outcome.score);
        let escalation_target = outcome
            .escalation_target
            .unwrap_or_else(|| config.default_authority.clone());
        obs::emit_triage_evaluated(
            report_id,
            outcome.score,
            &risk_level.to_string(),
            &escalation_target,
        );

        Ok(TriageResult {
            score: outcome.score,
            label,
            risk_level,
            breakdown: outcome.breakdown,
            explanation: outcome.explanation.text,
            reasons: outcome.explanation.reasons,
            confidence: outcome.confidence,
            escalation_target,
            fraud_suspected,
            signals: signal_ids,
            evaluated_at: now,
        })
    }

    /// Check the report's evidence.
    pub fn validate_evidence(
        &self,
        report: &IncidentReport,
        now: DateTime<Utc>,
    ) -> Result<ConsistencyVerdict> {
        report.validate()?;
        let verdict = validate_evidence(report, now, &self.config.consistency);
        obs::emit_consistency_validated(
            report.display_id(),
            verdict.consistency_score,
            verdict.is_inconsistent,
            verdict.flags.len(),
        );
        Ok(verdict)
    }

    /// Seasonal multiplier for the report's sector at `now`.
    pub fn seasonal(&self, report: &IncidentReport, now: DateTime<Utc>) -> SeasonalAdjustment {
        seasonal_adjustment_at(report.sector.as_deref(), now)
    }

    /// Triage, evidence check and seasonal lookup in one call.
    pub fn assess(
        &self,
        report: &IncidentReport,
        sensors: &[SensorReading],
        now: DateTime<Utc>,
    ) -> Result<Assessment> {
        let triage = self.triage(report, sensors, now)?;
        let consistency = self.validate_evidence(report, now)?;
        let seasonal = self.seasonal(report, now);
        let flagged_for_review = consistency.is_inconsistent || triage.fraud_suspected;

        Ok(Assessment {
            report_id: report.id.clone(),
            triage,
            consistency,
            seasonal,
            flagged_for_review,
        })
    }

    /// Assess every item independently; one bad report never aborts the
    /// batch.
    pub fn assess_batch(&self, items: &[BatchItem], now: DateTime<Utc>) -> Vec<Result<Assessment>> {
        items
            .iter()
            .map(|item| self.assess(&item.report, &item.sensors, now))
            .collect()
    }
}
