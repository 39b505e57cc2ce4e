//! Structured observability hooks for triage evaluations.
//!
//! This module provides:
//! - Report-scoped tracing spans via the `ReportSpan` RAII guard
//! - Emission functions for the decisions worth auditing: final score,
//!   overrides, consistency verdicts and seasonal escalations
//!
//! Events are emitted at `info!` level except rejected reports, which are
//! emitted at `warn!`. Filter with `RUST_LOG`.

use tracing::info;

/// RAII guard that enters a report-scoped span for one evaluation.
///
/// # Example
///
/// ```ignore
/// let _span = ReportSpan::enter("report-42");
/// // every event emitted here carries report_id = "report-42"
/// ```
pub struct ReportSpan {
    _span: tracing::span::EnteredSpan,
}

impl ReportSpan {
    pub fn enter(report_id: &str) -> Self {
        let span = tracing::info_span!("triage.report", report_id = %report_id);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: triage finished with score, tier and escalation target.
pub fn emit_triage_evaluated(
    report_id: &str,
    score: u8,
    risk_level: &str,
    escalation_target: &str,
) {
    info!(
        event = "triage.evaluated",
        report_id = %report_id,
        score = score,
        risk_level = %risk_level,
        escalation_target = %escalation_target,
    );
}

/// Emit event: the life-safety override forced the base severity.
pub fn emit_life_safety_override(report_id: &str, keyword: &str) {
    info!(event = "triage.life_safety_override", report_id = %report_id, keyword = %keyword);
}

/// Emit event: the fraud/confidence gate zeroed the score.
pub fn emit_fraud_override(report_id: &str, reason: &str, confidence: f64) {
    info!(
        event = "triage.fraud_override",
        report_id = %report_id,
        reason = %reason,
        confidence = confidence,
    );
}

/// Emit event: evidence consistency validated.
pub fn emit_consistency_validated(report_id: &str, score: u8, inconsistent: bool, flags: usize) {
    info!(
        event = "consistency.validated",
        report_id = %report_id,
        consistency_score = score,
        is_inconsistent = inconsistent,
        flags = flags,
    );
}

/// Emit event: a caller applied a seasonal tier bump.
pub fn emit_seasonal_escalation(report_id: &str, season: &str, multiplier: f64) {
    info!(
        event = "seasonal.escalation",
        report_id = %report_id,
        season = %season,
        multiplier = multiplier,
    );
}

/// Emit event: a report failed its precondition (warning level).
pub fn emit_report_rejected(report_id: &str, error: &dyn std::fmt::Display) {
    tracing::warn!(event = "triage.rejected", report_id = %report_id, error = %error);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_span_create() {
        let _span = ReportSpan::enter("test-report-id");
    }
}
