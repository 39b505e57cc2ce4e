//! Observability tests for triage evaluation tracing.
//!
//! Verify that the engine emits the structured events operators audit:
//! final score, overrides, consistency verdicts and rejected reports.

use chrono::{DateTime, Duration, TimeZone, Utc};
use tracing_test::traced_test;
use triage_core::{
    emit_consistency_validated, emit_fraud_override, emit_report_rejected,
    emit_seasonal_escalation, emit_triage_evaluated, seasonal_adjustment_at, IncidentReport,
    Location, PriorAnalysis, ReportSource, ReportSpan, TriageEngine,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
}

fn report(description: &str) -> IncidentReport {
    IncidentReport::new(
        "Report",
        description,
        now() - Duration::hours(2),
        Location {
            lat: 19.0760,
            lng: 72.8777,
            address: None,
        },
    )
    .with_id("obs-1")
    .with_source(ReportSource::Staff)
    .with_image("http://x/img.jpg")
}

#[traced_test]
#[test]
fn test_emit_triage_evaluated_logs_score_and_target() {
    emit_triage_evaluated("rep-123", 65, "High", "Traffic Police");
    assert!(logs_contain("triage.evaluated"));
    assert!(logs_contain("Traffic Police"));
}

#[traced_test]
#[test]
fn test_emit_fraud_override_logs_reason() {
    emit_fraud_override("rep-456", "low_confidence", 0.2);
    assert!(logs_contain("triage.fraud_override"));
    assert!(logs_contain("low_confidence"));
}

#[traced_test]
#[test]
fn test_emit_consistency_validated_logs_score() {
    emit_consistency_validated("rep-789", 35, true, 1);
    assert!(logs_contain("consistency.validated"));
}

#[traced_test]
#[test]
fn test_emit_seasonal_escalation_logs_season() {
    emit_seasonal_escalation("rep-s", "Summer", 1.6);
    assert!(logs_contain("seasonal.escalation"));
}

/// WARN-level events are captured too.
#[traced_test]
#[test]
fn test_emit_report_rejected_logs_warning() {
    emit_report_rejected("rep-err", &"missing required field: title");
    assert!(logs_contain("triage.rejected"));
    assert!(logs_contain("WARN"));
}

#[traced_test]
#[test]
fn test_report_span_enter_creates_span() {
    let span = ReportSpan::enter("test-span-report");
    drop(span);
}

#[traced_test]
#[test]
fn test_triage_emits_evaluated_event() {
    TriageEngine::standard()
        .triage(&report("Deep pothole"), &[], now())
        .unwrap();
    assert!(logs_contain("triage.evaluated"));
    assert!(logs_contain("obs-1"));
}

#[traced_test]
#[test]
fn test_life_safety_override_is_logged() {
    TriageEngine::standard()
        .triage(&report("Explosion near the depot"), &[], now())
        .unwrap();
    assert!(logs_contain("triage.life_safety_override"));
}

#[traced_test]
#[test]
fn test_fraud_gate_is_logged() {
    let r = report("Deep pothole").with_prior_analysis(PriorAnalysis {
        is_real: Some(false),
        confidence: None,
    });
    TriageEngine::standard().triage(&r, &[], now()).unwrap();
    assert!(logs_contain("triage.fraud_override"));
    assert!(logs_contain("authenticity_failed"));
}

#[traced_test]
#[test]
fn test_rejected_report_is_logged() {
    let mut r = report("Deep pothole");
    r.title = "  ".into();
    assert!(TriageEngine::standard().triage(&r, &[], now()).is_err());
    assert!(logs_contain("triage.rejected"));
    assert!(!logs_contain("triage.evaluated"));
}

#[traced_test]
#[test]
fn test_assessment_seasonal_escalation_is_logged() {
    let r = report("Tap pressure is low").with_sector("water");
    let assessment = TriageEngine::standard().assess(&r, &[], now()).unwrap();
    assert_eq!(assessment.seasonal, seasonal_adjustment_at(Some("water"), now()));
    let escalated = assessment.with_seasonal_escalation();
    assert_ne!(escalated.triage.risk_level, assessment.triage.risk_level);
    assert!(logs_contain("seasonal.escalation"));
}
