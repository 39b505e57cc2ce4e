//! End-to-end triage scenarios: overrides, bounds, idempotence and seasonal
//! escalation.

use chrono::{DateTime, Duration, TimeZone, Utc};

use triage_core::{
    escalate, seasonal_adjustment_at, BreakdownKind, IncidentReport, Location, PriorAnalysis,
    PriorityTier, ReportSource, SensorReading, SensorStatus, TriageEngine, FLAGGED_LABEL,
    FRAUD_MESSAGE,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
}

fn mumbai() -> Location {
    Location {
        lat: 19.0760,
        lng: 72.8777,
        address: Some("Andheri East".into()),
    }
}

fn staff_report(title: &str, description: &str) -> IncidentReport {
    IncidentReport::new(title, description, now() - Duration::hours(2), mumbai())
        .with_id("rep-1")
        .with_source(ReportSource::Staff)
        .with_image("http://x/img.jpg")
}

fn alerting_sensor() -> SensorReading {
    SensorReading {
        id: "flow-7".into(),
        status: SensorStatus::Critical,
        sensor_type: "flow".into(),
    }
}

// ── Life-safety override ──

#[test]
fn explosion_forces_base_50_and_disaster_escalation_even_when_low() {
    let report = staff_report(
        "Loud bang",
        "Explosion heard at the transformer near the market",
    )
    .with_severity("Low");

    let result = TriageEngine::standard().triage(&report, &[], now()).unwrap();

    let base = &result.breakdown.rows()[0];
    assert_eq!(base.kind, BreakdownKind::Base);
    assert_eq!(base.contribution, 50);
    assert!(result.score >= 50);
    assert_eq!(result.escalation_target, "Disaster Management Cell");
    assert!(result.reasons[0].contains("explosion"));
}

#[test]
fn life_safety_target_survives_heavier_rules() {
    // gas leak weighs 30 and names its own target
    let report = staff_report("Fire", "Gas leak caught fire in the kitchen");
    let result = TriageEngine::standard().triage(&report, &[], now()).unwrap();
    assert_eq!(result.escalation_target, "Disaster Management Cell");
}

// ── Fraud dominance ──

#[test]
fn authenticity_false_zeroes_everything() {
    let report = staff_report(
        "Collapse",
        "Building collapse, many people trapped near the hospital",
    )
    .with_severity("critical")
    .with_prior_analysis(PriorAnalysis {
        is_real: Some(false),
        confidence: Some(0.99),
    });

    let result = TriageEngine::standard()
        .triage(&report, &[alerting_sensor()], now())
        .unwrap();

    assert_eq!(result.score, 0);
    assert_eq!(result.escalation_target, "Vigilance Department");
    assert_eq!(result.explanation, FRAUD_MESSAGE);
    assert_eq!(result.label, FLAGGED_LABEL);
    assert!(result.fraud_suspected);
    assert_eq!(result.risk_level, PriorityTier::Low);
    let penalty = result.breakdown.rows().last().unwrap();
    assert_eq!(penalty.kind, BreakdownKind::Penalty);
    assert_eq!(penalty.contribution, -100);
}

#[test]
fn stacked_uncertainty_trips_low_confidence_gate() {
    let report = staff_report("Pothole", "Not sure, maybe a pothole? could be a prank");
    let result = TriageEngine::standard().triage(&report, &[], now()).unwrap();
    assert_eq!(result.score, 0);
    assert!(result.fraud_suspected);
    assert!(result.confidence < 0.4);
}

#[test]
fn authenticity_true_is_not_fraud() {
    let report = staff_report("Pothole", "Deep pothole").with_prior_analysis(PriorAnalysis {
        is_real: Some(true),
        confidence: None,
    });
    let result = TriageEngine::standard().triage(&report, &[], now()).unwrap();
    assert!(!result.fraud_suspected);
    assert!(result.score > 0);
}

// ── Bounds ──

#[test]
fn scores_always_within_bounds() {
    let engine = TriageEngine::standard();
    let texts = [
        (
            "Explosion",
            "explosion fire collapse gas leak sparking live wire hospital bridge railway \
             flood toxic chemical viral news hundreds children elderly reopened boundary \
             heavy rain slum substation",
        ),
        ("Bench", "wobbly bench"),
        ("Prank", "fake prank test report maybe not sure duplicate no issue"),
        ("Overdue", "pothole again and again, still not fixed"),
    ];
    for severity in ["critical", "high", "medium", "low", "unknown"] {
        for (title, description) in texts {
            let mut report = staff_report(title, description).with_severity(severity);
            report.reported_at = now() - Duration::days(10);
            let result = engine
                .triage(&report, &[alerting_sensor()], now())
                .unwrap();
            assert!(result.score <= 100, "{title}/{severity}: {}", result.score);
            assert!((0.0..=1.0).contains(&result.confidence));
        }
    }
}

// ── Idempotence ──

#[test]
fn same_input_and_clock_is_byte_identical() {
    let engine = TriageEngine::standard();
    let report = staff_report("Flooded underpass", "Flood water near the school, children stuck")
        .with_sector("drainage")
        .with_source(ReportSource::Citizen);

    let a = engine.assess(&report, &[alerting_sensor()], now()).unwrap();
    let b = engine.assess(&report, &[alerting_sensor()], now()).unwrap();

    assert_eq!(
        serde_json::to_string(&a.triage).unwrap(),
        serde_json::to_string(&b.triage).unwrap()
    );
    assert_eq!(
        serde_json::to_string(&a.consistency).unwrap(),
        serde_json::to_string(&b.consistency).unwrap()
    );
    assert_eq!(a.triage.digest().unwrap(), b.triage.digest().unwrap());
    assert_eq!(a.consistency.digest().unwrap(), b.consistency.digest().unwrap());
}

#[test]
fn parallel_evaluation_matches_sequential() {
    let engine = TriageEngine::standard();
    let report = staff_report("Leak", "Pipeline burst on the main road, water everywhere");
    let expected = engine.triage(&report, &[], now()).unwrap();

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| engine.triage(&report, &[], now()).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for result in results {
        assert_eq!(result, expected);
    }
}

// ── Breakdown and rationale ──

#[test]
fn breakdown_accounts_for_score() {
    // base 20 + roads 10 + accident 22 + arterial road 8 + image 5 = 65
    let report = staff_report("Crash", "Collision at the junction")
        .with_sector("roads")
        .with_severity("medium");
    let result = TriageEngine::standard().triage(&report, &[], now()).unwrap();

    assert_eq!(result.breakdown.arithmetic_total(), 65);
    assert_eq!(result.score, 65);
    assert_eq!(result.risk_level, PriorityTier::High);
    assert_eq!(result.escalation_target, "Traffic Police");
    assert_eq!(result.reasons[0], "Accident");
}

#[test]
fn explanation_has_no_duplicates() {
    let report = staff_report("Hospital", "Hospital road near the hospital")
        .with_sector("roads");
    let result = TriageEngine::standard().triage(&report, &[], now()).unwrap();
    let mut seen = std::collections::HashSet::new();
    assert!(result.reasons.iter().all(|r| seen.insert(r.clone())));
}

// ── Seasonal escalation (caller side) ──

#[test]
fn water_in_may_upgrades_declared_low_to_medium() {
    let report = staff_report("Low pressure", "Tap pressure is low in the mornings")
        .with_sector("water")
        .with_severity("Low");

    let adjustment = seasonal_adjustment_at(report.sector.as_deref(), now());
    assert_eq!(adjustment.multiplier, 1.6);

    let declared = PriorityTier::parse(report.severity.as_deref().unwrap()).unwrap();
    let escalation = escalate(declared, &adjustment);
    assert_eq!(escalation.tier, PriorityTier::Medium);
    assert!(escalation.note.is_some());

    // base 10 + water 15 + image 5 = 30
    let result = TriageEngine::standard().triage(&report, &[], now()).unwrap();
    assert_eq!(result.score, 30);
    assert_eq!(result.risk_level, PriorityTier::Low);

    let escalated = result.with_seasonal_escalation(&adjustment);
    assert_eq!(escalated.risk_level, PriorityTier::Medium);
    assert_eq!(escalated.score, result.score);
    assert_eq!(escalated.breakdown, result.breakdown);
    assert!(escalated.explanation.contains("Seasonal escalation"));
    // the original result is untouched
    assert_eq!(result.risk_level, PriorityTier::Low);
}

#[test]
fn roads_in_october_do_not_escalate() {
    let october = Utc.with_ymd_and_hms(2024, 10, 3, 9, 0, 0).unwrap();
    let adjustment = seasonal_adjustment_at(Some("roads"), october);
    assert_eq!(adjustment.multiplier, 1.4);
    let escalation = escalate(PriorityTier::Low, &adjustment);
    assert_eq!(escalation.tier, PriorityTier::Low);
}
