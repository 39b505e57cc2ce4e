//! Weighted aggregation.
//!
//! Turns a [`SignalSet`] into a clamped score, a confidence modifier, an
//! escalation target and an append-only breakdown. Rules:
//!
//! - base severity from the declared tier, or the life-safety override;
//! - every scoring signal adds its weight (no per-category caps);
//! - confidence-only rules lower confidence and add a sentinel warning row;
//! - any alerting nearby sensor adds a single bonus;
//! - the first escalation target wins unless a later rule outweighs the
//!   replace threshold.

use crate::config::TriageConfig;
use crate::domain::{BreakdownKind, IncidentReport, PriorityTier, ScoreBreakdown, SensorReading};
use crate::explanation::ExplanationBuilder;
use crate::signals::{scan_text, SignalSet};
use crate::taxonomy::{RiskAction, Taxonomy};

/// Confidence change for `downgrade_confidence` rules.
pub const DOWNGRADE_CONFIDENCE_DELTA: f64 = -0.4;
/// Confidence change for `flag_uncertainty` rules.
pub const FLAG_UNCERTAINTY_DELTA: f64 = -0.2;

/// Base severity for a declared tier; missing or unknown values score as low.
pub fn base_severity(declared: Option<&str>) -> i32 {
    match declared.and_then(PriorityTier::parse) {
        Some(PriorityTier::Critical) => 40,
        Some(PriorityTier::High) => 30,
        Some(PriorityTier::Medium) => 20,
        Some(PriorityTier::Low) | None => 10,
    }
}

/// Escalation target selection.
///
/// The first offered target is kept. A later offer replaces it only when its
/// weight is strictly greater than the replace threshold; equal or lower
/// weights never replace. A locked target is never replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscalationPick {
    target: Option<String>,
    locked: bool,
    replace_above: i32,
}

impl EscalationPick {
    pub fn new(replace_above: i32) -> Self {
        Self {
            target: None,
            locked: false,
            replace_above,
        }
    }

    /// Offer a target from a rule of the given weight. Returns `true` when
    /// the offer was taken.
    pub fn offer(&mut self, target: &str, weight: i32) -> bool {
        if self.locked {
            return false;
        }
        if self.target.is_none() || weight > self.replace_above {
            self.target = Some(target.to_string());
            return true;
        }
        false
    }

    /// Set and lock the target.
    pub fn lock(&mut self, target: &str) {
        self.target = Some(target.to_string());
        self.locked = true;
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn into_target(self) -> Option<String> {
        self.target
    }
}

/// Outcome of aggregation, before the confidence gate.
#[derive(Debug, Clone)]
pub struct Aggregation {
    /// Total clamped to 0–100.
    pub score: u8,
    /// Unclamped total.
    pub raw_total: i32,
    pub confidence_modifier: f64,
    pub escalation_target: Option<String>,
    /// Keyword that triggered the life-safety override, if any.
    pub life_safety_keyword: Option<String>,
    pub alerting_sensors: usize,
    pub breakdown: ScoreBreakdown,
    pub explanation: ExplanationBuilder,
}

/// Aggregate matched signals for one report.
pub fn aggregate(
    report: &IncidentReport,
    signals: &SignalSet<'_>,
    sensors: &[SensorReading],
    taxonomy: &Taxonomy,
    config: &TriageConfig,
) -> Aggregation {
    let mut breakdown = ScoreBreakdown::default();
    let mut explanation = ExplanationBuilder::new();
    let mut escalation = EscalationPick::new(config.escalation_replace_weight);
    let mut confidence_modifier = 0.0;

    let scan = scan_text(report);
    let life_safety_keyword = taxonomy.life_safety_hit(&scan).map(str::to_string);

    let mut total = match &life_safety_keyword {
        Some(keyword) => {
            breakdown.push(
                format!("Life-safety override ({keyword})"),
                config.life_safety_base,
                BreakdownKind::Base,
            );
            explanation.pin(format!("Life-safety hazard detected: {keyword}"));
            escalation.lock(&config.disaster_authority);
            config.life_safety_base
        }
        None => {
            let base = base_severity(report.severity.as_deref());
            let declared = report
                .severity
                .as_deref()
                .and_then(PriorityTier::parse)
                .unwrap_or(PriorityTier::Low);
            breakdown.push(
                format!("Declared severity: {declared}"),
                base,
                BreakdownKind::Base,
            );
            base
        }
    };

    for signal in signals.iter() {
        let entry = signal.entry;
        let advanced = entry.category.is_advanced_risk();
        let action = if advanced { entry.action } else { RiskAction::None };

        match action {
            RiskAction::None => {
                total = total.saturating_add(entry.weight);
                breakdown.push(entry.label.as_str(), entry.weight, BreakdownKind::Risk);
                explanation.add(entry.label.as_str(), entry.weight);
                if let Some(target) = &entry.escalation_target {
                    escalation.offer(target, entry.weight);
                }
            }
            RiskAction::DowngradeConfidence | RiskAction::FlagUncertainty => {
                let delta = if action == RiskAction::DowngradeConfidence {
                    DOWNGRADE_CONFIDENCE_DELTA
                } else {
                    FLAG_UNCERTAINTY_DELTA
                };
                confidence_modifier += delta;
                let sentinel = (delta * 100.0).round() as i32;
                breakdown.push(entry.label.as_str(), sentinel, BreakdownKind::Warning);
                explanation.add(format!("{} (confidence reduced)", entry.label), sentinel);
            }
        }
    }

    let alerting_sensors = sensors.iter().filter(|s| s.status.is_alerting()).count();
    if alerting_sensors > 0 {
        total = total.saturating_add(config.sensor_bonus);
        breakdown.push(
            format!("Nearby sensor alert ({alerting_sensors})"),
            config.sensor_bonus,
            BreakdownKind::Risk,
        );
        explanation.add(
            format!("{alerting_sensors} nearby sensor(s) reporting alerts"),
            config.sensor_bonus,
        );
    }

    Aggregation {
        score: clamp_score(total),
        raw_total: total,
        confidence_modifier,
        escalation_target: escalation.into_target(),
        life_safety_keyword,
        alerting_sensors,
        breakdown,
        explanation,
    }
}

/// Clamp an integer total into the 0–100 score range.
pub fn clamp_score(total: i32) -> u8 {
    total.clamp(0, 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Location, ReportSource, SensorStatus};
    use crate::signals::extract_signals;
    use crate::taxonomy::{TaxonomyCategory, TaxonomyEntry};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
    }

    fn report(title: &str, description: &str) -> IncidentReport {
        IncidentReport::new(
            title,
            description,
            now() - Duration::hours(2),
            Location {
                lat: 19.0760,
                lng: 72.8777,
                address: None,
            },
        )
        .with_source(ReportSource::Staff)
    }

    fn run(report: &IncidentReport, taxonomy: &Taxonomy, sensors: &[SensorReading]) -> Aggregation {
        let signals = extract_signals(report, taxonomy, now());
        aggregate(report, &signals, sensors, taxonomy, &TriageConfig::standard())
    }

    fn sensor(status: SensorStatus) -> SensorReading {
        SensorReading {
            id: "s".into(),
            status,
            sensor_type: "flow".into(),
        }
    }

    #[test]
    fn test_base_severity_map() {
        assert_eq!(base_severity(Some("critical")), 40);
        assert_eq!(base_severity(Some("High")), 30);
        assert_eq!(base_severity(Some("medium")), 20);
        assert_eq!(base_severity(Some("low")), 10);
        assert_eq!(base_severity(Some("whatever")), 10);
        assert_eq!(base_severity(None), 10);
    }

    #[test]
    fn test_escalation_first_wins_ties_never_replace() {
        let mut pick = EscalationPick::new(20);
        assert!(pick.offer("A", 5));
        assert!(!pick.offer("B", 20));
        assert!(!pick.offer("C", 3));
        assert_eq!(pick.target(), Some("A"));
        assert!(pick.offer("D", 21));
        assert_eq!(pick.target(), Some("D"));
    }

    #[test]
    fn test_locked_escalation_not_replaced() {
        let mut pick = EscalationPick::new(20);
        pick.lock("Disaster Management Cell");
        assert!(!pick.offer("Fire & Emergency Services", 99));
        assert_eq!(pick.target(), Some("Disaster Management Cell"));
    }

    #[test]
    fn test_life_safety_forces_base_50_and_disaster_target() {
        let r = report("Blast", "Explosion at the depot").with_severity("Low");
        let agg = run(&r, Taxonomy::standard(), &[]);
        let base = &agg.breakdown.rows()[0];
        assert_eq!(base.kind, BreakdownKind::Base);
        assert_eq!(base.contribution, 50);
        assert_eq!(agg.life_safety_keyword.as_deref(), Some("explosion"));
        assert_eq!(
            agg.escalation_target.as_deref(),
            Some("Disaster Management Cell")
        );
    }

    #[test]
    fn test_sector_weight_and_target() {
        // base 10 + roads 10
        let r = report("Pothole", "Deep pothole").with_sector("roads");
        let agg = run(&r, Taxonomy::standard(), &[]);
        assert_eq!(agg.raw_total, 20);
        assert_eq!(agg.score, 20);
        assert_eq!(
            agg.escalation_target.as_deref(),
            Some("Public Works Department")
        );
    }

    #[test]
    fn test_heavier_later_rule_replaces_target() {
        // roads (10, PWD) then accident (22 > 20, Traffic Police)
        let r = report("Crash", "Two bikes in a collision").with_sector("roads");
        let agg = run(&r, Taxonomy::standard(), &[]);
        assert_eq!(agg.escalation_target.as_deref(), Some("Traffic Police"));
    }

    #[test]
    fn test_weight_of_exactly_twenty_does_not_replace() {
        // drainage (15, Sewerage Board) then flooding (20, Disaster Management)
        let r = report("Street flooded", "Flood near the bus stop").with_sector("drainage");
        let agg = run(&r, Taxonomy::standard(), &[]);
        assert_eq!(agg.escalation_target.as_deref(), Some("Sewerage Board"));
    }

    #[test]
    fn test_confidence_actions_are_not_arithmetic() {
        let r = report("Pothole", "Maybe a pothole, this could be fake").with_sector("roads");
        let agg = run(&r, Taxonomy::standard(), &[]);
        assert!((agg.confidence_modifier - (-0.6)).abs() < 1e-9);
        let warnings: Vec<_> = agg.breakdown.of_kind(BreakdownKind::Warning).collect();
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().any(|w| w.contribution == -40));
        assert!(warnings.iter().any(|w| w.contribution == -20));
        // base 10 + roads 10; warnings never touch the total
        assert_eq!(agg.raw_total, 20);
        assert_eq!(agg.breakdown.arithmetic_total(), 20);
    }

    #[test]
    fn test_sensor_bonus_applied_once() {
        let r = report("Pothole", "Deep pothole").with_sector("roads");
        let sensors = vec![
            sensor(SensorStatus::Critical),
            sensor(SensorStatus::Warning),
            sensor(SensorStatus::Normal),
        ];
        let agg = run(&r, Taxonomy::standard(), &sensors);
        assert_eq!(agg.alerting_sensors, 2);
        assert_eq!(agg.raw_total, 40);
    }

    #[test]
    fn test_normal_sensors_add_nothing() {
        let r = report("Pothole", "Deep pothole").with_sector("roads");
        let agg = run(&r, Taxonomy::standard(), &[sensor(SensorStatus::Offline)]);
        assert_eq!(agg.raw_total, 20);
    }

    #[test]
    fn test_total_clamped_and_uncapped_per_category() {
        let entries = (0..6)
            .map(|i| {
                let (id, label) = (format!("env{i}"), format!("Env {i}"));
                TaxonomyEntry::new(&id, &label, 30, TaxonomyCategory::Environmental)
                    .keywords(&["sludge"])
            })
            .collect();
        let taxonomy = Taxonomy::from_entries(entries).unwrap();
        let r = report("Sludge", "sludge everywhere");
        let agg = run(&r, &taxonomy, &[]);
        assert_eq!(agg.raw_total, 10 + 6 * 30);
        assert_eq!(agg.score, 100);
    }

    #[test]
    fn test_extreme_weights_saturate_instead_of_overflowing() {
        // Bypasses validation the way a hand-built table could.
        let taxonomy = Taxonomy {
            entries: vec![
                TaxonomyEntry::new("huge", "Huge", i32::MAX, TaxonomyCategory::EventType)
                    .keywords(&["pothole"]),
                TaxonomyEntry::new("more", "More", i32::MAX, TaxonomyCategory::Impact)
                    .keywords(&["deep"]),
            ],
            life_safety_keywords: Vec::new(),
        };
        let r = report("Pothole", "Deep pothole");
        let agg = run(&r, &taxonomy, &[sensor(SensorStatus::Critical)]);
        assert_eq!(agg.raw_total, i32::MAX);
        assert_eq!(agg.score, 100);
    }

    #[test]
    fn test_action_ignored_outside_advanced_categories() {
        let entries = vec![TaxonomyEntry::new("odd", "Odd", 7, TaxonomyCategory::Impact)
            .keywords(&["odd"])
            .action(RiskAction::DowngradeConfidence)];
        let taxonomy = Taxonomy::from_entries(entries).unwrap();
        let agg = run(&report("Odd", "odd thing"), &taxonomy, &[]);
        assert_eq!(agg.raw_total, 17);
        assert_eq!(agg.confidence_modifier, 0.0);
    }
}
