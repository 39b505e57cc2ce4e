//! Signal extraction.
//!
//! Matches one report against every taxonomy and returns the matched rules as
//! a [`SignalSet`]. Text taxonomies use case-insensitive substring matching on
//! a single scan string; time signals use elapsed hours; confidence signals
//! are inferred from the report's structure, never from its text.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{IncidentReport, ReportSource};
use crate::taxonomy::{
    Taxonomy, TaxonomyCategory, TaxonomyEntry, CITIZEN_SOURCE_SIGNAL, IMAGE_EVIDENCE_SIGNAL,
};

/// Why a rule fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalTrigger {
    /// A keyword appeared in the scan text.
    Keyword,
    /// The declared sector matched the rule exactly.
    Structured,
    /// The hours-elapsed predicate held.
    ElapsedTime,
    /// Inferred from report structure (source, attachments).
    Inferred,
}

/// A taxonomy entry matched for one report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Signal<'t> {
    pub entry: &'t TaxonomyEntry,
    pub trigger: SignalTrigger,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_keyword: Option<&'t str>,
}

impl<'t> Signal<'t> {
    pub fn id(&self) -> &'t str {
        &self.entry.id
    }

    pub fn category(&self) -> TaxonomyCategory {
        self.entry.category
    }
}

/// Signals deduplicated by entry id, iterated in first-match order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SignalSet<'t> {
    signals: Vec<Signal<'t>>,
}

impl<'t> SignalSet<'t> {
    /// Insert unless a signal with the same id is already present.
    pub fn insert(&mut self, signal: Signal<'t>) -> bool {
        if self.contains(signal.id()) {
            return false;
        }
        self.signals.push(signal);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.signals.iter().any(|s| s.id() == id)
    }

    pub fn get(&self, id: &str) -> Option<&Signal<'t>> {
        self.signals.iter().find(|s| s.id() == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Signal<'t>> {
        self.signals.iter()
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn in_category(&self, category: TaxonomyCategory) -> impl Iterator<Item = &Signal<'t>> {
        self.signals.iter().filter(move |s| s.category() == category)
    }

    pub fn ids(&self) -> Vec<String> {
        self.signals.iter().map(|s| s.id().to_string()).collect()
    }
}

/// Lowercase scan string: title, description, address and declared sector.
pub fn scan_text(report: &IncidentReport) -> String {
    let mut parts = vec![report.title.as_str(), report.description.as_str()];
    if let Some(address) = &report.location.address {
        parts.push(address);
    }
    if let Some(sector) = &report.sector {
        parts.push(sector);
    }
    parts.join(" ").to_lowercase()
}

/// Hours elapsed between filing and `now`; future-dated reports count as
/// just filed.
pub fn hours_since_report(report: &IncidentReport, now: DateTime<Utc>) -> f64 {
    let elapsed_ms = (now - report.reported_at).num_milliseconds().max(0);
    elapsed_ms as f64 / 3_600_000.0
}

/// Match `report` against every category of `taxonomy`.
pub fn extract_signals<'t>(
    report: &IncidentReport,
    taxonomy: &'t Taxonomy,
    now: DateTime<Utc>,
) -> SignalSet<'t> {
    let scan = scan_text(report);
    let hours = hours_since_report(report, now);
    let mut set = SignalSet::default();

    for category in TaxonomyCategory::EVALUATION_ORDER {
        match category {
            TaxonomyCategory::Sector => match_sector(report, taxonomy, &scan, &mut set),
            TaxonomyCategory::Time => match_time(taxonomy, &scan, hours, &mut set),
            TaxonomyCategory::Confidence => match_confidence(report, taxonomy, &mut set),
            other => match_keywords(taxonomy.category(other), &scan, &mut set),
        }
    }

    set
}

fn match_keywords<'t>(
    entries: impl Iterator<Item = &'t TaxonomyEntry>,
    scan: &str,
    set: &mut SignalSet<'t>,
) {
    for entry in entries {
        if let Some(keyword) = entry.matched_keyword(scan) {
            set.insert(Signal {
                entry,
                trigger: SignalTrigger::Keyword,
                matched_keyword: Some(keyword),
            });
        }
    }
}

// A declared sector is matched exactly first so incidental words in the
// description cannot re-tag the report; free text is the fallback.
fn match_sector<'t>(
    report: &IncidentReport,
    taxonomy: &'t Taxonomy,
    scan: &str,
    set: &mut SignalSet<'t>,
) {
    if let Some(declared) = report.sector.as_deref() {
        let mut matched = false;
        for entry in taxonomy.category(TaxonomyCategory::Sector) {
            if entry.matches_exactly(declared) {
                matched |= set.insert(Signal {
                    entry,
                    trigger: SignalTrigger::Structured,
                    matched_keyword: None,
                });
            }
        }
        if matched {
            return;
        }
    }
    match_keywords(taxonomy.category(TaxonomyCategory::Sector), scan, set);
}

// Numeric and keyword time factors fire independently of each other.
fn match_time<'t>(taxonomy: &'t Taxonomy, scan: &str, hours: f64, set: &mut SignalSet<'t>) {
    for entry in taxonomy.category(TaxonomyCategory::Time) {
        if entry.hours.is_some_and(|p| p.holds(hours)) {
            set.insert(Signal {
                entry,
                trigger: SignalTrigger::ElapsedTime,
                matched_keyword: None,
            });
        } else if let Some(keyword) = entry.matched_keyword(scan) {
            set.insert(Signal {
                entry,
                trigger: SignalTrigger::Keyword,
                matched_keyword: Some(keyword),
            });
        }
    }
}

fn match_confidence<'t>(report: &IncidentReport, taxonomy: &'t Taxonomy, set: &mut SignalSet<'t>) {
    let has_image = report
        .image_reference
        .as_deref()
        .is_some_and(|r| !r.trim().is_empty());

    for entry in taxonomy.category(TaxonomyCategory::Confidence) {
        let fires = match entry.id.as_str() {
            CITIZEN_SOURCE_SIGNAL => report.source == ReportSource::Citizen,
            IMAGE_EVIDENCE_SIGNAL => has_image,
            _ => false,
        };
        if fires {
            set.insert(Signal {
                entry,
                trigger: SignalTrigger::Inferred,
                matched_keyword: None,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Location;
    use chrono::{Duration, TimeZone};

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

    #[test]
    fn test_scan_text_is_lowercase_and_includes_address_and_sector() {
        let mut r = report("Big POTHOLE", "Near Gate").with_sector("Roads");
        r.location.address = Some("MG Road".into());
        assert_eq!(scan_text(&r), "big pothole near gate mg road roads");
    }

    #[test]
    fn test_naive_substring_match_preserved() {
        let r = report("Suspicious man", "Carrying a firearm near the park");
        let signals = extract_signals(&r, Taxonomy::standard(), now());
        assert!(signals.contains("fire_event"));
    }

    #[test]
    fn test_declared_sector_exact_match_wins_over_text() {
        let r = report("Water on the road", "Garbage is floating in the water")
            .with_sector("drainage");
        let signals = extract_signals(&r, Taxonomy::standard(), now());
        let sectors: Vec<_> = signals
            .in_category(TaxonomyCategory::Sector)
            .map(|s| s.id())
            .collect();
        assert_eq!(sectors, vec!["drainage"]);
        assert_eq!(
            signals.get("drainage").unwrap().trigger,
            SignalTrigger::Structured
        );
    }

    #[test]
    fn test_unknown_declared_sector_falls_back_to_text() {
        let r = report("Overflowing garbage", "Bins not cleared").with_sector("misc");
        let signals = extract_signals(&r, Taxonomy::standard(), now());
        assert!(signals.contains("sanitation"));
        assert_eq!(
            signals.get("sanitation").unwrap().trigger,
            SignalTrigger::Keyword
        );
    }

    #[test]
    fn test_time_numeric_and_keyword_signals_both_fire() {
        let mut r = report("Pothole", "The pothole is back again");
        r.reported_at = now() - Duration::hours(80);
        let signals = extract_signals(&r, Taxonomy::standard(), now());
        assert!(signals.contains("overdue_72h"));
        assert!(signals.contains("pending_24h"));
        assert!(signals.contains("recurring"));
        assert!(!signals.contains("fresh_report"));
        assert_eq!(
            signals.get("overdue_72h").unwrap().trigger,
            SignalTrigger::ElapsedTime
        );
    }

    #[test]
    fn test_fresh_report_signal() {
        let mut r = report("Pothole", "Deep pothole");
        r.reported_at = now() - Duration::minutes(10);
        let signals = extract_signals(&r, Taxonomy::standard(), now());
        assert!(signals.contains("fresh_report"));
    }

    #[test]
    fn test_confidence_signals_are_structural() {
        // Mentioning a photo in text does not count as evidence.
        let r = report("Pothole", "photo evidence attached, citizen report");
        let signals = extract_signals(&r, Taxonomy::standard(), now());
        assert!(!signals.contains(IMAGE_EVIDENCE_SIGNAL));
        assert!(!signals.contains(CITIZEN_SOURCE_SIGNAL));

        let r = report("Pothole", "deep")
            .with_source(ReportSource::Citizen)
            .with_image("http://x/img.jpg");
        let signals = extract_signals(&r, Taxonomy::standard(), now());
        assert!(signals.contains(IMAGE_EVIDENCE_SIGNAL));
        assert!(signals.contains(CITIZEN_SOURCE_SIGNAL));
    }

    #[test]
    fn test_signals_deduplicated_by_id() {
        let r = report("Fire fire fire", "smoke and blaze, burning");
        let signals = extract_signals(&r, Taxonomy::standard(), now());
        assert_eq!(
            signals.iter().filter(|s| s.id() == "fire_event").count(),
            1
        );
    }

    #[test]
    fn test_advanced_risk_keywords_match() {
        let r = report("Chemical smell", "Toxic discharge near the railway");
        let signals = extract_signals(&r, Taxonomy::standard(), now());
        assert!(signals.contains("contamination"));
        assert!(signals.contains("critical_infrastructure"));
    }
}
