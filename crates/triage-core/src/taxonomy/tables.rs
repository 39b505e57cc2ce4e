//! Built-in rule table.
//!
//! Weights are integers added to the running score. Escalation targets name
//! the department a matched rule routes to; whether a later target replaces
//! an earlier one is decided by the aggregator.

use super::{HoursPredicate, RiskAction, Taxonomy, TaxonomyCategory as C, TaxonomyEntry as E};

/// Confidence signal fired for every citizen submission.
pub const CITIZEN_SOURCE_SIGNAL: &str = "citizen_source";

/// Confidence signal fired when an image reference is attached.
pub const IMAGE_EVIDENCE_SIGNAL: &str = "image_evidence";

/// Text that forces the life-safety override.
pub const LIFE_SAFETY_KEYWORDS: [&str; 7] = [
    "death",
    "injury",
    "fire",
    "explosion",
    "collapse",
    "drowning",
    "electrocution",
];

pub(super) fn standard_taxonomy() -> Taxonomy {
    let mut entries = Vec::new();
    entries.extend(sectors());
    entries.extend(event_types());
    entries.extend(locations());
    entries.extend(impacts());
    entries.extend(time_factors());
    entries.extend(confidence());
    entries.extend(advanced_risk());

    Taxonomy {
        entries,
        life_safety_keywords: LIFE_SAFETY_KEYWORDS.iter().map(|k| k.to_string()).collect(),
    }
}

fn sectors() -> Vec<E> {
    vec![
        E::new("roads", "Roads", 10, C::Sector)
            .keywords(&["road", "pothole", "street", "pavement", "footpath", "traffic signal"])
            .escalate("Public Works Department"),
        E::new("water", "Water Supply", 15, C::Sector)
            .keywords(&["water", "pipeline", "tap", "water supply"])
            .escalate("Water Supply Department"),
        E::new("drainage", "Drainage & Sewerage", 15, C::Sector)
            .keywords(&["drain", "sewer", "sewage", "manhole", "gutter"])
            .escalate("Sewerage Board"),
        E::new("lighting", "Street Lighting", 8, C::Sector)
            .keywords(&["streetlight", "street light", "lamp post", "lighting"])
            .escalate("Electrical Maintenance Division"),
        E::new("electricity", "Electricity", 15, C::Sector)
            .keywords(&["electricity", "power cut", "transformer", "power line"])
            .escalate("Electricity Board"),
        E::new("sanitation", "Sanitation & Waste", 10, C::Sector)
            .keywords(&["garbage", "waste", "trash", "litter", "dump", "sanitation"])
            .escalate("Solid Waste Management"),
        E::new("parks", "Parks & Trees", 5, C::Sector)
            .keywords(&["park", "tree", "garden", "playground"])
            .escalate("Horticulture Department"),
        E::new("public_safety", "Public Safety", 20, C::Sector)
            .keywords(&["crime", "theft", "harassment", "unsafe", "violence"])
            .escalate("Police Control Room"),
        E::new("health", "Public Health", 15, C::Sector)
            .keywords(&["mosquito", "dengue", "disease", "stray dog", "health"])
            .escalate("Health Department"),
    ]
}

fn event_types() -> Vec<E> {
    vec![
        E::new("fire_event", "Fire", 25, C::EventType)
            .keywords(&["fire", "smoke", "burning", "blaze"])
            .escalate("Fire & Emergency Services"),
        E::new("flooding", "Flooding", 20, C::EventType)
            .keywords(&["flood", "inundat", "waterlogg", "overflow"])
            .escalate("Disaster Management Cell"),
        E::new("structural_failure", "Structural failure", 25, C::EventType)
            .keywords(&["collapse", "cave-in", "sinkhole", "crack"])
            .escalate("Building & Structures Cell"),
        E::new("leak", "Leak or burst", 12, C::EventType).keywords(&["leak", "burst", "seepage"]),
        E::new("outage", "Service outage", 10, C::EventType)
            .keywords(&["outage", "no water", "no power", "not working"]),
        E::new("accident", "Accident", 22, C::EventType)
            .keywords(&["accident", "crash", "collision"])
            .escalate("Traffic Police"),
        E::new("blockage", "Blockage", 8, C::EventType)
            .keywords(&["blocked", "clogged", "choked", "obstruct"]),
        E::new("exposed_wiring", "Exposed wiring", 25, C::EventType)
            .keywords(&["exposed wire", "live wire", "sparking", "short circuit"])
            .escalate("Electricity Board"),
        E::new("gas_leak", "Gas leak", 30, C::EventType)
            .keywords(&["gas leak", "gas smell", "lpg"])
            .escalate("Fire & Emergency Services"),
    ]
}

fn locations() -> Vec<E> {
    vec![
        E::new("near_school", "Near a school", 10, C::Location)
            .keywords(&["school", "college", "kindergarten"]),
        E::new("near_hospital", "Near a hospital", 12, C::Location)
            .keywords(&["hospital", "clinic", "ambulance"]),
        E::new("arterial_road", "Arterial road", 8, C::Location)
            .keywords(&["highway", "main road", "junction", "flyover"]),
        E::new("crowded_area", "Crowded public area", 6, C::Location)
            .keywords(&["market", "bazaar", "mall", "station"]),
        E::new("residential", "Residential area", 4, C::Location)
            .keywords(&["residential", "society", "colony", "apartment"]),
    ]
}

fn impacts() -> Vec<E> {
    vec![
        E::new("threat_to_life", "Threat to life", 20, C::Impact).keywords(&[
            "death",
            "dead",
            "injur",
            "bleeding",
            "unconscious",
            "drowning",
            "electrocution",
        ]),
        E::new("wide_impact", "Large population affected", 12, C::Impact).keywords(&[
            "entire area",
            "whole street",
            "hundreds",
            "many people",
            "several families",
        ]),
        E::new("vulnerable_groups", "Vulnerable groups affected", 10, C::Impact).keywords(&[
            "child",
            "elderly",
            "senior citizen",
            "disabled",
            "pregnant",
        ]),
        E::new("traffic_disruption", "Traffic disruption", 6, C::Impact)
            .keywords(&["traffic jam", "congestion", "gridlock"]),
        E::new("property_damage", "Property damage", 8, C::Impact)
            .keywords(&["damage", "destroyed"]),
    ]
}

fn time_factors() -> Vec<E> {
    vec![
        E::new("overdue_72h", "Unresolved for more than 72 hours", 10, C::Time)
            .hours(HoursPredicate::AtLeast(72.0)),
        E::new("pending_24h", "Pending for more than 24 hours", 5, C::Time)
            .hours(HoursPredicate::AtLeast(24.0)),
        E::new("fresh_report", "Reported within the last hour", 3, C::Time)
            .hours(HoursPredicate::Below(1.0)),
        E::new("recurring", "Recurring issue", 8, C::Time).keywords(&[
            "again",
            "recurring",
            "repeatedly",
            "every day",
            "still not fixed",
        ]),
        E::new("night_hazard", "Night-time hazard", 5, C::Time)
            .keywords(&["at night", "after dark"]),
    ]
}

fn confidence() -> Vec<E> {
    vec![
        E::new(CITIZEN_SOURCE_SIGNAL, "Unverified citizen submission", -5, C::Confidence),
        E::new(IMAGE_EVIDENCE_SIGNAL, "Photo evidence attached", 5, C::Confidence),
    ]
}

fn advanced_risk() -> Vec<E> {
    vec![
        E::new("contamination", "Environmental contamination", 15, C::Environmental)
            .keywords(&["chemical", "toxic", "oil spill", "contaminat", "pollution"])
            .escalate("Pollution Control Board"),
        E::new("tree_fall", "Tree fall risk", 8, C::Environmental)
            .keywords(&["fallen tree", "uprooted"]),
        E::new("revenue_loss", "Revenue or asset loss", 8, C::Financial).keywords(&[
            "meter tampering",
            "illegal connection",
            "revenue loss",
            "wastage",
        ]),
        E::new("public_attention", "Media or public attention", 10, C::Reputational)
            .keywords(&["viral", "news", "media", "twitter"])
            .escalate("Public Relations Office"),
        E::new("possible_duplicate", "Possible duplicate submission", 0, C::DataIntegrity)
            .keywords(&["duplicate", "same complaint", "already reported"])
            .action(RiskAction::FlagUncertainty),
        E::new("prank_submission", "Possible test or prank submission", 0, C::DataIntegrity)
            .keywords(&["test report", "prank", "fake", "lorem ipsum", "ignore this"])
            .action(RiskAction::DowngradeConfidence),
        E::new("cascading_utility", "Cascading utility failure", 18, C::CascadingFailure)
            .keywords(&["substation", "trunk main", "pumping station", "spreading"])
            .escalate("Utility Coordination Cell"),
        E::new("weather_amplified", "Weather-amplified risk", 10, C::Temporal)
            .keywords(&["heavy rain", "monsoon", "storm", "cyclone", "heatwave"]),
        E::new("underserved", "Underserved community", 10, C::SocialEquity).keywords(&[
            "slum",
            "informal settlement",
            "low-income",
            "tribal",
        ]),
        E::new(
            "critical_infrastructure",
            "Critical infrastructure",
            22,
            C::InfrastructureCriticality,
        )
        .keywords(&[
            "power station",
            "water treatment",
            "bridge",
            "dam",
            "railway",
            "hospital",
        ])
        .escalate("Critical Infrastructure Cell"),
        E::new("vague_description", "Vague or uncertain description", 0, C::AiConfidence)
            .keywords(&["not sure", "maybe", "i think", "somewhere"])
            .action(RiskAction::FlagUncertainty),
        E::new("contradictory_details", "Contradictory details", 0, C::AiConfidence)
            .keywords(&["no issue", "nothing wrong", "resolved already"])
            .action(RiskAction::DowngradeConfidence),
        E::new("cross_jurisdiction", "Spans jurisdictions", 12, C::CrossJurisdiction)
            .keywords(&["boundary", "border", "neighbouring ward", "national highway"])
            .escalate("Inter-Department Coordination Cell"),
        E::new("reopened", "Reopened after resolution", 15, C::PostResolution)
            .keywords(&["reopened", "reappeared", "came back", "closed but"])
            .escalate("Quality Assurance Cell"),
    ]
}
