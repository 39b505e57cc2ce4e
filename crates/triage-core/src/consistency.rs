//! Evidence consistency validation.
//!
//! Cross-checks the device GPS fix, the attached image reference and the
//! capture timestamp against the declared report. Runs independently of
//! scoring and only reads location, time and image fields.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ConsistencyPolicy;
use crate::domain::digest::digest_of;
use crate::domain::{IncidentReport, ReportSource, Result};
use crate::geo::haversine_m;
use crate::ordered_set::OrderedSet;

/// A single evidence problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsistencyFlag {
    GpsDataMismatchHigh,
    GpsDataMismatchMinor,
    MissingRawGpsData,
    NoImageData,
    MalformedImageData,
    OldEvidenceTimestamp,
}

impl ConsistencyFlag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GpsDataMismatchHigh => "GPS_DATA_MISMATCH_HIGH",
            Self::GpsDataMismatchMinor => "GPS_DATA_MISMATCH_MINOR",
            Self::MissingRawGpsData => "MISSING_RAW_GPS_DATA",
            Self::NoImageData => "NO_IMAGE_DATA",
            Self::MalformedImageData => "MALFORMED_IMAGE_DATA",
            Self::OldEvidenceTimestamp => "OLD_EVIDENCE_TIMESTAMP",
        }
    }
}

impl std::fmt::Display for ConsistencyFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable outcome of one validation. Re-validating produces a new verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyVerdict {
    pub consistency_score: u8,
    pub is_inconsistent: bool,
    pub flags: OrderedSet<ConsistencyFlag>,
    /// Distance between device GPS and declared location, when both exist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gps_distance_meters: Option<f64>,
    pub validated_at: DateTime<Utc>,
}

impl ConsistencyVerdict {
    pub fn has_flag(&self, flag: ConsistencyFlag) -> bool {
        self.flags.contains(&flag)
    }

    /// Canonical SHA-256 digest of this verdict.
    pub fn digest(&self) -> Result<String> {
        digest_of(self)
    }
}

/// Non-URL image references shorter than the limit (in characters, not
/// bytes) are broken inline payloads.
fn is_malformed_inline(reference: &str, policy: &ConsistencyPolicy) -> bool {
    !reference.starts_with("http") && reference.chars().count() < policy.inline_image_min_len
}

/// Validate the evidence attached to `report` as of `now`.
pub fn validate_evidence(
    report: &IncidentReport,
    now: DateTime<Utc>,
    policy: &ConsistencyPolicy,
) -> ConsistencyVerdict {
    let mut score: i32 = 100;
    let mut forced_zero = false;
    let mut flags = OrderedSet::new();
    let mut gps_distance_meters = None;

    match &report.raw_gps {
        Some(gps) => {
            let distance = haversine_m(gps.lat, gps.lng, report.location.lat, report.location.lng);
            gps_distance_meters = Some(distance);
            if distance > policy.gps_high_threshold_m {
                flags.insert(ConsistencyFlag::GpsDataMismatchHigh);
                score = score.saturating_sub(policy.gps_high_penalty);
            } else if distance > policy.gps_minor_threshold_m {
                flags.insert(ConsistencyFlag::GpsDataMismatchMinor);
                score = score.saturating_sub(policy.gps_minor_penalty);
            }
        }
        None if report.source == ReportSource::Citizen => {
            flags.insert(ConsistencyFlag::MissingRawGpsData);
            score = score.saturating_sub(policy.missing_gps_penalty);
        }
        None => {}
    }

    match report.image_reference.as_deref() {
        None | Some("") => {
            flags.insert(ConsistencyFlag::NoImageData);
            score = score.saturating_sub(policy.missing_image_penalty);
        }
        Some(reference) if is_malformed_inline(reference, policy) => {
            flags.insert(ConsistencyFlag::MalformedImageData);
            forced_zero = true;
        }
        Some(_) => {}
    }

    // An age limit beyond the representable range never marks evidence stale.
    let max_age = Duration::try_hours(policy.max_evidence_age_hours);
    let captured_at = report.raw_gps.as_ref().and_then(|g| g.captured_at());
    if let (Some(captured_at), Some(max_age)) = (captured_at, max_age) {
        let age = (now - captured_at).abs();
        if age > max_age {
            flags.insert(ConsistencyFlag::OldEvidenceTimestamp);
            score = score.saturating_sub(policy.old_evidence_penalty);
        }
    }

    let consistency_score = if forced_zero {
        0
    } else {
        score.clamp(0, 100) as u8
    };

    ConsistencyVerdict {
        consistency_score,
        is_inconsistent: forced_zero || consistency_score < policy.inconsistency_threshold,
        flags,
        gps_distance_meters,
        validated_at: now,
    }
}
