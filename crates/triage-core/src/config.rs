//! Engine configuration.
//!
//! Every knob has a production default exposed through `standard()`; a JSON
//! document may override any subset of fields.

use serde::{Deserialize, Serialize};

use crate::domain::{Result, TriageError};

/// Longest accepted evidence age limit: ten years.
pub const MAX_EVIDENCE_AGE_HOURS: i64 = 24 * 365 * 10;

/// Bonuses, bases and penalties are score points on the 0–100 scale.
fn check_points(name: &str, value: i32) -> Result<()> {
    if (0..=100).contains(&value) {
        Ok(())
    } else {
        Err(TriageError::InvalidConfig(format!(
            "{name} must be within 0..=100, got {value}"
        )))
    }
}

/// Scoring, gate and escalation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TriageConfig {
    /// Confidence assumed when the report carries no prior analysis.
    pub base_confidence: f64,
    /// Effective confidence strictly below this triggers the fraud override.
    pub fraud_confidence_threshold: f64,
    /// Effective confidence strictly above this earns the bonus.
    pub high_confidence_threshold: f64,
    pub high_confidence_bonus: i32,
    /// One-time bonus for any alerting nearby sensor.
    pub sensor_bonus: i32,
    /// Base severity forced by the life-safety override.
    pub life_safety_base: i32,
    /// A later escalation target replaces the current one only when the
    /// rule's weight is strictly greater than this.
    pub escalation_replace_weight: i32,
    /// Maximum number of reasons kept in the rationale.
    pub max_reasons: usize,
    pub disaster_authority: String,
    pub vigilance_authority: String,
    /// Target used when no rule supplies one.
    pub default_authority: String,
}

impl TriageConfig {
    pub fn standard() -> Self {
        Self {
            base_confidence: 0.8,
            fraud_confidence_threshold: 0.4,
            high_confidence_threshold: 0.9,
            high_confidence_bonus: 5,
            sensor_bonus: 20,
            life_safety_base: 50,
            escalation_replace_weight: 20,
            max_reasons: 5,
            disaster_authority: "Disaster Management Cell".to_string(),
            vigilance_authority: "Vigilance Department".to_string(),
            default_authority: "Municipal Helpdesk".to_string(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("baseConfidence", self.base_confidence),
            ("fraudConfidenceThreshold", self.fraud_confidence_threshold),
            ("highConfidenceThreshold", self.high_confidence_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(TriageError::InvalidConfig(format!(
                    "{name} must be within 0.0..=1.0, got {value}"
                )));
            }
        }
        if self.fraud_confidence_threshold >= self.high_confidence_threshold {
            return Err(TriageError::InvalidConfig(
                "fraudConfidenceThreshold must be below highConfidenceThreshold".into(),
            ));
        }
        for (name, value) in [
            ("highConfidenceBonus", self.high_confidence_bonus),
            ("sensorBonus", self.sensor_bonus),
            ("lifeSafetyBase", self.life_safety_base),
        ] {
            check_points(name, value)?;
        }
        if self.max_reasons == 0 {
            return Err(TriageError::InvalidConfig(
                "maxReasons must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Thresholds and penalties used by the evidence consistency validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConsistencyPolicy {
    /// Distances above this (metres) are a minor mismatch.
    pub gps_minor_threshold_m: f64,
    /// Distances above this (metres) are a major mismatch.
    pub gps_high_threshold_m: f64,
    pub gps_minor_penalty: i32,
    pub gps_high_penalty: i32,
    pub missing_gps_penalty: i32,
    pub missing_image_penalty: i32,
    /// Image references shorter than this that are not URLs are treated as
    /// malformed inline payloads.
    pub inline_image_min_len: usize,
    pub max_evidence_age_hours: i64,
    pub old_evidence_penalty: i32,
    /// Scores strictly below this are inconsistent.
    pub inconsistency_threshold: u8,
}

impl ConsistencyPolicy {
    pub fn standard() -> Self {
        Self {
            gps_minor_threshold_m: 20.0,
            gps_high_threshold_m: 100.0,
            gps_minor_penalty: 10,
            gps_high_penalty: 65,
            missing_gps_penalty: 50,
            missing_image_penalty: 80,
            inline_image_min_len: 1000,
            max_evidence_age_hours: 24,
            old_evidence_penalty: 30,
            inconsistency_threshold: 40,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.gps_minor_threshold_m >= 0.0
            && self.gps_minor_threshold_m <= self.gps_high_threshold_m)
        {
            return Err(TriageError::InvalidConfig(
                "gps thresholds must satisfy 0 <= minor <= high".into(),
            ));
        }
        for (name, value) in [
            ("gpsMinorPenalty", self.gps_minor_penalty),
            ("gpsHighPenalty", self.gps_high_penalty),
            ("missingGpsPenalty", self.missing_gps_penalty),
            ("missingImagePenalty", self.missing_image_penalty),
            ("oldEvidencePenalty", self.old_evidence_penalty),
        ] {
            check_points(name, value)?;
        }
        if !(0..=MAX_EVIDENCE_AGE_HOURS).contains(&self.max_evidence_age_hours) {
            return Err(TriageError::InvalidConfig(format!(
                "maxEvidenceAgeHours must be within 0..={MAX_EVIDENCE_AGE_HOURS}, got {}",
                self.max_evidence_age_hours
            )));
        }
        if self.inconsistency_threshold > 100 {
            return Err(TriageError::InvalidConfig(
                "inconsistencyThreshold must be within 0..=100".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ConsistencyPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

/// Complete engine configuration as loaded from a config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub triage: TriageConfig,
    pub consistency: ConsistencyPolicy,
}

impl EngineConfig {
    /// Parse a JSON config document; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.triage.validate()?;
        self.consistency.validate()
    }
}
