//! Incident report input model.
//!
//! Field names follow the camelCase JSON produced by the surrounding REST
//! layer so a stored report document deserializes without a mapping step.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{Result, TriageError};

/// Who submitted the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSource {
    #[default]
    Citizen,
    Staff,
    System,
    Iot,
}

/// Declared location of the issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Device GPS fix captured alongside the submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGps {
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    /// Capture time in milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<i64>,
}

impl RawGps {
    /// Capture time as a UTC timestamp, if present and representable.
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp_ms.and_then(DateTime::<Utc>::from_timestamp_millis)
    }
}

/// Fields left behind by an earlier automated analysis pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorAnalysis {
    /// Authenticity flag. Only an explicit `false` triggers the fraud gate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_real: Option<bool>,
    /// Confidence in 0.0–1.0; replaces the configured base confidence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// A raw incident report as submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    /// Declared severity as free text (`"Low"`, `"critical"`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default)]
    pub source: ReportSource,
    pub reported_at: DateTime<Utc>,
    pub location: Location,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_gps: Option<RawGps>,
    /// Image URL or inline payload.
    #[serde(default, alias = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<PriorAnalysis>,
}

impl IncidentReport {
    /// Minimal report with the required fields; everything optional unset.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        reported_at: DateTime<Utc>,
        location: Location,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: description.into(),
            sector: None,
            severity: None,
            source: ReportSource::default(),
            reported_at,
            location,
            raw_gps: None,
            image_reference: None,
            ai_analysis: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    pub fn with_severity(mut self, severity: impl Into<String>) -> Self {
        self.severity = Some(severity.into());
        self
    }

    pub fn with_source(mut self, source: ReportSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_raw_gps(mut self, raw_gps: RawGps) -> Self {
        self.raw_gps = Some(raw_gps);
        self
    }

    pub fn with_image(mut self, image_reference: impl Into<String>) -> Self {
        self.image_reference = Some(image_reference.into());
        self
    }

    pub fn with_prior_analysis(mut self, analysis: PriorAnalysis) -> Self {
        self.ai_analysis = Some(analysis);
        self
    }

    /// Identifier used in logs and artifact paths.
    pub fn display_id(&self) -> &str {
        self.id.as_deref().unwrap_or("unidentified")
    }

    /// Check the caller-side precondition: non-empty title and description
    /// and finite, in-range coordinates.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(TriageError::MissingField { field: "title" });
        }
        if self.description.trim().is_empty() {
            return Err(TriageError::MissingField {
                field: "description",
            });
        }
        check_coordinates("location", self.location.lat, self.location.lng)?;
        if let Some(gps) = &self.raw_gps {
            check_coordinates("rawGps", gps.lat, gps.lng)?;
        }
        Ok(())
    }
}

fn check_coordinates(field: &'static str, lat: f64, lng: f64) -> Result<()> {
    let valid = lat.is_finite()
        && lng.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lng);
    if valid {
        Ok(())
    } else {
        Err(TriageError::InvalidCoordinates { field, lat, lng })
    }
}

/// Status reported by a nearby IoT sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorStatus {
    Normal,
    Warning,
    Critical,
    Offline,
    #[serde(other)]
    Unknown,
}

impl SensorStatus {
    /// Whether this status contributes the nearby-sensor bonus.
    pub fn is_alerting(self) -> bool {
        matches!(self, Self::Warning | Self::Critical)
    }
}

/// One nearby sensor reading supplied with the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorReading {
    pub id: String,
    pub status: SensorStatus,
    #[serde(rename = "type")]
    pub sensor_type: String,
}
