//! Error taxonomy for the triage engine.
//!
//! Data-quality gaps (missing image, missing GPS, missing confidence) are not
//! errors; they resolve to defaults or surface as verdict flags. The variants
//! here cover precondition violations and malformed configuration only.

/// Triage engine errors.
#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("report is missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid coordinates for {field}: lat={lat}, lng={lng}")]
    InvalidCoordinates {
        field: &'static str,
        lat: f64,
        lng: f64,
    },

    #[error("invalid taxonomy: {0}")]
    InvalidTaxonomy(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("NaN/Infinity not permitted in canonical JSON")]
    NonFiniteNumber,

    #[error("digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for triage operations.
pub type Result<T> = std::result::Result<T, TriageError>;
