//! Domain models for the triage engine.
//!
//! - `IncidentReport`: the raw submission and its nearby sensor context
//! - `TriageResult`: score, tier, breakdown and rationale for one report
//! - `TriageError`: precondition and configuration failures

pub mod digest;
pub mod error;
pub mod report;
pub mod result;

pub use digest::{canonical_json, compute_digest, digest_of};
pub use error::{Result, TriageError};
pub use report::{
    IncidentReport, Location, PriorAnalysis, RawGps, ReportSource, SensorReading, SensorStatus,
};
pub use result::{BreakdownKind, BreakdownRow, PriorityTier, ScoreBreakdown, TriageResult};
