//! Civic Triage Core Library
//!
//! Scores civic incident reports and cross-checks their evidence. All
//! evaluation is synchronous and pure: inputs plus an injected clock fully
//! determine the output, and the rule tables are read-only after
//! construction, so one engine can be shared freely across threads.

pub mod aggregate;
pub mod config;
pub mod consistency;
pub mod domain;
pub mod engine;
pub mod explanation;
pub mod gate;
pub mod geo;
pub mod obs;
pub mod ordered_set;
pub mod seasonal;
pub mod signals;
pub mod taxonomy;
pub mod telemetry;

pub use domain::{
    BreakdownKind, BreakdownRow, IncidentReport, Location, PriorAnalysis, PriorityTier, RawGps,
    ReportSource, Result, ScoreBreakdown, SensorReading, SensorStatus, TriageError, TriageResult,
};

pub use aggregate::{aggregate, base_severity, Aggregation, EscalationPick};
pub use config::{ConsistencyPolicy, EngineConfig, TriageConfig};
pub use consistency::{validate_evidence, ConsistencyFlag, ConsistencyVerdict};
pub use engine::{Assessment, BatchItem, TriageEngine, FLAGGED_LABEL};
pub use explanation::{Explanation, ExplanationBuilder};
pub use gate::{apply_gate, effective_confidence, GateDecision, GateReason, FRAUD_MESSAGE};
pub use geo::haversine_m;
pub use ordered_set::OrderedSet;
pub use seasonal::{
    escalate, seasonal_adjustment, seasonal_adjustment_at, Season, SeasonalAdjustment,
    SeasonalEscalation,
};
pub use signals::{extract_signals, Signal, SignalSet, SignalTrigger};
pub use taxonomy::{HoursPredicate, RiskAction, Taxonomy, TaxonomyCategory, TaxonomyEntry};

pub use obs::{
    emit_consistency_validated, emit_fraud_override, emit_life_safety_override,
    emit_report_rejected, emit_seasonal_escalation, emit_triage_evaluated, ReportSpan,
};
pub use telemetry::init_tracing;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
