//! Civic Triage CLI
//!
//! The `triage` command scores incident reports and checks their evidence.
//! Inputs are JSON files; results are printed to stdout as JSON and logs go
//! to stderr.
//!
//! ## Commands
//!
//! - `evaluate`: Triage, evidence check and seasonal lookup for one report
//! - `validate`: Evidence consistency check only
//! - `batch`: Assess an array of reports
//! - `season`: Seasonal multiplier for a sector and date
//! - `taxonomy`: List the active rule table
//! - `replay-artifact`: Print a stored assessment after verifying its digest

mod artifact;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn, Level};

use triage_core::{
    escalate, seasonal_adjustment, Assessment, BatchItem, EngineConfig, IncidentReport,
    PriorityTier, SeasonalAdjustment, SeasonalEscalation, SensorReading, Taxonomy,
    TaxonomyCategory, TaxonomyEntry, TriageEngine,
};

#[derive(Parser)]
#[command(name = "triage")]
#[command(author = "Civic Triage Maintainers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Civic issue triage and evidence consistency engine", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Engine configuration file (JSON); defaults apply to missing fields
    #[arg(long, global = true, env = "TRIAGE_CONFIG")]
    config: Option<PathBuf>,

    /// Replacement rule table (JSON)
    #[arg(long, global = true, env = "TRIAGE_TAXONOMY")]
    taxonomy: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Triage a report, check its evidence and look up the seasonal factor
    Evaluate {
        /// Report file (JSON)
        #[arg(short, long)]
        report: PathBuf,

        /// Nearby sensor readings (JSON array)
        #[arg(short, long)]
        sensors: Option<PathBuf>,

        /// Evaluation time, RFC 3339 (default: current time)
        #[arg(long)]
        now: Option<DateTime<Utc>>,

        /// Bump the computed risk level when the seasonal multiplier warrants it
        #[arg(long)]
        apply_seasonal: bool,

        /// Write a digest-verified artifact under this directory
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Check a report's evidence only
    Validate {
        /// Report file (JSON)
        #[arg(short, long)]
        report: PathBuf,

        /// Evaluation time, RFC 3339 (default: current time)
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },

    /// Assess every entry of a batch file
    Batch {
        /// Batch file: JSON array of `{ "report": ..., "sensors": [...] }`
        #[arg(short, long)]
        reports: PathBuf,

        /// Evaluation time, RFC 3339 (default: current time)
        #[arg(long)]
        now: Option<DateTime<Utc>>,

        /// Bump computed risk levels when the seasonal multiplier warrants it
        #[arg(long)]
        apply_seasonal: bool,

        /// Write one artifact per successful assessment under this directory
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Seasonal multiplier for a sector
    Season {
        /// Sector name, e.g. "water"
        #[arg(long)]
        sector: String,

        /// Date, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Declared tier to escalate (low, medium, high, critical)
        #[arg(long)]
        severity: Option<String>,
    },

    /// List the active rule table
    Taxonomy {
        /// Only entries of this category, e.g. "event_type"
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Print a stored assessment after verifying its digest
    ReplayArtifact {
        /// Report id the artifact was stored under
        #[arg(long)]
        report_id: String,

        /// Root directory containing artifacts
        #[arg(long, default_value = ".triage/assessments")]
        artifacts_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    triage_core::init_tracing(cli.json, level);

    let config = load_config(cli.config.as_deref())?;
    let custom_taxonomy = load_taxonomy(cli.taxonomy.as_deref())?;
    let taxonomy = custom_taxonomy.as_ref().unwrap_or(Taxonomy::standard());
    let engine = TriageEngine::new(taxonomy, config).context("Invalid engine setup")?;

    match cli.command {
        Commands::Evaluate {
            report,
            sensors,
            now,
            apply_seasonal,
            out,
        } => cmd_evaluate(
            &engine,
            &report,
            sensors.as_deref(),
            now.unwrap_or_else(Utc::now),
            apply_seasonal,
            out.as_deref(),
        ),
        Commands::Validate { report, now } => {
            cmd_validate(&engine, &report, now.unwrap_or_else(Utc::now))
        }
        Commands::Batch {
            reports,
            now,
            apply_seasonal,
            out,
        } => cmd_batch(
            &engine,
            &reports,
            now.unwrap_or_else(Utc::now),
            apply_seasonal,
            out.as_deref(),
        ),
        Commands::Season {
            sector,
            date,
            severity,
        } => cmd_season(
            &sector,
            date.unwrap_or_else(|| Utc::now().date_naive()),
            severity.as_deref(),
        ),
        Commands::Taxonomy { category } => cmd_taxonomy(engine.taxonomy(), category.as_deref()),
        Commands::ReplayArtifact {
            report_id,
            artifacts_dir,
        } => cmd_replay_artifact(&report_id, &artifacts_dir),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} file: {:?}", what, path))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid {} JSON: {:?}", what, path))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    let config = EngineConfig::from_json(&text)
        .with_context(|| format!("Invalid config file: {:?}", path))?;
    info!(path = %path.display(), "loaded engine config");
    Ok(config)
}

fn load_taxonomy(path: Option<&Path>) -> Result<Option<Taxonomy>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read taxonomy file: {:?}", path))?;
    let taxonomy = Taxonomy::from_json(&text)
        .with_context(|| format!("Invalid taxonomy file: {:?}", path))?;
    info!(path = %path.display(), entries = taxonomy.entries.len(), "loaded taxonomy");
    Ok(Some(taxonomy))
}

fn finish(assessment: Assessment, apply_seasonal: bool) -> Assessment {
    if apply_seasonal {
        assessment.with_seasonal_escalation()
    } else {
        assessment
    }
}

/// Triage one report
fn cmd_evaluate(
    engine: &TriageEngine<'_>,
    report_path: &Path,
    sensors_path: Option<&Path>,
    now: DateTime<Utc>,
    apply_seasonal: bool,
    out: Option<&Path>,
) -> Result<()> {
    let report: IncidentReport = read_json(report_path, "report")?;
    let sensors: Vec<SensorReading> = match sensors_path {
        Some(path) => read_json(path, "sensors")?,
        None => Vec::new(),
    };

    let assessment = engine
        .assess(&report, &sensors, now)
        .with_context(|| format!("Failed to assess report {}", report.display_id()))?;
    let assessment = finish(assessment, apply_seasonal);

    if let Some(dir) = out {
        let path = artifact::write_assessment_artifact(&assessment, dir)?;
        info!(path = %path.display(), "wrote assessment artifact");
    }
    print_json(&assessment)
}

/// Evidence check only
fn cmd_validate(engine: &TriageEngine<'_>, report_path: &Path, now: DateTime<Utc>) -> Result<()> {
    let report: IncidentReport = read_json(report_path, "report")?;
    let verdict = engine
        .validate_evidence(&report, now)
        .with_context(|| format!("Failed to validate report {}", report.display_id()))?;
    print_json(&verdict)
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum BatchLine {
    Assessed {
        #[serde(flatten)]
        assessment: Box<Assessment>,
        /// Artifact path, when one was written.
        #[serde(rename = "artifact", skip_serializing_if = "Option::is_none")]
        artifact: Option<PathBuf>,
        #[serde(rename = "artifactError", skip_serializing_if = "Option::is_none")]
        artifact_error: Option<String>,
    },
    Failed {
        #[serde(rename = "reportId")]
        report_id: String,
        error: String,
    },
}

/// Artifact directory for batch entry `index`. Entries without a report id
/// are keyed by position so they never overwrite each other.
fn batch_artifact_key(report: &IncidentReport, index: usize) -> String {
    match report.id.as_deref() {
        Some(id) => id.to_string(),
        None => format!("unidentified-{index}"),
    }
}

/// Assess every entry. Assessment and artifact failures are recorded on
/// the entry's line and never abort the batch.
fn assess_batch_lines(
    engine: &TriageEngine<'_>,
    items: &[BatchItem],
    now: DateTime<Utc>,
    apply_seasonal: bool,
    out: Option<&Path>,
) -> Vec<BatchLine> {
    let outcomes = engine.assess_batch(items, now);
    let mut lines = Vec::with_capacity(items.len());

    for (index, (item, outcome)) in items.iter().zip(outcomes).enumerate() {
        let assessment = match outcome {
            Ok(assessment) => finish(assessment, apply_seasonal),
            Err(err) => {
                lines.push(BatchLine::Failed {
                    report_id: item.report.display_id().to_string(),
                    error: err.to_string(),
                });
                continue;
            }
        };

        let (artifact, artifact_error) = match out {
            Some(dir) => {
                let key = batch_artifact_key(&item.report, index);
                match artifact::write_assessment_artifact_as(&assessment, &key, dir) {
                    Ok(path) => (Some(path), None),
                    Err(err) => {
                        let error = format!("{err:#}");
                        warn!(report_id = %key, %error, "artifact write failed");
                        (None, Some(error))
                    }
                }
            }
            None => (None, None),
        };

        lines.push(BatchLine::Assessed {
            assessment: Box::new(assessment),
            artifact,
            artifact_error,
        });
    }

    lines
}

/// Assess a batch; failures are reported per entry
fn cmd_batch(
    engine: &TriageEngine<'_>,
    reports_path: &Path,
    now: DateTime<Utc>,
    apply_seasonal: bool,
    out: Option<&Path>,
) -> Result<()> {
    let items: Vec<BatchItem> = read_json(reports_path, "batch")?;
    let lines = assess_batch_lines(engine, &items, now, apply_seasonal, out);
    let failed = lines
        .iter()
        .filter(|line| {
            matches!(
                line,
                BatchLine::Failed { .. }
                    | BatchLine::Assessed {
                        artifact_error: Some(_),
                        ..
                    }
            )
        })
        .count();

    info!(total = items.len(), failed, "batch assessed");
    print_json(&lines)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SeasonReport {
    sector: String,
    date: NaiveDate,
    #[serde(flatten)]
    adjustment: SeasonalAdjustment,
    escalates: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    escalation: Option<SeasonalEscalation>,
}

/// Seasonal lookup, optionally escalating a declared tier
fn cmd_season(sector: &str, date: NaiveDate, severity: Option<&str>) -> Result<()> {
    let adjustment = seasonal_adjustment(Some(sector), date);
    let escalation = match severity {
        Some(raw) => {
            let tier = PriorityTier::parse(raw)
                .with_context(|| format!("Unknown severity {:?}", raw))?;
            Some(escalate(tier, &adjustment))
        }
        None => None,
    };

    print_json(&SeasonReport {
        sector: sector.to_string(),
        date,
        escalates: adjustment.warrants_escalation(),
        adjustment,
        escalation,
    })
}

/// List rules, optionally for one category
fn cmd_taxonomy(taxonomy: &Taxonomy, category: Option<&str>) -> Result<()> {
    let entries: Vec<&TaxonomyEntry> = match category {
        Some(raw) => {
            let category = TaxonomyCategory::parse(raw)
                .with_context(|| format!("Unknown taxonomy category {:?}", raw))?;
            taxonomy.category(category).collect()
        }
        None => taxonomy.entries.iter().collect(),
    };
    print_json(&entries)
}

/// Replay a stored assessment
fn cmd_replay_artifact(report_id: &str, artifacts_dir: &Path) -> Result<()> {
    let assessment = artifact::read_assessment_artifact(report_id, artifacts_dir)
        .with_context(|| format!("Failed to replay assessment for {}", report_id))?;
    print_json(&assessment)
}
