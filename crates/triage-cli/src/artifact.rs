//! Digest-verified assessment artifacts.
//!
//! Layout: `<dir>/<report_id>/assessment.json` next to
//! `<dir>/<report_id>/assessment.digest`, the SHA-256 hex of the JSON bytes.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use triage_core::{Assessment, TriageError};

pub const ASSESSMENT_FILE: &str = "assessment.json";
pub const DIGEST_FILE: &str = "assessment.digest";

/// SHA-256 hex of raw artifact bytes.
pub fn bytes_digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

fn report_dir(report_id: &str, dir: &Path) -> Result<PathBuf> {
    let unsafe_id = report_id.is_empty()
        || report_id == "."
        || report_id == ".."
        || report_id.contains(['/', '\\']);
    if unsafe_id {
        anyhow::bail!("Report id {:?} cannot be used as an artifact directory", report_id);
    }
    Ok(dir.join(report_id))
}

/// Persist an assessment under its report id. Returns the JSON path.
pub fn write_assessment_artifact(assessment: &Assessment, dir: &Path) -> Result<PathBuf> {
    let report_id = assessment.report_id.as_deref().unwrap_or("unidentified");
    write_assessment_artifact_as(assessment, report_id, dir)
}

/// Persist an assessment and its digest under an explicit key. Returns the
/// JSON path.
pub fn write_assessment_artifact_as(
    assessment: &Assessment,
    key: &str,
    dir: &Path,
) -> Result<PathBuf> {
    let report_dir = report_dir(key, dir)?;
    std::fs::create_dir_all(&report_dir)
        .with_context(|| format!("Failed to create artifact directory {:?}", report_dir))?;

    let path = report_dir.join(ASSESSMENT_FILE);
    let json = serde_json::to_vec_pretty(assessment)?;
    std::fs::write(&path, &json).with_context(|| format!("Failed to write {:?}", path))?;

    let digest_path = report_dir.join(DIGEST_FILE);
    std::fs::write(&digest_path, bytes_digest(&json))
        .with_context(|| format!("Failed to write {:?}", digest_path))?;

    Ok(path)
}

/// Read `<dir>/<report_id>/assessment.json` and verify it against the
/// stored digest.
pub fn read_assessment_artifact(report_id: &str, dir: &Path) -> Result<Assessment> {
    let report_dir = report_dir(report_id, dir)?;
    let path = report_dir.join(ASSESSMENT_FILE);
    let digest_path = report_dir.join(DIGEST_FILE);

    let json = std::fs::read(&path).with_context(|| format!("Failed to read {:?}", path))?;
    let expected = std::fs::read_to_string(&digest_path)
        .with_context(|| format!("Failed to read {:?}", digest_path))?
        .trim()
        .to_string();

    let actual = bytes_digest(&json);
    if expected != actual {
        return Err(TriageError::DigestMismatch { expected, actual }.into());
    }

    let assessment = serde_json::from_slice(&json)
        .with_context(|| format!("Artifact is not a valid assessment: {:?}", path))?;
    Ok(assessment)
}
