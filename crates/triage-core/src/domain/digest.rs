//! Canonical JSON normalization and digest computation.
//!
//! Triage output is a pure function of the report and the injected clock, so
//! two evaluations of the same input must hash identically. Keys are sorted
//! by UTF-16 code units, integer-valued floats collapse to integers and
//! NaN/Infinity are rejected before hashing with SHA-256.

use serde::Serialize;
use sha2::{Digest, Sha256};

use super::error::{Result, TriageError};

fn sort_keys_utf16(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut keys: Vec<_> = map.keys().collect();
            keys.sort_by(|a, b| a.encode_utf16().cmp(b.encode_utf16()));

            let mut sorted = serde_json::Map::new();
            for key in keys {
                if let Some(v) = map.get(key) {
                    sorted.insert(key.to_string(), sort_keys_utf16(v));
                }
            }
            serde_json::Value::Object(sorted)
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(sort_keys_utf16).collect())
        }
        other => other.clone(),
    }
}

fn normalize_value(value: &serde_json::Value) -> Result<serde_json::Value> {
    match value {
        serde_json::Value::Object(map) => {
            let mut normalized = serde_json::Map::new();
            for (k, v) in map {
                normalized.insert(k.clone(), normalize_value(v)?);
            }
            Ok(serde_json::Value::Object(normalized))
        }
        serde_json::Value::Array(arr) => Ok(serde_json::Value::Array(
            arr.iter().map(normalize_value).collect::<Result<Vec<_>>>()?,
        )),
        serde_json::Value::Number(n) if n.is_f64() => {
            let f = n.as_f64().ok_or(TriageError::NonFiniteNumber)?;
            if !f.is_finite() {
                return Err(TriageError::NonFiniteNumber);
            }
            if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
                Ok(serde_json::Value::Number(serde_json::Number::from(
                    f as i64,
                )))
            } else {
                Ok(serde_json::Value::Number(n.clone()))
            }
        }
        other => Ok(other.clone()),
    }
}

/// Convert a JSON value to canonical form: normalize numbers, sort keys,
/// emit compact JSON.
pub fn canonical_json(value: &serde_json::Value) -> Result<String> {
    let normalized = normalize_value(value)?;
    let sorted = sort_keys_utf16(&normalized);
    Ok(serde_json::to_string(&sorted)?)
}

/// SHA-256 hex digest of the canonical JSON form of `value`.
pub fn compute_digest(value: &serde_json::Value) -> Result<String> {
    let canonical = canonical_json(value)?;
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Serialize any value and return its canonical digest.
pub fn digest_of<T: Serialize>(value: &T) -> Result<String> {
    let json = serde_json::to_value(value)?;
    compute_digest(&json)
}
