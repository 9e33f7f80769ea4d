//! Defensive normalization of reasoning-provider replies
//!
//! Provider output is untrusted: keys may be numbers instead of strings,
//! scalars may arrive as strings, whole fields may be missing. Rather than
//! failing a multi-minute pipeline on a sloppy reply, every field degrades
//! to a safe default. The one hard requirement is that the reply is a JSON
//! object at all.

use crate::models::analysis::{DecisionMatrixEntry, SpecialistResult, SynthesisResult};
use cdis_common::{Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;

const DEFAULT_CONFIDENCE: i64 = 70;

/// Coerce a JSON scalar to i64, accepting numbers and numeric strings
fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_f64().map(|f| f as i64),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f as i64),
        _ => None,
    }
}

/// Map key → i64, with every key rendered as a string; non-objects read as empty
fn coerce_score_map(value: Option<&Value>) -> BTreeMap<String, i64> {
    match value {
        Some(Value::Object(map)) => map
            .iter()
            .filter_map(|(k, v)| coerce_i64(v).map(|s| (k.clone(), s)))
            .collect(),
        _ => BTreeMap::new(),
    }
}

fn coerce_value_map(value: Option<&Value>) -> BTreeMap<String, Value> {
    match value {
        Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        _ => BTreeMap::new(),
    }
}

/// Findings: accept a list of strings or a single bare string
fn coerce_findings(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Confidence: number or numeric string under either accepted key,
/// clamped to [0,100]; anything else reads as the default
fn coerce_confidence(raw: &Value) -> i64 {
    raw.get("confidence")
        .or_else(|| raw.get("confidence_score"))
        .and_then(coerce_i64)
        .unwrap_or(DEFAULT_CONFIDENCE)
        .clamp(0, 100)
}

/// Normalize a raw specialist reply into the result schema
pub fn normalize_specialist_reply(raw: &Value, default_model_name: &str) -> Result<SpecialistResult> {
    if !raw.is_object() {
        return Err(Error::UpstreamData(format!(
            "{default_model_name} reply was not a JSON object"
        )));
    }
    Ok(SpecialistResult {
        model_name: raw
            .get("model_name")
            .and_then(Value::as_str)
            .unwrap_or(default_model_name)
            .to_string(),
        crop_scores: coerce_score_map(raw.get("crop_scores")),
        risk_factors: coerce_value_map(raw.get("risk_factors")),
        key_findings: coerce_findings(raw.get("key_findings")),
        confidence: coerce_confidence(raw),
    })
}

/// Parse a synthesis reply
///
/// Unlike the specialist path, the synthesis schema is strict about its
/// anchor: a reply missing `best_crop_id` is a failure, not a default.
/// Matrix rows that fail to parse are dropped individually.
pub fn parse_synthesis_reply(raw: &Value) -> Result<SynthesisResult> {
    let best_crop_id = raw
        .get("best_crop_id")
        .and_then(coerce_i64)
        .ok_or_else(|| Error::UpstreamData("synthesis reply missing best_crop_id".to_string()))?
        as u32;

    let alternative_crop_ids = match raw.get("alternative_crop_ids") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(coerce_i64)
            .map(|id| id as u32)
            .collect(),
        _ => Vec::new(),
    };

    let decision_matrix: BTreeMap<String, DecisionMatrixEntry> = match raw.get("decision_matrix") {
        Some(Value::Object(map)) => map
            .iter()
            .filter_map(|(k, v)| {
                serde_json::from_value::<DecisionMatrixEntry>(v.clone())
                    .ok()
                    .map(|e| (k.clone(), e))
            })
            .collect(),
        _ => BTreeMap::new(),
    };

    let cropping_system = raw
        .get("cropping_system")
        .and_then(Value::as_str)
        .unwrap_or("Standalone")
        .to_string();

    Ok(SynthesisResult {
        best_crop_id,
        alternative_crop_ids,
        confidence_score: coerce_confidence(raw),
        cropping_system,
        decision_matrix,
        reasoning_summary: raw
            .get("reasoning_summary")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}
