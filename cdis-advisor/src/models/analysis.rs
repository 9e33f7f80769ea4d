//! Nine-stage pipeline request/response shapes

use super::context::AnalysisContext;
use super::prescreen::Location;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Request for the full nine-stage pipeline (synchronous or job-based)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullAnalysisRequest {
    pub location: Location,
    pub land_area: f64,
    pub water_availability: cdis_common::types::WaterAvailability,
    pub budget_per_acre: f64,
    pub selected_crop_ids: Vec<u32>,
    #[serde(default)]
    pub soil_type: Option<String>,
}

/// Normalized output of one specialist pass
///
/// Crop-score keys are always the string form of the crop id, regardless of
/// how the provider encoded them. Confidence is clamped to [0,100].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialistResult {
    pub model_name: String,
    /// crop id (string) → 0–100 score
    pub crop_scores: BTreeMap<String, i64>,
    /// crop id (string) → free-form risk detail
    pub risk_factors: BTreeMap<String, serde_json::Value>,
    pub key_findings: Vec<String>,
    pub confidence: i64,
}

/// One row of the synthesis decision matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionMatrixEntry {
    #[serde(default)]
    pub crop_id: u32,
    #[serde(default)]
    pub overall_score: i64,
    #[serde(default)]
    pub risk_adjusted_score: i64,
    #[serde(default)]
    pub risk_level: String,
    #[serde(default)]
    pub economic_outlook: String,
    #[serde(default)]
    pub climate_resilience: i64,
}

/// Output of the final synthesis pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisResult {
    pub best_crop_id: u32,
    pub alternative_crop_ids: Vec<u32>,
    pub confidence_score: i64,
    /// Exactly one of "Standalone" | "Intercrop" | "Sequential"
    pub cropping_system: String,
    /// crop id (string) → matrix row
    pub decision_matrix: BTreeMap<String, DecisionMatrixEntry>,
    pub reasoning_summary: String,
}

/// Response of the synchronous full-analysis endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullAnalysisResponse {
    pub final_decision: SynthesisResult,
    /// Raw per-stage outputs, keyed by stage output key (e.g. "model_1_rainfall")
    pub model_outputs: BTreeMap<String, SpecialistResult>,
    pub analysis_context: AnalysisContext,
}
