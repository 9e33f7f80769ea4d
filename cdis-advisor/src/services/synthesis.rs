//! Final synthesis pass (stage 9)
//!
//! Blends the eight specialist outputs into one decision. The blend weights
//! and risk adjustment are spelled out in the instructions so the provider
//! computes them identically run to run; the reply is parsed strictly
//! around `best_crop_id` and tolerantly everywhere else.

use crate::models::analysis::{SpecialistResult, SynthesisResult};
use crate::models::context::AnalysisContext;
use crate::services::reasoning_client::ReasoningProvider;
use crate::services::reply_parser::parse_synthesis_reply;
use crate::services::specialists::SPECIALISTS;
use cdis_common::{Error, Result};
use serde_json::json;
use tracing::info;

/// Synthesis gets a larger output budget than the specialists
pub const SYNTHESIS_MAX_TOKENS: u32 = 800;

pub const SYNTHESIS_INSTRUCTIONS: &str = r#"You are the Final Agricultural Decision Synthesis Engine.

You are the master reasoning engine of a multi-model agricultural system.
You receive structured outputs from 8 specialist analytical models that have evaluated the selected crops.

Your responsibilities:
1. Integrate all model scores for each crop into a unified overall_score
2. Normalize cross-model inconsistencies
3. Apply risk penalties: a high risk_index from the risk model must reduce overall_score significantly
4. Evaluate long-term sustainability
5. Identify the BEST crop (highest overall_score after risk adjustment)
6. Identify 2 ALTERNATIVE crops (next best options)
7. Recommend cropping_system
8. Compute confidence_score

Scoring formula (use this exactly):
- base_score = (rainfall_score×0.12 + soil_moisture_score×0.10 + water_balance_score×0.10 +
               climate_score×0.15 + economic_score×0.18 + demand_score×0.12 +
               market_access_score×0.08) / 0.85
- risk_penalty = risk_index × 0.25  (subtract from base_score)
- overall_score = max(0, min(100, round(base_score - risk_penalty)))

risk_level:
- "Low" if risk_index < 35
- "Moderate" if risk_index < 65
- "High" otherwise

economic_outlook:
- "Strong" if economic_score >= 70 AND roi_probability >= 65
- "Moderate" if economic_score >= 50
- "Weak" otherwise

Rules:
- Return ONLY valid JSON. No prose.
- reasoning_summary must be a single concise string.
- cropping_system must be exactly: "Standalone", "Intercrop", or "Sequential"
- decision_matrix keys must be crop_ids (strings).

Output schema (strict):
{
  "best_crop_id": <int>,
  "alternative_crop_ids": [<int>, <int>],
  "confidence_score": <int 0-100>,
  "cropping_system": "Standalone|Intercrop|Sequential",
  "decision_matrix": {
    "crop_id": {
      "crop_id": <int>,
      "overall_score": <int 0-100>,
      "risk_adjusted_score": <int 0-100>,
      "risk_level": "Low|Moderate|High",
      "economic_outlook": "Strong|Moderate|Weak",
      "climate_resilience": <int 0-100>
    }
  },
  "reasoning_summary": "<concise explanation>"
}"#;

/// Run the synthesis pass over the eight specialist results
///
/// `specialist_results` must be in stage order (model 1 first).
pub async fn run_synthesis(
    provider: &dyn ReasoningProvider,
    context: &AnalysisContext,
    specialist_results: &[SpecialistResult],
    model: &str,
) -> Result<SynthesisResult> {
    if specialist_results.len() != SPECIALISTS.len() {
        return Err(Error::Internal(format!(
            "synthesis needs {} specialist results, got {}",
            SPECIALISTS.len(),
            specialist_results.len()
        )));
    }

    let mut model_outputs = serde_json::Map::new();
    for (spec, result) in SPECIALISTS.iter().zip(specialist_results) {
        model_outputs.insert(
            spec.output_key.to_string(),
            serde_json::to_value(result)
                .map_err(|e| Error::Internal(format!("result serialization: {e}")))?,
        );
    }

    let payload = json!({
        "analysis_context": context,
        "model_outputs": model_outputs,
    });

    info!(crops = context.selected_crops.len(), "running synthesis pass");
    let raw = provider
        .call(SYNTHESIS_INSTRUCTIONS, &payload, model, SYNTHESIS_MAX_TOKENS)
        .await?;
    parse_synthesis_reply(&raw)
}
