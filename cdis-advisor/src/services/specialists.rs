//! The eight specialist passes of the progressive pipeline
//!
//! Each pass is the same mechanical shape: serialize the shared analysis
//! context, call the reasoning provider with a domain-specific instruction
//! block, and normalize the reply. Only the instructions and labels differ,
//! so the passes live in one static table.

use crate::models::analysis::SpecialistResult;
use crate::models::context::AnalysisContext;
use crate::services::reasoning_client::ReasoningProvider;
use crate::services::reply_parser::normalize_specialist_reply;
use cdis_common::Result;
use tracing::info;

/// Output-token ceiling for a specialist pass
pub const SPECIALIST_MAX_TOKENS: u32 = 500;

/// One specialist pass definition
pub struct SpecialistSpec {
    /// 1-based stage index
    pub index: usize,
    /// Stage slot key in job state, e.g. "model_1"
    pub key: &'static str,
    /// Key in the final model_outputs map, e.g. "model_1_rainfall"
    pub output_key: &'static str,
    /// Name the reply is expected to self-identify as
    pub model_name: &'static str,
    /// Short step label appended to completed_steps
    pub step_label: &'static str,
    pub instructions: &'static str,
}

pub const SPECIALISTS: [SpecialistSpec; 8] = [
    SpecialistSpec {
        index: 1,
        key: "model_1",
        output_key: "model_1_rainfall",
        model_name: "rainfall_feasibility",
        step_label: "Rainfall Analysis",
        instructions: r#"You are a specialized agricultural intelligence model.
Domain: Rainfall Feasibility Analysis.

Analyze:
- Seasonal rainfall adequacy vs crop requirements
- Drought probability
- Excess rainfall / flood risk
- Seasonal deviation from historical average

Return ONLY valid JSON (no markdown, no explanation):
{
  "model_name": "rainfall_feasibility",
  "crop_scores": {"<crop_id>": <0-100>},
  "risk_factors": {
    "<crop_id>": {
      "drought_risk": "Low|Moderate|High",
      "excess_rainfall_risk": "Low|Moderate|High",
      "rainfall_adequacy": "Deficit|Adequate|Excess"
    }
  },
  "key_findings": ["<string>", "<string>"],
  "confidence": <0-100>
}"#,
    },
    SpecialistSpec {
        index: 2,
        key: "model_2",
        output_key: "model_2_soil_moisture",
        model_name: "soil_moisture",
        step_label: "Soil Moisture Check",
        instructions: r#"You are a specialized agricultural intelligence model.
Domain: Soil Moisture & Root Zone Analysis.

Analyze:
- Current soil moisture index vs crop requirements
- Root zone water availability
- Soil type compatibility with each crop

Return ONLY valid JSON (no markdown, no explanation):
{
  "model_name": "soil_moisture",
  "crop_scores": {"<crop_id>": <0-100>},
  "risk_factors": {
    "<crop_id>": {
      "moisture_status": "Deficit|Adequate|Excess",
      "root_zone_health": "Poor|Fair|Good|Excellent",
      "soil_compatibility": "Poor|Moderate|Good"
    }
  },
  "key_findings": ["<string>", "<string>"],
  "confidence": <0-100>
}"#,
    },
    SpecialistSpec {
        index: 3,
        key: "model_3",
        output_key: "model_3_water_balance",
        model_name: "water_balance",
        step_label: "Water Balance",
        instructions: r#"You are a specialized agricultural intelligence model.
Domain: Water Balance Analysis.

Analyze:
- Rainfall + irrigation vs total crop water demand (mm)
- Deficit or surplus in mm
- Irrigation feasibility given user's water_availability

Return ONLY valid JSON (no markdown, no explanation):
{
  "model_name": "water_balance",
  "crop_scores": {"<crop_id>": <0-100>},
  "risk_factors": {
    "<crop_id>": {
      "deficit_mm": <number>,
      "surplus_mm": <number>,
      "status": "Deficit|Balanced|Surplus"
    }
  },
  "key_findings": ["<string>", "<string>"],
  "confidence": <0-100>
}"#,
    },
    SpecialistSpec {
        index: 4,
        key: "model_4",
        output_key: "model_4_climate",
        model_name: "climate_thermal",
        step_label: "Climate Fit",
        instructions: r#"You are a specialized agricultural intelligence model.
Domain: Climate & Thermal Analysis.

Analyze:
- Growing Degree Days (GDD) vs crop requirement
- Heat stress days and cold stress days
- Temperature suitability for each crop's growth stages

Return ONLY valid JSON (no markdown, no explanation):
{
  "model_name": "climate_thermal",
  "crop_scores": {"<crop_id>": <0-100>},
  "risk_factors": {
    "<crop_id>": {
      "gdd_adequacy": "Insufficient|Adequate|Excess",
      "heat_stress_risk": "Low|Moderate|High",
      "cold_stress_risk": "Low|Moderate|High"
    }
  },
  "key_findings": ["<string>", "<string>"],
  "confidence": <0-100>
}"#,
    },
    SpecialistSpec {
        index: 5,
        key: "model_5",
        output_key: "model_5_economic",
        model_name: "economic_viability",
        step_label: "Economic Viability",
        instructions: r#"You are a specialized agricultural intelligence model.
Domain: Economic Viability Analysis.

Analyze:
- ROI probability given input_cost_per_acre, yield, and market_price
- Budget sufficiency (user budget vs crop input cost)
- Break-even likelihood

Return ONLY valid JSON (no markdown, no explanation):
{
  "model_name": "economic_viability",
  "crop_scores": {"<crop_id>": <0-100>},
  "risk_factors": {
    "<crop_id>": {
      "roi_probability": <0-100>,
      "capital_adequacy": "Sufficient|Tight|Insufficient",
      "breakeven_likelihood": "High|Medium|Low"
    }
  },
  "key_findings": ["<string>", "<string>"],
  "confidence": <0-100>
}"#,
    },
    SpecialistSpec {
        index: 6,
        key: "model_6",
        output_key: "model_6_risk",
        model_name: "risk_assessment",
        step_label: "Risk Assessment",
        instructions: r#"You are a specialized agricultural intelligence model.
Domain: Risk Assessment.

Analyze:
- Weather risk (drought, flood, heat)
- Pest and disease exposure
- Market price volatility

Higher crop_score = LOWER risk (safer crop).

Return ONLY valid JSON (no markdown, no explanation):
{
  "model_name": "risk_assessment",
  "crop_scores": {"<crop_id>": <0-100>},
  "risk_factors": {
    "<crop_id>": {
      "risk_index": <0-100>,
      "weather_risk": "Low|Moderate|High",
      "pest_risk": "Low|Moderate|High",
      "market_volatility": "Low|Moderate|High"
    }
  },
  "key_findings": ["<string>", "<string>"],
  "confidence": <0-100>
}"#,
    },
    SpecialistSpec {
        index: 7,
        key: "model_7",
        output_key: "model_7_market_access",
        model_name: "market_access",
        step_label: "Market Access",
        instructions: r#"You are a specialized agricultural intelligence model.
Domain: Market Access Analysis.

Analyze:
- Distance to nearest markets for each crop type
- Infrastructure and logistics quality
- Cold chain requirements vs availability

Return ONLY valid JSON (no markdown, no explanation):
{
  "model_name": "market_access",
  "crop_scores": {"<crop_id>": <0-100>},
  "risk_factors": {
    "<crop_id>": {
      "logistics_rating": "Poor|Fair|Good|Excellent",
      "market_proximity": "Near|Moderate|Far",
      "infrastructure_quality": "Poor|Fair|Good"
    }
  },
  "key_findings": ["<string>", "<string>"],
  "confidence": <0-100>
}"#,
    },
    SpecialistSpec {
        index: 8,
        key: "model_8",
        output_key: "model_8_demand",
        model_name: "demand_analysis",
        step_label: "Demand Trends",
        instructions: r#"You are a specialized agricultural intelligence model.
Domain: Demand Analysis.

Analyze:
- Current market demand cycle for each crop
- Oversupply risk in the upcoming season
- Price outlook (bullish/bearish/neutral)

Return ONLY valid JSON (no markdown, no explanation):
{
  "model_name": "demand_analysis",
  "crop_scores": {"<crop_id>": <0-100>},
  "risk_factors": {
    "<crop_id>": {
      "oversupply_risk": "Low|Moderate|High",
      "price_outlook": "Bearish|Neutral|Bullish",
      "demand_cycle": "Off-Peak|Normal|Peak"
    }
  },
  "key_findings": ["<string>", "<string>"],
  "confidence": <0-100>
}"#,
    },
];

/// Run one specialist pass and normalize its reply
pub async fn run_specialist(
    provider: &dyn ReasoningProvider,
    spec: &SpecialistSpec,
    context: &AnalysisContext,
    model: &str,
) -> Result<SpecialistResult> {
    let payload = serde_json::to_value(context)
        .map_err(|e| cdis_common::Error::Internal(format!("context serialization: {e}")))?;
    info!(
        stage = spec.index,
        model_name = spec.model_name,
        crops = context.selected_crops.len(),
        "running specialist pass"
    );
    let raw = provider
        .call(spec.instructions, &payload, model, SPECIALIST_MAX_TOKENS)
        .await?;
    normalize_specialist_reply(&raw, spec.model_name)
}
