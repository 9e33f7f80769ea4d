//! Deterministic fast-path request/response shapes
//!
//! The fast path screens the catalog, scores each surviving crop with
//! closed-form submodels and returns immediately, with no
//! reasoning-provider involvement.

use serde::{Deserialize, Serialize};

fn default_land_unit() -> String {
    "acres".to_string()
}

fn default_target_market() -> Option<String> {
    Some("Local".to_string())
}

/// Farm description for the deterministic analyzer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmInput {
    pub latitude: f64,
    pub longitude: f64,
    /// In the declared `land_unit`
    pub land_area: f64,
    #[serde(default = "default_land_unit")]
    pub land_unit: String,
    #[serde(default)]
    pub soil_type: Option<String>,
    /// "Rainfed" | "Canal" | "Borewell" | "Drip Irrigation"
    pub water_source: String,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub previous_crop: Option<String>,
    #[serde(default = "default_target_market")]
    pub target_market: Option<String>,
}

/// One closed-form submodel's verdict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubModelReport {
    pub id: String,
    pub name: String,
    /// 0–100
    pub score: f64,
    /// 0–100
    pub confidence: f64,
    pub summary: String,
    pub reasoning_steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_factors: Option<Vec<String>>,
    /// Traffic-light status: "Green" | "Yellow" | "Red"
    pub status: String,
}

/// Headline verdict of the fast path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalDecision {
    pub crop: String,
    pub score: f64,
    pub profit_per_acre: f64,
    pub risk_level: String,
    pub confidence: f64,
    /// "Best Bet" | "Safe Option" | "High Risk / High Reward" | "Alternative"
    pub recommendation_type: String,
}

/// Complete fast-path response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeterministicResponse {
    pub final_decision: FinalDecision,
    pub alternatives: Vec<FinalDecision>,
    pub models: Vec<SubModelReport>,
    pub environmental_context: super::context::EnvironmentContext,
}
