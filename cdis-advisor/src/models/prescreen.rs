//! Pre-screen request/response shapes

use cdis_common::types::WaterAvailability;
use serde::{Deserialize, Serialize};

/// Geographic point
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    /// Reject coordinates outside the WGS84 envelope
    pub fn validate(&self) -> Result<(), String> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(format!("latitude out of range: {}", self.lat));
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(format!("longitude out of range: {}", self.lon));
        }
        Ok(())
    }
}

/// Pre-screen request: user constraints plus location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescreenRequest {
    pub location: Location,
    pub land_area: f64,
    pub water_availability: WaterAvailability,
    pub budget_per_acre: f64,
    #[serde(default)]
    pub soil_type: Option<String>,
}

/// Named sub-scores of the 100-point model (risk penalty is subtracted)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub temperature: i64,
    pub water: i64,
    pub gdd: i64,
    pub market: i64,
    pub roi: i64,
    pub season: i64,
    pub soil: i64,
    pub risk_penalty: i64,
}

/// One scored crop in the pre-screen output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropCandidate {
    pub id: String,
    pub name: String,
    pub score: i64,
    pub season: Vec<String>,
    pub market_potential: String,
    /// Display bundle, e.g. "₹12,000–₹18,000"
    pub input_cost_range: String,
    /// Display bundle, e.g. "110 days"
    pub duration_days: String,
    pub market_price_per_quintal: f64,
    pub yield_quintal_per_acre: f64,
    pub input_cost_per_acre: f64,
    pub is_perishable: bool,
    pub score_breakdown: ScoreBreakdown,
}

/// Environmental inputs echoed back with the ranking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentalSummary {
    pub avg_temp: f64,
    pub rainfall_mm: f64,
    pub soil_moisture_index: f64,
    pub heat_stress_days: u32,
    pub gdd: f64,
    pub rainfall_variability_cv: f64,
    pub dry_spell_days: u32,
}

/// Full ranked pre-screen output
///
/// All crops surviving the hard filter are returned; "top N" is a
/// presentation-layer slice, not a property of the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescreenResponse {
    pub candidates: Vec<CropCandidate>,
    pub recommended_top_ids: Vec<String>,
    pub current_season: String,
    pub environmental_summary: EnvironmentalSummary,
}
