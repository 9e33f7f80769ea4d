//! Shared analysis context serialized into every reasoning-provider call
//!
//! Every specialist pass and the synthesis pass receive the same
//! environment + user constraints + selected crop profiles as structured
//! JSON. The shapes here are the data contract with the provider.

use cdis_common::types::{CropCatalogEntry, EnvironmentalContext, WaterAvailability};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Environmental aggregates as presented to the reasoning provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentContext {
    pub avg_temp: f64,
    pub min_temp: f64,
    pub max_temp: f64,
    pub rainfall_mm: f64,
    /// Coefficient of variation (%)
    pub rainfall_variability: f64,
    pub heat_stress_days: u32,
    pub cold_stress_days: u32,
    pub dry_spell_days: u32,
    pub soil_moisture_percent: f64,
    pub gdd: f64,
    pub humidity_percent: Option<f64>,
}

impl From<&EnvironmentalContext> for EnvironmentContext {
    fn from(env: &EnvironmentalContext) -> Self {
        Self {
            avg_temp: env.avg_temp,
            min_temp: env.min_temp,
            max_temp: env.max_temp,
            rainfall_mm: env.rainfall_total,
            rainfall_variability: env.rainfall_variability,
            heat_stress_days: env.heat_stress_days,
            cold_stress_days: env.cold_stress_days,
            dry_spell_days: env.dry_spell_days,
            soil_moisture_percent: env.soil_moisture_index,
            gdd: env.gdd,
            humidity_percent: env.avg_humidity,
        }
    }
}

/// User constraints as presented to the reasoning provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserContext {
    /// Land area in acres
    pub land_area: f64,
    pub water_availability: WaterAvailability,
    pub budget_per_acre: f64,
    pub soil_type: Option<String>,
}

/// One selected crop's profile as presented to the reasoning provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropContext {
    pub id: u32,
    pub name: String,
    pub season: String,
    pub min_temp: f64,
    pub max_temp: f64,
    pub min_rainfall: f64,
    pub max_rainfall: f64,
    pub water_requirement_mm: f64,
    pub soil_type: String,
    pub duration_days: u32,
    pub input_cost_per_acre: f64,
    pub market_price_per_quintal: f64,
    pub market_potential: String,
    pub yield_quintal_per_acre: f64,
    pub risk_factor: String,
    pub perishability: String,
}

impl From<&CropCatalogEntry> for CropContext {
    fn from(crop: &CropCatalogEntry) -> Self {
        Self {
            id: crop.id,
            name: crop.name.clone(),
            season: crop
                .seasons
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            min_temp: crop.temp.min_c,
            max_temp: crop.temp.max_c,
            min_rainfall: crop.rainfall_mm.min,
            max_rainfall: crop.rainfall_mm.max,
            water_requirement_mm: crop.water_requirement_mm,
            soil_type: crop.soil_affinity_text(),
            duration_days: crop.duration_days,
            input_cost_per_acre: crop.typical_input_cost(),
            market_price_per_quintal: crop.market_price_per_quintal,
            market_potential: crop.market_potential.to_string(),
            yield_quintal_per_acre: crop.typical_yield(),
            risk_factor: crop.risk_factor.to_string(),
            perishability: crop.perishability.to_string(),
        }
    }
}

/// Full shared context for one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisContext {
    pub environment: EnvironmentContext,
    pub user: UserContext,
    pub selected_crops: Vec<CropContext>,
}

impl AnalysisContext {
    /// Crop id (string form) → display name, for response shaping
    pub fn crop_name_map(&self) -> BTreeMap<String, String> {
        self.selected_crops
            .iter()
            .map(|c| (c.id.to_string(), c.name.clone()))
            .collect()
    }
}
