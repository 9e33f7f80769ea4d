//! Closed-form submodels for the deterministic fast path
//!
//! Six rule-based evaluations of one crop against one farm. No network,
//! no randomness: the same farm, environment and crop always produce the
//! same reports.

use crate::models::deterministic::{FarmInput, SubModelReport};
use cdis_common::types::{CropCatalogEntry, EnvironmentalContext, Season};
use chrono::{Datelike, Utc};

const ACRES_PER_HECTARE: f64 = 2.47105;
/// Latitude of the Tropic of Cancer
const TROPIC_LAT: f64 = 23.5;

/// Farm input normalized for scoring
#[derive(Debug, Clone)]
pub struct ProcessedFarmInput {
    pub input: FarmInput,
    /// Always in acres
    pub normalized_land_area: f64,
    pub season: Season,
    /// Water-source efficiency multiplier applied to rainfall
    pub water_multiplier: f64,
    pub region_zone: &'static str,
}

impl ProcessedFarmInput {
    pub fn new(input: FarmInput) -> Self {
        Self::with_season(input, Season::for_month(Utc::now().month()))
    }

    pub fn with_season(input: FarmInput, season: Season) -> Self {
        let normalized_land_area = match input.land_unit.to_lowercase().as_str() {
            "hectare" | "hectares" => input.land_area * ACRES_PER_HECTARE,
            _ => input.land_area,
        };
        let water_multiplier = match input.water_source.as_str() {
            "Canal" => 1.2,
            "Borewell" => 1.4,
            "Drip Irrigation" => 1.5,
            _ => 1.0, // Rainfed and anything unrecognized
        };
        let region_zone = if input.latitude < TROPIC_LAT { "Tropical" } else { "Sub-Tropical" };
        Self { input, normalized_land_area, season, water_multiplier, region_zone }
    }
}

fn traffic_light(score: f64, green_above: f64, yellow_above: f64) -> String {
    if score > green_above {
        "Green".to_string()
    } else if score > yellow_above {
        "Yellow".to_string()
    } else {
        "Red".to_string()
    }
}

fn land_feasibility(ctx: &ProcessedFarmInput) -> SubModelReport {
    // No slope/drainage data in the input; a neutral pass is more honest
    // than an invented high score.
    SubModelReport {
        id: "land_feasibility".to_string(),
        name: "Land Feasibility".to_string(),
        score: 70.0,
        confidence: 50.0,
        summary: "Land data limited. Assuming standard feasibility.".to_string(),
        reasoning_steps: vec![
            format!("Region zone: {}", ctx.region_zone),
            "Slope and drainage data not provided in input.".to_string(),
        ],
        risk_factors: None,
        status: "Yellow".to_string(),
    }
}

fn soil_analysis(ctx: &ProcessedFarmInput, crop: &CropCatalogEntry) -> SubModelReport {
    let crop_soils = crop.soil_affinity_text();
    let (score, match_quality) = match &ctx.input.soil_type {
        Some(user_soil) if !user_soil.trim().is_empty() => {
            if crop_soils.to_lowercase().contains(&user_soil.trim().to_lowercase()) {
                (95.0, "Excellent")
            } else {
                (40.0, "Sub-optimal")
            }
        }
        _ => (60.0, "Unknown"),
    };
    SubModelReport {
        id: "soil_analysis".to_string(),
        name: "Soil Analysis".to_string(),
        score,
        confidence: 85.0,
        summary: format!(
            "Soil type '{}' match is {match_quality}.",
            ctx.input.soil_type.as_deref().unwrap_or("unspecified")
        ),
        reasoning_steps: vec![
            format!("User soil: {}", ctx.input.soil_type.as_deref().unwrap_or("unspecified")),
            format!("Crop needs: {crop_soils}"),
        ],
        risk_factors: None,
        status: traffic_light(score, 80.0, 50.0),
    }
}

fn water_balance(
    ctx: &ProcessedFarmInput,
    env: &EnvironmentalContext,
    crop: &CropCatalogEntry,
) -> SubModelReport {
    // Effective supply: sampled rainfall boosted by the irrigation source
    let effective_supply = env.rainfall_total * ctx.water_multiplier;
    let demand = crop.water_requirement_mm.max(1.0);
    let coverage = effective_supply / demand;
    let score = (coverage * 100.0).min(100.0);

    let mut steps = vec![
        format!("Effective supply: {effective_supply:.0} mm (rainfall × {:.1})", ctx.water_multiplier),
        format!("Crop demand: {demand:.0} mm"),
    ];
    let status_word = if coverage >= 1.0 {
        steps.push("Supply covers full crop demand.".to_string());
        "Surplus"
    } else if coverage >= 0.6 {
        steps.push("Partial deficit; supplemental irrigation advised.".to_string());
        "Balanced"
    } else {
        steps.push("Severe deficit for this crop.".to_string());
        "Deficit"
    };

    SubModelReport {
        id: "water_balance".to_string(),
        name: "Water Balance".to_string(),
        score,
        confidence: 80.0,
        summary: format!("Water balance is {status_word} ({:.0}% of demand).", coverage * 100.0),
        reasoning_steps: steps,
        risk_factors: None,
        status: traffic_light(score, 75.0, 45.0),
    }
}

fn climate_analysis(env: &EnvironmentalContext, crop: &CropCatalogEntry) -> SubModelReport {
    let mut score: f64 = 0.0;
    let mut checks = Vec::new();

    if (crop.temp.min_c..=crop.temp.max_c).contains(&env.avg_temp) {
        score += 40.0;
        checks.push("Average temperature within crop range.".to_string());
    } else {
        checks.push(format!(
            "Average temperature {:.1} outside {:.0}–{:.0}",
            env.avg_temp, crop.temp.min_c, crop.temp.max_c
        ));
    }

    if env.rainfall_total >= crop.rainfall_mm.min {
        score += 30.0;
        checks.push("Rainfall sufficient.".to_string());
    } else {
        score += 10.0;
        checks.push("Rainfall deficit.".to_string());
    }

    if env.gdd > 1000.0 {
        score += 20.0;
        checks.push("Good GDD accumulation.".to_string());
    }

    if env.heat_stress_days > 5 && crop.temp.max_c < 35.0 {
        score -= 10.0;
        checks.push("Heat stress warning.".to_string());
    }

    let score = (score + 10.0).clamp(0.0, 100.0);
    SubModelReport {
        id: "climate_analysis".to_string(),
        name: "Climate Analysis".to_string(),
        score,
        confidence: 90.0,
        summary: "Climate suitability evaluated from observed data.".to_string(),
        reasoning_steps: checks,
        risk_factors: None,
        status: traffic_light(score, 75.0, 0.0),
    }
}

fn economic_viability(ctx: &ProcessedFarmInput, crop: &CropCatalogEntry) -> SubModelReport {
    let cost = crop.typical_input_cost().max(1.0);
    let revenue = crop.typical_yield() * crop.market_price_per_quintal;
    let roi_ratio = (revenue - cost) / cost;
    // 0–200% ROI maps to 0–90; a headroom band above that
    let mut score = (roi_ratio / 2.0 * 90.0).clamp(0.0, 95.0);

    let mut steps = vec![
        format!("Revenue per acre: ₹{revenue:.0}"),
        format!("Input cost per acre: ₹{cost:.0}"),
        format!("ROI: {:.0}%", roi_ratio * 100.0),
    ];
    if let Some(budget) = ctx.input.budget {
        if budget > 0.0 && budget < cost {
            score = (score - 20.0).max(0.0);
            steps.push(format!("Budget ₹{budget:.0} below input cost; capital gap."));
        } else {
            steps.push("Budget covers input cost.".to_string());
        }
    }

    SubModelReport {
        id: "economic_viability".to_string(),
        name: "Economic Viability".to_string(),
        score,
        confidence: 75.0,
        summary: format!("Projected ROI {:.0}% on typical yield and price.", roi_ratio * 100.0),
        reasoning_steps: steps,
        risk_factors: None,
        status: traffic_light(score, 70.0, 40.0),
    }
}

fn risk_assessment(env: &EnvironmentalContext, crop: &CropCatalogEntry) -> SubModelReport {
    let mut score: f64 = 90.0;
    let mut factors = Vec::new();

    match crop.risk_factor {
        cdis_common::types::Tier::High => {
            score -= 30.0;
            factors.push("High intrinsic crop risk.".to_string());
        }
        cdis_common::types::Tier::Medium => {
            score -= 15.0;
            factors.push("Medium intrinsic crop risk.".to_string());
        }
        cdis_common::types::Tier::Low => {}
    }
    if env.dry_spell_days > 10 {
        score -= 10.0;
        factors.push("High dry spell risk.".to_string());
    }
    if env.rainfall_variability > 50.0 {
        score -= 10.0;
        factors.push("High rainfall variability.".to_string());
    }
    let score = score.max(0.0);

    SubModelReport {
        id: "risk_assessment".to_string(),
        name: "Risk Assessment".to_string(),
        score,
        confidence: 80.0,
        summary: format!("Overall safety score {score:.0}/100."),
        reasoning_steps: if factors.is_empty() {
            vec!["Low risk conditions.".to_string()]
        } else {
            factors.clone()
        },
        risk_factors: Some(factors),
        status: traffic_light(score, 70.0, 40.0),
    }
}

/// Run all six submodels for one crop
pub fn run_all_submodels(
    ctx: &ProcessedFarmInput,
    env: &EnvironmentalContext,
    crop: &CropCatalogEntry,
) -> Vec<SubModelReport> {
    vec![
        land_feasibility(ctx),
        soil_analysis(ctx, crop),
        water_balance(ctx, env, crop),
        climate_analysis(env, crop),
        economic_viability(ctx, crop),
        risk_assessment(env, crop),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdis_common::types::{SoilType, TempRange, Tier, ValueRange};

    fn farm(soil: Option<&str>, water: &str, unit: &str) -> FarmInput {
        FarmInput {
            latitude: 19.0,
            longitude: 75.0,
            land_area: 2.0,
            land_unit: unit.to_string(),
            soil_type: soil.map(str::to_string),
            water_source: water.to_string(),
            budget: Some(30000.0),
            previous_crop: None,
            target_market: Some("Local".to_string()),
        }
    }

    fn env() -> EnvironmentalContext {
        EnvironmentalContext {
            avg_temp: 27.0,
            min_temp: 20.0,
            max_temp: 34.0,
            rainfall_total: 420.0,
            rainfall_variability: 25.0,
            soil_moisture_index: 0.55,
            avg_humidity: Some(60.0),
            gdd: 2900.0,
            heat_stress_days: 0,
            cold_stress_days: 0,
            dry_spell_days: 5,
        }
    }

    fn crop() -> CropCatalogEntry {
        CropCatalogEntry {
            id: 1,
            name: "Soybean".to_string(),
            seasons: vec![Season::Kharif],
            temp: TempRange { min_c: 15.0, max_c: 35.0, optimal_c: 28.0 },
            rainfall_mm: ValueRange::new(450.0, 700.0),
            water_requirement_mm: 575.0,
            soil_affinity: vec![SoilType::Black, SoilType::Loamy],
            duration_days: 100,
            input_cost_per_acre: ValueRange::new(12000.0, 18000.0),
            market_price_per_quintal: 4600.0,
            yield_quintal_per_acre: ValueRange::new(8.0, 12.0),
            market_potential: Tier::High,
            risk_factor: Tier::Medium,
            perishability: Tier::Low,
        }
    }

    #[test]
    fn input_normalization() {
        let p = ProcessedFarmInput::with_season(farm(None, "Borewell", "hectares"), Season::Kharif);
        assert!((p.normalized_land_area - 4.9421).abs() < 1e-3);
        assert_eq!(p.water_multiplier, 1.4);
        assert_eq!(p.region_zone, "Tropical");

        let p = ProcessedFarmInput::with_season(farm(None, "Rainfed", "acres"), Season::Kharif);
        assert_eq!(p.normalized_land_area, 2.0);
        assert_eq!(p.water_multiplier, 1.0);
    }

    #[test]
    fn soil_match_tiers() {
        let c = crop();
        let matched = ProcessedFarmInput::with_season(farm(Some("black"), "Rainfed", "acres"), Season::Kharif);
        assert_eq!(soil_analysis(&matched, &c).score, 95.0);

        let mismatched = ProcessedFarmInput::with_season(farm(Some("Sandy"), "Rainfed", "acres"), Season::Kharif);
        assert_eq!(soil_analysis(&mismatched, &c).score, 40.0);

        let unknown = ProcessedFarmInput::with_season(farm(None, "Rainfed", "acres"), Season::Kharif);
        assert_eq!(soil_analysis(&unknown, &c).score, 60.0);
    }

    #[test]
    fn water_multiplier_lifts_coverage() {
        let c = crop();
        let e = env();
        let rainfed = ProcessedFarmInput::with_season(farm(None, "Rainfed", "acres"), Season::Kharif);
        let drip = ProcessedFarmInput::with_season(farm(None, "Drip Irrigation", "acres"), Season::Kharif);
        assert!(water_balance(&drip, &e, &c).score > water_balance(&rainfed, &e, &c).score);
    }

    #[test]
    fn risk_penalties_stack() {
        let mut e = env();
        e.dry_spell_days = 15;
        e.rainfall_variability = 60.0;
        let report = risk_assessment(&e, &crop());
        // 90 - 15 (medium intrinsic) - 10 - 10
        assert_eq!(report.score, 55.0);
        assert_eq!(report.status, "Yellow");
    }

    #[test]
    fn all_submodels_report_in_range() {
        let ctx = ProcessedFarmInput::with_season(farm(Some("Black"), "Canal", "acres"), Season::Kharif);
        for report in run_all_submodels(&ctx, &env(), &crop()) {
            assert!((0.0..=100.0).contains(&report.score), "{}", report.name);
            assert!(["Green", "Yellow", "Red"].contains(&report.status.as_str()));
            assert!(!report.reasoning_steps.is_empty());
        }
    }
}
