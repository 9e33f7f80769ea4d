//! Deterministic fast-path endpoints
//!
//! POST /api/farm/analyze        — screen, score and rank without any
//!                                 reasoning-provider involvement
//! GET  /api/crops               — catalog listing
//! GET  /api/environmental-data  — raw environmental aggregates

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::models::context::EnvironmentContext;
use crate::models::deterministic::{DeterministicResponse, FarmInput, SubModelReport};
use crate::models::prescreen::{Location, PrescreenRequest};
use crate::services::decision;
use crate::services::prescreen::PrescreenEngine;
use crate::services::submodels::{run_all_submodels, ProcessedFarmInput};
use crate::AppState;
use cdis_common::types::{CropCatalogEntry, WaterAvailability};

/// Map the farm form's free-text water source onto the screening level
fn water_availability(source: &str) -> WaterAvailability {
    match source {
        "Rainfed" => WaterAvailability::Rainfed,
        "Canal" | "Borewell" | "Drip Irrigation" => WaterAvailability::Adequate,
        "Sprinkler" => WaterAvailability::Limited,
        _ => WaterAvailability::Limited,
    }
}

/// POST /api/farm/analyze
///
/// Screens the catalog for the current season, scores every survivor with
/// the closed-form submodels and returns a ranked recommendation.
pub async fn analyze_farm(
    State(state): State<AppState>,
    Json(input): Json<FarmInput>,
) -> ApiResult<Json<DeterministicResponse>> {
    let location = Location { lat: input.latitude, lon: input.longitude };
    location.validate().map_err(ApiError::BadRequest)?;

    let env = state
        .environment
        .fetch_environment(location.lat, location.lon)
        .await?;

    let processed = ProcessedFarmInput::new(input);
    let request = PrescreenRequest {
        location,
        land_area: processed.normalized_land_area,
        water_availability: water_availability(&processed.input.water_source),
        budget_per_acre: processed.input.budget.unwrap_or(0.0),
        soil_type: processed.input.soil_type.clone(),
    };

    let screened = PrescreenEngine::new(&env, &request).run(state.catalog.all());
    if screened.candidates.is_empty() {
        return Err(ApiError::NotFound(
            "No viable crops for this location and season".to_string(),
        ));
    }

    let mut scored: Vec<(&CropCatalogEntry, Vec<SubModelReport>)> = Vec::new();
    for candidate in &screened.candidates {
        let id: u32 = candidate
            .id
            .parse()
            .map_err(|_| ApiError::Internal(format!("bad catalog id: {}", candidate.id)))?;
        let crop = state
            .catalog
            .get(id)
            .ok_or_else(|| ApiError::Internal(format!("catalog id vanished: {id}")))?;
        scored.push((crop, run_all_submodels(&processed, &env, crop)));
    }

    let (final_decision, alternatives) = decision::synthesize(&scored).ok_or_else(|| {
        ApiError::NotFound("No viable crops for this location and season".to_string())
    })?;

    let models = scored
        .iter()
        .find(|(crop, _)| crop.name == final_decision.crop)
        .map(|(_, reports)| reports.clone())
        .unwrap_or_default();

    info!(
        best = %final_decision.crop,
        candidates = scored.len(),
        "farm analysis complete"
    );

    Ok(Json(DeterministicResponse {
        final_decision,
        alternatives,
        models,
        environmental_context: (&env).into(),
    }))
}

/// One catalog row in the GET /api/crops listing
#[derive(Debug, Serialize)]
pub struct CropSummary {
    pub id: u32,
    pub name: String,
    pub seasons: Vec<String>,
    pub duration_days: u32,
    pub market_potential: String,
}

/// GET /api/crops
pub async fn list_crops(State(state): State<AppState>) -> Json<Vec<CropSummary>> {
    let crops = state
        .catalog
        .all()
        .iter()
        .map(|c| CropSummary {
            id: c.id,
            name: c.name.clone(),
            seasons: c.seasons.iter().map(|s| s.as_str().to_string()).collect(),
            duration_days: c.duration_days,
            market_potential: c.market_potential.to_string(),
        })
        .collect();
    Json(crops)
}

/// GET /api/environmental-data query
#[derive(Debug, Deserialize)]
pub struct EnvironmentQuery {
    pub lat: f64,
    pub lon: f64,
}

/// GET /api/environmental-data?lat=..&lon=..
pub async fn environmental_data(
    State(state): State<AppState>,
    Query(query): Query<EnvironmentQuery>,
) -> ApiResult<Json<EnvironmentContext>> {
    let location = Location { lat: query.lat, lon: query.lon };
    location.validate().map_err(ApiError::BadRequest)?;

    let env = state
        .environment
        .fetch_environment(query.lat, query.lon)
        .await?;
    Ok(Json((&env).into()))
}

/// Build fast-path routes
pub fn farm_routes() -> Router<AppState> {
    Router::new()
        .route("/api/farm/analyze", post(analyze_farm))
        .route("/api/crops", get(list_crops))
        .route("/api/environmental-data", get(environmental_data))
}
