//! Pre-screen endpoint
//!
//! POST /api/crop-advisor/prescreen

use axum::{extract::State, routing::post, Json, Router};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::models::prescreen::{PrescreenRequest, PrescreenResponse};
use crate::services::prescreen::PrescreenEngine;
use crate::AppState;

/// POST /api/crop-advisor/prescreen
///
/// Ranks the whole catalog against live environmental data for the given
/// location, returning every crop that survives the hard filter.
pub async fn run_prescreen(
    State(state): State<AppState>,
    Json(request): Json<PrescreenRequest>,
) -> ApiResult<Json<PrescreenResponse>> {
    request.location.validate().map_err(ApiError::BadRequest)?;

    let env = state
        .environment
        .fetch_environment(request.location.lat, request.location.lon)
        .await?;

    let response = PrescreenEngine::new(&env, &request).run(state.catalog.all());
    info!(
        candidates = response.candidates.len(),
        season = %response.current_season,
        "prescreen complete"
    );
    Ok(Json(response))
}

/// Build pre-screen routes
pub fn prescreen_routes() -> Router<AppState> {
    Router::new().route("/api/crop-advisor/prescreen", post(run_prescreen))
}
