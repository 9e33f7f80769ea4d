//! Nine-stage pipeline endpoints
//!
//! POST /api/crop-advisor/full-analysis   — synchronous, blocks until done
//! POST /api/crop-advisor/jobs/submit     — background job, poll for progress
//! GET  /api/crop-advisor/jobs/:id/status
//! GET  /api/crop-advisor/jobs/:id/result

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::analysis::{FullAnalysisRequest, FullAnalysisResponse};
use crate::models::context::{AnalysisContext, UserContext};
use crate::models::job::{AnalysisStatus, JobProgress};
use crate::services::assembly::{assemble, AssembledDecision};
use crate::AppState;

/// Fetch the environment and resolve the crop selection into the shared
/// context every reasoning pass receives.
async fn build_context(
    state: &AppState,
    request: &FullAnalysisRequest,
) -> ApiResult<AnalysisContext> {
    request.location.validate().map_err(ApiError::BadRequest)?;
    if request.selected_crop_ids.is_empty() {
        return Err(ApiError::BadRequest("no crops selected".to_string()));
    }

    let crops = state.catalog.by_ids(&request.selected_crop_ids)?;
    let env = state
        .environment
        .fetch_environment(request.location.lat, request.location.lon)
        .await?;

    Ok(AnalysisContext {
        environment: (&env).into(),
        user: UserContext {
            land_area: request.land_area,
            water_availability: request.water_availability,
            budget_per_acre: request.budget_per_acre,
            soil_type: request.soil_type.clone(),
        },
        selected_crops: crops.iter().map(|c| (*c).into()).collect(),
    })
}

/// POST /api/crop-advisor/full-analysis
///
/// Runs all eight specialists plus synthesis before responding. Slow by
/// construction (the reasoning gate serializes every call); prefer the job
/// endpoints for interactive use.
pub async fn full_analysis(
    State(state): State<AppState>,
    Json(request): Json<FullAnalysisRequest>,
) -> ApiResult<Json<FullAnalysisResponse>> {
    let context = build_context(&state, &request).await?;
    let (final_decision, model_outputs) = state.orchestrator.run_full(&context).await?;
    Ok(Json(FullAnalysisResponse {
        final_decision,
        model_outputs,
        analysis_context: context,
    }))
}

/// POST /api/crop-advisor/jobs/submit response
#[derive(Debug, Serialize)]
pub struct SubmitJobResponse {
    pub job_id: Uuid,
    pub status: String,
    pub message: String,
}

/// Validate, register a job and launch the progressive pipeline for it.
///
/// The environment is fetched up front so the caller learns about bad input
/// immediately; only the reasoning stages run in the background.
async fn launch_job(
    state: &AppState,
    request: FullAnalysisRequest,
    include_synthesis: bool,
) -> ApiResult<Json<SubmitJobResponse>> {
    let context = build_context(state, &request).await?;
    let crop_names = state.catalog.name_map(&request.selected_crop_ids);

    let job_id = state.jobs.create(request, crop_names).await;
    info!(
        job_id = %job_id,
        crops = context.selected_crops.len(),
        include_synthesis,
        "job submitted"
    );

    let orchestrator = state.orchestrator.clone();
    tokio::spawn(async move {
        orchestrator
            .run_progressive(job_id, context, include_synthesis)
            .await;
    });

    Ok(Json(SubmitJobResponse {
        job_id,
        status: "pending".to_string(),
        message: "Analysis started. Poll the status endpoint for progress.".to_string(),
    }))
}

/// POST /api/crop-advisor/jobs/submit
///
/// Jobs submitted here skip the synthesis stage; the result headline is
/// aggregated from the specialist scores.
pub async fn submit_job(
    State(state): State<AppState>,
    Json(request): Json<FullAnalysisRequest>,
) -> ApiResult<Json<SubmitJobResponse>> {
    launch_job(&state, request, false).await
}

/// POST /api/crop-advisor/analysis/start
///
/// Progressive flow with the synthesis stage run in-job: the polled result
/// carries the synthesized final decision.
pub async fn start_analysis(
    State(state): State<AppState>,
    Json(request): Json<FullAnalysisRequest>,
) -> ApiResult<Json<SubmitJobResponse>> {
    launch_job(&state, request, true).await
}

/// GET /api/crop-advisor/jobs/:id/status response
#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub job_id: Uuid,
    pub status: AnalysisStatus,
    /// Collapsed lifecycle state: "pending" | "processing" | "completed" | "failed"
    pub frontend_status: String,
    pub progress: JobProgress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AssembledDecision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn frontend_status(status: &AnalysisStatus) -> &'static str {
    match status {
        AnalysisStatus::Pending => "pending",
        AnalysisStatus::Completed => "completed",
        AnalysisStatus::Failed => "failed",
        _ => "processing",
    }
}

/// GET /api/crop-advisor/jobs/:id/status
pub async fn job_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> ApiResult<Json<JobStatusResponse>> {
    let job = state.jobs.get(job_id).await?;

    let result = match (&job.status, &job.outcome) {
        (AnalysisStatus::Completed, Some(outcome)) => Some(assemble(outcome, &job.crop_names)),
        _ => None,
    };

    Ok(Json(JobStatusResponse {
        job_id: job.job_id,
        frontend_status: frontend_status(&job.status).to_string(),
        status: job.status,
        progress: job.progress(),
        result,
        error: job.error,
        created_at: job.created_at,
    }))
}

/// GET /api/crop-advisor/jobs/:id/result
///
/// Returns the assembled decision once the job has completed; 425 while
/// still in flight, 500 with the stored message if the pipeline failed.
pub async fn job_result(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> ApiResult<Json<AssembledDecision>> {
    let job = state.jobs.get(job_id).await?;

    match job.status {
        AnalysisStatus::Failed => Err(ApiError::Internal(
            job.error
                .unwrap_or_else(|| "analysis failed".to_string()),
        )),
        AnalysisStatus::Completed => {
            let outcome = job.outcome.ok_or_else(|| {
                ApiError::Internal("completed job has no outcome".to_string())
            })?;
            Ok(Json(assemble(&outcome, &job.crop_names)))
        }
        _ => Err(ApiError::TooEarly(format!(
            "analysis still in progress ({})",
            job.progress().message
        ))),
    }
}

/// Build pipeline routes
pub fn analysis_routes() -> Router<AppState> {
    Router::new()
        .route("/api/crop-advisor/full-analysis", post(full_analysis))
        .route("/api/crop-advisor/analysis/start", post(start_analysis))
        .route("/api/crop-advisor/jobs/submit", post(submit_job))
        .route("/api/crop-advisor/jobs/:job_id/status", get(job_status))
        .route("/api/crop-advisor/jobs/:job_id/result", get(job_result))
}
