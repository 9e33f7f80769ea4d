//! cdis-advisor library interface
//!
//! Exposes the service layer and router for integration testing.

pub mod api;
pub mod data;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::services::catalog::CropCatalog;
use crate::services::job_store::JobStore;
use crate::services::orchestrator::StageOrchestrator;
use crate::services::power_client::EnvironmentProvider;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// In-memory crop catalog, immutable after startup
    pub catalog: Arc<CropCatalog>,
    /// Environmental data source (NASA POWER in production)
    pub environment: Arc<dyn EnvironmentProvider>,
    /// In-memory job registry for the progressive pipeline
    pub jobs: JobStore,
    /// Nine-stage pipeline driver
    pub orchestrator: Arc<StageOrchestrator>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        catalog: Arc<CropCatalog>,
        environment: Arc<dyn EnvironmentProvider>,
        jobs: JobStore,
        orchestrator: Arc<StageOrchestrator>,
    ) -> Self {
        Self {
            catalog,
            environment,
            jobs,
            orchestrator,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::prescreen_routes())
        .merge(api::analysis_routes())
        .merge(api::farm_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
