//! cdis-advisor - Crop Decision Intelligence Service
//!
//! HTTP service recommending crops for a farm from live agro-climatic data:
//! a deterministic pre-screen plus a nine-stage reasoning pipeline over an
//! OpenRouter-hosted model ensemble.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cdis_advisor::services::catalog::CropCatalog;
use cdis_advisor::services::job_store::JobStore;
use cdis_advisor::services::orchestrator::StageOrchestrator;
use cdis_advisor::services::power_client::PowerClient;
use cdis_advisor::services::reasoning_client::OpenRouterClient;
use cdis_advisor::AppState;
use cdis_common::config::{
    self, TomlConfig, DEFAULT_MODEL_SPECIALIST, DEFAULT_MODEL_SYNTHESIS,
    DEFAULT_REASONING_BASE_URL,
};

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5730";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting cdis-advisor (Crop Decision Intelligence Service)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config_path = config::default_config_path();
    info!("Config: {}", config_path.display());
    let toml_config = TomlConfig::load(&config_path)?;

    // The deterministic endpoints work without a key; only the reasoning
    // pipeline needs one, and the client reports the gap per call.
    let api_key = match config::resolve_api_key(&toml_config) {
        Ok(key) => Some(key),
        Err(e) => {
            warn!("{e}. Reasoning endpoints will return errors until a key is configured.");
            None
        }
    };

    let catalog = Arc::new(CropCatalog::from_seed());
    info!("Catalog loaded: {} crops", catalog.all().len());

    let environment = Arc::new(PowerClient::default());
    let reasoning = Arc::new(OpenRouterClient::new(DEFAULT_REASONING_BASE_URL, api_key));
    let jobs = JobStore::new();

    let orchestrator = Arc::new(StageOrchestrator::new(
        reasoning,
        jobs.clone(),
        toml_config
            .model_specialist
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL_SPECIALIST.to_string()),
        toml_config
            .model_synthesis
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL_SYNTHESIS.to_string()),
    ));

    let state = AppState::new(catalog, environment, jobs, orchestrator);
    let app = cdis_advisor::build_router(state);

    let bind_address = toml_config
        .bind_address
        .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Listening on http://{bind_address}");
    info!("Health check: http://{bind_address}/health");

    axum::serve(listener, app).await?;

    Ok(())
}
