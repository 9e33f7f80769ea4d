//! HTTP API integration tests
//!
//! Drives the full router with in-process fakes for the environmental and
//! reasoning providers; no network traffic.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use cdis_advisor::services::catalog::CropCatalog;
use cdis_advisor::services::job_store::JobStore;
use cdis_advisor::services::orchestrator::StageOrchestrator;
use cdis_advisor::services::power_client::EnvironmentProvider;
use cdis_advisor::services::reasoning_client::ReasoningProvider;
use cdis_advisor::{build_router, AppState};
use cdis_common::types::EnvironmentalContext;
use cdis_common::Result;

/// Fixed mid-season environment that keeps most catalog crops viable
struct FakeEnvironment;

#[async_trait]
impl EnvironmentProvider for FakeEnvironment {
    async fn fetch_environment(&self, _lat: f64, _lon: f64) -> Result<EnvironmentalContext> {
        Ok(EnvironmentalContext {
            avg_temp: 27.0,
            min_temp: 18.0,
            max_temp: 34.0,
            rainfall_total: 450.0,
            rainfall_variability: 25.0,
            soil_moisture_index: 0.6,
            avg_humidity: Some(65.0),
            gdd: 1400.0,
            heat_stress_days: 2,
            cold_stress_days: 0,
            dry_spell_days: 4,
        })
    }
}

/// Answers every specialist with fixed crop scores and the synthesis pass
/// with a fixed decision for crop 1.
struct ScriptedReasoner;

#[async_trait]
impl ReasoningProvider for ScriptedReasoner {
    async fn call(
        &self,
        instructions: &str,
        _payload: &Value,
        _model: &str,
        _max_output_tokens: u32,
    ) -> Result<Value> {
        if instructions.contains("best_crop_id") {
            Ok(json!({
                "best_crop_id": 1,
                "alternative_crop_ids": [2],
                "confidence_score": 82,
                "cropping_system": "Standalone",
                "decision_matrix": {
                    "1": {
                        "crop_id": 1,
                        "overall_score": 84,
                        "risk_adjusted_score": 76,
                        "risk_level": "Low",
                        "economic_outlook": "Strong",
                        "climate_resilience": 72
                    },
                    "2": {
                        "crop_id": 2,
                        "overall_score": 65,
                        "risk_adjusted_score": 58,
                        "risk_level": "Moderate",
                        "economic_outlook": "Moderate",
                        "climate_resilience": 60
                    }
                },
                "reasoning_summary": "Crop 1 fits the season best."
            }))
        } else {
            Ok(json!({
                "model_name": "scripted",
                "crop_scores": {"1": 80, "2": 60},
                "risk_factors": {},
                "key_findings": ["scripted finding"],
                "confidence": 80
            }))
        }
    }
}

/// Never answers; used to observe jobs mid-flight
struct StalledReasoner;

#[async_trait]
impl ReasoningProvider for StalledReasoner {
    async fn call(
        &self,
        _instructions: &str,
        _payload: &Value,
        _model: &str,
        _max_output_tokens: u32,
    ) -> Result<Value> {
        tokio::time::sleep(Duration::from_secs(600)).await;
        unreachable!("stalled provider should never answer in tests")
    }
}

fn test_app(provider: Arc<dyn ReasoningProvider>) -> axum::Router {
    let catalog = Arc::new(CropCatalog::from_seed());
    let jobs = JobStore::new();
    let orchestrator = Arc::new(
        StageOrchestrator::new(
            provider,
            jobs.clone(),
            "test/specialist".to_string(),
            "test/synthesis".to_string(),
        )
        .with_inter_stage_delay(Duration::ZERO),
    );
    let state = AppState::new(catalog, Arc::new(FakeEnvironment), jobs, orchestrator);
    build_router(state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn prescreen_body() -> Value {
    json!({
        "location": {"lat": 19.0, "lon": 75.5},
        "land_area": 2.0,
        "water_availability": "Adequate",
        "budget_per_acre": 40000.0,
        "soil_type": "Black"
    })
}

fn analysis_body() -> Value {
    json!({
        "location": {"lat": 19.0, "lon": 75.5},
        "land_area": 2.0,
        "water_availability": "Adequate",
        "budget_per_acre": 40000.0,
        "selected_crop_ids": [1, 2]
    })
}

#[tokio::test]
async fn health_reports_catalog_size() {
    let app = test_app(Arc::new(ScriptedReasoner));
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "cdis-advisor");
    assert!(body["catalog_size"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn prescreen_ranks_viable_crops() {
    let app = test_app(Arc::new(ScriptedReasoner));
    let response = app
        .oneshot(post_json("/api/crop-advisor/prescreen", prescreen_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let candidates = body["candidates"].as_array().unwrap();
    assert!(!candidates.is_empty(), "generous environment must yield candidates");
    assert!(body["recommended_top_ids"].as_array().unwrap().len() <= 3);

    // Sorted by score, descending
    let scores: Vec<i64> = candidates
        .iter()
        .map(|c| c["score"].as_i64().unwrap())
        .collect();
    let mut sorted = scores.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(scores, sorted);
}

#[tokio::test]
async fn prescreen_rejects_bad_latitude() {
    let app = test_app(Arc::new(ScriptedReasoner));
    let mut body = prescreen_body();
    body["location"]["lat"] = json!(95.0);

    let response = app
        .oneshot(post_json("/api/crop-advisor/prescreen", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn full_analysis_returns_synthesis_and_all_stages() {
    let app = test_app(Arc::new(ScriptedReasoner));
    let response = app
        .oneshot(post_json("/api/crop-advisor/full-analysis", analysis_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["final_decision"]["best_crop_id"], 1);
    assert_eq!(body["model_outputs"].as_object().unwrap().len(), 8);
    assert!(body["model_outputs"]
        .as_object()
        .unwrap()
        .contains_key("model_1_rainfall"));
}

#[tokio::test]
async fn full_analysis_rejects_unknown_crop_ids() {
    let app = test_app(Arc::new(ScriptedReasoner));
    let mut body = analysis_body();
    body["selected_crop_ids"] = json!([1, 99999]);

    let response = app
        .oneshot(post_json("/api/crop-advisor/full-analysis", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn submitted_job_completes_and_serves_result() {
    let app = test_app(Arc::new(ScriptedReasoner));

    let response = app
        .clone()
        .oneshot(post_json("/api/crop-advisor/jobs/submit", analysis_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let submitted = body_json(response).await;
    assert_eq!(submitted["status"], "pending");
    let job_id = submitted["job_id"].as_str().unwrap().to_string();

    // Poll until the background pipeline finishes
    let mut status = Value::Null;
    for _ in 0..200 {
        let response = app
            .clone()
            .oneshot(get(&format!("/api/crop-advisor/jobs/{job_id}/status")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        status = body_json(response).await;
        if status["frontend_status"] == "completed" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(status["frontend_status"], "completed");
    assert_eq!(status["progress"]["percentage"], 100);
    assert_eq!(
        status["progress"]["completed_steps"].as_array().unwrap().len(),
        8
    );

    let response = app
        .clone()
        .oneshot(get(&format!("/api/crop-advisor/jobs/{job_id}/result")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let result = body_json(response).await;
    // No synthesis on the submit path: headline comes from specialist scores
    assert_eq!(result["best_crop"], "Soybean");
    assert_eq!(result["modelResults"].as_array().unwrap().len(), 9);
}

#[tokio::test]
async fn started_analysis_runs_synthesis_in_job() {
    let app = test_app(Arc::new(ScriptedReasoner));

    let response = app
        .clone()
        .oneshot(post_json("/api/crop-advisor/analysis/start", analysis_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let submitted = body_json(response).await;
    assert_eq!(submitted["status"], "pending");
    let job_id = submitted["job_id"].as_str().unwrap().to_string();

    let mut status = Value::Null;
    for _ in 0..200 {
        let response = app
            .clone()
            .oneshot(get(&format!("/api/crop-advisor/jobs/{job_id}/status")))
            .await
            .unwrap();
        status = body_json(response).await;
        if status["frontend_status"] == "completed" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(status["frontend_status"], "completed");

    let response = app
        .oneshot(get(&format!("/api/crop-advisor/jobs/{job_id}/result")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let result = body_json(response).await;
    // Synthesis ran in-job: the headline and breakdown come from it
    assert_eq!(result["best_crop"], "Soybean");
    assert_eq!(result["confidence"], "High");
    assert_eq!(result["final_explanation"], "Crop 1 fits the season best.");
    assert_eq!(result["scoreBreakdown"].as_array().unwrap().len(), 3);
    assert_eq!(result["modelResults"].as_array().unwrap().len(), 9);
}

#[tokio::test]
async fn job_result_is_too_early_while_running() {
    let app = test_app(Arc::new(StalledReasoner));

    let response = app
        .clone()
        .oneshot(post_json("/api/crop-advisor/jobs/submit", analysis_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let submitted = body_json(response).await;
    let job_id = submitted["job_id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(get(&format!("/api/crop-advisor/jobs/{job_id}/result")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_EARLY);
}

#[tokio::test]
async fn unknown_job_is_not_found() {
    let app = test_app(Arc::new(ScriptedReasoner));
    let id = uuid::Uuid::new_v4();

    let response = app
        .clone()
        .oneshot(get(&format!("/api/crop-advisor/jobs/{id}/status")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(get(&format!("/api/crop-advisor/jobs/{id}/result")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn farm_analysis_returns_ranked_recommendation() {
    let app = test_app(Arc::new(ScriptedReasoner));
    let body = json!({
        "latitude": 19.0,
        "longitude": 75.5,
        "land_area": 2.0,
        "land_unit": "acres",
        "soil_type": "Black",
        "water_source": "Borewell",
        "budget": 40000.0
    });

    let response = app
        .oneshot(post_json("/api/farm/analyze", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["final_decision"]["recommendation_type"], "Best Bet");
    assert_eq!(body["models"].as_array().unwrap().len(), 6);
    assert!(body["alternatives"].as_array().unwrap().len() <= 2);
    assert!(body["environmental_context"]["rainfall_mm"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn environmental_data_echoes_aggregates() {
    let app = test_app(Arc::new(ScriptedReasoner));
    let response = app
        .clone()
        .oneshot(get("/api/environmental-data?lat=19.0&lon=75.5"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["avg_temp"], 27.0);

    let response = app
        .oneshot(get("/api/environmental-data?lat=500&lon=75.5"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
