//! Orchestrator integration tests
//!
//! Exercises both pipeline shapes against scripted providers and verifies
//! the reasoning gate never admits two calls at once.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cdis_advisor::models::context::{AnalysisContext, EnvironmentContext, UserContext};
use cdis_advisor::models::job::AnalysisStatus;
use cdis_advisor::models::prescreen::Location;
use cdis_advisor::models::FullAnalysisRequest;
use cdis_advisor::services::job_store::JobStore;
use cdis_advisor::services::orchestrator::StageOrchestrator;
use cdis_advisor::services::reasoning_client::ReasoningProvider;
use cdis_advisor::services::specialists::SPECIALISTS;
use cdis_common::types::WaterAvailability;
use cdis_common::{Error, Result};

fn specialist_reply() -> Value {
    json!({
        "model_name": "scripted",
        "crop_scores": {"1": 75, "2": 55},
        "risk_factors": {},
        "key_findings": ["scripted"],
        "confidence": 78
    })
}

fn synthesis_reply() -> Value {
    json!({
        "best_crop_id": 1,
        "alternative_crop_ids": [2],
        "confidence_score": 80,
        "cropping_system": "Standalone",
        "decision_matrix": {},
        "reasoning_summary": "scripted"
    })
}

/// Counts in-flight calls to prove the gate serializes them
struct GateProbe {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: AtomicUsize,
}

impl GateProbe {
    fn new() -> Self {
        Self {
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ReasoningProvider for GateProbe {
    async fn call(
        &self,
        instructions: &str,
        _payload: &Value,
        _model: &str,
        _max_output_tokens: u32,
    ) -> Result<Value> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if instructions.contains("best_crop_id") {
            Ok(synthesis_reply())
        } else {
            Ok(specialist_reply())
        }
    }
}

/// Answers each specialist stage with a reply unique to that stage, so a
/// result landing in the wrong output slot is visible
struct PerStageReasoner;

#[async_trait]
impl ReasoningProvider for PerStageReasoner {
    async fn call(
        &self,
        instructions: &str,
        _payload: &Value,
        _model: &str,
        _max_output_tokens: u32,
    ) -> Result<Value> {
        if instructions.contains("best_crop_id") {
            return Ok(synthesis_reply());
        }
        let spec = SPECIALISTS
            .iter()
            .find(|s| s.instructions == instructions)
            .expect("unrecognized specialist instructions");
        Ok(json!({
            "model_name": spec.model_name,
            "crop_scores": {"1": spec.index as i64 * 10},
            "risk_factors": {},
            "key_findings": [format!("finding from stage {}", spec.index)],
            "confidence": 50 + spec.index as i64
        }))
    }
}

/// Fails once a given number of calls have gone through
struct FailAfter {
    calls: AtomicUsize,
    fail_at: usize,
}

#[async_trait]
impl ReasoningProvider for FailAfter {
    async fn call(
        &self,
        _instructions: &str,
        _payload: &Value,
        _model: &str,
        _max_output_tokens: u32,
    ) -> Result<Value> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n >= self.fail_at {
            return Err(Error::Unavailable("provider out of retries".to_string()));
        }
        Ok(specialist_reply())
    }
}

fn context() -> AnalysisContext {
    AnalysisContext {
        environment: EnvironmentContext {
            avg_temp: 27.0,
            min_temp: 18.0,
            max_temp: 34.0,
            rainfall_mm: 450.0,
            rainfall_variability: 25.0,
            heat_stress_days: 2,
            cold_stress_days: 0,
            dry_spell_days: 4,
            soil_moisture_percent: 60.0,
            gdd: 1400.0,
            humidity_percent: Some(65.0),
        },
        user: UserContext {
            land_area: 2.0,
            water_availability: WaterAvailability::Adequate,
            budget_per_acre: 40000.0,
            soil_type: Some("Black".to_string()),
        },
        selected_crops: Vec::new(),
    }
}

fn request() -> FullAnalysisRequest {
    FullAnalysisRequest {
        location: Location { lat: 19.0, lon: 75.5 },
        land_area: 2.0,
        water_availability: WaterAvailability::Adequate,
        budget_per_acre: 40000.0,
        selected_crop_ids: vec![1, 2],
        soil_type: Some("Black".to_string()),
    }
}

fn crop_names() -> BTreeMap<String, String> {
    [("1", "Soybean"), ("2", "Rice (Paddy)")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn orchestrator(provider: Arc<dyn ReasoningProvider>, jobs: JobStore) -> StageOrchestrator {
    StageOrchestrator::new(
        provider,
        jobs,
        "test/specialist".to_string(),
        "test/synthesis".to_string(),
    )
    .with_inter_stage_delay(Duration::ZERO)
}

#[tokio::test]
async fn full_run_produces_all_keyed_outputs() {
    let probe = Arc::new(GateProbe::new());
    let orch = orchestrator(probe.clone(), JobStore::new());

    let (decision, outputs) = orch.run_full(&context()).await.unwrap();
    assert_eq!(decision.best_crop_id, 1);
    assert_eq!(outputs.len(), 8);
    assert!(outputs.contains_key("model_1_rainfall"));
    assert!(outputs.contains_key("model_8_demand"));
    // 8 specialists + 1 synthesis
    assert_eq!(probe.calls.load(Ordering::SeqCst), 9);
}

#[tokio::test]
async fn parallel_and_progressive_modes_agree_stage_by_stage() {
    let jobs = JobStore::new();
    let orch = orchestrator(Arc::new(PerStageReasoner), jobs.clone());

    let (_, parallel_outputs) = orch.run_full(&context()).await.unwrap();

    let job_id = jobs.create(request(), crop_names()).await;
    orch.run_progressive(job_id, context(), true).await;
    let job = jobs.get(job_id).await.unwrap();
    let outcome = job.outcome.unwrap();

    // Identical eight-stage output sets regardless of execution shape
    assert_eq!(parallel_outputs, outcome.model_outputs);

    // Each stage's distinct reply landed in its own slot, in both shapes
    for spec in &SPECIALISTS {
        let result = &parallel_outputs[spec.output_key];
        assert_eq!(result.model_name, spec.model_name);
        assert_eq!(result.crop_scores["1"], spec.index as i64 * 10);
        assert_eq!(result.confidence, 50 + spec.index as i64);
        assert_eq!(&job.stage_results[spec.key], result);
    }
}

#[tokio::test]
async fn gate_admits_one_call_at_a_time() {
    let probe = Arc::new(GateProbe::new());
    let orch = orchestrator(probe.clone(), JobStore::new());

    orch.run_full(&context()).await.unwrap();
    assert_eq!(probe.max_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn progressive_run_records_every_stage() {
    let jobs = JobStore::new();
    let probe = Arc::new(GateProbe::new());
    let orch = orchestrator(probe, jobs.clone());

    let job_id = jobs.create(request(), crop_names()).await;
    orch.run_progressive(job_id, context(), true).await;

    let job = jobs.get(job_id).await.unwrap();
    assert_eq!(job.status, AnalysisStatus::Completed);
    assert_eq!(job.stage_results.len(), 8);
    assert_eq!(job.completed_steps.len(), 8);
    assert_eq!(job.completed_steps[0], "Rainfall Analysis");

    let outcome = job.outcome.unwrap();
    assert_eq!(outcome.model_outputs.len(), 8);
    assert_eq!(outcome.final_decision.unwrap().best_crop_id, 1);
}

#[tokio::test]
async fn progressive_run_without_synthesis_completes_bare() {
    let jobs = JobStore::new();
    let probe = Arc::new(GateProbe::new());
    let orch = orchestrator(probe.clone(), jobs.clone());

    let job_id = jobs.create(request(), crop_names()).await;
    orch.run_progressive(job_id, context(), false).await;

    let job = jobs.get(job_id).await.unwrap();
    assert_eq!(job.status, AnalysisStatus::Completed);
    assert!(job.outcome.unwrap().final_decision.is_none());
    // Synthesis never called
    assert_eq!(probe.calls.load(Ordering::SeqCst), 8);
}

#[tokio::test]
async fn stage_failure_marks_job_failed_but_keeps_landed_stages() {
    let jobs = JobStore::new();
    let provider = Arc::new(FailAfter { calls: AtomicUsize::new(0), fail_at: 4 });
    let orch = orchestrator(provider, jobs.clone());

    let job_id = jobs.create(request(), crop_names()).await;
    orch.run_progressive(job_id, context(), true).await;

    let job = jobs.get(job_id).await.unwrap();
    assert_eq!(job.status, AnalysisStatus::Failed);
    assert!(job.error.unwrap().contains("out of retries"));
    // Stages 1-3 landed before the fourth call failed
    assert_eq!(job.stage_results.len(), 3);
    assert!(job.outcome.is_none());
}
