//! Progressive pipeline orchestrator
//!
//! Two execution shapes over the same nine stages:
//!
//! * `run_full` — all eight specialists launched at once, then synthesis.
//!   Used by the synchronous endpoint.
//! * `run_progressive` — stage by stage, publishing each result into the
//!   job store as it lands so pollers can render progress. Used by the
//!   submit/poll endpoints.
//!
//! Every reasoning call in either shape passes through one process-wide
//! capacity-1 gate: the provider's free tier enforces strict per-minute
//! limits, so no two calls may ever be in flight at once, even across
//! concurrent jobs. The progressive shape additionally paces stages with a
//! fixed delay.

use crate::models::analysis::{SpecialistResult, SynthesisResult};
use crate::models::context::AnalysisContext;
use crate::services::job_store::JobStore;
use crate::services::reasoning_client::ReasoningProvider;
use crate::services::specialists::{run_specialist, SpecialistSpec, SPECIALISTS};
use crate::services::synthesis::run_synthesis;
use cdis_common::{Error, Result};
use futures::future::try_join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{error, info};
use uuid::Uuid;

/// Pause between progressive stages (free tier: ~20 requests/minute)
pub const DEFAULT_INTER_STAGE_DELAY: Duration = Duration::from_secs(3);

pub struct StageOrchestrator {
    provider: Arc<dyn ReasoningProvider>,
    jobs: JobStore,
    /// Process-wide reasoning-call gate, capacity 1
    gate: Semaphore,
    inter_stage_delay: Duration,
    specialist_model: String,
    synthesis_model: String,
}

impl StageOrchestrator {
    pub fn new(
        provider: Arc<dyn ReasoningProvider>,
        jobs: JobStore,
        specialist_model: String,
        synthesis_model: String,
    ) -> Self {
        Self {
            provider,
            jobs,
            gate: Semaphore::new(1),
            inter_stage_delay: DEFAULT_INTER_STAGE_DELAY,
            specialist_model,
            synthesis_model,
        }
    }

    /// Override the stage pacing delay (tests run with zero)
    pub fn with_inter_stage_delay(mut self, delay: Duration) -> Self {
        self.inter_stage_delay = delay;
        self
    }

    async fn guarded_specialist(
        &self,
        spec: &SpecialistSpec,
        context: &AnalysisContext,
    ) -> Result<SpecialistResult> {
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| Error::Internal("reasoning gate closed".to_string()))?;
        run_specialist(self.provider.as_ref(), spec, context, &self.specialist_model).await
    }

    async fn guarded_synthesis(
        &self,
        context: &AnalysisContext,
        results: &[SpecialistResult],
    ) -> Result<SynthesisResult> {
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| Error::Internal("reasoning gate closed".to_string()))?;
        run_synthesis(self.provider.as_ref(), context, results, &self.synthesis_model).await
    }

    fn keyed_outputs(results: Vec<SpecialistResult>) -> BTreeMap<String, SpecialistResult> {
        SPECIALISTS
            .iter()
            .zip(results)
            .map(|(spec, r)| (spec.output_key.to_string(), r))
            .collect()
    }

    /// Synchronous shape: all specialists at once, then synthesis
    ///
    /// The gate still serializes the actual provider calls; "at once" buys
    /// nothing but simpler failure handling here, and keeps the behavior
    /// identical if the gate capacity is ever raised.
    pub async fn run_full(
        &self,
        context: &AnalysisContext,
    ) -> Result<(SynthesisResult, BTreeMap<String, SpecialistResult>)> {
        info!(crops = context.selected_crops.len(), "full pipeline start");
        let results = try_join_all(
            SPECIALISTS
                .iter()
                .map(|spec| self.guarded_specialist(spec, context)),
        )
        .await?;

        let decision = self.guarded_synthesis(context, &results).await?;
        info!(
            best_crop_id = decision.best_crop_id,
            confidence = decision.confidence_score,
            "full pipeline complete"
        );
        Ok((decision, Self::keyed_outputs(results)))
    }

    /// Progressive shape: drive a stored job stage by stage
    ///
    /// Stage one runs without a leading delay so the first card appears
    /// quickly; every later stage waits out the pacing delay first. A
    /// stage failure marks the job Failed, keeping the stages that already
    /// landed. With `include_synthesis` false the job completes after the
    /// eighth specialist and carries no final decision.
    pub async fn run_progressive(
        &self,
        job_id: Uuid,
        context: AnalysisContext,
        include_synthesis: bool,
    ) {
        if let Err(e) = self
            .drive_progressive(job_id, &context, include_synthesis)
            .await
        {
            error!(job_id = %job_id, error = %e, "pipeline failed");
            if let Err(store_err) = self.jobs.fail(job_id, e.to_string()).await {
                error!(job_id = %job_id, error = %store_err, "could not record failure");
            }
        }
    }

    async fn drive_progressive(
        &self,
        job_id: Uuid,
        context: &AnalysisContext,
        include_synthesis: bool,
    ) -> Result<()> {
        use crate::models::job::AnalysisStatus;

        let mut results: Vec<SpecialistResult> = Vec::with_capacity(SPECIALISTS.len());
        for spec in &SPECIALISTS {
            self.jobs
                .set_status(job_id, AnalysisStatus::processing(spec.index))
                .await?;
            if spec.index > 1 {
                tokio::time::sleep(self.inter_stage_delay).await;
            }
            let result = self.guarded_specialist(spec, context).await?;
            self.jobs
                .record_stage(job_id, spec.key, spec.step_label, result.clone())
                .await?;
            if spec.index == 1 {
                // Publish the first card before the long tail starts
                self.jobs
                    .set_status(job_id, AnalysisStatus::Model1Completed)
                    .await?;
            }
            results.push(result);
        }

        let final_decision = if include_synthesis {
            self.jobs
                .set_status(job_id, AnalysisStatus::ProcessingModel9)
                .await?;
            tokio::time::sleep(self.inter_stage_delay).await;
            Some(self.guarded_synthesis(context, &results).await?)
        } else {
            None
        };

        self.jobs
            .complete(job_id, Self::keyed_outputs(results), final_decision)
            .await?;
        info!(job_id = %job_id, include_synthesis, "pipeline complete");
        Ok(())
    }
}
