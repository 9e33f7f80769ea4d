//! In-memory job progress tracker
//!
//! Jobs live in a process-local map for the lifetime of the service; there
//! is no persistence, and a restart forgets all jobs. All mutation goes
//! through this store so the terminal-state guard cannot be bypassed: once
//! a job is Completed or Failed its state never changes again.

use crate::models::analysis::{FullAnalysisRequest, SpecialistResult, SynthesisResult};
use crate::models::job::{AnalysisJob, AnalysisStatus, JobOutcome};
use cdis_common::{Error, Result};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct JobStore {
    jobs: Arc<RwLock<HashMap<Uuid, AnalysisJob>>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new pending job and return its id
    pub async fn create(
        &self,
        request: FullAnalysisRequest,
        crop_names: BTreeMap<String, String>,
    ) -> Uuid {
        let job = AnalysisJob::new(request, crop_names);
        let id = job.job_id;
        self.jobs.write().await.insert(id, job);
        debug!(job_id = %id, "job created");
        id
    }

    pub async fn get(&self, id: Uuid) -> Result<AnalysisJob> {
        self.jobs
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("unknown job {id}")))
    }

    /// Apply `mutate` to a live job; terminal jobs are left untouched
    async fn update<F>(&self, id: Uuid, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut AnalysisJob),
    {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("unknown job {id}")))?;
        if job.status.is_terminal() {
            warn!(job_id = %id, status = ?job.status, "ignoring update to terminal job");
            return Ok(());
        }
        mutate(job);
        Ok(())
    }

    pub async fn set_status(&self, id: Uuid, status: AnalysisStatus) -> Result<()> {
        self.update(id, |job| job.status = status).await
    }

    /// Record a finished stage: slot the result and log the step label
    pub async fn record_stage(
        &self,
        id: Uuid,
        slot_key: &str,
        step_label: &str,
        result: SpecialistResult,
    ) -> Result<()> {
        let slot_key = slot_key.to_string();
        let step_label = step_label.to_string();
        self.update(id, move |job| {
            job.stage_results.insert(slot_key, result);
            job.completed_steps.push(step_label);
        })
        .await
    }

    /// Finish a job successfully with its merged outputs
    pub async fn complete(
        &self,
        id: Uuid,
        model_outputs: BTreeMap<String, SpecialistResult>,
        final_decision: Option<SynthesisResult>,
    ) -> Result<()> {
        self.update(id, move |job| {
            job.status = AnalysisStatus::Completed;
            job.outcome = Some(JobOutcome { model_outputs, final_decision });
        })
        .await
    }

    /// Finish a job as failed, keeping whatever stages already landed
    pub async fn fail(&self, id: Uuid, message: impl Into<String>) -> Result<()> {
        let message = message.into();
        self.update(id, move |job| {
            job.status = AnalysisStatus::Failed;
            job.error = Some(message);
        })
        .await
    }
}
