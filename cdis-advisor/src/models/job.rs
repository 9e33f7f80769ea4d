//! Analysis job state machine and progress shapes
//!
//! A job walks `Pending → ProcessingModel1 → Model1Completed →
//! ProcessingModel2 → … → ProcessingModel8 (→ ProcessingModel9) → Completed`,
//! with `Failed` reachable from any non-terminal state. Terminal states are
//! final; the store refuses transitions out of them.

use super::analysis::{FullAnalysisRequest, SpecialistResult, SynthesisResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Total stages reported to pollers (8 specialists + 1 synthesis)
pub const TOTAL_STAGES: u32 = 9;

/// Job status state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Pending,
    ProcessingModel1,
    Model1Completed,
    ProcessingModel2,
    ProcessingModel3,
    ProcessingModel4,
    ProcessingModel5,
    ProcessingModel6,
    ProcessingModel7,
    ProcessingModel8,
    ProcessingModel9,
    Completed,
    Failed,
}

impl AnalysisStatus {
    /// Processing status for specialist/synthesis stage `n` (1–9)
    pub fn processing(stage: usize) -> AnalysisStatus {
        match stage {
            1 => AnalysisStatus::ProcessingModel1,
            2 => AnalysisStatus::ProcessingModel2,
            3 => AnalysisStatus::ProcessingModel3,
            4 => AnalysisStatus::ProcessingModel4,
            5 => AnalysisStatus::ProcessingModel5,
            6 => AnalysisStatus::ProcessingModel6,
            7 => AnalysisStatus::ProcessingModel7,
            8 => AnalysisStatus::ProcessingModel8,
            _ => AnalysisStatus::ProcessingModel9,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AnalysisStatus::Completed | AnalysisStatus::Failed)
    }

    /// (current stage number out of 9, human progress label)
    pub fn stage_progress(&self) -> (u32, &'static str) {
        match self {
            AnalysisStatus::Pending => (0, "Initialising..."),
            AnalysisStatus::ProcessingModel1 | AnalysisStatus::Model1Completed => {
                (1, "Model 1 · Rainfall Analysis")
            }
            AnalysisStatus::ProcessingModel2 => (2, "Model 2 · Soil Moisture Check"),
            AnalysisStatus::ProcessingModel3 => (3, "Model 3 · Water Balance"),
            AnalysisStatus::ProcessingModel4 => (4, "Model 4 · Climate Fit"),
            AnalysisStatus::ProcessingModel5 => (5, "Model 5 · Economic Viability"),
            AnalysisStatus::ProcessingModel6 => (6, "Model 6 · Risk Assessment"),
            AnalysisStatus::ProcessingModel7 => (7, "Model 7 · Market Access"),
            AnalysisStatus::ProcessingModel8 => (8, "Model 8 · Demand Trends"),
            AnalysisStatus::ProcessingModel9 => (9, "Model 9 · Final Synthesis"),
            AnalysisStatus::Completed => (9, "Complete"),
            AnalysisStatus::Failed => (0, "Failed"),
        }
    }
}

/// Progress block returned to pollers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobProgress {
    pub current_model: u32,
    pub total_models: u32,
    pub message: String,
    pub percentage: u32,
    pub completed_steps: Vec<String>,
}

/// Merged output of a finished run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobOutcome {
    /// Keyed by stage output key, e.g. "model_1_rainfall"
    pub model_outputs: BTreeMap<String, SpecialistResult>,
    /// Present only when the synthesis pass ran in-job
    pub final_decision: Option<SynthesisResult>,
}

/// One pipeline run, exclusively mutated through the job store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisJob {
    pub job_id: Uuid,
    pub status: AnalysisStatus,
    pub request: FullAnalysisRequest,
    pub created_at: DateTime<Utc>,
    /// Per-stage result slots, keyed "model_1" … "model_8", filled as stages land
    pub stage_results: BTreeMap<String, SpecialistResult>,
    /// Human-readable names of completed steps, in completion order
    pub completed_steps: Vec<String>,
    /// crop id (string) → display name, captured at submission
    pub crop_names: BTreeMap<String, String>,
    pub outcome: Option<JobOutcome>,
    pub error: Option<String>,
}

impl AnalysisJob {
    pub fn new(request: FullAnalysisRequest, crop_names: BTreeMap<String, String>) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            status: AnalysisStatus::Pending,
            request,
            created_at: Utc::now(),
            stage_results: BTreeMap::new(),
            completed_steps: Vec::new(),
            crop_names,
            outcome: None,
            error: None,
        }
    }

    /// Progress block for the poll endpoint; percentage hits 100 only at Completed
    pub fn progress(&self) -> JobProgress {
        let (current, message) = self.status.stage_progress();
        let percentage = if self.status == AnalysisStatus::Completed {
            100
        } else {
            current * 100 / TOTAL_STAGES
        };
        JobProgress {
            current_model: current,
            total_models: TOTAL_STAGES,
            message: message.to_string(),
            percentage,
            completed_steps: self.completed_steps.clone(),
        }
    }
}
