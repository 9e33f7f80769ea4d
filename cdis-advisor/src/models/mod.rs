//! Request, response and job state shapes for the advisory service

pub mod analysis;
pub mod context;
pub mod deterministic;
pub mod job;
pub mod prescreen;

pub use analysis::{
    DecisionMatrixEntry, FullAnalysisRequest, FullAnalysisResponse, SpecialistResult,
    SynthesisResult,
};
pub use context::{AnalysisContext, CropContext, EnvironmentContext, UserContext};
pub use deterministic::{DeterministicResponse, FarmInput, FinalDecision, SubModelReport};
pub use job::{AnalysisJob, AnalysisStatus, JobOutcome, JobProgress};
pub use prescreen::{
    CropCandidate, EnvironmentalSummary, Location, PrescreenRequest, PrescreenResponse,
    ScoreBreakdown,
};
