//! Service layer: catalog, environmental data, reasoning pipeline and the
//! deterministic fast path.

pub mod assembly;
pub mod catalog;
pub mod decision;
pub mod job_store;
pub mod orchestrator;
pub mod power_client;
pub mod prescreen;
pub mod reasoning_client;
pub mod reply_parser;
pub mod specialists;
pub mod submodels;
pub mod synthesis;

pub use catalog::CropCatalog;
pub use job_store::JobStore;
pub use orchestrator::StageOrchestrator;
pub use power_client::{EnvironmentProvider, PowerClient};
pub use reasoning_client::{OpenRouterClient, ReasoningProvider};
