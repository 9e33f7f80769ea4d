//! HTTP API handlers for cdis-advisor

pub mod analysis;
pub mod farm;
pub mod health;
pub mod prescreen;

pub use analysis::analysis_routes;
pub use farm::farm_routes;
pub use health::health_routes;
pub use prescreen::prescreen_routes;
