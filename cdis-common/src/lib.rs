//! Shared types for the CDIS crop decision services
//!
//! Holds the error taxonomy, configuration resolution and the core
//! agronomic value types consumed by the advisory service.

pub mod config;
pub mod error;
pub mod types;

pub use error::{Error, Result};
