//! Configuration resolution for CDIS services
//!
//! Two-tier resolution with ENV → TOML priority. The TOML file lives at
//! `~/.config/cdis/cdis-advisor.toml` unless overridden via `CDIS_CONFIG`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default model hint for the eight specialist passes (fast, structured JSON)
pub const DEFAULT_MODEL_SPECIALIST: &str = "meta-llama/llama-3.2-3b-instruct";
/// Default model hint for the synthesis pass (cross-stage reasoning)
pub const DEFAULT_MODEL_SYNTHESIS: &str = "meta-llama/llama-3.3-70b-instruct:free";
/// OpenRouter chat-completions endpoint
pub const DEFAULT_REASONING_BASE_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
/// NASA POWER daily point endpoint
pub const DEFAULT_POWER_BASE_URL: &str = "https://power.larc.nasa.gov/api/temporal/daily/point";

/// TOML configuration file contents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Reasoning-provider API key (ENV `CDIS_OPENROUTER_API_KEY` wins)
    pub openrouter_api_key: Option<String>,
    /// Model hint for specialist passes
    pub model_specialist: Option<String>,
    /// Model hint for the synthesis pass
    pub model_synthesis: Option<String>,
    /// HTTP bind address, e.g. "127.0.0.1:5730"
    pub bind_address: Option<String>,
}

impl TomlConfig {
    /// Load from a TOML file, returning defaults if the file is absent
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }
}

/// Default configuration file path
pub fn default_config_path() -> PathBuf {
    if let Ok(p) = std::env::var("CDIS_CONFIG") {
        return PathBuf::from(p);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".config/cdis/cdis-advisor.toml")
}

/// Resolve the reasoning-provider API key from 2-tier configuration
///
/// **Priority:** ENV → TOML
pub fn resolve_api_key(toml_config: &TomlConfig) -> Result<String> {
    let mut sources = Vec::new();

    let env_key = std::env::var("CDIS_OPENROUTER_API_KEY").ok();
    if let Some(key) = &env_key {
        if is_valid_key(key) {
            sources.push("environment");
        }
    }

    let toml_key = toml_config.openrouter_api_key.as_ref();
    if let Some(key) = toml_key {
        if is_valid_key(key) {
            sources.push("TOML");
        }
    }

    if sources.len() > 1 {
        warn!(
            "Reasoning API key found in multiple sources: {}. Using environment (highest priority).",
            sources.join(", ")
        );
    }

    if let Some(key) = env_key {
        if is_valid_key(&key) {
            info!("Reasoning API key loaded from environment variable");
            return Ok(key);
        }
    }

    if let Some(key) = toml_key {
        if is_valid_key(key) {
            info!("Reasoning API key loaded from TOML config");
            return Ok(key.clone());
        }
    }

    Err(Error::Config(
        "Reasoning API key not configured. Please configure using one of:\n\
         1. Environment: CDIS_OPENROUTER_API_KEY=sk-or-...\n\
         2. TOML config: ~/.config/cdis/cdis-advisor.toml (openrouter_api_key = \"sk-or-...\")"
            .to_string(),
    ))
}

/// Validate API key (non-empty, non-whitespace, not a placeholder)
pub fn is_valid_key(key: &str) -> bool {
    let trimmed = key.trim();
    !trimmed.is_empty() && !trimmed.starts_with("sk-or-YOUR")
}
