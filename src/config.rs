use std::env;
use std::time::Duration;
use thiserror::Error;

use crate::pantry_cache::DEFAULT_TTL_SECS;
use crate::recipe_scorer::DEFAULT_MAX_RESULTS;

/// Environment variable holding the OpenRouter key. Only the name is stored; the key is read
/// when a request is made.
pub const API_KEY_ENV_VAR: &str = "OPENROUTER_API_KEY";
pub const MODEL_ENV_VAR: &str = "PANTRY_MATCH_MODEL";
pub const CACHE_TTL_ENV_VAR: &str = "PANTRY_CACHE_TTL_SECS";
pub const MAX_RESULTS_ENV_VAR: &str = "PANTRY_MATCH_MAX_RESULTS";

pub const DEFAULT_MODEL: &str = "qwen/qwen3-32b";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a non-negative integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_key_env_var: String,
    pub model: String,
    pub cache_ttl: Duration,
    pub max_results: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key_env_var: API_KEY_ENV_VAR.to_string(),
            model: DEFAULT_MODEL.to_string(),
            cache_ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

fn parse_number(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<u64>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { var, value }),
    }
}

impl Settings {
    /// Reads settings from the process environment after loading `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|var| env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut settings = Settings::default();
        if let Some(model) = lookup(MODEL_ENV_VAR).filter(|m| !m.trim().is_empty()) {
            settings.model = model.trim().to_string();
        }
        if let Some(secs) = parse_number(&lookup, CACHE_TTL_ENV_VAR)? {
            settings.cache_ttl = Duration::from_secs(secs);
        }
        if let Some(max) = parse_number(&lookup, MAX_RESULTS_ENV_VAR)? {
            settings.max_results = max as usize;
        }
        Ok(settings)
    }
}
