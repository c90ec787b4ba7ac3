//! Main application configuration
//!
//! This module defines the top-level configuration for the skill-seed
//! binary, including environment variable loading, TOML files and validation.

use crate::config::rating::RatingConfig;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub rating: RatingConfig,
    pub batch: BatchSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Batch rating settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    /// Players rated per blocking task
    pub chunk_size: usize,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "skill-seed".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self { chunk_size: 256 }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            config.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.service.log_level = log_level;
        }

        // Rating settings
        let rating = &mut config.rating;
        override_from_env("SIGMA_MIN", &mut rating.sigma_min)?;
        override_from_env("SIGMA_MAX", &mut rating.sigma_max)?;
        override_from_env("MU_MIN", &mut rating.mu_min)?;
        override_from_env("MU_MAX", &mut rating.mu_max)?;
        override_from_env("POWER_FACTOR", &mut rating.power_factor)?;
        override_from_env("MIN_GAMES_THRESHOLD", &mut rating.min_games_threshold)?;
        override_from_env("ONES_WEIGHT", &mut rating.weights.ones)?;
        override_from_env("TWOS_WEIGHT", &mut rating.weights.twos)?;
        override_from_env("THREES_WEIGHT", &mut rating.weights.threes)?;
        override_from_env("INITIAL_MU", &mut rating.initial_mu)?;
        override_from_env("INITIAL_SIGMA", &mut rating.initial_sigma)?;

        // Batch settings
        override_from_env("BATCH_CHUNK_SIZE", &mut config.batch.chunk_size)?;

        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        validate_config(&config)?;
        Ok(config)
    }
}

fn override_from_env<T: FromStr>(key: &str, target: &mut T) -> Result<()> {
    if let Ok(value) = env::var(key) {
        *target = value
            .parse()
            .map_err(|_| anyhow!("Invalid {} value: {}", key, value))?;
    }
    Ok(())
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.name.is_empty() {
        return Err(anyhow!("Service name cannot be empty"));
    }

    if config.batch.chunk_size == 0 {
        return Err(anyhow!("Batch chunk size must be greater than 0"));
    }

    config.rating.validate()?;

    Ok(())
}
