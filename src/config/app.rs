//! Main application configuration
//!
//! This module defines the primary configuration structures for the
//! leaderboard engine, including environment variable and TOML file loading
//! and validation.

use crate::config::rating::RatingConfig;
use crate::ledger::MIN_GAMES_FOR_RANKING;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub rating: RatingConfig,
    pub ledger: LedgerSettings,
}

/// Service-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Entry state and ranking settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSettings {
    /// Contests an entry must play before it leaves the placement bucket
    pub min_games_for_ranking: u32,
    /// How long a write waits for its entry locks before giving up
    pub lock_timeout_ms: u64,
    /// Maximum number of points returned for a rating history chart
    pub history_cap: usize,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "leaderboard-engine".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            min_games_for_ranking: MIN_GAMES_FOR_RANKING,
            lock_timeout_ms: 5000,
            history_cap: 500,
        }
    }
}

fn env_parse<T: FromStr>(key: &str, target: &mut T) -> Result<()> {
    if let Ok(raw) = env::var(key) {
        *target = raw
            .parse()
            .map_err(|_| anyhow!("Invalid {} value: {}", key, raw))?;
    }
    Ok(())
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
        env_parse("RATING_INITIAL_MU", &mut config.rating.initial_mu)?;
        env_parse("RATING_INITIAL_SIGMA", &mut config.rating.initial_sigma)?;
        env_parse("RATING_BETA", &mut config.rating.beta)?;
        env_parse(
            "RATING_UNCERTAINTY_TOLERANCE",
            &mut config.rating.uncertainty_tolerance,
        )?;
        env_parse(
            "RATING_DISPLAY_SIGMA_MULTIPLIER",
            &mut config.rating.display_sigma_multiplier,
        )?;
        env_parse("RATING_SIGMA_FLOOR", &mut config.rating.sigma_floor)?;
        env_parse(
            "RATING_MAX_MU_SWING_SIGMAS",
            &mut config.rating.max_mu_swing_sigmas,
        )?;

        // Ledger settings
        env_parse(
            "MIN_GAMES_FOR_RANKING",
            &mut config.ledger.min_games_for_ranking,
        )?;
        env_parse("LOCK_TIMEOUT_MS", &mut config.ledger.lock_timeout_ms)?;
        env_parse("HISTORY_CAP", &mut config.ledger.history_cap)?;

        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file; missing keys take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml_str(&raw)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Get entry lock timeout as Duration
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.ledger.lock_timeout_ms)
    }
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

    config.rating.validate()?;

    // Validate ledger settings
    if config.ledger.min_games_for_ranking == 0 {
        return Err(anyhow!("Minimum games for ranking must be greater than 0"));
    }
    if config.ledger.lock_timeout_ms == 0 {
        return Err(anyhow!("Lock timeout must be greater than 0"));
    }
    if config.ledger.history_cap == 0 {
        return Err(anyhow!("History cap must be greater than 0"));
    }

    Ok(())
}
