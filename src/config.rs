//! Pipeline configuration loaded from config.json.
//!
//! If the config file doesn't exist or can't be parsed, default values are
//! used. Missing fields fall back to their defaults individually.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::extraction::ExtractionParams;
use crate::prediction::DEFAULT_HORIZON_DAYS;
use crate::scoring::HISTORY_ATTEMPTS;
use crate::scoring::observations::DEFAULT_VALUE_COLUMN;

/// Complete pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Stroke detection thresholds
    pub extraction: ExtractionParams,
    /// Days past today where the last drawn value is repeated
    pub horizon_days: f64,
    /// Rows tried from the end of the history when looking for an anchor value
    pub history_attempts: usize,
    /// CSV column holding the case counts
    pub value_column: String,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            extraction: ExtractionParams::default(),
            horizon_days: DEFAULT_HORIZON_DAYS,
            history_attempts: HISTORY_ATTEMPTS,
            value_column: DEFAULT_VALUE_COLUMN.to_string(),
        }
    }
}

impl ForecastConfig {
    /// Load config from file, or return defaults if file doesn't exist.
    pub fn load(config_path: &Path) -> Self {
        if !config_path.exists() {
            info!("{} not found. Using default config.", config_path.display());
            return Self::default();
        }

        match fs::read_to_string(config_path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    info!("Loaded config from {}", config_path.display());
                    return config;
                }
                Err(e) => warn!("Failed to parse config: {}. Using defaults.", e),
            },
            Err(e) => warn!("Failed to read config: {}. Using defaults.", e),
        }
        Self::default()
    }

    /// Save default config to file (for reference).
    pub fn save_default(config_path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&Self::default())
            .context("Failed to serialize default config")?;
        fs::write(config_path, json)
            .context(format!("Failed to write config: {}", config_path.display()))
    }
}
