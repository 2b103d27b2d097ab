//! JSON persistence of submitted predictions.
//!
//! A stored prediction is written once when a submission is confirmed and read
//! back every time it is re-scored against fresher observations.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use super::daily::DailyPrediction;
use super::mapper::RawPrediction;
use crate::export::export_to_json;

/// A user's prediction for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPrediction {
    /// Location the prediction was drawn for (e.g. "Germany")
    pub location: String,
    /// Display name for rankings; `None` keeps the author anonymous
    #[serde(default)]
    pub author: Option<String>,
    /// Day the prediction was submitted
    pub submitted_on: NaiveDate,
    /// Sparse prediction points, anchor first
    pub points: RawPrediction,
}

impl StoredPrediction {
    /// Writes the prediction as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        export_to_json(self, path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read prediction: {}", path.display()))?;
        serde_json::from_str(&content)
            .context(format!("Failed to parse prediction: {}", path.display()))
    }

    /// Loads every `*.json` prediction in `dir`, sorted by file name.
    ///
    /// Files that fail to parse are skipped with a warning.
    pub fn load_dir(dir: &Path) -> Result<Vec<(PathBuf, Self)>> {
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .context(format!("Failed to read directory: {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut predictions = Vec::with_capacity(paths.len());
        for path in paths {
            match Self::load(&path) {
                Ok(prediction) => predictions.push((path, prediction)),
                Err(e) => warn!("Skipping {}: {:#}", path.display(), e),
            }
        }
        Ok(predictions)
    }
}

/// Writes a daily prediction as pretty-printed JSON (`{"18322": 41.5, ...}`).
pub fn export_daily(daily: &DailyPrediction, path: &Path) -> Result<()> {
    export_to_json(daily, path)
}
