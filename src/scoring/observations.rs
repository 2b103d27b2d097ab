//! Reported case counts for one location.
//!
//! Reads OWID-style CSV exports: one row per (location, date) with many
//! columns, of which only `location`, `date` and the configured value column
//! are used. Case counts stay raw strings because unreported days are empty.

use anyhow::{Context, Result, anyhow};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{ForecastError, ForecastResult};

/// Default value column of the OWID dataset.
pub const DEFAULT_VALUE_COLUMN: &str = "new_cases_smoothed";
/// Rows inspected from the tail when looking for the last readable value.
pub const HISTORY_ATTEMPTS: usize = 3;

/// One reported day, as found in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// ISO date string (`YYYY-MM-DD`)
    pub date: String,
    /// Case count string; may be empty or otherwise non-numeric
    pub cases: String,
}

impl Observation {
    pub fn new(date: impl Into<String>, cases: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            cases: cases.into(),
        }
    }

    /// Parses the case count. Non-finite values count as unparseable.
    pub fn parse_cases(&self) -> ForecastResult<f64> {
        match self.cases.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(ForecastError::UnparseableObservation {
                date: self.date.clone(),
                value: self.cases.clone(),
            }),
        }
    }
}

/// The last parseable observation of a series.
#[derive(Debug, Clone, PartialEq)]
pub struct LastKnown {
    pub date: String,
    pub cases: f64,
}

/// Chronological observations of a single location.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationSeries {
    pub location: String,
    pub rows: Vec<Observation>,
}

impl ObservationSeries {
    pub fn new(location: impl Into<String>, rows: Vec<Observation>) -> Self {
        Self {
            location: location.into(),
            rows,
        }
    }

    /// Loads the rows of `location` from a CSV file.
    pub fn from_csv(path: &Path, location: &str, value_column: &str) -> Result<Self> {
        let file = std::fs::File::open(path)
            .context(format!("Failed to open CSV file: {}", path.display()))?;
        let series = Self::from_reader(file, location, value_column)?;
        info!(
            location,
            rows = series.rows.len(),
            "Loaded observations from {}",
            path.display()
        );
        Ok(series)
    }

    /// Loads the rows of `location` from any CSV source with a header row.
    ///
    /// Malformed records are skipped with a warning.
    pub fn from_reader<R: Read>(source: R, location: &str, value_column: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);
        let headers = reader.headers().context("Failed to read CSV header")?.clone();

        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| anyhow!("CSV has no '{}' column", name))
        };
        let location_idx = column("location")?;
        let date_idx = column("date")?;
        let value_idx = column(value_column)?;

        let mut rows = Vec::new();
        for (line_num, record) in reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping malformed CSV row {}: {}", line_num + 2, e);
                    continue;
                }
            };
            if record.get(location_idx) != Some(location) {
                continue;
            }
            let (Some(date), value) = (record.get(date_idx), record.get(value_idx)) else {
                warn!("Skipping CSV row {} without a date", line_num + 2);
                continue;
            };
            rows.push(Observation::new(date, value.unwrap_or("")));
        }

        Ok(Self::new(location, rows))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Last parseable observation, trying at most `attempts` rows from the end.
    ///
    /// Each unreadable row is logged. Running out of attempts (or rows) is a
    /// hard [`ForecastError::NoReadableHistory`].
    pub fn last_known_value(&self, attempts: usize) -> ForecastResult<LastKnown> {
        for (attempt, row) in self.rows.iter().rev().take(attempts).enumerate() {
            match row.parse_cases() {
                Ok(cases) => {
                    return Ok(LastKnown {
                        date: row.date.clone(),
                        cases,
                    });
                }
                Err(e) => warn!(
                    location = %self.location,
                    attempt = attempt + 1,
                    "{}",
                    e
                ),
            }
        }

        Err(ForecastError::NoReadableHistory {
            location: self.location.clone(),
        })
    }
}
