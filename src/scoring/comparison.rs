//! Reported vs. predicted values on the days both exist.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;

use super::observations::Observation;
use crate::prediction::DailyPrediction;
use crate::prediction::dates::{date_to_number, parse_iso_date};

/// One day present in both the observations and the prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub date: NaiveDate,
    pub actual: f64,
    pub predicted: f64,
}

/// Pairs every readable observation with the predicted value for its day.
///
/// Unlike scoring, gaps do not end the comparison: unreadable rows and days
/// outside the prediction are simply left out.
pub fn compare(observations: &[Observation], daily: &DailyPrediction) -> Vec<ComparisonRow> {
    observations
        .iter()
        .filter_map(|o| {
            let date = parse_iso_date(&o.date)?;
            let predicted = *daily.get(&(date_to_number(date) as i64))?;
            let actual = o.parse_cases().ok()?;
            Some(ComparisonRow {
                date,
                actual,
                predicted,
            })
        })
        .collect()
}

/// Writes comparison rows as CSV with a `date,actual,predicted` header.
pub fn write_csv(rows: &[ComparisonRow], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .context(format!("Failed to create CSV file: {}", path.display()))?;
    for row in rows {
        writer.serialize(row).context("Failed to write CSV row")?;
    }
    writer.flush().context("Failed to flush CSV file")?;
    Ok(())
}
