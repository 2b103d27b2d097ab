//! Day-by-day accuracy of a daily prediction.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::observations::Observation;
use crate::prediction::DailyPrediction;
use crate::prediction::dates::{date_to_number, parse_iso_date};

/// Outcome of one scoring pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Sum of all per-day scores
    pub total_score: f64,
    /// `total_score / days_compared`, 0 when nothing scored
    pub average_daily_score: f64,
    /// Score of the most recent compared day
    pub last_day_score: f64,
    /// Number of days that contributed to the total
    pub days_compared: usize,
}

/// Symmetric ratio `min(a/p, p/a)` in `[0, 1]`.
///
/// Both zero scores 1, exactly one zero scores 0.
pub fn symmetric_ratio(actual: f64, predicted: f64) -> f64 {
    if actual == 0.0 || predicted == 0.0 {
        return if actual == predicted { 1.0 } else { 0.0 };
    }
    (actual / predicted).min(predicted / actual)
}

/// Scores `daily` against the reported observations of `location`.
///
/// Predicted days are visited in ascending order. The first day without a
/// matching observation ends the pass (later days are not reported yet).
/// Matching days with an unreadable case count are logged and skipped.
pub fn score_prediction(
    location: &str,
    observations: &[Observation],
    daily: &DailyPrediction,
) -> ScoreResult {
    let mut total_score = 0.0;
    let mut last_day_score = 0.0;
    let mut days_compared = 0;

    for (&day, &predicted) in daily {
        let Some(observation) = find_day(observations, day) else {
            debug!(location, day, "No observation yet, stopping");
            break;
        };

        let actual = match observation.parse_cases() {
            Ok(actual) => actual,
            Err(e) => {
                warn!(location, "{}", e);
                continue;
            }
        };

        last_day_score = symmetric_ratio(actual, predicted);
        total_score += last_day_score;
        days_compared += 1;
    }

    let average_daily_score = if days_compared > 0 && total_score != 0.0 {
        total_score / days_compared as f64
    } else {
        0.0
    };

    ScoreResult {
        total_score,
        average_daily_score,
        last_day_score,
        days_compared,
    }
}

/// First observation dated on `day`. Rows with unreadable dates never match.
fn find_day(observations: &[Observation], day: i64) -> Option<&Observation> {
    observations.iter().find(|o| {
        parse_iso_date(&o.date).is_some_and(|date| date_to_number(date) == day as f64)
    })
}
