//! Ranking of scored predictions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::scorer::ScoreResult;
use crate::prediction::StoredPrediction;
use crate::prediction::dates::number_to_date;

/// Which figure predictions are ranked by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreView {
    /// Accumulated score; long-running predictions collect more
    #[default]
    Total,
    /// Total divided by the days since the prediction started
    Daily,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub name: String,
    pub location: String,
    pub score: f64,
}

/// Ranks scored predictions, best first.
///
/// In the daily view a prediction's total is divided by the number of days
/// between its first inserted point (the anchor) and `scores_update`, both
/// included.
pub fn rank(
    scored: &[(StoredPrediction, ScoreResult)],
    view: ScoreView,
    scores_update: NaiveDate,
) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = scored
        .iter()
        .map(|(prediction, result)| LeaderboardEntry {
            rank: 0,
            name: prediction
                .author
                .clone()
                .unwrap_or_else(|| "anonymous".to_string()),
            location: prediction.location.clone(),
            score: match view {
                ScoreView::Total => result.total_score,
                ScoreView::Daily => daily_score(prediction, result, scores_update),
            },
        })
        .collect();

    entries.sort_by(|a, b| b.score.total_cmp(&a.score));
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i + 1;
    }
    entries
}

fn daily_score(
    prediction: &StoredPrediction,
    result: &ScoreResult,
    scores_update: NaiveDate,
) -> f64 {
    let Some(start) = prediction.points.first_date().and_then(number_to_date) else {
        return 0.0;
    };
    let included_days = (scores_update - start).num_days() + 1;
    if included_days > 0 {
        result.total_score / included_days as f64
    } else {
        0.0
    }
}
