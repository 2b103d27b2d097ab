//! Scoring of daily predictions against reported observations.
//!
//! This module provides:
//! - CSV reading of reported case counts per location
//! - Last-known-value lookup used to anchor new predictions
//! - Day-by-day symmetric ratio scoring
//! - Reported vs. predicted comparison export
//! - Rankings by total or daily-average score

pub mod comparison;
pub mod leaderboard;
pub mod observations;
pub mod scorer;

pub use comparison::{ComparisonRow, compare};
pub use leaderboard::{LeaderboardEntry, ScoreView, rank};
pub use observations::{HISTORY_ATTEMPTS, LastKnown, Observation, ObservationSeries};
pub use scorer::{ScoreResult, score_prediction, symmetric_ratio};
