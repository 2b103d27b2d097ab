//! Date numbers: continuous day counts since 1970-01-01.
//!
//! Stored predictions key their points by date number, so `1.5` is noon of
//! 1970-01-02. Whole days map to whole numbers.

use chrono::{Datelike, NaiveDate};

/// `num_days_from_ce` of 1970-01-01.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Date number of the start of `date`.
pub fn date_to_number(date: NaiveDate) -> f64 {
    (date.num_days_from_ce() - EPOCH_DAYS_FROM_CE) as f64
}

/// Calendar day containing the date number, if representable.
pub fn number_to_date(number: f64) -> Option<NaiveDate> {
    let days = number.floor();
    if !days.is_finite() || days.abs() > i32::MAX as f64 / 2.0 {
        return None;
    }
    NaiveDate::from_num_days_from_ce_opt(days as i32 + EPOCH_DAYS_FROM_CE)
}

/// Parses an ISO `YYYY-MM-DD` date string.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}
