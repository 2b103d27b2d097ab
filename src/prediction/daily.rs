//! Piecewise-linear reconstruction of one predicted value per day.

use std::collections::BTreeMap;

use tracing::warn;

use super::mapper::{PredictionPoint, RawPrediction};
use crate::error::{ForecastError, ForecastResult};

/// Dense prediction keyed by whole date number.
pub type DailyPrediction = BTreeMap<i64, f64>;

/// Expands a sparse prediction into one value per day.
///
/// Days are walked from the first breakpoint in steps of one, up to but
/// excluding the last breakpoint. Each day is interpolated between the two
/// breakpoints surrounding it and clamped at zero.
pub fn reconstruct_daily(prediction: &RawPrediction) -> ForecastResult<DailyPrediction> {
    let points = drop_legacy_leading_anchor(prediction.points());
    if points.len() < 2 {
        return Err(ForecastError::InsufficientPoints {
            count: points.len(),
        });
    }

    let mut breakpoints = points.to_vec();
    breakpoints.sort_by(|a, b| a.date.total_cmp(&b.date));

    let end = breakpoints[breakpoints.len() - 1].date;
    let mut current = breakpoints[0].date;
    let mut index = 0;
    let mut daily = DailyPrediction::new();

    while current < end {
        let lower = breakpoints[index];
        let upper = breakpoints[index + 1];
        if current > upper.date {
            index += 1;
            continue;
        }

        let span = upper.date - lower.date;
        debug_assert!(span > 0.0, "duplicate breakpoint at {}", lower.date);
        let cases =
            (lower.cases * (upper.date - current) + upper.cases * (current - lower.date)) / span;

        daily.insert(current.trunc() as i64, cases.max(0.0));
        current += 1.0;
    }

    Ok(daily)
}

/// Predictions saved by older versions sometimes carry a stray first point
/// dated after the second one. Such a point is dropped.
// TODO: remove once stored predictions are migrated to anchor-first order.
fn drop_legacy_leading_anchor(points: &[PredictionPoint]) -> &[PredictionPoint] {
    match points {
        [first, second, rest @ ..] if first.date > second.date => {
            warn!(
                dropped = first.date,
                remaining = rest.len() + 1,
                "Dropping out-of-order leading point from legacy prediction"
            );
            &points[1..]
        }
        _ => points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(points: &[(f64, f64)]) -> RawPrediction {
        points.iter().copied().collect()
    }

    #[test]
    fn test_linear_trend() {
        let daily = reconstruct_daily(&raw(&[(100.0, 50.0), (110.0, 60.0)])).unwrap();

        assert_eq!(daily.len(), 10);
        assert!((daily[&100] - 50.0).abs() < 1e-9);
        assert!((daily[&105] - 55.0).abs() < 1e-9);
        assert!((daily[&109] - 59.0).abs() < 1e-9);
        assert!(!daily.contains_key(&110));
    }

    #[test]
    fn test_keys_contiguous_over_half_open_range() {
        let daily =
            reconstruct_daily(&raw(&[(10.0, 1.0), (13.0, 4.0), (20.0, 0.0), (25.0, 3.0)])).unwrap();

        let keys: Vec<i64> = daily.keys().copied().collect();
        assert_eq!(keys, (10..25).collect::<Vec<_>>());
    }

    #[test]
    fn test_breakpoints_reproduced_exactly() {
        let points = [(0.0, 10.0), (3.0, 40.0), (7.0, 0.0), (10.0, 5.0)];
        let daily = reconstruct_daily(&raw(&points)).unwrap();

        for &(date, cases) in &points[..3] {
            assert!((daily[&(date as i64)] - cases).abs() < 1e-9);
        }
        assert!((daily[&5] - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let daily =
            reconstruct_daily(&raw(&[(100.0, 50.0), (110.0, 60.0), (105.0, 0.0)])).unwrap();

        assert!((daily[&105]).abs() < 1e-9);
        assert!((daily[&102] - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_legacy_leading_point_dropped() {
        let daily =
            reconstruct_daily(&raw(&[(200.0, 5.0), (100.0, 50.0), (110.0, 60.0)])).unwrap();

        assert_eq!(daily.keys().next(), Some(&100));
        assert_eq!(daily.keys().last(), Some(&109));
        assert!((daily[&105] - 55.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_values_clamped() {
        let daily = reconstruct_daily(&raw(&[(0.0, -10.0), (4.0, 10.0)])).unwrap();

        assert_eq!(daily[&0], 0.0);
        assert_eq!(daily[&1], 0.0);
        assert_eq!(daily[&2], 0.0);
        assert!((daily[&3] - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_fractional_start_truncates_keys() {
        let daily = reconstruct_daily(&raw(&[(100.5, 10.0), (103.5, 40.0)])).unwrap();

        let keys: Vec<i64> = daily.keys().copied().collect();
        assert_eq!(keys, vec![100, 101, 102]);
        assert!((daily[&101] - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_fewer_than_two_points_fail() {
        assert_eq!(
            reconstruct_daily(&raw(&[(1.0, 1.0)])),
            Err(ForecastError::InsufficientPoints { count: 1 })
        );
        assert_eq!(
            reconstruct_daily(&RawPrediction::new()),
            Err(ForecastError::InsufficientPoints { count: 0 })
        );
    }

    #[test]
    fn test_legacy_drop_can_leave_too_few_points() {
        assert_eq!(
            reconstruct_daily(&raw(&[(5.0, 1.0), (1.0, 1.0)])),
            Err(ForecastError::InsufficientPoints { count: 1 })
        );
    }
}
