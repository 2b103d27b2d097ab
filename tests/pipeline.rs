use chrono::{Days, NaiveDate};
use image::{ImageBuffer, Rgb, RgbImage};
use std::io::Write;
use std::path::Path;
use tempfile::{NamedTempFile, tempdir};

use drawn_forecast::ForecastError;
use drawn_forecast::calibration::CalibrationFrame;
use drawn_forecast::config::ForecastConfig;
use drawn_forecast::extraction::{RasterImage, extract_line};
use drawn_forecast::prediction::dates::date_to_number;
use drawn_forecast::prediction::{Anchor, StoredPrediction, map_to_prediction, reconstruct_daily};
use drawn_forecast::scoring::{Observation, ObservationSeries, score_prediction};
use drawn_forecast::staging::StagingArea;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLUE: Rgb<u8> = Rgb([31, 119, 180]);

/// 100x80 drawable area at (10, 10); 1.5 days and 5 cases per pixel.
fn frame() -> CalibrationFrame {
    CalibrationFrame {
        origin_x: 10.0,
        origin_y: 10.0,
        corner_x: 110.0,
        corner_y: 90.0,
        x_scale: 1.5,
        y_scale: 5.0,
    }
}

fn reference_chart() -> RgbImage {
    ImageBuffer::from_pixel(120, 100, WHITE)
}

/// Reference chart plus a 3-pixel stroke on rows 50..53 across the drawable area.
fn drawn_chart() -> RgbImage {
    ImageBuffer::from_fn(120, 100, |x, y| {
        if (10..110).contains(&x) && (50..53).contains(&y) {
            BLUE
        } else {
            WHITE
        }
    })
}

fn save(img: &RgbImage, dir: &Path, name: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    img.save(&path).unwrap();
    path
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn history_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        "iso_code,location,date,new_cases,new_cases_smoothed
DEU,Germany,2020-12-29,180,190.0
DEU,Germany,2020-12-30,200,195.0
DEU,Germany,2020-12-31,,
ITA,Italy,2020-12-31,300,310.0
DEU,Germany,2021-01-01,,
"
    )
    .unwrap();
    file
}

#[test]
fn drawing_to_score() {
    let dir = tempdir().unwrap();
    let reference_path = save(&reference_chart(), dir.path(), "reference.png");
    let submission_path = save(&drawn_chart(), dir.path(), "submission.png");
    let config = ForecastConfig::default();
    let frame = frame();
    let today = ymd(2021, 1, 1);

    let history = history_csv();
    let series =
        ObservationSeries::from_csv(history.path(), "Germany", &config.value_column).unwrap();
    let last = series.last_known_value(config.history_attempts).unwrap();
    assert_eq!(last.date, "2020-12-30");
    assert_eq!(last.cases, 195.0);

    let reference = RasterImage::load(&reference_path).unwrap();
    let staging = StagingArea::new().unwrap();
    let raw = staging
        .with_staged(&submission_path, |staged| {
            let submission = RasterImage::load(staged)?;
            let line = extract_line(
                &reference,
                &submission,
                frame.column_range(),
                frame.row_range(),
                &config.extraction,
            )?;
            assert_eq!(line.len(), 100);
            assert!(line.iter().all(|e| *e == Some(41.0)));

            let anchor = Anchor {
                today: date_to_number(today),
                last_value: last.cases,
            };
            Ok(map_to_prediction(&line, &frame, anchor, config.horizon_days)?)
        })
        .unwrap();

    // anchor + 100 columns + horizon, column 0 replaces the anchor's value
    assert_eq!(raw.len(), 101);
    assert!(raw.points().iter().all(|p| p.cases == 195.0));

    let daily = reconstruct_daily(&raw).unwrap();
    assert_eq!(daily.len(), 150);
    assert_eq!(daily.keys().next(), Some(&(date_to_number(today) as i64)));

    let mut observed: Vec<Observation> = (0..10)
        .map(|i| {
            let date = today + Days::new(i);
            Observation::new(date.format("%Y-%m-%d").to_string(), "195")
        })
        .collect();
    observed.push(Observation::new("2021-01-11", ""));
    observed.push(Observation::new("2021-01-12", "97.5"));
    observed.push(Observation::new("2021-01-14", "195"));

    let result = score_prediction("Germany", &observed, &daily);

    assert_eq!(result.days_compared, 11);
    assert!((result.total_score - 10.5).abs() < 1e-9);
    assert!((result.last_day_score - 0.5).abs() < 1e-9);
    assert!((result.average_daily_score - 10.5 / 11.0).abs() < 1e-9);

    let stored = StoredPrediction {
        location: "Germany".to_string(),
        author: None,
        submitted_on: today,
        points: raw,
    };
    let stored_path = dir.path().join("prediction.json");
    stored.save(&stored_path).unwrap();
    let reloaded = StoredPrediction::load(&stored_path).unwrap();
    let rescored = score_prediction(
        "Germany",
        &observed,
        &reconstruct_daily(&reloaded.points).unwrap(),
    );
    assert_eq!(rescored, result);
}

#[test]
fn undrawn_chart_reports_no_line() {
    let dir = tempdir().unwrap();
    let path = save(&reference_chart(), dir.path(), "reference.png");
    let reference = RasterImage::load(&path).unwrap();
    let frame = frame();

    let result = extract_line(
        &reference,
        &reference,
        frame.column_range(),
        frame.row_range(),
        &ForecastConfig::default().extraction,
    );

    assert_eq!(result, Err(ForecastError::NoLineDetected));
}

#[test]
fn resized_submission_reports_mismatch() {
    let reference = RasterImage::from_rgb(&reference_chart());
    let small: RgbImage = ImageBuffer::from_pixel(60, 50, WHITE);
    let submission = RasterImage::from_rgb(&small);
    let frame = frame();

    let result = extract_line(
        &reference,
        &submission,
        frame.column_range(),
        frame.row_range(),
        &ForecastConfig::default().extraction,
    );

    let err = result.unwrap_err();
    assert!(matches!(err, ForecastError::DimensionMismatch { .. }));
    assert!(err.to_string().contains("size of the submitted image"));
}

#[test]
fn unreadable_history_is_fatal() {
    let series = ObservationSeries::new(
        "Germany",
        vec![
            Observation::new("2021-01-01", "12"),
            Observation::new("2021-01-02", ""),
            Observation::new("2021-01-03", "n/a"),
            Observation::new("2021-01-04", ""),
        ],
    );

    let err = series.last_known_value(3).unwrap_err();
    assert_eq!(err.to_string(), "There is no readable data for Germany.");
}
