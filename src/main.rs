//! Drawn Forecast
//!
//! Turns a line drawn on top of a case-count chart into a daily forecast and
//! scores stored forecasts against reported case counts as they come in.

use anyhow::{Result, anyhow};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use drawn_forecast::calibration::CalibrationFrame;
use drawn_forecast::config::ForecastConfig;
use drawn_forecast::export::export_to_json;
use drawn_forecast::extraction::{RasterImage, extract_line};
use drawn_forecast::paths;
use drawn_forecast::prediction::dates::{date_to_number, number_to_date};
use drawn_forecast::prediction::store::export_daily;
use drawn_forecast::prediction::{
    Anchor, RawPrediction, StoredPrediction, map_to_prediction, reconstruct_daily,
};
use drawn_forecast::scoring::comparison::write_csv;
use drawn_forecast::scoring::{self, ObservationSeries, ScoreResult, ScoreView};
use drawn_forecast::staging::StagingArea;

#[derive(Parser)]
#[command(name = "drawn-forecast")]
#[command(about = "Turn drawn chart lines into daily forecasts and score them", long_about = None)]
struct Cli {
    /// Config file (defaults to config.json next to the executable)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a prediction from a drawing on top of a reference chart
    Extract {
        /// Reference chart as rendered
        #[arg(long)]
        reference: PathBuf,
        /// Reference chart with the user's line drawn on it
        #[arg(long)]
        submission: PathBuf,
        /// Calibration frame JSON produced with the reference chart
        #[arg(long)]
        calibration: PathBuf,
        /// Observation CSV (OWID format)
        #[arg(long)]
        observations: PathBuf,
        #[arg(long)]
        location: String,
        /// Day the chart starts predicting from (defaults to today)
        #[arg(long)]
        today: Option<NaiveDate>,
        /// Name shown in rankings
        #[arg(long)]
        author: Option<String>,
        #[arg(long, default_value = "prediction.json")]
        out: PathBuf,
    },
    /// Write the daily reconstruction of a stored prediction
    Daily {
        #[arg(long)]
        prediction: PathBuf,
        #[arg(long, default_value = "daily.json")]
        out: PathBuf,
    },
    /// Score a stored prediction against reported observations
    Score {
        #[arg(long)]
        prediction: PathBuf,
        #[arg(long)]
        observations: PathBuf,
        /// Also write the score as JSON
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write reported vs. predicted values side by side as CSV
    Compare {
        #[arg(long)]
        prediction: PathBuf,
        #[arg(long)]
        observations: PathBuf,
        #[arg(long, default_value = "comparison.csv")]
        out: PathBuf,
    },
    /// Rank every stored prediction in a directory
    Leaderboard {
        #[arg(long)]
        predictions_dir: PathBuf,
        #[arg(long)]
        observations: PathBuf,
        #[arg(long, value_enum, default_value_t = ViewArg::Total)]
        view: ViewArg,
        /// Day of the score update (defaults to today)
        #[arg(long)]
        today: Option<NaiveDate>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Write the default configuration for reference
    InitConfig {
        #[arg(long, default_value = "config.json")]
        out: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ViewArg {
    Total,
    Daily,
}

impl From<ViewArg> for ScoreView {
    fn from(view: ViewArg) -> Self {
        match view {
            ViewArg::Total => ScoreView::Total,
            ViewArg::Daily => ScoreView::Daily,
        }
    }
}

/// Logs to stderr and to `<exe_dir>/logs/drawn_forecast.log`.
fn init_logging() {
    let file_layer = paths::ensure_directories()
        .and_then(|()| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(paths::get_log_file())
        })
        .ok()
        .map(|file| fmt::layer().with_ansi(false).with_writer(Mutex::new(file)));

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
}

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(paths::get_default_config);
    let config = ForecastConfig::load(&config_path);

    let result = match cli.command {
        Commands::Extract {
            reference,
            submission,
            calibration,
            observations,
            location,
            today,
            author,
            out,
        } => {
            let staging = StagingArea::new()?;
            let request = Submission {
                reference: &reference,
                submission: &submission,
                calibration: &calibration,
                observations: &observations,
                location: &location,
                today: today.unwrap_or_else(|| Local::now().date_naive()),
            };
            submit(&request, &config, &staging).and_then(|points| {
                let stored = StoredPrediction {
                    location: location.clone(),
                    author,
                    submitted_on: request.today,
                    points,
                };
                stored.save(&out)?;
                println!("Prediction saved: {}", out.display());
                Ok(())
            })
        }
        Commands::Daily { prediction, out } => {
            StoredPrediction::load(&prediction).and_then(|stored| {
                let daily = reconstruct_daily(&stored.points)?;
                export_daily(&daily, &out)?;
                println!("{} daily values saved: {}", daily.len(), out.display());
                Ok(())
            })
        }
        Commands::Score {
            prediction,
            observations,
            out,
        } => score_stored(&prediction, &observations, &config).and_then(|(stored, result)| {
            println!(
                "{}: total {:.3}, daily average {:.3}, last day {:.3} over {} days",
                stored.location,
                result.total_score,
                result.average_daily_score,
                result.last_day_score,
                result.days_compared
            );
            if let Some(out) = out {
                export_to_json(&result, &out)?;
                println!("Score saved: {}", out.display());
            }
            Ok(())
        }),
        Commands::Compare {
            prediction,
            observations,
            out,
        } => StoredPrediction::load(&prediction).and_then(|stored| {
            let series =
                ObservationSeries::from_csv(&observations, &stored.location, &config.value_column)?;
            let daily = reconstruct_daily(&stored.points)?;
            let rows = scoring::compare(&series.rows, &daily);
            write_csv(&rows, &out)?;
            println!("{} compared days saved: {}", rows.len(), out.display());
            Ok(())
        }),
        Commands::Leaderboard {
            predictions_dir,
            observations,
            view,
            today,
            limit,
        } => {
            let scores_update = today.unwrap_or_else(|| Local::now().date_naive());
            leaderboard(&predictions_dir, &observations, &config)
                .map(|scored| print_leaderboard(&scored, view.into(), scores_update, limit))
        }
        Commands::InitConfig { out } => ForecastConfig::save_default(&out).map(|()| {
            println!("Default config saved: {}", out.display());
        }),
    };

    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}

/// Inputs of one submitted drawing.
struct Submission<'a> {
    reference: &'a Path,
    submission: &'a Path,
    calibration: &'a Path,
    observations: &'a Path,
    location: &'a str,
    today: NaiveDate,
}

/// Stage the submission, then extract, map and reconstruct it.
///
/// The drawing is checked before the observation history, so an empty drawing
/// is reported even when the location has no readable data.
///
/// The daily reconstruction only validates the prediction here; callers store
/// the sparse points and reconstruct again when scoring.
fn submit(
    request: &Submission,
    config: &ForecastConfig,
    staging: &StagingArea,
) -> Result<RawPrediction> {
    let reference = RasterImage::load(request.reference)?;
    let frame = CalibrationFrame::load(request.calibration)?;

    staging.with_staged(request.submission, |staged| {
        let submission = RasterImage::load(staged)?;
        let estimates = extract_line(
            &reference,
            &submission,
            frame.column_range(),
            frame.row_range(),
            &config.extraction,
        )?;

        let series = ObservationSeries::from_csv(
            request.observations,
            request.location,
            &config.value_column,
        )?;
        let last = series.last_known_value(config.history_attempts)?;
        info!(
            location = request.location,
            date = %last.date,
            cases = last.cases,
            "Anchoring prediction on last known value"
        );

        let anchor = Anchor {
            today: date_to_number(request.today),
            last_value: last.cases,
        };
        let raw = map_to_prediction(&estimates, &frame, anchor, config.horizon_days)?;
        let daily = reconstruct_daily(&raw)?;

        let span = daily
            .keys()
            .next()
            .zip(daily.keys().next_back())
            .and_then(|(&first, &last)| {
                Some((number_to_date(first as f64)?, number_to_date(last as f64)?))
            })
            .ok_or_else(|| anyhow!("Prediction covers no full day"))?;
        info!(
            points = raw.len(),
            days = daily.len(),
            "Prediction covers {} to {}",
            span.0,
            span.1
        );
        Ok(raw)
    })
}

fn score_stored(
    prediction: &Path,
    observations: &Path,
    config: &ForecastConfig,
) -> Result<(StoredPrediction, ScoreResult)> {
    let stored = StoredPrediction::load(prediction)?;
    let series = ObservationSeries::from_csv(observations, &stored.location, &config.value_column)?;
    let daily = reconstruct_daily(&stored.points)?;
    let result = scoring::score_prediction(&stored.location, &series.rows, &daily);
    Ok((stored, result))
}

/// Scores every stored prediction in `dir`. Observations are read once per location.
fn leaderboard(
    dir: &Path,
    observations: &Path,
    config: &ForecastConfig,
) -> Result<Vec<(StoredPrediction, ScoreResult)>> {
    let mut series_by_location: HashMap<String, ObservationSeries> = HashMap::new();
    let mut scored = Vec::new();

    for (path, stored) in StoredPrediction::load_dir(dir)? {
        let daily = match reconstruct_daily(&stored.points) {
            Ok(daily) => daily,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };
        if !series_by_location.contains_key(&stored.location) {
            let series =
                ObservationSeries::from_csv(observations, &stored.location, &config.value_column)?;
            series_by_location.insert(stored.location.clone(), series);
        }
        let rows = &series_by_location[&stored.location].rows;
        let result = scoring::score_prediction(&stored.location, rows, &daily);
        scored.push((stored, result));
    }

    info!("Scored {} predictions", scored.len());
    Ok(scored)
}

fn print_leaderboard(
    scored: &[(StoredPrediction, ScoreResult)],
    view: ScoreView,
    scores_update: NaiveDate,
    limit: usize,
) {
    let entries = scoring::rank(scored, view, scores_update);
    for entry in entries.iter().take(limit) {
        println!(
            "#{} {} {:.3}: {}",
            entry.rank, entry.location, entry.score, entry.name
        );
    }
    println!("\ntotal predictions: {}", entries.len());
}
