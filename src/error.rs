//! Error taxonomy for the forecast pipeline.
//!
//! The `Display` text of each variant is the short message shown to the user.

/// Failures raised by extraction, mapping, reconstruction and anchor lookup.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ForecastError {
    /// Submission raster dimensions differ from the reference raster.
    #[error("The size of the submitted image is not equal to the original size. Please try again.")]
    DimensionMismatch {
        reference: (u32, u32),
        submission: (u32, u32),
    },

    /// No column exceeded the noise floor, or no column yielded an estimate.
    #[error("No line was found. Please try again.")]
    NoLineDetected,

    /// No parseable observation within the allowed attempts.
    #[error("There is no readable data for {location}.")]
    NoReadableHistory { location: String },

    /// A single non-numeric case count. Logged and skipped, never fatal.
    #[error("No valid data for {date} available (got {value:?}).")]
    UnparseableObservation { date: String, value: String },

    /// A raw prediction needs an anchor plus at least one further point.
    #[error("A prediction needs at least 2 points, got {count}.")]
    InsufficientPoints { count: usize },
}

pub type ForecastResult<T> = Result<T, ForecastError>;
