//! Calibration of a rendered chart.
//!
//! A chart renderer produces one [`CalibrationFrame`] per chart image. The
//! frame is handed back unchanged together with the user's submission and maps
//! pixel positions inside the drawable area to dates and case counts.

pub mod frame;

pub use frame::CalibrationFrame;
