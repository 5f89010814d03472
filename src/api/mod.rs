//! Output surfaces for calibration results

pub mod formatting;

pub use formatting::{AnchorRecord, CalibrationFormatter, CalibrationReport, PassRecord};
