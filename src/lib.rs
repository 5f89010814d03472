//! Anchor Calibration System
//!
//! Calibrates the positions of four fixed range-measuring anchors from
//! distance samples taken at four unknown transmitter locations, using an
//! evolutionary search over candidate layouts scored by a multi-resolution
//! hill-climb locator.

pub mod core;
pub mod algorithms;
pub mod validation;
pub mod utils;
pub mod api;

// Re-export commonly used types
pub use crate::core::{
    AnchorLayout, CalibrationOutcome, EvolveOutcome, MeasurementMatrix, Population, StopReason,
};
pub use crate::algorithms::{arc_residual, Calibrator, FitnessEvaluator, GridLocator, MutationRng};
pub use crate::validation::{MeasurementValidator, ValidationReport};
pub use crate::utils::{CalibrationConfig, ConfigError, RefinementPass};
pub use crate::api::{CalibrationFormatter, CalibrationReport};
