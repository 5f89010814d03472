//! Measurement validation and quality assurance

pub mod data;

pub use data::{MeasurementError, MeasurementValidator, ValidationConfig, ValidationReport};
