//! Utility modules

pub mod config;

pub use config::{CalibrationConfig, ConfigError, LocatorConfig, RefinementPass};
