//! Core types and constants for the anchor calibration system

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
