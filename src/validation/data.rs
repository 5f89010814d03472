use std::fmt;

use crate::core::{MeasurementMatrix, ANCHOR_COUNT, SAMPLE_COUNT};

/// Configuration for measurement validation parameters
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Longest range considered plausible for the sensing area (units)
    pub max_plausible_range: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            // Roughly twice the diagonal of the default 3000x1800 area
            max_plausible_range: 7000.0,
        }
    }
}

/// Hard errors that make a measurement matrix unusable for calibration
#[derive(Debug, Clone, PartialEq)]
pub enum MeasurementError {
    NonFiniteRange { sample: usize, anchor: usize },
    NegativeRange { sample: usize, anchor: usize, value: f64 },
}

impl fmt::Display for MeasurementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasurementError::NonFiniteRange { sample, anchor } => {
                write!(
                    f,
                    "Non-finite range for sample {} anchor {}",
                    sample, anchor
                )
            }
            MeasurementError::NegativeRange {
                sample,
                anchor,
                value,
            } => {
                write!(
                    f,
                    "Negative range for sample {} anchor {}: {:.2}",
                    sample, anchor, value
                )
            }
        }
    }
}

impl std::error::Error for MeasurementError {}

/// Validation result with hard errors and advisory warnings
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<MeasurementError>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Whether the matrix can be handed to the calibrator
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validator for measurement matrices
///
/// The calibration core itself accepts any matrix it is given; running the
/// validator first is the caller's chance to reject broken input and to see
/// warnings about measurements that will degrade the search.
pub struct MeasurementValidator {
    config: ValidationConfig,
}

impl MeasurementValidator {
    /// Create a validator with default configuration
    pub fn new() -> Self {
        Self {
            config: ValidationConfig::default(),
        }
    }

    /// Create a validator with custom configuration
    pub fn with_config(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate one measurement matrix
    pub fn validate(&self, matrix: &MeasurementMatrix) -> ValidationReport {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        for sample in 0..SAMPLE_COUNT {
            for anchor in 0..ANCHOR_COUNT {
                let value = matrix.row(sample)[anchor];

                if !value.is_finite() {
                    errors.push(MeasurementError::NonFiniteRange { sample, anchor });
                    continue;
                }
                if value < 0.0 {
                    errors.push(MeasurementError::NegativeRange {
                        sample,
                        anchor,
                        value,
                    });
                    continue;
                }

                if value == 0.0 {
                    warnings.push(format!(
                        "Zero range for sample {} anchor {}: transmitter sits on the anchor",
                        sample, anchor
                    ));
                }
                if value > self.config.max_plausible_range {
                    warnings.push(format!(
                        "Range {:.1} for sample {} anchor {} exceeds the plausible span of {:.1}",
                        value, sample, anchor, self.config.max_plausible_range
                    ));
                }
            }
        }

        // Identical rows mean two samples were taken from the same spot,
        // which leaves the layout under-constrained.
        for i in 0..SAMPLE_COUNT {
            for j in (i + 1)..SAMPLE_COUNT {
                if matrix.row(i) == matrix.row(j) {
                    warnings.push(format!(
                        "Samples {} and {} carry identical ranges; duplicate transmitter position",
                        i, j
                    ));
                }
            }
        }

        ValidationReport { errors, warnings }
    }
}

impl Default for MeasurementValidator {
    fn default() -> Self {
        Self::new()
    }
}
