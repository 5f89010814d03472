//! Layout fitness scoring across a full measurement set

use crate::algorithms::locator::GridLocator;
use crate::core::{AnchorLayout, MeasurementMatrix, Population, SAMPLE_COUNT};

/// Scores candidate layouts against every measurement sample
///
/// The score of a layout is the mean of the locator's best-fit residuals
/// over the four measurement rows; lower is better, zero is a layout that
/// explains every sample exactly.
pub struct FitnessEvaluator {
    locator: GridLocator,
}

impl Default for FitnessEvaluator {
    fn default() -> Self {
        Self {
            locator: GridLocator::default(),
        }
    }
}

impl FitnessEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an evaluator around a custom-configured locator
    pub fn with_locator(locator: GridLocator) -> Self {
        Self { locator }
    }

    /// Write the mean best-fit residual over all measurement rows into the
    /// layout's fitness field; the anchor coordinates are left untouched
    pub fn evaluate(&self, layout: &mut AnchorLayout, measurements: &MeasurementMatrix) {
        let total: f64 = measurements
            .rows()
            .iter()
            .map(|row| self.locator.locate(layout, row).residual)
            .sum();
        layout.fitness = total / SAMPLE_COUNT as f64;
    }

    /// Evaluate every member of a population
    pub fn evaluate_all(&self, population: &mut Population, measurements: &MeasurementMatrix) {
        for member in population.members_mut() {
            self.evaluate(member, measurements);
        }
    }
}
