//! Core data types for the anchor calibration system

use nalgebra::Vector2;

use crate::core::constants::{ANCHOR_COUNT, SAMPLE_COUNT, UNEVALUATED_FITNESS};

/// Candidate anchor layout with its fitness score
///
/// The fitness value is meaningful only if it was computed from the current
/// anchor coordinates; mutating the coordinates does not invalidate it.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorLayout {
    /// Anchor positions in survey-plane coordinates
    pub anchors: [Vector2<f64>; ANCHOR_COUNT],
    /// Mean locator residual over all measurement samples
    pub fitness: f64,
}

impl AnchorLayout {
    /// Create a layout with the given anchor positions and an unevaluated fitness
    pub fn new(anchors: [Vector2<f64>; ANCHOR_COUNT]) -> Self {
        Self {
            anchors,
            fitness: UNEVALUATED_FITNESS,
        }
    }

    /// Rectangular layout spanning the given area: top-left, top-right,
    /// origin (the pinned anchor), bottom-right
    pub fn corners(width: f64, height: f64) -> Self {
        Self::new([
            Vector2::new(0.0, height),
            Vector2::new(width, height),
            Vector2::new(0.0, 0.0),
            Vector2::new(width, 0.0),
        ])
    }

    /// Flat coordinate export (x1, y1, .., x4, y4) for the positioning subsystem
    pub fn coordinates(&self) -> [f64; ANCHOR_COUNT * 2] {
        let mut out = [0.0; ANCHOR_COUNT * 2];
        for (k, anchor) in self.anchors.iter().enumerate() {
            out[2 * k] = anchor.x;
            out[2 * k + 1] = anchor.y;
        }
        out
    }
}

/// Ordered collection of candidate layouts
///
/// After a sort step the members are non-decreasing in fitness magnitude and
/// index 0 holds the current best layout.
#[derive(Debug, Clone)]
pub struct Population {
    members: Vec<AnchorLayout>,
}

impl Population {
    /// Build a population of `size` clones of the seed layout
    pub fn seeded(seed: AnchorLayout, size: usize) -> Self {
        Self {
            members: vec![seed; size],
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The layout at index 0; the current best after a sort step
    pub fn best(&self) -> &AnchorLayout {
        &self.members[0]
    }

    pub fn members(&self) -> &[AnchorLayout] {
        &self.members
    }

    pub fn members_mut(&mut self) -> &mut [AnchorLayout] {
        &mut self.members
    }
}

/// 4x4 matrix of measured ranges
///
/// Row `s`, column `k` is the range measured from anchor `k` at sample
/// transmitter position `s`. Immutable for the duration of one calibration run.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementMatrix {
    rows: [[f64; ANCHOR_COUNT]; SAMPLE_COUNT],
}

impl MeasurementMatrix {
    pub fn new(rows: [[f64; ANCHOR_COUNT]; SAMPLE_COUNT]) -> Self {
        Self { rows }
    }

    /// Build from parsed input rows, checking the 4x4 shape
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, String> {
        if rows.len() != SAMPLE_COUNT {
            return Err(format!(
                "Expected {} measurement rows, got {}",
                SAMPLE_COUNT,
                rows.len()
            ));
        }
        let mut out = [[0.0; ANCHOR_COUNT]; SAMPLE_COUNT];
        for (s, row) in rows.iter().enumerate() {
            if row.len() != ANCHOR_COUNT {
                return Err(format!(
                    "Measurement row {} has {} ranges, expected {}",
                    s,
                    row.len(),
                    ANCHOR_COUNT
                ));
            }
            out[s].copy_from_slice(row);
        }
        Ok(Self::new(out))
    }

    /// Ranges measured at one sample transmitter position
    pub fn row(&self, sample: usize) -> &[f64; ANCHOR_COUNT] {
        &self.rows[sample]
    }

    pub fn rows(&self) -> &[[f64; ANCHOR_COUNT]; SAMPLE_COUNT] {
        &self.rows
    }
}

/// Why an evolution pass stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The best fitness dropped to or below the pass target
    TargetReached,
    /// The generation budget ran out before the target was reached
    GenerationBudget,
}

/// Summary of one evolution pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvolveOutcome {
    /// Number of sort-and-breed generations executed
    pub generations: usize,
    pub reason: StopReason,
}

/// Final result of a calibration run
///
/// A failed run is a normal outcome carrying the best fitness achieved;
/// retrying with a different budget or population is up to the caller.
#[derive(Debug, Clone)]
pub struct CalibrationOutcome {
    /// Whether the best fitness ended below the acceptance threshold
    pub success: bool,
    /// Best fitness achieved
    pub fitness: f64,
    /// Calibrated anchor layout (the best population member)
    pub layout: AnchorLayout,
    /// Per-pass summaries in execution order
    pub passes: Vec<EvolveOutcome>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corner_layout() {
        let layout = AnchorLayout::corners(3000.0, 1800.0);
        assert_eq!(layout.anchors[0], Vector2::new(0.0, 1800.0));
        assert_eq!(layout.anchors[1], Vector2::new(3000.0, 1800.0));
        assert_eq!(layout.anchors[2], Vector2::new(0.0, 0.0));
        assert_eq!(layout.anchors[3], Vector2::new(3000.0, 0.0));
        assert_eq!(layout.fitness, UNEVALUATED_FITNESS);
    }

    #[test]
    fn test_coordinate_export() {
        let layout = AnchorLayout::corners(3000.0, 1800.0);
        let coords = layout.coordinates();
        assert_eq!(coords[0], 0.0);
        assert_eq!(coords[1], 1800.0);
        assert_eq!(coords[6], 3000.0);
        assert_eq!(coords[7], 0.0);
    }

    #[test]
    fn test_seeded_population() {
        let seed = AnchorLayout::corners(100.0, 100.0);
        let population = Population::seeded(seed.clone(), 50);
        assert_eq!(population.len(), 50);
        assert_eq!(*population.best(), seed);
        assert!(population.members().iter().all(|m| *m == seed));
    }

    #[test]
    fn test_measurement_matrix_row_access() {
        let matrix = MeasurementMatrix::new([
            [1.0, 2.0, 3.0, 4.0],
            [5.0, 6.0, 7.0, 8.0],
            [9.0, 10.0, 11.0, 12.0],
            [13.0, 14.0, 15.0, 16.0],
        ]);
        assert_eq!(matrix.row(0)[0], 1.0);
        assert_eq!(matrix.row(2)[3], 12.0);
        assert_eq!(matrix.rows().len(), 4);
    }

    #[test]
    fn test_measurement_matrix_shape_check() {
        let short = vec![vec![1.0; 4]; 3];
        assert!(MeasurementMatrix::from_rows(&short).is_err());

        let ragged = vec![vec![1.0; 4], vec![1.0; 4], vec![1.0; 3], vec![1.0; 4]];
        assert!(MeasurementMatrix::from_rows(&ragged).is_err());

        let good = vec![vec![1.0; 4]; 4];
        assert!(MeasurementMatrix::from_rows(&good).is_ok());
    }
}
