//! Best-fit point location against a set of range circles
//!
//! Given a candidate anchor layout and one row of range measurements, the
//! locator finds the point in the plane whose distances to the four anchors
//! best match the measured ranges, and reports the residual error of that
//! fit. A perfect four-anchor fix has residual zero.

use nalgebra::Vector2;

use crate::core::{AnchorLayout, ANCHOR_COUNT, LOCATOR_STEP_SIZES, MAX_WALK_STEPS};

/// Compass neighborhood scanned at each walk step, in evaluation order
const COMPASS: [(f64, f64); 8] = [
    (0.0, 1.0),
    (1.0, 1.0),
    (1.0, 0.0),
    (1.0, -1.0),
    (0.0, -1.0),
    (-1.0, -1.0),
    (-1.0, 0.0),
    (-1.0, 1.0),
];

/// Mean absolute difference between the point's distance to each anchor and
/// that anchor's measured range
///
/// Zero exactly when the point lies on all four measurement circles at once.
pub fn arc_residual(
    point: Vector2<f64>,
    layout: &AnchorLayout,
    ranges: &[f64; ANCHOR_COUNT],
) -> f64 {
    let total: f64 = layout
        .anchors
        .iter()
        .zip(ranges.iter())
        .map(|(anchor, range)| ((point - anchor).norm() - range).abs())
        .sum();
    total / ANCHOR_COUNT as f64
}

/// Best-explaining point for one measurement row, with its residual
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocatorFix {
    pub point: Vector2<f64>,
    pub residual: f64,
}

/// Multi-resolution hill-climb over the arc residual surface
///
/// Runs a steepest-descent-by-sampling walk at each step size in the
/// schedule, coarse to fine, seeding every pass from the previous pass's
/// converged point. The walk itself uses no randomness, so a fix is fully
/// deterministic for a given layout and measurement row.
pub struct GridLocator {
    /// Step sizes for successive refinement passes, coarse to fine
    pub step_sizes: Vec<f64>,
    /// Maximum walk steps per resolution pass
    pub max_steps_per_pass: usize,
}

impl Default for GridLocator {
    fn default() -> Self {
        Self {
            step_sizes: LOCATOR_STEP_SIZES.to_vec(),
            max_steps_per_pass: MAX_WALK_STEPS,
        }
    }
}

impl GridLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a locator with a custom step schedule and per-pass step cap
    pub fn with_schedule(step_sizes: Vec<f64>, max_steps_per_pass: usize) -> Self {
        Self {
            step_sizes,
            max_steps_per_pass,
        }
    }

    /// Find the point that best explains one row of range measurements
    ///
    /// The walk starts from half the second anchor's coordinate pair, a
    /// fixed deterministic seed near the middle of the expected area.
    pub fn locate(&self, layout: &AnchorLayout, ranges: &[f64; ANCHOR_COUNT]) -> LocatorFix {
        let start = layout.anchors[1] * 0.5;
        let mut fix = LocatorFix {
            point: start,
            residual: arc_residual(start, layout, ranges),
        };
        for &step in &self.step_sizes {
            fix = self.walk(fix.point, step, layout, ranges);
        }
        fix
    }

    /// Walk the residual surface at a single step size until the center of
    /// the compass neighborhood is its own minimum
    ///
    /// A neighbor displaces the center only when its residual is strictly
    /// smaller, so the residual never increases along the walk. The step cap
    /// bounds pathological non-converging inputs; convergent walks are
    /// unaffected by it.
    fn walk(
        &self,
        start: Vector2<f64>,
        step: f64,
        layout: &AnchorLayout,
        ranges: &[f64; ANCHOR_COUNT],
    ) -> LocatorFix {
        let mut center = start;
        let mut center_residual = arc_residual(center, layout, ranges);

        for _ in 0..self.max_steps_per_pass {
            let mut best = center;
            let mut best_residual = center_residual;

            for &(dx, dy) in COMPASS.iter() {
                let candidate = center + Vector2::new(dx * step, dy * step);
                let residual = arc_residual(candidate, layout, ranges);
                if residual < best_residual {
                    best = candidate;
                    best_residual = residual;
                }
            }

            if best == center {
                return LocatorFix {
                    point: center,
                    residual: center_residual,
                };
            }
            center = best;
            center_residual = best_residual;
        }

        eprintln!(
            "WARNING: Locator walk did not settle within {} steps at step size {}. \
            Returning the best point reached so far.",
            self.max_steps_per_pass, step
        );
        LocatorFix {
            point: center,
            residual: center_residual,
        }
    }
}
