//! Domain constants for the anchor calibration system

/// Number of fixed anchors being calibrated
pub const ANCHOR_COUNT: usize = 4;

/// Number of transmitter sample positions in one measurement set
pub const SAMPLE_COUNT: usize = 4;

/// Number of candidate layouts carried through the evolutionary search
pub const POPULATION_SIZE: usize = 50;

/// Number of top-ranked layouts retained unchanged as breeding parents
pub const ELITE_COUNT: usize = 9;

/// Index of the anchor pinned at the survey origin; it is never mutated
pub const PINNED_ANCHOR: usize = 2;

/// Fitness value carried by layouts that have not been evaluated yet
pub const UNEVALUATED_FITNESS: f64 = 10_000.0;

/// Hill-climb step sizes, coarse to fine (units match the anchor coordinates)
pub const LOCATOR_STEP_SIZES: [f64; 4] = [100.0, 10.0, 1.0, 0.1];

/// Maximum walk steps per hill-climb resolution pass
pub const MAX_WALK_STEPS: usize = 10_000;

/// Default width of the expected sensing area (units)
pub const DEFAULT_AREA_WIDTH: f64 = 3000.0;

/// Default height of the expected sensing area (units)
pub const DEFAULT_AREA_HEIGHT: f64 = 1800.0;
