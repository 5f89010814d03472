//! Core calibration algorithms

pub mod locator;
pub mod fitness;
pub mod evolution;

pub use locator::{arc_residual, GridLocator, LocatorFix};
pub use fitness::FitnessEvaluator;
pub use evolution::{cull_and_breed, evolve, mutate, sort_population, Calibrator, MutationRng};
