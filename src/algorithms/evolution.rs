//! Evolutionary search over anchor-layout space
//!
//! A population of candidate layouts is scored once against the measurement
//! set, then repeatedly sorted and re-bred from its fittest members through
//! successive refinement passes of decreasing mutation magnitude. Bred layouts
//! inherit their parent's fitness verbatim and are never re-scored inside
//! the loop; the single evaluation pass before the first `evolve` call is
//! the only place fitness is computed from coordinates.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cmp::Ordering;

use crate::algorithms::fitness::FitnessEvaluator;
use crate::algorithms::locator::GridLocator;
use crate::core::{
    AnchorLayout, CalibrationOutcome, EvolveOutcome, MeasurementMatrix, Population, StopReason,
    PINNED_ANCHOR,
};
use crate::utils::config::{CalibrationConfig, RefinementPass};

/// Random source for mutation and parent selection
///
/// Wraps a seedable generator so calibration runs can be made fully
/// deterministic for testing.
pub struct MutationRng {
    rng: StdRng,
}

impl MutationRng {
    /// Create from a fixed seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create with operating-system entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Uniform offset in [-max, max]
    pub fn offset(&mut self, max: f64) -> f64 {
        self.rng.gen_range(-max..=max)
    }

    /// Uniform parent index among the elite block
    pub fn elite(&mut self, elite_count: usize) -> usize {
        self.rng.gen_range(0..elite_count)
    }
}

/// Perturb every anchor coordinate except the pinned pair by an independent
/// uniform offset in [-max_mutation, max_mutation]
///
/// The fitness field is left as-is; it no longer reflects the mutated
/// coordinates after this call.
pub fn mutate(layout: &mut AnchorLayout, max_mutation: f64, rng: &mut MutationRng) {
    for (k, anchor) in layout.anchors.iter_mut().enumerate() {
        if k == PINNED_ANCHOR {
            continue;
        }
        anchor.x += rng.offset(max_mutation);
        anchor.y += rng.offset(max_mutation);
    }
}

/// Sort the population ascending by fitness magnitude; index 0 becomes the
/// current best
///
/// Residuals are non-negative by construction, so the magnitude comparison
/// only matters for values injected from outside. Order among equal-fitness
/// members is not part of the contract.
pub fn sort_population(population: &mut Population) {
    population.members_mut().sort_by(|a, b| {
        a.fitness
            .abs()
            .partial_cmp(&b.fitness.abs())
            .unwrap_or(Ordering::Equal)
    });
}

/// Replace everything below the elite block with mutated clones of
/// uniformly-chosen elites
///
/// The population must already be sorted. Each clone carries its parent's
/// fitness value verbatim: nothing inside the evolution loop re-scores bred
/// members, so their stored fitness describes the parent they were cloned
/// from, not their own mutated coordinates.
pub fn cull_and_breed(
    population: &mut Population,
    step_size: f64,
    elite_count: usize,
    rng: &mut MutationRng,
) {
    let members = population.members_mut();
    for i in elite_count..members.len() {
        let parent = rng.elite(elite_count);
        members[i] = members[parent].clone();
        mutate(&mut members[i], step_size, rng);
    }
}

/// Run one refinement pass: sort and breed until the best fitness reaches
/// the pass target or the generation budget runs out
///
/// The target check reads index 0 before sorting, so the first cycle sees
/// whatever layout initialization left there. The loop always terminates
/// within `max_generations + 1` cycles.
pub fn evolve(
    population: &mut Population,
    pass: &RefinementPass,
    elite_count: usize,
    rng: &mut MutationRng,
) -> EvolveOutcome {
    let mut generations = 0;
    loop {
        if population.best().fitness <= pass.target_fitness {
            return EvolveOutcome {
                generations,
                reason: StopReason::TargetReached,
            };
        }

        sort_population(population);
        cull_and_breed(population, pass.step_size, elite_count, rng);

        generations += 1;
        if generations > pass.max_generations {
            return EvolveOutcome {
                generations,
                reason: StopReason::GenerationBudget,
            };
        }
    }
}

/// End-to-end anchor calibration
///
/// Owns the configuration, the fitness evaluator and the random source, and
/// runs the full seed-diversify-evaluate-evolve sequence over a measurement
/// matrix.
pub struct Calibrator {
    config: CalibrationConfig,
    evaluator: FitnessEvaluator,
    rng: MutationRng,
}

impl Calibrator {
    /// Create a calibrator with default parameters
    pub fn new() -> Self {
        Self::with_config(CalibrationConfig::default())
    }

    /// Create a calibrator from a configuration
    ///
    /// The configuration is assumed valid; run
    /// [`CalibrationConfig::validate`] on hand-built configurations first.
    pub fn with_config(config: CalibrationConfig) -> Self {
        let locator = GridLocator::with_schedule(
            config.locator.step_sizes.clone(),
            config.locator.max_steps_per_pass,
        );
        let rng = match config.random_seed {
            Some(seed) => MutationRng::new(seed),
            None => MutationRng::from_entropy(),
        };
        Self {
            config,
            evaluator: FitnessEvaluator::with_locator(locator),
            rng,
        }
    }

    /// Create a calibrator with default parameters and a fixed random seed
    pub fn with_seed(seed: u64) -> Self {
        let mut config = CalibrationConfig::default();
        config.random_seed = Some(seed);
        Self::with_config(config)
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Calibrate the anchor layout from one measurement matrix
    pub fn calibrate(&mut self, measurements: &MeasurementMatrix) -> CalibrationOutcome {
        let seed = AnchorLayout::corners(self.config.initial_width, self.config.initial_height);
        let mut population = Population::seeded(seed, self.config.population_size);

        // Diversify everything but the untouched seed copy at index 0.
        for member in population.members_mut().iter_mut().skip(1) {
            mutate(member, self.config.diversification_spread, &mut self.rng);
        }

        // The one and only fitness evaluation pass of the run.
        self.evaluator.evaluate_all(&mut population, measurements);

        let mut passes = Vec::with_capacity(self.config.passes.len());
        for pass in &self.config.passes {
            passes.push(evolve(
                &mut population,
                pass,
                self.config.elite_count,
                &mut self.rng,
            ));
        }

        sort_population(&mut population);
        let best = population.best().clone();
        CalibrationOutcome {
            success: best.fitness < self.config.acceptance_threshold,
            fitness: best.fitness,
            layout: best,
            passes,
        }
    }
}

impl Default for Calibrator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector2;

    use crate::core::{ANCHOR_COUNT, SAMPLE_COUNT};

    fn exact_matrix(layout: &AnchorLayout, samples: &[Vector2<f64>; 4]) -> MeasurementMatrix {
        let mut rows = [[0.0; ANCHOR_COUNT]; SAMPLE_COUNT];
        for (s, sample) in samples.iter().enumerate() {
            for (k, anchor) in layout.anchors.iter().enumerate() {
                rows[s][k] = (sample - anchor).norm();
            }
        }
        MeasurementMatrix::new(rows)
    }

    fn population_with_fitness(values: &[f64]) -> Population {
        let mut population =
            Population::seeded(AnchorLayout::corners(3000.0, 1800.0), values.len());
        for (member, &fitness) in population.members_mut().iter_mut().zip(values.iter()) {
            member.fitness = fitness;
        }
        population
    }

    #[test]
    fn test_mutate_pins_the_origin_anchor() {
        let mut rng = MutationRng::new(7);
        let mut layout = AnchorLayout::corners(3000.0, 1800.0);
        let before = layout.clone();

        mutate(&mut layout, 0.5, &mut rng);

        assert_eq!(layout.anchors[PINNED_ANCHOR], before.anchors[PINNED_ANCHOR]);
        for k in 0..ANCHOR_COUNT {
            if k == PINNED_ANCHOR {
                continue;
            }
            assert!((layout.anchors[k].x - before.anchors[k].x).abs() <= 0.5);
            assert!((layout.anchors[k].y - before.anchors[k].y).abs() <= 0.5);
        }
        // With a continuous draw, at least one coordinate moved.
        assert_ne!(layout.anchors, before.anchors);
    }

    #[test]
    fn test_mutate_leaves_fitness_untouched() {
        let mut rng = MutationRng::new(11);
        let mut layout = AnchorLayout::corners(3000.0, 1800.0);
        layout.fitness = 3.25;

        mutate(&mut layout, 1.0, &mut rng);
        assert_eq!(layout.fitness, 3.25);
    }

    #[test]
    fn test_sort_population_orders_by_fitness() {
        let mut population = population_with_fitness(&[4.0, 0.5, 2.5, 0.1, 9.0, 1.0]);
        sort_population(&mut population);

        let members = population.members();
        for pair in members.windows(2) {
            assert!(pair[0].fitness <= pair[1].fitness);
        }
        assert_eq!(population.best().fitness, 0.1);
    }

    #[test]
    fn test_cull_and_breed_keeps_elites() {
        let values: Vec<f64> = (0..50).map(|i| i as f64).collect();
        let mut population = population_with_fitness(&values);
        sort_population(&mut population);
        let elites_before: Vec<AnchorLayout> = population.members()[..9].to_vec();

        let mut rng = MutationRng::new(3);
        cull_and_breed(&mut population, 0.5, 9, &mut rng);

        assert_eq!(&population.members()[..9], elites_before.as_slice());
    }

    #[test]
    fn test_bred_members_keep_parent_fitness() {
        let values: Vec<f64> = (0..50).map(|i| i as f64).collect();
        let mut population = population_with_fitness(&values);
        sort_population(&mut population);

        let mut rng = MutationRng::new(5);
        cull_and_breed(&mut population, 0.5, 9, &mut rng);

        // Every bred member carries an elite's fitness value verbatim even
        // though its coordinates were mutated; fitness is only ever computed
        // in the initial evaluation pass, never during breeding.
        let elite_fitness: Vec<f64> = population.members()[..9].iter().map(|m| m.fitness).collect();
        for member in &population.members()[9..] {
            assert!(elite_fitness.contains(&member.fitness));
            assert_eq!(member.anchors[PINNED_ANCHOR], Vector2::new(0.0, 0.0));
        }
    }

    #[test]
    fn test_evolve_stops_immediately_when_target_met() {
        let mut population = population_with_fitness(&[0.1; 50]);
        let mut rng = MutationRng::new(1);
        let pass = RefinementPass {
            step_size: 0.5,
            target_fitness: 0.25,
            max_generations: 2000,
        };

        let outcome = evolve(&mut population, &pass, 9, &mut rng);
        assert_eq!(outcome.reason, StopReason::TargetReached);
        assert_eq!(outcome.generations, 0);
    }

    #[test]
    fn test_evolve_exhausts_budget_within_bound() {
        // Fitness values are copied verbatim during breeding, so the best
        // value can never drop below the initial minimum and the target
        // stays out of reach.
        let mut population = population_with_fitness(&[1.0; 50]);
        let mut rng = MutationRng::new(2);
        let pass = RefinementPass {
            step_size: 0.5,
            target_fitness: 0.5,
            max_generations: 5,
        };

        let outcome = evolve(&mut population, &pass, 9, &mut rng);
        assert_eq!(outcome.reason, StopReason::GenerationBudget);
        assert_eq!(outcome.generations, pass.max_generations + 1);
    }

    #[test]
    fn test_evolve_never_lowers_the_stored_minimum_fitness() {
        let values: Vec<f64> = (0..50).map(|i| 1.0 + i as f64 * 0.1).collect();
        let mut population = population_with_fitness(&values);
        let mut rng = MutationRng::new(9);
        let pass = RefinementPass {
            step_size: 0.5,
            target_fitness: 0.0,
            max_generations: 50,
        };

        evolve(&mut population, &pass, 9, &mut rng);

        let min_after = population
            .members()
            .iter()
            .map(|m| m.fitness)
            .fold(f64::INFINITY, f64::min);
        assert_eq!(min_after, 1.0);
    }

    #[test]
    fn test_calibration_recovers_known_geometry() {
        // True anchors coincide with the default coarse guess corners; the
        // measurement rows are exact distances from four in-area points.
        let truth = AnchorLayout::corners(3000.0, 1800.0);
        let samples = [
            Vector2::new(500.0, 400.0),
            Vector2::new(2500.0, 600.0),
            Vector2::new(1200.0, 1500.0),
            Vector2::new(2000.0, 200.0),
        ];
        let matrix = exact_matrix(&truth, &samples);

        let mut calibrator = Calibrator::with_seed(42);
        let outcome = calibrator.calibrate(&matrix);

        assert!(outcome.success);
        assert!(outcome.fitness < 0.2);
        for (recovered, expected) in outcome.layout.anchors.iter().zip(truth.anchors.iter()) {
            assert!((recovered - expected).norm() < 50.0);
        }
        assert_eq!(
            outcome.layout.anchors[PINNED_ANCHOR],
            Vector2::new(0.0, 0.0)
        );
        assert_eq!(outcome.passes.len(), 2);
    }

    #[test]
    fn test_calibration_fails_on_inconsistent_measurements() {
        // No point is 100 units from all four corners of a 3000x1800 area,
        // so the residual stays far above the acceptance threshold.
        let matrix = MeasurementMatrix::new([[100.0; 4]; 4]);

        let mut calibrator = Calibrator::with_seed(7);
        let outcome = calibrator.calibrate(&matrix);

        assert!(!outcome.success);
        assert!(outcome.fitness >= calibrator.config().acceptance_threshold);
    }
}
