use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::core::{
    DEFAULT_AREA_HEIGHT, DEFAULT_AREA_WIDTH, ELITE_COUNT, LOCATOR_STEP_SIZES, MAX_WALK_STEPS,
    POPULATION_SIZE,
};

/// One refinement pass of the evolutionary search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RefinementPass {
    /// Mutation magnitude applied to bred layouts (units)
    pub step_size: f64,
    /// Best fitness at or below which the pass stops early
    pub target_fitness: f64,
    /// Generation budget; the pass runs at most this many generations plus one
    pub max_generations: usize,
}

/// Locator tuning parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocatorConfig {
    /// Hill-climb step sizes, coarse to fine
    pub step_sizes: Vec<f64>,
    /// Maximum walk steps per resolution pass
    pub max_steps_per_pass: usize,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            step_sizes: LOCATOR_STEP_SIZES.to_vec(),
            max_steps_per_pass: MAX_WALK_STEPS,
        }
    }
}

/// System-wide calibration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Number of candidate layouts in the population
    pub population_size: usize,
    /// Number of top-ranked layouts retained as breeding parents
    pub elite_count: usize,
    /// Mutation magnitude used to diversify the initial population (units)
    pub diversification_spread: f64,
    /// Best fitness below which a finished run counts as successful
    pub acceptance_threshold: f64,
    /// Width of the coarse initial guess rectangle (units)
    pub initial_width: f64,
    /// Height of the coarse initial guess rectangle (units)
    pub initial_height: f64,
    /// Refinement passes, executed in order
    pub passes: Vec<RefinementPass>,
    /// Locator tuning
    pub locator: LocatorConfig,
    /// Fixed random seed; `None` draws entropy from the operating system
    pub random_seed: Option<u64>,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            population_size: POPULATION_SIZE,
            elite_count: ELITE_COUNT,
            diversification_spread: 2.0,
            acceptance_threshold: 0.2,
            initial_width: DEFAULT_AREA_WIDTH,
            initial_height: DEFAULT_AREA_HEIGHT,
            passes: vec![
                RefinementPass {
                    step_size: 0.5,
                    target_fitness: 0.25,
                    max_generations: 2000,
                },
                RefinementPass {
                    step_size: 0.1,
                    target_fitness: 0.01,
                    max_generations: 2000,
                },
            ],
            locator: LocatorConfig::default(),
            random_seed: None,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Invalid parameter value
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    /// Configuration file I/O error
    IoError { message: String },
    /// JSON serialization/deserialization error
    SerializationError { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{}' = '{}': {}", parameter, value, reason)
            }
            ConfigError::IoError { message } => {
                write!(f, "I/O error: {}", message)
            }
            ConfigError::SerializationError { message } => {
                write!(f, "Serialization error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl CalibrationConfig {
    /// Load and validate a configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
            message: format!("Failed to read config file '{}': {}", path_str, e),
        })?;

        let config: CalibrationConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::SerializationError {
                message: format!("Failed to parse config file '{}': {}", path_str, e),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Save the configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializationError {
                message: format!("Failed to serialize config: {}", e),
            })?;

        fs::write(&path, content).map_err(|e| ConfigError::IoError {
            message: format!("Failed to write config file '{}': {}", path_str, e),
        })
    }

    /// Validate all parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size < 2 {
            return Err(ConfigError::InvalidParameter {
                parameter: "population_size".to_string(),
                value: self.population_size.to_string(),
                reason: "Population must hold at least the seed and one bred layout".to_string(),
            });
        }

        if self.elite_count == 0 || self.elite_count >= self.population_size {
            return Err(ConfigError::InvalidParameter {
                parameter: "elite_count".to_string(),
                value: self.elite_count.to_string(),
                reason: "Elite count must be at least 1 and below the population size".to_string(),
            });
        }

        if self.diversification_spread <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "diversification_spread".to_string(),
                value: self.diversification_spread.to_string(),
                reason: "Diversification spread must be positive".to_string(),
            });
        }

        if self.acceptance_threshold <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "acceptance_threshold".to_string(),
                value: self.acceptance_threshold.to_string(),
                reason: "Acceptance threshold must be positive".to_string(),
            });
        }

        if self.initial_width <= 0.0 || self.initial_height <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "initial_width/initial_height".to_string(),
                value: format!("{}x{}", self.initial_width, self.initial_height),
                reason: "Initial guess area must have positive extent".to_string(),
            });
        }

        if self.passes.is_empty() {
            return Err(ConfigError::InvalidParameter {
                parameter: "passes".to_string(),
                value: "[]".to_string(),
                reason: "At least one refinement pass is required".to_string(),
            });
        }

        for (i, pass) in self.passes.iter().enumerate() {
            if pass.step_size <= 0.0 {
                return Err(ConfigError::InvalidParameter {
                    parameter: format!("passes[{}].step_size", i),
                    value: pass.step_size.to_string(),
                    reason: "Mutation step size must be positive".to_string(),
                });
            }
            if pass.target_fitness < 0.0 {
                return Err(ConfigError::InvalidParameter {
                    parameter: format!("passes[{}].target_fitness", i),
                    value: pass.target_fitness.to_string(),
                    reason: "Target fitness cannot be negative".to_string(),
                });
            }
            if pass.max_generations == 0 {
                return Err(ConfigError::InvalidParameter {
                    parameter: format!("passes[{}].max_generations", i),
                    value: pass.max_generations.to_string(),
                    reason: "Generation budget must be positive".to_string(),
                });
            }
        }

        if self.locator.step_sizes.is_empty() {
            return Err(ConfigError::InvalidParameter {
                parameter: "locator.step_sizes".to_string(),
                value: "[]".to_string(),
                reason: "At least one locator step size is required".to_string(),
            });
        }

        for window in self.locator.step_sizes.windows(2) {
            if window[1] >= window[0] {
                return Err(ConfigError::InvalidParameter {
                    parameter: "locator.step_sizes".to_string(),
                    value: format!("{:?}", self.locator.step_sizes),
                    reason: "Locator step sizes must be strictly descending".to_string(),
                });
            }
        }

        if self.locator.step_sizes.iter().any(|&s| s <= 0.0) {
            return Err(ConfigError::InvalidParameter {
                parameter: "locator.step_sizes".to_string(),
                value: format!("{:?}", self.locator.step_sizes),
                reason: "Locator step sizes must be positive".to_string(),
            });
        }

        if self.locator.max_steps_per_pass == 0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "locator.max_steps_per_pass".to_string(),
                value: self.locator.max_steps_per_pass.to_string(),
                reason: "Walk step cap must be positive".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CalibrationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.population_size, 50);
        assert_eq!(config.elite_count, 9);
        assert_eq!(config.passes.len(), 2);
        assert_eq!(config.passes[0].step_size, 0.5);
        assert_eq!(config.passes[0].target_fitness, 0.25);
        assert_eq!(config.passes[1].step_size, 0.1);
        assert_eq!(config.passes[1].target_fitness, 0.01);
        assert_eq!(config.locator.step_sizes, vec![100.0, 10.0, 1.0, 0.1]);
    }

    #[test]
    fn test_invalid_elite_count() {
        let mut config = CalibrationConfig::default();
        config.elite_count = config.population_size;
        assert!(config.validate().is_err());

        config.elite_count = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_passes_rejected() {
        let mut config = CalibrationConfig::default();
        config.passes.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ascending_locator_schedule_rejected() {
        let mut config = CalibrationConfig::default();
        config.locator.step_sizes = vec![1.0, 10.0, 100.0];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_file_round_trip() {
        let mut config = CalibrationConfig::default();
        config.random_seed = Some(1234);
        config.acceptance_threshold = 0.3;

        let path = std::env::temp_dir().join("calibration_test_config.json");
        config.save_to_file(&path).unwrap();
        let loaded = CalibrationConfig::from_file(&path).unwrap();

        assert_eq!(loaded.random_seed, Some(1234));
        assert_eq!(loaded.acceptance_threshold, 0.3);
        assert_eq!(loaded.passes, config.passes);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_invalid_file_reports_io_error() {
        let result = CalibrationConfig::from_file("does_not_exist_calibration.json");
        assert!(matches!(result, Err(ConfigError::IoError { .. })));
    }
}
