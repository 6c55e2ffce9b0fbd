//! Configuration system for the simulation.
//!
//! Supports YAML configuration files with sensible defaults.

use crate::entity::Species;
use crate::topology::Movement;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub world: WorldConfig,
    pub rabbits: PopulationConfig,
    pub foxes: PopulationConfig,
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// World/environment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Grid rows (north-south axis)
    pub north_south_length: usize,
    /// Grid columns (west-east axis)
    pub west_east_length: usize,
    /// Wrap-around boundaries when true, bounded island otherwise
    pub is_toroid: bool,
    /// Grass ceiling per patch; one growth increment of overshoot is allowed
    pub max_grass_amount: u32,
    /// Smallest grass growth per patch tick
    pub min_grass_growth: u32,
    /// Largest grass growth per patch tick
    pub max_grass_growth: u32,
}

/// Per-species configuration, immutable for the duration of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Number of animals at start
    pub initial_size: usize,
    /// Energy cost of staying alive, paid every tick
    pub metabolism: f64,
    /// Age at which an animal dies
    pub max_age: u32,
    /// Energy ceiling for the species
    pub max_energy: f64,
    /// Chance that an eligible reproduction attempt succeeds
    pub reproduction_probability: f64,
    /// Energy floor below which no reproduction is attempted
    pub reproduction_min_energy: f64,
    /// Age floor below which no reproduction is attempted
    pub reproduction_min_age: u32,
}

/// Execution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Number of steps to simulate
    pub max_steps: u64,
    /// Seconds to pause between rendered steps (visual mode only)
    pub step_delay: f64,
    /// Run without rendering when true
    pub batch: bool,
    /// Adjacency pattern used for movement
    pub movement: Movement,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Steps between stats summary lines
    pub stats_interval: u64,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            rabbits: PopulationConfig::default_rabbits(),
            foxes: PopulationConfig::default_foxes(),
            execution: ExecutionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            north_south_length: 15,
            west_east_length: 20,
            is_toroid: true,
            max_grass_amount: 30,
            min_grass_growth: 1,
            max_grass_growth: 3,
        }
    }
}

impl PopulationConfig {
    /// Default rabbit parameters
    pub fn default_rabbits() -> Self {
        Self {
            initial_size: 60,
            metabolism: 1.0,
            max_age: 15,
            max_energy: 50.0,
            reproduction_probability: 0.6,
            reproduction_min_energy: 25.0,
            reproduction_min_age: 3,
        }
    }

    /// Default fox parameters
    pub fn default_foxes() -> Self {
        Self {
            initial_size: 25,
            metabolism: 2.0,
            max_age: 50,
            max_energy: 200.0,
            reproduction_probability: 0.5,
            reproduction_min_energy: 120.0,
            reproduction_min_age: 10,
        }
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_steps: 200,
            step_delay: 0.0,
            batch: true,
            movement: Movement::Queen,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            stats_interval: 10,
            log_level: "info".to_string(),
        }
    }
}

/// Errors raised by configuration validation.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{species}: {field} must be positive")]
    NonPositive {
        species: &'static str,
        field: &'static str,
    },
    #[error("{species}: {field} must not be negative")]
    Negative {
        species: &'static str,
        field: &'static str,
    },
    #[error("{species}: reproduction_probability {value} is outside [0, 1]")]
    ProbabilityRange { species: &'static str, value: f64 },
    #[error("{species}: initial_size {size} does not fit a {rows}x{cols} world")]
    PopulationTooLarge {
        species: &'static str,
        size: usize,
        rows: usize,
        cols: usize,
    },
    #[error("world: {0}")]
    World(&'static str),
    #[error("execution: {0}")]
    Execution(&'static str),
}

impl SimulationConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: SimulationConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// The configuration for one species
    pub fn population(&self, species: Species) -> &PopulationConfig {
        match species {
            Species::Rabbit => &self.rabbits,
            Species::Fox => &self.foxes,
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rows = self.world.north_south_length;
        let cols = self.world.west_east_length;

        if rows == 0 || cols == 0 {
            return Err(ConfigError::World("grid dimensions must be positive"));
        }
        if !self.world.is_toroid && (rows < 3 || cols < 3) {
            return Err(ConfigError::World("island worlds must be at least 3x3"));
        }
        if self.world.min_grass_growth > self.world.max_grass_growth {
            return Err(ConfigError::World(
                "min_grass_growth cannot exceed max_grass_growth",
            ));
        }

        for (species, population) in [("rabbits", &self.rabbits), ("foxes", &self.foxes)] {
            population.validate(species)?;
            // Initial placement gives each species distinct coordinates.
            if population.initial_size > rows * cols {
                return Err(ConfigError::PopulationTooLarge {
                    species,
                    size: population.initial_size,
                    rows,
                    cols,
                });
            }
        }

        if self.execution.max_steps == 0 {
            return Err(ConfigError::Execution("max_steps must be positive"));
        }
        if self.execution.step_delay < 0.0 {
            return Err(ConfigError::Execution("step_delay must not be negative"));
        }

        Ok(())
    }
}

impl PopulationConfig {
    fn validate(&self, species: &'static str) -> Result<(), ConfigError> {
        if self.initial_size == 0 {
            return Err(ConfigError::NonPositive {
                species,
                field: "initial_size",
            });
        }
        if self.max_age == 0 {
            return Err(ConfigError::NonPositive {
                species,
                field: "max_age",
            });
        }
        if self.max_energy <= 0.0 {
            return Err(ConfigError::NonPositive {
                species,
                field: "max_energy",
            });
        }
        if self.metabolism < 0.0 {
            return Err(ConfigError::Negative {
                species,
                field: "metabolism",
            });
        }
        if self.reproduction_min_energy < 0.0 {
            return Err(ConfigError::Negative {
                species,
                field: "reproduction_min_energy",
            });
        }
        if !(0.0..=1.0).contains(&self.reproduction_probability) {
            return Err(ConfigError::ProbabilityRange {
                species,
                value: self.reproduction_probability,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = SimulationConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let loaded: SimulationConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config.world.north_south_length, loaded.world.north_south_length);
        assert_eq!(config.rabbits.initial_size, loaded.rabbits.initial_size);
        assert_eq!(config.execution.movement, loaded.execution.movement);
    }

    #[test]
    fn test_probability_range_rejected() {
        let mut config = SimulationConfig::default();
        config.foxes.reproduction_probability = 1.5;

        assert_eq!(
            config.validate(),
            Err(ConfigError::ProbabilityRange {
                species: "foxes",
                value: 1.5
            })
        );
    }

    #[test]
    fn test_population_must_fit_world() {
        let mut config = SimulationConfig::default();
        config.world.north_south_length = 5;
        config.world.west_east_length = 5;
        config.rabbits.initial_size = 26;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::PopulationTooLarge { species: "rabbits", .. })
        ));
    }

    #[test]
    fn test_small_island_rejected() {
        let mut config = SimulationConfig::default();
        config.world.is_toroid = false;
        config.world.north_south_length = 2;

        assert_eq!(
            config.validate(),
            Err(ConfigError::World("island worlds must be at least 3x3"))
        );

        // The same size is fine on a toroid.
        config.world.is_toroid = true;
        config.rabbits.initial_size = 10;
        config.foxes.initial_size = 5;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_steps_rejected() {
        let mut config = SimulationConfig::default();
        config.execution.max_steps = 0;

        assert_eq!(
            config.validate(),
            Err(ConfigError::Execution("max_steps must be positive"))
        );
    }
}
