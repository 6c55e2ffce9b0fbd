//! # WARREN
//!
//! Discrete-time predator-prey ecosystem simulator.
//!
//! Two species - foxes and rabbits - inhabit a rectangular grid of grass
//! patches and evolve over a fixed number of steps through foraging, aging,
//! metabolism, reproduction, predation, and movement.
//!
//! ## Features
//!
//! - **Deterministic**: a single seeded random number generator drives
//!   every probabilistic decision, so identical seeds replay identical runs
//! - **Configurable**: YAML configuration files with validation
//! - **Observable**: read-only patch views and a per-step callback for
//!   external visualizers, cumulative run statistics for reporting
//!
//! ## Quick Start
//!
//! ```rust
//! use warren::{Species, SimulationConfig, World};
//!
//! // Create world with default config
//! let config = SimulationConfig::default();
//! let mut world = World::new_with_seed(config, 42).unwrap();
//!
//! // Run simulation
//! world.run(100).unwrap();
//!
//! // Check results
//! println!("Rabbits alive: {}", world.population(Species::Rabbit));
//! println!("Foxes alive: {}", world.population(Species::Fox));
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use warren::SimulationConfig;
//!
//! let mut config = SimulationConfig::default();
//! config.rabbits.initial_size = 100;
//! config.world.is_toroid = false;
//! ```

pub mod config;
pub mod entity;
pub mod grid;
pub mod report;
pub mod stats;
pub mod topology;
pub mod world;

// Re-export main types
pub use config::{ConfigError, PopulationConfig, SimulationConfig};
pub use entity::{Animal, AnimalId, Species};
pub use grid::{Coord, InvariantViolation, Patch, PatchView};
pub use stats::SimulationStats;
pub use topology::Movement;
pub use world::World;

use thiserror::Error;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Any error the simulation can surface to a caller.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

/// Run a complete batch simulation for the configured step count and
/// return the cumulative statistics.
pub fn run_batch(
    config: SimulationConfig,
    seed: Option<u64>,
) -> Result<SimulationStats, SimulationError> {
    let mut world = match seed {
        Some(seed) => World::new_with_seed(config, seed)?,
        None => World::new(config)?,
    };

    let steps = world.config.execution.max_steps;
    world.run(steps)?;

    Ok(world.into_stats())
}
