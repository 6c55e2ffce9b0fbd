//! Animal state and the species-divergent life-cycle rules.

use crate::config::{PopulationConfig, SimulationConfig};
use crate::grid::{Coord, Patch};
use serde::{Deserialize, Serialize};

/// Stable animal identifier, an index into the world's registry
pub type AnimalId = usize;

/// The two species in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Rabbit,
    Fox,
}

/// Fraction of `reproduction_min_energy` a parent pays on success
pub const REPRODUCTION_COST_RATE: f64 = 0.85;

/// Newborn rabbit energy as a fraction of the species energy ceiling
pub const RABBIT_BIRTH_ENERGY_RATE: f64 = 0.25;

/// Newborn fox energy as a fraction of the species energy ceiling
pub const FOX_BIRTH_ENERGY_RATE: f64 = 0.70;

/// Energy a fox gains from one rabbit
pub const FOX_PREY_ENERGY: f64 = 15.0;

/// Grass a rabbit can graze per tick, in multiples of its metabolism
pub const GRAZE_METABOLISM_FACTOR: f64 = 2.0;

impl Species {
    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Species::Rabbit => "rabbit",
            Species::Fox => "fox",
        }
    }

    /// The species that preys on this one, if any
    pub fn predator(&self) -> Option<Species> {
        match self {
            Species::Rabbit => Some(Species::Fox),
            Species::Fox => None,
        }
    }

    /// Energy a newborn of this species starts with
    pub fn birth_energy(&self, population: &PopulationConfig) -> f64 {
        match self {
            Species::Rabbit => RABBIT_BIRTH_ENERGY_RATE * population.max_energy,
            Species::Fox => FOX_BIRTH_ENERGY_RATE * population.max_energy,
        }
    }
}

/// An animal in the simulation.
///
/// The world registry owns every animal for the whole run; a dead animal
/// stays readable with its age and energy frozen, but is removed from all
/// patch occupancy the moment it dies.
#[derive(Debug, Clone)]
pub struct Animal {
    id: AnimalId,
    species: Species,
    /// Current patch; the patch itself holds the occupancy entry
    coord: Coord,
    age: u32,
    energy: f64,
    /// One-way predation marker, rabbits only
    was_killed: bool,
}

impl Animal {
    /// Create a new animal at the given patch coordinate
    pub fn new(id: AnimalId, species: Species, coord: Coord, age: u32, energy: f64) -> Self {
        Self {
            id,
            species,
            coord,
            age,
            energy,
            was_killed: false,
        }
    }

    #[inline]
    pub fn id(&self) -> AnimalId {
        self.id
    }

    #[inline]
    pub fn species(&self) -> Species {
        self.species
    }

    /// The patch the animal is on; frozen at the last location after death
    #[inline]
    pub fn coord(&self) -> Coord {
        self.coord
    }

    /// Age in ticks; frozen after death
    #[inline]
    pub fn age(&self) -> u32 {
        self.age
    }

    /// Current energy; frozen after death
    #[inline]
    pub fn energy(&self) -> f64 {
        self.energy
    }

    /// True once a fox has killed this rabbit; never true for foxes
    #[inline]
    pub fn was_killed(&self) -> bool {
        self.was_killed
    }

    /// Whether the animal is alive under its species rule.
    ///
    /// Rabbits additionally die from predation; foxes only from starvation
    /// and old age.
    pub fn is_alive(&self, population: &PopulationConfig) -> bool {
        let vital = self.energy > 0.0 && self.age < population.max_age;
        match self.species {
            Species::Rabbit => vital && !self.was_killed,
            Species::Fox => vital,
        }
    }

    /// Alive, old enough, and energetic enough to attempt reproduction
    pub fn can_reproduce(&self, population: &PopulationConfig) -> bool {
        self.is_alive(population)
            && self.energy >= population.reproduction_min_energy
            && self.age >= population.reproduction_min_age
    }

    /// Record the passage of one step: age by one and pay the metabolic
    /// cost. No-op when dead, so age and energy freeze at death.
    ///
    /// The caller removes the animal from its patch if this tick killed it.
    pub fn tick(&mut self, population: &PopulationConfig) {
        if !self.is_alive(population) {
            return;
        }
        self.age += 1;
        self.energy -= population.metabolism;
    }

    /// Graze on the current patch, given the grass available there.
    ///
    /// Intake is the least of the available grass, the grazing rate, and
    /// the headroom to the energy ceiling, floored to whole grass units.
    /// Returns the units eaten so the caller can deduct them from the patch.
    pub fn graze(&mut self, population: &PopulationConfig, grass: u32) -> u32 {
        let headroom = (population.max_energy - self.energy).max(0.0);
        let intake = (GRAZE_METABOLISM_FACTOR * population.metabolism)
            .min(headroom)
            .min(grass as f64)
            .max(0.0);
        let eaten = intake.floor() as u32;
        self.energy += eaten as f64;
        eaten
    }

    /// Digest one killed rabbit, capped at the energy ceiling
    pub fn consume_prey(&mut self, population: &PopulationConfig) {
        self.energy = (self.energy + FOX_PREY_ENERGY).min(population.max_energy);
    }

    /// Deduct the cost of a successful reproduction
    pub fn pay_reproduction_cost(&mut self, population: &PopulationConfig) {
        self.energy -= REPRODUCTION_COST_RATE * population.reproduction_min_energy;
    }

    /// Whether the given patch holds an alive animal of this species
    pub fn same_species_in(
        &self,
        patch: &Patch,
        animals: &[Animal],
        config: &SimulationConfig,
    ) -> bool {
        patch.has_alive(self.species, animals, config)
    }

    /// Whether the given patch holds an alive predator of this species.
    /// Always false for foxes, which have no predator.
    pub fn predators_in(
        &self,
        patch: &Patch,
        animals: &[Animal],
        config: &SimulationConfig,
    ) -> bool {
        match self.species.predator() {
            Some(predator) => patch.has_alive(predator, animals, config),
            None => false,
        }
    }

    /// Set the permanent predation marker
    pub fn mark_killed(&mut self) {
        self.was_killed = true;
    }

    /// Rebind the patch back-reference after a move
    pub fn relocate(&mut self, coord: Coord) {
        self.coord = coord;
    }
}
