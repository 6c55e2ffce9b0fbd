//! World grid of grass patches and their occupancy lists.

use crate::config::{SimulationConfig, WorldConfig};
use crate::entity::{Animal, AnimalId, Species};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A (north-south, west-east) grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    /// Row, counted from the north
    pub ns: usize,
    /// Column, counted from the west
    pub we: usize,
}

impl Coord {
    pub fn new(ns: usize, we: usize) -> Self {
        Self { ns, we }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.ns, self.we)
    }
}

/// Violations of the occupancy and life-cycle invariants.
///
/// These indicate caller bugs, not normal simulation outcomes; the engine
/// signals them instead of silently absorbing an inconsistent state.
#[derive(Debug, Error, PartialEq)]
pub enum InvariantViolation {
    #[error("animal {id} is not an occupant of patch {coord}")]
    AbsentOccupant { id: AnimalId, coord: Coord },
    #[error("animal {id} is already an occupant of patch {coord}")]
    DuplicateOccupant { id: AnimalId, coord: Coord },
    #[error("animal {id} is dead and cannot {operation}")]
    DeadAnimal {
        id: AnimalId,
        operation: &'static str,
    },
}

/// A grid cell holding a grass counter and an ordered occupancy list.
///
/// Occupancy order is part of the simulation's determinism contract: a fox
/// kills the first alive rabbit in order, and the tick orchestrator visits
/// occupants in order.
#[derive(Debug, Clone)]
pub struct Patch {
    coord: Coord,
    grass: u32,
    occupants: Vec<AnimalId>,
}

impl Patch {
    pub fn new(coord: Coord) -> Self {
        Self {
            coord,
            grass: 0,
            occupants: Vec::new(),
        }
    }

    #[inline]
    pub fn coord(&self) -> Coord {
        self.coord
    }

    /// Current grass amount
    #[inline]
    pub fn grass(&self) -> u32 {
        self.grass
    }

    /// Grow grass by a uniform random amount while the counter is at or
    /// below the ceiling. The comparison is deliberately inclusive, so the
    /// amount can overshoot the ceiling by at most one growth increment.
    pub fn tick(&mut self, world: &WorldConfig, rng: &mut impl Rng) {
        if self.grass <= world.max_grass_amount {
            self.grass += rng.gen_range(world.min_grass_growth..=world.max_grass_growth);
        }
    }

    /// Remove grazed grass units
    pub fn consume_grass(&mut self, units: u32) {
        self.grass = self.grass.saturating_sub(units);
    }

    /// Occupants in arrival order
    #[inline]
    pub fn occupants(&self) -> &[AnimalId] {
        &self.occupants
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: AnimalId) -> bool {
        self.occupants.contains(&id)
    }

    /// Append an animal to the occupancy
    pub fn add(&mut self, id: AnimalId) -> Result<(), InvariantViolation> {
        if self.contains(id) {
            return Err(InvariantViolation::DuplicateOccupant {
                id,
                coord: self.coord,
            });
        }
        self.occupants.push(id);
        Ok(())
    }

    /// Remove an animal from the occupancy by identity
    pub fn remove(&mut self, id: AnimalId) -> Result<(), InvariantViolation> {
        match self.occupants.iter().position(|&occupant| occupant == id) {
            Some(index) => {
                self.occupants.remove(index);
                Ok(())
            }
            None => Err(InvariantViolation::AbsentOccupant {
                id,
                coord: self.coord,
            }),
        }
    }

    /// Whether any alive animal of the given species occupies this patch.
    /// Scans the whole occupancy list.
    pub fn has_alive(
        &self,
        species: Species,
        animals: &[Animal],
        config: &SimulationConfig,
    ) -> bool {
        let population = config.population(species);
        self.occupants.iter().any(|&id| {
            let animal = &animals[id];
            animal.species() == species && animal.is_alive(population)
        })
    }

    pub fn has_alive_rabbit(&self, animals: &[Animal], config: &SimulationConfig) -> bool {
        self.has_alive(Species::Rabbit, animals, config)
    }

    pub fn has_alive_fox(&self, animals: &[Animal], config: &SimulationConfig) -> bool {
        self.has_alive(Species::Fox, animals, config)
    }
}

/// Read-only view of one occupant, for external visualizers
#[derive(Debug, Clone, Serialize)]
pub struct OccupantView {
    pub id: AnimalId,
    pub species: Species,
    pub alive: bool,
}

/// Read-only view of one patch, for external visualizers
#[derive(Debug, Clone, Serialize)]
pub struct PatchView {
    pub coord: Coord,
    pub grass: u32,
    pub occupants: Vec<OccupantView>,
}

/// Fixed-size rectangular matrix of patches, row-major
#[derive(Debug, Clone)]
pub struct WorldGrid {
    north_south: usize,
    west_east: usize,
    patches: Vec<Patch>,
}

impl WorldGrid {
    pub fn new(world: &WorldConfig) -> Self {
        let north_south = world.north_south_length;
        let west_east = world.west_east_length;
        let patches = (0..north_south)
            .flat_map(|ns| (0..west_east).map(move |we| Patch::new(Coord::new(ns, we))))
            .collect();
        Self {
            north_south,
            west_east,
            patches,
        }
    }

    /// Seed every patch with a uniform random initial grass amount
    pub fn seed_grass(&mut self, world: &WorldConfig, rng: &mut impl Rng) {
        for patch in &mut self.patches {
            patch.grass = rng.gen_range(0..=world.max_grass_amount);
        }
    }

    #[inline]
    pub fn north_south(&self) -> usize {
        self.north_south
    }

    #[inline]
    pub fn west_east(&self) -> usize {
        self.west_east
    }

    #[inline]
    fn index(&self, coord: Coord) -> usize {
        coord.ns * self.west_east + coord.we
    }

    pub fn patch(&self, coord: Coord) -> &Patch {
        &self.patches[self.index(coord)]
    }

    pub fn patch_mut(&mut self, coord: Coord) -> &mut Patch {
        let index = self.index(coord);
        &mut self.patches[index]
    }

    /// All patches in row-major order
    pub fn iter(&self) -> impl Iterator<Item = &Patch> {
        self.patches.iter()
    }

    /// All coordinates in row-major traversal order
    pub fn coords(&self) -> Vec<Coord> {
        self.patches.iter().map(|patch| patch.coord()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_world() -> WorldConfig {
        WorldConfig::default()
    }

    #[test]
    fn test_add_remove_roundtrip() {
        let mut patch = Patch::new(Coord::new(2, 3));
        patch.add(0).unwrap();
        patch.add(1).unwrap();
        let before = patch.occupants().to_vec();

        patch.add(7).unwrap();
        patch.remove(7).unwrap();

        assert_eq!(patch.occupants(), &before[..]);
    }

    #[test]
    fn test_duplicate_add_rejected() {
        let mut patch = Patch::new(Coord::new(0, 0));
        patch.add(3).unwrap();

        assert_eq!(
            patch.add(3),
            Err(InvariantViolation::DuplicateOccupant {
                id: 3,
                coord: Coord::new(0, 0)
            })
        );
        assert_eq!(patch.occupants().len(), 1);
    }

    #[test]
    fn test_remove_absent_rejected() {
        let mut patch = Patch::new(Coord::new(1, 1));

        assert_eq!(
            patch.remove(9),
            Err(InvariantViolation::AbsentOccupant {
                id: 9,
                coord: Coord::new(1, 1)
            })
        );
    }

    #[test]
    fn test_grass_growth_respects_ceiling_quirk() {
        let world = WorldConfig {
            max_grass_amount: 10,
            min_grass_growth: 3,
            max_grass_growth: 3,
            ..test_world()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut patch = Patch::new(Coord::new(0, 0));
        patch.grass = 10;

        // At the ceiling the patch still grows once...
        patch.tick(&world, &mut rng);
        assert_eq!(patch.grass(), 13);

        // ...but past it, growth stops.
        patch.tick(&world, &mut rng);
        assert_eq!(patch.grass(), 13);
    }

    #[test]
    fn test_grid_layout_row_major() {
        let world = WorldConfig {
            north_south_length: 3,
            west_east_length: 4,
            ..test_world()
        };
        let grid = WorldGrid::new(&world);

        let coords = grid.coords();
        assert_eq!(coords.len(), 12);
        assert_eq!(coords[0], Coord::new(0, 0));
        assert_eq!(coords[4], Coord::new(1, 0));
        assert_eq!(coords[11], Coord::new(2, 3));
        assert_eq!(grid.patch(Coord::new(2, 3)).coord(), Coord::new(2, 3));
    }

    #[test]
    fn test_seed_grass_within_bounds() {
        let world = test_world();
        let mut grid = WorldGrid::new(&world);
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        grid.seed_grass(&world, &mut rng);

        assert!(grid.iter().all(|p| p.grass() <= world.max_grass_amount));
    }
}
