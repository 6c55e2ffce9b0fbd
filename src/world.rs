//! World simulation engine - main simulation loop.

use crate::config::{ConfigError, PopulationConfig, SimulationConfig};
use crate::entity::{Animal, AnimalId, Species};
use crate::grid::{Coord, InvariantViolation, OccupantView, PatchView, WorldGrid};
use crate::stats::{SimulationStats, StepRecord};
use crate::topology::{neighbor_coords, Movement};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// The simulation world
pub struct World {
    // Environment
    grid: WorldGrid,

    // Animal registry: every animal ever created this run, addressed by
    // id. Dead animals stay frozen here but leave all patch occupancy.
    animals: Vec<Animal>,

    // State
    time: u64,

    // Configuration
    pub config: SimulationConfig,

    // Statistics
    pub stats: SimulationStats,

    // Random number generator (seeded for reproducibility)
    rng: ChaCha8Rng,
    seed: u64,
}

impl World {
    /// Create a new populated world with the given configuration
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        let seed = rand::thread_rng().gen();
        Self::new_with_seed(config, seed)
    }

    /// Create a new populated world with a specific seed for reproducibility
    pub fn new_with_seed(config: SimulationConfig, seed: u64) -> Result<Self, ConfigError> {
        let mut world = Self::empty_with_seed(config, seed)?;
        world.populate();

        log::info!(
            "world initialized: {} rabbits, {} foxes on {}x{} grid, seed {}",
            world.population(Species::Rabbit),
            world.population(Species::Fox),
            world.config.world.north_south_length,
            world.config.world.west_east_length,
            seed
        );

        Ok(world)
    }

    /// Create a world with grass but no animals; callers place animals
    /// through [`World::spawn`]. Useful for scripted scenarios and tests.
    pub fn empty_with_seed(config: SimulationConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut grid = WorldGrid::new(&config.world);
        grid.seed_grass(&config.world, &mut rng);
        let stats = SimulationStats::new(&config);

        Ok(Self {
            grid,
            animals: Vec::new(),
            time: 0,
            config,
            stats,
            rng,
            seed,
        })
    }

    // Place the initial populations, foxes first. Each species gets
    // distinct coordinates within itself; a fox and a rabbit may share a
    // patch. Initial energy is the species ceiling, initial age uniform
    // below the species maximum.
    fn populate(&mut self) {
        for species in [Species::Fox, Species::Rabbit] {
            let population = self.config.population(species).clone();
            let mut taken: Vec<Coord> = Vec::with_capacity(population.initial_size);

            for _ in 0..population.initial_size {
                let coord = loop {
                    let candidate = Coord::new(
                        self.rng.gen_range(0..self.config.world.north_south_length),
                        self.rng.gen_range(0..self.config.world.west_east_length),
                    );
                    if !taken.contains(&candidate) {
                        break candidate;
                    }
                };
                taken.push(coord);

                let age = self.rng.gen_range(0..population.max_age);
                self.spawn(species, coord, age, population.max_energy)
                    .expect("fresh coordinate cannot hold a duplicate");
            }
        }
    }

    /// Create an animal and add it to the patch at `coord`.
    ///
    /// Returns the id of the new animal.
    pub fn spawn(
        &mut self,
        species: Species,
        coord: Coord,
        age: u32,
        energy: f64,
    ) -> Result<AnimalId, InvariantViolation> {
        let id = self.animals.len();
        self.animals.push(Animal::new(id, species, coord, age, energy));
        self.grid.patch_mut(coord).add(id)?;
        Ok(id)
    }

    /// Advance the whole grid by one step.
    ///
    /// Patches are visited in row-major order. Each patch first grows
    /// grass, then its occupants - snapshotted at the moment the patch is
    /// visited - are processed in occupancy order: tick, feed, reproduce
    /// or move. Mutations made mid-pass are visible to later visits; an
    /// occupant removed before its turn is skipped. Both effects are part
    /// of the simulation's semantics, not accidents of iteration.
    pub fn step(&mut self) -> Result<(), InvariantViolation> {
        let mut record = StepRecord::new();

        for coord in self.grid.coords() {
            self.grid
                .patch_mut(coord)
                .tick(&self.config.world, &mut self.rng);

            let snapshot = self.grid.patch(coord).occupants().to_vec();
            for id in snapshot {
                if !self.grid.patch(coord).contains(id) {
                    // Killed earlier in this patch's pass.
                    continue;
                }
                record.visit(id, self.animals[id].species());
                self.process_animal(id, &mut record)?;
            }
        }

        self.stats.record_step(&record, &self.animals, &self.config);
        self.time += 1;
        Ok(())
    }

    // One animal's turn: age and pay metabolism, feed, then either
    // reproduce into a neighboring empty patch or move.
    fn process_animal(
        &mut self,
        id: AnimalId,
        record: &mut StepRecord,
    ) -> Result<(), InvariantViolation> {
        let species = self.animals[id].species();
        let population = self.config.population(species).clone();

        // Tick: on death the animal leaves its patch immediately.
        let was_alive = self.animals[id].is_alive(&population);
        self.animals[id].tick(&population);
        if was_alive && !self.animals[id].is_alive(&population) {
            let coord = self.animals[id].coord();
            self.grid.patch_mut(coord).remove(id)?;
        }

        // Feed.
        match species {
            Species::Rabbit => self.rabbit_graze(id, &population),
            Species::Fox => self.fox_feed(id, &population)?,
        }

        // Reproduce, and only when no newborn was produced, move.
        let newborn = self.try_reproduce(id, &population)?;
        match newborn {
            Some(_) => record.record_birth(species),
            None => {
                if self.animals[id].is_alive(&population) {
                    self.try_move(id)?;
                }
            }
        }

        Ok(())
    }

    fn rabbit_graze(&mut self, id: AnimalId, population: &PopulationConfig) {
        if !self.animals[id].is_alive(population) {
            return;
        }
        let coord = self.animals[id].coord();
        let grass = self.grid.patch(coord).grass();
        let eaten = self.animals[id].graze(population, grass);
        if eaten > 0 {
            self.grid.patch_mut(coord).consume_grass(eaten);
        }
    }

    // A hungry fox kills at most one rabbit per turn: the first alive one
    // in the patch's occupancy order.
    fn fox_feed(
        &mut self,
        id: AnimalId,
        population: &PopulationConfig,
    ) -> Result<(), InvariantViolation> {
        let fox = &self.animals[id];
        if !fox.is_alive(population) || fox.energy() >= population.max_energy {
            return Ok(());
        }

        let coord = fox.coord();
        let rabbits = &self.config.rabbits;
        let victim = self
            .grid
            .patch(coord)
            .occupants()
            .iter()
            .copied()
            .find(|&candidate| {
                let animal = &self.animals[candidate];
                animal.species() == Species::Rabbit && animal.is_alive(rabbits)
            });

        if let Some(victim) = victim {
            self.kill_rabbit(victim)?;
            self.animals[id].consume_prey(population);
        }
        Ok(())
    }

    /// Kill a rabbit: remove it from its patch and set the permanent
    /// predation marker, atomically. Repeated calls are no-ops.
    pub fn kill_rabbit(&mut self, id: AnimalId) -> Result<(), InvariantViolation> {
        if self.animals[id].was_killed() {
            return Ok(());
        }
        let coord = self.animals[id].coord();
        self.grid.patch_mut(coord).remove(id)?;
        self.animals[id].mark_killed();
        Ok(())
    }

    // Reproduction looks at queen neighbors regardless of the configured
    // movement pattern. It needs a mate patch (an alive same-species
    // occupant, no alive predator) and an empty patch for the newborn.
    // The spawn patch is drawn before the probability roll; both draws
    // are part of the deterministic stream.
    fn try_reproduce(
        &mut self,
        id: AnimalId,
        population: &PopulationConfig,
    ) -> Result<Option<AnimalId>, InvariantViolation> {
        if !self.animals[id].is_alive(population) {
            return Ok(None);
        }

        let species = self.animals[id].species();
        let origin = self.animals[id].coord();
        let neighbors = neighbor_coords(&self.config.world, origin, Movement::Queen);

        let mates: Vec<Coord> = neighbors
            .iter()
            .copied()
            .filter(|&coord| {
                let patch = self.grid.patch(coord);
                self.animals[id].same_species_in(patch, &self.animals, &self.config)
                    && !self.animals[id].predators_in(patch, &self.animals, &self.config)
            })
            .collect();
        let empty: Vec<Coord> = neighbors
            .iter()
            .copied()
            .filter(|&coord| self.grid.patch(coord).is_empty())
            .collect();

        if mates.is_empty() || empty.is_empty() || !self.animals[id].can_reproduce(population) {
            return Ok(None);
        }

        let target = empty[self.rng.gen_range(0..empty.len())];
        if self.rng.gen::<f64>() > population.reproduction_probability {
            return Ok(None);
        }

        self.animals[id].pay_reproduction_cost(population);
        let newborn = self.spawn(species, target, 0, species.birth_energy(population))?;

        // The cost may have starved the parent.
        if !self.animals[id].is_alive(population) {
            self.grid.patch_mut(origin).remove(id)?;
        }

        Ok(Some(newborn))
    }

    // Move to a random neighbor patch holding no alive same-species
    // occupant. Predator presence is not checked here - an animal may
    // walk into a predator's patch. With no candidate the animal stays.
    fn try_move(&mut self, id: AnimalId) -> Result<(), InvariantViolation> {
        let origin = self.animals[id].coord();
        let neighbors = neighbor_coords(&self.config.world, origin, self.config.execution.movement);

        let candidates: Vec<Coord> = neighbors
            .iter()
            .copied()
            .filter(|&coord| {
                !self.animals[id].same_species_in(
                    self.grid.patch(coord),
                    &self.animals,
                    &self.config,
                )
            })
            .collect();

        if candidates.is_empty() {
            return Ok(());
        }
        let destination = candidates[self.rng.gen_range(0..candidates.len())];
        self.move_animal(id, destination)
    }

    /// Relocate an alive animal to `destination`, updating both patches
    /// and the animal's back-reference.
    pub fn move_animal(
        &mut self,
        id: AnimalId,
        destination: Coord,
    ) -> Result<(), InvariantViolation> {
        let population = self.config.population(self.animals[id].species());
        if !self.animals[id].is_alive(population) {
            return Err(InvariantViolation::DeadAnimal {
                id,
                operation: "move",
            });
        }

        let origin = self.animals[id].coord();
        self.grid.patch_mut(origin).remove(id)?;
        self.grid.patch_mut(destination).add(id)?;
        self.animals[id].relocate(destination);
        Ok(())
    }

    /// Run the simulation for the specified number of steps.
    ///
    /// Extinction of either or both species does not end the run early.
    pub fn run(&mut self, steps: u64) -> Result<(), InvariantViolation> {
        for _ in 0..steps {
            self.step()?;
        }
        Ok(())
    }

    /// Run with a read-only callback invoked after every step
    pub fn run_with_callback<F>(&mut self, steps: u64, mut callback: F) -> Result<(), InvariantViolation>
    where
        F: FnMut(&World, u64),
    {
        for i in 0..steps {
            self.step()?;
            callback(self, i);
        }
        Ok(())
    }

    /// Count of alive animals of one species
    pub fn population(&self, species: Species) -> usize {
        let config = self.config.population(species);
        self.animals
            .iter()
            .filter(|animal| animal.species() == species && animal.is_alive(config))
            .count()
    }

    /// True when both species have died out
    pub fn is_extinct(&self) -> bool {
        self.population(Species::Rabbit) == 0 && self.population(Species::Fox) == 0
    }

    /// Steps simulated so far
    pub fn time(&self) -> u64 {
        self.time
    }

    /// Seed for reproducibility
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Every animal created this run, alive or dead, by id
    pub fn animals(&self) -> &[Animal] {
        &self.animals
    }

    /// The patch at `coord`
    pub fn patch(&self, coord: Coord) -> &crate::grid::Patch {
        self.grid.patch(coord)
    }

    /// Flattened read-only snapshot of the grid for external visualizers
    pub fn patch_views(&self) -> Vec<PatchView> {
        self.grid
            .iter()
            .map(|patch| PatchView {
                coord: patch.coord(),
                grass: patch.grass(),
                occupants: patch
                    .occupants()
                    .iter()
                    .map(|&id| {
                        let animal = &self.animals[id];
                        OccupantView {
                            id,
                            species: animal.species(),
                            alive: animal.is_alive(self.config.population(animal.species())),
                        }
                    })
                    .collect(),
            })
            .collect()
    }

    /// Consume the world, yielding the run's cumulative statistics
    pub fn into_stats(self) -> SimulationStats {
        self.stats
    }
}
