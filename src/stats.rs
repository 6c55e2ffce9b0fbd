//! Statistics tracking for the simulation.

use crate::config::{PopulationConfig, SimulationConfig};
use crate::entity::{Animal, AnimalId, Species};
use serde::{Deserialize, Serialize};

/// Why an animal died
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DeathCause {
    OldAge,
    Starvation,
    Predation,
}

/// Classify a dead animal's cause of death.
///
/// The priority order is fixed: old age over starvation over predation.
/// Returns `None` for an animal that is still alive.
pub fn classify_death(animal: &Animal, population: &PopulationConfig) -> Option<DeathCause> {
    if animal.is_alive(population) {
        return None;
    }
    if animal.age() >= population.max_age {
        Some(DeathCause::OldAge)
    } else if animal.energy() <= 0.0 {
        Some(DeathCause::Starvation)
    } else if animal.was_killed() {
        Some(DeathCause::Predation)
    } else {
        None
    }
}

/// Raw record of one orchestrator pass over the grid.
///
/// Visited lists keep visit order and deduplicate animals that were
/// processed twice in one step (an animal that moved into a patch the
/// pass had not reached yet).
#[derive(Debug, Clone, Default)]
pub struct StepRecord {
    visited_rabbits: Vec<AnimalId>,
    visited_foxes: Vec<AnimalId>,
    newborn_rabbits: usize,
    newborn_foxes: usize,
}

impl StepRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a visit; repeated visits of the same animal are kept once
    pub fn visit(&mut self, id: AnimalId, species: Species) {
        let visited = match species {
            Species::Rabbit => &mut self.visited_rabbits,
            Species::Fox => &mut self.visited_foxes,
        };
        if !visited.contains(&id) {
            visited.push(id);
        }
    }

    /// Record a birth
    pub fn record_birth(&mut self, species: Species) {
        match species {
            Species::Rabbit => self.newborn_rabbits += 1,
            Species::Fox => self.newborn_foxes += 1,
        }
    }

    pub fn visited(&self, species: Species) -> &[AnimalId] {
        match species {
            Species::Rabbit => &self.visited_rabbits,
            Species::Fox => &self.visited_foxes,
        }
    }

    pub fn newborns(&self, species: Species) -> usize {
        match species {
            Species::Rabbit => self.newborn_rabbits,
            Species::Fox => self.newborn_foxes,
        }
    }
}

/// Cumulative statistics for one species
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationStats {
    /// Animals that ever existed: initial population plus every birth
    pub total: u64,
    /// Alive animals observed at each step
    pub size_per_step: Vec<usize>,
    /// Mean energy over the animals observed at each step, 0 when none
    pub avg_energy_per_step: Vec<f64>,
    /// Age of each animal at death, in classification order
    pub age_at_death: Vec<u32>,
    pub dead_by_old_age: u64,
    pub dead_by_starvation: u64,
    pub dead_by_predation: u64,
}

/// Cumulative statistics for a whole run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationStats {
    pub rabbits: PopulationStats,
    pub foxes: PopulationStats,
    /// Sum of both species' per-step energy averages
    pub avg_energy_per_step: Vec<f64>,
    /// Predation kills at each patch coordinate, matching the world shape
    pub kills_per_patch: Vec<Vec<u64>>,
    /// Steps recorded so far
    pub steps: u64,
}

impl SimulationStats {
    /// Create empty statistics shaped for the given configuration
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            rabbits: PopulationStats {
                total: config.rabbits.initial_size as u64,
                ..PopulationStats::default()
            },
            foxes: PopulationStats {
                total: config.foxes.initial_size as u64,
                ..PopulationStats::default()
            },
            avg_energy_per_step: Vec::new(),
            kills_per_patch: vec![
                vec![0; config.world.west_east_length];
                config.world.north_south_length
            ],
            steps: 0,
        }
    }

    /// Fold one step's raw record into the cumulative statistics
    pub fn record_step(
        &mut self,
        record: &StepRecord,
        animals: &[Animal],
        config: &SimulationConfig,
    ) {
        let rabbit_avg = Self::record_population(
            &mut self.rabbits,
            record.visited(Species::Rabbit),
            record.newborns(Species::Rabbit),
            animals,
            &config.rabbits,
            &mut self.kills_per_patch,
        );
        let fox_avg = Self::record_population(
            &mut self.foxes,
            record.visited(Species::Fox),
            record.newborns(Species::Fox),
            animals,
            &config.foxes,
            &mut self.kills_per_patch,
        );

        self.avg_energy_per_step.push(fox_avg + rabbit_avg);
        self.steps += 1;
    }

    fn record_population(
        stats: &mut PopulationStats,
        visited: &[AnimalId],
        newborns: usize,
        animals: &[Animal],
        population: &PopulationConfig,
        kills_per_patch: &mut [Vec<u64>],
    ) -> f64 {
        stats.total += newborns as u64;

        let mut total_energy = 0.0f64;
        let mut alive = 0usize;

        for &id in visited {
            let animal = &animals[id];
            total_energy += animal.energy();

            if animal.is_alive(population) {
                alive += 1;
                continue;
            }

            stats.age_at_death.push(animal.age());
            match classify_death(animal, population) {
                Some(DeathCause::OldAge) => stats.dead_by_old_age += 1,
                Some(DeathCause::Starvation) => stats.dead_by_starvation += 1,
                Some(DeathCause::Predation) => {
                    stats.dead_by_predation += 1;
                    let coord = animal.coord();
                    kills_per_patch[coord.ns][coord.we] += 1;
                }
                None => {}
            }
        }

        stats.size_per_step.push(alive);
        let avg = if visited.is_empty() {
            0.0
        } else {
            total_energy / visited.len() as f64
        };
        stats.avg_energy_per_step.push(avg);
        avg
    }

    /// Total predation kills across the grid
    pub fn total_kills(&self) -> u64 {
        self.kills_per_patch.iter().flatten().sum()
    }

    /// Format the latest step as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "T:{:5} | Rabbits:{:4} (E:{:6.1}) | Foxes:{:4} (E:{:6.1})",
            self.steps,
            self.rabbits.size_per_step.last().copied().unwrap_or(0),
            self.rabbits.avg_energy_per_step.last().copied().unwrap_or(0.0),
            self.foxes.size_per_step.last().copied().unwrap_or(0),
            self.foxes.avg_energy_per_step.last().copied().unwrap_or(0.0),
        )
    }

    /// Save statistics to a JSON file
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Load statistics from a JSON file
    pub fn load_json(path: &str) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Coord;

    fn test_config() -> SimulationConfig {
        SimulationConfig::default()
    }

    fn rabbit(id: AnimalId, age: u32, energy: f64) -> Animal {
        Animal::new(id, Species::Rabbit, Coord::new(1, 2), age, energy)
    }

    #[test]
    fn test_classify_death_priority() {
        let population = PopulationConfig::default_rabbits();

        // Old age wins over everything else.
        let mut old_and_starved = rabbit(0, population.max_age, 0.0);
        old_and_starved.mark_killed();
        assert_eq!(
            classify_death(&old_and_starved, &population),
            Some(DeathCause::OldAge)
        );

        // Starvation wins over predation.
        let mut starved_and_killed = rabbit(1, 2, 0.0);
        starved_and_killed.mark_killed();
        assert_eq!(
            classify_death(&starved_and_killed, &population),
            Some(DeathCause::Starvation)
        );

        let mut killed = rabbit(2, 2, 10.0);
        killed.mark_killed();
        assert_eq!(classify_death(&killed, &population), Some(DeathCause::Predation));

        assert_eq!(classify_death(&rabbit(3, 2, 10.0), &population), None);
    }

    #[test]
    fn test_step_record_deduplicates_visits() {
        let mut record = StepRecord::new();
        record.visit(4, Species::Rabbit);
        record.visit(5, Species::Rabbit);
        record.visit(4, Species::Rabbit);
        record.visit(4, Species::Fox);

        assert_eq!(record.visited(Species::Rabbit), &[4, 5]);
        assert_eq!(record.visited(Species::Fox), &[4]);
    }

    #[test]
    fn test_record_step_averages_and_sizes() {
        let config = test_config();
        let animals = vec![
            rabbit(0, 2, 10.0),
            rabbit(1, 2, 0.0), // starved
            rabbit(2, 2, 20.0),
        ];

        let mut record = StepRecord::new();
        for animal in &animals {
            record.visit(animal.id(), Species::Rabbit);
        }
        record.record_birth(Species::Rabbit);

        let mut stats = SimulationStats::new(&config);
        stats.record_step(&record, &animals, &config);

        assert_eq!(stats.steps, 1);
        assert_eq!(stats.rabbits.total, config.rabbits.initial_size as u64 + 1);
        assert_eq!(stats.rabbits.size_per_step, vec![2]);
        // Dead animals still contribute their (frozen) energy to the mean.
        assert_eq!(stats.rabbits.avg_energy_per_step, vec![10.0]);
        assert_eq!(stats.rabbits.dead_by_starvation, 1);
        assert_eq!(stats.rabbits.age_at_death, vec![2]);
        // No foxes were visited, so the fox average defaults to zero.
        assert_eq!(stats.foxes.avg_energy_per_step, vec![0.0]);
        assert_eq!(stats.avg_energy_per_step, vec![10.0]);
    }

    #[test]
    fn test_predation_updates_kill_matrix() {
        let config = test_config();
        let mut killed = rabbit(0, 2, 10.0);
        killed.mark_killed();
        let animals = vec![killed];

        let mut record = StepRecord::new();
        record.visit(0, Species::Rabbit);

        let mut stats = SimulationStats::new(&config);
        stats.record_step(&record, &animals, &config);

        assert_eq!(stats.rabbits.dead_by_predation, 1);
        assert_eq!(stats.kills_per_patch[1][2], 1);
        assert_eq!(stats.total_kills(), 1);
    }

    #[test]
    fn test_empty_step_average_is_zero() {
        let config = test_config();
        let mut stats = SimulationStats::new(&config);

        stats.record_step(&StepRecord::new(), &[], &config);

        assert_eq!(stats.rabbits.avg_energy_per_step, vec![0.0]);
        assert_eq!(stats.avg_energy_per_step, vec![0.0]);
        assert_eq!(stats.rabbits.size_per_step, vec![0]);
    }
}
