//! Integration tests for WARREN

use warren::topology::neighbor_coords;
use warren::{Coord, Movement, SimulationConfig, Species, World};

fn small_config() -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.world.north_south_length = 10;
    config.world.west_east_length = 10;
    config.rabbits.initial_size = 30;
    config.foxes.initial_size = 10;
    config
}

#[test]
fn test_full_simulation_cycle() {
    let mut world = World::new_with_seed(small_config(), 12345).unwrap();

    world.run(200).unwrap();

    assert_eq!(world.time(), 200);
    assert_eq!(world.stats.steps, 200);
    assert_eq!(world.stats.rabbits.size_per_step.len(), 200);
    assert_eq!(world.stats.foxes.size_per_step.len(), 200);
    assert_eq!(world.stats.avg_energy_per_step.len(), 200);

    // Every animal record stays coordinate-valid for the whole run.
    for animal in world.animals() {
        let coord = animal.coord();
        assert!(coord.ns < 10 && coord.we < 10);
    }
}

#[test]
fn test_kill_matrix_matches_predation_count() {
    let mut world = World::new_with_seed(small_config(), 99).unwrap();

    world.run(300).unwrap();

    let kills: u64 = world.stats.total_kills();
    assert_eq!(kills, world.stats.rabbits.dead_by_predation);
    // Foxes have no predator.
    assert_eq!(world.stats.foxes.dead_by_predation, 0);

    // The kill matrix matches the world shape.
    assert_eq!(world.stats.kills_per_patch.len(), 10);
    assert!(world.stats.kills_per_patch.iter().all(|row| row.len() == 10));
}

#[test]
fn test_reproducibility() {
    let config = small_config();

    let mut world1 = World::new_with_seed(config.clone(), 4242).unwrap();
    let mut world2 = World::new_with_seed(config, 4242).unwrap();

    world1.run(150).unwrap();
    world2.run(150).unwrap();

    // Single-threaded with one seeded generator: identical runs.
    assert_eq!(world1.stats, world2.stats);
    assert_eq!(
        world1.population(Species::Rabbit),
        world2.population(Species::Rabbit)
    );
    assert_eq!(
        world1.population(Species::Fox),
        world2.population(Species::Fox)
    );
}

#[test]
fn test_different_seeds_diverge() {
    let config = small_config();

    let mut world1 = World::new_with_seed(config.clone(), 1).unwrap();
    let mut world2 = World::new_with_seed(config, 2).unwrap();

    world1.run(100).unwrap();
    world2.run(100).unwrap();

    assert_ne!(world1.stats, world2.stats);
}

#[test]
fn test_extinction_does_not_halt_run() {
    let mut config = small_config();
    // Starve everything quickly.
    config.rabbits.metabolism = 100.0;
    config.foxes.metabolism = 300.0;

    let mut world = World::new_with_seed(config, 5).unwrap();
    world.run(50).unwrap();

    assert!(world.is_extinct());
    // The run still executed every configured step and kept recording.
    assert_eq!(world.time(), 50);
    assert_eq!(world.stats.rabbits.size_per_step.len(), 50);
    assert_eq!(*world.stats.rabbits.size_per_step.last().unwrap(), 0);
}

#[test]
fn test_deaths_are_classified_and_aged() {
    let mut world = World::new_with_seed(small_config(), 31).unwrap();
    world.run(300).unwrap();

    for stats in [&world.stats.rabbits, &world.stats.foxes] {
        let classified =
            stats.dead_by_old_age + stats.dead_by_starvation + stats.dead_by_predation;
        assert_eq!(classified, stats.age_at_death.len() as u64);
    }

    // Rabbits die of something in 300 steps with default parameters.
    assert!(!world.stats.rabbits.age_at_death.is_empty());
}

#[test]
fn test_total_population_accounting() {
    let config = small_config();
    let mut world = World::new_with_seed(config.clone(), 77).unwrap();
    world.run(200).unwrap();

    // Totals start at the initial sizes and only grow by births.
    assert!(world.stats.rabbits.total >= config.rabbits.initial_size as u64);
    assert!(world.stats.foxes.total >= config.foxes.initial_size as u64);
    assert_eq!(
        world.animals().len() as u64,
        world.stats.rabbits.total + world.stats.foxes.total
    );
}

#[test]
fn test_island_corner_queen_neighbors() {
    let mut config = small_config();
    config.world.north_south_length = 5;
    config.world.west_east_length = 5;
    config.world.is_toroid = false;
    config.rabbits.initial_size = 5;
    config.foxes.initial_size = 2;

    // A fox at the corner still resolves eight in-range neighbors.
    let neighbors = neighbor_coords(&config.world, Coord::new(0, 0), Movement::Queen);
    assert_eq!(neighbors.len(), 8);
    assert!(neighbors.iter().all(|c| c.ns < 5 && c.we < 5));

    // And an island run works end to end.
    let mut world = World::new_with_seed(config, 8).unwrap();
    world.run(50).unwrap();
    assert_eq!(world.time(), 50);
}

#[test]
fn test_movement_patterns_run() {
    for movement in [Movement::Rook, Movement::Bishop, Movement::Queen] {
        let mut config = small_config();
        config.execution.movement = movement;

        let mut world = World::new_with_seed(config, 21).unwrap();
        world.run(50).unwrap();
        assert_eq!(world.time(), 50);
    }
}

#[test]
fn test_patch_views_cover_grid() {
    let mut world = World::new_with_seed(small_config(), 3).unwrap();
    world.run(10).unwrap();

    let views = world.patch_views();
    assert_eq!(views.len(), 100);

    // Row-major flattening, grass within the overshoot bound.
    assert_eq!(views[0].coord, Coord::new(0, 0));
    assert_eq!(views[10].coord, Coord::new(1, 0));
    let bound = world.config.world.max_grass_amount + world.config.world.max_grass_growth;
    assert!(views.iter().all(|view| view.grass <= bound));
}

#[test]
fn test_run_with_callback_observes_every_step() {
    let mut world = World::new_with_seed(small_config(), 55).unwrap();

    let mut observed = Vec::new();
    world
        .run_with_callback(20, |world, i| {
            observed.push((i, world.time()));
        })
        .unwrap();

    assert_eq!(observed.len(), 20);
    assert_eq!(observed[0], (0, 1));
    assert_eq!(observed[19], (19, 20));
}

#[test]
fn test_stats_json_roundtrip() {
    let mut world = World::new_with_seed(small_config(), 66).unwrap();
    world.run(40).unwrap();

    let path = "/tmp/warren_test_stats.json";
    world.stats.save_json(path).unwrap();
    let loaded = warren::SimulationStats::load_json(path).unwrap();

    assert_eq!(loaded, world.stats);

    std::fs::remove_file(path).ok();
}
