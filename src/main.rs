//! WARREN - CLI Entry Point
//!
//! Discrete-time predator-prey ecosystem simulator.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use warren::{report, Species, SimulationConfig, World};

#[derive(Parser)]
#[command(name = "warren")]
#[command(version)]
#[command(about = "Discrete-time fox/rabbit ecosystem simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "warren.yaml")]
        config: PathBuf,

        /// Number of steps, overriding the configured max_steps
        #[arg(short, long)]
        steps: Option<u64>,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Write final statistics to a JSON file
        #[arg(long)]
        stats_out: Option<PathBuf>,

        /// Quiet mode (no per-step output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "warren.yaml")]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            steps,
            seed,
            stats_out,
            quiet,
        } => run_simulation(config, steps, seed, stats_out, quiet),

        Commands::Init { output } => generate_config(output),
    }
}

fn run_simulation(
    config_path: PathBuf,
    steps: Option<u64>,
    seed: Option<u64>,
    stats_out: Option<PathBuf>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Load or create config
    let config = if config_path.exists() {
        println!("Loading config from: {:?}", config_path);
        SimulationConfig::from_file(&config_path)?
    } else {
        println!("Using default configuration");
        SimulationConfig::default()
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.log_level.as_str()),
    )
    .init();

    let mut world = match seed {
        Some(seed) => {
            println!("Using seed: {}", seed);
            World::new_with_seed(config.clone(), seed)?
        }
        None => World::new(config.clone())?,
    };

    let steps = steps.unwrap_or(config.execution.max_steps);

    println!("Starting simulation");
    println!(
        "  Grid: {}x{} ({})",
        config.world.north_south_length,
        config.world.west_east_length,
        if config.world.is_toroid { "toroid" } else { "island" },
    );
    println!("  Rabbits: {}", world.population(Species::Rabbit));
    println!("  Foxes: {}", world.population(Species::Fox));
    println!("  Steps: {}", steps);
    println!();

    let start = Instant::now();

    if config.execution.batch {
        let stats_interval = config.logging.stats_interval.max(1);
        for i in 0..steps {
            world.step()?;
            if !quiet && i % stats_interval == 0 {
                println!("{}", world.stats.summary());
            }
        }
    } else {
        let delay = Duration::from_secs_f64(config.execution.step_delay.max(0.0));
        world.run_with_callback(steps, |world, _| {
            render(world);
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }
        })?;
    }

    let elapsed = start.elapsed();

    println!();
    println!("=== Simulation Complete ===");
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Steps: {}", world.time());
    println!("Seed: {}", world.seed());
    println!();
    print!("{}", report::summary_table(&world.stats));

    if let Some(path) = stats_out {
        world.stats.save_json(path.to_str().unwrap())?;
        println!("Statistics saved to: {:?}", path);
    }

    Ok(())
}

// Terminal renderer on the read-only patch views: foxes and rabbits as
// letters, otherwise a glyph for the grass level.
fn render(world: &World) {
    let cols = world.config.world.west_east_length;
    let max_grass = world.config.world.max_grass_amount.max(1);

    // Clear screen, cursor home.
    print!("\x1B[2J\x1B[H");
    println!("{}", world.stats.summary());

    let views = world.patch_views();
    for row in views.chunks(cols) {
        let line: String = row
            .iter()
            .map(|patch| {
                if patch.occupants.iter().any(|o| o.species == Species::Fox) {
                    'F'
                } else if patch.occupants.iter().any(|o| o.species == Species::Rabbit) {
                    'r'
                } else {
                    match 4 * patch.grass / max_grass {
                        0 => ' ',
                        1 => '.',
                        2 => ':',
                        _ => '*',
                    }
                }
            })
            .collect();
        println!("{}", line);
    }
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = SimulationConfig::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}
