//! neurodrive - evolve feedforward steering controllers
//!
//! The binary is the external side of the engine's evaluation contract:
//! it owns the toy steering harness, drives the generational loop, and
//! handles statistics and persistence of the best controller.
//!
//! ```bash
//! # default run: 30 controllers, topology 3,6,2, 100 generations
//! cargo run --release
//!
//! # deterministic elitist run with statistics
//! cargo run --release -- --seed 7 --elitist --stats run.tsv
//! ```

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use neurodrive_evolution::{EngineConfig, EvolutionEngine, PopulationStats};
use neurodrive_genetics::selection::DEFAULT_ELITE_COUNT;
use neurodrive_genetics::SelectionStrategy;
use neurodrive_network::NeuralNetwork;

mod harness;

use harness::SteeringHarness;

#[derive(Parser, Debug)]
#[command(name = "neurodrive")]
#[command(about = "Generational neuroevolution of feedforward steering controllers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Network topology as comma-separated layer sizes
    #[arg(long, default_value = "3,6,2")]
    topology: String,

    /// Population size
    #[arg(long)]
    population: Option<usize>,

    /// Terminate after this many generations
    #[arg(long)]
    generations: Option<u32>,

    /// Seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Use elitist top-k selection instead of remainder stochastic
    /// sampling
    #[arg(long)]
    elitist: bool,

    /// Append per-generation best evaluation to this TSV file
    #[arg(long)]
    stats: Option<PathBuf>,

    /// Save the best genotype of the final generation to this file
    #[arg(long)]
    save_best: Option<PathBuf>,

    /// Load engine configuration from a JSON file (CLI flags override)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn parse_topology(spec: &str) -> Result<Vec<usize>> {
    let topology = spec
        .split(',')
        .map(|field| {
            field
                .trim()
                .parse::<usize>()
                .with_context(|| format!("bad topology entry {field:?}"))
        })
        .collect::<Result<Vec<usize>>>()?;
    if topology.len() < 2 {
        bail!("topology needs at least an input and an output layer");
    }
    Ok(topology)
}

fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    neurodrive_core::init();
    let args = Args::parse();

    let topology = parse_topology(&args.topology)?;
    if topology[0] != harness::SENSOR_COUNT {
        bail!(
            "topology must take {} sensor inputs, got {}",
            harness::SENSOR_COUNT,
            topology[0]
        );
    }
    if topology[topology.len() - 1] != harness::CONTROL_COUNT {
        bail!(
            "topology must produce {} control outputs, got {}",
            harness::CONTROL_COUNT,
            topology[topology.len() - 1]
        );
    }

    let network = NeuralNetwork::new(&topology)?;

    let mut config = match &args.config {
        Some(path) => {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str::<EngineConfig>(&data)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    config.parameter_count = network.weight_count();
    if let Some(population) = args.population {
        config.population_size = population;
    }
    config.max_generations = args.generations.or(config.max_generations).or(Some(100));
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.elitist {
        config.selection = SelectionStrategy::Elitist {
            count: DEFAULT_ELITE_COUNT,
        };
    }

    tracing::info!(
        topology = ?topology,
        weights = network.weight_count(),
        population = config.population_size,
        selection = ?config.selection,
        "starting evolution"
    );

    let mut engine = EvolutionEngine::new(config, SteeringHarness::new(topology))?;

    if let Some(path) = args.stats.clone() {
        append_line(&path, "generation\tbest_evaluation\n")
            .with_context(|| format!("writing statistics to {}", path.display()))?;
        engine.on_fitness_computed(move |generation, population| {
            if let Some(best) = population.first() {
                let line = format!("{generation}\t{}\n", best.evaluation);
                if let Err(error) = append_line(&path, &line) {
                    tracing::error!(%error, "failed to append statistics");
                }
            }
        });
    }

    engine.start()?;
    while engine.is_running() {
        engine.evaluation_finished()?;
    }

    let stats = PopulationStats::from_population(engine.population());
    tracing::info!(
        generations = engine.generation(),
        avg_fitness = stats.avg_fitness,
        max_fitness = stats.max_fitness,
        "evolution finished"
    );

    if let Some(best) = engine.best() {
        println!(
            "best controller after {} generations: evaluation {:.4}",
            engine.generation(),
            best.evaluation
        );
        if let Some(path) = &args.save_best {
            best.save_to_file(path)
                .with_context(|| format!("saving best genotype to {}", path.display()))?;
            println!("saved best genotype to {}", path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_topology() {
        assert_eq!(parse_topology("3,6,2").unwrap(), vec![3, 6, 2]);
        assert_eq!(parse_topology(" 3 , 2 ").unwrap(), vec![3, 2]);
        assert!(parse_topology("3").is_err());
        assert!(parse_topology("3,x,2").is_err());
    }
}
