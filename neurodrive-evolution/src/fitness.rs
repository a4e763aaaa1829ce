//! Fitness computation over a freshly evaluated population

use neurodrive_genetics::Genotype;
use serde::{Deserialize, Serialize};

/// Default fitness operator: fitness = evaluation / mean(evaluation).
///
/// A fitness of 1.0 therefore means "exactly average", and the remainder
/// stochastic sampling operator reads integer fitness directly as a copy
/// count. When the mean is zero or non-finite (typically an all-zero
/// first generation) every fitness is set to 0.0 and a warning is
/// emitted, so the cycle can continue instead of dividing by zero.
pub fn normalize_by_mean(population: &mut [Genotype]) {
    if population.is_empty() {
        return;
    }

    let mean =
        population.iter().map(|g| g.evaluation).sum::<f64>() / population.len() as f64;
    if mean == 0.0 || !mean.is_finite() {
        tracing::warn!(
            mean,
            "degenerate mean evaluation, assigning zero fitness to the whole population"
        );
        for genotype in population.iter_mut() {
            genotype.fitness = 0.0;
        }
        return;
    }

    for genotype in population.iter_mut() {
        genotype.fitness = genotype.evaluation / mean;
    }
}

/// Aggregate fitness statistics for one generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationStats {
    pub avg_fitness: f64,
    pub max_fitness: f64,
    pub min_fitness: f64,
    pub std_dev: f64,
    pub population_size: usize,
}

impl PopulationStats {
    pub fn from_population(population: &[Genotype]) -> Self {
        if population.is_empty() {
            return Self {
                avg_fitness: 0.0,
                max_fitness: 0.0,
                min_fitness: 0.0,
                std_dev: 0.0,
                population_size: 0,
            };
        }

        let fitnesses: Vec<f64> = population.iter().map(|g| g.fitness).collect();
        let avg = fitnesses.iter().sum::<f64>() / fitnesses.len() as f64;
        let max = fitnesses.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let min = fitnesses.iter().cloned().fold(f64::INFINITY, f64::min);
        let variance =
            fitnesses.iter().map(|&f| (f - avg).powi(2)).sum::<f64>() / fitnesses.len() as f64;

        Self {
            avg_fitness: avg,
            max_fitness: max,
            min_fitness: min,
            std_dev: variance.sqrt(),
            population_size: population.len(),
        }
    }
}
