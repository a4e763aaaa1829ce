//! Selection operators building the intermediate population

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::genotype::Genotype;

/// Number of genotypes the elitist strategy keeps by default.
pub const DEFAULT_ELITE_COUNT: usize = 3;

/// Selection strategies. Both assume the input population is already
/// sorted descending by fitness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionStrategy {
    /// Keep the best `count` genotypes.
    Elitist { count: usize },
    /// Remainder stochastic sampling over normalized fitness.
    RemainderStochastic,
}

impl Default for SelectionStrategy {
    fn default() -> Self {
        Self::RemainderStochastic
    }
}

/// Build the intermediate population from the current one.
pub fn select<R: Rng + ?Sized>(
    strategy: SelectionStrategy,
    population: &[Genotype],
    rng: &mut R,
) -> Vec<Genotype> {
    let intermediate = match strategy {
        SelectionStrategy::Elitist { count } => elitist(population, count),
        SelectionStrategy::RemainderStochastic => remainder_stochastic_sampling(population, rng),
    };
    tracing::trace!(
        selected = intermediate.len(),
        from = population.len(),
        "built intermediate population"
    );
    intermediate
}

/// The first `count` genotypes of a descending-sorted population.
pub fn elitist(population: &[Genotype], count: usize) -> Vec<Genotype> {
    population[..count.min(population.len())].to_vec()
}

/// Remainder stochastic sampling.
///
/// Integer pass: each genotype contributes `floor(fitness)` copies; the
/// pass stops at the first genotype with fitness below 1 (fitness is
/// non-increasing in a sorted population). Remainder pass, over the full
/// population: each genotype contributes one extra copy with probability
/// equal to its fractional fitness.
pub fn remainder_stochastic_sampling<R: Rng + ?Sized>(
    population: &[Genotype],
    rng: &mut R,
) -> Vec<Genotype> {
    let mut intermediate = Vec::new();

    for genotype in population {
        if genotype.fitness < 1.0 {
            break;
        }
        for _ in 0..genotype.fitness as usize {
            intermediate.push(Genotype::from_parameters(genotype.parameter_copy()));
        }
    }

    for genotype in population {
        let remainder = genotype.fitness - genotype.fitness.floor();
        if rng.gen::<f64>() < remainder {
            intermediate.push(Genotype::from_parameters(genotype.parameter_copy()));
        }
    }

    intermediate
}
