//! Recombination operators producing the next population

use neurodrive_core::{EvolutionError, Result};
use rand::Rng;

use crate::genotype::Genotype;

/// Default probability of swapping a parameter pair during crossover.
pub const DEFAULT_SWAP_PROBABILITY: f64 = 0.6;

/// Complete crossover: one independent Bernoulli trial per parameter
/// index. With probability `swap_probability` the children take the
/// parents' values swapped, otherwise unswapped. Not a contiguous-segment
/// crossover.
pub fn complete_crossover<R: Rng + ?Sized>(
    parent1: &Genotype,
    parent2: &Genotype,
    swap_probability: f64,
    rng: &mut R,
) -> (Genotype, Genotype) {
    let count = parent1.parameter_count();
    let mut first = Vec::with_capacity(count);
    let mut second = Vec::with_capacity(count);

    for i in 0..count {
        if rng.gen::<f64>() < swap_probability {
            first.push(parent2[i]);
            second.push(parent1[i]);
        } else {
            first.push(parent1[i]);
            second.push(parent2[i]);
        }
    }

    (
        Genotype::from_parameters(first),
        Genotype::from_parameters(second),
    )
}

/// Elitist random pairing.
///
/// Carries the top two intermediate genotypes into the new population
/// unchanged, then fills up to `target_size` with offspring of two
/// distinct random intermediate genotypes, dropping the second offspring
/// of the final pair when it would overshoot the target.
pub fn elitist_random_pairing<R: Rng + ?Sized>(
    intermediate: &[Genotype],
    target_size: usize,
    swap_probability: f64,
    rng: &mut R,
) -> Result<Vec<Genotype>> {
    if intermediate.len() < 2 {
        return Err(EvolutionError::InvalidArgument(format!(
            "intermediate population needs at least 2 genotypes for recombination, got {}",
            intermediate.len()
        )));
    }

    let mut next = Vec::with_capacity(target_size.max(2));
    next.push(intermediate[0].clone());
    next.push(intermediate[1].clone());

    while next.len() < target_size {
        let first = rng.gen_range(0..intermediate.len());
        let second = loop {
            let candidate = rng.gen_range(0..intermediate.len());
            if candidate != first {
                break candidate;
            }
        };

        let (offspring1, offspring2) = complete_crossover(
            &intermediate[first],
            &intermediate[second],
            swap_probability,
            rng,
        );
        next.push(offspring1);
        if next.len() < target_size {
            next.push(offspring2);
        }
    }

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_crossover_probability_zero_keeps_parents() {
        let mut rng = StdRng::seed_from_u64(1);
        let parent1 = Genotype::from_parameters(vec![1.0, 2.0, 3.0]);
        let parent2 = Genotype::from_parameters(vec![4.0, 5.0, 6.0]);

        let (child1, child2) = complete_crossover(&parent1, &parent2, 0.0, &mut rng);
        assert_eq!(child1.parameters(), parent1.parameters());
        assert_eq!(child2.parameters(), parent2.parameters());
    }

    #[test]
    fn test_crossover_probability_one_swaps_everything() {
        let mut rng = StdRng::seed_from_u64(1);
        let parent1 = Genotype::from_parameters(vec![1.0, 2.0, 3.0]);
        let parent2 = Genotype::from_parameters(vec![4.0, 5.0, 6.0]);

        let (child1, child2) = complete_crossover(&parent1, &parent2, 1.0, &mut rng);
        assert_eq!(child1.parameters(), parent2.parameters());
        assert_eq!(child2.parameters(), parent1.parameters());
    }

    #[test]
    fn test_crossover_children_are_fresh() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut parent1 = Genotype::from_parameters(vec![1.0, 2.0]);
        parent1.fitness = 3.0;
        let parent2 = Genotype::from_parameters(vec![4.0, 5.0]);

        let (child1, _) = complete_crossover(&parent1, &parent2, 0.5, &mut rng);
        assert_eq!(child1.fitness, 0.0);
        assert_eq!(child1.evaluation, 0.0);
    }

    #[test]
    fn test_pairing_requires_two_genotypes() {
        let mut rng = StdRng::seed_from_u64(2);
        let single = vec![Genotype::new(3)];
        assert!(elitist_random_pairing(&single, 10, 0.6, &mut rng).is_err());
    }

    #[test]
    fn test_pairing_fills_to_target_and_preserves_elites() {
        let mut rng = StdRng::seed_from_u64(2);
        let intermediate: Vec<Genotype> = (0..4)
            .map(|i| Genotype::from_parameters(vec![i as f64; 5]))
            .collect();

        for target in [2usize, 5, 10, 31] {
            let next = elitist_random_pairing(&intermediate, target, 0.6, &mut rng).unwrap();
            assert_eq!(next.len(), target.max(2));
            assert_eq!(next[0].parameters(), intermediate[0].parameters());
            assert_eq!(next[1].parameters(), intermediate[1].parameters());
        }
    }
}
