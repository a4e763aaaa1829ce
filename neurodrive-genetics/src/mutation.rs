//! Mutation operators perturbing a freshly recombined population

use rand::Rng;

use crate::genotype::Genotype;

/// Default probability that a single parameter is mutated.
pub const DEFAULT_MUTATION_PROBABILITY: f64 = 0.3;
/// Default half-width of the uniform additive perturbation.
pub const DEFAULT_MUTATION_AMOUNT: f64 = 2.0;
/// Default fraction of a new population subjected to mutation.
pub const DEFAULT_MUTATION_SHARE: f64 = 1.0;

/// Mutate every genotype except the two elites at the front of the
/// population. Each remaining genotype is mutated as a whole with
/// probability `share`.
pub fn mutate_all_but_best_two<R: Rng + ?Sized>(
    population: &mut [Genotype],
    share: f64,
    probability: f64,
    amount: f64,
    rng: &mut R,
) {
    for genotype in population.iter_mut().skip(2) {
        if rng.gen::<f64>() < share {
            mutate_genotype(genotype, probability, amount, rng);
        }
    }
}

/// Mutate every genotype, elites included.
pub fn mutate_all<R: Rng + ?Sized>(
    population: &mut [Genotype],
    share: f64,
    probability: f64,
    amount: f64,
    rng: &mut R,
) {
    for genotype in population.iter_mut() {
        if rng.gen::<f64>() < share {
            mutate_genotype(genotype, probability, amount, rng);
        }
    }
}

/// Additive in-place mutation: each parameter is perturbed with the given
/// probability by an independent uniform draw from `[-amount, amount]`.
pub fn mutate_genotype<R: Rng + ?Sized>(
    genotype: &mut Genotype,
    probability: f64,
    amount: f64,
    rng: &mut R,
) {
    for parameter in genotype.parameters_mut() {
        if rng.gen::<f64>() < probability {
            *parameter += rng.gen_range(-amount..=amount);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_elites_stay_untouched() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut population: Vec<Genotype> = (0..10)
            .map(|i| Genotype::from_parameters(vec![i as f64; 8]))
            .collect();
        let before: Vec<String> = population.iter().map(Genotype::to_text).collect();

        mutate_all_but_best_two(&mut population, 1.0, 1.0, 2.0, &mut rng);

        assert_eq!(population[0].to_text(), before[0]);
        assert_eq!(population[1].to_text(), before[1]);
        // share 1.0 and per-parameter probability 1.0: an unchanged
        // genotype would need eight exactly-zero draws
        for (genotype, original) in population.iter().zip(&before).skip(2) {
            assert_ne!(&genotype.to_text(), original);
        }
    }

    #[test]
    fn test_mutation_bounds() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut genotype = Genotype::new(1000);
        mutate_genotype(&mut genotype, 1.0, 2.0, &mut rng);

        assert!(genotype.parameters().iter().all(|p| p.abs() <= 2.0));
    }

    #[test]
    fn test_zero_probability_is_identity() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut genotype = Genotype::from_parameters(vec![1.0, -2.0, 3.0]);
        let before = genotype.parameter_copy();
        mutate_genotype(&mut genotype, 0.0, 2.0, &mut rng);
        assert_eq!(genotype.parameters(), before.as_slice());
    }
}
