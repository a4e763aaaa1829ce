//! The evolvable representation

use std::cmp::Ordering;
use std::path::Path;

use neurodrive_core::{EvolutionError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default range for randomly initialized parameters.
pub const DEFAULT_PARAM_MIN: f64 = -1.0;
pub const DEFAULT_PARAM_MAX: f64 = 1.0;

/// One individual of the population: a fixed-length parameter vector plus
/// the two derived scalars.
///
/// `evaluation` is set exclusively by the external evaluation harness and
/// is undefined until then; `fitness` is derived from it by the engine's
/// fitness operator and drives ordering and selection. Populations sort
/// highest fitness first, and several operators (remainder sampling,
/// elitism) rely on that order holding before they run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Genotype {
    parameters: Vec<f64>,
    pub evaluation: f64,
    pub fitness: f64,
}

impl Genotype {
    /// Zero-filled genotype of the given length.
    pub fn new(length: usize) -> Self {
        Self {
            parameters: vec![0.0; length],
            evaluation: 0.0,
            fitness: 0.0,
        }
    }

    pub fn from_parameters(parameters: Vec<f64>) -> Self {
        Self {
            parameters,
            evaluation: 0.0,
            fitness: 0.0,
        }
    }

    /// Genotype with each parameter drawn independently and uniformly
    /// from `[min, max]`.
    pub fn random<R: Rng + ?Sized>(length: usize, min: f64, max: f64, rng: &mut R) -> Result<Self> {
        let mut genotype = Self::new(length);
        genotype.randomize_parameters(min, max, rng)?;
        Ok(genotype)
    }

    /// Redraw every parameter uniformly from `[min, max]`.
    pub fn randomize_parameters<R: Rng + ?Sized>(
        &mut self,
        min: f64,
        max: f64,
        rng: &mut R,
    ) -> Result<()> {
        if min > max {
            return Err(EvolutionError::InvalidArgument(format!(
                "minimum parameter value {min} exceeds maximum {max}"
            )));
        }
        for parameter in &mut self.parameters {
            *parameter = rng.gen_range(min..=max);
        }
        Ok(())
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    pub fn parameters(&self) -> &[f64] {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut [f64] {
        &mut self.parameters
    }

    /// Independent snapshot of the parameter vector.
    pub fn parameter_copy(&self) -> Vec<f64> {
        self.parameters.clone()
    }

    /// Ordering for a descending-fitness sort: `self` sorts before
    /// `other` iff its fitness is strictly greater.
    pub fn cmp_by_fitness(&self, other: &Genotype) -> Ordering {
        other.fitness.total_cmp(&self.fitness)
    }

    /// Serialize the parameter vector as `;`-joined decimal literals, one
    /// field per parameter in vector order, no trailing delimiter.
    pub fn to_text(&self) -> String {
        self.parameters
            .iter()
            .map(f64::to_string)
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Parse a genotype back from its flat text form. Evaluation and
    /// fitness start at zero.
    pub fn from_text(data: &str) -> Result<Self> {
        let mut parameters = Vec::new();
        for field in data.trim().split(';') {
            let parsed = field.trim().parse::<f64>().map_err(|_| {
                EvolutionError::Format(format!("field {field:?} is not a decimal float"))
            })?;
            parameters.push(parsed);
        }
        Ok(Self::from_parameters(parameters))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_text())?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_text(&data)
    }
}

impl std::ops::Index<usize> for Genotype {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.parameters[index]
    }
}

impl std::ops::IndexMut<usize> for Genotype {
    fn index_mut(&mut self, index: usize) -> &mut f64 {
        &mut self.parameters[index]
    }
}

/// Sort a population highest fitness first.
pub fn sort_descending(population: &mut [Genotype]) {
    population.sort_by(|a, b| a.cmp_by_fitness(b));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_new_is_zero_filled() {
        let genotype = Genotype::new(5);
        assert_eq!(genotype.parameter_count(), 5);
        assert!(genotype.parameters().iter().all(|&p| p == 0.0));
        assert_eq!(genotype.evaluation, 0.0);
        assert_eq!(genotype.fitness, 0.0);
    }

    #[test]
    fn test_random_respects_range() {
        let mut rng = StdRng::seed_from_u64(11);
        let genotype = Genotype::random(64, -1.0, 1.0, &mut rng).unwrap();
        assert_eq!(genotype.parameter_count(), 64);
        assert!(genotype.parameters().iter().all(|p| (-1.0..=1.0).contains(p)));
    }

    #[test]
    fn test_random_rejects_inverted_range() {
        let mut rng = StdRng::seed_from_u64(11);
        assert!(Genotype::random(4, 1.0, -1.0, &mut rng).is_err());
    }

    #[test]
    fn test_descending_fitness_order() {
        let mut a = Genotype::new(1);
        let mut b = Genotype::new(1);
        a.fitness = 2.0;
        b.fitness = 1.0;
        assert_eq!(a.cmp_by_fitness(&b), Ordering::Less);
        assert_eq!(b.cmp_by_fitness(&a), Ordering::Greater);
        assert_eq!(a.cmp_by_fitness(&a.clone()), Ordering::Equal);

        let mut population = vec![b, a];
        sort_descending(&mut population);
        assert_eq!(population[0].fitness, 2.0);
        assert_eq!(population[1].fitness, 1.0);
    }

    #[test]
    fn test_text_round_trip() {
        let genotype = Genotype::from_parameters(vec![1.5, -0.25, 3.0, 0.000001]);
        let text = genotype.to_text();
        assert_eq!(text.matches(';').count(), 3);
        assert!(!text.ends_with(';'));

        let restored = Genotype::from_text(&text).unwrap();
        assert_eq!(restored.parameters(), genotype.parameters());
    }

    #[test]
    fn test_from_text_rejects_garbage() {
        assert!(Genotype::from_text("1.0;nope;2.0").is_err());
        assert!(Genotype::from_text("").is_err());
        assert!(matches!(
            Genotype::from_text("1.0;;2.0"),
            Err(EvolutionError::Format(_))
        ));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best.txt");

        let genotype = Genotype::from_parameters(vec![0.5, -1.5, 2.25]);
        genotype.save_to_file(&path).unwrap();
        let restored = Genotype::load_from_file(&path).unwrap();
        assert_eq!(restored.parameters(), genotype.parameters());
    }

    #[test]
    fn test_parameter_copy_is_independent() {
        let genotype = Genotype::from_parameters(vec![1.0, 2.0]);
        let mut copy = genotype.parameter_copy();
        copy[0] = 99.0;
        assert_eq!(genotype[0], 1.0);
    }
}
