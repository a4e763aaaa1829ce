//! Toy steering harness standing in for the vehicle simulation.
//!
//! The real collaborator drives simulated cars over a track; this harness
//! keeps the same contract (build one agent per genotype, run it, write
//! the evaluation scalar back) against a fixed grid of sensor readings
//! scored by a reference steering rule. Network forward passes are pure,
//! so agents are evaluated in parallel.

use neurodrive_evolution::{Agent, EvaluationHarness};
use neurodrive_genetics::Genotype;
use neurodrive_network::Activation;
use rayon::prelude::*;

/// Three ray distances in, throttle and steering out.
pub const SENSOR_COUNT: usize = 3;
pub const CONTROL_COUNT: usize = 2;

/// Reference rule the controllers are scored against: steer away from
/// the nearer wall, throttle with the clear distance ahead.
fn reference_controls(sensors: &[f64; SENSOR_COUNT]) -> [f64; CONTROL_COUNT] {
    let [left, front, right] = *sensors;
    [front.clamp(0.0, 1.0), (right - left).clamp(-1.0, 1.0)]
}

pub struct SteeringHarness {
    topology: Vec<usize>,
    samples: Vec<[f64; SENSOR_COUNT]>,
}

impl SteeringHarness {
    /// Deterministic 5x5x5 grid over the three sensor distances.
    pub fn new(topology: Vec<usize>) -> Self {
        let mut samples = Vec::new();
        for left in 0..5 {
            for front in 0..5 {
                for right in 0..5 {
                    samples.push([
                        left as f64 / 4.0,
                        front as f64 / 4.0,
                        right as f64 / 4.0,
                    ]);
                }
            }
        }
        Self { topology, samples }
    }

    fn score(&self, genotype: &Genotype) -> f64 {
        let mut agent =
            match Agent::new(genotype.clone(), &self.topology, Some(Activation::SoftSign)) {
                Ok(agent) => agent,
                Err(error) => {
                    tracing::error!(%error, "failed to bind genotype, scoring zero");
                    return 0.0;
                }
            };
        agent.reset();

        let mut error_sum = 0.0;
        for sample in &self.samples {
            match agent.act(sample) {
                Ok(outputs) => {
                    let target = reference_controls(sample);
                    error_sum += (outputs[0] - target[0]).powi(2)
                        + (outputs[1] - target[1]).powi(2);
                }
                Err(error) => {
                    tracing::error!(%error, "forward pass failed, scoring zero");
                    agent.kill();
                    return 0.0;
                }
            }
        }
        agent.kill();

        let mse = error_sum / self.samples.len() as f64;
        1.0 / (1.0 + mse)
    }
}

impl EvaluationHarness for SteeringHarness {
    fn evaluate(&mut self, population: &mut [Genotype]) {
        let scores: Vec<f64> = population
            .par_iter()
            .map(|genotype| self.score(genotype))
            .collect();

        for (genotype, score) in population.iter_mut().zip(scores) {
            genotype.evaluation = score;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neurodrive_network::NeuralNetwork;

    #[test]
    fn test_reference_controls() {
        let straight = reference_controls(&[0.5, 1.0, 0.5]);
        assert_eq!(straight, [1.0, 0.0]);

        let wall_on_left = reference_controls(&[0.0, 0.5, 1.0]);
        assert!(wall_on_left[1] > 0.0);
    }

    #[test]
    fn test_evaluate_scores_whole_population() {
        let topology = vec![SENSOR_COUNT, 4, CONTROL_COUNT];
        let weight_count = NeuralNetwork::new(&topology).unwrap().weight_count();

        let mut harness = SteeringHarness::new(topology);
        let mut population: Vec<Genotype> =
            (0..4).map(|_| Genotype::new(weight_count)).collect();
        harness.evaluate(&mut population);

        for genotype in &population {
            assert!(genotype.evaluation > 0.0 && genotype.evaluation <= 1.0);
        }
    }
}
