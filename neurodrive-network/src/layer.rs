//! A single fully connected layer

use neurodrive_core::{EvolutionError, Result};
use rand::Rng;

use crate::activation::Activation;

/// One fully connected layer of a feedforward network.
///
/// Weights are stored flat, row-major: `(inputs + 1)` rows of `outputs`
/// columns each, the last row being the bias weights. The bias input is
/// always the constant 1.0. This flat order is the same order genotype
/// parameters are copied in, so it is load-bearing for persistence.
#[derive(Debug, Clone)]
pub struct NeuralLayer {
    inputs: usize,
    outputs: usize,
    weights: Vec<f64>,
    activation: Option<Activation>,
}

impl NeuralLayer {
    /// New layer with all weights zero and the default clamped-sigmoid
    /// activation.
    pub fn new(inputs: usize, outputs: usize) -> Self {
        Self {
            inputs,
            outputs,
            weights: vec![0.0; (inputs + 1) * outputs],
            activation: Some(Activation::ClampedSigmoid),
        }
    }

    /// Non-bias input count.
    pub fn input_count(&self) -> usize {
        self.inputs
    }

    pub fn output_count(&self) -> usize {
        self.outputs
    }

    /// Total weight count, bias row included.
    pub fn weight_count(&self) -> usize {
        self.weights.len()
    }

    pub fn activation(&self) -> Option<Activation> {
        self.activation
    }

    /// `None` disables the activation, turning the layer into a pure
    /// weighted sum.
    pub fn set_activation(&mut self, activation: Option<Activation>) {
        self.activation = activation;
    }

    /// Weight of the connection from `input` (index `inputs` is the bias
    /// row) to `output`.
    pub fn weight(&self, input: usize, output: usize) -> f64 {
        self.weights[input * self.outputs + output]
    }

    /// Replace all weights from a flat row-major vector.
    pub fn set_weights(&mut self, weights: &[f64]) -> Result<()> {
        if weights.len() != self.weights.len() {
            return Err(EvolutionError::InvalidArgument(format!(
                "layer expects {} weights, got {}",
                self.weights.len(),
                weights.len()
            )));
        }
        self.weights.copy_from_slice(weights);
        Ok(())
    }

    /// Weighted sums over the biased input vector, then the activation
    /// (if set) applied element-wise.
    pub fn forward(&self, inputs: &[f64]) -> Result<Vec<f64>> {
        if inputs.len() != self.inputs {
            return Err(EvolutionError::InvalidArgument(format!(
                "layer expects {} inputs, got {}",
                self.inputs,
                inputs.len()
            )));
        }

        let mut sums = vec![0.0; self.outputs];
        for (i, row) in self.weights.chunks_exact(self.outputs).enumerate() {
            // Last row is the bias, fed the constant 1.0.
            let x = if i < self.inputs { inputs[i] } else { 1.0 };
            for (sum, weight) in sums.iter_mut().zip(row) {
                *sum += x * weight;
            }
        }

        if let Some(activation) = self.activation {
            for sum in &mut sums {
                *sum = activation.apply(*sum);
            }
        }

        Ok(sums)
    }

    /// Set every weight to an independent uniform draw from `[min, max]`.
    pub fn randomize_weights<R: Rng + ?Sized>(&mut self, min: f64, max: f64, rng: &mut R) {
        for weight in &mut self.weights {
            *weight = rng.gen_range(min..=max);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_count_includes_bias_row() {
        let layer = NeuralLayer::new(3, 5);
        assert_eq!(layer.weight_count(), (3 + 1) * 5);
    }

    #[test]
    fn test_forward_weighted_sum() {
        let mut layer = NeuralLayer::new(2, 1);
        layer.set_activation(None);
        // Rows: input 0, input 1, bias.
        layer.set_weights(&[2.0, 3.0, 0.5]).unwrap();

        let out = layer.forward(&[1.0, 2.0]).unwrap();
        assert_eq!(out.len(), 1);
        assert!((out[0] - (2.0 + 6.0 + 0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_forward_rejects_wrong_input_length() {
        let layer = NeuralLayer::new(3, 2);
        assert!(layer.forward(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_set_weights_rejects_wrong_length() {
        let mut layer = NeuralLayer::new(2, 2);
        assert!(layer.set_weights(&[1.0; 5]).is_err());
        assert!(layer.set_weights(&[1.0; 6]).is_ok());
    }

    #[test]
    fn test_randomize_weights_in_range() {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let mut layer = NeuralLayer::new(4, 4);
        layer.randomize_weights(-1.0, 1.0, &mut rng);

        for i in 0..5 {
            for j in 0..4 {
                let w = layer.weight(i, j);
                assert!((-1.0..=1.0).contains(&w));
            }
        }
    }
}
