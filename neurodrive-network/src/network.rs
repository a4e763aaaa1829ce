//! Feedforward network assembled from fully connected layers

use neurodrive_core::{EvolutionError, Result};
use rand::Rng;

use crate::activation::Activation;
use crate::layer::NeuralLayer;

/// A feedforward network defined by its topology (node count per layer).
///
/// A topology of `n` entries yields `n - 1` weight layers. Total weight
/// count is the sum over adjacent topology pairs of
/// `(inputs + 1) * outputs`; a genotype bound to this network must carry
/// exactly that many parameters.
#[derive(Debug, Clone)]
pub struct NeuralNetwork {
    topology: Vec<usize>,
    layers: Vec<NeuralLayer>,
}

impl NeuralNetwork {
    pub fn new(topology: &[usize]) -> Result<Self> {
        if topology.len() < 2 {
            return Err(EvolutionError::InvalidArgument(format!(
                "network topology needs at least an input and an output layer, got {} entries",
                topology.len()
            )));
        }
        if let Some(position) = topology.iter().position(|&nodes| nodes == 0) {
            return Err(EvolutionError::InvalidArgument(format!(
                "network topology layer {position} has zero nodes"
            )));
        }

        let layers = topology
            .windows(2)
            .map(|pair| NeuralLayer::new(pair[0], pair[1]))
            .collect();

        Ok(Self {
            topology: topology.to_vec(),
            layers,
        })
    }

    pub fn topology(&self) -> &[usize] {
        &self.topology
    }

    pub fn layers(&self) -> &[NeuralLayer] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [NeuralLayer] {
        &mut self.layers
    }

    pub fn input_count(&self) -> usize {
        self.topology[0]
    }

    pub fn output_count(&self) -> usize {
        self.topology[self.topology.len() - 1]
    }

    pub fn weight_count(&self) -> usize {
        self.layers.iter().map(NeuralLayer::weight_count).sum()
    }

    /// Assign the same activation to every layer.
    pub fn set_activations(&mut self, activation: Option<Activation>) {
        for layer in &mut self.layers {
            layer.set_activation(activation);
        }
    }

    /// Distribute a flat weight vector across the layers in topology
    /// order, each layer consuming its row-major block. This defines the
    /// normative order genotype parameters map to weights.
    pub fn set_weights(&mut self, weights: &[f64]) -> Result<()> {
        if weights.len() != self.weight_count() {
            return Err(EvolutionError::InvalidArgument(format!(
                "network expects {} weights, got {}",
                self.weight_count(),
                weights.len()
            )));
        }

        let mut offset = 0;
        for layer in &mut self.layers {
            let count = layer.weight_count();
            layer.set_weights(&weights[offset..offset + count])?;
            offset += count;
        }
        Ok(())
    }

    /// Propagate an input vector through all layers. Pure: no state is
    /// touched, safe to call concurrently.
    pub fn forward(&self, inputs: &[f64]) -> Result<Vec<f64>> {
        let mut values = self.layers[0].forward(inputs)?;
        for layer in &self.layers[1..] {
            values = layer.forward(&values)?;
        }
        Ok(values)
    }

    /// Set every weight to an independent uniform draw from `[min, max]`.
    pub fn randomize_weights<R: Rng + ?Sized>(&mut self, min: f64, max: f64, rng: &mut R) {
        for layer in &mut self.layers {
            layer.randomize_weights(min, max, rng);
        }
    }

    /// A network with the same topology and activation assignment but
    /// construction-default (zero) weights. Use `clone` for a full copy.
    pub fn topology_copy(&self) -> Self {
        let layers = self
            .layers
            .iter()
            .map(|layer| {
                let mut copy = NeuralLayer::new(layer.input_count(), layer.output_count());
                copy.set_activation(layer.activation());
                copy
            })
            .collect();

        Self {
            topology: self.topology.clone(),
            layers,
        }
    }
}
