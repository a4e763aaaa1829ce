//! Binding a genotype to a runnable phenotype

use std::cmp::Ordering;

use neurodrive_core::{EvolutionError, Result};
use neurodrive_genetics::Genotype;
use neurodrive_network::{Activation, NeuralNetwork};

type DeathCallback = Box<dyn FnMut() + Send>;

/// One runnable controller: a genotype decoded into a freshly
/// constructed feedforward network.
///
/// Construction copies the genotype's parameters into the network
/// weights in the fixed order defined by
/// [`NeuralNetwork::set_weights`]: layers in topology order, each layer
/// row-major. Genotype files decode into the same layout they were
/// encoded from.
pub struct Agent {
    genotype: Genotype,
    network: NeuralNetwork,
    alive: bool,
    on_death: Option<DeathCallback>,
}

impl Agent {
    /// Build the phenotype for `genotype`. Fails when the genotype's
    /// parameter count does not match the topology's weight count. The
    /// agent starts not-yet-alive; call [`Agent::reset`] before running
    /// it.
    pub fn new(
        genotype: Genotype,
        topology: &[usize],
        activation: Option<Activation>,
    ) -> Result<Self> {
        let mut network = NeuralNetwork::new(topology)?;
        network.set_activations(activation);

        if genotype.parameter_count() != network.weight_count() {
            return Err(EvolutionError::InvalidArgument(format!(
                "genotype parameter count {} must match network weight count {}",
                genotype.parameter_count(),
                network.weight_count()
            )));
        }
        network.set_weights(genotype.parameters())?;

        Ok(Self {
            genotype,
            network,
            alive: false,
            on_death: None,
        })
    }

    pub fn genotype(&self) -> &Genotype {
        &self.genotype
    }

    pub fn genotype_mut(&mut self) -> &mut Genotype {
        &mut self.genotype
    }

    /// Hand the genotype back, e.g. to write its evaluation into the
    /// engine's population.
    pub fn into_genotype(self) -> Genotype {
        self.genotype
    }

    pub fn network(&self) -> &NeuralNetwork {
        &self.network
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Register a callback fired once per alive -> dead transition.
    pub fn on_death(&mut self, callback: impl FnMut() + Send + 'static) {
        self.on_death = Some(Box::new(callback));
    }

    /// Zero the genotype's evaluation and fitness and mark the agent
    /// alive.
    pub fn reset(&mut self) {
        self.genotype.evaluation = 0.0;
        self.genotype.fitness = 0.0;
        self.alive = true;
    }

    /// Mark the agent dead. Edge-triggered: returns true and fires the
    /// death callback only when the agent was alive, never while already
    /// dead.
    pub fn kill(&mut self) -> bool {
        if !self.alive {
            return false;
        }
        self.alive = false;
        if let Some(callback) = self.on_death.as_mut() {
            callback();
        }
        true
    }

    /// Run one input frame through the phenotype network.
    pub fn act(&self, inputs: &[f64]) -> Result<Vec<f64>> {
        self.network.forward(inputs)
    }

    /// Compare by the underlying genotype's fitness (descending order).
    pub fn cmp_by_fitness(&self, other: &Agent) -> Ordering {
        self.genotype.cmp_by_fitness(&other.genotype)
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("genotype", &self.genotype)
            .field("topology", &self.network.topology())
            .field("alive", &self.alive)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
    use std::sync::Arc;

    #[test]
    fn test_parameter_count_mismatch_rejected() {
        let genotype = Genotype::new(10);
        // [3,5,2] needs 32 weights.
        let err = Agent::new(genotype, &[3, 5, 2], Some(Activation::SoftSign));
        assert!(matches!(err, Err(EvolutionError::InvalidArgument(_))));
    }

    #[test]
    fn test_binding_copies_parameters_in_order() {
        // [2,1]: weights are input0, input1, bias.
        let genotype = Genotype::from_parameters(vec![0.25, 0.5, 0.75]);
        let agent = Agent::new(genotype, &[2, 1], None).unwrap();

        let layer = &agent.network().layers()[0];
        assert_eq!(layer.weight(0, 0), 0.25);
        assert_eq!(layer.weight(1, 0), 0.5);
        assert_eq!(layer.weight(2, 0), 0.75);

        let out = agent.act(&[1.0, 1.0]).unwrap();
        assert!((out[0] - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_reset_clears_scores_and_revives() {
        let mut genotype = Genotype::new(3);
        genotype.evaluation = 0.8;
        genotype.fitness = 1.2;

        let mut agent = Agent::new(genotype, &[2, 1], None).unwrap();
        assert!(!agent.is_alive());

        agent.reset();
        assert!(agent.is_alive());
        assert_eq!(agent.genotype().evaluation, 0.0);
        assert_eq!(agent.genotype().fitness, 0.0);
    }

    #[test]
    fn test_death_notification_fires_exactly_once() {
        let deaths = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&deaths);

        let mut agent = Agent::new(Genotype::new(3), &[2, 1], None).unwrap();
        agent.on_death(move || {
            counter.fetch_add(1, AtomicOrdering::SeqCst);
        });

        // Not alive yet: no edge.
        assert!(!agent.kill());
        assert_eq!(deaths.load(AtomicOrdering::SeqCst), 0);

        agent.reset();
        assert!(agent.kill());
        assert!(!agent.kill());
        assert_eq!(deaths.load(AtomicOrdering::SeqCst), 1);
    }
}
