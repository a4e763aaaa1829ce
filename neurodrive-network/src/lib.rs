//! Neurodrive Network - the phenotype side of the genotype/phenotype mapping
//!
//! A network here is a pure mapping artifact: a stack of fully connected
//! layers, each a `(inputs + 1) x outputs` weight matrix (the extra row is
//! the bias, fed a constant 1.0) with an optional activation function.
//! Networks hold no fitness or evaluation state and `forward` has no side
//! effects, so independent instances may be evaluated from multiple
//! threads without synchronization.

pub mod activation;
pub mod layer;
pub mod network;

pub use activation::Activation;
pub use layer::NeuralLayer;
pub use network::NeuralNetwork;
