//! Neurodrive Genetics - genotypes and the genetic operator library
//!
//! A genotype is an ordered, fixed-length vector of real parameters plus
//! two derived scalars (evaluation, fitness). The operators in
//! `selection`, `recombination` and `mutation` are pure functions over
//! genotype collections; every stochastic one takes the random source as
//! an explicit argument so runs can be seeded and reproduced.

pub mod genotype;
pub mod mutation;
pub mod recombination;
pub mod selection;

pub use genotype::{sort_descending, Genotype};
pub use selection::SelectionStrategy;
