//! Neurodrive Evolution - the generational optimization loop
//!
//! The engine owns the population and a set of replaceable operator
//! slots, and drives the evaluate -> compute fitness -> select ->
//! recombine -> mutate cycle. Evaluation itself is external: the engine
//! hands the population to an [`EvaluationHarness`], returns immediately,
//! and resumes when the harness's driver calls
//! [`EvolutionEngine::evaluation_finished`].

pub mod agent;
pub mod engine;
pub mod fitness;

pub use agent::Agent;
pub use engine::{EngineConfig, EngineState, EvaluationHarness, EvolutionEngine};
pub use fitness::PopulationStats;
