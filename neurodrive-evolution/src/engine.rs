//! The generational evolution engine

use neurodrive_core::{EvolutionError, Result};
use neurodrive_genetics::genotype::{self, Genotype, DEFAULT_PARAM_MAX, DEFAULT_PARAM_MIN};
use neurodrive_genetics::mutation::{
    self, DEFAULT_MUTATION_AMOUNT, DEFAULT_MUTATION_PROBABILITY, DEFAULT_MUTATION_SHARE,
};
use neurodrive_genetics::recombination::{self, DEFAULT_SWAP_PROBABILITY};
use neurodrive_genetics::selection::{self, SelectionStrategy};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::fitness;

/// External evaluation contract: the engine calls `evaluate` with the
/// full population each time a generation needs scoring, then returns
/// immediately. Whoever drives the harness must set every genotype's
/// `evaluation` scalar and call
/// [`EvolutionEngine::evaluation_finished`] exactly once afterwards.
pub trait EvaluationHarness {
    fn evaluate(&mut self, population: &mut [Genotype]);
}

impl<F: FnMut(&mut [Genotype])> EvaluationHarness for F {
    fn evaluate(&mut self, population: &mut [Genotype]) {
        self(population)
    }
}

/// Engine lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Running,
    Terminated,
}

/// Tunable knobs of one evolution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Fixed population size for the lifetime of the run.
    pub population_size: usize,
    /// Parameter count per genotype, normally the bound network's weight
    /// count.
    pub parameter_count: usize,
    pub initial_param_min: f64,
    pub initial_param_max: f64,
    pub crossover_swap_probability: f64,
    /// Per-parameter mutation probability.
    pub mutation_probability: f64,
    /// Half-width of the uniform additive perturbation.
    pub mutation_amount: f64,
    /// Fraction of the new population subjected to mutation.
    pub mutation_share: f64,
    pub selection: SelectionStrategy,
    /// Sort the population descending by fitness after each evaluation.
    /// Order-dependent operators (remainder sampling, elitism) need this.
    pub sort_population: bool,
    /// Seed for the engine-owned random source; `None` seeds from
    /// entropy.
    pub seed: Option<u64>,
    /// Built-in termination bound: terminate once the generation counter
    /// reaches this value.
    pub max_generations: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            population_size: 30,
            parameter_count: 0,
            initial_param_min: DEFAULT_PARAM_MIN,
            initial_param_max: DEFAULT_PARAM_MAX,
            crossover_swap_probability: DEFAULT_SWAP_PROBABILITY,
            mutation_probability: DEFAULT_MUTATION_PROBABILITY,
            mutation_amount: DEFAULT_MUTATION_AMOUNT,
            mutation_share: DEFAULT_MUTATION_SHARE,
            selection: SelectionStrategy::default(),
            sort_population: true,
            seed: None,
            max_generations: None,
        }
    }
}

type InitializeOp = Box<dyn FnMut(&mut [Genotype], &mut dyn RngCore)>;
type FitnessOp = Box<dyn FnMut(&mut [Genotype])>;
type SelectionOp = Box<dyn FnMut(&[Genotype], &mut dyn RngCore) -> Vec<Genotype>>;
type RecombinationOp = Box<dyn FnMut(&[Genotype], usize, &mut dyn RngCore) -> Result<Vec<Genotype>>>;
type MutationOp = Box<dyn FnMut(&mut [Genotype], &mut dyn RngCore)>;
type TerminationOp = Box<dyn FnMut(&[Genotype], u32) -> bool>;
type FitnessComputedCallback = Box<dyn FnMut(u32, &[Genotype])>;
type TerminatedCallback = Box<dyn FnMut(u32)>;

/// Generational evolutionary optimizer.
///
/// Single-threaded and cooperative: [`EvolutionEngine::start`] triggers
/// the first evaluation and returns, and each
/// [`EvolutionEngine::evaluation_finished`] call runs one full
/// generational step and triggers the next evaluation. At most one
/// evaluation is ever outstanding; the engine does no work and holds no
/// locks in between.
///
/// All seven operator slots (initialize, trigger-evaluation via the
/// harness, compute-fitness, select, recombine, mutate,
/// check-termination) are replaceable; defaults are installed from the
/// config at construction.
pub struct EvolutionEngine<H: EvaluationHarness> {
    config: EngineConfig,
    harness: H,
    population: Vec<Genotype>,
    generation: u32,
    state: EngineState,
    evaluation_pending: bool,
    rng: StdRng,
    initialize: InitializeOp,
    compute_fitness: FitnessOp,
    select: SelectionOp,
    recombine: RecombinationOp,
    mutate: MutationOp,
    termination: Option<TerminationOp>,
    on_fitness_computed: Option<FitnessComputedCallback>,
    on_terminated: Option<TerminatedCallback>,
}

impl<H: EvaluationHarness> EvolutionEngine<H> {
    /// New idle engine with an empty (zero-filled) population and the
    /// default operators derived from `config`.
    pub fn new(config: EngineConfig, harness: H) -> Result<Self> {
        if config.population_size == 0 {
            return Err(EvolutionError::InvalidArgument(
                "population size must be at least 1".into(),
            ));
        }
        if config.initial_param_min > config.initial_param_max {
            return Err(EvolutionError::InvalidArgument(format!(
                "initial parameter minimum {} exceeds maximum {}",
                config.initial_param_min, config.initial_param_max
            )));
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let population = (0..config.population_size)
            .map(|_| Genotype::new(config.parameter_count))
            .collect();

        let (init_min, init_max) = (config.initial_param_min, config.initial_param_max);
        let strategy = config.selection;
        let swap_probability = config.crossover_swap_probability;
        let (share, probability, amount) = (
            config.mutation_share,
            config.mutation_probability,
            config.mutation_amount,
        );

        Ok(Self {
            harness,
            population,
            generation: 1,
            state: EngineState::Idle,
            evaluation_pending: false,
            rng,
            initialize: Box::new(move |population, rng| {
                for genotype in population.iter_mut() {
                    for parameter in genotype.parameters_mut() {
                        *parameter = rng.gen_range(init_min..=init_max);
                    }
                }
            }),
            compute_fitness: Box::new(fitness::normalize_by_mean),
            select: Box::new(move |population, rng| selection::select(strategy, population, rng)),
            recombine: Box::new(move |intermediate, target, rng| {
                recombination::elitist_random_pairing(intermediate, target, swap_probability, rng)
            }),
            mutate: Box::new(move |population, rng| {
                mutation::mutate_all_but_best_two(population, share, probability, amount, rng)
            }),
            termination: None,
            on_fitness_computed: None,
            on_terminated: None,
            config,
        })
    }

    /// Replace the population initialization operator.
    pub fn with_initializer(
        mut self,
        op: impl FnMut(&mut [Genotype], &mut dyn RngCore) + 'static,
    ) -> Self {
        self.initialize = Box::new(op);
        self
    }

    /// Replace the fitness computation operator.
    pub fn with_fitness_operator(mut self, op: impl FnMut(&mut [Genotype]) + 'static) -> Self {
        self.compute_fitness = Box::new(op);
        self
    }

    /// Replace the selection operator.
    pub fn with_selection_operator(
        mut self,
        op: impl FnMut(&[Genotype], &mut dyn RngCore) -> Vec<Genotype> + 'static,
    ) -> Self {
        self.select = Box::new(op);
        self
    }

    /// Replace the recombination operator.
    pub fn with_recombination_operator(
        mut self,
        op: impl FnMut(&[Genotype], usize, &mut dyn RngCore) -> Result<Vec<Genotype>> + 'static,
    ) -> Self {
        self.recombine = Box::new(op);
        self
    }

    /// Replace the mutation operator.
    pub fn with_mutation_operator(
        mut self,
        op: impl FnMut(&mut [Genotype], &mut dyn RngCore) + 'static,
    ) -> Self {
        self.mutate = Box::new(op);
        self
    }

    /// Install a termination criterion checked after each fitness
    /// computation, in addition to the optional `max_generations` bound.
    pub fn with_termination_criterion(
        mut self,
        op: impl FnMut(&[Genotype], u32) -> bool + 'static,
    ) -> Self {
        self.termination = Some(Box::new(op));
        self
    }

    /// Observe each generation right after fitness computation (and the
    /// optional sort). The population snapshot must not be stored
    /// mutably; the engine keeps ownership.
    pub fn on_fitness_computed(&mut self, callback: impl FnMut(u32, &[Genotype]) + 'static) {
        self.on_fitness_computed = Some(Box::new(callback));
    }

    /// Observe termination, with the final generation count.
    pub fn on_terminated(&mut self, callback: impl FnMut(u32) + 'static) {
        self.on_terminated = Some(Box::new(callback));
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == EngineState::Running
    }

    /// Generation counter, starting at 1.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn population(&self) -> &[Genotype] {
        &self.population
    }

    pub fn population_mut(&mut self) -> &mut [Genotype] {
        &mut self.population
    }

    /// Highest-fitness genotype of the current population.
    pub fn best(&self) -> Option<&Genotype> {
        self.population
            .iter()
            .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
    }

    pub fn harness(&self) -> &H {
        &self.harness
    }

    pub fn harness_mut(&mut self) -> &mut H {
        &mut self.harness
    }

    /// Initialize the population and trigger the first evaluation.
    /// Non-blocking: returns as soon as the harness has been handed the
    /// population. Restarting a terminated engine rebuilds a fresh
    /// population; starting a running engine is a contract violation.
    pub fn start(&mut self) -> Result<()> {
        if self.state == EngineState::Running {
            return Err(EvolutionError::ContractViolation(
                "engine is already running".into(),
            ));
        }
        if self.state == EngineState::Terminated {
            self.population = (0..self.config.population_size)
                .map(|_| Genotype::new(self.config.parameter_count))
                .collect();
            self.generation = 1;
        }

        self.state = EngineState::Running;
        (self.initialize)(&mut self.population, &mut self.rng);

        tracing::info!(
            population = self.population.len(),
            parameters = self.config.parameter_count,
            "evolution started"
        );
        self.trigger_evaluation();
        Ok(())
    }

    /// Sole re-entry point from the evaluation harness's driver. Must be
    /// called exactly once per triggered evaluation, after every
    /// genotype's evaluation scalar has been set; out-of-order calls are
    /// rejected as contract violations. Runs one full generational step
    /// and, unless a termination criterion fired, triggers the next
    /// evaluation before returning.
    pub fn evaluation_finished(&mut self) -> Result<()> {
        if self.state != EngineState::Running {
            return Err(EvolutionError::ContractViolation(
                "evaluation finished while the engine is not running".into(),
            ));
        }
        if !self.evaluation_pending {
            return Err(EvolutionError::ContractViolation(
                "no evaluation is outstanding".into(),
            ));
        }
        self.evaluation_pending = false;

        (self.compute_fitness)(&mut self.population);

        if self.config.sort_population {
            genotype::sort_descending(&mut self.population);
        }

        if let Some(callback) = self.on_fitness_computed.as_mut() {
            callback(self.generation, &self.population);
        }

        if self.should_terminate() {
            self.terminate();
            return Ok(());
        }

        let mut intermediate = (self.select)(&self.population, &mut self.rng);
        if intermediate.len() < 2 {
            // Degenerate fitness (an all-zero generation, say) can starve
            // stochastic selection below the two parents recombination
            // needs. Carry the best two so the run survives.
            tracing::warn!(
                selected = intermediate.len(),
                "selection produced fewer than two genotypes, carrying the best two"
            );
            intermediate = selection::elitist(&self.population, 2);
        }

        let mut next = match (self.recombine)(
            &intermediate,
            self.config.population_size,
            &mut self.rng,
        ) {
            Ok(next) => next,
            Err(error) => {
                // A failed operator ends the run; the engine stays
                // restartable instead of wedged mid-cycle.
                self.terminate();
                return Err(error);
            }
        };
        (self.mutate)(&mut next, &mut self.rng);

        self.population = next;
        self.generation += 1;
        tracing::debug!(generation = self.generation, "advancing generation");
        self.trigger_evaluation();
        Ok(())
    }

    fn trigger_evaluation(&mut self) {
        self.evaluation_pending = true;
        self.harness.evaluate(&mut self.population);
    }

    fn should_terminate(&mut self) -> bool {
        if self
            .config
            .max_generations
            .is_some_and(|bound| self.generation >= bound)
        {
            return true;
        }
        match self.termination.as_mut() {
            Some(criterion) => criterion(&self.population, self.generation),
            None => false,
        }
    }

    fn terminate(&mut self) {
        self.state = EngineState::Terminated;
        tracing::info!(generation = self.generation, "evolution terminated");
        if let Some(callback) = self.on_terminated.as_mut() {
            callback(self.generation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(parameter_count: usize) -> EngineConfig {
        EngineConfig {
            population_size: 6,
            parameter_count,
            seed: Some(99),
            ..Default::default()
        }
    }

    fn index_harness() -> impl FnMut(&mut [Genotype]) {
        |population: &mut [Genotype]| {
            for (i, genotype) in population.iter_mut().enumerate() {
                genotype.evaluation = i as f64;
            }
        }
    }

    #[test]
    fn test_new_engine_is_idle_at_generation_one() {
        let engine = EvolutionEngine::new(config(4), index_harness()).unwrap();
        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(engine.generation(), 1);
        assert_eq!(engine.population().len(), 6);
        assert!(engine.population().iter().all(|g| g.parameter_count() == 4));
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let bad = EngineConfig {
            population_size: 0,
            ..Default::default()
        };
        assert!(EvolutionEngine::new(bad, index_harness()).is_err());

        let inverted = EngineConfig {
            initial_param_min: 1.0,
            initial_param_max: -1.0,
            ..Default::default()
        };
        assert!(EvolutionEngine::new(inverted, index_harness()).is_err());
    }

    #[test]
    fn test_start_initializes_within_range() {
        let mut engine = EvolutionEngine::new(config(8), index_harness()).unwrap();
        engine.start().unwrap();

        assert!(engine.is_running());
        for genotype in engine.population() {
            assert!(genotype.parameters().iter().all(|p| (-1.0..=1.0).contains(p)));
        }
    }

    #[test]
    fn test_start_twice_is_contract_violation() {
        let mut engine = EvolutionEngine::new(config(4), index_harness()).unwrap();
        engine.start().unwrap();
        assert!(matches!(
            engine.start(),
            Err(EvolutionError::ContractViolation(_))
        ));
    }

    #[test]
    fn test_evaluation_finished_before_start_is_rejected() {
        let mut engine = EvolutionEngine::new(config(4), index_harness()).unwrap();
        assert!(matches!(
            engine.evaluation_finished(),
            Err(EvolutionError::ContractViolation(_))
        ));
    }
}
