//! QAOA runner: configuration in, optimized result out.

use serde::Serialize;
use tracing::info;
use varq_optim::{OptimizationResult, Optimizer};

use crate::config::{QaoaConfig, Strategy};
use crate::error::QaoaError;
use crate::evaluator::Evaluator;
use crate::problems::{Observables, diagonal_range};

/// Result of a QAOA run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QaoaResult {
    /// Optimizer used.
    pub strategy: Strategy,
    /// Oracle backend used.
    pub oracle: String,
    /// Starting angles.
    pub initial_params: Vec<f64>,
    /// Optimizer outcome; `optimization.nfev` counts oracle calls.
    pub optimization: OptimizationResult,
    /// Computational-basis probabilities of the optimized state.
    pub final_state_probabilities: Vec<f64>,
    /// Exact minimum of the cost, when it is diagonal.
    pub ground_energy: Option<f64>,
    /// `(E_max - E) / (E_max - E_min)` for a diagonal cost; 1 at the optimum.
    pub approximation_ratio: Option<f64>,
}

impl QaoaResult {
    /// Optimized cost expectation.
    pub fn energy(&self) -> f64 {
        self.optimization.fun
    }

    /// Most likely basis state of the optimized state and its probability.
    pub fn most_likely(&self) -> Option<(usize, f64)> {
        self.final_state_probabilities
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }
}

/// Runs the QAOA loop described by a [`QaoaConfig`].
#[derive(Debug, Clone)]
pub struct QaoaRunner {
    config: QaoaConfig,
    observables: Observables,
}

impl QaoaRunner {
    /// Validate `config` and build the observables.
    pub fn from_config(config: QaoaConfig) -> Result<Self, QaoaError> {
        config.validate()?;
        let observables = config.problem.observables()?;
        Ok(Self {
            config,
            observables,
        })
    }

    /// Validated configuration.
    pub fn config(&self) -> &QaoaConfig {
        &self.config
    }

    /// Observables built from the configured problem.
    pub fn observables(&self) -> &Observables {
        &self.observables
    }

    /// Number of angles, `2p`.
    pub fn num_parameters(&self) -> usize {
        2 * self.config.depth
    }

    /// Fresh evaluator with a fresh oracle, so seeded samplers restart.
    pub fn evaluator(&self) -> Result<Evaluator, QaoaError> {
        let oracle = self.config.oracle.build(self.config.evolution)?;
        Ok(Evaluator::new(self.observables.clone(), self.config.depth, oracle)
            .with_convention(self.config.convention)
            .with_evolution(self.config.evolution))
    }

    /// Starting angles from the configured strategy.
    pub fn initial_parameters(&self) -> Result<Vec<f64>, QaoaError> {
        Ok(self.config.init.initial_parameters(self.config.depth)?)
    }

    /// Run the configured optimizer from the configured starting point.
    pub fn run(&self) -> Result<QaoaResult, QaoaError> {
        let initial = self.initial_parameters()?;
        self.run_with_params(self.config.optimizer.strategy, initial)
    }

    /// Run `strategy` from `initial_params`.
    pub fn run_with_params(
        &self,
        strategy: Strategy,
        initial_params: Vec<f64>,
    ) -> Result<QaoaResult, QaoaError> {
        let optimizer = self.config.optimizer.build(strategy)?;
        let mut evaluator = self.evaluator()?;
        info!(
            optimizer = optimizer.name(),
            oracle = evaluator.oracle_name(),
            depth = self.config.depth,
            num_qubits = self.observables.num_qubits(),
            "starting QAOA run"
        );

        let optimization =
            optimizer.minimize(|params| evaluator.evaluate(params), initial_params.clone())?;

        let final_state_probabilities = evaluator.final_state(&optimization.x)?.probabilities();
        let range = diagonal_range(self.observables.cost(), self.observables.num_qubits());
        let ground_energy = range.map(|(min, _)| min);
        let approximation_ratio = range.and_then(|(min, max)| {
            (max > min).then(|| (max - optimization.fun) / (max - min))
        });

        info!(
            optimizer = optimizer.name(),
            energy = optimization.fun,
            nfev = optimization.nfev,
            converged = optimization.converged,
            ratio = approximation_ratio,
            "QAOA run finished"
        );

        Ok(QaoaResult {
            strategy,
            oracle: evaluator.oracle_name().to_string(),
            initial_params,
            optimization,
            final_state_probabilities,
            ground_energy,
            approximation_ratio,
        })
    }

    /// Run every strategy from the same starting angles.
    pub fn compare(&self, strategies: &[Strategy]) -> Result<Vec<QaoaResult>, QaoaError> {
        let initial = self.initial_parameters()?;
        strategies
            .iter()
            .map(|&strategy| self.run_with_params(strategy, initial.clone()))
            .collect()
    }
}
