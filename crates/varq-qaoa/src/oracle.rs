//! Expectation oracles.
//!
//! An oracle takes a [`StatePreparation`] and an observable and returns
//! `⟨ψ|H|ψ⟩`. The evaluator only sees `Box<dyn ExpectationOracle>`; the
//! backend is picked once, by [`OracleConfig::build`].
//!
//! Two backends are provided:
//!
//! - [`StatevectorOracle`] computes the exact value from amplitudes
//! - [`SamplingOracle`] estimates each term from measurement shots

use num_complex::Complex64;
use rand::SeedableRng;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::trace;
use varq_ops::{EvolutionMethod, PauliHamiltonian, PauliTerm, Statevector, evolve};

use crate::ansatz::{EvolutionStep, StatePreparation};
use crate::error::OracleError;

/// Computes expectation values of observables on prepared states.
pub trait ExpectationOracle {
    /// Backend name for logs and reports.
    fn name(&self) -> &str;

    /// Expectation of `observable` in the state produced by `preparation`.
    ///
    /// The result is complex so that callers can detect non-Hermitian
    /// input; a Hermitian observable yields a negligible imaginary part.
    fn expectation(
        &mut self,
        preparation: &StatePreparation<'_>,
        observable: &PauliHamiltonian,
    ) -> Result<Complex64, OracleError>;
}

/// Exact expectation values from a dense statevector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatevectorOracle {
    method: EvolutionMethod,
}

impl StatevectorOracle {
    /// Exact oracle using `method` for each evolution step.
    pub fn new(method: EvolutionMethod) -> Self {
        Self { method }
    }

    /// Evolution method in use.
    pub fn method(&self) -> EvolutionMethod {
        self.method
    }

    /// Apply `preparation` to `|+⟩^n`.
    pub fn prepare(&self, preparation: &StatePreparation<'_>) -> Result<Statevector, OracleError> {
        let mut state = Statevector::uniform_superposition(preparation.num_qubits)?;
        self.apply_steps(&mut state, &preparation.steps)?;
        Ok(state)
    }

    /// Apply evolution steps to an existing state, in order.
    pub fn apply_steps(
        &self,
        state: &mut Statevector,
        steps: &[EvolutionStep<'_>],
    ) -> Result<(), OracleError> {
        for step in steps {
            trace!(generator = %step.generator, time = step.time, "evolve");
            evolve(state, step.hamiltonian, step.time, self.method)?;
        }
        Ok(())
    }
}

impl ExpectationOracle for StatevectorOracle {
    fn name(&self) -> &str {
        "statevector"
    }

    fn expectation(
        &mut self,
        preparation: &StatePreparation<'_>,
        observable: &PauliHamiltonian,
    ) -> Result<Complex64, OracleError> {
        let state = self.prepare(preparation)?;
        Ok(state.expectation(observable)?)
    }
}

/// Shot-based estimates.
///
/// The state is prepared exactly; each non-identity term is then measured
/// `shots` times in its own eigenbasis and estimated as the mean parity of
/// the outcomes on its support. Identity terms contribute their coefficient
/// exactly.
#[derive(Debug, Clone)]
pub struct SamplingOracle {
    exact: StatevectorOracle,
    shots: u32,
    rng: StdRng,
}

impl SamplingOracle {
    /// Create a sampler. A `None` seed draws one from the OS.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::InvalidShots`] when `shots == 0`.
    pub fn new(shots: u32, seed: Option<u64>, method: EvolutionMethod) -> Result<Self, OracleError> {
        if shots == 0 {
            return Err(OracleError::InvalidShots);
        }
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            exact: StatevectorOracle::new(method),
            shots,
            rng,
        })
    }

    /// Shots drawn per Pauli term.
    pub fn shots(&self) -> u32 {
        self.shots
    }

    fn estimate_term(&mut self, state: &Statevector, term: &PauliTerm) -> Result<f64, OracleError> {
        let mut rotated = state.clone();
        rotated.rotate_to_measurement_basis(term)?;
        let outcomes = WeightedIndex::new(rotated.probabilities())
            .map_err(|e| OracleError::Backend(format!("cannot sample outcomes: {e}")))?;

        let mask = term
            .operators
            .iter()
            .fold(0usize, |mask, &(qubit, _)| mask | (1 << qubit));
        let mut total = 0i64;
        for _ in 0..self.shots {
            let bits = outcomes.sample(&mut self.rng);
            total += if (bits & mask).count_ones() % 2 == 0 { 1 } else { -1 };
        }
        Ok(total as f64 / f64::from(self.shots))
    }
}

impl ExpectationOracle for SamplingOracle {
    fn name(&self) -> &str {
        "sampling"
    }

    fn expectation(
        &mut self,
        preparation: &StatePreparation<'_>,
        observable: &PauliHamiltonian,
    ) -> Result<Complex64, OracleError> {
        let state = self.exact.prepare(preparation)?;
        observable.validate(state.num_qubits())?;

        let mut value = observable.identity_coefficient();
        for term in observable.non_identity_terms() {
            value += term.coefficient * self.estimate_term(&state, term)?;
        }
        Ok(Complex64::new(value, 0.0))
    }
}

/// Backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OracleConfig {
    /// Exact statevector expectation.
    #[default]
    Statevector,
    /// Shot-sampled estimates.
    Sampling {
        shots: u32,
        #[serde(default)]
        seed: Option<u64>,
    },
}

impl OracleConfig {
    /// Build the configured backend.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::InvalidShots`] for a sampler with zero shots.
    pub fn build(&self, method: EvolutionMethod) -> Result<Box<dyn ExpectationOracle>, OracleError> {
        Ok(match *self {
            OracleConfig::Statevector => Box::new(StatevectorOracle::new(method)),
            OracleConfig::Sampling { shots, seed } => {
                Box::new(SamplingOracle::new(shots, seed, method)?)
            }
        })
    }
}
