//! The QAOA objective: parameters in, cost expectation out.

use tracing::{debug, warn};
use varq_ops::{EvolutionMethod, Statevector};

use crate::ansatz::{Angles, Convention, StatePreparation};
use crate::error::QaoaError;
use crate::oracle::{ExpectationOracle, StatevectorOracle};
use crate::problems::Observables;

/// Default relative bound on the imaginary part of an expectation value.
pub const DEFAULT_IMAG_TOLERANCE: f64 = 1e-9;

/// Evaluates `⟨ψ(β, γ)|H_c|ψ(β, γ)⟩` through an oracle.
///
/// The depth is fixed at construction; every call to [`evaluate`] must pass
/// exactly `2 * depth` angles.
///
/// [`evaluate`]: Evaluator::evaluate
pub struct Evaluator {
    observables: Observables,
    depth: usize,
    convention: Convention,
    evolution: EvolutionMethod,
    oracle: Box<dyn ExpectationOracle>,
    imag_tolerance: f64,
    evaluations: usize,
}

impl Evaluator {
    /// Create an evaluator with the default convention.
    pub fn new(observables: Observables, depth: usize, oracle: Box<dyn ExpectationOracle>) -> Self {
        Self {
            observables,
            depth,
            convention: Convention::default(),
            evolution: EvolutionMethod::default(),
            oracle,
            imag_tolerance: DEFAULT_IMAG_TOLERANCE,
            evaluations: 0,
        }
    }

    /// Set the layer order and angle sign.
    pub fn with_convention(mut self, convention: Convention) -> Self {
        self.convention = convention;
        self
    }

    /// Set the evolution method used by [`Evaluator::final_state`].
    pub fn with_evolution(mut self, evolution: EvolutionMethod) -> Self {
        self.evolution = evolution;
        self
    }

    /// Set the relative bound on the imaginary part.
    pub fn with_imag_tolerance(mut self, tolerance: f64) -> Self {
        self.imag_tolerance = tolerance;
        self
    }

    /// Number of angles expected by [`Evaluator::evaluate`].
    pub fn num_parameters(&self) -> usize {
        2 * self.depth
    }

    /// Number of QAOA layers.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Cost and mixing observables.
    pub fn observables(&self) -> &Observables {
        &self.observables
    }

    /// Layer order and angle sign in use.
    pub fn convention(&self) -> Convention {
        self.convention
    }

    /// Name of the oracle backend.
    pub fn oracle_name(&self) -> &str {
        self.oracle.name()
    }

    /// Number of successful and failed calls to [`Evaluator::evaluate`] that
    /// reached the oracle.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Evaluate the cost expectation at `params`.
    ///
    /// # Errors
    ///
    /// - [`QaoaError::InvalidParameters`] if `params.len() != 2p`; the oracle
    ///   is not called
    /// - [`QaoaError::NonFinite`] if the oracle returns NaN or infinity
    /// - [`QaoaError::NonHermitian`] if the oracle's imaginary part exceeds
    ///   the tolerance
    /// - [`QaoaError::Oracle`] if the oracle fails
    pub fn evaluate(&mut self, params: &[f64]) -> Result<f64, QaoaError> {
        let angles = Angles::split(params, self.depth)?;
        let preparation = StatePreparation::qaoa(
            self.observables.num_qubits(),
            self.observables.cost(),
            self.observables.mixer(),
            &angles,
            self.convention,
        );

        self.evaluations += 1;
        let value = self.oracle.expectation(&preparation, self.observables.cost())?;
        if !value.is_finite() {
            warn!(real = value.re, imaginary = value.im, "non-finite expectation value");
            return Err(QaoaError::NonFinite {
                real: value.re,
                imaginary: value.im,
            });
        }
        if value.im.abs() > self.imag_tolerance * (1.0 + value.re.abs()) {
            warn!(real = value.re, imaginary = value.im, "complex expectation value");
            return Err(QaoaError::NonHermitian {
                imaginary: value.im,
            });
        }

        debug!(evaluation = self.evaluations, energy = value.re, "evaluated");
        Ok(value.re)
    }

    /// Exact state prepared by `params`, independent of the oracle backend.
    pub fn final_state(&self, params: &[f64]) -> Result<Statevector, QaoaError> {
        let angles = Angles::split(params, self.depth)?;
        let preparation = StatePreparation::qaoa(
            self.observables.num_qubits(),
            self.observables.cost(),
            self.observables.mixer(),
            &angles,
            self.convention,
        );
        Ok(StatevectorOracle::new(self.evolution).prepare(&preparation)?)
    }
}

impl std::fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluator")
            .field("depth", &self.depth)
            .field("num_qubits", &self.observables.num_qubits())
            .field("convention", &self.convention)
            .field("oracle", &self.oracle.name())
            .field("evaluations", &self.evaluations)
            .finish()
    }
}
