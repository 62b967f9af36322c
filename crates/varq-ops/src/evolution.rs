//! Time evolution `|ψ⟩ → exp(-i t H)|ψ⟩` under a Pauli-sum Hamiltonian.

use serde::{Deserialize, Serialize};

use crate::error::{OpsError, OpsResult};
use crate::matrix::propagator;
use crate::pauli::PauliHamiltonian;
use crate::statevector::Statevector;

/// How to apply `exp(-i t H)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum EvolutionMethod {
    /// Exact in every case: diagonal phases for diagonal `H`, a product of
    /// Pauli rotations when all terms commute, a dense propagator otherwise.
    #[default]
    Auto,
    /// Always build the dense propagator via the matrix exponential.
    Exact,
    /// First-order product formula with `steps` slices. Exact only when all
    /// terms commute.
    Trotter {
        /// Number of Trotter slices.
        steps: usize,
    },
}

impl std::fmt::Display for EvolutionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvolutionMethod::Auto => write!(f, "auto"),
            EvolutionMethod::Exact => write!(f, "exact"),
            EvolutionMethod::Trotter { steps } => write!(f, "trotter({steps})"),
        }
    }
}

/// Evolve `state` under `h` for time `t`.
pub fn evolve(
    state: &mut Statevector,
    h: &PauliHamiltonian,
    t: f64,
    method: EvolutionMethod,
) -> OpsResult<()> {
    let n = state.num_qubits();
    h.validate(n)?;

    match method {
        EvolutionMethod::Auto if h.is_diagonal() => {
            let diagonal = h.diagonal(n)?;
            state.apply_diagonal_evolution(&diagonal, t)
        }
        EvolutionMethod::Auto if h.terms_commute() => {
            for term in &h.terms {
                state.apply_pauli_rotation(term, t)?;
            }
            Ok(())
        }
        EvolutionMethod::Auto | EvolutionMethod::Exact => {
            tracing::trace!(num_qubits = n, terms = h.num_terms(), "dense propagator");
            state.apply_matrix(&propagator(h, n, t)?)
        }
        EvolutionMethod::Trotter { steps: 0 } => Err(OpsError::ZeroTrotterSteps),
        EvolutionMethod::Trotter { steps } => {
            let dt = t / steps as f64;
            for _ in 0..steps {
                for term in &h.terms {
                    state.apply_pauli_rotation(term, dt)?;
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pauli::PauliTerm;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn ising() -> PauliHamiltonian {
        PauliHamiltonian::ising(&[(0, 1, -1.0)], &[(0, -0.5)])
    }

    fn non_commuting() -> PauliHamiltonian {
        ising() + PauliHamiltonian::transverse_field(2).scaled(0.7)
    }

    fn overlap(a: &Statevector, b: &Statevector) -> f64 {
        a.inner(b).unwrap().norm()
    }

    #[test]
    fn test_auto_matches_exact_for_diagonal() {
        let mut auto = Statevector::uniform_superposition(2).unwrap();
        let mut exact = auto.clone();
        evolve(&mut auto, &ising(), 0.9, EvolutionMethod::Auto).unwrap();
        evolve(&mut exact, &ising(), 0.9, EvolutionMethod::Exact).unwrap();
        assert_abs_diff_eq!(overlap(&auto, &exact), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_auto_matches_exact_for_commuting_mixer() {
        let mixer = PauliHamiltonian::transverse_field(2);
        let mut auto = Statevector::zero(2).unwrap();
        let mut exact = auto.clone();
        evolve(&mut auto, &mixer, 0.4, EvolutionMethod::Auto).unwrap();
        evolve(&mut exact, &mixer, 0.4, EvolutionMethod::Exact).unwrap();
        assert_abs_diff_eq!(overlap(&auto, &exact), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_trotter_converges_to_exact() {
        let h = non_commuting();
        let mut exact = Statevector::uniform_superposition(2).unwrap();
        evolve(&mut exact, &h, 1.2, EvolutionMethod::Auto).unwrap();

        let error = |steps| {
            let mut s = Statevector::uniform_superposition(2).unwrap();
            evolve(&mut s, &h, 1.2, EvolutionMethod::Trotter { steps }).unwrap();
            1.0 - overlap(&s, &exact)
        };

        let coarse = error(1);
        let fine = error(64);
        assert!(fine < coarse);
        assert!(fine < 1e-3, "trotter error {fine}");
    }

    #[test]
    fn test_zero_trotter_steps_rejected() {
        let mut s = Statevector::zero(1).unwrap();
        let h = PauliHamiltonian::new(vec![PauliTerm::x(1.0, 0)]);
        assert_eq!(
            evolve(&mut s, &h, 1.0, EvolutionMethod::Trotter { steps: 0 }),
            Err(OpsError::ZeroTrotterSteps)
        );
    }

    #[test]
    fn test_method_from_yaml_shape() {
        let method: EvolutionMethod =
            serde_json::from_str(r#"{"method":"trotter","steps":8}"#).unwrap();
        assert_eq!(method, EvolutionMethod::Trotter { steps: 8 });
        assert_eq!(method.to_string(), "trotter(8)");
    }

    proptest! {
        #[test]
        fn prop_evolution_preserves_norm(t in -10.0f64..10.0) {
            let mut s = Statevector::uniform_superposition(2).unwrap();
            evolve(&mut s, &non_commuting(), t, EvolutionMethod::Auto).unwrap();
            prop_assert!((s.norm() - 1.0).abs() < 1e-9);
        }

        #[test]
        fn prop_evolution_is_reversible(t in -5.0f64..5.0) {
            let start = Statevector::uniform_superposition(2).unwrap();
            let mut s = start.clone();
            evolve(&mut s, &non_commuting(), t, EvolutionMethod::Auto).unwrap();
            evolve(&mut s, &non_commuting(), -t, EvolutionMethod::Auto).unwrap();
            prop_assert!((overlap(&s, &start) - 1.0).abs() < 1e-9);
        }
    }
}
