//! Observables and states for the varq evaluation loop.
//!
//! This crate holds the numeric collaborators the variational loop consumes:
//!
//! - **Observables**: real-weighted Pauli sums ([`PauliHamiltonian`]) with
//!   builders for transverse-field mixers and Ising costs
//! - **Dense matrices**: fixtures, Hermiticity checks, and a Padé matrix
//!   exponential for exact propagators
//! - **Statevector**: exact amplitudes for small registers
//! - **Evolution**: `exp(-i t H)|ψ⟩` by phases, Pauli rotations, dense
//!   propagators, or a Trotter product formula
//!
//! # Example
//!
//! ```
//! use varq_ops::{EvolutionMethod, PauliHamiltonian, Statevector, evolve};
//!
//! let cost = PauliHamiltonian::ising(&[(0, 1, -1.0)], &[(0, -0.5)]);
//! let mut state = Statevector::uniform_superposition(2).unwrap();
//! evolve(&mut state, &cost, 0.3, EvolutionMethod::Auto).unwrap();
//!
//! let energy = state.expectation(&cost).unwrap();
//! assert!(energy.im.abs() < 1e-12);
//! ```

pub mod error;
pub mod evolution;
pub mod matrix;
pub mod pauli;
pub mod statevector;

pub use error::{OpsError, OpsResult};
pub use evolution::{EvolutionMethod, evolve};
pub use matrix::{is_hermitian, matrix_exp, propagator};
pub use pauli::{Pauli, PauliHamiltonian, PauliTerm};
pub use statevector::Statevector;

/// Largest register the dense representations accept.
pub const MAX_QUBITS: usize = 24;

/// Hilbert-space dimension `2ⁿ` for an `n`-qubit register.
pub fn dimension(num_qubits: usize) -> OpsResult<usize> {
    if num_qubits > MAX_QUBITS {
        return Err(OpsError::TooManyQubits(num_qubits));
    }
    Ok(1 << num_qubits)
}
