//! Error types for observable and statevector operations.

use thiserror::Error;

/// Errors raised while building or applying operators.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OpsError {
    /// A term acts on a qubit outside the register.
    #[error("qubit {qubit} is out of range for a {num_qubits}-qubit register")]
    QubitOutOfRange { qubit: usize, num_qubits: usize },

    /// Two objects disagree on their dimension.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Amplitude vectors must have a power-of-two length.
    #[error("length {0} is not a power of two")]
    NotPowerOfTwo(usize),

    /// Trotterized evolution needs at least one step.
    #[error("trotter step count must be positive")]
    ZeroTrotterSteps,

    /// A register larger than the dense representation can address.
    #[error("{0} qubits exceed the supported register size")]
    TooManyQubits(usize),
}

/// Result alias for operator operations.
pub type OpsResult<T> = Result<T, OpsError>;
