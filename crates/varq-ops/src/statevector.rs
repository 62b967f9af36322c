//! Dense statevector for small registers.

use ndarray::Array2;
use num_complex::Complex64;

use crate::error::{OpsError, OpsResult};
use crate::pauli::{Pauli, PauliHamiltonian, PauliTerm};

/// Amplitudes of an `n`-qubit pure state, little-endian.
#[derive(Debug, Clone, PartialEq)]
pub struct Statevector {
    num_qubits: usize,
    amplitudes: Vec<Complex64>,
}

impl Statevector {
    /// The all-zero basis state |0...0⟩.
    pub fn zero(num_qubits: usize) -> OpsResult<Self> {
        let dim = crate::dimension(num_qubits)?;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); dim];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Ok(Self {
            num_qubits,
            amplitudes,
        })
    }

    /// The uniform superposition |+⟩^n.
    pub fn uniform_superposition(num_qubits: usize) -> OpsResult<Self> {
        let dim = crate::dimension(num_qubits)?;
        let amp = Complex64::new(1.0 / (dim as f64).sqrt(), 0.0);
        Ok(Self {
            num_qubits,
            amplitudes: vec![amp; dim],
        })
    }

    /// Wrap raw amplitudes. The length must be a power of two.
    ///
    /// The amplitudes are taken as given; no normalization is applied.
    pub fn from_amplitudes(amplitudes: Vec<Complex64>) -> OpsResult<Self> {
        let len = amplitudes.len();
        if !len.is_power_of_two() {
            return Err(OpsError::NotPowerOfTwo(len));
        }
        Ok(Self {
            num_qubits: len.trailing_zeros() as usize,
            amplitudes,
        })
    }

    /// Number of qubits in the register.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Raw amplitudes.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Measurement probabilities in the computational basis.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr()).collect()
    }

    /// Euclidean norm of the state.
    pub fn norm(&self) -> f64 {
        self.amplitudes
            .iter()
            .map(|a| a.norm_sqr())
            .sum::<f64>()
            .sqrt()
    }

    /// Inner product ⟨self|other⟩.
    pub fn inner(&self, other: &Statevector) -> OpsResult<Complex64> {
        self.check_dim(other.amplitudes.len())?;
        Ok(self
            .amplitudes
            .iter()
            .zip(&other.amplitudes)
            .map(|(a, b)| a.conj() * b)
            .sum())
    }

    /// Expectation value ⟨ψ|H|ψ⟩.
    ///
    /// Returned as a complex number so callers can check that the imaginary
    /// part vanishes.
    pub fn expectation(&self, h: &PauliHamiltonian) -> OpsResult<Complex64> {
        h.validate(self.num_qubits)?;
        let mut value = Complex64::new(0.0, 0.0);

        for term in &h.terms {
            let mut term_value = Complex64::new(0.0, 0.0);
            for (i, &amplitude) in self.amplitudes.iter().enumerate() {
                let (j, phase) = term.apply_to_basis(i);
                term_value += self.amplitudes[j].conj() * phase * amplitude;
            }
            value += term.coefficient * term_value;
        }

        Ok(value)
    }

    /// Apply `exp(-i t c P)` for the term `c P`.
    ///
    /// Exact, since `P² = I` gives `exp(-iθP) = cos θ I - i sin θ P`.
    pub fn apply_pauli_rotation(&mut self, term: &PauliTerm, t: f64) -> OpsResult<()> {
        term.validate(self.num_qubits)?;
        let theta = t * term.coefficient;
        let (sin, cos) = theta.sin_cos();
        let minus_i_sin = Complex64::new(0.0, -sin);

        let mut rotated = vec![Complex64::new(0.0, 0.0); self.amplitudes.len()];
        for (i, &amplitude) in self.amplitudes.iter().enumerate() {
            let (j, phase) = term.apply_to_basis(i);
            rotated[i] += cos * amplitude;
            rotated[j] += minus_i_sin * phase * amplitude;
        }
        self.amplitudes = rotated;
        Ok(())
    }

    /// Multiply each basis amplitude by `exp(-i t dₖ)`.
    pub fn apply_diagonal_evolution(&mut self, diagonal: &[f64], t: f64) -> OpsResult<()> {
        self.check_dim(diagonal.len())?;
        for (amp, &d) in self.amplitudes.iter_mut().zip(diagonal) {
            *amp *= Complex64::from_polar(1.0, -t * d);
        }
        Ok(())
    }

    /// Apply a dense operator.
    pub fn apply_matrix(&mut self, m: &Array2<Complex64>) -> OpsResult<()> {
        self.check_dim(m.nrows())?;
        self.check_dim(m.ncols())?;
        self.amplitudes = (0..m.nrows())
            .map(|row| {
                m.row(row)
                    .iter()
                    .zip(&self.amplitudes)
                    .map(|(a, b)| a * b)
                    .sum()
            })
            .collect();
        Ok(())
    }

    /// Apply a Hadamard gate on `qubit`.
    pub fn apply_h(&mut self, qubit: usize) -> OpsResult<()> {
        self.check_qubit(qubit)?;
        let h = std::f64::consts::FRAC_1_SQRT_2;
        for i in 0..self.amplitudes.len() {
            if (i >> qubit) & 1 == 0 {
                let j = i | (1 << qubit);
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = h * (a + b);
                self.amplitudes[j] = h * (a - b);
            }
        }
        Ok(())
    }

    /// Apply S† = diag(1, -i) on `qubit`.
    pub fn apply_sdg(&mut self, qubit: usize) -> OpsResult<()> {
        self.check_qubit(qubit)?;
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if (i >> qubit) & 1 == 1 {
                *amp *= Complex64::new(0.0, -1.0);
            }
        }
        Ok(())
    }

    /// Rotate so that measuring `term` becomes a Z-basis parity measurement.
    ///
    /// X factors get H, Y factors get S† followed by H.
    pub fn rotate_to_measurement_basis(&mut self, term: &PauliTerm) -> OpsResult<()> {
        for &(qubit, pauli) in &term.operators {
            match pauli {
                Pauli::X => self.apply_h(qubit)?,
                Pauli::Y => {
                    self.apply_sdg(qubit)?;
                    self.apply_h(qubit)?;
                }
                Pauli::I | Pauli::Z => {}
            }
        }
        Ok(())
    }

    fn check_dim(&self, len: usize) -> OpsResult<()> {
        if len != self.amplitudes.len() {
            return Err(OpsError::DimensionMismatch {
                expected: self.amplitudes.len(),
                actual: len,
            });
        }
        Ok(())
    }

    fn check_qubit(&self, qubit: usize) -> OpsResult<()> {
        if qubit >= self.num_qubits {
            return Err(OpsError::QubitOutOfRange {
                qubit,
                num_qubits: self.num_qubits,
            });
        }
        Ok(())
    }
}
