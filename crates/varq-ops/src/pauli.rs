//! Pauli-sum observables.
//!
//! An observable is a real-weighted sum of Pauli strings:
//! H = Σᵢ cᵢ Pᵢ
//! where each Pᵢ is a tensor product of single-qubit Pauli operators. With
//! real coefficients every such sum is Hermitian, so its expectation value in
//! any normalized state is real.
//!
//! Qubit ordering is little-endian: bit `q` of a basis index is qubit `q`.

use std::ops::Add;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{OpsError, OpsResult};

/// A single Pauli operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pauli {
    /// Identity operator.
    I,
    /// Pauli-X operator.
    X,
    /// Pauli-Y operator.
    Y,
    /// Pauli-Z operator.
    Z,
}

impl Pauli {
    /// Get the name of this Pauli operator.
    pub fn name(&self) -> &'static str {
        match self {
            Pauli::I => "I",
            Pauli::X => "X",
            Pauli::Y => "Y",
            Pauli::Z => "Z",
        }
    }

    /// Whether this operator flips the computational basis bit.
    pub fn flips(&self) -> bool {
        matches!(self, Pauli::X | Pauli::Y)
    }

    /// Apply this operator to a single qubit basis state `|bit⟩`.
    ///
    /// Returns the phase picked up; the bit flips iff [`Pauli::flips`].
    fn phase(&self, bit: usize) -> Complex64 {
        match (self, bit) {
            (Pauli::I, _) | (Pauli::X, _) => Complex64::new(1.0, 0.0),
            (Pauli::Y, 0) => Complex64::new(0.0, 1.0),
            (Pauli::Y, _) => Complex64::new(0.0, -1.0),
            (Pauli::Z, 0) => Complex64::new(1.0, 0.0),
            (Pauli::Z, _) => Complex64::new(-1.0, 0.0),
        }
    }
}

impl std::fmt::Display for Pauli {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One weighted Pauli string, cᵢ * (P₀ ⊗ P₁ ⊗ ... ⊗ Pₙ).
///
/// Only non-identity factors are stored; an empty operator list is the
/// identity on every qubit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PauliTerm {
    /// The real weight of this term.
    pub coefficient: f64,
    /// The non-identity factors, as (qubit_index, pauli).
    #[serde(default)]
    pub operators: Vec<(usize, Pauli)>,
}

impl PauliTerm {
    /// Create a new Pauli term.
    ///
    /// Explicit identity factors are dropped.
    pub fn new(coefficient: f64, operators: Vec<(usize, Pauli)>) -> Self {
        let operators = operators
            .into_iter()
            .filter(|(_, p)| *p != Pauli::I)
            .collect();
        Self {
            coefficient,
            operators,
        }
    }

    /// Create an identity term (scalar offset).
    pub fn identity(coefficient: f64) -> Self {
        Self::new(coefficient, vec![])
    }

    /// Create a single-qubit X term.
    pub fn x(coefficient: f64, qubit: usize) -> Self {
        Self::new(coefficient, vec![(qubit, Pauli::X)])
    }

    /// Create a single-qubit Y term.
    pub fn y(coefficient: f64, qubit: usize) -> Self {
        Self::new(coefficient, vec![(qubit, Pauli::Y)])
    }

    /// Create a single-qubit Z term.
    pub fn z(coefficient: f64, qubit: usize) -> Self {
        Self::new(coefficient, vec![(qubit, Pauli::Z)])
    }

    /// Create a ZZ term.
    pub fn zz(coefficient: f64, qubit1: usize, qubit2: usize) -> Self {
        Self::new(coefficient, vec![(qubit1, Pauli::Z), (qubit2, Pauli::Z)])
    }

    /// Create an XX term.
    pub fn xx(coefficient: f64, qubit1: usize, qubit2: usize) -> Self {
        Self::new(coefficient, vec![(qubit1, Pauli::X), (qubit2, Pauli::X)])
    }

    /// Create a YY term.
    pub fn yy(coefficient: f64, qubit1: usize, qubit2: usize) -> Self {
        Self::new(coefficient, vec![(qubit1, Pauli::Y), (qubit2, Pauli::Y)])
    }

    /// Check if this is an identity term.
    pub fn is_identity(&self) -> bool {
        self.operators.is_empty()
    }

    /// Whether the term is diagonal in the computational basis.
    pub fn is_diagonal(&self) -> bool {
        self.operators.iter().all(|(_, p)| !p.flips())
    }

    /// Get the maximum qubit index.
    pub fn max_qubit(&self) -> Option<usize> {
        self.operators.iter().map(|(q, _)| *q).max()
    }

    /// The Pauli factor acting on `qubit` (identity if none is stored).
    pub fn pauli_on(&self, qubit: usize) -> Pauli {
        self.operators
            .iter()
            .find(|(q, _)| *q == qubit)
            .map(|(_, p)| *p)
            .unwrap_or(Pauli::I)
    }

    /// Whether the two Pauli strings commute.
    ///
    /// Strings commute iff they differ by a non-identity pair on an even
    /// number of qubits.
    pub fn commutes_with(&self, other: &PauliTerm) -> bool {
        let anticommuting = self
            .operators
            .iter()
            .filter(|(q, p)| {
                let o = other.pauli_on(*q);
                o != Pauli::I && o != *p
            })
            .count();
        anticommuting % 2 == 0
    }

    /// Apply the unweighted Pauli string to the basis state `|index⟩`.
    ///
    /// Returns `(j, phase)` such that `P|index⟩ = phase |j⟩`.
    pub fn apply_to_basis(&self, index: usize) -> (usize, Complex64) {
        let mut new_index = index;
        let mut phase = Complex64::new(1.0, 0.0);

        for &(qubit, pauli) in &self.operators {
            let bit = (index >> qubit) & 1;
            phase *= pauli.phase(bit);
            if pauli.flips() {
                new_index ^= 1 << qubit;
            }
        }

        (new_index, phase)
    }

    /// Check that every factor fits in a `num_qubits` register.
    pub fn validate(&self, num_qubits: usize) -> OpsResult<()> {
        match self.max_qubit() {
            Some(qubit) if qubit >= num_qubits => {
                Err(OpsError::QubitOutOfRange { qubit, num_qubits })
            }
            _ => Ok(()),
        }
    }
}

impl std::fmt::Display for PauliTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.coefficient >= 0.0 {
            write!(f, "+{:.4} ", self.coefficient)?;
        } else {
            write!(f, "{:.4} ", self.coefficient)?;
        }

        if self.operators.is_empty() {
            return write!(f, "I");
        }
        for (i, (qubit, pauli)) in self.operators.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}{}", pauli, qubit)?;
        }
        Ok(())
    }
}

/// A Hamiltonian represented as a sum of Pauli terms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PauliHamiltonian {
    /// The terms in the Hamiltonian.
    pub terms: Vec<PauliTerm>,
}

impl PauliHamiltonian {
    /// Create a new Hamiltonian from a list of terms.
    pub fn new(terms: Vec<PauliTerm>) -> Self {
        Self { terms }
    }

    /// Transverse-field mixer Σᵢ Xᵢ over `num_qubits` qubits.
    pub fn transverse_field(num_qubits: usize) -> Self {
        Self::new((0..num_qubits).map(|q| PauliTerm::x(1.0, q)).collect())
    }

    /// Ising Hamiltonian Σ J_ij Zᵢ Zⱼ + Σ hᵢ Zᵢ.
    ///
    /// # Arguments
    /// * `couplings` - `(i, j, J_ij)` two-body terms
    /// * `fields` - `(i, h_i)` single-body terms
    pub fn ising(couplings: &[(usize, usize, f64)], fields: &[(usize, f64)]) -> Self {
        let mut terms: Vec<PauliTerm> = couplings
            .iter()
            .map(|&(i, j, w)| PauliTerm::zz(w, i, j))
            .collect();
        terms.extend(fields.iter().map(|&(i, h)| PauliTerm::z(h, i)));
        Self::new(terms)
    }

    /// Add a term to the Hamiltonian.
    pub fn add_term(&mut self, term: PauliTerm) {
        self.terms.push(term);
    }

    /// Return a copy with every coefficient multiplied by `weight`.
    pub fn scaled(&self, weight: f64) -> Self {
        Self::new(
            self.terms
                .iter()
                .map(|t| PauliTerm {
                    coefficient: t.coefficient * weight,
                    operators: t.operators.clone(),
                })
                .collect(),
        )
    }

    /// Get the number of terms.
    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    /// Smallest register that every term fits in.
    pub fn num_qubits(&self) -> usize {
        self.terms
            .iter()
            .filter_map(PauliTerm::max_qubit)
            .max()
            .map(|m| m + 1)
            .unwrap_or(0)
    }

    /// Sum of the identity coefficients.
    pub fn identity_coefficient(&self) -> f64 {
        self.terms
            .iter()
            .filter(|t| t.is_identity())
            .map(|t| t.coefficient)
            .sum()
    }

    /// Iterate over non-identity terms.
    pub fn non_identity_terms(&self) -> impl Iterator<Item = &PauliTerm> {
        self.terms.iter().filter(|t| !t.is_identity())
    }

    /// Whether every term is diagonal in the computational basis.
    pub fn is_diagonal(&self) -> bool {
        self.terms.iter().all(PauliTerm::is_diagonal)
    }

    /// Whether all terms commute pairwise.
    pub fn terms_commute(&self) -> bool {
        self.terms.iter().enumerate().all(|(i, a)| {
            self.terms[i + 1..].iter().all(|b| a.commutes_with(b))
        })
    }

    /// Check that every term fits in a `num_qubits` register.
    pub fn validate(&self, num_qubits: usize) -> OpsResult<()> {
        self.terms.iter().try_for_each(|t| t.validate(num_qubits))
    }

    /// Diagonal entries in the computational basis.
    ///
    /// Only the diagonal part of each term contributes; off-diagonal terms
    /// are skipped.
    pub fn diagonal(&self, num_qubits: usize) -> OpsResult<Vec<f64>> {
        self.validate(num_qubits)?;
        let dim = crate::dimension(num_qubits)?;
        Ok((0..dim)
            .map(|index| {
                self.terms
                    .iter()
                    .filter(|t| t.is_diagonal())
                    .map(|t| t.coefficient * t.apply_to_basis(index).1.re)
                    .sum()
            })
            .collect())
    }
}

impl Add for PauliHamiltonian {
    type Output = PauliHamiltonian;

    fn add(mut self, rhs: PauliHamiltonian) -> Self::Output {
        self.terms.extend(rhs.terms);
        self
    }
}

impl FromIterator<PauliTerm> for PauliHamiltonian {
    fn from_iter<T: IntoIterator<Item = PauliTerm>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl std::fmt::Display for PauliHamiltonian {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Hamiltonian ({} terms, {} qubits):",
            self.num_terms(),
            self.num_qubits()
        )?;
        for term in &self.terms {
            writeln!(f, "  {}", term)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pauli_term_creation() {
        let term = PauliTerm::zz(-0.5, 0, 1);
        assert_eq!(term.coefficient, -0.5);
        assert_eq!(term.operators.len(), 2);
        assert!(!term.is_identity());
        assert!(term.is_diagonal());
    }

    #[test]
    fn test_explicit_identity_factors_dropped() {
        let term = PauliTerm::new(1.0, vec![(0, Pauli::I), (1, Pauli::X)]);
        assert_eq!(term.operators, vec![(1, Pauli::X)]);
    }

    #[test]
    fn test_apply_to_basis() {
        // Y|0⟩ = i|1⟩
        let (j, phase) = PauliTerm::y(1.0, 0).apply_to_basis(0);
        assert_eq!(j, 1);
        assert_eq!(phase, Complex64::new(0.0, 1.0));

        // Z0 Z1 |11⟩ = |11⟩
        let (j, phase) = PauliTerm::zz(1.0, 0, 1).apply_to_basis(3);
        assert_eq!(j, 3);
        assert_eq!(phase, Complex64::new(1.0, 0.0));

        // X1 |01⟩ = |11⟩ (index 1 -> 3)
        let (j, _) = PauliTerm::x(1.0, 1).apply_to_basis(1);
        assert_eq!(j, 3);
    }

    #[test]
    fn test_commutation() {
        let zz = PauliTerm::zz(1.0, 0, 1);
        let xx = PauliTerm::xx(1.0, 0, 1);
        let x0 = PauliTerm::x(1.0, 0);
        let z2 = PauliTerm::z(1.0, 2);

        assert!(zz.commutes_with(&xx));
        assert!(!zz.commutes_with(&x0));
        assert!(x0.commutes_with(&z2));
    }

    #[test]
    fn test_hamiltonian() {
        let h = PauliHamiltonian::new(vec![
            PauliTerm::identity(-1.0),
            PauliTerm::z(0.5, 0),
            PauliTerm::z(-0.5, 1),
            PauliTerm::zz(-0.25, 0, 1),
        ]);

        assert_eq!(h.num_terms(), 4);
        assert_eq!(h.num_qubits(), 2);
        assert_eq!(h.identity_coefficient(), -1.0);
        assert_eq!(h.non_identity_terms().count(), 3);
        assert!(h.is_diagonal());
        assert!(h.terms_commute());
    }

    #[test]
    fn test_transverse_field_does_not_commute_with_ising() {
        let mixer = PauliHamiltonian::transverse_field(2);
        assert_eq!(mixer.num_terms(), 2);
        assert!(mixer.terms_commute());
        assert!(!mixer.is_diagonal());

        let mixed = mixer + PauliHamiltonian::ising(&[(0, 1, -1.0)], &[]);
        assert!(!mixed.terms_commute());
    }

    #[test]
    fn test_ising_diagonal() {
        let h = PauliHamiltonian::ising(&[(0, 1, -1.0)], &[(0, -0.5)]);
        assert_eq!(h.diagonal(2).unwrap(), vec![-1.5, 1.5, 0.5, -0.5]);
    }

    #[test]
    fn test_scaled() {
        let h = PauliHamiltonian::transverse_field(3).scaled(-2.0);
        assert!(h.terms.iter().all(|t| t.coefficient == -2.0));
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let h = PauliHamiltonian::ising(&[(0, 3, 1.0)], &[]);
        assert_eq!(
            h.validate(2),
            Err(OpsError::QubitOutOfRange {
                qubit: 3,
                num_qubits: 2
            })
        );
    }

    #[test]
    fn test_display() {
        let h = PauliHamiltonian::ising(&[(0, 1, -1.0)], &[]);
        let text = h.to_string();
        assert!(text.contains("1 terms, 2 qubits"));
        assert!(text.contains("-1.0000 Z0 Z1"));
    }
}
