//! Cost problems for QAOA.
//!
//! Every cost observable here is diagonal in the computational basis, so the
//! exact optimum is the smallest diagonal entry and can be used to score a
//! run.

use serde::{Deserialize, Serialize};
use varq_ops::{PauliHamiltonian, PauliTerm};

use crate::error::ConfigError;

/// The reference two-qubit Ising cost `-Z0 Z1 - field * Z0`.
///
/// With `field = 0` the ground space is spanned by `|00⟩` and `|11⟩`; any
/// positive field breaks the tie in favor of `|00⟩`.
pub fn two_qubit_ising(field: f64) -> PauliHamiltonian {
    let mut h = PauliHamiltonian::new(vec![PauliTerm::zz(-1.0, 0, 1)]);
    if field != 0.0 {
        h.add_term(PauliTerm::z(-field, 0));
    }
    h
}

/// Exact ground energy of a diagonal observable, `None` otherwise.
pub fn exact_ground_energy(h: &PauliHamiltonian, num_qubits: usize) -> Option<f64> {
    diagonal_range(h, num_qubits).map(|(min, _)| min)
}

/// Smallest and largest eigenvalue of a diagonal observable.
pub fn diagonal_range(h: &PauliHamiltonian, num_qubits: usize) -> Option<(f64, f64)> {
    if !h.is_diagonal() {
        return None;
    }
    let diagonal = h.diagonal(num_qubits).ok()?;
    let min = diagonal.iter().copied().fold(f64::INFINITY, f64::min);
    let max = diagonal.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some((min, max))
}

/// A weighted undirected graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    /// Number of nodes.
    pub n_nodes: usize,
    /// Edges as (node1, node2, weight).
    pub edges: Vec<(usize, usize, f64)>,
}

impl Graph {
    /// Create an empty graph.
    pub fn new(n_nodes: usize) -> Self {
        Self {
            n_nodes,
            edges: Vec::new(),
        }
    }

    /// Add a weighted edge.
    pub fn add_edge(&mut self, i: usize, j: usize, weight: f64) {
        self.edges.push((i, j, weight));
    }

    /// Single edge between two nodes; max cut 1.
    pub fn edge() -> Self {
        let mut g = Self::new(2);
        g.add_edge(0, 1, 1.0);
        g
    }

    /// Triangle; max cut 2.
    pub fn triangle() -> Self {
        let mut g = Self::new(3);
        g.add_edge(0, 1, 1.0);
        g.add_edge(1, 2, 1.0);
        g.add_edge(0, 2, 1.0);
        g
    }

    /// Four-node ring; max cut 4.
    pub fn square_4() -> Self {
        let mut g = Self::new(4);
        for i in 0..4 {
            g.add_edge(i, (i + 1) % 4, 1.0);
        }
        g
    }

    /// Total weight of edges crossing the partition encoded in `bits`.
    ///
    /// Bit `i` of `bits` is the side of node `i`.
    pub fn cut_value(&self, bits: usize) -> f64 {
        self.edges
            .iter()
            .filter(|&&(i, j, _)| ((bits >> i) & 1) != ((bits >> j) & 1))
            .map(|&(_, _, w)| w)
            .sum()
    }

    /// Brute-force maximum cut.
    pub fn max_cut(&self) -> f64 {
        (0..1usize << self.n_nodes)
            .map(|bits| self.cut_value(bits))
            .fold(0.0, f64::max)
    }

    /// MaxCut cost `Σ w/2 (Z_i Z_j - 1)`.
    ///
    /// Each cut edge contributes `-w`, so the minimum eigenvalue is minus
    /// the maximum cut.
    pub fn maxcut_hamiltonian(&self) -> PauliHamiltonian {
        let mut h = PauliHamiltonian::default();
        for &(i, j, w) in &self.edges {
            h.add_term(PauliTerm::zz(w / 2.0, i, j));
            h.add_term(PauliTerm::identity(-w / 2.0));
        }
        h
    }
}

/// Cost and mixing observables on a fixed register, validated together.
#[derive(Debug, Clone, PartialEq)]
pub struct Observables {
    num_qubits: usize,
    cost: PauliHamiltonian,
    mixer: PauliHamiltonian,
}

impl Observables {
    /// Pair a cost observable with an explicit mixer.
    ///
    /// # Errors
    ///
    /// Returns an error if the register is empty or a term acts outside it.
    pub fn new(
        num_qubits: usize,
        cost: PauliHamiltonian,
        mixer: PauliHamiltonian,
    ) -> Result<Self, ConfigError> {
        if num_qubits == 0 {
            return Err(ConfigError::NoQubits);
        }
        cost.validate(num_qubits)
            .map_err(|source| ConfigError::Observable {
                observable: "cost",
                source,
            })?;
        mixer
            .validate(num_qubits)
            .map_err(|source| ConfigError::Observable {
                observable: "mixer",
                source,
            })?;
        Ok(Self {
            num_qubits,
            cost,
            mixer,
        })
    }

    /// Pair a cost observable with the transverse-field mixer `Σ X_i`.
    pub fn with_transverse_mixer(
        num_qubits: usize,
        cost: PauliHamiltonian,
    ) -> Result<Self, ConfigError> {
        Self::new(num_qubits, cost, PauliHamiltonian::transverse_field(num_qubits))
    }

    /// Register size.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Cost observable `H_c`.
    pub fn cost(&self) -> &PauliHamiltonian {
        &self.cost
    }

    /// Mixing observable `H_m`.
    pub fn mixer(&self) -> &PauliHamiltonian {
        &self.mixer
    }

    /// Exact ground energy of the cost observable, when it is diagonal.
    pub fn ground_energy(&self) -> Option<f64> {
        exact_ground_energy(&self.cost, self.num_qubits)
    }
}
