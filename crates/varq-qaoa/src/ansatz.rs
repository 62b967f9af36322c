//! QAOA state preparation.
//!
//! A depth-`p` preparation starts from `|+⟩^n` and applies `p` layers, each
//! an evolution `exp(-i γ_k H_c)` under the cost observable and an evolution
//! `exp(-i β_k H_m)` under the mixer. The order of the two steps inside a
//! layer and the sign of the angles are fixed by a [`Convention`].
//!
//! Parameters are laid out as `[β_0..β_{p-1}, γ_0..γ_{p-1}]`.

use serde::{Deserialize, Serialize};
use varq_ops::PauliHamiltonian;

use crate::error::QaoaError;

/// Order of the two evolutions inside one layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerOrder {
    /// Cost evolution first, then the mixer (the textbook QAOA layer).
    #[default]
    CostThenMixer,
    MixerThenCost,
}

/// Layer order and angle sign.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Convention {
    pub order: LayerOrder,
    /// Evolve for `-angle` instead of `+angle`.
    pub negate_angles: bool,
}

impl Convention {
    fn time(&self, angle: f64) -> f64 {
        if self.negate_angles { -angle } else { angle }
    }
}

/// Which observable generates an evolution step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generator {
    Cost,
    Mixer,
}

impl std::fmt::Display for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Generator::Cost => write!(f, "cost"),
            Generator::Mixer => write!(f, "mixer"),
        }
    }
}

/// One evolution `exp(-i t H)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvolutionStep<'h> {
    pub generator: Generator,
    pub hamiltonian: &'h PauliHamiltonian,
    pub time: f64,
}

/// `β` and `γ` halves of a parameter vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Angles<'a> {
    pub beta: &'a [f64],
    pub gamma: &'a [f64],
}

impl<'a> Angles<'a> {
    /// Split `params` for a depth-`depth` circuit.
    ///
    /// # Errors
    ///
    /// Returns [`QaoaError::InvalidParameters`] unless `params.len() == 2 * depth`.
    pub fn split(params: &'a [f64], depth: usize) -> Result<Self, QaoaError> {
        if params.len() != 2 * depth {
            return Err(QaoaError::InvalidParameters {
                expected: 2 * depth,
                actual: params.len(),
            });
        }
        let (beta, gamma) = params.split_at(depth);
        Ok(Self { beta, gamma })
    }

    /// Number of layers `p`.
    pub fn depth(&self) -> usize {
        self.beta.len()
    }
}

/// A sequence of evolutions applied to `|+⟩^n`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatePreparation<'h> {
    pub num_qubits: usize,
    pub steps: Vec<EvolutionStep<'h>>,
}

impl<'h> StatePreparation<'h> {
    /// Build the QAOA layers for `angles`.
    pub fn qaoa(
        num_qubits: usize,
        cost: &'h PauliHamiltonian,
        mixer: &'h PauliHamiltonian,
        angles: &Angles<'_>,
        convention: Convention,
    ) -> Self {
        let mut steps = Vec::with_capacity(2 * angles.depth());
        for (&beta, &gamma) in angles.beta.iter().zip(angles.gamma) {
            let cost_step = EvolutionStep {
                generator: Generator::Cost,
                hamiltonian: cost,
                time: convention.time(gamma),
            };
            let mixer_step = EvolutionStep {
                generator: Generator::Mixer,
                hamiltonian: mixer,
                time: convention.time(beta),
            };
            match convention.order {
                LayerOrder::CostThenMixer => steps.extend([cost_step, mixer_step]),
                LayerOrder::MixerThenCost => steps.extend([mixer_step, cost_step]),
            }
        }
        Self { num_qubits, steps }
    }

    /// Steps that undo this preparation: reversed, with negated times.
    ///
    /// Applying `self` and then the inverse to `|+⟩^n` returns `|+⟩^n`.
    pub fn inverse(&self) -> Self {
        Self {
            num_qubits: self.num_qubits,
            steps: self
                .steps
                .iter()
                .rev()
                .map(|step| EvolutionStep {
                    time: -step.time,
                    ..*step
                })
                .collect(),
        }
    }

    /// Number of layers, counting a cost and a mixer step as one layer.
    pub fn depth(&self) -> usize {
        self.steps.len() / 2
    }
}
