//! Initial parameter strategies.

use std::f64::consts::{FRAC_PI_4, TAU};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How to choose the starting angles `[β_0..β_{p-1}, γ_0..γ_{p-1}]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InitStrategy {
    /// Each angle uniform on `[0, 2π)`. A `None` seed draws one from the OS.
    Random {
        #[serde(default)]
        seed: Option<u64>,
    },
    /// Annealing-like schedule: `β` ramps down and `γ` ramps up on `(0, π/4]`.
    LinearRamp,
    /// Explicit angles; must hold exactly `2p` values.
    Fixed { values: Vec<f64> },
}

impl Default for InitStrategy {
    fn default() -> Self {
        InitStrategy::Random { seed: None }
    }
}

impl InitStrategy {
    /// Check the strategy against the circuit depth.
    pub fn validate(&self, depth: usize) -> Result<(), ConfigError> {
        match self {
            InitStrategy::Fixed { values } if values.len() != 2 * depth => {
                Err(ConfigError::InitLength {
                    expected: 2 * depth,
                    actual: values.len(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Starting angles for a depth-`depth` circuit.
    pub fn initial_parameters(&self, depth: usize) -> Result<Vec<f64>, ConfigError> {
        self.validate(depth)?;
        Ok(match self {
            InitStrategy::Random { seed } => {
                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(*seed),
                    None => StdRng::from_entropy(),
                };
                (0..2 * depth).map(|_| rng.gen_range(0.0..TAU)).collect()
            }
            InitStrategy::LinearRamp => linear_ramp(depth),
            InitStrategy::Fixed { values } => values.clone(),
        })
    }
}

impl std::fmt::Display for InitStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InitStrategy::Random { seed: Some(seed) } => write!(f, "random(seed={seed})"),
            InitStrategy::Random { seed: None } => write!(f, "random"),
            InitStrategy::LinearRamp => write!(f, "linear-ramp"),
            InitStrategy::Fixed { values } => write!(f, "fixed({} values)", values.len()),
        }
    }
}

fn linear_ramp(depth: usize) -> Vec<f64> {
    let p = depth as f64;
    let beta = (0..depth).map(|i| FRAC_PI_4 * (p - i as f64) / p);
    let gamma = (0..depth).map(|i| FRAC_PI_4 * (i as f64 + 1.0) / p);
    beta.chain(gamma).collect()
}
