//! Error types for the QAOA evaluation loop.

use std::path::PathBuf;

use thiserror::Error;
use varq_ops::OpsError;
use varq_optim::OptionsError;

/// Errors raised by an expectation oracle.
#[derive(Debug, Error)]
pub enum OracleError {
    /// Sampling needs at least one shot per term.
    #[error("shot count must be positive")]
    InvalidShots,

    /// Preparing or measuring the state failed.
    #[error("state preparation failed: {0}")]
    Ops(#[from] OpsError),

    /// The backend could not produce an estimate.
    #[error("backend failure: {0}")]
    Backend(String),
}

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("QAOA depth must be at least 1")]
    ZeroDepth,

    #[error("problem has no qubits")]
    NoQubits,

    #[error("{observable} observable does not fit the register: {source}")]
    Observable {
        observable: &'static str,
        source: OpsError,
    },

    #[error("expected {expected} initial parameters, got {actual}")]
    InitLength { expected: usize, actual: usize },

    #[error("invalid optimizer options: {0}")]
    Options(#[from] OptionsError),

    #[error("shot count must be positive")]
    ZeroShots,

    #[error("trotter step count must be positive")]
    ZeroTrotterSteps,

    #[error("invalid value {value:?} for {key}")]
    Env { key: &'static str, value: String },

    #[error("unknown optimizer strategy: {0}")]
    UnknownStrategy(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the evaluator and runner.
#[derive(Debug, Error)]
pub enum QaoaError {
    /// The parameter vector does not hold `2p` angles.
    #[error("expected {expected} parameters, got {actual}")]
    InvalidParameters { expected: usize, actual: usize },

    /// The oracle returned a value with a non-negligible imaginary part.
    #[error("expectation value has imaginary part {imaginary:e}; observable is not Hermitian")]
    NonHermitian { imaginary: f64 },

    /// The oracle returned NaN or an infinite component.
    #[error("expectation value {real} + {imaginary}i is not finite")]
    NonFinite { real: f64, imaginary: f64 },

    #[error("oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ops(#[from] OpsError),
}
