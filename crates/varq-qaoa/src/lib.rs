//! QAOA objective evaluation and optimization loop.
//!
//! A depth-`p` QAOA circuit is described by `2p` angles
//! `[β_0..β_{p-1}, γ_0..γ_{p-1}]`. The [`Evaluator`] turns an angle vector
//! into a [`StatePreparation`], asks an [`ExpectationOracle`] for the cost
//! expectation, and hands the real value to a classical optimizer.
//!
//! # Example
//!
//! ```
//! use varq_qaoa::{InitStrategy, QaoaConfig, QaoaRunner};
//!
//! let config = QaoaConfig {
//!     init: InitStrategy::LinearRamp,
//!     ..Default::default()
//! };
//! let result = QaoaRunner::from_config(config)?.run()?;
//! assert!(result.energy() >= -1.5 - 1e-9);
//! # Ok::<(), varq_qaoa::QaoaError>(())
//! ```

pub mod ansatz;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod init;
pub mod oracle;
pub mod problems;
pub mod runner;

pub use ansatz::{Angles, Convention, EvolutionStep, Generator, LayerOrder, StatePreparation};
pub use config::{
    ConfiguredOptimizer, LoggingConfig, OptimizerConfig, ProblemConfig, QaoaConfig, Strategy,
};
pub use error::{ConfigError, OracleError, QaoaError};
pub use evaluator::Evaluator;
pub use init::InitStrategy;
pub use oracle::{ExpectationOracle, OracleConfig, SamplingOracle, StatevectorOracle};
pub use problems::{Graph, Observables, exact_ground_energy, two_qubit_ising};
pub use runner::{QaoaResult, QaoaRunner};

pub use varq_ops::{EvolutionMethod, PauliHamiltonian, PauliTerm};
pub use varq_optim::{OptimizationResult, Optimizer, Status};
