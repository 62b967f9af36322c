//! Classical optimizers for variational algorithms.
//!
//! Every objective evaluation stands for one run on quantum hardware (or a
//! simulator standing in for it), so the evaluation count `nfev` is the
//! figure of merit when comparing strategies:
//!
//! - [`NelderMead`]: derivative-free simplex search
//! - [`Bfgs`]: quasi-Newton with forward-difference gradients
//!
//! Objectives are fallible. An error from the objective aborts the run and
//! is returned as-is; failing to converge is not an error and is reported
//! through [`OptimizationResult::status`].

pub mod bfgs;
pub mod error;
pub mod nelder_mead;
mod objective;
mod result;

pub use bfgs::Bfgs;
pub use error::OptionsError;
pub use nelder_mead::NelderMead;
pub use result::{OptimizationResult, Status};

/// Trait for classical optimizers.
pub trait Optimizer {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &'static str;

    /// Minimize the objective function.
    ///
    /// # Arguments
    /// * `objective` - The function to minimize, takes parameters and returns value
    /// * `initial_params` - Starting point
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `objective`.
    fn minimize<F, E>(&self, objective: F, initial_params: Vec<f64>) -> Result<OptimizationResult, E>
    where
        F: FnMut(&[f64]) -> Result<f64, E>;
}
