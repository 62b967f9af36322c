use serde::{Deserialize, Serialize};

/// Why the optimizer stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Converged according to the configured tolerances.
    Converged,

    /// Reached the iteration limit without converging.
    MaxIterations,

    /// Reached the objective evaluation budget without converging.
    MaxEvaluations,

    /// The line search could not find a sufficient decrease.
    LineSearchFailed,
}

impl Status {
    /// Human-readable termination message.
    pub fn message(&self) -> &'static str {
        match self {
            Status::Converged => "optimization converged",
            Status::MaxIterations => "maximum number of iterations reached",
            Status::MaxEvaluations => "maximum number of function evaluations reached",
            Status::LineSearchFailed => "line search failed to decrease the objective",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Result of a single minimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Best parameters found.
    pub x: Vec<f64>,
    /// Objective value at `x`.
    pub fun: f64,
    /// Number of objective evaluations, including gradient probes.
    pub nfev: usize,
    /// Number of iterations.
    pub nit: usize,
    /// Whether optimization converged.
    pub converged: bool,
    /// Termination reason.
    pub status: Status,
    /// Best objective value after each iteration.
    pub history: Vec<f64>,
}

impl OptimizationResult {
    pub(crate) fn new(
        x: Vec<f64>,
        fun: f64,
        nfev: usize,
        nit: usize,
        status: Status,
        history: Vec<f64>,
    ) -> Self {
        Self {
            x,
            fun,
            nfev,
            nit,
            converged: status == Status::Converged,
            status,
            history,
        }
    }
}
