//! BFGS quasi-Newton minimizer with finite-difference gradients.
//!
//! The gradient is estimated by forward differences, so each gradient costs
//! `n` extra objective evaluations. All of them are counted in `nfev`.

use ndarray::{Array1, Array2};
use tracing::{debug, info, warn};

use crate::error::{OptionsError, check_limit, check_tolerance};
use crate::objective::Counted;
use crate::{OptimizationResult, Optimizer, Status};

/// Armijo sufficient-decrease constant.
const ARMIJO: f64 = 1e-4;
const MAX_BACKTRACKS: usize = 40;

/// BFGS minimizer.
#[derive(Debug, Clone, PartialEq)]
pub struct Bfgs {
    gtol: f64,
    max_iterations: Option<usize>,
    max_evaluations: Option<usize>,
    epsilon: f64,
}

impl Default for Bfgs {
    fn default() -> Self {
        Self::new()
    }
}

impl Bfgs {
    /// Create a minimizer with `gtol = 1e-5` and a `200 * n` iteration cap.
    pub fn new() -> Self {
        Self {
            gtol: 1e-5,
            max_iterations: None,
            max_evaluations: None,
            epsilon: f64::EPSILON.sqrt(),
        }
    }

    /// Set the gradient infinity-norm tolerance.
    pub fn with_tol(mut self, gtol: f64) -> Self {
        self.gtol = gtol;
        self
    }

    /// Set maximum iterations.
    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.max_iterations = Some(maxiter);
        self
    }

    /// Set the objective evaluation budget.
    pub fn with_maxfev(mut self, maxfev: usize) -> Self {
        self.max_evaluations = Some(maxfev);
        self
    }

    /// Set the relative finite-difference step.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Check that the options are usable.
    ///
    /// # Errors
    ///
    /// Returns an error if a tolerance is negative or non-finite, the
    /// finite-difference step is zero, or a cap is zero.
    pub fn validate(&self) -> Result<(), OptionsError> {
        check_tolerance("gtol", self.gtol)?;
        check_tolerance("epsilon", self.epsilon)?;
        if self.epsilon == 0.0 {
            return Err(OptionsError::Tolerance("epsilon"));
        }
        check_limit("max_iterations", self.max_iterations)?;
        check_limit("max_evaluations", self.max_evaluations)
    }

    /// Forward-difference gradient at `x`, where `fx = f(x)`.
    ///
    /// Returns `None` if the evaluation budget runs out before every
    /// coordinate has been probed.
    fn gradient<F, E>(
        &self,
        f: &mut Counted<F>,
        x: &Array1<f64>,
        fx: f64,
    ) -> Result<Option<Array1<f64>>, E>
    where
        F: FnMut(&[f64]) -> Result<f64, E>,
    {
        let mut probe = x.to_vec();
        let mut grad = Array1::zeros(x.len());
        for i in 0..x.len() {
            if f.exhausted() {
                return Ok(None);
            }
            let h = self.epsilon * x[i].abs().max(1.0);
            probe[i] = x[i] + h;
            grad[i] = (f.call(&probe)? - fx) / h;
            probe[i] = x[i];
        }
        Ok(Some(grad))
    }
}

impl Optimizer for Bfgs {
    fn name(&self) -> &'static str {
        "bfgs"
    }

    fn minimize<F, E>(&self, objective: F, initial_params: Vec<f64>) -> Result<OptimizationResult, E>
    where
        F: FnMut(&[f64]) -> Result<f64, E>,
    {
        let n = initial_params.len();
        let max_iterations = self.max_iterations.unwrap_or(200 * n.max(1));
        let mut f = Counted::new(objective, self.max_evaluations);

        let mut x = Array1::from(initial_params);
        let mut fx = f.call(x.as_slice().unwrap_or(&[]))?;
        let mut history = Vec::new();
        let mut nit = 0;
        let Some(mut grad) = self.gradient(&mut f, &x, fx)? else {
            return Ok(finish(x, fx, f.nfev(), nit, Status::MaxEvaluations, history));
        };
        let identity = Array2::<f64>::eye(n);
        let mut inv_hessian = identity.clone();

        let status = loop {
            let gnorm = grad.iter().fold(0.0_f64, |m, g| m.max(g.abs()));
            if gnorm <= self.gtol {
                break Status::Converged;
            }
            if nit >= max_iterations {
                break Status::MaxIterations;
            }
            if f.exhausted() {
                break Status::MaxEvaluations;
            }

            let mut direction = -inv_hessian.dot(&grad);
            let mut slope = grad.dot(&direction);
            if slope >= 0.0 {
                // Lost positive definiteness; restart from steepest descent
                inv_hessian = identity.clone();
                direction = -&grad;
                slope = grad.dot(&direction);
            }

            // Backtracking line search
            let mut alpha = 1.0;
            let mut accepted = None;
            for _ in 0..MAX_BACKTRACKS {
                if f.exhausted() {
                    break;
                }
                let candidate = &x + &(&direction * alpha);
                let f_candidate = f.call(candidate.as_slice().unwrap_or(&[]))?;
                if f_candidate <= fx + ARMIJO * alpha * slope {
                    accepted = Some((candidate, f_candidate));
                    break;
                }
                alpha *= 0.5;
            }
            let Some((x_next, f_next)) = accepted else {
                if f.exhausted() {
                    break Status::MaxEvaluations;
                }
                warn!(iteration = nit, gnorm, "line search failed");
                break Status::LineSearchFailed;
            };

            let Some(grad_next) = self.gradient(&mut f, &x_next, f_next)? else {
                // keep the accepted step even though its gradient is unknown
                x = x_next;
                fx = f_next;
                nit += 1;
                history.push(fx);
                break Status::MaxEvaluations;
            };
            let s = &x_next - &x;
            let y = &grad_next - &grad;
            let sy = s.dot(&y);
            if sy > 1e-12 {
                let rho = 1.0 / sy;
                let hy = inv_hessian.dot(&y);
                let yhy = y.dot(&hy);
                let ss_weight = rho * rho * yhy + rho;
                inv_hessian = Array2::from_shape_fn((n, n), |(i, j)| {
                    inv_hessian[[i, j]] - rho * (s[i] * hy[j] + hy[i] * s[j])
                        + ss_weight * s[i] * s[j]
                });
            }

            x = x_next;
            fx = f_next;
            grad = grad_next;
            nit += 1;
            history.push(fx);
            debug!(iteration = nit, nfev = f.nfev(), fun = fx, alpha, gnorm, "bfgs step");
        };

        Ok(finish(x, fx, f.nfev(), nit, status, history))
    }
}

fn finish(
    x: Array1<f64>,
    fun: f64,
    nfev: usize,
    nit: usize,
    status: Status,
    history: Vec<f64>,
) -> OptimizationResult {
    info!(optimizer = "bfgs", nit, nfev, fun, %status, "minimization finished");
    OptimizationResult::new(x.to_vec(), fun, nfev, nit, status, history)
}
