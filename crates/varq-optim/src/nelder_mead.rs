//! Nelder-Mead downhill simplex.
//!
//! Derivative-free: each iteration costs one to two objective evaluations
//! (plus `n` on a shrink), which makes it a reasonable default when the
//! objective is noisy, e.g. estimated from measurement shots.

use tracing::{debug, info};

use crate::error::{OptionsError, check_limit, check_tolerance};
use crate::objective::Counted;
use crate::{OptimizationResult, Optimizer, Status};

const REFLECT: f64 = 1.0;
const EXPAND: f64 = 2.0;
const CONTRACT: f64 = 0.5;
const SHRINK: f64 = 0.5;

const NONZERO_STEP: f64 = 0.05;
const ZERO_STEP: f64 = 0.00025;

/// Nelder-Mead simplex minimizer.
#[derive(Debug, Clone, PartialEq)]
pub struct NelderMead {
    xatol: f64,
    fatol: f64,
    max_iterations: Option<usize>,
    max_evaluations: Option<usize>,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self::new()
    }
}

impl NelderMead {
    /// Create a minimizer with `xatol = fatol = 1e-4` and `200 * n` caps.
    pub fn new() -> Self {
        Self {
            xatol: 1e-4,
            fatol: 1e-4,
            max_iterations: None,
            max_evaluations: None,
        }
    }

    /// Set the coordinate spread tolerance.
    pub fn with_xatol(mut self, xatol: f64) -> Self {
        self.xatol = xatol;
        self
    }

    /// Set the function value spread tolerance.
    pub fn with_fatol(mut self, fatol: f64) -> Self {
        self.fatol = fatol;
        self
    }

    /// Set both tolerances at once.
    pub fn with_tol(self, tol: f64) -> Self {
        self.with_xatol(tol).with_fatol(tol)
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

    /// Check that the options are usable.
    ///
    /// # Errors
    ///
    /// Returns an error if a tolerance is negative or non-finite, or a cap
    /// is zero.
    pub fn validate(&self) -> Result<(), OptionsError> {
        check_tolerance("xatol", self.xatol)?;
        check_tolerance("fatol", self.fatol)?;
        check_limit("max_iterations", self.max_iterations)?;
        check_limit("max_evaluations", self.max_evaluations)
    }

    fn converged(&self, simplex: &[Vec<f64>], values: &[f64]) -> bool {
        let best = &simplex[0];
        let x_spread = simplex[1..]
            .iter()
            .flat_map(|v| v.iter().zip(best).map(|(a, b)| (a - b).abs()))
            .fold(0.0, f64::max);
        let f_spread = values[1..]
            .iter()
            .map(|f| (f - values[0]).abs())
            .fold(0.0, f64::max);
        x_spread <= self.xatol && f_spread <= self.fatol
    }
}

impl Optimizer for NelderMead {
    fn name(&self) -> &'static str {
        "nelder-mead"
    }

    fn minimize<F, E>(&self, objective: F, initial_params: Vec<f64>) -> Result<OptimizationResult, E>
    where
        F: FnMut(&[f64]) -> Result<f64, E>,
    {
        let n = initial_params.len();
        let max_iterations = self.max_iterations.unwrap_or(200 * n.max(1));
        let max_evaluations = self.max_evaluations.unwrap_or(200 * n.max(1));
        let mut f = Counted::new(objective, Some(max_evaluations));

        // Vertices along each axis, 5% away from the start
        let mut simplex = Vec::with_capacity(n + 1);
        simplex.push(initial_params.clone());
        for k in 0..n {
            let mut vertex = initial_params.clone();
            vertex[k] = if vertex[k] != 0.0 {
                (1.0 + NONZERO_STEP) * vertex[k]
            } else {
                ZERO_STEP
            };
            simplex.push(vertex);
        }
        let mut values = Vec::with_capacity(n + 1);
        for vertex in &simplex {
            values.push(f.call(vertex)?);
        }
        sort_simplex(&mut simplex, &mut values);

        let mut history = Vec::new();
        let mut nit = 0;
        let status = loop {
            if n == 0 || self.converged(&simplex, &values) {
                break Status::Converged;
            }
            if nit >= max_iterations {
                break Status::MaxIterations;
            }
            if f.exhausted() {
                break Status::MaxEvaluations;
            }

            let worst = simplex[n].clone();
            let mut centroid = vec![0.0; n];
            for vertex in &simplex[..n] {
                for (c, v) in centroid.iter_mut().zip(vertex) {
                    *c += v / n as f64;
                }
            }
            let toward = |coeff: f64| -> Vec<f64> {
                centroid
                    .iter()
                    .zip(&worst)
                    .map(|(c, w)| (1.0 + coeff) * c - coeff * w)
                    .collect()
            };

            let reflected = toward(REFLECT);
            let f_reflected = f.call(&reflected)?;

            let mut shrink = false;
            if f_reflected < values[0] {
                let expanded = toward(REFLECT * EXPAND);
                let f_expanded = f.call(&expanded)?;
                if f_expanded < f_reflected {
                    simplex[n] = expanded;
                    values[n] = f_expanded;
                } else {
                    simplex[n] = reflected;
                    values[n] = f_reflected;
                }
            } else if f_reflected < values[n - 1] {
                simplex[n] = reflected;
                values[n] = f_reflected;
            } else if f_reflected < values[n] {
                let outside = toward(CONTRACT * REFLECT);
                let f_outside = f.call(&outside)?;
                if f_outside <= f_reflected {
                    simplex[n] = outside;
                    values[n] = f_outside;
                } else {
                    shrink = true;
                }
            } else {
                let inside = toward(-CONTRACT);
                let f_inside = f.call(&inside)?;
                if f_inside < values[n] {
                    simplex[n] = inside;
                    values[n] = f_inside;
                } else {
                    shrink = true;
                }
            }

            if shrink {
                let best = simplex[0].clone();
                for j in 1..=n {
                    for (x, b) in simplex[j].iter_mut().zip(&best) {
                        *x = b + SHRINK * (*x - b);
                    }
                    values[j] = f.call(&simplex[j])?;
                }
            }

            sort_simplex(&mut simplex, &mut values);
            nit += 1;
            history.push(values[0]);
            debug!(iteration = nit, nfev = f.nfev(), best = values[0], shrink, "nelder-mead step");
        };

        info!(
            optimizer = "nelder-mead",
            nit,
            nfev = f.nfev(),
            fun = values[0],
            %status,
            "minimization finished"
        );

        let nfev = f.nfev();
        let fun = values[0];
        let x = simplex.swap_remove(0);
        Ok(OptimizationResult::new(x, fun, nfev, nit, status, history))
    }
}

/// Sort vertices by objective value, best first.
fn sort_simplex(simplex: &mut Vec<Vec<f64>>, values: &mut Vec<f64>) {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    *simplex = order.iter().map(|&i| simplex[i].clone()).collect();
    *values = order.iter().map(|&i| values[i]).collect();
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;
    use std::convert::Infallible;

    fn sphere(x: &[f64]) -> Result<f64, Infallible> {
        Ok(x.iter().map(|v| (v - 1.0).powi(2)).sum())
    }

    fn rosenbrock(x: &[f64]) -> Result<f64, Infallible> {
        Ok(100.0 * (x[1] - x[0] * x[0]).powi(2) + (1.0 - x[0]).powi(2))
    }

    #[test]
    fn test_minimizes_sphere() {
        let result = NelderMead::new().minimize(sphere, vec![0.0, 0.0, 0.0]).unwrap();

        assert!(result.converged);
        assert_eq!(result.status, Status::Converged);
        for v in &result.x {
            assert_abs_diff_eq!(*v, 1.0, epsilon = 1e-2);
        }
        assert!(result.fun < 1e-4);
        assert_eq!(result.history.len(), result.nit);
    }

    #[test]
    fn test_minimizes_rosenbrock() {
        let result = NelderMead::new()
            .with_tol(1e-8)
            .with_maxiter(2000)
            .with_maxfev(4000)
            .minimize(rosenbrock, vec![-1.2, 1.0])
            .unwrap();

        assert!(result.converged);
        assert_abs_diff_eq!(result.x[0], 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(result.x[1], 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_history_never_increases() {
        let result = NelderMead::new().minimize(rosenbrock, vec![-1.2, 1.0]).unwrap();
        assert!(result.history.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn test_iteration_cap_is_not_an_error() {
        let result = NelderMead::new()
            .with_maxiter(5)
            .minimize(rosenbrock, vec![-1.2, 1.0])
            .unwrap();

        assert!(!result.converged);
        assert_eq!(result.status, Status::MaxIterations);
        assert_eq!(result.nit, 5);
    }

    #[test]
    fn test_evaluation_budget() {
        let result = NelderMead::new()
            .with_maxfev(10)
            .minimize(rosenbrock, vec![-1.2, 1.0])
            .unwrap();

        assert_eq!(result.status, Status::MaxEvaluations);
        // a single iteration may overshoot by at most a shrink
        assert!(result.nfev >= 10 && result.nfev <= 10 + 2 + 2);
    }

    #[test]
    fn test_counts_every_evaluation() {
        let mut calls = 0;
        let result = NelderMead::new()
            .minimize(
                |x: &[f64]| {
                    calls += 1;
                    sphere(x)
                },
                vec![0.5, 0.5],
            )
            .unwrap();
        assert_eq!(result.nfev, calls);
    }

    #[test]
    fn test_objective_error_propagates() {
        let mut calls = 0;
        let result = NelderMead::new().minimize(
            |_x: &[f64]| {
                calls += 1;
                if calls > 4 { Err("backend unreachable") } else { Ok(1.0) }
            },
            vec![1.0, 2.0],
        );
        assert_eq!(result.unwrap_err(), "backend unreachable");
    }

    #[test]
    fn test_zero_start_uses_small_step() {
        // starting exactly at the optimum of a function flat in neither axis
        let result = NelderMead::new()
            .minimize(|x: &[f64]| Ok::<_, Infallible>(x[0] * x[0] + x[1] * x[1]), vec![0.0, 0.0])
            .unwrap();
        assert!(result.converged);
        assert_eq!(result.fun, 0.0);
    }

    #[test]
    fn test_validate() {
        assert!(NelderMead::new().validate().is_ok());
        assert_eq!(
            NelderMead::new().with_xatol(-1.0).validate(),
            Err(OptionsError::Tolerance("xatol"))
        );
        assert_eq!(
            NelderMead::new().with_fatol(f64::NAN).validate(),
            Err(OptionsError::Tolerance("fatol"))
        );
        assert_eq!(
            NelderMead::new().with_maxfev(0).validate(),
            Err(OptionsError::ZeroLimit("max_evaluations"))
        );
    }

    proptest! {
        #[test]
        fn prop_history_monotone_and_counted(x0 in -3.0..3.0f64, x1 in -3.0..3.0f64) {
            let mut calls = 0;
            let start = rosenbrock(&[x0, x1]).unwrap();
            let result = NelderMead::new()
                .minimize(
                    |x: &[f64]| {
                        calls += 1;
                        rosenbrock(x)
                    },
                    vec![x0, x1],
                )
                .unwrap();

            prop_assert_eq!(result.nfev, calls);
            prop_assert!(result.history.windows(2).all(|w| w[1] <= w[0]));
            prop_assert!(result.fun <= start);
        }

        #[test]
        fn prop_budget_overshoot_is_one_iteration(
            start in prop::collection::vec(-2.0..2.0f64, 1..5),
            cap in 1usize..60,
        ) {
            let n = start.len();
            let result = NelderMead::new().with_maxfev(cap).minimize(sphere, start).unwrap();
            // the initial simplex, or one reflection, contraction and shrink past the cap
            prop_assert!(result.nfev <= cap + n + 1, "nfev = {}", result.nfev);
        }
    }
}
