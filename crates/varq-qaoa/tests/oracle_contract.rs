//! Evaluator behavior against stub oracles.

use std::cell::Cell;
use std::rc::Rc;

use num_complex::Complex64;
use varq_qaoa::{
    Evaluator, ExpectationOracle, Observables, Optimizer, OracleError, PauliHamiltonian, QaoaError,
    StatePreparation, two_qubit_ising,
};
use varq_optim::{Bfgs, NelderMead};

/// Returns a fixed value, records how often it was asked and the depth of
/// the last preparation it saw.
struct Recording {
    value: Complex64,
    calls: Rc<Cell<usize>>,
    last_steps: Rc<Cell<usize>>,
    fail_after: Option<usize>,
}

impl Recording {
    fn new(value: Complex64) -> Self {
        Self {
            value,
            calls: Rc::new(Cell::new(0)),
            last_steps: Rc::new(Cell::new(0)),
            fail_after: None,
        }
    }
}

impl ExpectationOracle for Recording {
    fn name(&self) -> &str {
        "recording"
    }

    fn expectation(
        &mut self,
        preparation: &StatePreparation<'_>,
        _observable: &PauliHamiltonian,
    ) -> Result<Complex64, OracleError> {
        let calls = self.calls.get() + 1;
        self.calls.set(calls);
        self.last_steps.set(preparation.steps.len());
        if self.fail_after.is_some_and(|n| calls > n) {
            return Err(OracleError::Backend("queue closed".to_string()));
        }
        Ok(self.value)
    }
}

fn observables() -> Observables {
    Observables::with_transverse_mixer(2, two_qubit_ising(0.5)).unwrap()
}

#[test]
fn test_invalid_length_never_reaches_oracle() {
    let oracle = Recording::new(Complex64::new(-1.0, 0.0));
    let calls = Rc::clone(&oracle.calls);
    let mut evaluator = Evaluator::new(observables(), 2, Box::new(oracle));

    for params in [&[][..], &[0.1][..], &[0.1, 0.2, 0.3][..], &[0.0; 6][..]] {
        let err = evaluator.evaluate(params).unwrap_err();
        assert!(
            matches!(err, QaoaError::InvalidParameters { expected: 4, actual } if actual == params.len())
        );
    }
    assert_eq!(calls.get(), 0);
    assert_eq!(evaluator.evaluations(), 0);
}

#[test]
fn test_preparation_has_two_steps_per_layer() {
    let oracle = Recording::new(Complex64::new(-1.0, 0.0));
    let steps = Rc::clone(&oracle.last_steps);
    let mut evaluator = Evaluator::new(observables(), 3, Box::new(oracle));

    assert_eq!(evaluator.evaluate(&[0.1; 6]).unwrap(), -1.0);
    assert_eq!(steps.get(), 6);
}

#[test]
fn test_non_hermitian_value_is_an_error() {
    let oracle = Recording::new(Complex64::new(0.3, 1e-3));
    let mut evaluator = Evaluator::new(observables(), 1, Box::new(oracle));

    match evaluator.evaluate(&[0.1, 0.2]) {
        Err(QaoaError::NonHermitian { imaginary }) => assert_eq!(imaginary, 1e-3),
        other => panic!("expected NonHermitian, got {other:?}"),
    }
}

#[test]
fn test_imaginary_tolerance_scales_with_magnitude() {
    // 1e-7 is negligible next to a real part of 1e3 at the default tolerance
    let oracle = Recording::new(Complex64::new(1e3, 1e-7));
    let mut evaluator = Evaluator::new(observables(), 1, Box::new(oracle));
    assert_eq!(evaluator.evaluate(&[0.1, 0.2]).unwrap(), 1e3);

    let oracle = Recording::new(Complex64::new(1e3, 1e-7));
    let mut strict = Evaluator::new(observables(), 1, Box::new(oracle)).with_imag_tolerance(1e-12);
    assert!(matches!(
        strict.evaluate(&[0.1, 0.2]),
        Err(QaoaError::NonHermitian { .. })
    ));
}

#[test]
fn test_non_finite_value_is_an_error() {
    let values = [
        Complex64::new(-0.5, f64::NAN),
        Complex64::new(f64::NAN, 0.0),
        Complex64::new(f64::INFINITY, 1.0),
        Complex64::new(f64::NEG_INFINITY, 0.0),
    ];
    for value in values {
        let oracle = Recording::new(value);
        let calls = Rc::clone(&oracle.calls);
        let mut evaluator = Evaluator::new(observables(), 1, Box::new(oracle));

        match evaluator.evaluate(&[0.1, 0.2]) {
            Err(QaoaError::NonFinite { .. }) => {}
            other => panic!("{value}: expected NonFinite, got {other:?}"),
        }
        assert_eq!(calls.get(), 1);
        assert_eq!(evaluator.evaluations(), 1);
    }
}

#[test]
fn test_non_finite_value_aborts_optimization() {
    let oracle = Recording::new(Complex64::new(f64::NAN, 0.0));
    let mut evaluator = Evaluator::new(observables(), 1, Box::new(oracle));

    let result = NelderMead::new().minimize(|p: &[f64]| evaluator.evaluate(p), vec![0.1, 0.2]);
    assert!(matches!(result, Err(QaoaError::NonFinite { .. })));
}

#[test]
fn test_oracle_failure_aborts_optimization() {
    for strategy in ["nelder-mead", "bfgs"] {
        let mut oracle = Recording::new(Complex64::new(0.5, 0.0));
        oracle.fail_after = Some(2);
        let calls = Rc::clone(&oracle.calls);
        let mut evaluator = Evaluator::new(observables(), 1, Box::new(oracle));

        let objective = |p: &[f64]| evaluator.evaluate(p);
        let result = match strategy {
            "bfgs" => Bfgs::new().minimize(objective, vec![0.1, 0.2]),
            _ => NelderMead::new().minimize(objective, vec![0.1, 0.2]),
        };

        match result {
            Err(QaoaError::Oracle(OracleError::Backend(msg))) => assert_eq!(msg, "queue closed"),
            other => panic!("{strategy}: expected oracle error, got {other:?}"),
        }
        // third call: last simplex vertex, or the second gradient probe
        assert_eq!(calls.get(), 3);
    }
}

#[test]
fn test_constant_objective_converges_without_error() {
    let oracle = Recording::new(Complex64::new(0.25, 0.0));
    let mut evaluator = Evaluator::new(observables(), 1, Box::new(oracle));

    let result = NelderMead::new()
        .minimize(|p| evaluator.evaluate(p), vec![0.1, 0.2])
        .unwrap();
    assert!(result.converged);
    assert_eq!(result.fun, 0.25);
}
