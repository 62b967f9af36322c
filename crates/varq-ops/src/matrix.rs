//! Dense matrix representation and the matrix exponential.
//!
//! Dense matrices are only used for small registers: to check fixtures, to
//! test Hermiticity, and to build exact propagators `exp(-i t H)` when the
//! terms of `H` do not commute.

use ndarray::{Array2, s};
use num_complex::Complex64;

use crate::error::OpsResult;
use crate::pauli::PauliHamiltonian;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);

impl PauliHamiltonian {
    /// Dense `2ⁿ × 2ⁿ` matrix of this Hamiltonian.
    ///
    /// Entry `[j, i]` is `⟨j|H|i⟩`.
    pub fn to_matrix(&self, num_qubits: usize) -> OpsResult<Array2<Complex64>> {
        self.validate(num_qubits)?;
        let dim = crate::dimension(num_qubits)?;
        let mut matrix = Array2::<Complex64>::zeros((dim, dim));

        for term in &self.terms {
            let weight = Complex64::new(term.coefficient, 0.0);
            for i in 0..dim {
                let (j, phase) = term.apply_to_basis(i);
                matrix[[j, i]] += weight * phase;
            }
        }

        Ok(matrix)
    }
}

/// Whether `m` equals its conjugate transpose within `tol`.
pub fn is_hermitian(m: &Array2<Complex64>, tol: f64) -> bool {
    if m.nrows() != m.ncols() {
        return false;
    }
    let n = m.nrows();
    (0..n).all(|i| (i..n).all(|j| (m[[i, j]] - m[[j, i]].conj()).norm() <= tol))
}

/// Exact propagator `exp(-i t H)` as a dense matrix.
pub fn propagator(h: &PauliHamiltonian, num_qubits: usize, t: f64) -> OpsResult<Array2<Complex64>> {
    let generator = h.to_matrix(num_qubits)? * Complex64::new(0.0, -t);
    Ok(matrix_exp(&generator))
}

/// Compute `exp(A)` by scaling and squaring with a Padé(13) approximant.
///
/// Follows Higham (2005), "The Scaling and Squaring Method for the Matrix
/// Exponential Revisited". The registers handled here are small, so no
/// lower-order approximants are tried.
///
/// # Panics
/// Panics if `a` is not square.
pub fn matrix_exp(a: &Array2<Complex64>) -> Array2<Complex64> {
    let n = a.nrows();
    assert_eq!(n, a.ncols(), "matrix_exp requires a square matrix");

    if n == 0 {
        return Array2::zeros((0, 0));
    }
    if n == 1 {
        return Array2::from_elem((1, 1), a[[0, 0]].exp());
    }

    // θ₁₃ from Higham Table 10.2
    const THETA_13: f64 = 5.37;
    let norm = one_norm(a);
    let squarings = if norm > THETA_13 {
        (norm / THETA_13).log2().ceil() as i32
    } else {
        0
    };

    let scaled = a * Complex64::new(0.5f64.powi(squarings), 0.0);
    let mut result = pade13(&scaled);
    for _ in 0..squarings {
        result = result.dot(&result);
    }
    result
}

/// Padé(13,13) coefficients b₀..b₁₃.
const PADE_13: [f64; 14] = [
    64_764_752_532_480_000.0,
    32_382_376_266_240_000.0,
    7_771_770_303_897_600.0,
    1_187_353_796_428_800.0,
    129_060_195_264_000.0,
    10_559_470_521_600.0,
    670_442_572_800.0,
    33_522_128_640.0,
    1_323_241_920.0,
    40_840_800.0,
    960_960.0,
    16_380.0,
    182.0,
    1.0,
];

fn pade13(a: &Array2<Complex64>) -> Array2<Complex64> {
    let n = a.nrows();
    let eye = Array2::from_diag_elem(n, ONE);
    let b = |k: usize| Complex64::new(PADE_13[k], 0.0);

    let a2 = a.dot(a);
    let a4 = a2.dot(&a2);
    let a6 = a2.dot(&a4);

    let u_inner = &a6 * b(13) + &a4 * b(11) + &a2 * b(9);
    let u_outer = u_inner.dot(&a6) + &a6 * b(7) + &a4 * b(5) + &a2 * b(3) + &eye * b(1);
    let u = a.dot(&u_outer);

    let v_inner = &a6 * b(12) + &a4 * b(10) + &a2 * b(8);
    let v = v_inner.dot(&a6) + &a6 * b(6) + &a4 * b(4) + &a2 * b(2) + &eye * b(0);

    // (V - U)⁻¹ (V + U)
    solve(&v - &u, &v + &u)
}

fn one_norm(a: &Array2<Complex64>) -> f64 {
    a.columns()
        .into_iter()
        .map(|col| col.iter().map(|z| z.norm()).sum::<f64>())
        .fold(0.0, f64::max)
}

/// Solve `A X = B` by Gaussian elimination with partial pivoting.
///
/// The Padé denominator is well conditioned after scaling, so a singular
/// pivot cannot occur for finite input.
fn solve(a: Array2<Complex64>, b: Array2<Complex64>) -> Array2<Complex64> {
    let n = a.nrows();
    let m = b.ncols();

    let mut aug = Array2::<Complex64>::zeros((n, n + m));
    aug.slice_mut(s![.., ..n]).assign(&a);
    aug.slice_mut(s![.., n..]).assign(&b);

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&r1, &r2| aug[[r1, col]].norm().total_cmp(&aug[[r2, col]].norm()))
            .unwrap_or(col);
        if pivot_row != col {
            for j in 0..n + m {
                aug.swap([col, j], [pivot_row, j]);
            }
        }

        let pivot = aug[[col, col]];
        for row in col + 1..n {
            let factor = aug[[row, col]] / pivot;
            if factor == ZERO {
                continue;
            }
            for j in col..n + m {
                let value = aug[[col, j]];
                aug[[row, j]] -= factor * value;
            }
        }
    }

    let mut x = Array2::<Complex64>::zeros((n, m));
    for row in (0..n).rev() {
        let pivot = aug[[row, row]];
        for j in 0..m {
            let mut sum = aug[[row, n + j]];
            for k in row + 1..n {
                sum -= aug[[row, k]] * x[[k, j]];
            }
            x[[row, j]] = sum / pivot;
        }
    }
    x
}
