//! Dense linear-algebra helpers shared by the state types.
//!
//! Matrices are `ndarray::Array2<Complex64>`. Hermitian eigendecomposition is
//! delegated to `nalgebra`.

use nalgebra::DMatrix;
use ndarray::Array2;
use num_complex::Complex64;

use crate::error::{StateError, StateResult};

/// Tolerance for unit-norm checks on statevectors.
pub const NORM_TOLERANCE: f64 = 1e-10;

/// Tolerance for trace, hermiticity and completeness checks on matrices.
pub const MATRIX_TOLERANCE: f64 = 1e-8;

/// Kronecker product `a ⊗ b`. `b` occupies the low-order index bits.
pub fn kron(a: &Array2<Complex64>, b: &Array2<Complex64>) -> Array2<Complex64> {
    let (m, n) = a.dim();
    let (p, q) = b.dim();
    Array2::from_shape_fn((m * p, n * q), |(r, c)| a[[r / p, c / q]] * b[[r % p, c % q]])
}

/// Conjugate transpose.
pub fn dagger(a: &Array2<Complex64>) -> Array2<Complex64> {
    a.t().mapv(|c| c.conj())
}

/// Sum of diagonal elements.
pub fn trace(a: &Array2<Complex64>) -> Complex64 {
    a.diag().sum()
}

/// Number of qubits for a dimension, if it is a power of two.
pub fn qubits_for_dim(dim: usize) -> StateResult<usize> {
    if dim == 0 || !dim.is_power_of_two() {
        return Err(StateError::InvalidDimension(dim));
    }
    Ok(dim.trailing_zeros() as usize)
}

/// Hilbert-space dimension 2^n, or `InvalidDimension(n)` when it does not fit
/// in a `usize`.
pub fn dim_for_qubits(num_qubits: usize) -> StateResult<usize> {
    u32::try_from(num_qubits)
        .ok()
        .and_then(|n| 1usize.checked_shl(n))
        .ok_or(StateError::InvalidDimension(num_qubits))
}

/// Check that `qargs` is a valid operand list of `width` distinct qubits
/// inside an `num_qubits`-qubit register.
pub fn check_qargs(num_qubits: usize, width: usize, qargs: &[usize]) -> StateResult<()> {
    if qargs.len() != width {
        return Err(StateError::DimensionMismatch {
            expected: width,
            got: qargs.len(),
        });
    }
    for (i, &q) in qargs.iter().enumerate() {
        if q >= num_qubits {
            return Err(StateError::QubitOutOfRange {
                qubit: q,
                num_qubits,
            });
        }
        if qargs[..i].contains(&q) {
            return Err(StateError::DuplicateQubit(q));
        }
    }
    Ok(())
}

/// Expand a local operator acting on `targets` to the full `num_qubits`
/// register. Bit `i` of the local index maps to qubit `targets[i]`.
pub fn expand_operator(
    num_qubits: usize,
    local: &Array2<Complex64>,
    targets: &[usize],
) -> Array2<Complex64> {
    let dim = 1usize << num_qubits;
    let mut full = Array2::<Complex64>::zeros((dim, dim));

    let target_mask = targets.iter().fold(0usize, |mask, &t| mask | (1 << t));
    let passive_mask = !target_mask;

    for col in 0..dim {
        let local_col = extract_bits(col, targets);
        for local_row in 0..local.nrows() {
            let val = local[[local_row, local_col]];
            if val.norm_sqr() < f64::EPSILON * f64::EPSILON {
                continue;
            }
            let row = (col & passive_mask) | deposit_bits(local_row, targets);
            full[[row, col]] = val;
        }
    }
    full
}

/// Gather the bits of `value` at positions `indices` into a compact integer.
pub fn extract_bits(value: usize, indices: &[usize]) -> usize {
    indices
        .iter()
        .enumerate()
        .fold(0, |acc, (i, &pos)| acc | (((value >> pos) & 1) << i))
}

/// Scatter the low bits of `compact` to positions `indices`.
fn deposit_bits(compact: usize, indices: &[usize]) -> usize {
    indices
        .iter()
        .enumerate()
        .fold(0, |acc, (i, &pos)| acc | (((compact >> i) & 1) << pos))
}

/// Eigendecomposition of a Hermitian matrix.
///
/// Returns eigenvalues and a matrix whose columns are the matching unit
/// eigenvectors. Order is whatever the solver produces; callers needing a
/// particular eigenpair must select it explicitly.
pub fn eigh(a: &Array2<Complex64>) -> (Vec<f64>, Array2<Complex64>) {
    let (rows, cols) = a.dim();
    let na = DMatrix::from_fn(rows, cols, |r, c| a[[r, c]]);
    let eigen = na.symmetric_eigen();

    let values = eigen.eigenvalues.iter().copied().collect();
    let vectors = Array2::from_shape_fn((rows, cols), |(r, c)| eigen.eigenvectors[(r, c)]);
    (values, vectors)
}

/// Square root of a positive semi-definite matrix via `V √D V†`.
///
/// Small negative eigenvalues from rounding are clamped to zero.
pub fn sqrt_psd(a: &Array2<Complex64>) -> Array2<Complex64> {
    let (values, vectors) = eigh(a);
    let dim = values.len();
    let mut scaled = vectors.clone();
    for (c, &val) in values.iter().enumerate() {
        let root = Complex64::new(val.max(0.0).sqrt(), 0.0);
        for r in 0..dim {
            scaled[[r, c]] *= root;
        }
    }
    scaled.dot(&dagger(&vectors))
}

/// Checks if a matrix is Hermitian.
pub fn is_hermitian(a: &Array2<Complex64>, tol: f64) -> bool {
    a.iter()
        .zip(a.t().iter())
        .all(|(x, y)| (x - y.conj()).norm() < tol)
}

/// Checks `U†U = I`.
pub fn is_unitary(a: &Array2<Complex64>, tol: f64) -> bool {
    let (rows, cols) = a.dim();
    if rows != cols {
        return false;
    }
    let product = dagger(a).dot(a);
    product
        .indexed_iter()
        .all(|((r, c), v)| (v - if r == c { 1.0 } else { 0.0 }).norm() < tol)
}

/// Checks the completeness relation `Σ K†K = I`.
pub fn is_complete(ops: &[Array2<Complex64>], dim: usize, tol: f64) -> bool {
    let sum = ops
        .iter()
        .fold(Array2::<Complex64>::zeros((dim, dim)), |acc, op| {
            acc + dagger(op).dot(op)
        });
    sum.indexed_iter()
        .all(|((r, c), v)| (v - if r == c { 1.0 } else { 0.0 }).norm() < tol)
}
