//! Pure-state extraction from density matrices.

use ndarray::Array2;
use num_complex::Complex64;
use qlink_state::{DensityMatrix, QuantumState, Statevector};
use tracing::{debug, warn};

/// Default absolute tolerance on the largest eigenvalue.
pub const PURITY_TOLERANCE: f64 = 1e-6;

/// Amplitudes below this magnitude are skipped when fixing the global phase.
const PHASE_REFERENCE_THRESHOLD: f64 = 1e-9;

/// Return the statevector of `dm` if it is pure, or `dm` itself otherwise.
///
/// Equivalent to [`dm_to_sv_if_pure_with_tolerance`] with
/// [`PURITY_TOLERANCE`].
pub fn dm_to_sv_if_pure(dm: DensityMatrix) -> QuantumState {
    dm_to_sv_if_pure_with_tolerance(dm, PURITY_TOLERANCE)
}

/// Return the statevector of `dm` if its largest eigenvalue lies within
/// `tolerance` of 1, or `dm` unchanged otherwise.
///
/// Eigenvalues within `tolerance` of the maximum count as tied; among them
/// the eigenvector whose dominant amplitude sits on the lowest basis index
/// wins, so the choice does not depend on the eigensolver's ordering. The
/// returned vector is phase-fixed so its first non-negligible amplitude is
/// real and positive.
pub fn dm_to_sv_if_pure_with_tolerance(dm: DensityMatrix, tolerance: f64) -> QuantumState {
    let (values, vectors) = dm.eigh();
    let max_value = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if (max_value - 1.0).abs() > tolerance {
        debug!(max_eigenvalue = max_value, "density matrix is mixed");
        return QuantumState::Mixed(dm);
    }

    let ties = values
        .iter()
        .filter(|&&v| max_value - v <= tolerance)
        .count();
    if ties > 1 {
        warn!(ties, max_eigenvalue = max_value, "degenerate maximal eigenvalue");
    }

    let best = dominant_eigenvector(&values, &vectors, tolerance);
    let mut amplitudes: Vec<Complex64> = vectors.column(best).to_vec();
    if let Some(reference) = amplitudes
        .iter()
        .find(|a| a.norm() > PHASE_REFERENCE_THRESHOLD)
        .copied()
    {
        let phase = reference.conj() / reference.norm();
        for a in &mut amplitudes {
            *a *= phase;
        }
    }

    match Statevector::from_unnormalized(amplitudes) {
        Ok(sv) => {
            debug!(num_qubits = sv.num_qubits(), "density matrix is pure");
            QuantumState::Pure(sv)
        }
        Err(err) => {
            warn!(%err, "eigenvector could not be normalized, keeping density matrix");
            QuantumState::Mixed(dm)
        }
    }
}

/// Column of the eigenvector chosen among eigenvalues within `tolerance` of
/// the maximum: lowest dominant basis index first, then larger eigenvalue.
fn dominant_eigenvector(values: &[f64], vectors: &Array2<Complex64>, tolerance: f64) -> usize {
    let max_value = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let dominant_index = |col: usize| {
        let column = vectors.column(col);
        let peak = column.iter().map(|a| a.norm()).fold(0.0, f64::max);
        column
            .iter()
            .position(|a| a.norm() >= peak - PHASE_REFERENCE_THRESHOLD)
            .unwrap_or(0)
    };

    (0..values.len())
        .filter(|&i| max_value - values[i] <= tolerance)
        .min_by(|&a, &b| {
            dominant_index(a)
                .cmp(&dominant_index(b))
                .then(values[b].total_cmp(&values[a]))
        })
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qlink_ir::{Circuit, QubitId};

    fn bell() -> Statevector {
        let mut circuit = Circuit::with_size("bell", 2);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        Statevector::new(2).evolve_circuit(&circuit).unwrap()
    }

    #[test]
    fn test_pure_density_matrix_recovers_statevector() {
        let original = bell();
        let state = dm_to_sv_if_pure(DensityMatrix::from_statevector(&original));
        let sv = state.as_statevector().unwrap();
        assert!(sv.equiv(&original, 1e-9));
    }

    #[test]
    fn test_phase_is_fixed() {
        let mut circuit = Circuit::with_size("phase", 1);
        circuit.h(QubitId(0)).unwrap();
        circuit.s(QubitId(0)).unwrap();
        let original = Statevector::new(1).evolve_circuit(&circuit).unwrap();

        let state = dm_to_sv_if_pure(DensityMatrix::from_statevector(&original));
        let sv = state.as_statevector().unwrap();
        let first = sv.amplitudes()[0];
        assert!(first.im.abs() < 1e-12);
        assert!(first.re > 0.0);
        assert!(sv.equiv(&original, 1e-9));
    }

    #[test]
    fn test_mixed_density_matrix_returned_unchanged() {
        let mixed = DensityMatrix::maximally_mixed(1);
        let state = dm_to_sv_if_pure(mixed.clone());
        assert_eq!(state, QuantumState::Mixed(mixed));
    }

    #[test]
    fn test_custom_tolerance() {
        let mut data = DensityMatrix::from_statevector(&Statevector::new(1)).data().clone();
        data[[0, 0]] = Complex64::new(0.999, 0.0);
        data[[1, 1]] = Complex64::new(0.001, 0.0);
        let nearly_pure = DensityMatrix::from_matrix(data).unwrap();

        assert!(!dm_to_sv_if_pure(nearly_pure.clone()).is_pure());
        assert!(dm_to_sv_if_pure_with_tolerance(nearly_pure, 1e-2).is_pure());
    }

    #[test]
    fn test_tied_eigenvectors_ignore_solver_order() {
        let one = Complex64::new(1.0, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        let values = [0.5, 0.5];
        let swapped = Array2::from_shape_vec((2, 2), vec![zero, one, one, zero]).unwrap();
        let identity = Array2::from_shape_vec((2, 2), vec![one, zero, zero, one]).unwrap();

        assert_eq!(dominant_eigenvector(&values, &swapped, 0.6), 1);
        assert_eq!(dominant_eigenvector(&values, &identity, 0.6), 0);
        // outside the tie window the larger eigenvalue wins regardless of basis
        assert_eq!(dominant_eigenvector(&[0.2, 0.8], &identity, 1e-6), 1);
    }

    #[test]
    fn test_degenerate_maximum_picks_lowest_basis_state() {
        let state = dm_to_sv_if_pure_with_tolerance(DensityMatrix::maximally_mixed(1), 0.6);
        let sv = state.as_statevector().unwrap();
        assert!(sv.equiv(&Statevector::new(1), 1e-9));
    }
}
