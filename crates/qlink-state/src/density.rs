//! Density-matrix states and noisy evolution.

use ndarray::Array2;
use num_complex::Complex64;
use qlink_ir::Circuit;
use tracing::trace;

use crate::error::{StateError, StateResult};
use crate::linalg::{self, MATRIX_TOLERANCE};
use crate::noise::{NoiseModel, QuantumError};
use crate::operator::gate_matrix;
use crate::statevector::Statevector;

/// A (possibly mixed) state of `n` qubits.
///
/// Invariants: square 2^n × 2^n, Hermitian and unit trace, all checked on
/// construction from a raw matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityMatrix {
    data: Array2<Complex64>,
    num_qubits: usize,
}

impl DensityMatrix {
    /// |0...0⟩⟨0...0|.
    pub fn new(num_qubits: usize) -> Self {
        let dim = 1 << num_qubits;
        let mut data = Array2::<Complex64>::zeros((dim, dim));
        data[[0, 0]] = Complex64::new(1.0, 0.0);
        Self { data, num_qubits }
    }

    /// The maximally mixed state I / 2^n.
    pub fn maximally_mixed(num_qubits: usize) -> Self {
        let dim = 1usize << num_qubits;
        let data = Array2::<Complex64>::eye(dim).mapv(|c| c / dim as f64);
        Self { data, num_qubits }
    }

    /// Validate and wrap a raw matrix.
    pub fn from_matrix(data: Array2<Complex64>) -> StateResult<Self> {
        let (rows, cols) = data.dim();
        if rows != cols {
            return Err(StateError::NotSquare { rows, cols });
        }
        let num_qubits = linalg::qubits_for_dim(rows)?;

        let tr = linalg::trace(&data);
        if (tr - Complex64::new(1.0, 0.0)).norm() > MATRIX_TOLERANCE {
            return Err(StateError::InvalidTrace(tr));
        }
        if !linalg::is_hermitian(&data, MATRIX_TOLERANCE) {
            return Err(StateError::NotHermitian);
        }
        Ok(Self { data, num_qubits })
    }

    /// |ψ⟩⟨ψ| for a pure state.
    pub fn from_statevector(sv: &Statevector) -> Self {
        let amps = sv.amplitudes();
        let dim = amps.len();
        let data = Array2::from_shape_fn((dim, dim), |(r, c)| amps[r] * amps[c].conj());
        Self {
            data,
            num_qubits: sv.num_qubits(),
        }
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Matrix dimension.
    pub fn dim(&self) -> usize {
        self.data.nrows()
    }

    /// The matrix.
    pub fn data(&self) -> &Array2<Complex64> {
        &self.data
    }

    /// Trace of the matrix.
    pub fn trace(&self) -> Complex64 {
        linalg::trace(&self.data)
    }

    /// Purity tr(ρ²): 1 for pure states, 1/2^n for the maximally mixed state.
    pub fn purity(&self) -> f64 {
        // tr(ρ²) = Σ |ρ_ij|² for Hermitian ρ
        self.data.iter().map(|c| c.norm_sqr()).sum()
    }

    /// Diagonal of the matrix: basis-state probabilities.
    pub fn probabilities(&self) -> Vec<f64> {
        self.data.diag().iter().map(|c| c.re.max(0.0)).collect()
    }

    /// Probability that measuring `qubit` yields `bit`.
    pub fn probability_of_bit(&self, qubit: usize, bit: bool) -> StateResult<f64> {
        if qubit >= self.num_qubits {
            return Err(StateError::QubitOutOfRange {
                qubit,
                num_qubits: self.num_qubits,
            });
        }
        Ok(self
            .probabilities()
            .into_iter()
            .enumerate()
            .filter(|(i, _)| ((i >> qubit) & 1 == 1) == bit)
            .map(|(_, p)| p)
            .sum())
    }

    /// Eigenvalues and column eigenvectors of the (Hermitian) matrix.
    pub fn eigh(&self) -> (Vec<f64>, Array2<Complex64>) {
        linalg::eigh(&self.data)
    }

    /// Whether two density matrices agree element-wise within `tol`.
    pub fn equiv(&self, other: &DensityMatrix, tol: f64) -> bool {
        self.data.dim() == other.data.dim()
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| (a - b).norm() < tol)
    }

    /// Reduced state after tracing out `traced` qubits.
    ///
    /// Remaining qubits keep their relative order and are renumbered from 0.
    pub fn partial_trace(&self, traced: &[usize]) -> StateResult<Self> {
        for (i, &q) in traced.iter().enumerate() {
            if q >= self.num_qubits {
                return Err(StateError::QubitOutOfRange {
                    qubit: q,
                    num_qubits: self.num_qubits,
                });
            }
            if traced[..i].contains(&q) {
                return Err(StateError::DuplicateQubit(q));
            }
        }

        let kept: Vec<usize> = (0..self.num_qubits)
            .filter(|q| !traced.contains(q))
            .collect();
        let traced_mask = traced.iter().fold(0usize, |m, &q| m | (1 << q));
        let out_dim = 1usize << kept.len();
        let mut out = Array2::<Complex64>::zeros((out_dim, out_dim));

        let dim = self.dim();
        for r in 0..dim {
            let rr = linalg::extract_bits(r, &kept);
            for c in 0..dim {
                if (r ^ c) & traced_mask != 0 {
                    continue;
                }
                let cc = linalg::extract_bits(c, &kept);
                out[[rr, cc]] += self.data[[r, c]];
            }
        }

        Ok(Self {
            data: out,
            num_qubits: kept.len(),
        })
    }

    /// Run a circuit without noise.
    pub fn evolve_circuit(&self, circuit: &Circuit) -> StateResult<Self> {
        self.evolve_with_noise(circuit, &NoiseModel::new())
    }

    /// Run a circuit, applying after every instruction the error the noise
    /// model registers for that gate and operand tuple.
    pub fn evolve_with_noise(&self, circuit: &Circuit, noise: &NoiseModel) -> StateResult<Self> {
        if circuit.num_qubits() != self.num_qubits {
            return Err(StateError::DimensionMismatch {
                expected: self.num_qubits,
                got: circuit.num_qubits(),
            });
        }

        let mut state = self.clone();
        for instruction in circuit.instructions() {
            let qargs = instruction.qubit_indices();
            state = state.apply_unitary_on(&gate_matrix(&instruction.gate), &qargs);
            if let Some(error) = noise.error_for(instruction.name(), &instruction.qubits) {
                trace!(%instruction, error = %error, "applying noise");
                state = state.apply_error(error, &qargs)?;
            }
        }
        Ok(state)
    }

    /// Apply a noise channel to `qargs`.
    pub fn apply_error(&self, error: &QuantumError, qargs: &[usize]) -> StateResult<Self> {
        linalg::check_qargs(self.num_qubits, error.num_qubits(), qargs)?;
        let dim = self.dim();
        let mut out = Array2::<Complex64>::zeros((dim, dim));
        for kraus in error.kraus_operators() {
            let k = linalg::expand_operator(self.num_qubits, kraus, qargs);
            out = out + k.dot(&self.data).dot(&linalg::dagger(&k));
        }
        Ok(Self {
            data: out,
            num_qubits: self.num_qubits,
        })
    }

    /// U ρ U† for a local matrix on validated operands.
    pub(crate) fn apply_unitary_on(&self, local: &Array2<Complex64>, qargs: &[usize]) -> Self {
        let u = linalg::expand_operator(self.num_qubits, local, qargs);
        self.conjugate_by(&u)
    }

    /// U ρ U† for a full-register matrix.
    pub(crate) fn conjugate_by(&self, full: &Array2<Complex64>) -> Self {
        Self {
            data: full.dot(&self.data).dot(&linalg::dagger(full)),
            num_qubits: self.num_qubits,
        }
    }
}

impl From<&Statevector> for DensityMatrix {
    fn from(sv: &Statevector) -> Self {
        DensityMatrix::from_statevector(sv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qlink_ir::QubitId;

    fn bell_circuit() -> Circuit {
        let mut circuit = Circuit::with_size("bell", 2);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit
    }

    #[test]
    fn test_bell_density_matches_statevector() {
        let circuit = bell_circuit();
        let rho = DensityMatrix::new(2).evolve_circuit(&circuit).unwrap();
        let sv = Statevector::new(2).evolve_circuit(&circuit).unwrap();
        assert!(rho.equiv(&DensityMatrix::from_statevector(&sv), 1e-10));
        assert!((rho.purity() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_from_matrix_validation() {
        let bad_trace = Array2::<Complex64>::eye(2);
        assert!(matches!(
            DensityMatrix::from_matrix(bad_trace),
            Err(StateError::InvalidTrace(_))
        ));

        let mut not_hermitian = Array2::<Complex64>::eye(2).mapv(|c| c * 0.5);
        not_hermitian[[0, 1]] = Complex64::new(0.0, 0.3);
        not_hermitian[[1, 0]] = Complex64::new(0.0, 0.3);
        assert_eq!(
            DensityMatrix::from_matrix(not_hermitian),
            Err(StateError::NotHermitian)
        );
    }

    #[test]
    fn test_partial_trace_of_bell_is_maximally_mixed() {
        let rho = DensityMatrix::new(2).evolve_circuit(&bell_circuit()).unwrap();
        let reduced = rho.partial_trace(&[1]).unwrap();
        assert_eq!(reduced.num_qubits(), 1);
        assert!(reduced.equiv(&DensityMatrix::maximally_mixed(1), 1e-10));
    }

    #[test]
    fn test_partial_trace_keeps_product_factor() {
        // |1⟩ on qubit 0, |0⟩ on qubit 1, |1⟩ on qubit 2 → "101"
        let sv = Statevector::from_label("101").unwrap();
        let rho = DensityMatrix::from_statevector(&sv);
        let reduced = rho.partial_trace(&[0, 1]).unwrap();
        let expected = DensityMatrix::from_statevector(&Statevector::from_label("1").unwrap());
        assert!(reduced.equiv(&expected, 1e-12));

        assert_eq!(
            rho.partial_trace(&[3]),
            Err(StateError::QubitOutOfRange {
                qubit: 3,
                num_qubits: 3
            })
        );
    }

    #[test]
    fn test_probabilities() {
        let rho = DensityMatrix::maximally_mixed(2);
        assert_eq!(rho.probabilities(), vec![0.25; 4]);
        assert!((rho.probability_of_bit(1, false).unwrap() - 0.5).abs() < 1e-12);
        assert!((rho.purity() - 0.25).abs() < 1e-12);
    }
}
