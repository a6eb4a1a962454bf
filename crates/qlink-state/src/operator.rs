//! Unitary operators built from gates and circuits.

use std::f64::consts::FRAC_1_SQRT_2;

use ndarray::{Array2, array};
use num_complex::Complex64;
use qlink_ir::{Circuit, StandardGate};

use crate::error::{StateError, StateResult};
use crate::linalg::{self, MATRIX_TOLERANCE};

/// A dense 2^n × 2^n operator.
///
/// Matrices follow the little-endian convention: bit `i` of a row or column
/// index is qubit `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    data: Array2<Complex64>,
    num_qubits: usize,
}

impl Operator {
    /// Identity on `num_qubits` qubits.
    pub fn identity(num_qubits: usize) -> Self {
        Self {
            data: Array2::eye(1 << num_qubits),
            num_qubits,
        }
    }

    /// Wrap a square power-of-two matrix.
    pub fn from_matrix(data: Array2<Complex64>) -> StateResult<Self> {
        let (rows, cols) = data.dim();
        if rows != cols {
            return Err(StateError::NotSquare { rows, cols });
        }
        let num_qubits = linalg::qubits_for_dim(rows)?;
        Ok(Self { data, num_qubits })
    }

    /// The local matrix of a standard gate.
    pub fn from_gate(gate: &StandardGate) -> Self {
        let data = gate_matrix(gate);
        let num_qubits = gate.num_qubits() as usize;
        Self { data, num_qubits }
    }

    /// The unitary implemented by a circuit.
    ///
    /// Gate matrices are expanded onto the register and multiplied in
    /// instruction order, so the first instruction acts first.
    pub fn from_circuit(circuit: &Circuit) -> Self {
        let num_qubits = circuit.num_qubits();
        let mut data = Array2::<Complex64>::eye(1 << num_qubits);
        for instruction in circuit.instructions() {
            let local = gate_matrix(&instruction.gate);
            let full = linalg::expand_operator(num_qubits, &local, &instruction.qubit_indices());
            data = full.dot(&data);
        }
        Self { data, num_qubits }
    }

    /// Number of qubits acted on.
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

    /// Conjugate transpose.
    #[must_use]
    pub fn adjoint(&self) -> Self {
        Self {
            data: linalg::dagger(&self.data),
            num_qubits: self.num_qubits,
        }
    }

    /// `self` followed by `other`, i.e. the matrix `other · self`.
    pub fn compose(&self, other: &Operator) -> StateResult<Self> {
        if self.num_qubits != other.num_qubits {
            return Err(StateError::DimensionMismatch {
                expected: self.num_qubits,
                got: other.num_qubits,
            });
        }
        Ok(Self {
            data: other.data.dot(&self.data),
            num_qubits: self.num_qubits,
        })
    }

    /// Whether the matrix is unitary.
    pub fn is_unitary(&self) -> bool {
        linalg::is_unitary(&self.data, MATRIX_TOLERANCE)
    }

    /// Whether two operators are equal up to a global phase.
    pub fn equiv(&self, other: &Operator, tol: f64) -> bool {
        if self.data.dim() != other.data.dim() {
            return false;
        }
        // Phase from the largest entry of self.
        let Some((idx, pivot)) = self
            .data
            .indexed_iter()
            .max_by(|a, b| a.1.norm().total_cmp(&b.1.norm()))
        else {
            return true;
        };
        let theirs = other.data[idx];
        if pivot.norm() < tol || theirs.norm() < tol {
            return false;
        }
        let phase = theirs / pivot;
        if (phase.norm() - 1.0).abs() > tol {
            return false;
        }
        self.data
            .iter()
            .zip(other.data.iter())
            .all(|(a, b)| (a * phase - b).norm() < tol)
    }
}

/// Little-endian matrix of a standard gate.
///
/// For two-qubit gates local bit 0 is the first operand, so CX's control is
/// bit 0 and its target bit 1.
pub fn gate_matrix(gate: &StandardGate) -> Array2<Complex64> {
    let zero = Complex64::new(0.0, 0.0);
    let one = Complex64::new(1.0, 0.0);
    let i = Complex64::new(0.0, 1.0);
    let h = Complex64::new(FRAC_1_SQRT_2, 0.0);

    match *gate {
        StandardGate::I => Array2::eye(2),
        StandardGate::X => array![[zero, one], [one, zero]],
        StandardGate::Y => array![[zero, -i], [i, zero]],
        StandardGate::Z => array![[one, zero], [zero, -one]],
        StandardGate::H => array![[h, h], [h, -h]],
        StandardGate::S => array![[one, zero], [zero, i]],
        StandardGate::Sdg => array![[one, zero], [zero, -i]],
        StandardGate::T => array![
            [one, zero],
            [zero, Complex64::from_polar(1.0, std::f64::consts::FRAC_PI_4)]
        ],
        StandardGate::Tdg => array![
            [one, zero],
            [zero, Complex64::from_polar(1.0, -std::f64::consts::FRAC_PI_4)]
        ],
        StandardGate::Rx(theta) => {
            let c = Complex64::new((theta / 2.0).cos(), 0.0);
            let s = Complex64::new(0.0, -(theta / 2.0).sin());
            array![[c, s], [s, c]]
        }
        StandardGate::Ry(theta) => {
            let c = Complex64::new((theta / 2.0).cos(), 0.0);
            let s = Complex64::new((theta / 2.0).sin(), 0.0);
            array![[c, -s], [s, c]]
        }
        StandardGate::Rz(theta) => array![
            [Complex64::from_polar(1.0, -theta / 2.0), zero],
            [zero, Complex64::from_polar(1.0, theta / 2.0)]
        ],
        StandardGate::CX => array![
            [one, zero, zero, zero],
            [zero, zero, zero, one],
            [zero, zero, one, zero],
            [zero, one, zero, zero]
        ],
        StandardGate::CZ => array![
            [one, zero, zero, zero],
            [zero, one, zero, zero],
            [zero, zero, one, zero],
            [zero, zero, zero, -one]
        ],
        StandardGate::Swap => array![
            [one, zero, zero, zero],
            [zero, zero, one, zero],
            [zero, one, zero, zero],
            [zero, zero, zero, one]
        ],
    }
}
