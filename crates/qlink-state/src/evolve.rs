//! Evolution of quantum states by operators.

use crate::density::DensityMatrix;
use crate::error::{StateError, StateResult};
use crate::linalg;
use crate::operator::Operator;
use crate::statevector::Statevector;

/// A state that can be evolved by a unitary [`Operator`].
///
/// Implemented by [`Statevector`], [`DensityMatrix`] and
/// [`QuantumState`](crate::QuantumState), so callers can apply the same
/// operator regardless of whether the state is pure or mixed.
pub trait Evolve: Sized {
    /// Number of qubits in the state.
    fn num_qubits(&self) -> usize;

    /// Evolve by `operator` acting on `qargs`; local bit `i` of the operator
    /// is qubit `qargs[i]`.
    fn evolve_on(&self, operator: &Operator, qargs: &[usize]) -> StateResult<Self>;

    /// Evolve by an operator spanning the whole register.
    fn evolve(&self, operator: &Operator) -> StateResult<Self> {
        if operator.num_qubits() != self.num_qubits() {
            return Err(StateError::DimensionMismatch {
                expected: self.num_qubits(),
                got: operator.num_qubits(),
            });
        }
        let qargs: Vec<usize> = (0..self.num_qubits()).collect();
        self.evolve_on(operator, &qargs)
    }
}

impl Evolve for Statevector {
    fn num_qubits(&self) -> usize {
        Statevector::num_qubits(self)
    }

    fn evolve_on(&self, operator: &Operator, qargs: &[usize]) -> StateResult<Self> {
        let n = Statevector::num_qubits(self);
        linalg::check_qargs(n, operator.num_qubits(), qargs)?;
        let full = linalg::expand_operator(n, operator.data(), qargs);
        Ok(self.apply_full_matrix(&full))
    }
}

impl Evolve for DensityMatrix {
    fn num_qubits(&self) -> usize {
        DensityMatrix::num_qubits(self)
    }

    fn evolve_on(&self, operator: &Operator, qargs: &[usize]) -> StateResult<Self> {
        let n = DensityMatrix::num_qubits(self);
        linalg::check_qargs(n, operator.num_qubits(), qargs)?;
        let full = linalg::expand_operator(n, operator.data(), qargs);
        Ok(self.conjugate_by(&full))
    }
}
