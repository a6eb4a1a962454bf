//! Pure-or-mixed state wrapper and state fidelity.

use std::fmt;

use num_complex::Complex64;

use crate::density::DensityMatrix;
use crate::error::{StateError, StateResult};
use crate::evolve::Evolve;
use crate::linalg;
use crate::operator::Operator;
use crate::statevector::Statevector;

/// Either a pure statevector or a density matrix.
#[derive(Debug, Clone, PartialEq)]
pub enum QuantumState {
    /// A pure state.
    Pure(Statevector),
    /// A possibly mixed state.
    Mixed(DensityMatrix),
}

impl QuantumState {
    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        match self {
            QuantumState::Pure(sv) => sv.num_qubits(),
            QuantumState::Mixed(dm) => dm.num_qubits(),
        }
    }

    /// True for the `Pure` variant.
    pub fn is_pure(&self) -> bool {
        matches!(self, QuantumState::Pure(_))
    }

    /// Borrow the statevector, if pure.
    pub fn as_statevector(&self) -> Option<&Statevector> {
        match self {
            QuantumState::Pure(sv) => Some(sv),
            QuantumState::Mixed(_) => None,
        }
    }

    /// Borrow the density matrix, if mixed.
    pub fn as_density_matrix(&self) -> Option<&DensityMatrix> {
        match self {
            QuantumState::Pure(_) => None,
            QuantumState::Mixed(dm) => Some(dm),
        }
    }

    /// Density-matrix form of either variant.
    pub fn to_density_matrix(&self) -> DensityMatrix {
        match self {
            QuantumState::Pure(sv) => DensityMatrix::from_statevector(sv),
            QuantumState::Mixed(dm) => dm.clone(),
        }
    }

    /// Measurement probabilities over the computational basis.
    pub fn probabilities(&self) -> Vec<f64> {
        match self {
            QuantumState::Pure(sv) => sv.probabilities(),
            QuantumState::Mixed(dm) => dm.probabilities(),
        }
    }
}

impl Evolve for QuantumState {
    fn num_qubits(&self) -> usize {
        QuantumState::num_qubits(self)
    }

    fn evolve_on(&self, operator: &Operator, qargs: &[usize]) -> StateResult<Self> {
        Ok(match self {
            QuantumState::Pure(sv) => QuantumState::Pure(sv.evolve_on(operator, qargs)?),
            QuantumState::Mixed(dm) => QuantumState::Mixed(dm.evolve_on(operator, qargs)?),
        })
    }
}

impl From<Statevector> for QuantumState {
    fn from(sv: Statevector) -> Self {
        QuantumState::Pure(sv)
    }
}

impl From<DensityMatrix> for QuantumState {
    fn from(dm: DensityMatrix) -> Self {
        QuantumState::Mixed(dm)
    }
}

impl fmt::Display for QuantumState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuantumState::Pure(sv) => write!(f, "Statevector({} qubits)", sv.num_qubits()),
            QuantumState::Mixed(dm) => write!(
                f,
                "DensityMatrix({} qubits, purity {:.4})",
                dm.num_qubits(),
                dm.purity()
            ),
        }
    }
}

/// Fidelity between two states.
///
/// Uses |⟨ψ|φ⟩|² for two pure states, ⟨ψ|ρ|ψ⟩ when one is pure, and
/// (tr √(√ρ σ √ρ))² for two mixed states.
pub fn state_fidelity(a: &QuantumState, b: &QuantumState) -> StateResult<f64> {
    if a.num_qubits() != b.num_qubits() {
        return Err(StateError::DimensionMismatch {
            expected: a.num_qubits(),
            got: b.num_qubits(),
        });
    }
    let fidelity = match (a, b) {
        (QuantumState::Pure(x), QuantumState::Pure(y)) => x.inner(y)?.norm_sqr(),
        (QuantumState::Pure(sv), QuantumState::Mixed(dm))
        | (QuantumState::Mixed(dm), QuantumState::Pure(sv)) => expectation(sv, dm),
        (QuantumState::Mixed(rho), QuantumState::Mixed(sigma)) => {
            let root = linalg::sqrt_psd(rho.data());
            let inner = root.dot(sigma.data()).dot(&root);
            let (values, _) = linalg::eigh(&inner);
            let trace: f64 = values.iter().map(|v| v.max(0.0).sqrt()).sum();
            trace * trace
        }
    };
    Ok(fidelity.clamp(0.0, 1.0))
}

/// ⟨ψ|ρ|ψ⟩, real part.
fn expectation(sv: &Statevector, dm: &DensityMatrix) -> f64 {
    let psi = sv.amplitudes();
    let rho = dm.data();
    let mut total = Complex64::new(0.0, 0.0);
    for (i, a) in psi.iter().enumerate() {
        for (j, b) in psi.iter().enumerate() {
            total += a.conj() * rho[[i, j]] * b;
        }
    }
    total.re
}
