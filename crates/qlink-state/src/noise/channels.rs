//! Kraus-operator noise channels.

use std::fmt;

use ndarray::{Array2, array};
use num_complex::Complex64;

use crate::error::{NoiseError, NoiseResult};
use crate::linalg::{self, MATRIX_TOLERANCE};
use crate::operator::gate_matrix;
use qlink_ir::StandardGate;

/// Widest depolarizing channel this crate builds (4^n Pauli terms).
const MAX_DEPOLARIZING_QUBITS: usize = 3;

/// A completely-positive trace-preserving channel ρ ↦ Σ K ρ K†.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantumError {
    name: String,
    kraus: Vec<Array2<Complex64>>,
    num_qubits: usize,
}

impl QuantumError {
    /// Build a channel from Kraus operators, checking Σ K†K = I.
    pub fn from_kraus(name: impl Into<String>, kraus: Vec<Array2<Complex64>>) -> NoiseResult<Self> {
        let first = kraus.first().ok_or(NoiseError::EmptyChannel)?;
        let (rows, cols) = first.dim();
        if rows != cols || rows == 0 || !rows.is_power_of_two() {
            return Err(NoiseError::InvalidDimensions);
        }
        if kraus.iter().any(|k| k.dim() != (rows, cols)) {
            return Err(NoiseError::OperatorSizeMismatch);
        }
        if !linalg::is_complete(&kraus, rows, MATRIX_TOLERANCE) {
            return Err(NoiseError::NotTracePreserving);
        }
        Ok(Self {
            name: name.into(),
            kraus,
            num_qubits: rows.trailing_zeros() as usize,
        })
    }

    /// Depolarizing channel ρ ↦ (1-λ)ρ + λ·I/2^n on `num_qubits` qubits.
    ///
    /// `lambda` may range over [0, 4^n/(4^n-1)]; the upper end is the uniform
    /// Pauli channel.
    pub fn depolarizing(lambda: f64, num_qubits: usize) -> NoiseResult<Self> {
        if num_qubits == 0 || num_qubits > MAX_DEPOLARIZING_QUBITS {
            return Err(NoiseError::UnsupportedQubitCount(num_qubits));
        }
        let num_terms = 1usize << (2 * num_qubits);
        let max = num_terms as f64 / (num_terms as f64 - 1.0);
        if !(0.0..=max).contains(&lambda) {
            return Err(NoiseError::InvalidProbability { value: lambda, max });
        }

        let p_pauli = lambda / num_terms as f64;
        let p_identity = 1.0 - lambda * (num_terms as f64 - 1.0) / num_terms as f64;

        let mut kraus = Vec::with_capacity(num_terms);
        for index in 0..num_terms {
            let weight = if index == 0 { p_identity } else { p_pauli };
            if weight <= 0.0 {
                continue;
            }
            let scale = Complex64::new(weight.sqrt(), 0.0);
            kraus.push(pauli_string(index, num_qubits).mapv(|c| c * scale));
        }
        Self::from_kraus("depolarizing", kraus)
    }

    /// Single-qubit thermal relaxation over a gate of duration `time`.
    ///
    /// Combines amplitude damping towards |0⟩ with rate 1/T1 and dephasing
    /// so that coherences decay as exp(-time/T2). Requires T1, T2 > 0 and
    /// T2 ≤ 2·T1; all three times share one unit.
    pub fn thermal_relaxation(t1: f64, t2: f64, time: f64) -> NoiseResult<Self> {
        // NaN fails both comparisons
        if !(t1 > 0.0 && t2 > 0.0) {
            return Err(NoiseError::InvalidRelaxationTime { t1, t2 });
        }
        if t2 > 2.0 * t1 {
            return Err(NoiseError::T2ExceedsLimit { t1, t2 });
        }
        if !(time.is_finite() && time >= 0.0) {
            return Err(NoiseError::InvalidGateTime(time));
        }

        let p_reset = 1.0 - (-time / t1).exp();
        let coherence = (-time / t2).exp();
        let survival = 1.0 - p_reset;
        // coherence² ≤ survival holds whenever T2 ≤ 2·T1
        let dephase = (survival - coherence * coherence).max(0.0);

        let zero = Complex64::new(0.0, 0.0);
        let one = Complex64::new(1.0, 0.0);
        let mut kraus = vec![array![
            [one, zero],
            [zero, Complex64::new(coherence, 0.0)]
        ]];
        if p_reset > 0.0 {
            kraus.push(array![
                [zero, Complex64::new(p_reset.sqrt(), 0.0)],
                [zero, zero]
            ]);
        }
        if dephase > 0.0 {
            kraus.push(array![
                [zero, zero],
                [zero, Complex64::new(dephase.sqrt(), 0.0)]
            ]);
        }
        Self::from_kraus("thermal_relaxation", kraus)
    }

    /// `self ⊗ other`: `other` acts on the first operand (low bit), `self`
    /// on the following ones.
    #[must_use]
    pub fn tensor(&self, other: &QuantumError) -> Self {
        let kraus = self
            .kraus
            .iter()
            .flat_map(|a| other.kraus.iter().map(move |b| linalg::kron(a, b)))
            .collect();
        Self {
            name: format!("{}⊗{}", self.name, other.name),
            kraus,
            num_qubits: self.num_qubits + other.num_qubits,
        }
    }

    /// `self` followed by `other` on the same qubits.
    pub fn compose(&self, other: &QuantumError) -> NoiseResult<Self> {
        if self.num_qubits != other.num_qubits {
            return Err(NoiseError::OperatorSizeMismatch);
        }
        let kraus = other
            .kraus
            .iter()
            .flat_map(|b| self.kraus.iter().map(move |a| b.dot(a)))
            .collect();
        Ok(Self {
            name: format!("{}∘{}", other.name, self.name),
            kraus,
            num_qubits: self.num_qubits,
        })
    }

    /// Channel name, e.g. `"depolarizing"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of qubits the channel acts on.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// The Kraus operators.
    pub fn kraus_operators(&self) -> &[Array2<Complex64>] {
        &self.kraus
    }

    /// Whether Σ K†K = I still holds (within tolerance).
    pub fn is_trace_preserving(&self) -> bool {
        linalg::is_complete(&self.kraus, 1 << self.num_qubits, MATRIX_TOLERANCE)
    }
}

impl fmt::Display for QuantumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({} qubit{}, {} Kraus)",
            self.name,
            self.num_qubits,
            if self.num_qubits == 1 { "" } else { "s" },
            self.kraus.len()
        )
    }
}

/// Pauli string for a base-4 index; digit `q` selects I/X/Y/Z on qubit `q`.
fn pauli_string(index: usize, num_qubits: usize) -> Array2<Complex64> {
    let mut result = Array2::<Complex64>::eye(1);
    for q in 0..num_qubits {
        let gate = match (index >> (2 * q)) & 3 {
            0 => StandardGate::I,
            1 => StandardGate::X,
            2 => StandardGate::Y,
            _ => StandardGate::Z,
        };
        // higher qubits go to the left
        result = linalg::kron(&gate_matrix(&gate), &result);
    }
    result
}
