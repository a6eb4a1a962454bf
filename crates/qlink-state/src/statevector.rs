//! Statevector simulation engine.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use ndarray::Array1;
use num_complex::Complex64;
use qlink_ir::{Circuit, Instruction, StandardGate};
use tracing::trace;

use crate::error::{StateError, StateResult};
use crate::linalg::{self, NORM_TOLERANCE};

/// A pure state of `n` qubits: 2^n complex amplitudes with unit norm.
///
/// Basis index bit `q` is the value of qubit `q` (qubit 0 least significant).
#[derive(Debug, Clone, PartialEq)]
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let size = 1 << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Build a statevector from amplitudes that must already be normalized.
    pub fn from_amplitudes(amplitudes: Vec<Complex64>) -> StateResult<Self> {
        let num_qubits = linalg::qubits_for_dim(amplitudes.len())?;
        let norm_sqr: f64 = amplitudes.iter().map(|a| a.norm_sqr()).sum();
        if (norm_sqr - 1.0).abs() > NORM_TOLERANCE {
            return Err(StateError::NotNormalized(norm_sqr));
        }
        Ok(Self {
            amplitudes,
            num_qubits,
        })
    }

    /// Build a statevector by normalizing arbitrary amplitudes.
    pub fn from_unnormalized(mut amplitudes: Vec<Complex64>) -> StateResult<Self> {
        let num_qubits = linalg::qubits_for_dim(amplitudes.len())?;
        let norm = amplitudes.iter().map(|a| a.norm_sqr()).sum::<f64>().sqrt();
        if norm == 0.0 {
            return Err(StateError::ZeroNorm);
        }
        for amp in &mut amplitudes {
            *amp /= norm;
        }
        Ok(Self {
            amplitudes,
            num_qubits,
        })
    }

    /// Computational basis state |index⟩ over `num_qubits` qubits.
    pub fn basis_state(num_qubits: usize, index: usize) -> StateResult<Self> {
        let dim = linalg::dim_for_qubits(num_qubits)?;
        if index >= dim {
            return Err(StateError::InvalidDimension(index));
        }
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); dim];
        amplitudes[index] = Complex64::new(1.0, 0.0);
        Ok(Self {
            amplitudes,
            num_qubits,
        })
    }

    /// Basis state from a label such as `"01"`. The rightmost character is qubit 0.
    pub fn from_label(label: &str) -> StateResult<Self> {
        linalg::dim_for_qubits(label.len())?;
        let mut index = 0usize;
        for (q, ch) in label.chars().rev().enumerate() {
            match ch {
                '0' => {}
                '1' => index |= 1 << q,
                _ => return Err(StateError::InvalidDimension(label.len())),
            }
        }
        Self::basis_state(label.len(), index)
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Length of the amplitude vector.
    pub fn dim(&self) -> usize {
        self.amplitudes.len()
    }

    /// The amplitudes, indexed by basis state.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Consume the state and return its amplitudes.
    pub fn into_amplitudes(self) -> Vec<Complex64> {
        self.amplitudes
    }

    /// Amplitudes as an `ndarray` column, for matrix products.
    pub fn to_array(&self) -> Array1<Complex64> {
        Array1::from(self.amplitudes.clone())
    }

    /// Measurement probabilities of every basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr()).collect()
    }

    /// Non-negligible probabilities keyed by basis label (qubit 0 rightmost).
    pub fn probabilities_dict(&self) -> BTreeMap<String, f64> {
        self.probabilities()
            .into_iter()
            .enumerate()
            .filter(|(_, p)| *p > NORM_TOLERANCE)
            .map(|(i, p)| (self.basis_label(i), p))
            .collect()
    }

    /// Basis label of `index`, most significant qubit first.
    pub fn basis_label(&self, index: usize) -> String {
        format!("{:0width$b}", index, width = self.num_qubits)
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
            .amplitudes
            .iter()
            .enumerate()
            .filter(|(i, _)| ((i >> qubit) & 1 == 1) == bit)
            .map(|(_, a)| a.norm_sqr())
            .sum())
    }

    /// Inner product ⟨self|other⟩.
    pub fn inner(&self, other: &Statevector) -> StateResult<Complex64> {
        if self.num_qubits != other.num_qubits {
            return Err(StateError::DimensionMismatch {
                expected: self.num_qubits,
                got: other.num_qubits,
            });
        }
        Ok(self
            .amplitudes
            .iter()
            .zip(&other.amplitudes)
            .map(|(a, b)| a.conj() * b)
            .sum())
    }

    /// Whether two states are equal up to a global phase.
    pub fn equiv(&self, other: &Statevector, tol: f64) -> bool {
        self.inner(other)
            .map(|overlap| (overlap.norm() - 1.0).abs() < tol)
            .unwrap_or(false)
    }

    /// Run a circuit on a copy of this state.
    pub fn evolve_circuit(&self, circuit: &Circuit) -> StateResult<Self> {
        if circuit.num_qubits() != self.num_qubits {
            return Err(StateError::DimensionMismatch {
                expected: self.num_qubits,
                got: circuit.num_qubits(),
            });
        }
        let mut state = self.clone();
        for instruction in circuit.instructions() {
            state.apply(instruction);
        }
        Ok(state)
    }

    /// Apply an instruction in place. Operands are assumed validated by the circuit.
    pub(crate) fn apply(&mut self, instruction: &Instruction) {
        trace!(%instruction, "statevector apply");
        let qubits = instruction.qubit_indices();
        match instruction.gate {
            StandardGate::I => {}
            StandardGate::X => self.apply_x(qubits[0]),
            StandardGate::Y => self.apply_y(qubits[0]),
            StandardGate::Z => self.apply_z(qubits[0]),
            StandardGate::H => self.apply_h(qubits[0]),
            StandardGate::S => self.apply_phase(qubits[0], PI / 2.0),
            StandardGate::Sdg => self.apply_phase(qubits[0], -PI / 2.0),
            StandardGate::T => self.apply_phase(qubits[0], PI / 4.0),
            StandardGate::Tdg => self.apply_phase(qubits[0], -PI / 4.0),
            StandardGate::Rx(theta) => self.apply_rx(qubits[0], theta),
            StandardGate::Ry(theta) => self.apply_ry(qubits[0], theta),
            StandardGate::Rz(theta) => self.apply_rz(qubits[0], theta),
            StandardGate::CX => self.apply_cx(qubits[0], qubits[1]),
            StandardGate::CZ => self.apply_cz(qubits[0], qubits[1]),
            StandardGate::Swap => self.apply_swap(qubits[0], qubits[1]),
        }
    }

    /// Replace amplitudes with `full · amplitudes` for a full-register matrix.
    pub(crate) fn apply_full_matrix(&self, full: &ndarray::Array2<Complex64>) -> Self {
        let result = full.dot(&self.to_array());
        Self {
            amplitudes: result.to_vec(),
            num_qubits: self.num_qubits,
        }
    }

    // =========================================================================
    // Single-qubit gate implementations
    // =========================================================================

    fn apply_x(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                self.amplitudes.swap(i, i | mask);
            }
        }
    }

    fn apply_y(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        let i_val = Complex64::new(0.0, 1.0);
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let tmp = self.amplitudes[i];
                self.amplitudes[i] = -i_val * self.amplitudes[j];
                self.amplitudes[j] = i_val * tmp;
            }
        }
    }

    fn apply_z(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask != 0 {
                *amp = -*amp;
            }
        }
    }

    fn apply_h(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = sqrt2_inv * (a + b);
                self.amplitudes[j] = sqrt2_inv * (a - b);
            }
        }
    }

    fn apply_phase(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let phase = Complex64::from_polar(1.0, theta);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask != 0 {
                *amp *= phase;
            }
        }
    }

    fn apply_rx(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let c = (theta / 2.0).cos();
        let neg_i_s = Complex64::new(0.0, -(theta / 2.0).sin());
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a + neg_i_s * b;
                self.amplitudes[j] = neg_i_s * a + c * b;
            }
        }
    }

    fn apply_ry(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a - s * b;
                self.amplitudes[j] = s * a + c * b;
            }
        }
    }

    fn apply_rz(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let phase_0 = Complex64::from_polar(1.0, -theta / 2.0);
        let phase_1 = Complex64::from_polar(1.0, theta / 2.0);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask == 0 {
                *amp *= phase_0;
            } else {
                *amp *= phase_1;
            }
        }
    }

    // =========================================================================
    // Two-qubit gate implementations
    // =========================================================================

    fn apply_cx(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        for i in 0..self.amplitudes.len() {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                self.amplitudes.swap(i, i | tgt_mask);
            }
        }
    }

    fn apply_cz(&mut self, control: usize, target: usize) {
        let both = (1 << control) | (1 << target);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & both == both {
                *amp = -*amp;
            }
        }
    }

    fn apply_swap(&mut self, q1: usize, q2: usize) {
        let mask1 = 1 << q1;
        let mask2 = 1 << q2;
        for i in 0..self.amplitudes.len() {
            if (i & mask1 != 0) && (i & mask2 == 0) {
                let j = (i & !mask1) | mask2;
                self.amplitudes.swap(i, j);
            }
        }
    }
}
