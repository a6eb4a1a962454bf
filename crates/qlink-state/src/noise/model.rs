//! Gate-keyed registry of noise channels.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use qlink_ir::{QubitId, arity_of};
use tracing::{debug, warn};

use super::QuantumError;
use crate::error::{NoiseError, NoiseResult};

/// Which [`QuantumError`] follows which instruction.
///
/// Errors are registered either for every occurrence of a gate name
/// (all-qubit) or for a gate name on one ordered qubit tuple (local). A
/// local error replaces the all-qubit error for its tuple.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoiseModel {
    all_qubit: BTreeMap<String, QuantumError>,
    local: BTreeMap<String, BTreeMap<Vec<QubitId>, QuantumError>>,
}

impl NoiseModel {
    /// Create an ideal (noise-free) model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `error` to every occurrence of each instruction name.
    ///
    /// Registering a second error for the same name composes it after the
    /// first.
    pub fn add_all_qubit_quantum_error(
        &mut self,
        error: &QuantumError,
        instructions: &[&str],
    ) -> NoiseResult<()> {
        for name in instructions {
            check_arity(name, error)?;
        }
        let mut staged = Vec::with_capacity(instructions.len());
        for name in instructions {
            let merged = match self.all_qubit.get(*name) {
                Some(existing) => {
                    warn!(instruction = name, "all-qubit error already registered, composing");
                    existing.compose(error)?
                }
                None => error.clone(),
            };
            staged.push((*name, merged));
        }
        for (name, merged) in staged {
            debug!(instruction = name, error = %merged, "registered all-qubit error");
            self.all_qubit.insert(name.to_string(), merged);
        }
        Ok(())
    }

    /// Attach `error` to each instruction name on exactly `qubits`.
    pub fn add_quantum_error(
        &mut self,
        error: &QuantumError,
        instructions: &[&str],
        qubits: &[QubitId],
    ) -> NoiseResult<()> {
        if qubits.len() != error.num_qubits() {
            return Err(NoiseError::QubitCountMismatch {
                expected: error.num_qubits(),
                got: qubits.len(),
            });
        }
        for (i, q) in qubits.iter().enumerate() {
            if qubits[..i].contains(q) {
                return Err(NoiseError::DuplicateQubit(*q));
            }
        }
        for name in instructions {
            check_arity(name, error)?;
        }

        let mut staged = Vec::with_capacity(instructions.len());
        for name in instructions {
            let existing = self
                .local
                .get(*name)
                .and_then(|per_gate| per_gate.get(qubits));
            let merged = match existing {
                Some(existing) => {
                    warn!(instruction = name, ?qubits, "local error already registered, composing");
                    existing.compose(error)?
                }
                None => error.clone(),
            };
            staged.push((*name, merged));
        }
        for (name, merged) in staged {
            debug!(instruction = name, ?qubits, error = %merged, "registered local error");
            self.local
                .entry(name.to_string())
                .or_default()
                .insert(qubits.to_vec(), merged);
        }
        Ok(())
    }

    /// The error applied after `name` acting on `qubits`, if any.
    pub fn error_for(&self, name: &str, qubits: &[QubitId]) -> Option<&QuantumError> {
        self.local
            .get(name)
            .and_then(|per_gate| per_gate.get(qubits))
            .or_else(|| self.all_qubit.get(name))
    }

    /// Instruction names that carry noise.
    pub fn noise_instructions(&self) -> BTreeSet<&str> {
        self.all_qubit
            .keys()
            .chain(self.local.keys())
            .map(String::as_str)
            .collect()
    }

    /// Qubits named by local errors.
    pub fn noise_qubits(&self) -> BTreeSet<QubitId> {
        self.local
            .values()
            .flat_map(|per_gate| per_gate.keys())
            .flatten()
            .copied()
            .collect()
    }

    /// True when no error is registered.
    pub fn is_ideal(&self) -> bool {
        self.all_qubit.is_empty() && self.local.is_empty()
    }
}

impl fmt::Display for NoiseModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ideal() {
            return write!(f, "NoiseModel: ideal");
        }
        writeln!(f, "NoiseModel:")?;
        let names: Vec<_> = self.noise_instructions().into_iter().collect();
        write!(f, "  instructions with noise: {}", names.join(", "))?;
        let qubits = self.noise_qubits();
        if !qubits.is_empty() {
            let qubits: Vec<_> = qubits.iter().map(ToString::to_string).collect();
            write!(f, "\n  qubits with noise: {}", qubits.join(", "))?;
        }
        Ok(())
    }
}

fn check_arity(name: &str, error: &QuantumError) -> NoiseResult<()> {
    match arity_of(name) {
        Some(expected) if expected as usize != error.num_qubits() => {
            Err(NoiseError::ArityMismatch {
                instruction: name.to_string(),
                expected: expected as usize,
                got: error.num_qubits(),
            })
        }
        _ => Ok(()),
    }
}
