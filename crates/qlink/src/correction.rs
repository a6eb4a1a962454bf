//! Classically-controlled Pauli corrections.

use std::fmt;
use std::str::FromStr;

use qlink_ir::{Circuit, QubitId};
use qlink_state::{Evolve, Operator};
use tracing::debug;

use crate::error::{LinkError, LinkResult};

/// Four measurement bits ordered [Charlie-Z, Charlie-X, Alice-Z, Alice-X].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Outcome([bool; 4]);

impl Outcome {
    /// Build an outcome from its four bits.
    pub fn new(bits: [bool; 4]) -> Self {
        Outcome(bits)
    }

    /// Parse a string of exactly four '0'/'1' characters.
    pub fn parse(outcome: &str) -> LinkResult<Self> {
        let mut bits = [false; 4];
        let mut chars = outcome.chars();
        for bit in &mut bits {
            *bit = match chars.next() {
                Some('0') => false,
                Some('1') => true,
                _ => return Err(LinkError::InvalidOutcome(outcome.to_string())),
            };
        }
        if chars.next().is_some() {
            return Err(LinkError::InvalidOutcome(outcome.to_string()));
        }
        Ok(Outcome(bits))
    }

    /// The bits in order.
    pub fn bits(&self) -> [bool; 4] {
        self.0
    }

    /// Charlie's Z-correction bit.
    pub fn charlie_z(&self) -> bool {
        self.0[0]
    }

    /// Charlie's X-correction bit.
    pub fn charlie_x(&self) -> bool {
        self.0[1]
    }

    /// Alice's Z-correction bit.
    pub fn alice_z(&self) -> bool {
        self.0[2]
    }

    /// Alice's X-correction bit.
    pub fn alice_x(&self) -> bool {
        self.0[3]
    }

    /// One-qubit circuit applying Z, X, Z, X in that order, each gated by
    /// its bit.
    pub fn correction_circuit(&self) -> LinkResult<Circuit> {
        let mut circuit = Circuit::with_size("correction", 1);
        let q = QubitId(0);
        if self.charlie_z() {
            circuit.z(q)?;
        }
        if self.charlie_x() {
            circuit.x(q)?;
        }
        if self.alice_z() {
            circuit.z(q)?;
        }
        if self.alice_x() {
            circuit.x(q)?;
        }
        Ok(circuit)
    }
}

impl FromStr for Outcome {
    type Err = LinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Outcome::parse(s)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.0 {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Apply the corrections selected by `outcome` to a one-qubit state.
pub fn apply_corrections<S: Evolve>(state: &S, outcome: &str) -> LinkResult<S> {
    let outcome = Outcome::parse(outcome)?;
    let operator = correction_operator(&outcome)?;
    Ok(state.evolve(&operator)?)
}

/// Apply the corrections selected by `outcome` to `qubit` of a larger state.
pub fn apply_corrections_on<S: Evolve>(state: &S, outcome: &str, qubit: usize) -> LinkResult<S> {
    let outcome = Outcome::parse(outcome)?;
    if qubit >= state.num_qubits() {
        return Err(LinkError::QubitOutOfRange {
            qubit,
            num_qubits: state.num_qubits(),
        });
    }
    let operator = correction_operator(&outcome)?;
    Ok(state.evolve_on(&operator, &[qubit])?)
}

fn correction_operator(outcome: &Outcome) -> LinkResult<Operator> {
    let circuit = outcome.correction_circuit()?;
    debug!(%outcome, gates = circuit.len(), "applying corrections");
    Ok(Operator::from_circuit(&circuit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use qlink_ir::StandardGate;
    use qlink_state::{DensityMatrix, Statevector};

    #[test]
    fn test_outcome_parse() {
        let outcome: Outcome = "1010".parse().unwrap();
        assert!(outcome.charlie_z());
        assert!(!outcome.charlie_x());
        assert!(outcome.alice_z());
        assert!(!outcome.alice_x());
        assert_eq!(outcome.to_string(), "1010");
    }

    #[test]
    fn test_outcome_rejects_malformed() {
        for bad in ["", "101", "10101", "10a0", "1 10", "２０００"] {
            assert_eq!(
                Outcome::parse(bad),
                Err(LinkError::InvalidOutcome(bad.to_string())),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_correction_circuit_order() {
        let circuit = Outcome::new([true, true, false, true])
            .correction_circuit()
            .unwrap();
        let gates: Vec<_> = circuit.instructions().iter().map(|i| i.gate).collect();
        assert_eq!(gates, vec![StandardGate::Z, StandardGate::X, StandardGate::X]);
    }

    #[test]
    fn test_zero_outcome_is_identity() {
        let mut circuit = Circuit::with_size("prep", 1);
        circuit.ry(0.7, QubitId(0)).unwrap();
        let sv = Statevector::new(1).evolve_circuit(&circuit).unwrap();
        let corrected = apply_corrections(&sv, "0000").unwrap();
        assert!(corrected.equiv(&sv, 1e-12));
    }

    #[test]
    fn test_x_correction_flips() {
        let sv = Statevector::new(1);
        let corrected = apply_corrections(&sv, "0100").unwrap();
        assert!((corrected.probabilities()[1] - 1.0).abs() < 1e-12);

        let rho = DensityMatrix::new(1);
        let corrected = apply_corrections(&rho, "0001").unwrap();
        assert!((corrected.probabilities()[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_corrections_on_larger_state_require_target() {
        let sv = Statevector::new(3);
        assert!(matches!(
            apply_corrections(&sv, "0100"),
            Err(LinkError::State(_))
        ));
        let corrected = apply_corrections_on(&sv, "0100", 2).unwrap();
        assert!((corrected.probabilities()[0b100] - 1.0).abs() < 1e-12);
        assert_eq!(
            apply_corrections_on(&sv, "0100", 3),
            Err(LinkError::QubitOutOfRange {
                qubit: 3,
                num_qubits: 3
            })
        );
    }
}
