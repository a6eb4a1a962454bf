//! Entangled-pair preparation.

use qlink_ir::{Circuit, QubitId};

use crate::error::LinkResult;

/// Two-qubit circuit preparing (|00⟩ + |11⟩)/√2 from |00⟩.
///
/// Hadamard on qubit 0, then CX with qubit 0 as control and qubit 1 as
/// target.
pub fn create_bell_pair_circuit() -> LinkResult<Circuit> {
    let mut circuit = Circuit::with_size("bell_pair", 2);
    circuit.h(QubitId(0))?.cx(QubitId(0), QubitId(1))?;
    Ok(circuit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qlink_ir::StandardGate;
    use qlink_state::Statevector;

    #[test]
    fn test_bell_pair_structure() {
        let circuit = create_bell_pair_circuit().unwrap();
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.len(), 2);
        let gates: Vec<_> = circuit.instructions().iter().map(|i| i.gate).collect();
        assert_eq!(gates, vec![StandardGate::H, StandardGate::CX]);
        assert_eq!(circuit.instructions()[1].qubits, vec![QubitId(0), QubitId(1)]);
    }

    #[test]
    fn test_bell_pair_probabilities() {
        let circuit = create_bell_pair_circuit().unwrap();
        let probs = Statevector::new(2).evolve_circuit(&circuit).unwrap().probabilities();
        assert!((probs[0b00] - 0.5).abs() < 1e-12);
        assert!((probs[0b11] - 0.5).abs() < 1e-12);
        assert!(probs[0b01].abs() < 1e-12);
        assert!(probs[0b10].abs() < 1e-12);
    }
}
