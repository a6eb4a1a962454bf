//! End-to-end entanglement swapping followed by teleportation.
//!
//! Layout: message on q0, Bell pairs on (q1, q2) and (q3, q4). Charlie
//! measures (q2, q3), Alice measures (q0, q1), Bob corrects q4.

use qlink::{
    DepolarizingParams, LinkError, Topology, apply_corrections, create_bell_pair_circuit,
    create_simple_noise_model, dm_to_sv_if_pure, project_density_matrix_on_bit,
    project_statevector_on_bit,
};
use qlink_ir::{Circuit, QubitId};
use qlink_state::{DensityMatrix, QuantumState, Statevector, state_fidelity};

const THETA: f64 = 1.1;

fn swap_circuit() -> Circuit {
    let mut circuit = Circuit::with_size("swap", 5);
    circuit.ry(THETA, QubitId(0)).unwrap();
    for (a, b) in [(1, 2), (3, 4)] {
        for instruction in create_bell_pair_circuit().unwrap().instructions() {
            let q: Vec<_> = instruction.qubits.iter().map(|q| [a, b][q.index()]).collect();
            match q.as_slice() {
                [t] => circuit.h(QubitId(*t)).unwrap(),
                [c, t] => circuit.cx(QubitId(*c), QubitId(*t)).unwrap(),
                _ => unreachable!(),
            };
        }
    }
    // Charlie's Bell measurement basis change
    circuit.cx(QubitId(2), QubitId(3)).unwrap();
    circuit.h(QubitId(2)).unwrap();
    // Alice's
    circuit.cx(QubitId(0), QubitId(1)).unwrap();
    circuit.h(QubitId(0)).unwrap();
    circuit
}

fn message() -> QuantumState {
    let mut circuit = Circuit::with_size("message", 1);
    circuit.ry(THETA, QubitId(0)).unwrap();
    QuantumState::Pure(Statevector::new(1).evolve_circuit(&circuit).unwrap())
}

/// Measured bits for (q0, q1, q2, q3) and the outcome string in
/// [Charlie-Z, Charlie-X, Alice-Z, Alice-X] order.
fn outcomes() -> impl Iterator<Item = ([char; 4], String)> {
    (0..16u32).map(|m| {
        let bits: [char; 4] = std::array::from_fn(|q| if (m >> q) & 1 == 1 { '1' } else { '0' });
        let outcome: String = [bits[2], bits[3], bits[0], bits[1]].iter().collect();
        (bits, outcome)
    })
}

#[test]
fn ideal_swap_teleports_message_for_every_outcome() {
    let state = Statevector::new(5).evolve_circuit(&swap_circuit()).unwrap();

    for (bits, outcome) in outcomes() {
        let mut projected = state.clone();
        for (q, &bit) in bits.iter().enumerate() {
            projected = project_statevector_on_bit(&projected, q, bit).unwrap();
        }
        let bob = DensityMatrix::from_statevector(&projected)
            .partial_trace(&[0, 1, 2, 3])
            .unwrap();
        let bob = dm_to_sv_if_pure(bob);
        assert!(bob.is_pure(), "outcome {outcome}");

        let corrected = apply_corrections(&bob, &outcome).unwrap();
        let fidelity = state_fidelity(&corrected, &message()).unwrap();
        assert!((fidelity - 1.0).abs() < 1e-9, "outcome {outcome}: {fidelity}");
    }
}

#[test]
fn wrong_corrections_reduce_fidelity() {
    let state = Statevector::new(5).evolve_circuit(&swap_circuit()).unwrap();
    let mut projected = state;
    for q in 0..4 {
        projected = project_statevector_on_bit(&projected, q, '0').unwrap();
    }
    let bob = DensityMatrix::from_statevector(&projected)
        .partial_trace(&[0, 1, 2, 3])
        .unwrap();
    let flipped = apply_corrections(&bob, "0100").unwrap();
    let fidelity = state_fidelity(&QuantumState::Mixed(flipped), &message()).unwrap();
    assert!(fidelity < 0.99);
}

#[test]
fn depolarizing_noise_degrades_swap_with_distance() {
    let topology = Topology::default();
    let params = DepolarizingParams::default();

    let mean_fidelity = |distance: f64| -> f64 {
        let model = create_simple_noise_model(distance, &params, &topology).unwrap();
        let rho = DensityMatrix::new(5)
            .evolve_with_noise(&swap_circuit(), &model)
            .unwrap();

        let mut total = 0.0;
        for (bits, outcome) in outcomes() {
            let mut projected = rho.clone();
            for (q, &bit) in bits.iter().enumerate() {
                projected = project_density_matrix_on_bit(&projected, q, bit).unwrap();
            }
            let bob = projected.partial_trace(&[0, 1, 2, 3]).unwrap();
            let corrected = apply_corrections(&bob, &outcome).unwrap();
            total += state_fidelity(&QuantumState::Mixed(corrected), &message()).unwrap();
        }
        total / 16.0
    };

    let near = mean_fidelity(0.0);
    let mid = mean_fidelity(3.0);
    let far = mean_fidelity(10.0);
    assert!((near - 1.0).abs() < 1e-9);
    assert!(mid < near);
    assert!(far < mid);
}

#[test]
fn malformed_outcome_is_rejected() {
    let bob = Statevector::new(1);
    assert_eq!(
        apply_corrections(&bob, "01"),
        Err(LinkError::InvalidOutcome("01".to_string()))
    );
}
