//! Property tests for the link helpers.

use proptest::prelude::*;
use qlink::{
    LinearDecayParams, ThermalNoiseParams, Topology, apply_corrections,
    attenuated_relaxation_times, clamped_relaxation_times, create_noise_model,
    create_noise_model_dep, dm_to_sv_if_pure, project_statevector_on_bit,
};
use qlink_ir::{Circuit, QubitId, StandardGate};
use qlink_state::{DensityMatrix, Evolve, Operator, Statevector};

fn random_state(angles: &[f64]) -> Statevector {
    let n = angles.len() / 2;
    let mut circuit = Circuit::with_size("random", n as u32);
    for q in 0..n {
        circuit.ry(angles[2 * q], QubitId(q as u32)).unwrap();
        circuit.rz(angles[2 * q + 1], QubitId(q as u32)).unwrap();
    }
    for q in 1..n {
        circuit.cx(QubitId(q as u32 - 1), QubitId(q as u32)).unwrap();
    }
    Statevector::new(n).evolve_circuit(&circuit).unwrap()
}

proptest! {
    #[test]
    fn attenuation_is_monotone(d1 in 0.0f64..1e3, delta in 1e-6f64..1e3) {
        let params = ThermalNoiseParams::default();
        let (t1_near, t2_near) = attenuated_relaxation_times(d1, &params);
        let (t1_far, t2_far) = attenuated_relaxation_times(d1 + delta, &params);
        prop_assert!(t1_far < t1_near);
        prop_assert!(t2_far < t2_near);
        prop_assert!(t1_far > 0.0);
        prop_assert!(create_noise_model(d1, &params).is_ok());

        let (t1_limit, t2_limit) = attenuated_relaxation_times(1e12 + d1, &params);
        prop_assert!(t1_limit < 1e-6 && t2_limit < 1e-6);
    }

    #[test]
    fn clamped_times_never_below_floor(distance in 0.0f64..1e3) {
        let params = LinearDecayParams::default();
        let (t1, t2) = clamped_relaxation_times(distance, &params);
        prop_assert!(t1 >= params.floor);
        prop_assert!(t2 >= params.floor);
        if params.t1_base - params.t1_decay_per_km * distance < params.floor {
            prop_assert_eq!(t1, params.floor);
        }
        prop_assert!(create_noise_model_dep(distance, &params, &Topology::default()).is_ok());
    }

    #[test]
    fn projection_is_normalized(
        angles in prop::collection::vec(0.0f64..std::f64::consts::TAU, 6),
        qubit in 0usize..3,
        bit in prop::sample::select(vec!['0', '1']),
    ) {
        let sv = random_state(&angles);
        let want = bit == '1';
        match project_statevector_on_bit(&sv, qubit, bit) {
            Ok(projected) => {
                let norm: f64 = projected.probabilities().iter().sum();
                prop_assert!((norm - 1.0).abs() < 1e-10);
                prop_assert!((projected.probability_of_bit(qubit, want).unwrap() - 1.0).abs() < 1e-10);
            }
            Err(_) => prop_assert!(sv.probability_of_bit(qubit, want).unwrap() < 1e-20),
        }
    }

    #[test]
    fn pure_density_matrix_round_trips(
        angles in prop::collection::vec(0.0f64..std::f64::consts::TAU, 4),
    ) {
        let sv = random_state(&angles);
        let state = dm_to_sv_if_pure(DensityMatrix::from_statevector(&sv));
        let recovered = state.as_statevector().unwrap();
        prop_assert!(recovered.equiv(&sv, 1e-8));
    }

    #[test]
    fn corrections_match_literal_product(
        bits in prop::array::uniform4(any::<bool>()),
        angles in prop::collection::vec(0.0f64..std::f64::consts::TAU, 2),
    ) {
        let outcome: String = bits.iter().map(|&b| if b { '1' } else { '0' }).collect();
        let sv = random_state(&angles);

        let mut expected = Operator::identity(1);
        for (bit, gate) in bits.iter().zip([StandardGate::Z, StandardGate::X, StandardGate::Z, StandardGate::X]) {
            if *bit {
                expected = expected.compose(&Operator::from_gate(&gate)).unwrap();
            }
        }
        let corrected = apply_corrections(&sv, &outcome).unwrap();
        let reference = sv.evolve(&expected).unwrap();
        // exact, not just up to phase
        for (a, b) in corrected.amplitudes().iter().zip(reference.amplitudes()) {
            prop_assert!((a - b).norm() < 1e-12);
        }
    }
}

#[test]
fn attenuation_vanishes_with_distance() {
    let params = ThermalNoiseParams::default();
    let mut previous = attenuated_relaxation_times(0.0, &params);
    for exponent in 1..=15 {
        let (t1, t2) = attenuated_relaxation_times(10f64.powi(exponent), &params);
        assert!(t1 < previous.0 && t2 < previous.1);
        previous = (t1, t2);
    }
    assert!(previous.0 < 1e-9 && previous.1 < 1e-9);
    assert!((previous.0 * 1e15 - params.t1_base).abs() < 1e-3);
}
