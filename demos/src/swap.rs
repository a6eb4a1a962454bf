//! Entanglement swapping followed by teleportation over two noisy links.
//!
//! Five qubits: the message on q0, one Bell pair on (q1, q2) between Alice
//! and Charlie, another on (q3, q4) between Charlie and Bob. Charlie's Bell
//! measurement on (q2, q3) swaps entanglement onto (q1, q4); Alice's on
//! (q0, q1) then teleports the message to Bob's q4.

use std::fmt;

use clap::ValueEnum;
use qlink::{
    LinkConfig, LinkResult, apply_corrections, create_bell_pair_circuit, create_noise_model,
    create_noise_model_dep, create_simple_noise_model, dm_to_sv_if_pure_with_tolerance,
    project_density_matrix_on_bit,
};
use qlink_ir::{Circuit, QubitId};
use qlink_state::{DensityMatrix, NoiseModel, QuantumState, Statevector, state_fidelity};
use rand::Rng;
use serde::Serialize;
use tracing::debug;

/// Number of qubits in the swapping layout.
pub const NUM_QUBITS: u32 = 5;

/// Measured qubits, in measurement order.
const MEASURED: [usize; 4] = [0, 1, 2, 3];

/// Bob's qubit.
const BOB: usize = 4;

/// Which noise model drives the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoiseKind {
    /// No noise.
    Ideal,
    /// Thermal relaxation with T / (1 + d).
    Thermal,
    /// Thermal relaxation with linearly decaying, floored T.
    LinearDecay,
    /// Depolarizing with p = min(cap, rate·d).
    Depolarizing,
}

impl fmt::Display for NoiseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NoiseKind::Ideal => "ideal",
            NoiseKind::Thermal => "thermal",
            NoiseKind::LinearDecay => "linear-decay",
            NoiseKind::Depolarizing => "depolarizing",
        };
        f.write_str(name)
    }
}

/// Build the noise model for `kind` at `distance` km.
pub fn noise_model(kind: NoiseKind, distance: f64, config: &LinkConfig) -> LinkResult<NoiseModel> {
    match kind {
        NoiseKind::Ideal => Ok(NoiseModel::new()),
        NoiseKind::Thermal => create_noise_model(distance, &config.thermal),
        NoiseKind::LinearDecay => {
            create_noise_model_dep(distance, &config.linear_decay, &config.topology)
        }
        NoiseKind::Depolarizing => {
            create_simple_noise_model(distance, &config.depolarizing, &config.topology)
        }
    }
}

/// Message preparation and both Bell measurements' basis changes.
///
/// Idle `id` slots on the waiting qubits let idle-only noise models act
/// while the links are in flight.
pub fn swap_circuit(theta: f64) -> LinkResult<Circuit> {
    let mut circuit = Circuit::with_size("entanglement_swap", NUM_QUBITS);
    circuit.ry(theta, QubitId(0))?;

    let bell = create_bell_pair_circuit()?;
    for (a, b) in [(1, 2), (3, 4)] {
        for instruction in bell.instructions() {
            let qubits: Vec<QubitId> = instruction
                .qubits
                .iter()
                .map(|q| if q.0 == 0 { QubitId(a) } else { QubitId(b) })
                .collect();
            circuit.apply(qlink_ir::Instruction::gate(instruction.gate, qubits))?;
        }
    }
    for q in 0..NUM_QUBITS {
        circuit.id(QubitId(q))?;
    }

    circuit.cx(QubitId(2), QubitId(3))?.h(QubitId(2))?;
    circuit.cx(QubitId(0), QubitId(1))?.h(QubitId(0))?;
    Ok(circuit)
}

/// The single-qubit message state ry(θ)|0⟩.
pub fn message_state(theta: f64) -> LinkResult<QuantumState> {
    let mut circuit = Circuit::with_size("message", 1);
    circuit.ry(theta, QubitId(0))?;
    Ok(QuantumState::Pure(Statevector::new(1).evolve_circuit(&circuit)?))
}

/// Result of one sampled run.
#[derive(Debug, Clone, Serialize)]
pub struct ShotResult {
    /// Outcome string, [Charlie-Z, Charlie-X, Alice-Z, Alice-X].
    pub outcome: String,
    /// Fidelity of Bob's corrected qubit with the message.
    pub fidelity: f64,
    /// Whether Bob's qubit came out pure.
    pub pure: bool,
}

/// Sweep point: one distance under one noise model.
#[derive(Debug, Clone, Serialize)]
pub struct SwapReport {
    /// Noise model.
    pub noise: NoiseKind,
    /// Hop distance in km.
    pub distance: f64,
    /// Outcome-weighted average fidelity.
    pub mean_fidelity: f64,
    /// Purity of the five-qubit state before measurement.
    pub purity: f64,
    /// Sampled shots.
    pub shots: Vec<ShotResult>,
}

/// Simulates the protocol under one noise model.
pub struct SwapSimulation<'a> {
    config: &'a LinkConfig,
    theta: f64,
}

impl<'a> SwapSimulation<'a> {
    /// New simulation for message angle `theta`.
    pub fn new(config: &'a LinkConfig, theta: f64) -> Self {
        Self { config, theta }
    }

    /// Evolve, then report the exact mean fidelity plus `shots` sampled runs.
    pub fn run<R: Rng>(
        &self,
        kind: NoiseKind,
        distance: f64,
        shots: usize,
        rng: &mut R,
    ) -> LinkResult<SwapReport> {
        let model = noise_model(kind, distance, self.config)?;
        let rho = DensityMatrix::new(NUM_QUBITS as usize)
            .evolve_with_noise(&swap_circuit(self.theta)?, &model)?;
        let message = message_state(self.theta)?;

        let mut mean_fidelity = 0.0;
        for m in 0..16usize {
            let bits: [char; 4] = std::array::from_fn(|i| bit_char((m >> i) & 1 == 1));
            let probability = outcome_probability(&rho, &bits);
            if probability < 1e-12 {
                continue;
            }
            let (fidelity, _) = self.finish(&rho, &bits, &message)?;
            mean_fidelity += probability * fidelity;
        }

        let mut samples = Vec::with_capacity(shots);
        for _ in 0..shots {
            let bits = sample_outcome(&rho, rng)?;
            let (fidelity, pure) = self.finish(&rho, &bits, &message)?;
            samples.push(ShotResult {
                outcome: outcome_string(&bits),
                fidelity,
                pure,
            });
        }

        debug!(%kind, distance, mean_fidelity, "swap sweep point");
        Ok(SwapReport {
            noise: kind,
            distance,
            mean_fidelity,
            purity: rho.purity(),
            shots: samples,
        })
    }

    /// Project on `bits`, keep Bob's qubit, correct it, and compare.
    fn finish(
        &self,
        rho: &DensityMatrix,
        bits: &[char; 4],
        message: &QuantumState,
    ) -> LinkResult<(f64, bool)> {
        let mut projected = rho.clone();
        for (&q, &bit) in MEASURED.iter().zip(bits) {
            projected = project_density_matrix_on_bit(&projected, q, bit)?;
        }
        let traced: Vec<usize> = (0..NUM_QUBITS as usize).filter(|&q| q != BOB).collect();
        let bob = projected.partial_trace(&traced)?;
        let bob = dm_to_sv_if_pure_with_tolerance(bob, self.config.purity_tolerance);
        let pure = bob.is_pure();

        let corrected = apply_corrections(&bob, &outcome_string(bits))?;
        Ok((state_fidelity(&corrected, message)?, pure))
    }
}

fn bit_char(bit: bool) -> char {
    if bit { '1' } else { '0' }
}

/// [Charlie-Z, Charlie-X, Alice-Z, Alice-X] from bits measured on q0..q3.
fn outcome_string(bits: &[char; 4]) -> String {
    [bits[2], bits[3], bits[0], bits[1]].iter().collect()
}

fn outcome_probability(rho: &DensityMatrix, bits: &[char; 4]) -> f64 {
    rho.probabilities()
        .iter()
        .enumerate()
        .filter(|(i, _)| {
            MEASURED
                .iter()
                .zip(bits)
                .all(|(&q, &b)| ((i >> q) & 1 == 1) == (b == '1'))
        })
        .map(|(_, p)| p)
        .sum()
}

/// Sample q0..q3 one at a time from their conditional distributions.
fn sample_outcome<R: Rng>(rho: &DensityMatrix, rng: &mut R) -> LinkResult<[char; 4]> {
    let mut state = rho.clone();
    let mut bits = ['0'; 4];
    for (slot, &q) in bits.iter_mut().zip(&MEASURED) {
        let p_one = state.probability_of_bit(q, true)?;
        *slot = bit_char(rng.gen_bool(p_one.clamp(0.0, 1.0)));
        state = project_density_matrix_on_bit(&state, q, *slot)?;
    }
    Ok(bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_ideal_swap_is_perfect() {
        let config = LinkConfig::default();
        let sim = SwapSimulation::new(&config, 0.8);
        let mut rng = StdRng::seed_from_u64(7);
        let report = sim.run(NoiseKind::Ideal, 0.0, 4, &mut rng).unwrap();
        assert!((report.mean_fidelity - 1.0).abs() < 1e-9);
        assert!((report.purity - 1.0).abs() < 1e-9);
        assert_eq!(report.shots.len(), 4);
        for shot in &report.shots {
            assert!(shot.pure);
            assert!((shot.fidelity - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_outcome_string_order() {
        assert_eq!(outcome_string(&['1', '0', '0', '1']), "0110");
    }

    #[test]
    fn test_swap_circuit_layout() {
        let circuit = swap_circuit(0.3).unwrap();
        assert_eq!(circuit.num_qubits(), 5);
        let ops = circuit.count_ops();
        assert_eq!(ops["cx"], 4);
        assert_eq!(ops["h"], 4);
        assert_eq!(ops["id"], 5);
        assert_eq!(ops["ry"], 1);
    }
}
