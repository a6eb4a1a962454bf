//! Distance-dependent noise models for link simulations.
//!
//! Three flavours, selectable per sweep:
//!
//! | Builder | Channel | Relaxation scaling |
//! |---------|---------|--------------------|
//! | [`create_noise_model`] | thermal, all qubits | T / (1 + d) |
//! | [`create_noise_model_dep`] | thermal, per qubit / pair | max(T − k·d, floor) |
//! | [`create_simple_noise_model`] | depolarizing, per qubit / pair | p = min(cap, rate·d) |
//!
//! Distances are in km, all times in ns.

use qlink_ir::QubitId;
use qlink_state::{NoiseModel, QuantumError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LinkResult;

/// Single-qubit gates carrying thermal noise in [`create_noise_model_dep`].
pub const THERMAL_GATES_1Q: &[&str] = &["x", "h", "ry"];

/// Single-qubit gates carrying depolarizing noise in [`create_simple_noise_model`].
pub const DEPOLARIZING_GATES_1Q: &[&str] = &["x", "h", "ry", "id"];

/// Two-qubit gates carrying noise on topology pairs.
pub const GATES_2Q: &[&str] = &["cx"];

/// Baseline relaxation for [`create_noise_model`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermalNoiseParams {
    /// T1 at zero distance.
    #[serde(default = "default_t1_base")]
    pub t1_base: f64,
    /// T2 at zero distance.
    #[serde(default = "default_t2_base")]
    pub t2_base: f64,
    /// Duration of every noisy gate.
    #[serde(default = "default_gate_time")]
    pub gate_time: f64,
}

/// Linear relaxation decay for [`create_noise_model_dep`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearDecayParams {
    /// T1 at zero distance.
    #[serde(default = "default_decay_t1_base")]
    pub t1_base: f64,
    /// T1 lost per km.
    #[serde(default = "default_t1_decay")]
    pub t1_decay_per_km: f64,
    /// T2 at zero distance.
    #[serde(default = "default_decay_t2_base")]
    pub t2_base: f64,
    /// T2 lost per km.
    #[serde(default = "default_t2_decay")]
    pub t2_decay_per_km: f64,
    /// Lower bound for both T1 and T2.
    #[serde(default = "default_floor")]
    pub floor: f64,
    /// Single-qubit gate duration.
    #[serde(default = "default_gate_time")]
    pub gate_time_1q: f64,
    /// Two-qubit gate duration.
    #[serde(default = "default_gate_time_2q")]
    pub gate_time_2q: f64,
}

/// Distance scaling for [`create_simple_noise_model`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepolarizingParams {
    /// Single-qubit error probability per km.
    #[serde(default = "default_rate_per_km")]
    pub rate_per_km: f64,
    /// Saturation value for the single-qubit probability.
    #[serde(default = "default_max_probability")]
    pub max_probability: f64,
    /// Two-qubit probability as a multiple of the single-qubit one.
    #[serde(default = "default_two_qubit_factor")]
    pub two_qubit_factor: f64,
}

/// Qubits and wire pairs that carry local noise.
///
/// The defaults describe the five-qubit swapping layout: message on 0,
/// Bell pairs on (1, 2) and (3, 4).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    /// Qubits receiving single-qubit errors.
    #[serde(default = "default_qubits")]
    pub qubits: Vec<u32>,
    /// Ordered (control, target) pairs receiving two-qubit errors.
    #[serde(default = "default_pairs")]
    pub pairs: Vec<(u32, u32)>,
}

fn default_t1_base() -> f64 {
    50e3
}

fn default_t2_base() -> f64 {
    70e3
}

fn default_gate_time() -> f64 {
    100.0
}

fn default_gate_time_2q() -> f64 {
    300.0
}

fn default_decay_t1_base() -> f64 {
    5e4
}

fn default_decay_t2_base() -> f64 {
    7e4
}

fn default_t1_decay() -> f64 {
    2e3
}

fn default_t2_decay() -> f64 {
    3e3
}

fn default_floor() -> f64 {
    1e3
}

fn default_rate_per_km() -> f64 {
    0.01
}

fn default_max_probability() -> f64 {
    0.1
}

fn default_two_qubit_factor() -> f64 {
    1.5
}

fn default_qubits() -> Vec<u32> {
    (0..5).collect()
}

fn default_pairs() -> Vec<(u32, u32)> {
    vec![(1, 2), (3, 4)]
}

impl Default for ThermalNoiseParams {
    fn default() -> Self {
        Self {
            t1_base: default_t1_base(),
            t2_base: default_t2_base(),
            gate_time: default_gate_time(),
        }
    }
}

impl Default for LinearDecayParams {
    fn default() -> Self {
        Self {
            t1_base: default_decay_t1_base(),
            t1_decay_per_km: default_t1_decay(),
            t2_base: default_decay_t2_base(),
            t2_decay_per_km: default_t2_decay(),
            floor: default_floor(),
            gate_time_1q: default_gate_time(),
            gate_time_2q: default_gate_time_2q(),
        }
    }
}

impl Default for DepolarizingParams {
    fn default() -> Self {
        Self {
            rate_per_km: default_rate_per_km(),
            max_probability: default_max_probability(),
            two_qubit_factor: default_two_qubit_factor(),
        }
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self {
            qubits: default_qubits(),
            pairs: default_pairs(),
        }
    }
}

/// (T1, T2) after `hop_distance` km: baseline divided by `1 + hop_distance`.
pub fn attenuated_relaxation_times(hop_distance: f64, params: &ThermalNoiseParams) -> (f64, f64) {
    let scale = 1.0 + hop_distance;
    (params.t1_base / scale, params.t2_base / scale)
}

/// (T1, T2) after `distance` km: linear decay, never below the floor.
pub fn clamped_relaxation_times(distance: f64, params: &LinearDecayParams) -> (f64, f64) {
    let t1 = (params.t1_base - params.t1_decay_per_km * distance).max(params.floor);
    let t2 = (params.t2_base - params.t2_decay_per_km * distance).max(params.floor);
    (t1, t2)
}

/// Single-qubit depolarizing probability after `distance` km.
pub fn depolarizing_probability(distance: f64, params: &DepolarizingParams) -> f64 {
    params.max_probability.min(params.rate_per_km * distance)
}

/// Thermal noise on every qubit with relaxation times shrinking as
/// 1/(1 + d).
///
/// The channel follows every `id`; `cx` gets the channel on each of its two
/// operands.
pub fn create_noise_model(
    hop_distance: f64,
    params: &ThermalNoiseParams,
) -> LinkResult<NoiseModel> {
    let (t1, t2) = attenuated_relaxation_times(hop_distance, params);
    let thermal = QuantumError::thermal_relaxation(t1, t2, params.gate_time)?;

    let mut model = NoiseModel::new();
    model.add_all_qubit_quantum_error(&thermal, &["id"])?;
    model.add_all_qubit_quantum_error(&thermal.tensor(&thermal), GATES_2Q)?;

    debug!(hop_distance, t1, t2, gate_time = params.gate_time, "built thermal noise model");
    Ok(model)
}

/// Thermal noise with linearly decaying, floored relaxation times, placed on
/// the topology's qubits and pairs.
///
/// Two-qubit gates use `gate_time_2q` and an independent channel per operand.
pub fn create_noise_model_dep(
    distance: f64,
    params: &LinearDecayParams,
    topology: &Topology,
) -> LinkResult<NoiseModel> {
    let (t1, t2) = clamped_relaxation_times(distance, params);
    let error_1q = QuantumError::thermal_relaxation(t1, t2, params.gate_time_1q)?;
    let single_2q = QuantumError::thermal_relaxation(t1, t2, params.gate_time_2q)?;
    let error_2q = single_2q.tensor(&single_2q);

    let model = place_errors(&error_1q, THERMAL_GATES_1Q, &error_2q, topology)?;
    debug!(distance, t1, t2, "built linear-decay thermal noise model");
    Ok(model)
}

/// Depolarizing noise with probability growing linearly in distance up to a
/// cap, placed on the topology's qubits and pairs.
pub fn create_simple_noise_model(
    distance: f64,
    params: &DepolarizingParams,
    topology: &Topology,
) -> LinkResult<NoiseModel> {
    let p1 = depolarizing_probability(distance, params);
    let p2 = p1 * params.two_qubit_factor;
    let error_1q = QuantumError::depolarizing(p1, 1)?;
    let error_2q = QuantumError::depolarizing(p2, 2)?;

    let model = place_errors(&error_1q, DEPOLARIZING_GATES_1Q, &error_2q, topology)?;
    debug!(distance, p1, p2, "built depolarizing noise model");
    Ok(model)
}

fn place_errors(
    error_1q: &QuantumError,
    gates_1q: &[&str],
    error_2q: &QuantumError,
    topology: &Topology,
) -> LinkResult<NoiseModel> {
    let mut model = NoiseModel::new();
    for &q in &topology.qubits {
        model.add_quantum_error(error_1q, gates_1q, &[QubitId(q)])?;
    }
    for &(a, b) in &topology.pairs {
        model.add_quantum_error(error_2q, GATES_2Q, &[QubitId(a), QubitId(b)])?;
    }
    Ok(model)
}
