//! Noise channels and gate-keyed noise models.
//!
//! - [`QuantumError`]: a CPTP channel given by Kraus operators, with
//!   depolarizing and thermal-relaxation constructors.
//! - [`NoiseModel`]: which error follows which gate on which qubits.

mod channels;
mod model;

pub use channels::QuantumError;
pub use model::NoiseModel;
