//! `qlink` — helpers for simulating quantum links.
//!
//! Building blocks for teleportation and entanglement-swapping experiments
//! over noisy, distance-dependent channels:
//!
//! - [`create_bell_pair_circuit`]: the (|00⟩ + |11⟩)/√2 preparation circuit
//! - [`create_noise_model`], [`create_noise_model_dep`],
//!   [`create_simple_noise_model`]: noise models parameterised by hop distance
//! - [`dm_to_sv_if_pure`]: recover a statevector from a pure density matrix
//! - [`apply_corrections`]: Pauli corrections selected by a 4-bit outcome
//! - [`project_statevector_on_bit`]: single-qubit projective measurement
//!
//! # Example: Teleportation corrections
//!
//! ```rust
//! use qlink::{apply_corrections, create_bell_pair_circuit, project_statevector_on_bit};
//! use qlink_state::Statevector;
//!
//! let bell = Statevector::new(2).evolve_circuit(&create_bell_pair_circuit()?)?;
//! let measured = project_statevector_on_bit(&bell, 0, '1')?;
//! assert!((measured.probabilities()[0b11] - 1.0).abs() < 1e-12);
//!
//! let bob = Statevector::from_label("1")?;
//! let corrected = apply_corrections(&bob, "0100")?;
//! assert!((corrected.probabilities()[0] - 1.0).abs() < 1e-12);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod bell;
pub mod config;
pub mod correction;
pub mod error;
pub mod noise_models;
pub mod projection;
pub mod purity;

pub use bell::create_bell_pair_circuit;
pub use config::LinkConfig;
pub use correction::{Outcome, apply_corrections, apply_corrections_on};
pub use error::{ConfigError, ConfigResult, LinkError, LinkResult};
pub use noise_models::{
    DepolarizingParams, LinearDecayParams, ThermalNoiseParams, Topology,
    attenuated_relaxation_times, clamped_relaxation_times, create_noise_model,
    create_noise_model_dep, create_simple_noise_model, depolarizing_probability,
};
pub use projection::{
    project_density_matrix_on_bit, project_density_matrix_on_bit_with_tolerance,
    project_statevector_on_bit, project_statevector_on_bit_with_tolerance,
};
pub use purity::{dm_to_sv_if_pure, dm_to_sv_if_pure_with_tolerance};
