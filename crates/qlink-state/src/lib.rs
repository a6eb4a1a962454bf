//! `qlink-state` — dense state simulation for small qubit registers.
//!
//! Provides the numerical types the qlink protocol helpers operate on:
//!
//! - [`Statevector`] and [`DensityMatrix`] over up to a handful of qubits
//! - [`Operator`] built from `qlink_ir` circuits
//! - the [`Evolve`] trait shared by pure and mixed states
//! - Kraus-operator noise channels ([`QuantumError`]) and a gate-keyed
//!   [`NoiseModel`] consumed by [`DensityMatrix::evolve_with_noise`]
//!
//! Qubit 0 is the least-significant bit of a basis index throughout.
//!
//! # Quick start
//!
//! ```rust
//! use qlink_ir::{Circuit, QubitId};
//! use qlink_state::{DensityMatrix, NoiseModel, QuantumError};
//!
//! let mut circuit = Circuit::with_size("bell", 2);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//!
//! let mut noise = NoiseModel::new();
//! let depol = QuantumError::depolarizing(0.05, 2).unwrap();
//! noise.add_all_qubit_quantum_error(&depol, &["cx"]).unwrap();
//!
//! let rho = DensityMatrix::new(2).evolve_with_noise(&circuit, &noise).unwrap();
//! assert!(rho.purity() < 1.0);
//! ```

pub mod density;
pub mod error;
pub mod evolve;
pub mod linalg;
pub mod noise;
pub mod operator;
pub mod state;
pub mod statevector;

pub use density::DensityMatrix;
pub use error::{NoiseError, NoiseResult, StateError, StateResult};
pub use evolve::Evolve;
pub use noise::{NoiseModel, QuantumError};
pub use operator::{Operator, gate_matrix};
pub use state::{QuantumState, state_fidelity};
pub use statevector::Statevector;
