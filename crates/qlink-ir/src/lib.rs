//! qlink circuit representation
//!
//! The small gate-level IR the qlink protocol helpers build on. A
//! [`Circuit`] is an ordered list of [`Instruction`]s over a fixed qubit
//! register; simulators in `qlink-state` replay that list in order.
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use qlink_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell_state", 2);
//!
//! // |00⟩ → (|00⟩ + |11⟩)/√2
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.depth(), 2);
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Name |
//! |------|--------|------|
//! | Identity | 1 | `id` |
//! | Pauli X, Y, Z | 1 | `x`, `y`, `z` |
//! | Hadamard | 1 | `h` |
//! | S, S†, T, T† | 1 | `s`, `sdg`, `t`, `tdg` |
//! | Rx, Ry, Rz | 1 | `rx`, `ry`, `rz` |
//! | CNOT, CZ | 2 | `cx`, `cz` |
//! | SWAP | 2 | `swap` |

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::{StandardGate, arity_of};
pub use instruction::Instruction;
pub use qubit::QubitId;
