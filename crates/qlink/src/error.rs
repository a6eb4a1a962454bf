//! Error types for the protocol helpers.

use qlink_ir::IrError;
use qlink_state::{NoiseError, StateError};
use thiserror::Error;

/// Errors raised by the protocol helpers.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum LinkError {
    /// Outcome string is not four '0'/'1' characters.
    #[error("Invalid outcome '{0}': expected 4 characters of '0' or '1'")]
    InvalidOutcome(String),

    /// Requested measurement bit is not '0' or '1'.
    #[error("Invalid bit '{0}': expected '0' or '1'")]
    InvalidBit(char),

    /// Qubit index outside the register.
    #[error("Qubit {qubit} out of range for {num_qubits}-qubit state")]
    QubitOutOfRange {
        /// The offending qubit.
        qubit: usize,
        /// Register size.
        num_qubits: usize,
    },

    /// Projection removed all amplitude.
    #[error("Projection gave zero norm for qubit {qubit} bit {bit}")]
    ZeroNorm {
        /// The measured qubit.
        qubit: usize,
        /// The requested outcome.
        bit: char,
    },

    /// Error from the circuit builder.
    #[error("Circuit error: {0}")]
    Ir(#[from] IrError),

    /// Error from state construction or evolution.
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// Error from noise-channel construction.
    #[error("Noise error: {0}")]
    Noise(#[from] NoiseError),
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid YAML for [`LinkConfig`](crate::LinkConfig).
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml_ng::Error),

    /// A value is out of its admissible range.
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Result type for protocol helpers.
pub type LinkResult<T> = Result<T, LinkError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
