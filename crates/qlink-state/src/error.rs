//! Error types for the state crate.

use num_complex::Complex64;
use qlink_ir::{IrError, QubitId};
use thiserror::Error;

/// Errors raised while constructing noise channels and noise models.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum NoiseError {
    /// Error probability outside its admissible range.
    #[error("Invalid error probability {value}: must lie in [0, {max}]")]
    InvalidProbability {
        /// The rejected probability.
        value: f64,
        /// Upper bound for this channel.
        max: f64,
    },

    /// T1 or T2 is not a positive number.
    #[error("Invalid relaxation times T1={t1}, T2={t2}: both must be positive")]
    InvalidRelaxationTime {
        /// Energy relaxation time.
        t1: f64,
        /// Dephasing time.
        t2: f64,
    },

    /// T2 exceeds its physical bound of 2·T1.
    #[error("Invalid T2 relaxation time {t2}: must not exceed 2·T1 = {}", 2.0 * .t1)]
    T2ExceedsLimit {
        /// Energy relaxation time.
        t1: f64,
        /// Dephasing time.
        t2: f64,
    },

    /// Gate duration is negative or not finite.
    #[error("Invalid gate time {0}: must be finite and non-negative")]
    InvalidGateTime(f64),

    /// A channel needs at least one Kraus operator.
    #[error("Channel must have at least one Kraus operator")]
    EmptyChannel,

    /// Kraus operators are not square 2^n matrices.
    #[error("Invalid operator dimensions: Kraus operators must be square and 2^n")]
    InvalidDimensions,

    /// Kraus operators differ in size.
    #[error("All Kraus operators must have the same size")]
    OperatorSizeMismatch,

    /// Σ K†K ≠ I.
    #[error("Kraus operators do not sum to identity (channel is not trace preserving)")]
    NotTracePreserving,

    /// Depolarizing channels are only built up to a small register.
    #[error("Unsupported channel width: {0} qubits")]
    UnsupportedQubitCount(usize),

    /// Channel width does not match the instruction it is attached to.
    #[error("{got}-qubit error cannot be applied to {expected}-qubit instruction '{instruction}'")]
    ArityMismatch {
        /// Instruction name.
        instruction: String,
        /// Arity of the instruction.
        expected: usize,
        /// Width of the error.
        got: usize,
    },

    /// Number of qubits given for a local error does not match its width.
    #[error("{got} qubits given for a {expected}-qubit error")]
    QubitCountMismatch {
        /// Width of the error.
        expected: usize,
        /// Number of qubits supplied.
        got: usize,
    },

    /// Same qubit listed twice for a local error.
    #[error("Duplicate qubit {0} in noise registration")]
    DuplicateQubit(QubitId),
}

/// Errors produced by state construction and evolution.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum StateError {
    /// Vector or matrix dimension is not a power of two.
    #[error("Invalid dimension {0}: must be a non-zero power of two")]
    InvalidDimension(usize),

    /// Matrix is not square.
    #[error("Matrix must be square, got {rows}x{cols}")]
    NotSquare {
        /// Row count.
        rows: usize,
        /// Column count.
        cols: usize,
    },

    /// Statevector does not have unit norm.
    #[error("Vector is not normalized. Norm squared: {0}")]
    NotNormalized(f64),

    /// Density matrix trace differs from 1.
    #[error("Trace is not unity: {0}")]
    InvalidTrace(Complex64),

    /// Density matrix is not Hermitian.
    #[error("Density matrix is not Hermitian")]
    NotHermitian,

    /// Qubit counts of two operands disagree.
    #[error("Dimension mismatch: expected {expected} qubits, got {got}")]
    DimensionMismatch {
        /// Qubits expected by the receiver.
        expected: usize,
        /// Qubits supplied.
        got: usize,
    },

    /// Qubit index outside the register.
    #[error("Qubit index {qubit} out of bounds for {num_qubits}-qubit state")]
    QubitOutOfRange {
        /// The offending qubit.
        qubit: usize,
        /// Register size.
        num_qubits: usize,
    },

    /// Same qubit listed twice in an operand list.
    #[error("Duplicate qubit index {0}")]
    DuplicateQubit(usize),

    /// Normalizing the zero vector.
    #[error("Cannot normalize a zero-norm state")]
    ZeroNorm,

    /// Circuit builder returned an error.
    #[error("Circuit IR error: {0}")]
    Ir(#[from] IrError),

    /// Noise channel error.
    #[error("Noise error: {0}")]
    Noise(#[from] NoiseError),
}

/// Result type for noise construction.
pub type NoiseResult<T> = Result<T, NoiseError>;

/// Result type for state operations.
pub type StateResult<T> = Result<T, StateError>;
